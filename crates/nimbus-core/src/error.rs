//! Error type for the nimbus dialog core.
//!
//! No variant is fatal. Public entry points of the controller log these at
//! `warn!` and return; internal helpers propagate them with `?`.

use thiserror_no_std::Error;

/// Short owned name carried by errors without allocating.
pub type Name = heapless::String<24>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    #[error("not started yet, call start first")]
    NotStarted,
    #[error("user input is not allowed at this time")]
    InputRejected,
    #[error("still speaking, please wait until narration is finished")]
    Speaking,
    #[error("target state is empty")]
    EmptyTarget,
    #[error("state \"{0}\" has no entry defined")]
    UnknownState(Name),
    #[error("invalid local LED index {0}, must be 0-9")]
    InvalidLedIndex(usize),
    #[error("invalid button identifier {0}")]
    InvalidButton(Name),
    #[error("invalid floor {0}, must be 1-3")]
    InvalidFloor(u8),
    #[error("input queue is full")]
    QueueFull,
}

impl DialogError {
    /// True for the four preliminary dispatch checks.
    pub const fn is_guard_violation(&self) -> bool {
        matches!(
            self,
            Self::NotStarted | Self::InputRejected | Self::Speaking | Self::EmptyTarget
        )
    }
}

/// Build a [`Name`], truncating anything that does not fit.
pub(crate) fn name_from(value: &str) -> Name {
    let mut name = Name::new();
    for c in value.chars() {
        if name.push(c).is_err() {
            break;
        }
    }
    name
}
