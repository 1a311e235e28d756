//! Dialog states, session status and the read-only session view.

use core::fmt;
use core::str::FromStr;

use crate::error::{DialogError, name_from};
use crate::gesture::FloorPair;
use crate::leds::ModeKey;

/// Steps of the guided dialog.
///
/// ```text
/// initialisation → waiting-for-ground → welcome → choose-rain → choose-wind
///     → choose-hour → choose-pollution → summary → final
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogState {
    Initialisation,
    WaitingForGround,
    Welcome,
    Choose(ModeKey),
    Summary,
    Final,
}

impl DialogState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initialisation => "initialisation",
            Self::WaitingForGround => "waiting-for-ground",
            Self::Welcome => "welcome",
            Self::Choose(ModeKey::Rain) => "choose-rain",
            Self::Choose(ModeKey::Wind) => "choose-wind",
            Self::Choose(ModeKey::Hour) => "choose-hour",
            Self::Choose(ModeKey::Pollution) => "choose-pollution",
            Self::Summary => "summary",
            Self::Final => "final",
        }
    }

    /// The mode owning the LED window in this state, if any.
    pub const fn mode(self) -> Option<ModeKey> {
        match self {
            Self::Choose(mode) => Some(mode),
            _ => None,
        }
    }

    /// State reached by switching floor out of this one.
    pub const fn after_floor_switch(self) -> Option<DialogState> {
        match self {
            Self::Choose(mode) => match mode.next() {
                Some(next) => Some(Self::Choose(next)),
                None => Some(Self::Summary),
            },
            _ => None,
        }
    }
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialogState {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let state = match s {
            "initialisation" => Self::Initialisation,
            "waiting-for-ground" => Self::WaitingForGround,
            "welcome" => Self::Welcome,
            "choose-rain" => Self::Choose(ModeKey::Rain),
            "choose-wind" => Self::Choose(ModeKey::Wind),
            "choose-hour" => Self::Choose(ModeKey::Hour),
            "choose-pollution" => Self::Choose(ModeKey::Pollution),
            "summary" => Self::Summary,
            "final" => Self::Final,
            other => return Err(DialogError::UnknownState(name_from(other))),
        };
        Ok(state)
    }
}

/// Where the session stands with respect to input and narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// `start` has not been called.
    #[default]
    NotStarted,
    /// Accepting input.
    AwaitingInput,
    /// Accepting input, and the dialog moves on by itself once speech ends.
    AwaitingContinuation,
    /// Dialog reached its end; input is rejected.
    Closed,
}

impl SessionStatus {
    pub const fn is_started(self) -> bool {
        !matches!(self, Self::NotStarted)
    }

    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::AwaitingInput | Self::AwaitingContinuation)
    }
}

/// Copyable snapshot of the session, for displays and audit logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionView {
    pub current: Option<DialogState>,
    pub target: Option<DialogState>,
    pub status: SessionStatus,
    pub speaking: bool,
    pub floor: Option<FloorPair>,
    pub last_floor: Option<FloorPair>,
    /// Counters in rain, wind, hour, pollution order.
    pub counts: [u8; 4],
    pub exit_presses: u8,
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current {
            Some(state) => write!(f, "{state}")?,
            None => f.write_str("-")?,
        }
        if let Some(floor) = self.floor {
            write!(f, " | floor {floor}")?;
        }
        write!(
            f,
            " | rain {} wind {} hour {} pollution {}",
            self.counts[0], self.counts[1], self.counts[2], self.counts[3]
        )
    }
}
