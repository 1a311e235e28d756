//! LED strip capability and per-mode LED bookkeeping.
//!
//! The strip has 30 physical LEDs split into three 10-LED floors. The dialog
//! only ever thinks in a 10-slot logical window; [`mapper`] translates it to
//! the physical range of the active floor and [`store`] keeps one saved
//! window per mode.

pub mod mapper;
pub mod store;

pub use mapper::{LedMapper, PhysicalLed};
pub use store::{ModeLedStore, ModeSnapshot, StepOutcome};

use core::fmt;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use serde::{Deserialize, Serialize};

/// Named colours understood by the strip driver for whole-strip fills.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    White,
    Yellow,
    Green,
    Pink,
}

impl NamedColor {
    pub const fn rgb(self) -> Rgb888 {
        match self {
            Self::Black => Rgb888::BLACK,
            Self::White => Rgb888::WHITE,
            Self::Yellow => Rgb888::CSS_YELLOW,
            Self::Green => Rgb888::CSS_GREEN,
            Self::Pink => Rgb888::CSS_PINK,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Pink => "pink",
        }
    }
}

/// Blink behaviour for whole-strip fills.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlinkMode {
    #[default]
    Steady,
    Slow,
    Fast,
}

impl BlinkMode {
    /// Numeric blink code used by strip drivers (0 = steady).
    pub const fn code(self) -> u8 {
        match self {
            Self::Steady => 0,
            Self::Slow => 1,
            Self::Fast => 2,
        }
    }

    /// Half period of the blink, if any.
    pub const fn half_period_ms(self) -> Option<u64> {
        match self {
            Self::Steady => None,
            Self::Slow => Some(500),
            Self::Fast => Some(150),
        }
    }
}

/// Capability for driving the physical LED strip.
///
/// Implemented by the simulator window and by hardware strip drivers. The
/// controller owns its driver and never reads LED state back from it.
pub trait LedDriver {
    /// Set one physical LED (0-29).
    fn render(&mut self, index: PhysicalLed, color: Rgb888);

    /// Turn every LED off.
    fn all_off(&mut self);

    /// Set every LED to a named colour with the given blink behaviour.
    fn fill(&mut self, color: NamedColor, blink: BlinkMode);
}

impl<T: LedDriver + ?Sized> LedDriver for &mut T {
    fn render(&mut self, index: PhysicalLed, color: Rgb888) {
        (**self).render(index, color)
    }

    fn all_off(&mut self) {
        (**self).all_off()
    }

    fn fill(&mut self, color: NamedColor, blink: BlinkMode) {
        (**self).fill(color, blink)
    }
}

/// The four modes that own an LED pattern and a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKey {
    Rain,
    Wind,
    Hour,
    Pollution,
}

impl ModeKey {
    pub const ALL: [ModeKey; 4] = [Self::Rain, Self::Wind, Self::Hour, Self::Pollution];

    pub const fn index(self) -> usize {
        match self {
            Self::Rain => 0,
            Self::Wind => 1,
            Self::Hour => 2,
            Self::Pollution => 3,
        }
    }

    /// Next mode in the fixed cycle; `None` after pollution means summary.
    pub const fn next(self) -> Option<ModeKey> {
        match self {
            Self::Rain => Some(Self::Wind),
            Self::Wind => Some(Self::Hour),
            Self::Hour => Some(Self::Pollution),
            Self::Pollution => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Rain => "rain",
            Self::Wind => "wind",
            Self::Hour => "hour",
            Self::Pollution => "pollution",
        }
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
