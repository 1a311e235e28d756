//! Lines spoken by the dialog.

use core::fmt::Write;

use crate::gesture::FloorPair;
use crate::leds::ModeKey;
use crate::leds::store::MAX_COUNT;

/// Longest line the dialog speaks.
pub type Line = heapless::String<128>;

pub const WELCOME: &str = "Welcome! Let's choose the rain.";

pub const CONGRATULATIONS: &str = "Congratulations! You have reached the end!";

/// Status line spoken on entering a mode.
pub fn mode_status(mode: ModeKey, floor: Option<FloorPair>) -> Line {
    let mut line = Line::new();
    let prefix = if mode == ModeKey::Rain {
        "You are in"
    } else {
        "Now in"
    };
    let _ = match floor {
        Some(floor) => write!(line, "{prefix} {mode} mode on floor {floor}."),
        None => write!(line, "{prefix} {mode} mode."),
    };
    line
}

/// Summary line with every counter, ending with the exit instructions.
pub fn summary(counts: [u8; 4], exit_presses: u8, exit_button: u8) -> Line {
    let mut line = Line::new();
    let _ = write!(
        line,
        "Rain {}, wind {}, hour {}, pollution {}, out of {}. Press button {} {} times to finish.",
        counts[0], counts[1], counts[2], counts[3], MAX_COUNT, exit_button, exit_presses
    );
    line
}
