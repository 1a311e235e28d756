//! Installation wiring and tunable timing.
//!
//! Fixed wiring (which buttons form a floor, which buttons step the LEDs on
//! each floor) lives in constants so it can be checked in one place. Timing
//! and colours that an operator may want to tune live in [`DialogConfig`].

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::leds::{BlinkMode, NamedColor};
use crate::speech::VoicePreset;

/// Number of buttons on the panel (identifiers 0-9).
pub const BUTTON_COUNT: usize = 10;

/// Number of floors (button pairs).
pub const FLOOR_COUNT: usize = 3;

/// LEDs in one floor's window.
pub const LEDS_PER_FLOOR: usize = 10;

/// LEDs on the physical strip.
pub const PHYSICAL_LED_COUNT: usize = LEDS_PER_FLOOR * FLOOR_COUNT;

/// Members of each floor pair, indexed by `floor - 1`.
///
/// The three pairs partition buttons 1-6.
pub const PAIR_BUTTONS: [[u8; 2]; FLOOR_COUNT] = [[1, 2], [3, 4], [5, 6]];

/// Debug buttons that commit a floor without holding its pair, indexed by `floor - 1`.
pub const DEBUG_ALIAS_BUTTONS: [u8; FLOOR_COUNT] = [7, 8, 9];

/// Stepper buttons `(minus, plus)` while a floor is active, indexed by `floor - 1`.
///
/// The stepper always sits on a pair that is not the active floor.
pub const STEPPER_BUTTONS: [(u8, u8); FLOOR_COUNT] = [(5, 6), (1, 2), (3, 4)];

/// Runtime configuration for a dialog session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DialogConfig {
    /// How long both members of a pair must be held to commit a floor.
    pub long_press_ms: u64,
    /// Window, measured from the first press, for the exit gesture.
    pub exit_window_ms: u64,
    /// Presses needed within the window to leave the summary.
    pub exit_press_count: u8,
    /// Button used for the exit gesture.
    pub exit_button: u8,
    /// Colour of a lit stepper LED.
    pub led_on: NamedColor,
    /// Colour shown on every LED when the dialog ends.
    pub celebration: NamedColor,
    pub celebration_blink: BlinkMode,
    pub voice: VoicePreset,
    /// Narration pace for engines that estimate speech length.
    pub speech_ms_per_word: u64,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 3000,
            exit_window_ms: 3000,
            exit_press_count: 4,
            exit_button: 0,
            led_on: NamedColor::White,
            celebration: NamedColor::Green,
            celebration_blink: BlinkMode::Slow,
            voice: VoicePreset::Normal,
            speech_ms_per_word: 350,
        }
    }
}

impl DialogConfig {
    pub const fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub const fn exit_window(&self) -> Duration {
        Duration::from_millis(self.exit_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_partition_six_buttons() {
        let mut seen = [false; BUTTON_COUNT];
        for pair in PAIR_BUTTONS {
            for button in pair {
                assert!(!seen[button as usize], "button {button} is in two pairs");
                seen[button as usize] = true;
            }
        }
        assert_eq!(seen.iter().filter(|s| **s).count(), 6);
        assert!(!seen[0] && !seen[7] && !seen[8] && !seen[9]);
    }

    #[test]
    fn test_stepper_never_on_active_floor() {
        for (floor, (minus, plus)) in STEPPER_BUTTONS.iter().enumerate() {
            assert!(!PAIR_BUTTONS[floor].contains(minus));
            assert!(!PAIR_BUTTONS[floor].contains(plus));
        }
    }

    #[test]
    fn test_default_timing() {
        let config = DialogConfig::default();
        assert_eq!(config.long_press().as_millis(), 3000);
        assert_eq!(config.exit_window().as_millis(), 3000);
        assert_eq!(config.exit_press_count, 4);
        assert_eq!(config.exit_button, 0);
    }

    #[test]
    fn test_partial_overrides_keep_defaults() {
        let config = DialogConfig {
            long_press_ms: 1500,
            ..DialogConfig::default()
        };
        assert_eq!(config.long_press().as_millis(), 1500);
        assert_eq!(config.celebration, NamedColor::Green);
        assert_eq!(config.speech_ms_per_word, 350);
    }
}
