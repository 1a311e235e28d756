//! Canned LED demos for checking the strip by hand.

use embedded_graphics::pixelcolor::Rgb888;
use log::{info, warn};

use super::DialogController;
use crate::leds::{BlinkMode, LedDriver, NamedColor};
use crate::speech::SpeechEngine;

/// Colours of the first five LEDs in demo 4.
const SAMPLE_COLORS: [Rgb888; 5] = [
    Rgb888::new(255, 100, 100),
    Rgb888::new(0, 100, 170),
    Rgb888::new(0, 0, 170),
    Rgb888::new(150, 170, 70),
    Rgb888::new(200, 160, 0),
];

impl<L, S> DialogController<L, S>
where
    L: LedDriver,
    S: SpeechEngine,
{
    /// Run LED demo `n`. Leaves the dialog untouched.
    ///
    /// | n | effect                         |
    /// |---|--------------------------------|
    /// | 1 | whole strip yellow, steady     |
    /// | 2 | whole strip green, slow blink  |
    /// | 3 | whole strip pink, fast blink   |
    /// | 4 | first five LEDs in sample hues |
    pub fn run_tester(&mut self, n: u8) {
        info!("tester: button {}", n);
        let leds = self.leds_mut();
        match n {
            1 => leds.fill(NamedColor::Yellow, BlinkMode::Steady),
            2 => leds.fill(NamedColor::Green, BlinkMode::Slow),
            3 => leds.fill(NamedColor::Pink, BlinkMode::Fast),
            4 => {
                for (index, color) in SAMPLE_COLORS.into_iter().enumerate() {
                    leds.render(index, color);
                }
            }
            _ => warn!("tester: no action defined for button {}", n),
        }
    }
}
