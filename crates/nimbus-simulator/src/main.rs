//! Desktop simulator for the nimbus button and LED installation.
//!
//! Renders the 30-LED strip as three rows of ten in an SDL2 window via
//! `embedded-graphics-simulator`, and narrates with a timed stand-in for a
//! speech synthesizer so the whole dialog can be walked without hardware.
//!
//! # Key bindings
//!
//! | Key     | Action                                  |
//! |---------|-----------------------------------------|
//! | 0-9     | Hold / release the matching panel button |
//! | F1-F4   | LED tester demos 1-4                    |
//! | S       | (Re)start the dialog                    |
//! | Q, Esc  | Quit                                    |
//!
//! Set `NIMBUS_CONFIG` to a JSON file to override the dialog configuration.

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyleBuilder};
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{debug, error, info, warn};

use nimbus_core::config::{LEDS_PER_FLOOR, PHYSICAL_LED_COUNT};
use nimbus_core::input::{InputQueue, drain_input, submit};
use nimbus_core::leds::PhysicalLed;
use nimbus_core::{
    BlinkMode, ButtonId, DialogConfig, DialogController, InputEvent, LedDriver, NamedColor,
    SessionView, SpeechEngine, VoicePreset,
};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

const LED_DIAMETER: u32 = 16;
const LED_PITCH: i32 = 22;
const MARGIN: i32 = 12;

const DISPLAY_WIDTH_PX: u32 = (2 * MARGIN + LED_PITCH * LEDS_PER_FLOOR as i32) as u32;
const DISPLAY_HEIGHT_PX: u32 =
    (2 * MARGIN + LED_PITCH * (PHYSICAL_LED_COUNT / LEDS_PER_FLOOR) as i32) as u32;

/// Outline drawn around every LED so unlit ones stay visible.
const LED_OUTLINE: Rgb888 = Rgb888::new(60, 60, 60);

/// Environment variable naming an optional JSON configuration file.
const CONFIG_ENV: &str = "NIMBUS_CONFIG";

/// Extra time every spoken line takes on top of its words.
const SPEECH_TAIL: Duration = Duration::from_millis(400);

/// Button events from the keyboard, drained once per frame.
static INPUT: InputQueue = InputQueue::new();

// ---------------------------------------------------------------------------
// LED strip
// ---------------------------------------------------------------------------

/// In-memory strip drawn into the window every frame.
struct SimLedStrip {
    leds: [Rgb888; PHYSICAL_LED_COUNT],
    /// Half period of an active whole-strip blink, and when it began.
    blink: Option<(Duration, Instant)>,
}

impl SimLedStrip {
    fn new() -> Self {
        Self {
            leds: [Rgb888::BLACK; PHYSICAL_LED_COUNT],
            blink: None,
        }
    }

    /// Colour of `index` as it should appear right now.
    fn visible(&self, index: PhysicalLed) -> Rgb888 {
        if let Some((half_period, since)) = self.blink {
            let phase = since.elapsed().as_millis() / half_period.as_millis().max(1);
            if phase % 2 == 1 {
                return Rgb888::BLACK;
            }
        }
        self.leds[index]
    }

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        for index in 0..PHYSICAL_LED_COUNT {
            let row = (index / LEDS_PER_FLOOR) as i32;
            let column = (index % LEDS_PER_FLOOR) as i32;
            let top_left = Point::new(MARGIN + column * LED_PITCH, MARGIN + row * LED_PITCH);

            let style = PrimitiveStyleBuilder::new()
                .fill_color(self.visible(index))
                .stroke_color(LED_OUTLINE)
                .stroke_width(1)
                .build();
            Circle::new(top_left, LED_DIAMETER)
                .into_styled(style)
                .draw(target)?;
        }
        Ok(())
    }
}

impl LedDriver for SimLedStrip {
    fn render(&mut self, index: PhysicalLed, color: Rgb888) {
        match self.leds.get_mut(index) {
            Some(led) => *led = color,
            None => warn!("LED {} is not on the strip", index),
        }
        self.blink = None;
    }

    fn all_off(&mut self) {
        self.leds = [Rgb888::BLACK; PHYSICAL_LED_COUNT];
        self.blink = None;
    }

    fn fill(&mut self, color: NamedColor, blink: BlinkMode) {
        debug!("strip fill {} (blink code {})", color.label(), blink.code());
        self.leds = [color.rgb(); PHYSICAL_LED_COUNT];
        self.blink = blink
            .half_period_ms()
            .map(|ms| (Duration::from_millis(ms), Instant::now()));
    }
}

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

/// Pretends to speak: a line lasts a fixed time per word.
struct NarrationClock {
    ms_per_word: u64,
    until: Option<Instant>,
}

impl NarrationClock {
    fn new(ms_per_word: u64) -> Self {
        Self {
            ms_per_word,
            until: None,
        }
    }

    /// True once, when the current line has run its course.
    fn take_finished(&mut self) -> bool {
        match self.until {
            Some(until) if Instant::now() >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }
}

impl SpeechEngine for NarrationClock {
    fn speak(&mut self, text: &str, voice: VoicePreset) {
        let words = text.split_whitespace().count() as u64;
        let length = Duration::from_millis(words * self.ms_per_word) + SPEECH_TAIL;
        debug!("narrating {} words as {:?} for {:?}", words, voice, length);
        self.until = Some(Instant::now() + length);
    }

    fn is_speaking(&self) -> bool {
        self.until.is_some()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config() -> DialogConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return DialogConfig::default();
    };

    let parsed: Result<DialogConfig, String> = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => {
            info!("Loaded configuration from {}", path);
            config
        }
        Err(e) => {
            error!("Could not load {} ({}), using defaults", path, e);
            DialogConfig::default()
        }
    }
}

/// Map an SDL keycode to a panel button.
fn keycode_to_button(keycode: Keycode) -> Option<ButtonId> {
    let raw = match keycode {
        Keycode::Num0 | Keycode::Kp0 => 0,
        Keycode::Num1 | Keycode::Kp1 => 1,
        Keycode::Num2 | Keycode::Kp2 => 2,
        Keycode::Num3 | Keycode::Kp3 => 3,
        Keycode::Num4 | Keycode::Kp4 => 4,
        Keycode::Num5 | Keycode::Kp5 => 5,
        Keycode::Num6 | Keycode::Kp6 => 6,
        Keycode::Num7 | Keycode::Kp7 => 7,
        Keycode::Num8 | Keycode::Kp8 => 8,
        Keycode::Num9 | Keycode::Kp9 => 9,
        _ => return None,
    };
    ButtonId::new(raw)
}

fn keycode_to_tester(keycode: Keycode) -> Option<u8> {
    match keycode {
        Keycode::F1 => Some(1),
        Keycode::F2 => Some(2),
        Keycode::F3 => Some(3),
        Keycode::F4 => Some(4),
        _ => None,
    }
}

/// Milliseconds since `epoch` on the controller's clock.
fn dialog_now(epoch: Instant) -> embassy_time::Instant {
    embassy_time::Instant::from_millis(epoch.elapsed().as_millis() as u64)
}

fn queue(event: InputEvent) {
    // A full queue is already logged by `submit`.
    let _ = submit(&INPUT, event);
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting nimbus simulator");
    info!("Keys: 0-9=buttons  F1-F4=LED tester  S=start  Q=Quit");

    let config = load_config();
    let speech = NarrationClock::new(config.speech_ms_per_word);
    let mut dialog = DialogController::new(config, SimLedStrip::new(), speech);

    let mut display =
        SimulatorDisplay::<Rgb888>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Nimbus Simulator", &output_settings);

    let epoch = Instant::now();
    dialog.start(dialog_now(epoch));
    let mut last_view: Option<SessionView> = None;

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = display.clear(Rgb888::BLACK);
    window.update(&display);

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown {
                    keycode, repeat, ..
                } => {
                    if keycode == Keycode::Q || keycode == Keycode::Escape {
                        break 'running;
                    }
                    if repeat {
                        continue;
                    }

                    if let Some(button) = keycode_to_button(keycode) {
                        queue(InputEvent::Pressed(button));
                    } else if let Some(n) = keycode_to_tester(keycode) {
                        dialog.run_tester(n);
                    } else if keycode == Keycode::S {
                        info!("Restarting dialog");
                        dialog.start(dialog_now(epoch));
                    }
                }

                SimulatorEvent::KeyUp { keycode, .. } => {
                    if let Some(button) = keycode_to_button(keycode) {
                        queue(InputEvent::Released(button));
                    }
                }

                _ => {}
            }
        }

        // --- Dialog -------------------------------------------------------
        let now = dialog_now(epoch);
        drain_input(&INPUT, &mut dialog, now);
        if dialog.speech_mut().take_finished() {
            dialog.on_speech_finished(now);
        }
        dialog.poll(now);

        let view = dialog.view();
        if last_view != Some(view) {
            info!("{}", view);
            last_view = Some(view);
        }

        // --- Render -------------------------------------------------------
        let _ = display.clear(Rgb888::BLACK);
        if let Err(e) = dialog.leds().draw(&mut display) {
            error!("Draw error: {:?}", e);
        }
        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
