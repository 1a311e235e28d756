//! End-to-end dialog sessions driven through the public API.
//!
//! Every test feeds button events through the input queue with explicit
//! timestamps, the same way a runner does, and checks what the strip and the
//! speech engine were told.

use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use nimbus_core::input::{InputQueue, drain_input, submit};
use nimbus_core::{
    BlinkMode, ButtonId, DialogConfig, DialogController, DialogError, DialogState, FloorPair,
    InputEvent, LedDriver, ModeKey, NamedColor, SessionStatus, SpeechEngine, VoicePreset,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Strip that remembers every LED and every whole-strip fill.
struct RecordingLeds {
    leds: [Rgb888; 30],
    fills: Vec<(NamedColor, BlinkMode)>,
}

impl RecordingLeds {
    fn new() -> Self {
        Self {
            leds: [Rgb888::BLACK; 30],
            fills: Vec::new(),
        }
    }

    fn lit(&self) -> Vec<usize> {
        self.leds
            .iter()
            .enumerate()
            .filter(|(_, color)| **color != Rgb888::BLACK)
            .map(|(index, _)| index)
            .collect()
    }
}

impl LedDriver for RecordingLeds {
    fn render(&mut self, index: usize, color: Rgb888) {
        self.leds[index] = color;
    }

    fn all_off(&mut self) {
        self.leds = [Rgb888::BLACK; 30];
    }

    fn fill(&mut self, color: NamedColor, blink: BlinkMode) {
        self.leds = [color.rgb(); 30];
        self.fills.push((color, blink));
    }
}

/// Speech engine that keeps talking until the test says otherwise.
#[derive(Default)]
struct ScriptedSpeech {
    speaking: bool,
    spoken: Vec<(String, VoicePreset)>,
}

impl SpeechEngine for ScriptedSpeech {
    fn speak(&mut self, text: &str, voice: VoicePreset) {
        self.speaking = true;
        self.spoken.push((text.to_string(), voice));
    }

    fn is_speaking(&self) -> bool {
        self.speaking
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Session {
    queue: InputQueue,
    dialog: DialogController<RecordingLeds, ScriptedSpeech>,
    clock: u64,
}

impl Session {
    fn new() -> Self {
        Self::with_config(DialogConfig::default())
    }

    fn with_config(config: DialogConfig) -> Self {
        Self {
            queue: InputQueue::new(),
            dialog: DialogController::new(config, RecordingLeds::new(), ScriptedSpeech::default()),
            clock: 0,
        }
    }

    fn now(&self) -> Instant {
        Instant::from_millis(self.clock)
    }

    /// Move the clock forward and fire whatever fell due.
    fn wait(&mut self, ms: u64) {
        self.clock += ms;
        let now = self.now();
        self.dialog.poll(now);
    }

    fn send(&mut self, event: InputEvent) {
        submit(&self.queue, event).unwrap();
        let now = self.now();
        drain_input(&self.queue, &mut self.dialog, now);
    }

    fn press(&mut self, raw: u8) {
        self.send(InputEvent::Pressed(ButtonId::new(raw).unwrap()));
    }

    fn release(&mut self, raw: u8) {
        self.send(InputEvent::Released(ButtonId::new(raw).unwrap()));
    }

    fn tap(&mut self, raw: u8) {
        self.press(raw);
        self.wait(80);
        self.release(raw);
        self.wait(80);
    }

    /// Hold both buttons for `ms`, then let go.
    fn hold_pair(&mut self, a: u8, b: u8, ms: u64) {
        self.press(a);
        self.press(b);
        self.wait(ms);
        self.release(a);
        self.release(b);
    }

    fn finish_speech(&mut self) {
        self.dialog.speech_mut().speaking = false;
        let now = self.now();
        self.dialog.on_speech_finished(now);
    }

    fn state(&self) -> Option<DialogState> {
        self.dialog.current_state()
    }

    fn last_line(&self) -> &str {
        self.dialog
            .speech()
            .spoken
            .last()
            .map(|(line, _)| line.as_str())
            .unwrap_or("")
    }

    /// From a fresh start to choose-rain on floor 1, speech finished.
    fn to_choose_rain() -> Self {
        let mut s = Self::new();
        s.dialog.start(s.now());
        s.hold_pair(1, 2, 3000);
        s.finish_speech();
        s.finish_speech();
        s
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_start_waits_for_ground() {
    let mut s = Session::new();
    s.dialog.start(s.now());

    assert_eq!(s.state(), Some(DialogState::WaitingForGround));
    assert_eq!(s.dialog.status(), SessionStatus::AwaitingInput);
    assert!(s.dialog.leds().lit().is_empty());
}

#[test]
fn test_long_press_welcomes_then_chooses_rain() {
    let mut s = Session::new();
    s.dialog.start(s.now());

    s.hold_pair(1, 2, 3000);
    assert_eq!(s.state(), Some(DialogState::Welcome));
    assert_eq!(s.dialog.ground().current, Some(FloorPair::One));
    assert_eq!(s.last_line(), "Welcome! Let's choose the rain.");

    s.finish_speech();
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Rain)));
    assert_eq!(s.last_line(), "You are in rain mode on floor 1.");
    assert_eq!(s.dialog.speech().spoken[0].1, VoicePreset::Normal);
}

#[test]
fn test_early_release_commits_nothing() {
    let mut s = Session::new();
    s.dialog.start(s.now());

    s.hold_pair(3, 4, 2999);
    s.wait(5000);
    assert_eq!(s.dialog.ground().current, None);
    assert_eq!(s.state(), Some(DialogState::WaitingForGround));
    assert_eq!(s.dialog.next_deadline(), None);
}

#[test]
fn test_countdown_starts_when_pair_completes() {
    let mut s = Session::new();
    s.dialog.start(s.now());

    s.press(5);
    s.wait(2000);
    s.press(6);
    s.wait(2999);
    assert_eq!(s.dialog.ground().current, None);
    s.wait(1);
    assert_eq!(s.dialog.ground().current, Some(FloorPair::Three));
}

#[test]
fn test_five_steps_light_first_five_leds() {
    let mut s = Session::to_choose_rain();
    for _ in 0..5 {
        s.tap(6);
    }

    assert_eq!(s.dialog.count(ModeKey::Rain), 5);
    assert_eq!(s.dialog.leds().lit(), vec![0, 1, 2, 3, 4]);
    assert!(s.dialog.leds().leds[0..5].iter().all(|led| *led == Rgb888::WHITE));
}

#[test]
fn test_counts_stay_in_bounds() {
    let mut s = Session::to_choose_rain();
    s.tap(5);
    assert_eq!(s.dialog.count(ModeKey::Rain), 0);

    for _ in 0..12 {
        s.tap(6);
    }
    assert_eq!(s.dialog.count(ModeKey::Rain), 10);
    assert_eq!(s.dialog.leds().lit(), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_switch_floor_moves_to_wind_on_blank_floor() {
    let mut s = Session::to_choose_rain();
    for _ in 0..3 {
        s.tap(6);
    }

    s.hold_pair(3, 4, 3000);
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Wind)));
    assert_eq!(s.dialog.ground().current, Some(FloorPair::Two));
    assert_eq!(s.last_line(), "Now in wind mode on floor 2.");
    assert!(s.dialog.leds().lit().is_empty());
    assert_eq!(s.dialog.count(ModeKey::Rain), 3);

    // Floor 2 steps with 1 (minus) and 2 (plus), on LEDs 10-19.
    s.finish_speech();
    s.tap(2);
    s.tap(2);
    assert_eq!(s.dialog.leds().lit(), vec![10, 11]);
    assert_eq!(s.dialog.count(ModeKey::Wind), 2);
    s.tap(1);
    assert_eq!(s.dialog.leds().lit(), vec![10]);
}

#[test]
fn test_same_pair_again_is_a_no_op() {
    let mut s = Session::to_choose_rain();
    s.tap(6);
    let spoken = s.dialog.speech().spoken.len();

    s.hold_pair(1, 2, 3500);
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Rain)));
    assert_eq!(s.dialog.speech().spoken.len(), spoken);
    assert_eq!(s.dialog.leds().lit(), vec![0]);
}

#[test]
fn test_debug_aliases_walk_to_summary() {
    let mut s = Session::to_choose_rain();

    s.tap(8);
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Wind)));
    s.finish_speech();
    s.tap(9);
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Hour)));
    s.finish_speech();
    s.tap(7);
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Pollution)));
    assert_eq!(s.dialog.ground().current, Some(FloorPair::One));
    s.finish_speech();
    s.tap(8);
    assert_eq!(s.state(), Some(DialogState::Summary));
    assert!(s.last_line().starts_with("Rain 0, wind 0, hour 0, pollution 0"));
}

#[test]
fn test_exit_gesture_reaches_final() {
    let mut s = Session::to_choose_rain();
    s.tap(6);
    s.tap(6);
    for alias in [8, 9, 7, 8] {
        s.finish_speech();
        s.tap(alias);
    }
    assert_eq!(s.state(), Some(DialogState::Summary));
    assert!(s.last_line().starts_with("Rain 2, wind 0"));
    s.finish_speech();

    for _ in 0..4 {
        s.tap(0);
    }
    assert_eq!(s.state(), Some(DialogState::Final));
    assert_eq!(s.dialog.status(), SessionStatus::Closed);
    assert_eq!(s.last_line(), "Congratulations! You have reached the end!");
    assert_eq!(
        s.dialog.leds().fills,
        vec![(NamedColor::Green, BlinkMode::Slow)]
    );
    assert_eq!(s.dialog.leds().lit().len(), 30);

    // Closed sessions ignore everything.
    s.finish_speech();
    assert_eq!(s.dialog.try_dispatch(s.now()), Err(DialogError::InputRejected));
    s.tap(6);
    assert_eq!(s.state(), Some(DialogState::Final));

    // Holding a pair while closed arms no long-press.
    s.press(5);
    s.press(6);
    assert_eq!(s.dialog.next_deadline(), None);
    s.wait(3000);
    assert_eq!(s.dialog.ground().current, Some(FloorPair::Two));
    assert!(s.dialog.buttons().is_pressed(ButtonId::new(6).unwrap()));
}

#[test]
fn test_long_press_walk_to_summary() {
    let mut s = Session::to_choose_rain();
    s.tap(6);
    s.tap(6);
    assert_eq!(s.dialog.leds().lit(), vec![0, 1]);

    s.hold_pair(3, 4, 3000);
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Wind)));
    assert!(s.dialog.leds().lit().is_empty());
    s.finish_speech();
    for _ in 0..3 {
        s.tap(2);
    }
    assert_eq!(s.dialog.leds().lit(), vec![10, 11, 12]);

    s.hold_pair(5, 6, 3000);
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Hour)));
    assert_eq!(s.dialog.ground().current, Some(FloorPair::Three));
    assert!(s.dialog.leds().lit().is_empty());
    s.finish_speech();
    s.tap(4);
    assert_eq!(s.dialog.leds().lit(), vec![20]);

    s.hold_pair(1, 2, 3000);
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Pollution)));
    assert_eq!(s.dialog.ground().current, Some(FloorPair::One));
    assert!(s.dialog.leds().lit().is_empty());
    s.finish_speech();
    for _ in 0..4 {
        s.tap(6);
    }
    assert_eq!(s.dialog.leds().lit(), vec![0, 1, 2, 3]);

    s.hold_pair(3, 4, 3000);
    assert_eq!(s.state(), Some(DialogState::Summary));
    assert_eq!(s.dialog.ground().current, Some(FloorPair::Two));
    assert!(s.dialog.leds().lit().is_empty());
    assert_eq!(s.dialog.store().counts(), [2, 3, 1, 4]);
    assert!(
        s.last_line()
            .starts_with("Rain 2, wind 3, hour 1, pollution 4")
    );
}

#[test]
fn test_steps_during_narration_are_ignored() {
    let mut s = Session::new();
    s.dialog.start(s.now());
    s.hold_pair(1, 2, 3000);
    assert_eq!(s.state(), Some(DialogState::Welcome));

    s.tap(6);
    s.tap(6);
    s.tap(6);
    s.finish_speech();
    s.finish_speech();
    assert_eq!(s.dialog.count(ModeKey::Rain), 0);

    s.tap(6);
    assert_eq!(s.dialog.count(ModeKey::Rain), 1);
    assert_eq!(s.dialog.leds().lit(), vec![0]);
}

#[test]
fn test_slow_exit_presses_start_over() {
    let mut s = Session::to_choose_rain();
    for alias in [8, 9, 7, 8] {
        s.finish_speech();
        s.tap(alias);
    }
    s.finish_speech();

    s.tap(0);
    s.tap(0);
    s.tap(0);
    s.wait(3000);
    // Too late: this press opens a new window instead of finishing.
    s.tap(0);
    assert_eq!(s.state(), Some(DialogState::Summary));
    assert_eq!(s.dialog.view().exit_presses, 1);

    s.tap(0);
    s.tap(0);
    s.tap(0);
    assert_eq!(s.state(), Some(DialogState::Final));
}

#[test]
fn test_exit_button_does_nothing_outside_summary() {
    let mut s = Session::to_choose_rain();
    for _ in 0..4 {
        s.tap(0);
    }
    assert_eq!(s.state(), Some(DialogState::Choose(ModeKey::Rain)));
    assert_eq!(s.dialog.view().exit_presses, 0);
}

#[test]
fn test_patterns_survive_round_trip_through_modes() {
    let mut s = Session::to_choose_rain();
    s.tap(6);
    s.tap(6);
    s.tap(8);
    s.finish_speech();

    assert_eq!(s.dialog.store().snapshot(ModeKey::Rain).count, 2);
    assert_eq!(
        &s.dialog.store().snapshot(ModeKey::Rain).pattern[..3],
        &[true, true, false]
    );
    assert_eq!(s.dialog.store().window(), &[false; 10]);
}

#[test]
fn test_restart_clears_session() {
    let mut s = Session::to_choose_rain();
    s.tap(6);
    s.dialog.start(s.now());

    assert_eq!(s.state(), Some(DialogState::WaitingForGround));
    assert_eq!(s.dialog.ground().current, None);
    assert_eq!(s.dialog.count(ModeKey::Rain), 0);
    assert!(s.dialog.leds().lit().is_empty());
}

#[test]
fn test_configured_threshold_and_colours() {
    let config: DialogConfig = DialogConfig {
        long_press_ms: 1000,
        led_on: NamedColor::Yellow,
        ..DialogConfig::default()
    };
    let mut s = Session::with_config(config);
    s.dialog.start(s.now());

    s.hold_pair(5, 6, 1000);
    assert_eq!(s.dialog.ground().current, Some(FloorPair::Three));
    s.finish_speech();
    s.finish_speech();

    // Floor 3 steps with 3 (minus) and 4 (plus), on LEDs 20-29.
    s.tap(4);
    assert_eq!(s.dialog.leds().leds[20], Rgb888::CSS_YELLOW);
}
