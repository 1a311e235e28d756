//! The dialog controller.
//!
//! [`DialogController`] owns the session: it turns button events into floor
//! commits, stepper actions and the exit gesture, runs the entry action of
//! each dialog state, and drives the LED and speech capabilities it was built
//! with.
//!
//! Nothing in here blocks or reads a clock. Every entry point takes the
//! current [`Instant`]; long-press countdowns and delayed re-dispatches are
//! deadlines that fire from [`DialogController::poll`]. The runner is
//! expected to:
//!
//! - feed button events through [`DialogController::handle_event`],
//! - call [`DialogController::poll`] no later than
//!   [`DialogController::next_deadline`],
//! - call [`DialogController::on_speech_finished`] when narration ends.

mod state;
mod tester;

pub use state::{DialogState, SessionStatus, SessionView};

use embassy_time::{Duration, Instant};
use log::{debug, info, warn};

use crate::buttons::{ButtonId, ButtonRegistry, InputEvent};
use crate::config::DialogConfig;
use crate::error::DialogError;
use crate::exit_gesture::ExitGestureTracker;
use crate::gesture::{FloorCommit, FloorPair, GestureDetector, GroundState};
use crate::leds::store::{StepOutcome, blank_floor};
use crate::leds::{LedDriver, LedMapper, ModeKey, ModeLedStore};
use crate::narration;
use crate::speech::{SPEECH_LOG_TARGET, SpeechEngine};
use crate::timer::DeferredQueue;

/// Delayed re-dispatches that may be pending at once.
const DEFERRED_DEPTH: usize = 4;

pub struct DialogController<L, S>
where
    L: LedDriver,
    S: SpeechEngine,
{
    config: DialogConfig,
    leds: L,
    speech: S,
    status: SessionStatus,
    current: Option<DialogState>,
    target: Option<DialogState>,
    buttons: ButtonRegistry,
    ground: GroundState,
    gestures: GestureDetector,
    store: ModeLedStore,
    exit: ExitGestureTracker,
    deferred: DeferredQueue<DEFERRED_DEPTH>,
}

impl<L, S> DialogController<L, S>
where
    L: LedDriver,
    S: SpeechEngine,
{
    pub fn new(config: DialogConfig, leds: L, speech: S) -> Self {
        let gestures = GestureDetector::new(config.long_press());
        let exit = ExitGestureTracker::new(config.exit_press_count, config.exit_window());
        Self {
            config,
            leds,
            speech,
            status: SessionStatus::NotStarted,
            current: None,
            target: None,
            buttons: ButtonRegistry::new(),
            ground: GroundState::default(),
            gestures,
            store: ModeLedStore::new(),
            exit,
            deferred: DeferredQueue::new(),
        }
    }

    // ------------------------------------------------------------------
    // Session control
    // ------------------------------------------------------------------

    /// Begin a new session from scratch and run the first state.
    pub fn start(&mut self, now: Instant) {
        self.status = SessionStatus::AwaitingInput;
        self.current = None;
        self.ground = GroundState::default();
        self.gestures.reset();
        self.store.reset();
        self.exit.reset();
        self.deferred.clear();
        self.leds.all_off();

        info!("dialog started: long-press button pairs 1&2, 3&4 or 5&6 to begin");
        self.target = Some(DialogState::Initialisation);
        self.dispatch(now);
    }

    /// Run the entry action of the target state, if the guards allow it.
    ///
    /// Guard failures are logged and otherwise ignored.
    pub fn dispatch(&mut self, now: Instant) {
        if let Err(err) = self.try_dispatch(now) {
            warn!("{}", err);
        }
    }

    /// [`dispatch`](Self::dispatch), reporting which guard failed.
    pub fn try_dispatch(&mut self, now: Instant) -> Result<(), DialogError> {
        let state = self.check_guards()?;
        self.current = Some(state);
        debug!("entering {}", state);
        self.enter(state, now);
        Ok(())
    }

    /// Re-dispatch now, or after `delay`.
    pub fn advance(&mut self, delay: Duration, now: Instant) {
        if delay.as_ticks() == 0 {
            self.dispatch(now);
        } else if !self.deferred.schedule(now, delay) {
            warn!("too many delayed transitions pending, dropping one");
        }
    }

    /// Narration ended.
    ///
    /// Continues if the current state asked to, and retries a transition
    /// that was turned away because speech was still playing.
    pub fn on_speech_finished(&mut self, now: Instant) {
        info!(target: SPEECH_LOG_TARGET, "speech ended");
        if self.status == SessionStatus::AwaitingContinuation {
            self.status = SessionStatus::AwaitingInput;
            self.advance(Duration::from_ticks(0), now);
        } else if self.status.accepts_input() && self.target != self.current {
            debug!("retrying transition held back by speech");
            self.dispatch(now);
        }
    }

    /// Feed one button event.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) {
        if !self.status.accepts_input() {
            self.buttons.apply(event);
            let err = if self.status.is_started() {
                DialogError::InputRejected
            } else {
                DialogError::NotStarted
            };
            warn!("{}, ignoring {:?}", err, event);
            return;
        }
        match event {
            InputEvent::Pressed(button) => self.on_press(button, now),
            InputEvent::Released(button) => self.on_release(button, now),
        }
    }

    /// Fire every timer due at `now`, earliest first.
    pub fn poll(&mut self, now: Instant) {
        loop {
            let gesture = self.gestures.next_deadline().filter(|d| *d <= now);
            let deferred = self.deferred.next_deadline().filter(|d| *d <= now);
            match (gesture, deferred) {
                (None, None) => break,
                (Some(g), Some(d)) if d < g => self.fire_deferred(now),
                (None, Some(_)) => self.fire_deferred(now),
                (Some(_), _) => {
                    if let Some(pair) = self.gestures.poll(&self.buttons, now) {
                        self.commit_floor(pair, now);
                    }
                }
            }
        }
    }

    /// When [`poll`](Self::poll) next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.gestures.next_deadline(), self.deferred.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// State whose entry action ran last.
    pub fn current_state(&self) -> Option<DialogState> {
        self.current
    }

    pub fn target_state(&self) -> Option<DialogState> {
        self.target
    }

    pub fn ground(&self) -> GroundState {
        self.ground
    }

    pub fn store(&self) -> &ModeLedStore {
        &self.store
    }

    pub fn count(&self, mode: ModeKey) -> u8 {
        self.store.count(mode)
    }

    pub fn buttons(&self) -> &ButtonRegistry {
        &self.buttons
    }

    pub fn leds(&self) -> &L {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut L {
        &mut self.leds
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    pub fn speech_mut(&mut self) -> &mut S {
        &mut self.speech
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            current: self.current,
            target: self.target,
            status: self.status,
            speaking: self.speech.is_speaking(),
            floor: self.ground.current,
            last_floor: self.ground.last,
            counts: self.store.counts(),
            exit_presses: self.exit.presses(),
        }
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    fn check_guards(&self) -> Result<DialogState, DialogError> {
        if !self.status.is_started() {
            return Err(DialogError::NotStarted);
        }
        if !self.status.accepts_input() {
            return Err(DialogError::InputRejected);
        }
        if self.speech.is_speaking() {
            return Err(DialogError::Speaking);
        }
        self.target.ok_or(DialogError::EmptyTarget)
    }

    fn enter(&mut self, state: DialogState, now: Instant) {
        match state {
            DialogState::Initialisation => {
                self.leds.all_off();
                info!("initialisation done");
                self.status = SessionStatus::AwaitingInput;
                self.target = Some(DialogState::WaitingForGround);
                self.advance(Duration::from_ticks(0), now);
            }
            DialogState::WaitingForGround => {
                info!("waiting for long press on button pairs 1&2, 3&4 or 5&6");
            }
            DialogState::Welcome => {
                if let Some(floor) = self.ground.current {
                    info!("welcome, pair {} long-pressed", floor);
                }
                self.say(narration::WELCOME);
                self.status = SessionStatus::AwaitingContinuation;
                self.target = Some(DialogState::Choose(ModeKey::Rain));
            }
            DialogState::Choose(mode) => {
                info!("{} mode on floor {}", mode, self.mapper().floor());
                if !self.store.is_initialized(mode) {
                    let mapper = self.mapper();
                    blank_floor(&mapper, &mut self.leds);
                    self.store.mark_initialized(mode);
                }
                let line = narration::mode_status(mode, self.ground.current);
                self.say(&line);
                self.status = SessionStatus::AwaitingInput;
            }
            DialogState::Summary => {
                let counts = self.store.counts();
                info!("summary of selections:");
                for mode in ModeKey::ALL {
                    info!("  {} count: {}/10", mode, counts[mode.index()]);
                }
                info!(
                    "press button {} {} times within {} ms to continue",
                    self.config.exit_button,
                    self.config.exit_press_count,
                    self.config.exit_window_ms
                );
                let line = narration::summary(
                    counts,
                    self.config.exit_press_count,
                    self.config.exit_button,
                );
                self.say(&line);
                self.exit.reset();
                self.status = SessionStatus::AwaitingInput;
            }
            DialogState::Final => {
                info!("congratulations, dialog complete");
                self.say(narration::CONGRATULATIONS);
                self.leds
                    .fill(self.config.celebration, self.config.celebration_blink);
                self.exit.reset();
                self.status = SessionStatus::Closed;
            }
        }
    }

    fn say(&mut self, text: &str) {
        info!(target: SPEECH_LOG_TARGET, "{}", text);
        self.speech.speak(text, self.config.voice);
    }

    fn fire_deferred(&mut self, now: Instant) {
        if self.deferred.pop_due(now).is_some() {
            self.dispatch(now);
        }
    }

    /// LED mapping for the active floor.
    fn mapper(&self) -> LedMapper {
        LedMapper::new(self.ground.current)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn is_exit_button(&self, button: ButtonId) -> bool {
        button.get() == self.config.exit_button
    }

    fn on_press(&mut self, button: ButtonId, now: Instant) {
        self.buttons.press(button);

        if let Some(pair) = FloorPair::of_debug_alias(button) {
            if self.status.accepts_input() {
                info!("debug: button {} simulates pair {} long-press", button, pair);
                self.commit_floor(pair, now);
            }
            return;
        }

        if self.target == Some(DialogState::Summary) && self.is_exit_button(button) {
            self.exit.on_press(now);
            return;
        }

        let armed = self
            .gestures
            .on_press(button, &self.buttons, self.ground.current, now);
        if armed.is_some() && self.ground.current.is_none() {
            return;
        }

        self.step(button);
    }

    fn on_release(&mut self, button: ButtonId, now: Instant) {
        self.buttons.release(button);

        if self.target == Some(DialogState::Summary) && self.is_exit_button(button) {
            if self.exit.on_release() {
                self.target = Some(DialogState::Final);
                self.advance(Duration::from_ticks(0), now);
            }
            return;
        }

        self.gestures.on_release(button);
    }

    /// Stepper action for `button`, if it is a stepper on the active floor.
    ///
    /// Only acts once the choose state's entry action has run, so the
    /// floor is never blanked under a window that still counts lit slots.
    fn step(&mut self, button: ButtonId) {
        let (Some(floor), Some(mode)) = (
            self.ground.current,
            self.current.and_then(DialogState::mode),
        ) else {
            return;
        };
        let (minus, plus) = floor.stepper_buttons();
        if button != minus && button != plus {
            return;
        }
        if self.target != self.current {
            debug!(
                "stepper ignored, {:?} not entered yet",
                self.target.map(DialogState::name)
            );
            return;
        }
        let mapper = self.mapper();
        let outcome = if button == plus {
            let on = self.config.led_on.rgb();
            self.store.increment(mode, &mapper, &mut self.leds, on)
        } else if button == minus {
            self.store.decrement(mode, &mapper, &mut self.leds)
        } else {
            return;
        };
        if outcome == StepOutcome::Unchanged {
            debug!("stepper on {} had nothing to change", mode);
        }
    }

    /// Act on a completed long-press (or its debug alias).
    fn commit_floor(&mut self, pair: FloorPair, now: Instant) {
        if !self.status.accepts_input() {
            debug!("long-press on pair {} ignored, input not accepted", pair);
            return;
        }

        match (self.ground.classify(pair), self.target) {
            (FloorCommit::Initial(pair), Some(DialogState::WaitingForGround)) => {
                self.ground.commit(pair);
                self.target = Some(DialogState::Welcome);
                self.dispatch(now);
            }
            (FloorCommit::Repeat(pair), Some(DialogState::Choose(_))) => {
                info!("same pair {} long-pressed again, ignoring", pair);
            }
            (FloorCommit::Switch { from, to }, Some(DialogState::Choose(mode))) => {
                self.switch_floor(mode, from, to, now);
            }
            (_, target) => {
                debug!(
                    "long-press on pair {} ignored in state {:?}",
                    pair,
                    target.map(DialogState::name)
                );
            }
        }
    }

    fn switch_floor(&mut self, mode: ModeKey, from: FloorPair, to: FloorPair, now: Instant) {
        info!("floor switch: pair {} to pair {}", from, to);

        self.store.save(mode);
        blank_floor(&LedMapper::new(Some(from)), &mut self.leds);
        self.ground.commit(to);

        let next = DialogState::Choose(mode)
            .after_floor_switch()
            .unwrap_or(DialogState::Summary);
        self.target = Some(next);

        if let Some(next_mode) = next.mode() {
            let mapper = self.mapper();
            let on = self.config.led_on.rgb();
            self.store.restore(next_mode, &mapper, &mut self.leds, on);
        }

        self.dispatch(now);
    }
}
