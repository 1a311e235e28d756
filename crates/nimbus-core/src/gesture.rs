//! Floor detection from sustained pair holds.
//!
//! Buttons 1-6 form three pairs, one per floor. Holding both members of a
//! pair that is not the current floor arms a per-pair countdown; releasing
//! either member cancels it. When the countdown expires with both members
//! still held, the detector reports a long-press for that pair.
//!
//! ```text
//!   press 3 ─┐        press 4 ─┐ arm(2)        deadline ─┐
//!            ▼                 ▼                         ▼
//!   ─────────●─────────────────●──────── 3000 ms ────────● LongPress(Two)
//!                                  release 3 ─► cancel(2)
//! ```

use core::fmt;

use embassy_time::{Duration, Instant};
use log::{debug, info};

use crate::buttons::{ButtonId, ButtonRegistry};
use crate::config::{DEBUG_ALIAS_BUTTONS, FLOOR_COUNT, PAIR_BUTTONS, STEPPER_BUTTONS};
use crate::error::DialogError;
use crate::timer::Countdown;

/// One of the three floors, each selected by holding a button pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloorPair {
    One,
    Two,
    Three,
}

impl FloorPair {
    pub const ALL: [FloorPair; FLOOR_COUNT] = [Self::One, Self::Two, Self::Three];

    /// Zero-based index into the wiring tables.
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
        }
    }

    /// Floor number as shown to people, 1-3.
    pub const fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// The two buttons that must be held together to select this floor.
    pub fn members(self) -> [ButtonId; 2] {
        PAIR_BUTTONS[self.index()].map(button)
    }

    /// The pair `button` belongs to, if any.
    pub fn of_button(button: ButtonId) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|pair| PAIR_BUTTONS[pair.index()].contains(&button.get()))
    }

    /// The floor a debug alias button stands in for.
    pub fn of_debug_alias(button: ButtonId) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|pair| DEBUG_ALIAS_BUTTONS[pair.index()] == button.get())
    }

    /// Stepper buttons `(minus, plus)` while this floor is active.
    pub fn stepper_buttons(self) -> (ButtonId, ButtonId) {
        let (minus, plus) = STEPPER_BUTTONS[self.index()];
        (button(minus), button(plus))
    }
}

impl TryFrom<u8> for FloorPair {
    type Error = DialogError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(DialogError::InvalidFloor(other)),
        }
    }
}

impl fmt::Display for FloorPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

// Wiring tables only hold identifiers 0-9.
fn button(raw: u8) -> ButtonId {
    ButtonId::new(raw).unwrap_or_else(|| unreachable!("wiring table holds button {}", raw))
}

/// Which floor is active, and which floor last completed a long-press.
///
/// `current` is `None` only until the first long-press of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroundState {
    pub current: Option<FloorPair>,
    pub last: Option<FloorPair>,
}

/// How a committed long-press relates to the ground state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorCommit {
    /// First floor of the session.
    Initial(FloorPair),
    /// The last committed floor was long-pressed again.
    Repeat(FloorPair),
    /// A different floor was long-pressed.
    Switch { from: FloorPair, to: FloorPair },
}

impl GroundState {
    pub fn classify(&self, pair: FloorPair) -> FloorCommit {
        match (self.current, self.last) {
            (None, _) => FloorCommit::Initial(pair),
            (Some(_), Some(last)) if last == pair => FloorCommit::Repeat(pair),
            (Some(current), _) => FloorCommit::Switch {
                from: current,
                to: pair,
            },
        }
    }

    pub fn commit(&mut self, pair: FloorPair) {
        self.current = Some(pair);
        self.last = Some(pair);
    }
}

/// Arms, cancels and fires the per-pair long-press countdowns.
#[derive(Debug, Clone)]
pub struct GestureDetector {
    threshold: Duration,
    timers: [Countdown; FLOOR_COUNT],
}

impl GestureDetector {
    pub const fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            timers: [Countdown::idle(); FLOOR_COUNT],
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Cancel every pending countdown.
    pub fn reset(&mut self) {
        self.timers = [Countdown::idle(); FLOOR_COUNT];
    }

    /// React to a press already recorded in `registry`.
    ///
    /// Arms (or re-arms) the countdown of the pressed button's pair when that
    /// pair is not the current floor and both of its members are now held.
    /// Returns the armed pair.
    pub fn on_press(
        &mut self,
        button: ButtonId,
        registry: &ButtonRegistry,
        current: Option<FloorPair>,
        now: Instant,
    ) -> Option<FloorPair> {
        let pair = FloorPair::of_button(button)?;
        if current == Some(pair) || !registry.all_pressed(&pair.members()) {
            return None;
        }
        self.timers[pair.index()].arm(now, self.threshold);
        debug!(
            "pair {} held, long-press due in {} ms",
            pair,
            self.threshold.as_millis()
        );
        Some(pair)
    }

    /// React to a release. Cancels the released button's pair countdown if
    /// one is pending and returns that pair.
    pub fn on_release(&mut self, button: ButtonId) -> Option<FloorPair> {
        let pair = FloorPair::of_button(button)?;
        if self.timers[pair.index()].cancel() {
            info!(
                "pair {} timer cancelled, button {} released before {} ms",
                pair,
                button,
                self.threshold.as_millis()
            );
            Some(pair)
        } else {
            None
        }
    }

    pub fn is_pending(&self, pair: FloorPair) -> bool {
        self.timers[pair.index()].is_armed()
    }

    /// Earliest pending countdown.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().filter_map(Countdown::deadline).min()
    }

    /// Fire the earliest expired countdown.
    ///
    /// A countdown whose pair is no longer fully held is discarded silently
    /// and the next one is tried. Returns the pair of a valid long-press.
    pub fn poll(&mut self, registry: &ButtonRegistry, now: Instant) -> Option<FloorPair> {
        loop {
            let pair = FloorPair::ALL
                .into_iter()
                .filter(|pair| {
                    self.timers[pair.index()]
                        .deadline()
                        .is_some_and(|deadline| deadline <= now)
                })
                .min_by_key(|pair| self.timers[pair.index()].deadline())?;

            self.timers[pair.index()].take_if_due(now);
            if registry.all_pressed(&pair.members()) {
                info!(
                    "pair {} long-pressed ({} ms threshold reached)",
                    pair,
                    self.threshold.as_millis()
                );
                return Some(pair);
            }
            debug!("stale long-press for pair {} discarded", pair);
        }
    }
}
