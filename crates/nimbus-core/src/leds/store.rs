//! Per-mode LED patterns and the local LED stepper.
//!
//! One logical window is live at a time, belonging to the active mode. When
//! the visitor switches floor, the live window is saved into the outgoing
//! mode's snapshot and the incoming mode's snapshot becomes the live window,
//! re-rendered onto the new floor.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::{debug, info, warn};

use super::{LedDriver, LedMapper, ModeKey};
use crate::config::LEDS_PER_FLOOR;

/// Upper bound of every mode counter.
pub const MAX_COUNT: u8 = LEDS_PER_FLOOR as u8;

/// Saved state of one mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeSnapshot {
    pub count: u8,
    pub pattern: [bool; LEDS_PER_FLOOR],
    pub initialized: bool,
}

/// Result of a stepper action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The LED at this logical slot changed.
    Changed { slot: usize, count: u8 },
    /// Window already full (for `+`) or empty (for `-`).
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct ModeLedStore {
    window: [bool; LEDS_PER_FLOOR],
    modes: [ModeSnapshot; 4],
}

impl ModeLedStore {
    pub const fn new() -> Self {
        Self {
            window: [false; LEDS_PER_FLOOR],
            modes: [ModeSnapshot {
                count: 0,
                pattern: [false; LEDS_PER_FLOOR],
                initialized: false,
            }; 4],
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The live logical window.
    pub fn window(&self) -> &[bool; LEDS_PER_FLOOR] {
        &self.window
    }

    pub fn snapshot(&self, mode: ModeKey) -> &ModeSnapshot {
        &self.modes[mode.index()]
    }

    pub fn count(&self, mode: ModeKey) -> u8 {
        self.modes[mode.index()].count
    }

    /// All four counters in cycle order.
    pub fn counts(&self) -> [u8; 4] {
        ModeKey::ALL.map(|mode| self.count(mode))
    }

    pub fn is_initialized(&self, mode: ModeKey) -> bool {
        self.modes[mode.index()].initialized
    }

    pub fn mark_initialized(&mut self, mode: ModeKey) {
        self.modes[mode.index()].initialized = true;
    }

    /// Light the first unlit logical slot and bump the mode counter.
    pub fn increment<D: LedDriver>(
        &mut self,
        mode: ModeKey,
        mapper: &LedMapper,
        driver: &mut D,
        on: Rgb888,
    ) -> StepOutcome {
        let Some(slot) = self.window.iter().position(|lit| !lit) else {
            return StepOutcome::Unchanged;
        };
        self.window[slot] = true;
        render_logical(mapper, driver, slot, on);

        let entry = &mut self.modes[mode.index()];
        entry.count = (entry.count + 1).min(MAX_COUNT);
        info!("{} count: {}/{}", mode, entry.count, MAX_COUNT);
        debug!("stepper +: local LED {} on", slot);
        StepOutcome::Changed {
            slot,
            count: entry.count,
        }
    }

    /// Turn off the last lit logical slot and lower the mode counter.
    pub fn decrement<D: LedDriver>(
        &mut self,
        mode: ModeKey,
        mapper: &LedMapper,
        driver: &mut D,
    ) -> StepOutcome {
        let Some(slot) = self.window.iter().rposition(|lit| *lit) else {
            return StepOutcome::Unchanged;
        };
        self.window[slot] = false;
        render_logical(mapper, driver, slot, Rgb888::BLACK);

        let entry = &mut self.modes[mode.index()];
        entry.count = entry.count.saturating_sub(1);
        info!("{} count: {}/{}", mode, entry.count, MAX_COUNT);
        debug!("stepper -: local LED {} off, window {:?}", slot, self.window);
        StepOutcome::Changed {
            slot,
            count: entry.count,
        }
    }

    /// Copy the live window into `mode`'s snapshot.
    pub fn save(&mut self, mode: ModeKey) {
        self.modes[mode.index()].pattern = self.window;
        debug!("saved {} pattern {:?}", mode, self.window);
    }

    /// Make `mode`'s snapshot the live window and draw it on `mapper`'s floor.
    pub fn restore<D: LedDriver>(
        &mut self,
        mode: ModeKey,
        mapper: &LedMapper,
        driver: &mut D,
        on: Rgb888,
    ) {
        self.window = self.modes[mode.index()].pattern;
        for (slot, lit) in self.window.iter().enumerate() {
            let color = if *lit { on } else { Rgb888::BLACK };
            render_logical(mapper, driver, slot, color);
        }
        debug!("restored {} pattern onto floor {}", mode, mapper.floor());
    }
}

/// Turn off every physical LED of `mapper`'s floor.
pub fn blank_floor<D: LedDriver>(mapper: &LedMapper, driver: &mut D) {
    for physical in mapper.range() {
        driver.render(physical, Rgb888::BLACK);
    }
}

/// Render one logical slot. Invalid slots are logged and skipped.
pub fn render_logical<D: LedDriver>(
    mapper: &LedMapper,
    driver: &mut D,
    slot: usize,
    color: Rgb888,
) {
    match mapper.physical(slot) {
        Ok(physical) => driver.render(physical, color),
        Err(err) => warn!("{}", err),
    }
}
