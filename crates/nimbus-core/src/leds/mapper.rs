//! Logical-to-physical LED translation.

use crate::config::{LEDS_PER_FLOOR, PHYSICAL_LED_COUNT};
use crate::error::DialogError;
use crate::gesture::FloorPair;

/// Index on the physical strip, 0-29.
pub type PhysicalLed = usize;

/// Maps the 10-slot logical window onto the physical range of a floor.
///
/// Floor 1 owns LEDs 0-9, floor 2 owns 10-19 and floor 3 owns 20-29. Before
/// any floor is committed the window falls back to floor 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedMapper {
    floor: Option<FloorPair>,
}

impl LedMapper {
    pub const fn new(floor: Option<FloorPair>) -> Self {
        Self { floor }
    }

    pub fn floor(&self) -> FloorPair {
        self.floor.unwrap_or(FloorPair::One)
    }

    /// Physical index for `logical` on this mapper's floor.
    pub fn physical(&self, logical: usize) -> Result<PhysicalLed, DialogError> {
        if logical >= LEDS_PER_FLOOR {
            return Err(DialogError::InvalidLedIndex(logical));
        }
        let physical = self.floor().index() * LEDS_PER_FLOOR + logical;
        debug_assert!(physical < PHYSICAL_LED_COUNT);
        Ok(physical)
    }

    /// Every physical LED of the floor, in logical order.
    pub fn range(&self) -> core::ops::Range<PhysicalLed> {
        let start = self.floor().index() * LEDS_PER_FLOOR;
        start..start + LEDS_PER_FLOOR
    }
}
