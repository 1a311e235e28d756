//! Button identifiers, raw input events and the press/release registry.

use core::fmt;
use core::str::FromStr;

use crate::config::BUTTON_COUNT;
use crate::error::{DialogError, name_from};

/// One of the ten panel buttons, `0` through `9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ButtonId(u8);

impl ButtonId {
    /// Create a button identifier, rejecting anything above 9.
    pub const fn new(raw: u8) -> Option<Self> {
        if (raw as usize) < BUTTON_COUNT {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every button on the panel.
    pub fn all() -> impl Iterator<Item = ButtonId> {
        (0..BUTTON_COUNT as u8).map(ButtonId)
    }
}

impl TryFrom<u8> for ButtonId {
    type Error = DialogError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| {
            let mut name = crate::error::Name::new();
            let _ = fmt::Write::write_fmt(&mut name, format_args!("{raw}"));
            DialogError::InvalidButton(name)
        })
    }
}

impl FromStr for ButtonId {
    type Err = DialogError;

    /// Parse the `"0"`..`"9"` identifiers emitted by the input source.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| DialogError::InvalidButton(name_from(s)))
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw event emitted by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(ButtonId),
    Released(ButtonId),
}

impl InputEvent {
    pub const fn button(self) -> ButtonId {
        match self {
            Self::Pressed(button) | Self::Released(button) => button,
        }
    }
}

/// Press/release state for every button.
#[derive(Debug, Clone, Default)]
pub struct ButtonRegistry {
    pressed: [bool; BUTTON_COUNT],
}

impl ButtonRegistry {
    pub const fn new() -> Self {
        Self {
            pressed: [false; BUTTON_COUNT],
        }
    }

    pub fn press(&mut self, button: ButtonId) {
        self.pressed[button.index()] = true;
    }

    pub fn release(&mut self, button: ButtonId) {
        self.pressed[button.index()] = false;
    }

    /// Apply a raw event to the registry.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(button) => self.press(button),
            InputEvent::Released(button) => self.release(button),
        }
    }

    pub fn is_pressed(&self, button: ButtonId) -> bool {
        self.pressed[button.index()]
    }

    /// True when every listed button is currently held.
    pub fn all_pressed(&self, buttons: &[ButtonId]) -> bool {
        buttons.iter().all(|b| self.is_pressed(*b))
    }

    pub fn clear(&mut self) {
        self.pressed = [false; BUTTON_COUNT];
    }
}
