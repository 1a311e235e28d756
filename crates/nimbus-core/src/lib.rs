//! Hardware-independent core library for nimbus
//!
//! This crate contains all platform-agnostic logic for the nimbus installation:
//! a panel of ten buttons and a 30-LED strip, narrated by synthesized speech,
//! walking the visitor through rain, wind, hour and pollution choices.
//!
//! The heart of it is [`dialog::DialogController`], which consumes button
//! events, detects floor long-presses and the exit gesture, keeps one LED
//! pattern per mode, and drives the [`leds::LedDriver`] and
//! [`speech::SpeechEngine`] capabilities it is given at construction.
//!
//! It is `#![no_std]` so it compiles on both embedded targets and desktop
//! hosts (for the simulator and tests). Time is always passed in by the
//! caller, so the controller never reads a clock itself.

#![cfg_attr(not(test), no_std)]

pub mod buttons;
pub mod config;
pub mod dialog;
pub mod error;
pub mod exit_gesture;
pub mod gesture;
pub mod input;
pub mod leds;
pub mod narration;
pub mod speech;
pub mod timer;

pub use buttons::{ButtonId, ButtonRegistry, InputEvent};
pub use config::DialogConfig;
pub use dialog::{DialogController, DialogState, SessionStatus, SessionView};
pub use error::DialogError;
pub use gesture::FloorPair;
pub use leds::{BlinkMode, LedDriver, ModeKey, NamedColor};
pub use speech::{SpeechEngine, VoicePreset};
