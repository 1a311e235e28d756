//! Speech capability consumed by the dialog controller.

use serde::{Deserialize, Serialize};

/// Log target for the speech channel.
pub const SPEECH_LOG_TARGET: &str = "nimbus::speech";

/// Voice presets offered by speech engines.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoicePreset {
    #[default]
    Normal,
    Calm,
    Excited,
}

/// Speech synthesis capability.
///
/// `speak` starts narration and returns immediately. The engine's owner is
/// responsible for calling
/// [`DialogController::on_speech_finished`](crate::dialog::DialogController::on_speech_finished)
/// once narration ends, after `is_speaking` has gone back to false.
pub trait SpeechEngine {
    fn speak(&mut self, text: &str, voice: VoicePreset);

    fn is_speaking(&self) -> bool;
}

impl<T: SpeechEngine + ?Sized> SpeechEngine for &mut T {
    fn speak(&mut self, text: &str, voice: VoicePreset) {
        (**self).speak(text, voice)
    }

    fn is_speaking(&self) -> bool {
        (**self).is_speaking()
    }
}
