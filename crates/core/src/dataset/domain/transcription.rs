use crate::shared::text_cell::TextCell;

/// One recognition result keyed by the audio file it was produced from.
#[derive(Clone, Debug, PartialEq)]
pub struct Transcription {
    pub audio: String,
    pub recognized: TextCell,
}

impl Transcription {
    pub fn new(audio: impl Into<String>, recognized: impl Into<TextCell>) -> Self {
        Self {
            audio: audio.into(),
            recognized: recognized.into(),
        }
    }
}
