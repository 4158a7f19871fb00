use crate::resource::SoundId;

/// Fire-and-forget sound playback.
pub trait AudioSink {
    fn play(&mut self, sound: SoundId);
}

/// Headless sink remembering what was played, in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingAudio {
    played: Vec<SoundId>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn played(&self) -> &[SoundId] {
        &self.played
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, sound: SoundId) {
        self.played.push(sound);
    }
}
