use serde::{Deserialize, Serialize};

/// Which local tracks a media session should acquire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaOptions {
    pub audio: bool,
    pub video: bool,
}

impl MediaOptions {
    pub fn audio_only() -> Self {
        Self {
            audio: true,
            video: false,
        }
    }
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}
