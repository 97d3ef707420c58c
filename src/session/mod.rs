pub mod media;
pub mod types;

pub use media::{ActiveSession, MediaSession, SessionFactory};
pub use types::MediaOptions;
