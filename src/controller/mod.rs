//! The three event-driven controllers behind the facade.

pub mod lazy_load;
pub mod playback;
pub mod poster;

pub use lazy_load::LazyLoadController;
pub use playback::PlaybackController;
pub use poster::PosterFallbackController;
