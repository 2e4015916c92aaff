mod blob;
mod color;
mod ids;
mod track;

pub use blob::Blob;
pub use color::AccentColor;
pub use ids::{ObjectUrl, StorageKey, TrackId};
pub use track::{Track, TrackSource};
