//! Video side of a search: what the user pasted, what the video is called,
//! and the (artist, title) guess derived from it.

pub mod oembed;
pub mod reference;
pub mod title;

pub use oembed::{OembedClient, VideoMetadata};
pub use reference::VideoRef;
pub use title::{NormalizedTitle, normalize};
