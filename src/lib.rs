//! logocache - URL-keyed image loader for list UIs
//!
//! Shows a placeholder immediately, serves cached images synchronously,
//! and fetches, decodes and caches everything else in the background.
//! Results land on the UI context through a dispatcher, and only the most
//! recent request for a display target is ever applied to it.

pub mod assets;
pub mod cache;
pub mod cli;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod target;
pub mod ui;

pub use cache::{ImageCache, MemoryCache};
pub use decode::DecodedImage;
pub use error::{LogoError, LogoResult};
pub use loader::{ImageLoader, LoadHandle, LoadOutcome, LoaderStats};
pub use target::{DisplayTarget, ImageSlot, Shown, TargetId};
