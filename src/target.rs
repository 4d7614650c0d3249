//! Display targets the loader writes into

use crate::decode::DecodedImage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Stable identity of a display target
///
/// The loader keys its per-target request bookkeeping by this id, so a
/// recycled list cell must keep its id across rebinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// What a target is currently showing
#[derive(Debug, Clone)]
pub enum Shown {
    /// Fallback image, shown while loading and after a failure
    Placeholder(DecodedImage),
    /// The image fetched for `url`
    Image { url: String, image: DecodedImage },
}

impl Shown {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Shown::Placeholder(_))
    }

    pub fn image(&self) -> &DecodedImage {
        match self {
            Shown::Placeholder(image) | Shown::Image { image, .. } => image,
        }
    }

    /// Source URL when showing a fetched image
    pub fn url(&self) -> Option<&str> {
        match self {
            Shown::Placeholder(_) => None,
            Shown::Image { url, .. } => Some(url),
        }
    }
}

/// A UI element that shows one image at a time
///
/// `show` is only ever called on the UI context: directly from
/// `ImageLoader::load_image`, or from a job handed to the loader's
/// dispatcher.
pub trait DisplayTarget: Send + Sync + 'static {
    fn id(&self) -> TargetId;

    fn show(&self, content: Shown);
}

/// Display target that records what it was asked to show
///
/// Used by the CLI to report results, and handy for hosts that render
/// from state rather than pushing into widgets.
#[derive(Debug)]
pub struct ImageSlot {
    id: TargetId,
    label: String,
    history: Mutex<Vec<Shown>>,
}

impl ImageSlot {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: TargetId::next(),
            label: label.into(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The most recent content, `None` before anything was shown
    pub fn current(&self) -> Option<Shown> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Every `show` call so far, oldest first
    pub fn history(&self) -> Vec<Shown> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DisplayTarget for ImageSlot {
    fn id(&self) -> TargetId {
        self.id
    }

    fn show(&self, content: Shown) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn ids_are_unique() {
        let a = TargetId::next();
        let b = TargetId::next();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
    }

    #[test]
    fn slot_records_history() {
        let slot = ImageSlot::new("crest");
        assert!(slot.current().is_none());

        let placeholder = DecodedImage::new(RgbaImage::new(1, 1));
        let logo = DecodedImage::new(RgbaImage::new(2, 2));
        slot.show(Shown::Placeholder(placeholder));
        slot.show(Shown::Image {
            url: "https://cdn.example.com/a.png".to_string(),
            image: logo.clone(),
        });

        let current = slot.current().unwrap();
        assert!(!current.is_placeholder());
        assert!(current.image().same_as(&logo));
        assert_eq!(current.url(), Some("https://cdn.example.com/a.png"));
        assert_eq!(slot.history().len(), 2);
        assert_eq!(slot.label(), "crest");
    }
}
