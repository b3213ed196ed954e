//! Deferred image loading.
//!
//! Images register their vertical position; each viewport change reports
//! which of them came into view. An image is loaded once and then forgotten.

use std::collections::HashSet;

/// Extra space around the viewport that still counts as visible.
pub const DEFAULT_ROOT_MARGIN: f64 = 50.0;

/// Minimum visible fraction of an image before it loads.
pub const DEFAULT_THRESHOLD: f64 = 0.01;

/// An image waiting to be loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LazyImage {
    pub key: String,
    /// Distance from the top of the scroll container.
    pub top: f64,
    pub height: f64,
    /// Source to swap in once visible.
    pub src: String,
}

impl LazyImage {
    #[must_use]
    pub fn new(key: impl Into<String>, top: f64, height: f64, src: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            top,
            height,
            src: src.into(),
        }
    }
}

/// Tracks images below the fold and reports each once it nears the viewport.
#[derive(Debug, Clone)]
pub struct LazyLoader {
    root_margin: f64,
    threshold: f64,
    observed: Vec<LazyImage>,
    loaded: HashSet<String>,
}

impl Default for LazyLoader {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLD)
    }
}

impl LazyLoader {
    #[must_use]
    pub fn new(root_margin: f64, threshold: f64) -> Self {
        Self {
            root_margin,
            threshold,
            observed: Vec::new(),
            loaded: HashSet::new(),
        }
    }

    /// Start watching an image. Already-loaded keys are ignored and a
    /// repeated key replaces the earlier registration.
    pub fn observe(&mut self, image: LazyImage) {
        if self.loaded.contains(&image.key) {
            return;
        }
        self.observed.retain(|o| o.key != image.key);
        self.observed.push(image);
    }

    /// Images that became visible, in registration order. They are marked
    /// loaded and no longer observed.
    pub fn on_viewport(&mut self, scroll_offset: f64, viewport_height: f64) -> Vec<LazyImage> {
        let root_top = scroll_offset - self.root_margin;
        let root_bottom = scroll_offset + viewport_height + self.root_margin;

        let (visible, hidden): (Vec<_>, Vec<_>) = self
            .observed
            .drain(..)
            .partition(|img| visible_fraction(img, root_top, root_bottom) >= self.threshold);
        self.observed = hidden;

        for img in &visible {
            tracing::trace!(key = %img.key, src = %img.src, "Loading image");
            self.loaded.insert(img.key.clone());
        }
        visible
    }

    /// Stop watching everything.
    pub fn disconnect(&mut self) {
        self.observed.clear();
    }

    #[must_use]
    pub fn is_loaded(&self, key: &str) -> bool {
        self.loaded.contains(key)
    }

    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }
}

fn visible_fraction(img: &LazyImage, root_top: f64, root_bottom: f64) -> f64 {
    let bottom = img.top + img.height;
    let overlap = bottom.min(root_bottom) - img.top.max(root_top);
    if img.height <= 0.0 {
        // A zero-height box counts as fully visible when inside the root.
        return if img.top >= root_top && img.top <= root_bottom {
            1.0
        } else {
            0.0
        };
    }
    if overlap <= 0.0 {
        return 0.0;
    }
    overlap / img.height
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn image(key: &str, top: f64) -> LazyImage {
        LazyImage::new(key, top, 300.0, format!("https://cdn.test/{key}.jpg"))
    }

    #[test]
    fn test_loads_visible_images_once() {
        let mut loader = LazyLoader::default();
        loader.observe(image("a", 0.0));
        loader.observe(image("b", 2000.0));

        let loaded = loader.on_viewport(0.0, 800.0);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key, "a");
        assert!(loader.is_loaded("a"));
        assert_eq!(loader.observed_count(), 1);

        assert!(loader.on_viewport(0.0, 800.0).is_empty());

        let loaded = loader.on_viewport(1500.0, 800.0);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key, "b");
        assert_eq!(loader.observed_count(), 0);
    }

    #[test]
    fn test_root_margin_preloads_near_images() {
        let mut loader = LazyLoader::default();
        // Starts 40px below the fold.
        loader.observe(image("near", 840.0));
        loader.observe(image("far", 900.0));
        let loaded = loader.on_viewport(0.0, 800.0);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key, "near");
    }

    #[test]
    fn test_threshold_requires_visible_fraction() {
        let mut loader = LazyLoader::new(0.0, 0.5);
        loader.observe(image("half", 700.0));
        assert!(loader.on_viewport(0.0, 800.0).is_empty());
        assert_eq!(loader.on_viewport(100.0, 800.0).len(), 1);
    }

    #[test]
    fn test_loaded_key_is_not_observed_again() {
        let mut loader = LazyLoader::default();
        loader.observe(image("a", 0.0));
        loader.on_viewport(0.0, 800.0);
        loader.observe(image("a", 0.0));
        assert_eq!(loader.observed_count(), 0);
    }

    #[test]
    fn test_disconnect_drops_observations() {
        let mut loader = LazyLoader::default();
        loader.observe(image("a", 0.0));
        loader.disconnect();
        assert!(loader.on_viewport(0.0, 800.0).is_empty());
        assert!(!loader.is_loaded("a"));
    }
}
