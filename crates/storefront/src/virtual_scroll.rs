//! Windowed rendering for long product lists.
//!
//! Only the rows intersecting the viewport, plus `overscan` rows on either
//! side, are handed to the [`RenderTarget`]. Every row is assumed to have the
//! same height.

use crate::config::WindowConfig;
use crate::timing::FrameThrottle;

pub const DEFAULT_ITEM_HEIGHT: u32 = 400;
pub const DEFAULT_OVERSCAN: usize = 3;
pub const DEFAULT_THRESHOLD: usize = 50;

/// Half-open index range `[start, end)` of rows to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Rows to render for the given geometry.
///
/// A zero item height or an empty list yields an empty range.
#[must_use]
pub fn visible_range(
    item_count: usize,
    item_height: u32,
    viewport_height: u32,
    scroll_offset: u64,
    overscan: usize,
) -> VisibleRange {
    if item_count == 0 || item_height == 0 {
        return VisibleRange::default();
    }
    let height = u64::from(item_height);
    let first = to_index(scroll_offset / height);
    let last = to_index(
        scroll_offset
            .saturating_add(u64::from(viewport_height))
            .div_ceil(height),
    );

    let end = last.saturating_add(overscan).min(item_count);
    let start = first.saturating_sub(overscan).min(end);
    VisibleRange { start, end }
}

fn to_index(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn to_offset(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// How a list of a given length should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Every item at once.
    Direct,
    /// Through a [`VirtualList`].
    Windowed,
}

impl RenderMode {
    #[must_use]
    pub const fn for_len(len: usize, threshold: usize) -> Self {
        if should_virtualize(len, threshold) {
            Self::Windowed
        } else {
            Self::Direct
        }
    }
}

/// Windowing only pays off once the list is longer than `threshold`.
#[must_use]
pub const fn should_virtualize(len: usize, threshold: usize) -> bool {
    len > threshold
}

/// What a render target receives on each render.
#[derive(Debug, Clone, Copy)]
pub struct WindowFrame<'a, T> {
    /// The rows in `[start, end)`.
    pub items: &'a [T],
    /// Index of the first row in `items`.
    pub start: usize,
    /// Pixel offset of the first row.
    pub offset: u64,
    /// Height of the whole list, for the scroll spacer.
    pub total_height: u64,
}

/// Draws frames produced by a [`VirtualList`].
pub trait RenderTarget<T> {
    fn render(&mut self, frame: WindowFrame<'_, T>);

    /// The list was disposed and will not render again.
    fn detach(&mut self) {}
}

/// Lifecycle of a [`VirtualList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Measuring,
    Rendering,
    Disposed,
}

/// A list that renders only its visible window.
#[derive(Debug)]
pub struct VirtualList<T, R> {
    items: Vec<T>,
    item_height: u32,
    overscan: usize,
    viewport_height: u32,
    scroll_offset: u64,
    range: Option<VisibleRange>,
    state: ListState,
    frame: FrameThrottle,
    target: R,
}

impl<T, R: RenderTarget<T>> VirtualList<T, R> {
    #[must_use]
    pub fn new(items: Vec<T>, target: R) -> Self {
        Self {
            items,
            item_height: DEFAULT_ITEM_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            viewport_height: 0,
            scroll_offset: 0,
            range: None,
            state: ListState::Idle,
            frame: FrameThrottle::new(),
            target,
        }
    }

    /// Item height and overscan from configuration.
    #[must_use]
    pub fn with_config(items: Vec<T>, target: R, config: &WindowConfig) -> Self {
        Self::new(items, target)
            .with_item_height(config.item_height)
            .with_overscan(config.overscan)
    }

    #[must_use]
    pub const fn with_item_height(mut self, item_height: u32) -> Self {
        self.item_height = item_height;
        self
    }

    #[must_use]
    pub const fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    /// Measure the viewport and draw the first frame.
    pub fn init(&mut self, viewport_height: u32) {
        if self.state != ListState::Idle {
            tracing::debug!(state = ?self.state, "Ignoring init on started list");
            return;
        }
        self.state = ListState::Measuring;
        self.viewport_height = viewport_height;
        self.state = ListState::Rendering;
        self.render(true);
    }

    /// Scroll to `offset` and render now. Returns whether a frame was drawn.
    pub fn on_scroll(&mut self, offset: u64) -> bool {
        if !self.accepts("scroll") {
            return false;
        }
        self.scroll_offset = offset;
        self.render(false)
    }

    /// Record a scroll and defer the recompute to the next frame.
    ///
    /// Returns true when the caller should schedule a frame; further scrolls
    /// before [`Self::on_frame`] only update the offset.
    pub fn queue_scroll(&mut self, offset: u64) -> bool {
        if !self.accepts("scroll") {
            return false;
        }
        self.scroll_offset = offset;
        self.frame.request()
    }

    /// Record a viewport height change and defer the recompute to the next
    /// frame. Shares the frame with [`Self::queue_scroll`].
    pub fn queue_resize(&mut self, viewport_height: u32) -> bool {
        if !self.accepts("resize") {
            return false;
        }
        self.viewport_height = viewport_height;
        self.frame.request()
    }

    /// Run the recompute scheduled by [`Self::queue_scroll`] or
    /// [`Self::queue_resize`].
    pub fn on_frame(&mut self) -> bool {
        if !self.frame.fire() || !self.accepts("frame") {
            return false;
        }
        self.render(false)
    }

    /// The viewport changed height. Renders now; use [`Self::queue_resize`]
    /// to coalesce with scrolling.
    pub fn on_resize(&mut self, viewport_height: u32) -> bool {
        if !self.accepts("resize") {
            return false;
        }
        self.viewport_height = viewport_height;
        self.render(false)
    }

    /// Replace the rows, keeping the scroll offset, and redraw.
    pub fn update_items(&mut self, items: Vec<T>) {
        if self.state == ListState::Disposed {
            tracing::debug!("Ignoring update on disposed list");
            return;
        }
        self.items = items;
        if self.state == ListState::Rendering {
            self.render(true);
        }
    }

    /// Stop rendering and release the target.
    pub fn dispose(&mut self) {
        if self.state == ListState::Disposed {
            return;
        }
        self.state = ListState::Disposed;
        self.frame.fire();
        self.range = None;
        self.items.clear();
        self.target.detach();
    }

    #[must_use]
    pub const fn state(&self) -> ListState {
        self.state
    }

    /// The range drawn last, if any.
    #[must_use]
    pub const fn range(&self) -> Option<VisibleRange> {
        self.range
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    #[must_use]
    pub fn total_height(&self) -> u64 {
        to_offset(self.items.len()).saturating_mul(u64::from(self.item_height))
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub const fn target(&self) -> &R {
        &self.target
    }

    /// Consume the list, returning its render target.
    #[must_use]
    pub fn into_target(self) -> R {
        self.target
    }

    fn accepts(&self, event: &str) -> bool {
        match self.state {
            ListState::Rendering => true,
            ListState::Disposed => {
                tracing::debug!(event, "Ignoring event on disposed list");
                false
            }
            ListState::Idle | ListState::Measuring => false,
        }
    }

    fn render(&mut self, force: bool) -> bool {
        let range = visible_range(
            self.items.len(),
            self.item_height,
            self.viewport_height,
            self.scroll_offset,
            self.overscan,
        );
        if !force && self.range == Some(range) {
            return false;
        }
        self.range = Some(range);

        let frame = WindowFrame {
            items: self.items.get(range.start..range.end).unwrap_or_default(),
            start: range.start,
            offset: to_offset(range.start).saturating_mul(u64::from(self.item_height)),
            total_height: self.total_height(),
        };
        self.target.render(frame);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Records the window of every render.
    #[derive(Debug, Default)]
    struct Recorder {
        frames: Vec<(Vec<usize>, usize, u64, u64)>,
        detached: bool,
    }

    impl RenderTarget<usize> for Recorder {
        fn render(&mut self, frame: WindowFrame<'_, usize>) {
            self.frames.push((
                frame.items.to_vec(),
                frame.start,
                frame.offset,
                frame.total_height,
            ));
        }

        fn detach(&mut self) {
            self.detached = true;
        }
    }

    fn list(n: usize) -> VirtualList<usize, Recorder> {
        VirtualList::new((0..n).collect(), Recorder::default())
            .with_item_height(400)
            .with_overscan(2)
    }

    #[test]
    fn test_visible_range_mid_list() {
        let range = visible_range(1000, 400, 600, 4000, 2);
        assert_eq!(range, VisibleRange { start: 8, end: 14 });
    }

    #[test]
    fn test_visible_range_at_top() {
        let range = visible_range(1000, 400, 600, 0, 2);
        assert_eq!(range, VisibleRange { start: 0, end: 4 });
    }

    #[test]
    fn test_visible_range_empty_inputs() {
        assert!(visible_range(0, 400, 600, 0, 3).is_empty());
        assert!(visible_range(10, 0, 600, 0, 3).is_empty());
    }

    #[test]
    fn test_visible_range_zero_viewport() {
        // Only the overscan rows around the offset.
        let range = visible_range(100, 400, 0, 4000, 2);
        assert_eq!(range, VisibleRange { start: 8, end: 12 });
    }

    #[test]
    fn test_visible_range_past_end() {
        let range = visible_range(5, 400, 600, 100_000, 2);
        assert_eq!(range, VisibleRange { start: 5, end: 5 });
    }

    #[test]
    fn test_should_virtualize_threshold() {
        assert!(!should_virtualize(50, 50));
        assert!(should_virtualize(51, 50));
        assert_eq!(RenderMode::for_len(10, 50), RenderMode::Direct);
        assert_eq!(RenderMode::for_len(100, 50), RenderMode::Windowed);
    }

    #[test]
    fn test_init_renders_first_window() {
        let mut list = list(1000);
        assert_eq!(list.state(), ListState::Idle);
        list.init(600);
        assert_eq!(list.state(), ListState::Rendering);

        let (items, start, offset, total) = list.target().frames.last().unwrap().clone();
        assert_eq!(items, vec![0, 1, 2, 3]);
        assert_eq!(start, 0);
        assert_eq!(offset, 0);
        assert_eq!(total, 400_000);
    }

    #[test]
    fn test_scroll_renders_only_on_range_change() {
        let mut list = list(1000);
        list.init(600);
        assert!(list.on_scroll(4000));
        assert_eq!(list.range(), Some(VisibleRange { start: 8, end: 14 }));
        assert_eq!(list.target().frames.last().unwrap().2, 3200);

        // Still inside row 10.
        assert!(!list.on_scroll(4010));
        assert_eq!(list.target().frames.len(), 2);
    }

    #[test]
    fn test_queued_scrolls_coalesce_per_frame() {
        let mut list = list(1000);
        list.init(600);
        assert!(list.queue_scroll(1000));
        assert!(!list.queue_scroll(2000));
        assert!(!list.queue_scroll(4000));
        assert!(list.on_frame());
        assert_eq!(list.range(), Some(VisibleRange { start: 8, end: 14 }));
        assert!(!list.on_frame());
    }

    #[test]
    fn test_resize_shares_the_scroll_frame() {
        let mut list = list(1000);
        list.init(600);
        assert!(list.queue_scroll(4000));
        assert!(!list.queue_resize(1200));
        assert_eq!(list.target().frames.len(), 1);

        assert!(list.on_frame());
        assert_eq!(list.range(), Some(VisibleRange { start: 8, end: 15 }));
        assert_eq!(list.target().frames.len(), 2);
    }

    #[test]
    fn test_update_items_clamps_to_new_length() {
        let mut list = list(1000);
        list.init(600);
        list.on_scroll(4000);

        list.update_items((0..10).collect());
        assert_eq!(list.scroll_offset(), 4000);
        assert_eq!(list.range(), Some(VisibleRange { start: 8, end: 10 }));
        let (items, ..) = list.target().frames.last().unwrap().clone();
        assert_eq!(items, vec![8, 9]);
    }

    #[test]
    fn test_empty_list_renders_nothing() {
        let mut list = list(0);
        list.init(600);
        let (items, _, _, total) = list.target().frames.last().unwrap().clone();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn test_dispose_detaches_and_ignores_events() {
        let mut list = list(100);
        list.init(600);
        list.dispose();
        assert_eq!(list.state(), ListState::Disposed);
        assert!(list.target().detached);

        let renders = list.target().frames.len();
        assert!(!list.on_scroll(4000));
        assert!(!list.on_resize(100));
        list.update_items(vec![1, 2, 3]);
        assert_eq!(list.target().frames.len(), renders);
    }

    #[test]
    fn test_events_before_init_do_not_render() {
        let mut list = list(100);
        assert!(!list.on_scroll(400));
        assert!(list.target().frames.is_empty());
    }
}
