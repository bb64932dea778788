//! Decides, once per frame, whether the swap chain must be rebuilt.

use ash::vk;

/// What the renderer should do before acquiring the next image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeAction {
    /// Swap chain is current; render normally.
    Render,
    /// Rebuild for this extent, then render.
    Recreate(vk::Extent2D),
    /// Drawable area is empty; skip the frame and keep every GPU object.
    Suspend,
}

/// Pending-resize flag fed by window events and presentation results.
#[derive(Debug, Default)]
pub struct ResizeTracker {
    pending: bool,
}

impl ResizeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window resized, or acquire/present reported a stale swap chain.
    pub fn mark_resized(&mut self) {
        self.pending = true;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Picks the action for a drawable of `extent`.
    ///
    /// A pending resize survives a zero extent and is consumed by the first
    /// non-empty one.
    pub fn decide(&mut self, extent: vk::Extent2D) -> ResizeAction {
        if extent.width == 0 || extent.height == 0 {
            return ResizeAction::Suspend;
        }
        if std::mem::take(&mut self.pending) {
            ResizeAction::Recreate(extent)
        } else {
            ResizeAction::Render
        }
    }
}
