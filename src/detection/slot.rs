//! Latest-result slot shared between the recognizer side and the render thread

use parking_lot::RwLock;
use std::sync::Arc;

use super::DetectionFrame;

/// Holds the most recent detection frame
///
/// Publishing swaps in a whole new tree; readers clone the `Arc` and keep
/// working on their snapshot even if a newer frame lands mid-pass.
#[derive(Debug, Clone, Default)]
pub struct DetectionSlot {
    inner: Arc<RwLock<Option<Arc<DetectionFrame>>>>,
}

impl DetectionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame
    pub fn publish(&self, frame: DetectionFrame) {
        *self.inner.write() = Some(Arc::new(frame));
    }

    /// Snapshot of the current frame, if any
    pub fn latest(&self) -> Option<Arc<DetectionFrame>> {
        self.inner.read().clone()
    }
}
