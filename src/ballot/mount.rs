use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Tells a session whether its screen is still shown.
///
/// Answers arriving after [`unmount`](Self::unmount) are dropped instead of
/// being applied.
#[derive(Debug, Clone)]
pub struct MountHandle {
    mounted: Arc<AtomicBool>,
}

impl MountHandle {
    pub(crate) fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }
}
