use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::area::{Area, DisplayDescriptor};
use crate::framebuffer::{FlushSource, FrameStore};
use crate::signal::{ReadyGate, ShutdownToken};

/// State shared between a producer's [`MonitorHandle`] and the presentation
/// loop for one simulated display.
///
/// The refresh flag is the only signal between the two sides: the producer
/// updates the store first, then sets the flag (Release); the presentation
/// loop clears the flag (Acquire) before reading the store, so a cleared
/// flag never precedes a stale buffer.
pub struct MonitorShared {
    index: usize,
    store: FrameStore,
    refresh: AtomicBool,
}

impl MonitorShared {
    pub fn new(index: usize, store: FrameStore) -> Arc<Self> {
        Arc::new(Self {
            index,
            store,
            refresh: AtomicBool::new(false),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    /// Raise the refresh-pending flag. Used at window creation to force the
    /// first present, and by `flush`.
    pub fn mark_refresh(&self) {
        self.refresh.store(true, Ordering::Release);
    }

    /// Presentation side: consume the flag. Returns true exactly once per
    /// set, and the subsequent store read observes everything the producer
    /// wrote before setting it.
    pub fn take_refresh(&self) -> bool {
        self.refresh.swap(false, Ordering::Acquire)
    }

    /// Flag state without consuming it (test inspection).
    pub fn refresh_pending(&self) -> bool {
        self.refresh.load(Ordering::Acquire)
    }
}

/// Producer-side handle to one monitor. Cloneable; flushes never block on
/// presentation.
#[derive(Clone)]
pub struct MonitorHandle {
    shared: Arc<MonitorShared>,
    ready: Arc<ReadyGate>,
    shutdown: ShutdownToken,
}

impl MonitorHandle {
    pub(crate) fn new(
        shared: Arc<MonitorShared>,
        ready: Arc<ReadyGate>,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            shared,
            ready,
            shutdown,
        }
    }

    /// Block until the presentation loop has finished windowing setup.
    /// Producers call this once before their first flush.
    pub fn wait_ready(&self) {
        self.ready.wait();
    }

    /// Shutdown token shared with the presentation loop, so producers can
    /// stop rendering once a quit was requested.
    pub fn shutdown(&self) -> &ShutdownToken {
        &self.shutdown
    }

    /// Flush a finished dirty rectangle to the display.
    ///
    /// `ready` is the acknowledgment back to the rendering library and is
    /// called exactly once per invocation, including for rectangles that
    /// fall entirely off screen (those skip all buffer work). Rectangles
    /// partially off screen are clipped, never rejected.
    pub fn flush<F: FnOnce()>(
        &self,
        descriptor: &DisplayDescriptor,
        area: Area,
        source: FlushSource<'_>,
        ready: F,
    ) {
        let (hres, vres) = descriptor.effective_res();
        if area.outside(hres, vres) {
            log::trace!(
                "monitor {}: flush ({},{})-({},{}) off screen, dropped",
                self.shared.index,
                area.x1,
                area.y1,
                area.x2,
                area.y2
            );
            ready();
            return;
        }

        self.shared.store.apply(area, source);
        self.shared.mark_refresh();
        ready();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::INITIAL_FILL;
    use std::cell::Cell;

    fn handle(store: FrameStore) -> (MonitorHandle, Arc<MonitorShared>) {
        let shared = MonitorShared::new(0, store);
        let ready = ReadyGate::new();
        ready.open();
        (
            MonitorHandle::new(shared.clone(), ready, ShutdownToken::new()),
            shared,
        )
    }

    #[test]
    fn test_flush_sets_flag_and_acks_once() {
        let (handle, shared) = handle(FrameStore::owned(320, 240));
        let acks = Cell::new(0);
        let desc = DisplayDescriptor::new(320, 240);
        let area = Area::new(0, 0, 3, 3);
        let src = vec![0xFFFF_FFFF_u32; 16];

        assert!(!shared.refresh_pending());
        handle.flush(&desc, area, FlushSource::Borrowed(&src), || {
            acks.set(acks.get() + 1)
        });

        assert_eq!(acks.get(), 1);
        assert!(shared.refresh_pending());
    }

    #[test]
    fn test_off_screen_flush_is_acked_noop() {
        let (handle, shared) = handle(FrameStore::owned(320, 240));
        let acks = Cell::new(0);
        let desc = DisplayDescriptor::new(320, 240);
        let area = Area::new(400, 400, 410, 410);
        let src = vec![0xFFFF_FFFF_u32; 121];

        handle.flush(&desc, area, FlushSource::Borrowed(&src), || {
            acks.set(acks.get() + 1)
        });

        assert_eq!(acks.get(), 1);
        assert!(!shared.refresh_pending());
        assert_eq!(shared.store().pixel(0, 0), Some(INITIAL_FILL));
    }

    #[test]
    fn test_rotation_swaps_bounds_check() {
        let (handle, shared) = handle(FrameStore::owned(320, 240));
        let desc = DisplayDescriptor {
            rotated: true,
            ..DisplayDescriptor::new(320, 240)
        };
        // x = 300 is off screen once the display is rotated (hres = 240).
        let area = Area::new(300, 0, 310, 10);
        let src = vec![0u32; 121];

        handle.flush(&desc, area, FlushSource::Borrowed(&src), || {});
        assert!(!shared.refresh_pending());
    }

    #[test]
    fn test_take_refresh_consumes_flag() {
        let (handle, shared) = handle(FrameStore::owned(16, 16));
        let desc = DisplayDescriptor::new(16, 16);
        let src = vec![0u32; 4];
        handle.flush(&desc, Area::new(0, 0, 1, 1), FlushSource::Borrowed(&src), || {});

        assert!(shared.take_refresh());
        assert!(!shared.take_refresh());
        assert!(!shared.refresh_pending());
    }

    #[test]
    fn test_flag_stays_set_across_multiple_flushes() {
        let (handle, shared) = handle(FrameStore::owned(16, 16));
        let desc = DisplayDescriptor::new(16, 16);
        let src = vec![0u32; 4];
        let area = Area::new(0, 0, 1, 1);

        handle.flush(&desc, area, FlushSource::Borrowed(&src), || {});
        handle.flush(&desc, area, FlushSource::Borrowed(&src), || {});

        // Two flushes, one consumable signal: last-write-wins, no queue.
        assert!(shared.take_refresh());
        assert!(!shared.take_refresh());
    }

    #[test]
    fn test_shared_mode_presents_latest_frame() {
        let (handle, shared) = handle(FrameStore::shared(2, 2));
        let desc = DisplayDescriptor::new(2, 2);
        let area = Area::new(0, 0, 1, 1);

        let first: Arc<[u32]> = Arc::from(vec![1u32; 4].as_slice());
        let second: Arc<[u32]> = Arc::from(vec![2u32; 4].as_slice());
        handle.flush(&desc, area, FlushSource::Shared(first), || {});
        handle.flush(&desc, area, FlushSource::Shared(second), || {});

        assert!(shared.take_refresh());
        assert_eq!(shared.store().pixel(0, 0), Some(2));
    }
}
