use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// One-shot startup gate: the presentation loop signals it once windowing
/// setup is done, producers block on it before their first flush.
#[derive(Default)]
pub struct ReadyGate {
    ready: Mutex<bool>,
    cond: Condvar,
}

impl ReadyGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Mark the gate open and wake all waiters. Calling it again is a no-op.
    pub fn open(&self) {
        let mut ready = self.ready.lock().expect("ready gate lock poisoned");
        *ready = true;
        self.cond.notify_all();
    }

    /// Block until the gate opens. Returns immediately if already open.
    pub fn wait(&self) {
        let mut ready = self.ready.lock().expect("ready gate lock poisoned");
        while !*ready {
            ready = self.cond.wait(ready).expect("ready gate lock poisoned");
        }
    }

    pub fn is_open(&self) -> bool {
        *self.ready.lock().expect("ready gate lock poisoned")
    }
}

/// Cooperative shutdown token shared between the presentation loop and
/// producers. Checked once per loop iteration, so honoring a request can
/// take up to one refresh period.
#[derive(Clone, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
