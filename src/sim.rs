use std::sync::Arc;

use anyhow::Context;
use winit::event_loop::EventLoop;

use crate::app::App;
use crate::config::{BufferMode, SimConfig};
use crate::framebuffer::FrameStore;
use crate::input::InputSink;
use crate::monitor::{MonitorHandle, MonitorShared};
use crate::signal::{ReadyGate, ShutdownToken};

/// The display simulator: owns the monitor records, the startup readiness
/// gate and the shutdown token.
///
/// Built once from a [`SimConfig`]; producers grab [`MonitorHandle`]s before
/// `run` consumes the simulator on the main thread. `run` returns after the
/// presentation loop exits and all windowing/GPU resources have been torn
/// down; whether to exit the process is the caller's decision.
pub struct Simulator {
    config: SimConfig,
    monitors: Vec<Arc<MonitorShared>>,
    ready: Arc<ReadyGate>,
    shutdown: ShutdownToken,
}

impl Simulator {
    pub fn new(config: SimConfig) -> anyhow::Result<Self> {
        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        let monitors = (0..config.monitors)
            .map(|index| {
                let store = match config.buffer_mode {
                    BufferMode::Owned => FrameStore::owned(config.hor_res, config.ver_res),
                    BufferMode::Shared => FrameStore::shared(config.hor_res, config.ver_res),
                };
                MonitorShared::new(index, store)
            })
            .collect();

        Ok(Self {
            config,
            monitors,
            ready: ReadyGate::new(),
            shutdown: ShutdownToken::new(),
        })
    }

    /// Producer-side handle for monitor `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a configured monitor.
    pub fn handle(&self, index: usize) -> MonitorHandle {
        let shared = self
            .monitors
            .get(index)
            .unwrap_or_else(|| panic!("no monitor {index} (configured: {})", self.monitors.len()))
            .clone();
        MonitorHandle::new(shared, self.ready.clone(), self.shutdown.clone())
    }

    /// Shared state record for monitor `index`, for observing the refresh
    /// flag and framebuffer contents from the host.
    ///
    /// # Panics
    /// Panics if `index` is not a configured monitor.
    pub fn monitor(&self, index: usize) -> Arc<MonitorShared> {
        self.monitors[index].clone()
    }

    /// Cooperative shutdown token shared with the presentation loop.
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    /// Run the presentation loop on the calling thread until a quit is
    /// requested. Must run on the main thread (host windowing constraint).
    pub fn run(self, sink: Box<dyn InputSink>) -> anyhow::Result<()> {
        let Self {
            config,
            monitors,
            ready,
            shutdown,
        } = self;

        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(e) => {
                // The loop never started, so `resumed` will never open the
                // gate; release producers here or they park forever.
                Self::release_producers(&ready, &shutdown);
                return Err(e).context("failed to create event loop");
            }
        };

        let mut app = App::new(config, monitors, ready.clone(), shutdown.clone(), sink);
        let result = event_loop.run_app(&mut app);

        // Whatever ended the loop — quit, setup failure, or an exit before
        // `resumed` ever fired — producers must observe the shutdown token
        // rather than stay parked on the gate.
        Self::release_producers(&ready, &shutdown);

        if let Some(e) = app.into_setup_error() {
            return Err(e);
        }
        result.context("event loop error")
    }

    /// Unblock producers on a loop exit path: request shutdown first, then
    /// open the gate, so a released waiter sees the token instead of
    /// starting to flush.
    fn release_producers(ready: &ReadyGate, shutdown: &ShutdownToken) {
        shutdown.request();
        ready.open();
    }
}
