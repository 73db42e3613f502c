use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowId};

use crate::config::SimConfig;
use crate::input::{InputSink, InputTranslator};
use crate::monitor::MonitorShared;
use crate::presenter::Presenter;
use crate::signal::{ReadyGate, ShutdownToken};

/// How often the loop checks the refresh flags. Bounds refresh latency and
/// host CPU usage; not a hard real-time guarantee.
pub const REFRESH_PERIOD: Duration = Duration::from_millis(50);

/// What the loop does with one window event. Splitting the decision from
/// the GPU work keeps the policy testable without a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventAction {
    /// Set the shutdown token and exit the loop.
    Quit,
    /// Re-upload and present every monitor, regardless of refresh flags.
    PresentAll,
    /// Reconfigure the monitor's surface.
    Resize(u32, u32),
    /// Hand the event to the input translator/sink.
    ForwardInput,
    Ignore,
}

/// Classify a window event. Expose (redraw requested) and focus gain force
/// a full re-present even when no flush has set the refresh flag.
pub(crate) fn classify_event(event: &WindowEvent, forward_input: bool) -> EventAction {
    match event {
        WindowEvent::CloseRequested => EventAction::Quit,
        WindowEvent::RedrawRequested => EventAction::PresentAll,
        WindowEvent::Focused(true) => EventAction::PresentAll,
        WindowEvent::Resized(size) => EventAction::Resize(size.width, size.height),
        _ if forward_input => EventAction::ForwardInput,
        _ => EventAction::Ignore,
    }
}

/// One simulated display with its host-side resources.
struct MonitorWindow {
    shared: Arc<MonitorShared>,
    window: Arc<Window>,
    presenter: Presenter,
    translator: InputTranslator,
}

/// The presentation loop, driven by winit on the main thread.
///
/// Windowing setup happens in `resumed`; afterwards the loop wakes every
/// [`REFRESH_PERIOD`], consumes the monitors' refresh flags and presents
/// whichever framebuffers changed. Window events are forwarded to the input
/// sink; close requests set the shutdown token and exit.
pub(crate) struct App {
    config: SimConfig,
    monitors: Vec<Arc<MonitorShared>>,
    windows: Vec<MonitorWindow>,
    ready: Arc<ReadyGate>,
    shutdown: ShutdownToken,
    sink: Box<dyn InputSink>,
    next_tick: Instant,
    setup_error: Option<anyhow::Error>,
}

impl App {
    pub(crate) fn new(
        config: SimConfig,
        monitors: Vec<Arc<MonitorShared>>,
        ready: Arc<ReadyGate>,
        shutdown: ShutdownToken,
        sink: Box<dyn InputSink>,
    ) -> Self {
        Self {
            config,
            monitors,
            windows: Vec::new(),
            ready,
            shutdown,
            sink,
            next_tick: Instant::now() + REFRESH_PERIOD,
            setup_error: None,
        }
    }

    /// Error captured during windowing setup, surfaced after the loop exits.
    pub(crate) fn into_setup_error(self) -> Option<anyhow::Error> {
        self.setup_error
    }

    fn create_windows(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (win_w, win_h) = self.config.window_size();

        for shared in &self.monitors {
            let title = if self.monitors.len() > 1 {
                format!("{} {}", self.config.window_title, shared.index() + 1)
            } else {
                self.config.window_title.clone()
            };
            let attributes = Window::default_attributes()
                .with_title(title)
                .with_inner_size(LogicalSize::new(win_w, win_h))
                .with_resizable(false);
            let window = Arc::new(event_loop.create_window(attributes)?);

            let presenter = Presenter::new(
                window.clone(),
                self.config.hor_res,
                self.config.ver_res,
                self.config.renderer,
            )
            .map_err(|e| anyhow::anyhow!("presenter setup failed: {e}"))?;

            // Present the initial framebuffer contents on the first tick.
            shared.mark_refresh();

            self.windows.push(MonitorWindow {
                shared: shared.clone(),
                window,
                presenter,
                translator: InputTranslator::new(self.config.zoom),
            });
        }

        // Place dual monitors side by side instead of stacked by the WM.
        if let [first, second] = self.windows.as_slice() {
            if let Ok(pos) = first.window.outer_position() {
                second.window.set_outer_position(PhysicalPosition::new(
                    pos.x + win_w as i32 + 10,
                    pos.y,
                ));
            }
        }

        Ok(())
    }

    fn monitor_for(&self, window_id: WindowId) -> Option<usize> {
        self.windows.iter().position(|m| m.window.id() == window_id)
    }

    /// Upload and present one monitor's current frame. A shared store with
    /// no frame installed yet has nothing to show and is skipped.
    fn present(&self, index: usize) {
        let mw = &self.windows[index];
        if let Some(frame) = mw.shared.store().snapshot() {
            if let Err(e) = mw.presenter.present(&frame) {
                log::error!("monitor {}: present failed: {}", index, e);
            }
        }
    }

    /// Force a re-present of every monitor, regardless of the refresh flags.
    fn present_all(&self) {
        for index in 0..self.windows.len() {
            self.present(index);
        }
    }

    /// One refresh iteration: consume flags, present what changed.
    fn tick(&self) {
        for (index, mw) in self.windows.iter().enumerate() {
            if mw.shared.take_refresh() {
                self.present(index);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.windows.is_empty() {
            return;
        }
        match self.create_windows(event_loop) {
            Ok(()) => {
                log::debug!("windowing setup complete, {} monitor(s)", self.windows.len());
                self.ready.open();
            }
            Err(e) => {
                log::error!("windowing setup failed: {e}");
                self.setup_error = Some(e);
                self.shutdown.request();
                // Unblock producers even on failure so they can observe the
                // shutdown token instead of waiting forever.
                self.ready.open();
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(index) = self.monitor_for(window_id) else {
            return;
        };

        match classify_event(&event, self.config.forward_input) {
            EventAction::Quit => {
                log::info!("close requested, shutting down");
                self.shutdown.request();
                event_loop.exit();
            }
            EventAction::PresentAll => self.present_all(),
            EventAction::Resize(width, height) => {
                self.windows[index].presenter.resize(width, height);
            }
            EventAction::ForwardInput => {
                if let Some(input) = self.windows[index].translator.translate(&event) {
                    self.sink.handle(index, input);
                }
            }
            EventAction::Ignore => {}
        }
    }

    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if matches!(cause, StartCause::ResumeTimeReached { .. }) {
            self.tick();
            self.next_tick = Instant::now() + REFRESH_PERIOD;
        }
        if self.shutdown.is_requested() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}
