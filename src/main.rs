use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use winit::keyboard::KeyCode as WinitKeyCode;

use monitor_sim::{
    Area, BufferMode, DisplayDescriptor, FlushSource, InputEvent, InputSink, MonitorHandle,
    RendererKind, ShutdownToken, SimConfig, Simulator,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "monitor-sim")]
#[command(about = "Windowed display simulator for framebuffer-producing GUI libraries", long_about = None)]
struct Cli {
    /// Horizontal display resolution in pixels
    #[arg(long, default_value_t = 480)]
    width: u32,

    /// Vertical display resolution in pixels
    #[arg(long, default_value_t = 320)]
    height: u32,

    /// Integer window zoom factor
    #[arg(long, default_value_t = 1)]
    zoom: u32,

    /// Simulate two displays side by side
    #[arg(long)]
    dual: bool,

    /// Hand over whole frames by reference instead of copying dirty rows
    #[arg(long = "shared-frames")]
    shared_frames: bool,

    /// Force the software (fallback) adapter
    #[arg(long)]
    software: bool,

    /// Do not forward input events to the sink
    #[arg(long = "no-input")]
    no_input: bool,
}

impl Cli {
    fn into_config(self) -> SimConfig {
        SimConfig {
            hor_res: self.width,
            ver_res: self.height,
            zoom: self.zoom,
            monitors: if self.dual { 2 } else { 1 },
            buffer_mode: if self.shared_frames {
                BufferMode::Shared
            } else {
                BufferMode::Owned
            },
            renderer: if self.software {
                RendererKind::Software
            } else {
                RendererKind::Accelerated
            },
            forward_input: !self.no_input,
            window_title: "Display Simulator".to_string(),
        }
    }
}

/// Logs forwarded input; Escape requests shutdown.
struct DemoSink {
    shutdown: ShutdownToken,
}

impl InputSink for DemoSink {
    fn handle(&mut self, monitor: usize, event: InputEvent) {
        log::debug!("monitor {monitor}: {event:?}");
        if let InputEvent::Key { key, pressed: true, .. } = &event {
            if key.0 == WinitKeyCode::Escape {
                log::info!("escape pressed, quitting");
                self.shutdown.request();
            }
        }
    }
}

/// Demo rendering thread: paints a gradient with a bouncing square and
/// pushes frames through the real flush path at ~30 fps.
fn producer(handle: MonitorHandle, config: SimConfig, phase: usize) {
    handle.wait_ready();

    let (w, h) = (config.hor_res, config.ver_res);
    let descriptor = DisplayDescriptor::new(w, h);
    let full = Area::new(0, 0, w as i32 - 1, h as i32 - 1);
    let mut frame = vec![0u32; (w * h) as usize];
    let mut t = phase as f32 * 1.7;

    while !handle.shutdown().is_requested() {
        render_pattern(&mut frame, w, h, t);
        match config.buffer_mode {
            BufferMode::Owned => {
                handle.flush(&descriptor, full, FlushSource::Borrowed(&frame), || {});
            }
            BufferMode::Shared => {
                let shared: Arc<[u32]> = Arc::from(frame.as_slice());
                handle.flush(&descriptor, full, FlushSource::Shared(shared), || {});
            }
        }
        t += 0.05;
        thread::sleep(Duration::from_millis(33));
    }
    log::debug!("producer {phase} stopped");
}

fn render_pattern(frame: &mut [u32], w: u32, h: u32, t: f32) {
    for y in 0..h {
        for x in 0..w {
            let r = x * 255 / w.max(1);
            let g = y * 255 / h.max(1);
            frame[(y * w + x) as usize] = 0xFF00_0040 | (r << 16) | (g << 8);
        }
    }

    let size = (w.min(h) / 5).clamp(1, w.min(h));
    let bx = ((t.sin() * 0.5 + 0.5) * (w - size) as f32) as u32;
    let by = (((t * 1.3).cos() * 0.5 + 0.5) * (h - size) as f32) as u32;
    for y in by..by + size {
        let row = (y * w + bx) as usize;
        frame[row..row + size as usize].fill(0xFFFF_FFFF);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Cli::parse().into_config();
    log::info!(
        "starting {}x{} x{} zoom, {} monitor(s), {:?} buffering",
        config.hor_res,
        config.ver_res,
        config.zoom,
        config.monitors,
        config.buffer_mode
    );

    let sim = Simulator::new(config.clone())?;
    let sink = DemoSink {
        shutdown: sim.shutdown_token(),
    };

    let producers: Vec<_> = (0..config.monitors)
        .map(|i| {
            let handle = sim.handle(i);
            let config = config.clone();
            thread::spawn(move || producer(handle, config, i))
        })
        .collect();

    // Runs on the main thread until quit; requests shutdown on exit so the
    // producers wind down before we return.
    let result = sim.run(Box::new(sink));

    for p in producers {
        let _ = p.join();
    }
    result
}
