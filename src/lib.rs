mod app;
pub mod area;
pub mod config;
pub mod framebuffer;
pub mod input;
pub mod monitor;
pub mod presenter;
pub mod signal;
pub mod sim;

pub use area::{Area, DisplayDescriptor};
pub use config::{BufferMode, RendererKind, SimConfig};
pub use framebuffer::{FlushSource, FrameRef, FrameStore, INITIAL_FILL};
pub use input::{InputEvent, InputSink, KeyCode, PointerButton};
pub use monitor::{MonitorHandle, MonitorShared};
pub use signal::{ReadyGate, ShutdownToken};
pub use sim::Simulator;

pub use app::REFRESH_PERIOD;
