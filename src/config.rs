/// How a monitor stores flushed pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferMode {
    /// The monitor owns a fixed framebuffer; flushes copy dirty rows in.
    #[default]
    Owned,
    /// Flushes hand over whole frames by reference; last write wins.
    Shared,
}

/// GPU adapter preference for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Accelerated,
    /// Force the fallback (software) adapter, for VMs and CI boxes without
    /// usable GPU drivers.
    Software,
}

/// Simulation parameters, resolved once at startup.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Logical display resolution in pixels.
    pub hor_res: u32,
    pub ver_res: u32,
    /// Integer window scale; the texture stays at logical resolution and is
    /// magnified with nearest-neighbor sampling.
    pub zoom: u32,
    /// Number of simulated displays (1 or 2).
    pub monitors: usize,
    pub buffer_mode: BufferMode,
    pub renderer: RendererKind,
    /// When the host application handles input itself, the loop still
    /// presents but does not forward events to the sink.
    pub forward_input: bool,
    pub window_title: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            hor_res: 480,
            ver_res: 320,
            zoom: 1,
            monitors: 1,
            buffer_mode: BufferMode::default(),
            renderer: RendererKind::default(),
            forward_input: true,
            window_title: "Display Simulator".to_string(),
        }
    }
}

impl SimConfig {
    pub fn new(hor_res: u32, ver_res: u32) -> Self {
        Self {
            hor_res,
            ver_res,
            ..Self::default()
        }
    }

    /// Window size in physical pixels after zoom.
    pub fn window_size(&self) -> (u32, u32) {
        (self.hor_res * self.zoom, self.ver_res * self.zoom)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.hor_res == 0 || self.ver_res == 0 {
            return Err("display resolution must be non-zero".into());
        }
        if self.zoom == 0 {
            return Err("zoom factor must be at least 1".into());
        }
        match self.monitors {
            1 | 2 => Ok(()),
            n => Err(format!("unsupported monitor count {n}, expected 1 or 2")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_window_size_applies_zoom() {
        let mut cfg = SimConfig::new(320, 240);
        cfg.zoom = 2;
        assert_eq!(cfg.window_size(), (640, 480));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = SimConfig::new(0, 240);
        assert!(cfg.validate().is_err());

        cfg = SimConfig::new(320, 240);
        cfg.zoom = 0;
        assert!(cfg.validate().is_err());

        cfg = SimConfig::new(320, 240);
        cfg.monitors = 3;
        assert!(cfg.validate().is_err());
    }
}
