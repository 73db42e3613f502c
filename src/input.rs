use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, PhysicalKey};

/// How many display pixels one wheel "line" scrolls. Matches the usual
/// desktop convention; pixel-delta devices bypass it.
const WHEEL_LINE_PX: f32 = 20.0;

/// Host input translated into the rendering library's coordinate space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to (x, y) in display coordinates (zoom removed).
    PointerMoved { x: i32, y: i32 },
    /// Mouse button state changed at the last known pointer position.
    PointerButton {
        button: PointerButton,
        pressed: bool,
        x: i32,
        y: i32,
    },
    /// Wheel scrolled; positive y scrolls content up.
    Wheel { dx: f32, dy: f32 },
    /// Keyboard key state changed. `text` carries the produced character(s)
    /// on press, when any.
    Key {
        key: KeyCode,
        pressed: bool,
        text: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCode(pub winit::keyboard::KeyCode);

/// Receives translated input events, tagged with the monitor they occurred
/// on. Implemented by the host; this crate only forwards.
pub trait InputSink: Send {
    fn handle(&mut self, monitor: usize, event: InputEvent);
}

/// Translates winit window events into [`InputEvent`]s, tracking the cursor
/// so button events carry a position and descaling window coordinates by the
/// zoom factor.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    zoom: u32,
    cursor: (i32, i32),
}

impl InputTranslator {
    pub fn new(zoom: u32) -> Self {
        Self {
            zoom: zoom.max(1),
            cursor: (0, 0),
        }
    }

    /// Translate one window event. Events with no input meaning return
    /// `None`.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = self.descale(position.x, position.y);
                self.cursor = (x, y);
                Some(InputEvent::PointerMoved { x, y })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Left,
                    MouseButton::Right => PointerButton::Right,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return None,
                };
                let (x, y) = self.cursor;
                Some(InputEvent::PointerButton {
                    button,
                    pressed: *state == ElementState::Pressed,
                    x,
                    y,
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => {
                        (x * WHEEL_LINE_PX, y * WHEEL_LINE_PX)
                    }
                    MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
                };
                Some(InputEvent::Wheel { dx, dy })
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                let pressed = event.state == ElementState::Pressed;
                let text = match (&event.logical_key, pressed) {
                    (Key::Character(s), true) => Some(s.to_string()),
                    _ => None,
                };
                Some(InputEvent::Key {
                    key: KeyCode(code),
                    pressed,
                    text,
                })
            }
            _ => None,
        }
    }

    fn descale(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.zoom as f64) as i32,
            (y / self.zoom as f64) as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Winit keyboard/mouse events carry private fields, so translation is
    // exercised through the cursor-tracking and descaling paths that take
    // plain values.

    #[test]
    fn test_descale_maps_window_to_display_coords() {
        let translator = InputTranslator::new(2);
        assert_eq!(translator.descale(100.0, 50.0), (50, 25));
        assert_eq!(translator.descale(0.0, 0.0), (0, 0));
        assert_eq!(translator.descale(3.0, 3.0), (1, 1));
    }

    #[test]
    fn test_zoom_zero_treated_as_one() {
        let translator = InputTranslator::new(0);
        assert_eq!(translator.descale(17.0, 9.0), (17, 9));
    }

    #[test]
    fn test_cursor_starts_at_origin() {
        let translator = InputTranslator::new(1);
        assert_eq!(translator.cursor, (0, 0));
    }

    struct Recorder(Vec<(usize, InputEvent)>);

    impl InputSink for Recorder {
        fn handle(&mut self, monitor: usize, event: InputEvent) {
            self.0.push((monitor, event));
        }
    }

    #[test]
    fn test_sink_receives_tagged_events() {
        let mut sink = Recorder(Vec::new());
        sink.handle(1, InputEvent::Wheel { dx: 0.0, dy: -20.0 });
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0].0, 1);
    }
}
