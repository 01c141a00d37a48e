use fxhash::FxHashMap;
use smol_str::SmolStr;

use crate::{math::Vector2, runner::Event};

/// Keyboard and mouse state for one window, rebuilt from the runner's events.
#[derive(Clone, Debug, Default)]
pub struct Input {
    window_id: usize,
    keys: FxHashMap<SmolStr, bool>,
    just_pressed: FxHashMap<SmolStr, bool>,
    mouse_buttons: FxHashMap<SmolStr, bool>,
    mouse_position: Vector2,
    cursor_inside: bool,
}

impl Input {
    pub fn new(window_id: usize) -> Self {
        Self {
            window_id,
            ..Default::default()
        }
    }

    /// Applies a frame's worth of events. Events for other windows are ignored.
    pub fn process_events(&mut self, events: &[Event]) {
        self.just_pressed.clear();

        for event in events {
            match event {
                Event::KeyboardInput {
                    key,
                    pressed,
                    window_id,
                } if *window_id == self.window_id => {
                    let was_pressed = self.keys.insert(key.clone(), *pressed).unwrap_or(false);
                    if *pressed && !was_pressed {
                        self.just_pressed.insert(key.clone(), true);
                    }
                }
                Event::MouseInput {
                    button,
                    pressed,
                    window_id,
                } if *window_id == self.window_id => {
                    self.mouse_buttons.insert(button.clone(), *pressed);
                }
                Event::CursorMoved { pos, window_id } if *window_id == self.window_id => {
                    self.mouse_position = Vector2::new(pos.x, pos.y);
                    self.cursor_inside = true;
                }
                Event::CursorEntered { window_id } if *window_id == self.window_id => {
                    self.cursor_inside = true;
                }
                Event::CursorLeft { window_id } if *window_id == self.window_id => {
                    self.cursor_inside = false;
                }
                Event::WindowFocused {
                    focused: false,
                    window_id,
                } if *window_id == self.window_id => {
                    // Release events are lost while unfocused.
                    self.keys.clear();
                    self.mouse_buttons.clear();
                }
                _ => {}
            }
        }
    }

    /// Last known cursor position in window pixels. Stays put while the cursor is
    /// outside the window.
    pub fn mouse_position(&self) -> Vector2 {
        self.mouse_position
    }

    pub fn is_cursor_inside(&self) -> bool {
        self.cursor_inside
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// `true` only on the frame the key went down.
    pub fn is_key_just_pressed(&self, key: &str) -> bool {
        self.just_pressed.contains_key(key)
    }

    pub fn is_mouse_pressed(&self, button: &str) -> bool {
        self.mouse_buttons.get(button).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point2;

    fn key(window_id: usize, key: &str, pressed: bool) -> Event {
        Event::KeyboardInput {
            window_id,
            key: SmolStr::new(key),
            pressed,
        }
    }

    #[test]
    fn tracks_cursor_for_its_window_only() {
        let mut input = Input::new(0);
        input.process_events(&[
            Event::CursorMoved {
                window_id: 0,
                pos: Point2::new(12, 34),
            },
            Event::CursorMoved {
                window_id: 1,
                pos: Point2::new(99, 99),
            },
        ]);

        assert_eq!(input.mouse_position(), Vector2::new(12.0, 34.0));
        assert!(input.is_cursor_inside());

        input.process_events(&[Event::CursorLeft { window_id: 0 }]);
        assert!(!input.is_cursor_inside());
        assert_eq!(input.mouse_position(), Vector2::new(12.0, 34.0));
    }

    #[test]
    fn just_pressed_lasts_one_frame() {
        let mut input = Input::new(0);

        input.process_events(&[key(0, "Escape", true)]);
        assert!(input.is_key_just_pressed("Escape"));
        assert!(input.is_key_pressed("Escape"));

        input.process_events(&[]);
        assert!(!input.is_key_just_pressed("Escape"));
        assert!(input.is_key_pressed("Escape"));

        // Key repeat does not count as a new press.
        input.process_events(&[key(0, "Escape", true)]);
        assert!(!input.is_key_just_pressed("Escape"));

        input.process_events(&[key(0, "Escape", false)]);
        assert!(!input.is_key_pressed("Escape"));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut input = Input::new(2);
        input.process_events(&[
            key(2, "a", true),
            Event::MouseInput {
                window_id: 2,
                button: SmolStr::new("Left"),
                pressed: true,
            },
        ]);
        assert!(input.is_mouse_pressed("Left"));

        input.process_events(&[Event::WindowFocused {
            window_id: 2,
            focused: false,
        }]);
        assert!(!input.is_key_pressed("a"));
        assert!(!input.is_mouse_pressed("Left"));
    }
}
