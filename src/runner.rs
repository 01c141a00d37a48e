use std::{collections::HashMap, sync::Arc, time::Duration};

use smol_str::SmolStr;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window as WinitWindow, WindowAttributes, WindowId},
};

use crate::{
    math::{Point2, Timing},
    utils::ArcRef,
    window::{WindowBuilder, WindowInner},
};

#[cfg(target_os = "windows")]
use winit::platform::windows::EventLoopBuilderExtWindows;

#[cfg(all(not(feature = "x11"), target_os = "linux"))]
use winit::platform::wayland::EventLoopBuilderExtWayland;

#[cfg(all(feature = "x11", target_os = "linux"))]
use winit::platform::x11::EventLoopBuilderExtX11;

/// Create a [Runner] instance, required for creating a window.
///
/// Only one runner may exist per process; winit refuses to build a second event loop.
pub fn new() -> Result<Runner, RunnerError> {
    Runner::new()
}

/// Non-blocking wrapper around winit's [EventLoop].
///
/// Instead of handing control to winit, the caller drives the loop itself by calling
/// [Runner::pool_events] once per frame and reading [Runner::get_events].
/// Not supported on iOS and WASM.
pub struct Runner {
    pub(crate) app_runner: RunnerInner,
    pub(crate) event_loop: EventLoop<WindowEvent>,
    pub(crate) event_loop_proxy: EventLoopProxy<WindowEvent>,
    pub(crate) window_events_attributes: Vec<ArcRef<WindowInner>>,
    pub(crate) rate_timing: Timing,
    pub(crate) pending_events: Vec<Event>,
    next_window_id: usize,
}

impl Runner {
    pub(crate) fn new() -> Result<Self, RunnerError> {
        #[allow(unused_mut)]
        let mut event_loop_builder = EventLoop::<WindowEvent>::with_user_event();

        #[cfg(any(target_os = "windows", target_os = "linux"))]
        {
            event_loop_builder.with_any_thread(true);
        }

        let event_loop = event_loop_builder
            .build()
            .map_err(|e| RunnerError::WinitEventLoopFailed(e.to_string()))?;

        let event_loop_proxy = event_loop.create_proxy();

        Ok(Self {
            app_runner: RunnerInner::new(),
            event_loop,
            event_loop_proxy,
            window_events_attributes: Vec::new(),
            rate_timing: Timing::new(0),
            pending_events: Vec::new(),
            next_window_id: 0,
        })
    }

    /// Returns the events collected by the last [Runner::pool_events] call.
    pub fn get_events(&self) -> &Vec<Event> {
        &self.pending_events
    }

    /// Creates a new [WindowBuilder] instance to build a new window.
    pub fn create_window(&mut self, title: &str, size: Point2) -> WindowBuilder<'_> {
        WindowBuilder::new(self, title, size)
    }

    /// This called from [WindowBuilder] to create a new window.
    pub(crate) fn internal_new_window(
        &mut self,
        title: String,
        size: Point2,
    ) -> Result<(usize, EventLoopProxy<WindowEvent>), RunnerError> {
        let window_id = self.next_window_id;
        self.next_window_id += 1;

        self.event_loop_proxy
            .send_event(WindowEvent::Create {
                ref_id: window_id,
                title,
                size,
            })
            .map_err(|_| RunnerError::EventLoopClosed)?;

        // The window is created inside `user_event`, which only runs while pumping.
        let _ = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app_runner);

        if self.app_runner.get_window_handle_by_ref(window_id).is_none() {
            let err = self
                .app_runner
                .last_error
                .take()
                .unwrap_or_else(|| "Failed to create window!".to_string());

            return Err(RunnerError::FailedToCreateWindow(err));
        }

        Ok((window_id, self.event_loop_proxy.clone()))
    }

    /// Pump the event loop and process events.
    ///
    /// - [PollMode::Poll] returns immediately if there are no events.
    /// - [PollMode::Wait] blocks until an event is available.
    ///
    /// Passing [None] is equivalent to `PollMode::Poll`. Returns `false` once the
    /// event loop has exited, i.e. after the last window was closed.
    pub fn pool_events<T>(&mut self, mode: T) -> bool
    where
        T: Into<Option<PollMode>>,
    {
        let duration = match mode.into() {
            Some(PollMode::Wait) => None,
            Some(PollMode::Poll) | None => Some(Duration::ZERO),
        };

        self.pending_events.clear();

        let status = self
            .event_loop
            .pump_app_events(duration, &mut self.app_runner);

        for window in self.window_events_attributes.iter() {
            let Some(mut window) = window.try_borrow_mut() else {
                continue;
            };

            window.process_event();

            let mut window_events = window.window_events.wait_borrow_mut();
            for event in window_events.drain(..) {
                if let Some(event) = translate_window_event(window.window_id, &event) {
                    self.pending_events.push(event);
                }
            }
        }

        if let PumpStatus::Exit(_code) = status {
            crate::dbg_log!("Event loop exited with code: {}", _code);
            return false;
        }

        self.rate_timing.sleep();

        true
    }

    /// Set the target frames per second, `0` disables the cap.
    pub fn set_target_fps(&mut self, fps: u32) {
        self.rate_timing.set_fps(fps);
    }

    pub fn get_target_fps(&self) -> u32 {
        self.rate_timing.get_target_fps()
    }

    /// Get the time taken by the last frame, in seconds.
    pub fn get_frame_time(&self) -> f64 {
        self.rate_timing.get_frame_time()
    }

    pub(crate) fn get_events_pointer(
        &self,
        window_id: usize,
    ) -> Option<ArcRef<Vec<event::WindowEvent>>> {
        self.app_runner.get_window_events_by_ref(window_id)
    }

    pub(crate) fn get_window_pointer(&self, window_id: usize) -> Option<ArcRef<Handle>> {
        self.app_runner.get_window_handle_by_ref(window_id)
    }
}

/// Maps a raw winit window event onto the crate's [Event]. Events the demo has
/// no use for map to `None`.
pub(crate) fn translate_window_event(window_id: usize, event: &event::WindowEvent) -> Option<Event> {
    match event {
        event::WindowEvent::CloseRequested => Some(Event::WindowClosed { window_id }),
        event::WindowEvent::Resized(size) => Some(Event::WindowResized {
            window_id,
            size: Point2::from(*size),
        }),
        event::WindowEvent::Focused(focused) => Some(Event::WindowFocused {
            window_id,
            focused: *focused,
        }),
        event::WindowEvent::RedrawRequested => Some(Event::RedrawRequested { window_id }),
        event::WindowEvent::CursorEntered { .. } => Some(Event::CursorEntered { window_id }),
        event::WindowEvent::CursorLeft { .. } => Some(Event::CursorLeft { window_id }),
        event::WindowEvent::CursorMoved { position, .. } => Some(Event::CursorMoved {
            window_id,
            pos: Point2::from(*position),
        }),
        event::WindowEvent::MouseInput { state, button, .. } => {
            let button = match button {
                event::MouseButton::Left => SmolStr::new("Left"),
                event::MouseButton::Right => SmolStr::new("Right"),
                event::MouseButton::Middle => SmolStr::new("Middle"),
                event::MouseButton::Back => SmolStr::new("Back"),
                event::MouseButton::Forward => SmolStr::new("Forward"),
                event::MouseButton::Other(_) => return None,
            };

            Some(Event::MouseInput {
                window_id,
                button,
                pressed: *state == event::ElementState::Pressed,
            })
        }
        event::WindowEvent::KeyboardInput {
            event,
            is_synthetic,
            ..
        } => {
            if *is_synthetic {
                return None;
            }

            let key = match &event.logical_key {
                Key::Character(text) => SmolStr::new(text.as_str()),
                Key::Named(named_key) => named_key_to_str(named_key)?,
                _ => return None,
            };

            Some(Event::KeyboardInput {
                window_id,
                key,
                pressed: event.state == event::ElementState::Pressed,
            })
        }
        _ => None,
    }
}

pub(crate) struct Handle {
    pub window: Option<Arc<WinitWindow>>,
    pub is_closed: bool,
}

impl Handle {
    pub fn new(window: Arc<WinitWindow>) -> Self {
        Self {
            window: Some(window),
            is_closed: false,
        }
    }

    pub fn close(&mut self) {
        self.window = None;
        self.is_closed = true;
    }

    pub fn get_window(&self) -> Option<&Arc<WinitWindow>> {
        if self.is_closed {
            return None;
        }

        self.window.as_ref()
    }
}

pub(crate) struct WindowHandle {
    pub window: ArcRef<Handle>,
    pub events: ArcRef<Vec<event::WindowEvent>>,

    pub ref_id: usize,
}

impl Drop for WindowHandle {
    fn drop(&mut self) {
        crate::dbg_log!("WindowHandle dropped: {:?}", self.ref_id);
    }
}

pub(crate) struct RunnerInner {
    pub handles: HashMap<WindowId, WindowHandle>,
    pub last_error: Option<String>,
}

impl RunnerInner {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
            last_error: None,
        }
    }

    pub fn get_window_handle_by_ref(&self, ref_id: usize) -> Option<ArcRef<Handle>> {
        self.handles
            .values()
            .find(|handle| handle.ref_id == ref_id)
            .map(|handle| handle.window.clone())
    }

    pub fn get_window_events_by_ref(
        &self,
        ref_id: usize,
    ) -> Option<ArcRef<Vec<event::WindowEvent>>> {
        self.handles
            .values()
            .find(|handle| handle.ref_id == ref_id)
            .map(|handle| handle.events.clone())
    }

    fn remove_by_ref(&mut self, event_loop: &ActiveEventLoop, ref_id: usize) {
        let window_id = self
            .handles
            .iter()
            .find(|(_, handle)| handle.ref_id == ref_id)
            .map(|(window_id, _)| *window_id);

        if let Some(window_id) = window_id {
            if let Some(handle) = self.handles.remove(&window_id) {
                handle.window.wait_borrow_mut().close();
            }
        }

        if self.handles.is_empty() {
            event_loop.exit();
        }
    }
}

impl ApplicationHandler<WindowEvent> for RunnerInner {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: event::WindowEvent,
    ) {
        let Some(handle) = self.handles.get(&window_id) else {
            return;
        };

        let is_close = matches!(event, event::WindowEvent::CloseRequested);
        let ref_id = handle.ref_id;

        // Queue the event before the handle goes away so the window still sees it.
        handle.events.wait_borrow_mut().push(event);

        if is_close {
            self.remove_by_ref(event_loop, ref_id);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        match event {
            WindowEvent::Create {
                ref_id,
                title,
                size,
            } => {
                let size: PhysicalSize<u32> = size.into();
                let window_attributes = WindowAttributes::default()
                    .with_title(title)
                    .with_visible(true)
                    .with_inner_size(size)
                    .with_resizable(false)
                    .with_max_inner_size(size)
                    .with_min_inner_size(size);

                match event_loop.create_window(window_attributes) {
                    Ok(window) => {
                        let window_id = window.id();
                        let window_handle = WindowHandle {
                            window: ArcRef::new(Handle::new(Arc::new(window))),
                            events: ArcRef::new(Vec::new()),
                            ref_id,
                        };

                        crate::dbg_log!("Window {} created", ref_id);
                        self.handles.insert(window_id, window_handle);
                    }
                    Err(e) => {
                        crate::dbg_log!("Failed to create window: {:?}", e);
                        self.last_error = Some(format!("Failed to create window: {}", e));
                    }
                }
            }
            WindowEvent::Close { ref_id } => {
                self.remove_by_ref(event_loop, ref_id);
            }
        }
    }
}

pub(crate) fn named_key_to_str(key: &NamedKey) -> Option<SmolStr> {
    let name = match key {
        NamedKey::Escape => "Escape",
        NamedKey::Enter => "Enter",
        NamedKey::Space => "Space",
        NamedKey::Tab => "Tab",
        NamedKey::Backspace => "Backspace",
        NamedKey::ArrowUp => "ArrowUp",
        NamedKey::ArrowDown => "ArrowDown",
        NamedKey::ArrowLeft => "ArrowLeft",
        NamedKey::ArrowRight => "ArrowRight",
        NamedKey::Shift => "Shift",
        NamedKey::Control => "Control",
        NamedKey::Alt => "Alt",
        NamedKey::F1 => "F1",
        NamedKey::F2 => "F2",
        NamedKey::F3 => "F3",
        NamedKey::F4 => "F4",
        _ => return None,
    };

    Some(SmolStr::new(name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Return immediately when no events are queued.
    Poll,
    /// Block until at least one event arrives.
    Wait,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The window was closed, either by the user or programmatically.
    WindowClosed { window_id: usize },
    /// The window gained or lost focus.
    WindowFocused { window_id: usize, focused: bool },
    /// The window surface changed size, in pixels.
    WindowResized { window_id: usize, size: Point2 },
    CursorEntered { window_id: usize },
    CursorLeft { window_id: usize },
    /// The cursor moved within the window. Position in pixels, origin top-left.
    CursorMoved { window_id: usize, pos: Point2 },
    /// A mouse button changed state.
    ///
    /// `button` is one of "Left", "Right", "Middle", "Back" or "Forward".
    MouseInput {
        window_id: usize,
        button: SmolStr,
        pressed: bool,
    },
    /// The platform asked for the window contents to be redrawn.
    RedrawRequested { window_id: usize },
    /// A key changed state. Named keys use their winit name ("Escape", "Enter", ...),
    /// character keys carry the produced text.
    KeyboardInput {
        window_id: usize,
        key: SmolStr,
        pressed: bool,
    },
}

#[derive(Clone, Debug)]
pub(crate) enum WindowEvent {
    Create {
        ref_id: usize,
        title: String,
        size: Point2,
    },
    Close {
        ref_id: usize,
    },
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RunnerError {
    WinitEventLoopFailed(String),
    EventLoopClosed,
    FailedToCreateWindow(String),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerError::WinitEventLoopFailed(e) => write!(f, "Failed to create event loop: {}", e),
            RunnerError::EventLoopClosed => write!(f, "Event loop is no longer running"),
            RunnerError::FailedToCreateWindow(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunnerError {}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn translates_cursor_and_resize() {
        let moved = event::WindowEvent::CursorMoved {
            device_id: event::DeviceId::dummy(),
            position: PhysicalPosition::new(120.6, 44.2),
        };
        assert_eq!(
            translate_window_event(3, &moved),
            Some(Event::CursorMoved {
                window_id: 3,
                pos: Point2::new(120, 44),
            })
        );

        let resized = event::WindowEvent::Resized(PhysicalSize::new(640, 480));
        assert_eq!(
            translate_window_event(0, &resized),
            Some(Event::WindowResized {
                window_id: 0,
                size: Point2::new(640, 480),
            })
        );
    }

    #[test]
    fn translates_close_and_mouse_buttons() {
        assert_eq!(
            translate_window_event(1, &event::WindowEvent::CloseRequested),
            Some(Event::WindowClosed { window_id: 1 })
        );

        let click = event::WindowEvent::MouseInput {
            device_id: event::DeviceId::dummy(),
            state: event::ElementState::Pressed,
            button: event::MouseButton::Left,
        };
        assert_eq!(
            translate_window_event(1, &click),
            Some(Event::MouseInput {
                window_id: 1,
                button: SmolStr::new("Left"),
                pressed: true,
            })
        );

        let other = event::WindowEvent::MouseInput {
            device_id: event::DeviceId::dummy(),
            state: event::ElementState::Released,
            button: event::MouseButton::Other(9),
        };
        assert_eq!(translate_window_event(1, &other), None);
    }

    #[test]
    fn ignores_unused_events() {
        let moved = event::WindowEvent::Moved(PhysicalPosition::new(5, 5));
        assert_eq!(translate_window_event(0, &moved), None);
    }

    #[test]
    fn named_keys() {
        assert_eq!(named_key_to_str(&NamedKey::Escape), Some(SmolStr::new("Escape")));
        assert_eq!(named_key_to_str(&NamedKey::AudioVolumeMute), None);
    }
}
