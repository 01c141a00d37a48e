use winit::{event, event_loop::EventLoopProxy};

use crate::{
    math::Point2,
    runner::{Handle, Runner, RunnerError, WindowEvent},
    software::PixelBufferInner,
    utils::ArcRef,
};

/// A fixed-size native window owned by a [Runner].
#[derive(Clone)]
pub struct Window {
    pub(crate) inner: ArcRef<WindowInner>,
}

impl Window {
    pub(crate) fn new(runner: &mut Runner, title: String, size: Point2) -> Result<Self, WindowError> {
        let (window_id, proxy) = runner
            .internal_new_window(title, size)
            .map_err(WindowError::RunnerError)?;

        let window_events = runner
            .get_events_pointer(window_id)
            .ok_or(WindowError::WindowNotFound)?;
        let window_pointer = runner
            .get_window_pointer(window_id)
            .ok_or(WindowError::WindowNotFound)?;

        let inner = ArcRef::new(WindowInner {
            window_id,
            window_events,
            window_pointer: Some(window_pointer),
            proxy,
            size,
            pixelbuffer: None,
        });

        runner.window_events_attributes.push(inner.clone());

        Ok(Self { inner })
    }

    /// Unique identifier of this window, matches the `window_id` of its events.
    pub fn id(&self) -> usize {
        self.inner.wait_borrow().window_id
    }

    /// Inner size of the window in pixels.
    pub fn size(&self) -> Point2 {
        self.inner.wait_borrow().size
    }

    /// `true` once the window was closed by the user or by [Window::quit].
    pub fn is_closed(&self) -> bool {
        self.inner.wait_borrow().window_pointer.is_none()
    }

    /// Send quit event to the runner to close the window.
    pub fn quit(&self) {
        let inner = self.inner.wait_borrow();

        _ = inner.proxy.send_event(WindowEvent::Close {
            ref_id: inner.window_id,
        });
    }
}

pub struct WindowBuilder<'a> {
    runner: &'a mut Runner,
    title: String,
    size: Point2,
}

impl<'a> WindowBuilder<'a> {
    pub(crate) fn new(runner: &'a mut Runner, title: &str, size: Point2) -> Self {
        WindowBuilder {
            runner,
            title: title.to_string(),
            size,
        }
    }

    pub fn build(self) -> Result<Window, WindowError> {
        if self.size.x <= 0 || self.size.y <= 0 {
            return Err(WindowError::InvalidSize(self.size));
        }

        Window::new(self.runner, self.title, self.size)
    }
}

pub(crate) struct WindowInner {
    pub window_id: usize,
    pub window_events: ArcRef<Vec<event::WindowEvent>>,
    pub window_pointer: Option<ArcRef<Handle>>,
    pub proxy: EventLoopProxy<WindowEvent>,
    pub size: Point2,

    pub(crate) pixelbuffer: Option<ArcRef<PixelBufferInner>>,
}

impl WindowInner {
    pub fn process_event(&mut self) {
        for event in self.window_events.wait_borrow().iter() {
            match event {
                event::WindowEvent::CloseRequested => {
                    self.pixelbuffer = None;
                    self.window_pointer = None;
                }
                event::WindowEvent::Resized(size) => {
                    if let Some(pixelbuffer) = &self.pixelbuffer {
                        if let Err(e) = pixelbuffer.wait_borrow_mut().resize(*size) {
                            crate::warn_log!("{}", e);
                        }
                    }

                    self.size = Point2::from(*size);
                }
                _ => {}
            }
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum WindowError {
    RunnerError(RunnerError),
    WindowNotFound,
    InvalidSize(Point2),
}

impl std::fmt::Display for WindowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowError::RunnerError(e) => write!(f, "Runner error: {}", e),
            WindowError::WindowNotFound => write!(f, "Window was not registered by the runner"),
            WindowError::InvalidSize(size) => {
                write!(f, "Invalid window size: {}x{}", size.x, size.y)
            }
        }
    }
}

impl std::error::Error for WindowError {}
