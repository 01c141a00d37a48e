//! Software presentation through the softbuffer crate.
//!
//! [PixelBuffer] only copies a finished frame to the window surface; all drawing
//! happens on the CPU in a [Canvas].

use std::{num::NonZero, sync::Arc};

use winit::dpi::PhysicalSize;

use crate::{math::Point2, utils::ArcRef, window::Window};

mod canvas;
pub use canvas::Canvas;

/// Creates a new [PixelBuffer] builder.
/// This is not thread-safe and must be called from the same thread as the window.
pub fn new<'a>(window: Option<&'a mut Window>) -> PixelBufferBuilder<'a> {
    let builder = PixelBufferBuilder::new();

    if let Some(window) = window {
        builder.with_window(window)
    } else {
        builder
    }
}

/// A wrapper around softbuffer presenting `0x00RRGGBB` frames to a window.
#[derive(Clone)]
pub struct PixelBuffer {
    pub(crate) inner: ArcRef<PixelBufferInner>,
}

impl PixelBuffer {
    pub(crate) fn new(window: &Window) -> Result<Self, PixelBufferError> {
        let window_handle = {
            let window_inner = window.inner.wait_borrow();
            let handle = window_inner
                .window_pointer
                .as_ref()
                .ok_or(PixelBufferError::WindowPointerIsNull)?;

            let handle = handle.wait_borrow();
            handle
                .get_window()
                .cloned()
                .ok_or(PixelBufferError::WindowPointerIsNull)?
        };

        let context = SoftbufferContext::new(window_handle.clone())
            .map_err(|_| PixelBufferError::ContextCreationFailed)?;
        let surface = SoftbufferSurface::new(&context, window_handle.clone())
            .map_err(|_| PixelBufferError::SurfaceCreationFailed)?;

        let mut softbuffer_inner = PixelBufferInner {
            _context: context,
            surface,
            surface_size: Point2::ZERO,
        };

        // Not every platform sends an initial `Resized`, size the surface up front.
        if let Err(e) = softbuffer_inner.resize(window_handle.inner_size()) {
            crate::dbg_log!("Initial surface resize skipped: {}", e);
        }

        Ok(PixelBuffer {
            inner: ArcRef::new(softbuffer_inner),
        })
    }

    /// Size of the surface in pixels.
    pub fn size(&self) -> Point2 {
        let inner = self.inner.wait_borrow();
        inner.surface_size
    }

    /// Copy `pixels` to the surface and present it.
    ///
    /// `pixels` must hold exactly `size.x * size.y` values and `size` must match the
    /// surface size, otherwise rows would land at the wrong stride.
    pub fn write_buffers(&mut self, pixels: &[u32], size: Point2) -> Result<(), PixelBufferError> {
        let mut inner = self.inner.wait_borrow_mut();

        check_frame(pixels.len(), size, inner.surface_size)?;

        let mut pixel_buffers = inner
            .surface
            .buffer_mut()
            .map_err(|_| PixelBufferError::BufferFetchFailed)?;

        if pixel_buffers.len() < pixels.len() {
            return Err(PixelBufferError::BufferTooSmall);
        }

        pixel_buffers[..pixels.len()].copy_from_slice(pixels);

        pixel_buffers
            .present()
            .map_err(|_| PixelBufferError::PresentFailed)
    }

    /// Present a finished [Canvas].
    pub fn present(&mut self, canvas: &Canvas) -> Result<(), PixelBufferError> {
        self.write_buffers(canvas.pixels(), canvas.size())
    }
}

fn check_frame(len: usize, size: Point2, surface_size: Point2) -> Result<(), PixelBufferError> {
    if len != size.area() {
        return Err(PixelBufferError::InvalidSize(size.x as u32, size.y as u32));
    }

    if surface_size == Point2::ZERO {
        return Err(PixelBufferError::InvalidSurfaceSize);
    }

    if size != surface_size {
        return Err(PixelBufferError::InvalidSize(size.x as u32, size.y as u32));
    }

    Ok(())
}

pub type SoftbufferSurface = softbuffer::Surface<Arc<winit::window::Window>, Arc<winit::window::Window>>;
pub type SoftbufferContext = softbuffer::Context<Arc<winit::window::Window>>;

pub(crate) struct PixelBufferInner {
    pub _context: SoftbufferContext,
    pub surface: SoftbufferSurface,
    pub surface_size: Point2,
}

impl PixelBufferInner {
    pub fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), String> {
        let width: NonZero<u32> = NonZero::new(size.width).ok_or("Width cannot be zero")?;
        let height: NonZero<u32> = NonZero::new(size.height).ok_or("Height cannot be zero")?;

        self.surface
            .resize(width, height)
            .map_err(|e| format!("Failed to resize softbuffer surface: {:?}", e))?;

        self.surface_size = Point2::from(size);

        Ok(())
    }
}

pub struct PixelBufferBuilder<'a> {
    window: Option<&'a mut Window>,
}

impl<'a> PixelBufferBuilder<'a> {
    pub(crate) fn new() -> Self {
        PixelBufferBuilder { window: None }
    }

    /// Binds the pixel buffer to `window`.
    pub fn with_window(mut self, window: &'a mut Window) -> Self {
        self.window = Some(window);
        self
    }

    pub fn build(self) -> Result<PixelBuffer, PixelBufferBuilderError> {
        let window = self.window.ok_or(PixelBufferBuilderError::WindowIsNull)?;

        if window.inner.borrow().pixelbuffer.is_some() {
            return Err(PixelBufferBuilderError::AlreadyAttached);
        }

        let pixel_buffer =
            PixelBuffer::new(window).map_err(PixelBufferBuilderError::PixelBufferError)?;

        let mut window_inner = window.inner.borrow_mut();
        window_inner.pixelbuffer = Some(pixel_buffer.inner.clone());

        Ok(pixel_buffer)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelBufferError {
    WindowPointerIsNull,
    ContextCreationFailed,
    SurfaceCreationFailed,
    InvalidSize(u32, u32),
    InvalidSurfaceSize,
    BufferFetchFailed,
    BufferTooSmall,
    PresentFailed,
}

impl std::fmt::Display for PixelBufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelBufferError::WindowPointerIsNull => write!(f, "Window pointer is null"),
            PixelBufferError::ContextCreationFailed => {
                write!(f, "Failed to create pixel buffer context")
            }
            PixelBufferError::SurfaceCreationFailed => {
                write!(f, "Failed to create pixel buffer surface")
            }
            PixelBufferError::InvalidSize(width, height) => {
                write!(f, "Invalid size: {}x{}", width, height)
            }
            PixelBufferError::InvalidSurfaceSize => write!(f, "Pixel buffer surface size is zero"),
            PixelBufferError::BufferFetchFailed => write!(f, "Failed to fetch pixel buffer"),
            PixelBufferError::BufferTooSmall => write!(f, "Pixel buffer is too small"),
            PixelBufferError::PresentFailed => write!(f, "Failed to present pixel buffer"),
        }
    }
}

impl std::error::Error for PixelBufferError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelBufferBuilderError {
    WindowIsNull,
    AlreadyAttached,
    PixelBufferError(PixelBufferError),
}

impl std::fmt::Display for PixelBufferBuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelBufferBuilderError::WindowIsNull => {
                write!(f, "PixelBuffer must be created with a window")
            }
            PixelBufferBuilderError::AlreadyAttached => {
                write!(f, "Window already has a PixelBuffer attached")
            }
            PixelBufferBuilderError::PixelBufferError(e) => write!(f, "PixelBuffer error: {}", e),
        }
    }
}

impl std::error::Error for PixelBufferBuilderError {}
