//! RGB color cycling text with a cursor-driven CPU particle system, on winit & softbuffer

/// Command-line and default settings
pub mod config;
/// Frame composition and the main loop
pub mod demo;
/// Font loading and text rasterization
pub mod font;
/// Per-window keyboard and mouse state
pub mod input;
/// Mathematical utilities and types
pub mod math;
/// CPU particle system
pub mod particles;
/// Predefined types and traits for easy access
pub mod prelude;
/// Runner for managing the main event loop and window lifecycle
pub mod runner;
/// Software rendering utilities
pub mod software;
/// Utility functions and types for common tasks
pub mod utils;
/// Window management
pub mod window;

/// Creates the [runner::Runner] that owns the event loop.
pub fn create_runner() -> Result<runner::Runner, runner::RunnerError> {
    runner::new()
}

/// Creates a [software::PixelBuffer] builder bound to `window`.
pub fn create_pixel_buffer(window: Option<&mut window::Window>) -> software::PixelBufferBuilder<'_> {
    software::new(window)
}

/// Creates a [font::FontManager].
pub fn create_font_manager() -> font::FontManager {
    font::new()
}
