pub use super::config::DemoConfig;
pub use super::demo::{Demo, DemoError, RainbowText, rainbow_color};
pub use super::font::*;
pub use super::input::Input;
pub use super::math::*;
pub use super::particles::{Particle, ParticleSystem};
pub use super::runner::{Event, PollMode, Runner, RunnerError};
pub use super::software::{Canvas, PixelBuffer};
pub use super::window::*;
pub use super::{create_font_manager, create_pixel_buffer, create_runner};
