mod color;
mod point;
mod timing;
mod vector;
mod vertex;

pub use color::Color;
pub use point::Point2;
pub use timing::{Clock, Timing};
pub use vector::Vector2;
pub use vertex::Vertex;
