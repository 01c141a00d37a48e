//! Demo settings and their command-line overrides.

use std::time::Duration;

use clap::Parser;

use crate::math::{Point2, Vector2};

/// RGB color changing text with a cursor-driven particle fountain
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "rgb-particles", version, about, long_about = None)]
pub struct Args {
    /// Font file, or the name of an installed font
    #[arg(short, long, default_value = DemoConfig::DEFAULT_FONT)]
    pub font: String,

    /// Text to draw
    #[arg(short, long, default_value = DemoConfig::DEFAULT_TEXT)]
    pub text: String,

    /// Character size in pixels
    #[arg(short, long, default_value_t = DemoConfig::DEFAULT_CHARACTER_SIZE)]
    pub size: f32,

    /// Number of particles
    #[arg(short, long, default_value_t = DemoConfig::DEFAULT_PARTICLES)]
    pub particles: usize,

    /// Frame rate cap, 0 for uncapped
    #[arg(long, default_value_t = 0)]
    pub fps: u32,

    /// Window width in pixels
    #[arg(long, default_value_t = DemoConfig::DEFAULT_WIDTH)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = DemoConfig::DEFAULT_HEIGHT)]
    pub height: u32,

    /// Seed for the particle generator, random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub title: String,
    pub window_size: Point2,
    pub font: String,
    pub text: String,
    pub character_size: f32,
    pub text_position: Vector2,
    pub particle_count: usize,
    pub seed: Option<u64>,
    pub target_fps: u32,
    /// Upper bound on the simulation step, so a stalled frame does not wipe out
    /// every particle at once.
    pub max_frame_step: Duration,
}

impl DemoConfig {
    pub const DEFAULT_TITLE: &'static str = "RGB Color Changing Text";
    pub const DEFAULT_FONT: &'static str = "arial.ttf";
    pub const DEFAULT_TEXT: &'static str = "thats deep";
    pub const DEFAULT_CHARACTER_SIZE: f32 = 50.0;
    pub const DEFAULT_PARTICLES: usize = 103_200;
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: Self::DEFAULT_TITLE.to_string(),
            window_size: Point2::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT),
            font: Self::DEFAULT_FONT.to_string(),
            text: Self::DEFAULT_TEXT.to_string(),
            character_size: Self::DEFAULT_CHARACTER_SIZE,
            text_position: Vector2::new(100.0, 250.0),
            particle_count: Self::DEFAULT_PARTICLES,
            seed: None,
            target_fps: 0,
            max_frame_step: Duration::from_millis(250),
        }
    }
}

impl From<Args> for DemoConfig {
    fn from(args: Args) -> Self {
        Self {
            window_size: Point2::new(args.width, args.height),
            font: args.font,
            text: args.text,
            character_size: args.size,
            particle_count: args.particles,
            seed: args.seed,
            target_fps: args.fps,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_demo() {
        let args = Args::try_parse_from(["rgb-particles"]).expect("no arguments is valid");
        assert!(!args.verbose);

        let config = DemoConfig::from(args);
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.window_size, Point2::new(800, 600));
        assert_eq!(config.text, "thats deep");
        assert_eq!(config.particle_count, 103_200);
        assert_eq!(config.text_position, Vector2::new(100.0, 250.0));
        assert_eq!(config.max_frame_step, Duration::from_millis(250));
    }

    #[test]
    fn overrides() {
        let args = Args::try_parse_from([
            "rgb-particles",
            "--font",
            "/tmp/DejaVuSans.ttf",
            "-t",
            "hello",
            "--size",
            "32",
            "-p",
            "1000",
            "--fps",
            "144",
            "--width",
            "1024",
            "--height",
            "768",
            "--seed",
            "9",
            "-v",
        ])
        .expect("valid arguments");
        assert!(args.verbose);

        let config = DemoConfig::from(args);
        assert_eq!(config.font, "/tmp/DejaVuSans.ttf");
        assert_eq!(config.text, "hello");
        assert_eq!(config.character_size, 32.0);
        assert_eq!(config.particle_count, 1000);
        assert_eq!(config.target_fps, 144);
        assert_eq!(config.window_size, Point2::new(1024, 768));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.title, DemoConfig::DEFAULT_TITLE);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(Args::try_parse_from(["rgb-particles", "--particles", "-3"]).is_err());
        assert!(Args::try_parse_from(["rgb-particles", "--width", "wide"]).is_err());
    }
}
