//! The RGB text and particle demo: frame composition and the main loop.

use std::time::Duration;

use crate::{
    config::DemoConfig,
    font::{Font, FontError, FontManager, TextBitmap},
    input::Input,
    math::{Clock, Color, Point2, Vector2},
    particles::ParticleSystem,
    runner::{self, Event, PollMode, RunnerError},
    software::{self, Canvas, PixelBufferBuilderError, PixelBufferError},
    window::WindowError,
};

/// Fill color at `t` seconds: three sine waves a third of a turn apart, mapped
/// to `0..=1`.
pub fn rainbow_color(t: f32) -> Color {
    Color::new(
        (t.sin() + 1.0) * 0.5,
        ((t + 2.0).sin() + 1.0) * 0.5,
        ((t + 4.0).sin() + 1.0) * 0.5,
        1.0,
    )
}

/// A line of text whose fill color cycles with time.
///
/// The glyph mask is baked once; only the tint changes per frame.
pub struct RainbowText {
    bitmap: TextBitmap,
    position: Vector2,
    color: Color,
}

impl RainbowText {
    pub fn new(font: &Font, text: &str, position: Vector2) -> Result<Self, FontError> {
        Ok(Self {
            bitmap: font.bake_text(text)?,
            position,
            color: rainbow_color(0.0),
        })
    }

    pub fn from_bitmap(bitmap: TextBitmap, position: Vector2) -> Self {
        Self {
            bitmap,
            position,
            color: rainbow_color(0.0),
        }
    }

    /// Recomputes the fill color from the total time since start.
    pub fn set_time(&mut self, elapsed: Duration) {
        self.color = rainbow_color(elapsed.as_secs_f32());
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let top_left = Point2::from(self.position + self.bitmap.offset);
        canvas.draw_coverage(&self.bitmap.coverage, self.bitmap.size(), top_left, self.color);
    }
}

/// Everything drawn in a frame, independent of the window it ends up in.
pub struct Demo {
    pub text: RainbowText,
    pub particles: ParticleSystem,
    pub canvas: Canvas,
    max_frame_step: Duration,
}

impl Demo {
    pub fn new(config: &DemoConfig, text: RainbowText) -> Self {
        let particles = match config.seed {
            Some(seed) => ParticleSystem::with_seed(config.particle_count, seed),
            None => ParticleSystem::new(config.particle_count),
        };

        Self {
            text,
            particles,
            canvas: Canvas::new(config.window_size),
            max_frame_step: config.max_frame_step,
        }
    }

    /// Builds one frame.
    ///
    /// `elapsed` is the time since start and drives the text color, `delta` is the
    /// time since the previous frame and drives the particles.
    /// The particle step is capped at `max_frame_step`.
    pub fn frame(&mut self, elapsed: Duration, delta: Duration, cursor: Vector2) {
        self.canvas.clear(Color::BLACK);

        self.text.set_time(elapsed);
        self.text.draw(&mut self.canvas);

        self.particles.set_emitter(cursor);
        self.particles.update(delta.min(self.max_frame_step));
        self.particles.draw(&mut self.canvas);
    }
}

/// Opens the window and runs the demo until it is closed.
pub fn run(config: DemoConfig) -> Result<(), DemoError> {
    let mut fonts = FontManager::new();
    let font = fonts
        .load_font(&config.font, config.character_size)
        .map_err(DemoError::FontLoad)?;

    crate::log!(
        "Loaded font {} at {}px from {}",
        font.name(),
        font.size(),
        font.path().display()
    );

    let text = RainbowText::new(&font, &config.text, config.text_position)?;

    let mut runner = runner::new()?;
    runner.set_target_fps(config.target_fps);

    let mut window = runner
        .create_window(&config.title, config.window_size)
        .build()?;

    let mut pixel_buffer = software::new(Some(&mut window)).build()?;

    let mut demo = Demo::new(&config, text);
    let mut input = Input::new(window.id());
    let mut clock = Clock::new();

    let window_size = window.size();
    crate::log!(
        "Running with {} particles in a {}x{} window, fps cap {}",
        demo.particles.len(),
        window_size.x,
        window_size.y,
        runner.get_target_fps()
    );

    while runner.pool_events(PollMode::Poll) {
        let events = runner.get_events();
        input.process_events(events);

        let closed = events
            .iter()
            .any(|event| matches!(event, Event::WindowClosed { .. }));

        if closed || window.is_closed() {
            break;
        }

        // The surface follows `Resized` and may differ from the requested size on
        // scaled displays.
        let surface_size = pixel_buffer.size();
        if surface_size != demo.canvas.size() && surface_size.area() > 0 {
            demo.canvas.resize(surface_size);
        }

        if input.is_key_just_pressed("Escape") {
            window.quit();
        }

        let delta = clock.tick();
        demo.frame(clock.elapsed(), delta, input.mouse_position());

        match pixel_buffer.present(&demo.canvas) {
            Ok(()) => {}
            // The surface can lag a resize by a frame.
            Err(PixelBufferError::InvalidSurfaceSize)
            | Err(PixelBufferError::InvalidSize(..))
            | Err(PixelBufferError::BufferTooSmall) => {}
            Err(e) => return Err(e.into()),
        }
    }

    crate::dbg_log!(
        "Main loop finished after {:?}, last frame took {:.4}s",
        clock.elapsed(),
        runner.get_frame_time()
    );

    Ok(())
}

#[derive(Debug)]
pub enum DemoError {
    /// The font asset could not be loaded; the only expected failure.
    FontLoad(FontError),
    Text(FontError),
    Runner(RunnerError),
    Window(WindowError),
    PixelBuffer(PixelBufferBuilderError),
    Present(PixelBufferError),
}

impl std::fmt::Display for DemoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemoError::FontLoad(e) => write!(f, "Error loading font: {}", e),
            DemoError::Text(e) => write!(f, "Error preparing text: {}", e),
            DemoError::Runner(e) => write!(f, "Runner error: {}", e),
            DemoError::Window(e) => write!(f, "Window error: {}", e),
            DemoError::PixelBuffer(e) => write!(f, "{}", e),
            DemoError::Present(e) => write!(f, "Present error: {}", e),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DemoError::FontLoad(e) | DemoError::Text(e) => Some(e),
            DemoError::Runner(e) => Some(e),
            DemoError::Window(e) => Some(e),
            DemoError::PixelBuffer(e) => Some(e),
            DemoError::Present(e) => Some(e),
        }
    }
}

impl From<FontError> for DemoError {
    fn from(e: FontError) -> Self {
        DemoError::Text(e)
    }
}

impl From<RunnerError> for DemoError {
    fn from(e: RunnerError) -> Self {
        DemoError::Runner(e)
    }
}

impl From<WindowError> for DemoError {
    fn from(e: WindowError) -> Self {
        DemoError::Window(e)
    }
}

impl From<PixelBufferBuilderError> for DemoError {
    fn from(e: PixelBufferBuilderError) -> Self {
        DemoError::PixelBuffer(e)
    }
}

impl From<PixelBufferError> for DemoError {
    fn from(e: PixelBufferError) -> Self {
        DemoError::Present(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn square_text(position: Vector2) -> RainbowText {
        RainbowText::from_bitmap(
            TextBitmap {
                width: 2,
                height: 2,
                coverage: vec![255; 4],
                offset: Vector2::new(0.0, 0.0),
            },
            position,
        )
    }

    fn small_config(particles: usize) -> DemoConfig {
        DemoConfig {
            window_size: Point2::new(16, 16),
            particle_count: particles,
            seed: Some(1),
            ..DemoConfig::default()
        }
    }

    #[test]
    fn rainbow_starts_red_heavy() {
        let c = rainbow_color(0.0);
        assert!(approx(c.r, 0.5));
        assert!(approx(c.g, (2.0f32.sin() + 1.0) * 0.5));
        assert!(approx(c.b, (4.0f32.sin() + 1.0) * 0.5));
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn rainbow_stays_in_range_and_is_periodic() {
        for step in 0..200 {
            let t = step as f32 * 0.1;
            let c = rainbow_color(t);
            for v in [c.r, c.g, c.b] {
                assert!((0.0..=1.0).contains(&v), "{} at {}", v, t);
            }

            let later = rainbow_color(t + std::f32::consts::TAU);
            assert!((c.r - later.r).abs() < 1e-3);
        }

        let peak = rainbow_color(std::f32::consts::FRAC_PI_2);
        assert!(peak.to_bytes()[0] >= 254);
    }

    #[test]
    fn text_is_tinted_with_the_current_color() {
        let mut canvas = Canvas::new(Point2::new(8, 8));
        let mut text = square_text(Vector2::new(3.0, 4.0));

        text.set_time(Duration::from_secs_f32(std::f32::consts::FRAC_PI_2));
        text.draw(&mut canvas);

        let expected = text.color().to_pixel();
        assert_eq!(canvas.get_pixel(3, 4), Some(expected));
        assert_eq!(canvas.get_pixel(4, 5), Some(expected));
        assert_eq!(canvas.get_pixel(5, 5), Some(0));
    }

    #[test]
    fn frame_draws_particles_over_the_text() {
        let mut demo = Demo::new(&small_config(4), square_text(Vector2::new(2.0, 2.0)));

        demo.frame(Duration::ZERO, Duration::ZERO, Vector2::new(2.5, 2.5));

        // Fresh particles are white with alpha >= 1/3 over the text color.
        let text_pixel = Color::from_pixel(demo.text.color().to_pixel());
        let covered = Color::from_pixel(demo.canvas.get_pixel(2, 2).unwrap_or_default());
        assert!(covered.r >= text_pixel.r);
        assert!(covered.g > text_pixel.g);
        assert!(covered.b > text_pixel.b);

        assert_eq!(demo.particles.emitter(), Vector2::new(2.5, 2.5));
        assert_eq!(demo.canvas.get_pixel(0, 0), Some(0));
    }

    #[test]
    fn frame_step_is_capped() {
        let mut demo = Demo::new(&small_config(16), square_text(Vector2::ZERO));
        demo.frame(Duration::ZERO, Duration::ZERO, Vector2::new(8.0, 8.0));
        let before: Vec<f32> = demo.particles.particles().iter().map(|p| p.lifetime).collect();

        // A ten second hitch only advances the simulation by the cap.
        demo.frame(Duration::from_secs(10), Duration::from_secs(10), Vector2::new(8.0, 8.0));

        for (old, new) in before.iter().zip(demo.particles.particles()) {
            assert!((new.lifetime - (old - 0.25)).abs() < 1e-4);
        }
    }

    #[test]
    fn font_failures_are_reported_as_font_load() {
        let err = DemoError::FontLoad(FontError::NotFound("arial.ttf".to_string()));
        assert_eq!(err.to_string(), "Error loading font: Font not found: arial.ttf");
        assert!(std::error::Error::source(&err).is_some());
    }
}
