//! CPU particle system emitting points from a movable emitter.
//!
//! Every particle owns one [Vertex]. Dead particles respawn at the emitter with a
//! random direction, speed and lifetime, and fade out as their lifetime runs down.

use std::{f32::consts::PI, time::Duration};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    math::{Color, Vector2, Vertex},
    software::Canvas,
};

/// Longest lifetime a respawned particle can get, also the reference for the fade.
pub const MAX_LIFETIME: Duration = Duration::from_secs(3);

const MIN_SPEED: f32 = 50.0;
const SPEED_SPREAD: u32 = 50;
const MIN_LIFETIME_MS: u64 = 1000;
const LIFETIME_SPREAD_MS: u64 = 2000;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    /// Pixels per second.
    pub velocity: Vector2,
    /// Seconds left before the particle respawns. May go negative within a frame.
    pub lifetime: f32,
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    vertices: Vec<Vertex>,
    lifetime: Duration,
    emitter: Vector2,
    rng: StdRng,
}

impl ParticleSystem {
    /// Creates `count` dead particles at the origin, seeded from the OS.
    /// They all respawn at the emitter on the first [ParticleSystem::update].
    pub fn new(count: usize) -> Self {
        Self::with_rng(count, StdRng::from_os_rng())
    }

    /// Same as [ParticleSystem::new] with a reproducible random sequence.
    pub fn with_seed(count: usize, seed: u64) -> Self {
        Self::with_rng(count, StdRng::seed_from_u64(seed))
    }

    fn with_rng(count: usize, rng: StdRng) -> Self {
        Self {
            particles: vec![Particle::default(); count],
            vertices: vec![Vertex::new(Vector2::ZERO, Color::WHITE); count],
            lifetime: MAX_LIFETIME,
            emitter: Vector2::ZERO,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn emitter(&self) -> Vector2 {
        self.emitter
    }

    /// Moves the emitter. Live particles keep flying; only respawns use the new spot.
    pub fn set_emitter(&mut self, position: Vector2) {
        self.emitter = position;
    }

    pub fn max_lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Advances every particle by `elapsed`.
    pub fn update(&mut self, elapsed: Duration) {
        let dt = elapsed.as_secs_f32();
        let max_lifetime = self.lifetime.as_secs_f32();

        for i in 0..self.particles.len() {
            self.particles[i].lifetime -= dt;

            if self.particles[i].lifetime <= 0.0 {
                self.reset_particle(i);
            }

            let particle = self.particles[i];
            let vertex = &mut self.vertices[i];

            vertex.position += particle.velocity * dt;

            let ratio = if max_lifetime > 0.0 {
                particle.lifetime / max_lifetime
            } else {
                0.0
            };
            vertex.color.a = ratio.clamp(0.0, 1.0);
        }
    }

    fn reset_particle(&mut self, index: usize) {
        let angle = self.rng.random_range(0..360u32) as f32 * PI / 180.0;
        let speed = self.rng.random_range(0..SPEED_SPREAD) as f32 + MIN_SPEED;
        let lifetime_ms = self.rng.random_range(0..LIFETIME_SPREAD_MS) + MIN_LIFETIME_MS;

        self.particles[index] = Particle {
            velocity: Vector2::from_polar(angle, speed),
            lifetime: Duration::from_millis(lifetime_ms).as_secs_f32(),
        };

        self.vertices[index].position = self.emitter;
    }

    /// Plots every particle as a single alpha-blended pixel.
    pub fn draw(&self, canvas: &mut Canvas) {
        for vertex in &self.vertices {
            canvas.draw_point(vertex.position, vertex.color);
        }
    }
}
