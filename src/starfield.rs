use bevy::prelude::*;
use rand::Rng;

use crate::resources::{COMET_SPEED, COMETS_PER_SHOWER};

/// Largest roll (inclusive) that triggers a flicker out of `0..=FLICKER_ROLL_MAX`.
const FLICKER_HITS: u32 = 1;
const FLICKER_ROLL_MAX: u32 = 100;

/// A background star that occasionally swells or shrinks by one pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    /// Screen position in pixels (origin top-left).
    pub position: Vec2,
    pub radius: u32,
    shrinking: bool,
}

impl Star {
    pub fn new(position: Vec2, radius: u32) -> Self {
        Self {
            position,
            radius,
            shrinking: true,
        }
    }

    pub fn random(rng: &mut impl Rng, width: f32, height: f32) -> Self {
        let position = vec2(
            rng.random_range(0..=width as u32) as f32,
            rng.random_range(0..=height as u32) as f32,
        );
        Self::new(position, rng.random_range(0..=1))
    }

    /// Rolls the per-frame flicker chance and toggles when it hits.
    pub fn flicker(&mut self, rng: &mut impl Rng) -> bool {
        let hit = rng.random_range(0..=FLICKER_ROLL_MAX) <= FLICKER_HITS;
        if hit {
            self.toggle();
        }
        hit
    }

    /// Shrinks once if allowed, otherwise grows; the direction alternates.
    pub fn toggle(&mut self) {
        if self.shrinking && self.radius > 1 {
            self.radius -= 1;
            self.shrinking = false;
        } else {
            self.radius += 1;
            self.shrinking = true;
        }
    }
}

/// Fixed set of background stars spread over the viewport.
#[derive(Resource, Default, Debug)]
pub struct StarField {
    pub stars: Vec<Star>,
}

impl StarField {
    pub fn scatter(rng: &mut impl Rng, count: usize, width: f32, height: f32) -> Self {
        Self {
            stars: (0..count).map(|_| Star::random(rng, width, height)).collect(),
        }
    }

    pub fn flicker(&mut self, rng: &mut impl Rng) {
        for star in &mut self.stars {
            star.flicker(rng);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
    Up,
    Down,
}

impl Heading {
    const ALL: [Heading; 4] = [Heading::Left, Heading::Right, Heading::Up, Heading::Down];

    /// Unit step in screen space (y down).
    pub fn step(self) -> Vec2 {
        match self {
            Heading::Left => vec2(-1.0, 0.0),
            Heading::Right => vec2(1.0, 0.0),
            Heading::Up => vec2(0.0, -1.0),
            Heading::Down => vec2(0.0, 1.0),
        }
    }
}

/// A comet streaking straight across the screen from one edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Comet {
    /// Screen position in pixels (origin top-left).
    pub position: Vec2,
    pub heading: Heading,
}

impl Comet {
    /// Spawns on the edge opposite its heading.
    pub fn random(rng: &mut impl Rng, width: f32, height: f32) -> Self {
        let heading = Heading::ALL[rng.random_range(0..Heading::ALL.len())];
        let along_x = rng.random_range(0..=width as u32) as f32;
        let along_y = rng.random_range(0..=height as u32) as f32;
        let position = match heading {
            Heading::Left => vec2(width, along_y),
            Heading::Right => vec2(0.0, along_y),
            Heading::Up => vec2(along_x, height),
            Heading::Down => vec2(along_x, 0.0),
        };
        Self { position, heading }
    }

    pub fn advance(&mut self) {
        self.position += self.heading.step() * COMET_SPEED;
    }
}

/// The active comet shower and the real-time countdown to the next one.
#[derive(Resource)]
pub struct CometShower {
    pub comets: Vec<Comet>,
    pub timer: Timer,
}

impl CometShower {
    pub fn new(interval_secs: f32) -> Self {
        Self {
            comets: Vec::new(),
            timer: Timer::from_seconds(interval_secs, TimerMode::Repeating),
        }
    }

    /// Replaces the current comets with a fresh shower.
    pub fn launch(&mut self, rng: &mut impl Rng, width: f32, height: f32) {
        self.comets = (0..COMETS_PER_SHOWER)
            .map(|_| Comet::random(rng, width, height))
            .collect();
    }
}
