use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

// --- Physical Constants ---
/// Gravitational constant in SI units.
pub const G: f64 = 6.67428e-11;
/// One astronomical unit in metres.
pub const AU: f64 = 149.6e9;
/// Simulated seconds advanced per unpaused tick (one day).
pub const TIMESTEP: f64 = 3600.0 * 24.0;

// --- Display Defaults ---
/// Pixels per astronomical unit.
pub const PIXELS_PER_AU: f64 = 30.0;
/// Width of the simulation viewport in pixels.
pub const VIEWPORT_WIDTH: f64 = 1280.0;
/// Height of the simulation viewport in pixels.
pub const VIEWPORT_HEIGHT: f64 = 800.0;
/// Target rate of the fixed simulation tick.
pub const TICK_HZ: f64 = 60.0;

// --- Decoration ---
/// Number of background stars.
pub const NUM_STARS: usize = 100;
/// Comets spawned per shower.
pub const COMETS_PER_SHOWER: usize = 3;
/// Real seconds between comet showers.
pub const COMET_INTERVAL_SECS: f32 = 3.0;
/// Comet travel per tick in pixels.
pub const COMET_SPEED: f32 = 6.0;

// --- Overlay ---
/// Extra pixels between a selected body and its highlight ring.
pub const SELECTION_RING_PADDING: f32 = 5.0;
/// Distance of the off-screen indicator anchor from the viewport edge.
pub const INDICATOR_MARGIN: f32 = 50.0;
/// Edge length of the portrait shown for the selected body.
pub const PORTRAIT_SIZE: f32 = 250.0;

// --- Audio ---
pub const MUSIC_PATH: &str = "stay.mp3";
pub const MUSIC_VOLUME: f32 = 0.9;
pub const UNMUTED_VOLUME: f32 = 0.3;

/// How bodies see each other's positions within one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegrationOrder {
    /// Bodies move one after another; later bodies see earlier bodies' new positions.
    #[default]
    Sequential,
    /// All forces come from the positions held at the start of the step.
    Snapshot,
}

/// Tunable simulation parameters (G, timestep, update order).
#[derive(Resource, Clone, Copy, Debug)]
pub struct SimConfig {
    pub g: f64,
    pub timestep: f64,
    pub order: IntegrationOrder,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            g: G,
            timestep: TIMESTEP,
            order: IntegrationOrder::default(),
        }
    }
}

/// Fixed drawing area that metre-space positions are projected into.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Pixels per metre.
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
            scale: PIXELS_PER_AU / AU,
        }
    }
}

/// User-facing toggles driven by keyboard and mouse.
#[derive(Resource, Default, Debug)]
pub struct SimSettings {
    pub paused: bool,
    pub muted: bool,
    /// Registry index of the body shown in the info panel.
    pub selected: Option<usize>,
}

/// Accumulated simulated time in seconds.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct SimClock {
    pub elapsed: f64,
}

impl SimClock {
    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt.max(0.0);
    }

    pub fn days(&self) -> f64 {
        self.elapsed / TIMESTEP
    }
}

/// Random source for the decorative starfield and comets.
#[derive(Resource, Deref, DerefMut)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_os_rng())
    }
}
