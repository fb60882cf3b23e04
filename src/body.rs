use bevy::math::DVec2;
use bevy::prelude::*;

use crate::error::SimError;
use crate::resources::{AU, G, IntegrationOrder, SimConfig};

/// A celestial body: physical state plus the static facts shown in the info panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub name: &'static str,
    /// Position in metres.
    pub position: DVec2,
    /// Velocity in metres per second.
    pub velocity: DVec2,
    /// Mass in kilograms.
    pub mass: f64,
    /// On-screen radius in pixels; unrelated to `radius_km`.
    pub display_radius: f32,
    pub color: [u8; 3],
    pub is_primary: bool,
    /// Distance to the primary as of the last step, in metres.
    pub distance_to_primary: f64,
    /// Orbital period in Earth days; `None` for the primary.
    pub orbit_days: Option<u32>,
    pub radius_km: u32,
    /// Surface gravity in m/s^2.
    pub gravity: f64,
    /// Mean temperature in degrees Celsius.
    pub mean_temp: i32,
}

impl Body {
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    #[cfg(test)]
    pub fn momentum(&self) -> DVec2 {
        self.velocity * self.mass
    }

    pub fn render_color(&self) -> Color {
        let [r, g, b] = self.color;
        Color::srgb_u8(r, g, b)
    }
}

/// Catalogue row for one body of the default system.
struct BodyFacts {
    name: &'static str,
    /// Signed initial x offset from the primary, in AU.
    distance_au: f64,
    mass: f64,
    display_radius: f32,
    color: [u8; 3],
    orbit_days: Option<u32>,
    radius_km: u32,
    gravity: f64,
    mean_temp: i32,
}

const SUN_MASS: f64 = 1.98892e30;

#[rustfmt::skip]
const SOLAR_SYSTEM: [BodyFacts; 9] = [
    BodyFacts { name: "Sun", distance_au: 0.0, mass: SUN_MASS, display_radius: 8.0, color: [253, 184, 19], orbit_days: None, radius_km: 696_340, gravity: 274.0, mean_temp: 5499 },
    BodyFacts { name: "Mercury", distance_au: 0.387, mass: 0.33e24, display_radius: 2.0, color: [219, 206, 202], orbit_days: Some(88), radius_km: 2440, gravity: 3.7, mean_temp: 167 },
    BodyFacts { name: "Venus", distance_au: 0.723, mass: 4.8685e24, display_radius: 3.0, color: [139, 125, 130], orbit_days: Some(225), radius_km: 6052, gravity: 8.9, mean_temp: 464 },
    BodyFacts { name: "Earth", distance_au: -1.0, mass: 5.9742e24, display_radius: 3.0, color: [40, 122, 184], orbit_days: Some(365), radius_km: 6371, gravity: 9.8, mean_temp: 15 },
    BodyFacts { name: "Mars", distance_au: -1.524, mass: 0.639e24, display_radius: 3.0, color: [156, 46, 53], orbit_days: Some(687), radius_km: 3390, gravity: 3.7, mean_temp: -65 },
    BodyFacts { name: "Jupiter", distance_au: 5.203, mass: 1898.2e24, display_radius: 5.0, color: [201, 144, 57], orbit_days: Some(4333), radius_km: 69_911, gravity: 23.1, mean_temp: -110 },
    BodyFacts { name: "Saturn", distance_au: -9.537, mass: 568.34e24, display_radius: 4.0, color: [101, 95, 69], orbit_days: Some(10_759), radius_km: 58_232, gravity: 9.0, mean_temp: -140 },
    BodyFacts { name: "Uranus", distance_au: -19.191, mass: 86.810e24, display_radius: 4.0, color: [209, 231, 231], orbit_days: Some(30_687), radius_km: 25_362, gravity: 8.7, mean_temp: -195 },
    BodyFacts { name: "Neptune", distance_au: 30.069, mass: 102.413e24, display_radius: 4.0, color: [0, 125, 172], orbit_days: Some(60_190), radius_km: 24_622, gravity: 11.0, mean_temp: -200 },
];

/// Speed of a circular orbit at `radius` metres around a body of `primary_mass`.
pub fn circular_orbit_speed(primary_mass: f64, radius: f64) -> f64 {
    (G * primary_mass / radius).sqrt()
}

impl BodyFacts {
    fn build(&self) -> Body {
        let x = self.distance_au * AU;
        let is_primary = self.orbit_days.is_none();
        // Bodies left of the primary orbit one way, bodies right of it the other.
        let velocity = if is_primary {
            DVec2::ZERO
        } else {
            DVec2::new(0.0, -x.signum() * circular_orbit_speed(SUN_MASS, x.abs()))
        };

        Body {
            name: self.name,
            position: DVec2::new(x, 0.0),
            velocity,
            mass: self.mass,
            display_radius: self.display_radius,
            color: self.color,
            is_primary,
            distance_to_primary: x.abs(),
            orbit_days: self.orbit_days,
            radius_km: self.radius_km,
            gravity: self.gravity,
            mean_temp: self.mean_temp,
        }
    }
}

/// Ordered registry of every body; indices are stable for the life of the process.
#[derive(Resource, Clone, Debug)]
pub struct SolarSystem {
    bodies: Vec<Body>,
    primary: usize,
}

impl SolarSystem {
    /// The sun and the eight planets, in catalogue order.
    pub fn solar() -> Result<Self, SimError> {
        Self::new(SOLAR_SYSTEM.iter().map(BodyFacts::build).collect())
    }

    /// Builds a registry, checking that exactly one body is primary and every mass is positive.
    pub fn new(bodies: Vec<Body>) -> Result<Self, SimError> {
        if let Some(body) = bodies.iter().position(|b| b.mass <= 0.0 || !b.mass.is_finite()) {
            return Err(SimError::NonPositiveMass { body });
        }
        let primaries: Vec<usize> = bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_primary)
            .map(|(i, _)| i)
            .collect();
        match primaries.as_slice() {
            [primary] => Ok(Self {
                primary: *primary,
                bodies,
            }),
            other => Err(SimError::PrimaryCount(other.len())),
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn get(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn primary(&self) -> &Body {
        &self.bodies[self.primary]
    }

    #[cfg(test)]
    pub fn total_momentum(&self) -> DVec2 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    /// Advances every body by `config.timestep`.
    pub fn step(&mut self, config: &SimConfig) -> Result<(), SimError> {
        self.step_by(config.timestep, config.g, config.order)
    }

    /// One forward Euler step of `dt` seconds over all bodies, in registry order.
    ///
    /// Each body first sums the pull of every other body, then updates its
    /// velocity and finally its position with the new velocity. With
    /// [`IntegrationOrder::Sequential`] a body sees the already-moved positions
    /// of bodies earlier in the registry; with [`IntegrationOrder::Snapshot`]
    /// every body sees the positions from the start of the step.
    ///
    /// A zero separation between two bodies aborts the step with
    /// [`SimError::DegenerateDistance`]. Bodies earlier in the registry keep
    /// their update; the offending body and those after it are left as they were.
    pub fn step_by(&mut self, dt: f64, g: f64, order: IntegrationOrder) -> Result<(), SimError> {
        let mut positions: Vec<DVec2> = self.bodies.iter().map(|b| b.position).collect();

        for index in 0..self.bodies.len() {
            let (force, distance_to_primary) = self.net_force(index, &positions, g)?;

            let body = &mut self.bodies[index];
            if let Some(distance) = distance_to_primary {
                body.distance_to_primary = distance;
            }
            body.velocity += force / body.mass * dt;
            body.position += body.velocity * dt;

            if order == IntegrationOrder::Sequential {
                positions[index] = body.position;
            }
        }

        Ok(())
    }

    /// Net gravitational force on `index` from every other body at `positions`,
    /// plus the distance to the primary when `index` is not the primary itself.
    fn net_force(
        &self,
        index: usize,
        positions: &[DVec2],
        g: f64,
    ) -> Result<(DVec2, Option<f64>), SimError> {
        let body = &self.bodies[index];
        let origin = positions[index];
        let mut total = DVec2::ZERO;
        let mut distance_to_primary = None;

        for (other_index, other) in self.bodies.iter().enumerate() {
            if other_index == index {
                continue;
            }
            let delta = positions[other_index] - origin;
            let distance = delta.length();
            if distance == 0.0 {
                return Err(SimError::DegenerateDistance {
                    body: index,
                    other: other_index,
                });
            }
            if other_index == self.primary {
                distance_to_primary = Some(distance);
            }

            let force = g * body.mass * other.mass / (distance * distance);
            let angle = delta.y.atan2(delta.x);
            total += DVec2::new(angle.cos(), angle.sin()) * force;
        }

        Ok((total, distance_to_primary))
    }
}
