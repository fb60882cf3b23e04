use bevy::math::DVec2;
use bevy::prelude::*;

use crate::resources::Viewport;

impl Viewport {
    /// Maps a metre-space position to screen pixels (origin top-left, y down).
    pub fn to_screen(&self, position: DVec2) -> DVec2 {
        DVec2::new(
            position.x * self.scale + self.width / 2.0,
            position.y * self.scale + self.height / 2.0,
        )
    }

    /// Inverse of [`Viewport::to_screen`].
    pub fn to_meters(&self, screen: DVec2) -> DVec2 {
        DVec2::new(
            (screen.x - self.width / 2.0) / self.scale,
            (screen.y - self.height / 2.0) / self.scale,
        )
    }

    /// Converts screen pixels into the 2D camera's world space, which is centred and y-up.
    pub fn screen_to_world(&self, screen: DVec2) -> Vec2 {
        vec2(
            (screen.x - self.width / 2.0) as f32,
            (self.height / 2.0 - screen.y) as f32,
        )
    }

    /// Metre-space position straight to camera world space.
    pub fn world_position(&self, position: DVec2) -> Vec2 {
        self.screen_to_world(self.to_screen(position))
    }

    pub fn contains_y(&self, screen: DVec2) -> bool {
        (0.0..=self.height).contains(&screen.y)
    }

    /// Anchor for an indicator line towards a point above or below the viewport.
    ///
    /// Returns `None` while the point is vertically on screen.
    pub fn offscreen_anchor(&self, screen: DVec2, margin: f64) -> Option<DVec2> {
        if self.contains_y(screen) {
            None
        } else if screen.y < 0.0 {
            Some(DVec2::new(self.width / 2.0, margin))
        } else {
            Some(DVec2::new(self.width / 2.0, self.height - margin))
        }
    }
}
