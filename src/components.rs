use bevy::prelude::*;

/// Links a rendered circle to its body's index in the [`SolarSystem`](crate::body::SolarSystem) registry.
#[derive(Component, Deref, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyIndex(pub usize);

/// Links a rendered dot to its entry in the [`StarField`](crate::starfield::StarField).
#[derive(Component, Deref, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StarIndex(pub usize);

/// Portrait of the selected body, shown in the bottom-left corner.
#[derive(Component, Default)]
pub struct Portrait {
    /// Body the current image belongs to.
    pub showing: Option<usize>,
    pub image: Option<Handle<Image>>,
    /// Set once a missing image has been swapped for a placeholder.
    pub fallback: bool,
}

/// Background music player.
#[derive(Component)]
pub struct Music;
