use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use bevy_egui::egui;

use crate::body::Body;
use crate::body::SolarSystem;
use crate::info::{LEGEND, SCALE_NOTE, SOURCE_NOTE, body_report};
use crate::resources::{INDICATOR_MARGIN, IntegrationOrder, SimClock, SimConfig, SimSettings, Viewport};

/// First legend row that names a body; rows after it follow registry order.
const LEGEND_BODY_ROW: usize = 4;

/// Read-only view of the simulation used by the overlay.
#[derive(SystemParam)]
pub struct OverlayState<'w> {
    pub system: Res<'w, SolarSystem>,
    pub settings: Res<'w, SimSettings>,
    pub clock: Res<'w, SimClock>,
    pub viewport: Res<'w, Viewport>,
}

fn body_color(body: &Body) -> egui::Color32 {
    let [r, g, b] = body.color;
    egui::Color32::from_rgb(r, g, b)
}

pub fn ui_overlay(
    mut contexts: EguiContexts,
    state: OverlayState,
    mut config: ResMut<SimConfig>,
    mut frames_rendered: Local<usize>,
) {
    if *frames_rendered < 5 {
        *frames_rendered += 1;
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let ctx = &*ctx;
    let selected = state
        .settings
        .selected
        .and_then(|index| state.system.get(index).map(|body| (index, body)));

    egui::Area::new(egui::Id::new("legend"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 20.0))
        .show(ctx, |ui| {
            for (row, text) in LEGEND.iter().enumerate() {
                let color = match selected {
                    Some((index, body)) if row.checked_sub(LEGEND_BODY_ROW) == Some(index) => {
                        body_color(body)
                    }
                    _ => egui::Color32::WHITE,
                };
                ui.label(egui::RichText::new(*text).monospace().color(color));
            }

            ui.separator();
            ui.label(egui::RichText::new("Update order").monospace());
            ui.radio_value(&mut config.order, IntegrationOrder::Sequential, "Sequential");
            ui.radio_value(&mut config.order, IntegrationOrder::Snapshot, "Snapshot");
        });

    if state.settings.paused {
        egui::Area::new(egui::Id::new("paused"))
            .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 20.0))
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("PAUSED")
                        .monospace()
                        .size(24.0)
                        .color(egui::Color32::WHITE),
                );
            });
    } else {
        egui::Area::new(egui::Id::new("scale_note"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(SCALE_NOTE)
                        .monospace()
                        .color(egui::Color32::WHITE),
                );
            });
    }

    let Some((_, body)) = selected else {
        return;
    };

    let days_passed = state.clock.days();
    let screen = state.viewport.to_screen(body.position);
    let offscreen = !body.is_primary
        && state
            .viewport
            .offscreen_anchor(screen, f64::from(INDICATOR_MARGIN))
            .is_some();

    egui::Area::new(egui::Id::new("body_info"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 20.0))
        .show(ctx, |ui| {
            let name = egui::RichText::new(body.name).monospace().color(body_color(body));
            ui.label(name);
            for line in body_report(body, days_passed) {
                ui.label(egui::RichText::new(line).monospace().color(egui::Color32::WHITE));
            }
            ui.label(
                egui::RichText::new(SOURCE_NOTE)
                    .monospace()
                    .color(egui::Color32::WHITE),
            );
            if offscreen {
                ui.add_space(10.0);
                ui.label(
                    egui::RichText::new(format!("{} is out of screen now", body.name))
                        .monospace()
                        .color(body_color(body)),
                );
            }
        });

    if let Some(anchor) = state
        .viewport
        .offscreen_anchor(screen, f64::from(INDICATOR_MARGIN))
        .filter(|_| offscreen)
    {
        // Label just inside the viewport, next to where the indicator line starts.
        let toward_center = if anchor.y < state.viewport.height / 2.0 { 20.0 } else { -20.0 };
        egui::Area::new(egui::Id::new("offscreen_label"))
            .fixed_pos(egui::pos2(anchor.x as f32, (anchor.y + toward_center) as f32))
            .pivot(egui::Align2::CENTER_CENTER)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(body.name)
                        .monospace()
                        .color(egui::Color32::WHITE),
                );
            });
    }
}
