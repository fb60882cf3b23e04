//! Text shown in the info panel for the selected body.

use crate::body::Body;

/// Keyboard legend, top to bottom.
pub const LEGEND: [&str; 13] = [
    "P Pause",
    "M Mute",
    "I Info off",
    "Q Quit",
    "0 Sun",
    "1 Mercury",
    "2 Venus",
    "3 Earth",
    "4 Mars",
    "5 Jupiter",
    "6 Saturn",
    "7 Uranus",
    "8 Neptune",
];

pub const SOURCE_NOTE: &str = "Source: NASA";
pub const SCALE_NOTE: &str = "Distances are to scale, sizes are not to scale.";

/// Formats an integer with `,` between groups of three digits.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Like [`group_thousands`] but keeps one decimal place.
pub fn group_thousands_f64(value: f64) -> String {
    let tenths = (value.abs() * 10.0).round() as u64;
    let sign = if value < 0.0 && tenths > 0 { "-" } else { "" };
    format!("{sign}{}.{}", group_thousands(tenths / 10), tenths % 10)
}

/// Scientific notation with an explicit exponent sign, e.g. `5.9742e+24`.
pub fn scientific(value: f64) -> String {
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}

/// Days remaining in the current orbit after `days_passed` simulated days.
pub fn days_left_in_orbit(orbit_days: u32, days_passed: f64) -> i64 {
    let orbit = i64::from(orbit_days);
    let left = (orbit_days as f64 - days_passed).trunc() as i64;
    left.rem_euclid(orbit)
}

/// Panel lines for `body` after `days_passed` simulated days.
pub fn body_report(body: &Body, days_passed: f64) -> Vec<String> {
    let radius = group_thousands(u64::from(body.radius_km));
    match body.orbit_days {
        Some(orbit_days) => vec![
            format!("Mass: {} kg", scientific(body.mass)),
            format!("Radius: {radius} km"),
            format!("Gravity: {} m/s^2", body.gravity),
            format!("Mean Temperature: {} °C", body.mean_temp),
            format!("Velocity: {:.1} km/s", body.speed() / 1000.0),
            format!(
                "Distance to Sun: {} km",
                group_thousands_f64(body.distance_to_primary / 1000.0)
            ),
            format!(
                "Days left for one full orbit: {} days",
                days_left_in_orbit(orbit_days, days_passed)
            ),
            format!(
                "Time passed since start: {:.2} {} years",
                days_passed / f64::from(orbit_days),
                body.name
            ),
        ],
        None => vec![
            format!("Mass: {} kg", scientific(body.mass)),
            format!("Radius: {radius} km"),
            format!("Gravity (Surface): {} m/s^2", body.gravity),
            format!("Mean Temperature (Surface): {} °C", body.mean_temp),
            format!(
                "Time passed since start: {} {} days",
                days_passed.trunc() as i64,
                body.name
            ),
        ],
    }
}
