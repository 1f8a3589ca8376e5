use bevy::prelude::*;

use crate::browser::inbox::{BrowserEvent, BrowserEventReceived};
use constants::placement::*;

/// Map device tilt onto a placement offset in front of the viewer.
///
/// `beta` is the front-back tilt and `gamma` the left-right tilt, both in
/// degrees. Both are normalised against 90° around a 45° resting pitch and
/// clamped, so the offset stays bounded however the device is held.
/// Returns `None` unless both angles are present.
pub fn map_orientation(beta: Option<f64>, gamma: Option<f64>) -> Option<Vec3> {
    let (beta, gamma) = (beta?, gamma?);
    if !beta.is_finite() || !gamma.is_finite() {
        return None;
    }
    let limit = NORMALISED_ANGLE_LIMIT;
    let bn = ((beta - BETA_REST_DEGREES) / ANGLE_NORMALISER_DEGREES).clamp(-limit, limit);
    let gn = (gamma / ANGLE_NORMALISER_DEGREES).clamp(-limit, limit);

    Some(Vec3::new(
        (gn * TRAJECTORY_X_SCALE) as f32,
        (bn * TRAJECTORY_Y_SCALE) as f32,
        (TRAJECTORY_REST_DEPTH + bn.abs() + gn.abs()) as f32,
    ))
}

pub fn rest_position() -> Vec3 {
    Vec3::new(0.0, 0.0, TRAJECTORY_REST_DEPTH as f32)
}

/// Where the next placement lands. Follows device orientation while placing.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub position: Vec3,
    pub placing: bool,
}

impl Default for Trajectory {
    fn default() -> Self {
        Self {
            position: rest_position(),
            placing: false,
        }
    }
}

impl Trajectory {
    pub fn reset(&mut self) {
        self.position = rest_position();
    }
}

pub fn track_device_orientation(
    mut browser_events: EventReader<BrowserEventReceived>,
    mut trajectory: ResMut<Trajectory>,
) {
    let latest = browser_events
        .read()
        .filter_map(|event| match event.0 {
            BrowserEvent::Orientation { beta, gamma } => map_orientation(beta, gamma),
            _ => None,
        })
        .last();
    if let Some(position) = latest {
        if trajectory.placing && trajectory.position != position {
            trajectory.position = position;
        }
    }
}
