use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::input::touch::Touches;
use bevy::prelude::*;

use crate::engine::config::viewer_settings::OrbitSettings;
use constants::render_settings::{ORBIT_PITCH_LIMIT, ORBIT_RADIANS_PER_PIXEL};

/// Zoom multiplier per wheel line.
const ZOOM_STEP: f32 = 0.95;
const PAN_SPEED: f32 = 0.002;

#[derive(Component, Debug, Clone)]
pub struct OrbitController {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    yaw_delta: f32,
    pitch_delta: f32,
    zoom_scale: f32,
    pan_delta: Vec3,
    settings: OrbitSettings,
}

impl OrbitController {
    pub fn from_eye(eye: Vec3, target: Vec3, settings: OrbitSettings) -> Self {
        let offset = eye - target;
        let distance = offset
            .length()
            .clamp(settings.min_distance, settings.max_distance);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .asin();

        Self {
            target,
            yaw,
            pitch,
            distance,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            zoom_scale: 1.0,
            pan_delta: Vec3::ZERO,
            settings,
        }
    }

    pub fn rotate(&mut self, pixels: Vec2) {
        let speed = ORBIT_RADIANS_PER_PIXEL * self.settings.rotate_speed;
        self.yaw_delta -= pixels.x * speed;
        self.pitch_delta += pixels.y * speed;
    }

    /// Positive amounts move the camera closer.
    pub fn zoom(&mut self, amount: f32) {
        if self.settings.enable_zoom {
            self.zoom_scale *= ZOOM_STEP.powf(amount);
        }
    }

    pub fn pan(&mut self, pixels: Vec2, right: Vec3, up: Vec3) {
        if !self.settings.enable_pan {
            return;
        }
        let scale = self.distance * PAN_SPEED;
        self.pan_delta += (-right * pixels.x + up * pixels.y) * scale;
    }

    /// Advance one frame of damped motion and return the camera transform.
    pub fn step(&mut self) -> Transform {
        let damping = self.settings.damping_factor;
        let factor = if damping > 0.0 { damping.min(1.0) } else { 1.0 };

        self.yaw += self.yaw_delta * factor;
        self.pitch = (self.pitch + self.pitch_delta * factor)
            .clamp(-ORBIT_PITCH_LIMIT, ORBIT_PITCH_LIMIT);
        self.distance = (self.distance * self.zoom_scale)
            .clamp(self.settings.min_distance, self.settings.max_distance);
        self.target += self.pan_delta * factor;

        let decay = 1.0 - factor;
        self.yaw_delta *= decay;
        self.pitch_delta *= decay;
        self.pan_delta *= decay;
        self.zoom_scale = 1.0;

        let eye = self.target
            + self.distance
                * Vec3::new(
                    self.pitch.cos() * self.yaw.sin(),
                    self.pitch.sin(),
                    self.pitch.cos() * self.yaw.cos(),
                );
        Transform::from_translation(eye).looking_at(self.target, Vec3::Y)
    }
}

pub fn orbit_camera_controller(
    mut cameras: Query<(&mut Transform, &mut OrbitController), With<Camera3d>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    touches: Res<Touches>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    let active_touches: Vec<_> = touches.iter().collect();

    for (mut transform, mut orbit) in &mut cameras {
        let right = transform.right().as_vec3();
        let up = transform.up().as_vec3();

        if mouse_delta != Vec2::ZERO {
            if mouse_button.pressed(MouseButton::Left) {
                orbit.rotate(mouse_delta);
            } else if mouse_button.pressed(MouseButton::Right) {
                orbit.pan(mouse_delta, right, up);
            }
        }

        if scroll_accum.abs() > f32::EPSILON {
            orbit.zoom(scroll_accum);
        }

        match active_touches.as_slice() {
            [finger] => orbit.rotate(finger.delta()),
            [a, b] => {
                let before = a.previous_position().distance(b.previous_position());
                let now = a.position().distance(b.position());
                if before > f32::EPSILON && now > f32::EPSILON {
                    orbit.zoom((now / before).ln() / -ZOOM_STEP.ln());
                }
                orbit.pan((a.delta() + b.delta()) * 0.5, right, up);
            }
            _ => {}
        }

        *transform = orbit.step();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::render_settings::CAMERA_POSITION;

    fn undamped() -> OrbitSettings {
        OrbitSettings {
            damping_factor: 0.0,
            ..default()
        }
    }

    #[test]
    fn test_from_eye_reproduces_eye() {
        let mut orbit = OrbitController::from_eye(CAMERA_POSITION, Vec3::ZERO, undamped());
        let transform = orbit.step();
        assert!(transform.translation.distance(CAMERA_POSITION) < 1e-4);
    }

    #[test]
    fn test_zoom_respects_distance_limits() {
        let mut orbit = OrbitController::from_eye(CAMERA_POSITION, Vec3::ZERO, undamped());
        orbit.zoom(500.0);
        orbit.step();
        assert_eq!(orbit.distance, 1.0);

        orbit.zoom(-500.0);
        orbit.step();
        assert_eq!(orbit.distance, 10.0);
    }

    #[test]
    fn test_zoom_disabled() {
        let settings = OrbitSettings {
            enable_zoom: false,
            ..undamped()
        };
        let mut orbit = OrbitController::from_eye(CAMERA_POSITION, Vec3::ZERO, settings);
        let before = orbit.distance;
        orbit.zoom(10.0);
        orbit.step();
        assert_eq!(orbit.distance, before);
    }

    #[test]
    fn test_damped_rotation_converges_to_full_delta() {
        let mut damped = OrbitController::from_eye(CAMERA_POSITION, Vec3::ZERO, OrbitSettings::default());
        let mut instant = damped.clone();
        instant.settings.damping_factor = 0.0;

        damped.rotate(Vec2::new(100.0, 0.0));
        instant.rotate(Vec2::new(100.0, 0.0));
        instant.step();
        damped.step();
        assert!(damped.yaw.abs() < instant.yaw.abs());

        for _ in 0..500 {
            damped.step();
        }
        assert!((damped.yaw - instant.yaw).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut orbit = OrbitController::from_eye(CAMERA_POSITION, Vec3::ZERO, undamped());
        orbit.rotate(Vec2::new(0.0, 100_000.0));
        orbit.step();
        assert_eq!(orbit.pitch, ORBIT_PITCH_LIMIT);
    }
}
