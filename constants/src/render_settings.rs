use bevy::color::Color;
use bevy::math::Vec3;

/// Initial camera eye position, looking at the origin.
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 2.0, 5.0);
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

pub const ORBIT_MIN_DISTANCE: f32 = 1.0;
pub const ORBIT_MAX_DISTANCE: f32 = 10.0;
pub const ORBIT_DAMPING_FACTOR: f32 = 0.05;
pub const ORBIT_ROTATE_SPEED: f32 = 0.8;
/// Radians of orbit per pixel of drag at rotate speed 1.0
pub const ORBIT_RADIANS_PER_PIXEL: f32 = 0.005;
pub const ORBIT_PITCH_LIMIT: f32 = 1.55;

pub const AMBIENT_BRIGHTNESS: f32 = 500.0;
pub const KEY_LIGHT_POSITION: Vec3 = Vec3::new(5.0, 5.0, 5.0);
pub const KEY_LIGHT_ILLUMINANCE: f32 = 10_000.0;
pub const FILL_LIGHT_POSITION: Vec3 = Vec3::new(-5.0, 5.0, -5.0);
pub const FILL_LIGHT_ILLUMINANCE: f32 = 5_000.0;
/// Downward light standing in for a white sky / black ground hemisphere.
pub const SKY_LIGHT_ILLUMINANCE: f32 = 3_000.0;

/// Royal blue, 80% opacity
pub const PLACEHOLDER_COLOUR: Color = Color::srgba(0.255, 0.412, 0.882, 0.8);
pub const PLACEHOLDER_SIZE: f32 = 1.0;

pub const GRID_HALF_EXTENT: f32 = 5.0;
pub const GRID_CELL_SIZE: f32 = 1.0;
pub const GRID_COLOUR: Color = Color::srgba(1.0, 1.0, 1.0, 0.35);
