//! Device orientation to placement trajectory mapping.

/// Beta angle treated as "level" when holding a phone upright.
pub const BETA_REST_DEGREES: f64 = 45.0;
pub const ANGLE_NORMALISER_DEGREES: f64 = 90.0;

pub const TRAJECTORY_X_SCALE: f64 = 3.0;
pub const TRAJECTORY_Y_SCALE: f64 = 2.0;
pub const TRAJECTORY_REST_DEPTH: f64 = -3.0;

/// Normalised angles are clamped to +/- this value.
pub const NORMALISED_ANGLE_LIMIT: f64 = 1.0;
