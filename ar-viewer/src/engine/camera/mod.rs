//! Orbit camera for inspecting the model.
//!
//! Mirrors the usual orbit-controls behaviour: drag to rotate, right-drag or
//! two-finger drag to pan, wheel or pinch to zoom, with damped motion and
//! distance limits.

/// Orbit state and the input-driven controller system.
pub mod orbit_camera;
