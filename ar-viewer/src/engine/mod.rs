pub mod camera;
pub mod config;
pub mod core;
pub mod loading;
pub mod scene;
pub mod surface;
pub mod systems;
pub mod viewer;
