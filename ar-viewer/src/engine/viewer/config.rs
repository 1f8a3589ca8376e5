use super::asset_source::AssetSource;
use constants::path::CANVAS_SELECTOR;

/// Logical size of the display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A surface must be finite and non-empty to render into.
    pub fn is_renderable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 1.0 && self.height >= 1.0
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceTarget {
    pub selector: String,
    pub size: SurfaceSize,
}

impl SurfaceTarget {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            selector: CANVAS_SELECTOR.to_string(),
            size,
        }
    }
}

/// What the viewer shows and where. Never mutated in place: reconfiguring
/// the viewer unmounts it and mounts a fresh instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfiguration {
    pub asset_source: AssetSource,
    pub container: SurfaceTarget,
}
