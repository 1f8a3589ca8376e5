/// Inclusive slider range with a fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    /// Clamp into range and snap to the nearest step from `min`.
    pub fn apply(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.min;
        }
        if value <= self.min {
            return self.min;
        }
        if value >= self.max {
            return self.max;
        }
        let steps = ((value - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

pub const SCALE_RANGE: SliderRange = SliderRange {
    min: 0.1,
    max: 5.0,
    step: 0.1,
};

pub const POSITION_RANGE: SliderRange = SliderRange {
    min: -5.0,
    max: 5.0,
    step: 0.1,
};

pub const DEFAULT_SCALE: f32 = 1.0;
