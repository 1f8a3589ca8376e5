use bevy::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl LoadStatus {
    /// Loaded and Failed only change when a new configuration or load request arrives.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadStatus::Loaded | LoadStatus::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadStatus::Idle => "idle",
            LoadStatus::Loading => "loading",
            LoadStatus::Loaded => "loaded",
            LoadStatus::Failed(_) => "failed",
        }
    }
}

/// Written whenever the current load settles or is cleared.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct LoadStatusChanged(pub LoadStatus);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialises_with_reason() {
        let json = serde_json::to_value(LoadStatus::Failed("404".into())).unwrap();
        assert_eq!(json, serde_json::json!({"state": "failed", "reason": "404"}));
        let json = serde_json::to_value(LoadStatus::Loading).unwrap();
        assert_eq!(json, serde_json::json!({"state": "loading"}));
    }
}
