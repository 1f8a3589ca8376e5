use bevy::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Browser capability a permission prompt guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Camera,
    Geolocation,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Camera => write!(f, "camera"),
            Capability::Geolocation => write!(f, "geolocation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("failed to initialise renderer: {0}")]
    Initialization(String),

    #[error("failed to load asset '{uri}': {reason}")]
    AssetLoad { uri: String, reason: String },

    #[error("{capability} permission denied: {reason}")]
    PermissionDenied {
        capability: Capability,
        reason: String,
    },

    #[error("rendering context lost")]
    ContextLost,

    #[error("viewer is not mounted")]
    NotMounted,

    #[error("cannot place model: missing location data")]
    MissingLocation,

    #[error("cannot place model: no model selected")]
    NoModelSelected,

    #[error("unknown model '{0}'")]
    UnknownModel(String),
}

impl ViewerError {
    /// Fatal errors end the current viewer instance; the host decides whether to remount.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ViewerError::Initialization(_) | ViewerError::ContextLost
        )
    }

    /// Stable identifier sent to the host with `viewer_error`.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::Initialization(_) => "initialization",
            ViewerError::AssetLoad { .. } => "asset_load",
            ViewerError::PermissionDenied { .. } => "permission_denied",
            ViewerError::ContextLost => "context_lost",
            ViewerError::NotMounted => "not_mounted",
            ViewerError::MissingLocation => "missing_location",
            ViewerError::NoModelSelected => "no_model_selected",
            ViewerError::UnknownModel(_) => "unknown_model",
        }
    }
}

/// Every viewer error passes through this event on its way to the host.
#[derive(Event, Debug, Clone)]
pub struct ViewerErrorEvent(pub ViewerError);
