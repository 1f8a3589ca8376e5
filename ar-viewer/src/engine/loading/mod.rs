//! Asynchronous asset loading for the viewer.
//!
//! Load requests are started by the viewer command system and polled every
//! frame. Completions pass through [`ViewerLifecycle`](crate::engine::viewer::lifecycle::ViewerLifecycle)
//! so only the latest request can change the scene.

/// In-flight glTF loads and their completion into the scene.
///
/// Drops superseded handles and swaps the asset node or placeholder on completion.
pub mod asset_loader;

/// Object URLs handed over by the host for user-selected files.
///
/// Revokes each URL once it is replaced or the viewer is torn down.
pub mod local_handles;
