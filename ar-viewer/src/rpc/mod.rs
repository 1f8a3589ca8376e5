//! JSON-RPC 2.0 bridge between the host page and the viewer.
//!
//! The viewer runs inside an iframe; the host drives it with
//! `postMessage` requests and receives responses and notifications the
//! same way.
//!
//! ## Message Flow
//!
//! ```text
//! Host (Parent Window)  <──postMessage──>  Viewer (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Route, queue command
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! Requests that change the viewer are validated, queued as Bevy events
//! and acknowledged with `{"success": true, "queued": method}`. The outcome
//! arrives later as a notification. Queries answer straight away.
//!
//! ## Error Handling
//!
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params (missing fields, unknown model id)
//! - `-32603`: Operation rejected, `data.kind` names the viewer error
//!
//! ## Methods
//!
//! ### Viewer lifecycle
//! - `mount`: `{container?: {selector?, width?, height?}, asset?}`
//! - `configure`: same params, remounts with the new configuration
//! - `load_asset`: `{uri}`, blank clears to the placeholder
//! - `load_local_asset`: `{object_url, file_name}`
//! - `resize`: `{width, height}`
//! - `unmount`
//! - `get_load_status`
//! - `set_model_transform`: `{scale?, position?}`
//!
//! ### AR
//! - `flip_camera`
//! - `request_camera_permission`
//! - `get_available_models`
//! - `select_model`: `{id}`
//! - `place_model`
//!
//! ### Diagnostics
//! - `get_fps`
//!
//! ## Notifications
//!
//! `load_status_changed`, `viewer_error`, `permission_changed`,
//! `location_warning`, `model_placed`, `fps_update`.

/// Method routing and parameter parsing.
pub mod handlers;

/// Notifications derived from viewer events.
pub mod notifications;

/// JSON-RPC 2.0 bidirectional communication system for host integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
