use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::handlers::{RpcContext, RpcSnapshot, route};
use crate::engine::core::app_state::ViewerSystems;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the host page and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(notification(method, params));
    }

    /// Queue response for transmission to the host.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    /// Notifications waiting for the next transmit pass.
    pub fn queued_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    pub fn queued_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }
}

fn notification(method: &str, params: serde_json::Value) -> RpcNotification {
    RpcNotification {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
    }
}

/// Plugin establishing the WebRPC communication layer between the host page and the viewer.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<MessageQueue>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .in_set(ViewerSystems::Intake),
            )
            .add_systems(
                Update,
                send_outgoing_messages.in_set(ViewerSystems::Transmit),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(message_queue: Res<MessageQueue>) {
    let queue_clone = message_queue.0.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register message listener: {:?}", e);
                return;
            }
        }
        None => {
            error!("Window object not available");
            return;
        }
    }

    // The bridge outlives any viewer instance, so ownership passes to JS.
    closure.forget();
}

/// Thread-safe queue filled by the `message` listener and drained each frame.
#[derive(Resource, Default, Clone)]
pub struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

impl MessageQueue {
    pub fn push(&self, message: String) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(message);
        }
    }
}

/// Event representing incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Res<MessageQueue>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let messages = if let Ok(mut queue) = message_queue.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut context: RpcContext,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    // Requests in one batch see the effects of earlier ones before they are applied.
    let mut snapshot = context.snapshot();

    for event in events.read() {
        let request = match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => request,
            Err(parse_error) => {
                warn!("Unparseable RPC message: {}", parse_error);
                rpc_interface.queue_response(create_error_response(
                    None,
                    RpcError::invalid_request(&parse_error.to_string()),
                ));
                continue;
            }
        };
        debug!("Processing RPC method: {}", request.method);

        if let Some(response) = handle_rpc_request(&request, &mut snapshot, &mut context) {
            rpc_interface.queue_response(response);
        }
    }
}

/// Route one request. Requests without an id still run; only the response is skipped.
fn handle_rpc_request(
    request: &RpcRequest,
    snapshot: &mut RpcSnapshot,
    context: &mut RpcContext,
) -> Option<RpcResponse> {
    let id = request.id.clone();

    if request.jsonrpc != "2.0" {
        return id.map(|id| {
            create_error_response(
                Some(id),
                RpcError::invalid_request("Expected jsonrpc \"2.0\""),
            )
        });
    }

    let outcome = route(&request.method, &request.params, snapshot).map(|routed| {
        for dispatch in routed.dispatches {
            snapshot.apply(&dispatch);
            context.dispatch(dispatch);
        }
        routed.result
    });

    if let Err(error) = &outcome {
        warn!("RPC {} failed: {}", request.method, error.message);
    }

    let id = id?;
    Some(match outcome {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => create_error_response(Some(id), error),
    })
}

/// Create standardized error response.
fn create_error_response(id: Option<serde_json::Value>, error: RpcError) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(error),
        id,
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Notify the host outside the ECS, for failures before the app runs.
pub fn notify_parent(method: &str, params: serde_json::Value) {
    send_message_to_parent(&notification(method, params));
}

/// Send serialized message to parent window (host page).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        match serde_json::to_string(message) {
            Ok(json) => debug!("→ host: {}", json),
            Err(e) => error!("Failed to serialize message: {}", e),
        }
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: -32600,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
