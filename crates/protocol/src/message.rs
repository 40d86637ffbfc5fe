//! Request/response/event frames.
//!
//! Responses and events share one WebSocket stream and are told apart by the
//! presence of an `id` field:
//!
//! ```json
//! { "id": 7, "result": { "frameId": "A1" } }
//! { "id": 8, "error": { "code": -32000, "message": "Cannot navigate to invalid URL" } }
//! { "method": "Page.loadEventFired", "params": { "timestamp": 12.5 } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command sent to a DevTools target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
	/// Unique request ID for correlating responses
	pub id: u64,
	/// Domain-qualified method, e.g. `Page.navigate`
	pub method: String,
	/// Method parameters as JSON object
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub params: Value,
}

/// Reply to a [`Request`]; `result` and `error` are mutually exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
	pub id: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
}

/// Protocol error details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
}

/// Unsolicited notification from the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
	pub method: String,
	#[serde(default)]
	pub params: Value,
}

/// Discriminated union of inbound frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	/// Response message (has `id` field)
	Response(Response),
	/// Event message (no `id` field)
	Event(Event),
}
