//! Command payloads for the `Page`, `Runtime` and `Input` domains.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PAGE_ENABLE: &str = "Page.enable";
pub const PAGE_NAVIGATE: &str = "Page.navigate";
pub const RUNTIME_ENABLE: &str = "Runtime.enable";
pub const RUNTIME_EVALUATE: &str = "Runtime.evaluate";
pub const INPUT_INSERT_TEXT: &str = "Input.insertText";
pub const BROWSER_CLOSE: &str = "Browser.close";

/// `Page.navigate` parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateParams {
	pub url: String,
}

/// `Page.navigate` result. `error_text` is set for network-level failures
/// such as DNS errors or refused connections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResult {
	#[serde(default)]
	pub frame_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub loader_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_text: Option<String>,
}

/// `Runtime.evaluate` parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
	pub expression: String,
	pub return_by_value: bool,
	pub await_promise: bool,
}

impl EvaluateParams {
	/// Evaluates `expression` and returns its JSON value.
	pub fn by_value(expression: impl Into<String>) -> Self {
		Self {
			expression: expression.into(),
			return_by_value: true,
			await_promise: true,
		}
	}
}

/// Mirror of a JavaScript value returned from `Runtime.evaluate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
	#[serde(rename = "type", default)]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subtype: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
	pub text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
	/// Most specific message available: the thrown object's description, else the summary text.
	pub fn message(&self) -> String {
		self.exception
			.as_ref()
			.and_then(|e| e.description.clone())
			.unwrap_or_else(|| self.text.clone())
	}
}

/// `Runtime.evaluate` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
	pub result: RemoteObject,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exception_details: Option<ExceptionDetails>,
}

/// `Input.insertText` parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertTextParams {
	pub text: String,
}
