//! HTTP discovery documents served by a DevTools endpoint.

use serde::{Deserialize, Serialize};

/// `/json/version` response subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
	#[serde(rename = "Browser", default)]
	pub browser: Option<String>,
}

/// One entry of the `/json/list` target listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub url: String,
	#[serde(default)]
	pub web_socket_debugger_url: Option<String>,
}

impl TargetInfo {
	/// Whether this target is a page that can be attached to.
	pub fn is_attachable_page(&self) -> bool {
		self.kind == "page" && self.web_socket_debugger_url.is_some()
	}
}
