//! Error types for browser automation.

use thiserror::Error;

/// Result alias used throughout the runtime.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	#[error("Failed to launch browser: {0}")]
	Launch(String),

	#[error("Timeout after {ms}ms waiting for {condition}")]
	Timeout { ms: u64, condition: String },

	#[error("Navigation to {url} failed: {reason}")]
	Navigation { url: String, reason: String },

	#[error("No element matches selector '{0}'")]
	ElementNotFound(String),

	#[error("Script evaluation failed: {0}")]
	Evaluation(String),

	#[error("Protocol error {code}: {message}")]
	Protocol { code: i64, message: String },

	#[error("Browser target closed: {0}")]
	TargetClosed(String),

	#[error("Connection closed before a response arrived")]
	ChannelClosed,

	#[error("WebSocket error: {0}")]
	WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

	#[error("DevTools HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Whether the failure means the page can no longer be driven.
	pub fn is_disconnect(&self) -> bool {
		matches!(self, Error::TargetClosed(_) | Error::ChannelClosed | Error::WebSocket(_))
	}
}
