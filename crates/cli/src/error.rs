use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Debug, Error)]
pub enum WatchError {
	#[error("Authentication failed: {0}")]
	Authentication(String),

	#[error(transparent)]
	Fetch(#[from] FetchError),

	#[error("Notification failed: {0}")]
	Notification(String),

	#[error("Browser error: {0}")]
	Browser(#[from] slotwatch_runtime::Error),

	#[error("Invalid configuration: {0}")]
	Config(String),
}

/// Why the slot listing could not be obtained.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("no available dates after {attempts} attempts")]
	NoDates { attempts: u32 },

	#[error("slot listing malformed after {attempts} attempts: {reason}")]
	Malformed { attempts: u32, reason: String },

	#[error("slot listing request failed: {0}")]
	Transport(#[source] slotwatch_runtime::Error),
}

impl WatchError {
	/// A listing that was readable but had nothing in it.
	pub fn is_no_dates(&self) -> bool {
		matches!(self, WatchError::Fetch(FetchError::NoDates { .. }))
	}
}
