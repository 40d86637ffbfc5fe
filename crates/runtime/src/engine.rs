//! Engine-neutral browser capabilities.
//!
//! The watcher core only ever talks to these traits; [`crate::ChromiumLauncher`]
//! is the production implementation and tests substitute in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Default timeout for navigation, element waits, and individual protocol calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Starts a browser and hands back its single page.
#[async_trait]
pub trait Launcher: Send + Sync {
	async fn launch(&self, headless: bool) -> Result<Box<dyn Page>>;
}

/// A page inside a launched browser. Closing the page shuts the browser down.
#[async_trait]
pub trait Page: Send + Sync {
	/// Navigates to `url` and waits for the document to finish loading.
	async fn goto(&self, url: &str) -> Result<PageResponse>;

	/// Waits until `selector` matches an element.
	async fn wait_for_selector(&self, selector: &str) -> Result<()>;

	/// Focuses the element matching `selector` and inserts `text`.
	async fn type_text(&self, selector: &str, text: &str) -> Result<()>;

	/// Clicks the element matching `selector`.
	async fn click(&self, selector: &str) -> Result<()>;

	/// Shuts the browser down. Calling it twice is a no-op.
	async fn close(&mut self) -> Result<()>;
}

/// Document loaded by [`Page::goto`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
	pub url: String,
	/// Rendered text of `document.body`, `None` when the document had no body.
	pub body: Option<String>,
}

impl PageResponse {
	pub fn new(url: impl Into<String>, body: Option<String>) -> Self {
		Self { url: url.into(), body }
	}

	/// Parses the body as JSON. Returns `None` when there is no body.
	pub fn json<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
		self.body.as_deref().map(serde_json::from_str)
	}
}
