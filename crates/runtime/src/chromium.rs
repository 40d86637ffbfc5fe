//! Chromium implementation of [`Launcher`] and [`Page`].

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use slotwatch_protocol::{
	BROWSER_CLOSE, EvaluateParams, EvaluateResult, INPUT_INSERT_TEXT, InsertTextParams, NavigateParams, NavigateResult, PAGE_ENABLE,
	PAGE_NAVIGATE, RUNTIME_ENABLE, RUNTIME_EVALUATE, TargetInfo,
};
use tracing::{debug, info, trace};

use crate::connection::Connection;
use crate::engine::{DEFAULT_TIMEOUT, Launcher, Page, PageResponse};
use crate::error::{Error, Result};
use crate::process::{BrowserProcess, resolve_executable};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches a local Chromium with a fresh profile per launch.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
	executable: Option<PathBuf>,
}

impl ChromiumLauncher {
	pub fn new(executable: Option<PathBuf>) -> Self {
		Self { executable }
	}
}

#[async_trait]
impl Launcher for ChromiumLauncher {
	async fn launch(&self, headless: bool) -> Result<Box<dyn Page>> {
		let executable = resolve_executable(self.executable.as_deref())?;
		info!(target = "slotwatch.cdp", executable = %executable.display(), headless, "launching browser");

		let mut process = BrowserProcess::spawn(&executable, headless).await?;
		let ws_url = match first_page_socket(process.port()).await {
			Ok(url) => url,
			Err(e) => {
				let _ = process.shutdown().await;
				return Err(e);
			}
		};

		let mut page = match ChromiumPage::attach(&ws_url).await {
			Ok(page) => page,
			Err(e) => {
				let _ = process.shutdown().await;
				return Err(e);
			}
		};
		page.process = Some(process);
		Ok(Box::new(page))
	}
}

/// Finds the websocket of the browser's initial tab.
async fn first_page_socket(port: u16) -> Result<String> {
	let client = reqwest::Client::builder().timeout(Duration::from_secs(2)).build()?;
	let targets: Vec<TargetInfo> = client
		.get(format!("http://127.0.0.1:{port}/json/list"))
		.send()
		.await?
		.error_for_status()?
		.json()
		.await?;

	if let Some(url) = targets.into_iter().find(|t| t.is_attachable_page()).and_then(|t| t.web_socket_debugger_url) {
		return Ok(url);
	}

	let created: TargetInfo = client
		.put(format!("http://127.0.0.1:{port}/json/new?about:blank"))
		.send()
		.await?
		.error_for_status()?
		.json()
		.await?;
	created
		.web_socket_debugger_url
		.ok_or_else(|| Error::Launch("Browser did not expose a page target".into()))
}

/// A page target driven over its DevTools socket.
pub struct ChromiumPage {
	connection: Connection,
	process: Option<BrowserProcess>,
	timeout: Duration,
	closed: bool,
}

impl ChromiumPage {
	/// Attaches to an existing page target without taking ownership of a browser process.
	pub async fn attach(ws_url: &str) -> Result<Self> {
		let connection = Connection::connect(ws_url).await?;
		connection.send(PAGE_ENABLE, Value::Null).await?;
		connection.send(RUNTIME_ENABLE, Value::Null).await?;
		Ok(Self {
			connection,
			process: None,
			timeout: DEFAULT_TIMEOUT,
			closed: false,
		})
	}

	/// Overrides the navigation, element-wait, and per-call protocol timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self.connection.set_timeout(timeout);
		self
	}

	/// Evaluates `expression` in the page and returns its JSON value.
	pub async fn evaluate(&self, expression: &str) -> Result<Value> {
		let result: EvaluateResult = self
			.connection
			.call(RUNTIME_EVALUATE, &EvaluateParams::by_value(expression))
			.await?;
		if let Some(details) = result.exception_details {
			return Err(Error::Evaluation(details.message()));
		}
		Ok(result.result.value.unwrap_or(Value::Null))
	}

	/// Polls `expression` until it evaluates to `true`.
	async fn poll_until(&self, expression: &str, condition: &str) -> Result<()> {
		let deadline = tokio::time::Instant::now() + self.timeout;
		loop {
			// Navigations swap the execution context; treat that as "not yet".
			match self.evaluate(expression).await {
				Ok(Value::Bool(true)) => return Ok(()),
				Ok(_) => {}
				Err(e) if e.is_disconnect() => return Err(e),
				Err(e) => trace!(target = "slotwatch.cdp", error = %e, %condition, "poll evaluation failed"),
			}
			if tokio::time::Instant::now() >= deadline {
				return Err(Error::Timeout {
					ms: self.timeout.as_millis() as u64,
					condition: condition.to_string(),
				});
			}
			tokio::time::sleep(POLL_INTERVAL).await;
		}
	}
}

/// Renders `value` as a JavaScript string literal.
fn js_string(value: &str) -> String {
	Value::String(value.to_string()).to_string()
}

fn query_exists(selector: &str) -> String {
	format!("document.querySelector({}) !== null", js_string(selector))
}

fn focus_script(selector: &str) -> String {
	format!(
		"(() => {{ const el = document.querySelector({}); if (!el) return false; el.focus(); return true; }})()",
		js_string(selector)
	)
}

fn click_script(selector: &str) -> String {
	format!(
		"(() => {{ const el = document.querySelector({}); if (!el) return false; el.click(); return true; }})()",
		js_string(selector)
	)
}

const READY_SCRIPT: &str = "document.readyState === 'complete'";
const BODY_SCRIPT: &str = "document.body ? document.body.innerText : null";

#[async_trait]
impl Page for ChromiumPage {
	async fn goto(&self, url: &str) -> Result<PageResponse> {
		debug!(target = "slotwatch.cdp", %url, "navigate");
		let navigation: NavigateResult = self
			.connection
			.call(PAGE_NAVIGATE, &NavigateParams { url: url.to_string() })
			.await
			.map_err(|e| match e {
				Error::Protocol { message, .. } => Error::Navigation {
					url: url.to_string(),
					reason: message,
				},
				other => other,
			})?;

		if let Some(reason) = navigation.error_text {
			return Err(Error::Navigation {
				url: url.to_string(),
				reason,
			});
		}

		self.poll_until(READY_SCRIPT, &format!("load of {url}")).await?;

		let body = match self.evaluate(BODY_SCRIPT).await? {
			Value::String(text) => Some(text),
			_ => None,
		};
		Ok(PageResponse::new(url, body))
	}

	async fn wait_for_selector(&self, selector: &str) -> Result<()> {
		self.poll_until(&query_exists(selector), &format!("selector '{selector}'")).await
	}

	async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
		if self.evaluate(&focus_script(selector)).await? != Value::Bool(true) {
			return Err(Error::ElementNotFound(selector.to_string()));
		}
		self.connection
			.call::<_, Value>(INPUT_INSERT_TEXT, &InsertTextParams { text: text.to_string() })
			.await?;
		Ok(())
	}

	async fn click(&self, selector: &str) -> Result<()> {
		if self.evaluate(&click_script(selector)).await? != Value::Bool(true) {
			return Err(Error::ElementNotFound(selector.to_string()));
		}
		Ok(())
	}

	async fn close(&mut self) -> Result<()> {
		if self.closed {
			return Ok(());
		}
		self.closed = true;
		if let Some(process) = self.process.as_mut() {
			if let Err(e) = self.connection.send(BROWSER_CLOSE, Value::Null).await {
				trace!(target = "slotwatch.cdp", error = %e, "Browser.close not acknowledged");
			}
			self.connection.close().await;
			process.shutdown().await?;
		} else {
			self.connection.close().await;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn selectors_are_escaped_as_string_literals() {
		assert_eq!(query_exists("#user_email"), r##"document.querySelector("#user_email") !== null"##);
		assert_eq!(
			query_exists(r#"input[name="a'b"]"#),
			r#"document.querySelector("input[name=\"a'b\"]") !== null"#
		);
	}

	#[test]
	fn click_script_reports_missing_element() {
		let script = click_script(".new_user input.button");
		assert!(script.contains(r#"document.querySelector(".new_user input.button")"#));
		assert!(script.contains("if (!el) return false"));
	}

	#[test]
	fn insert_text_payload_shape() {
		let params = serde_json::to_value(InsertTextParams { text: "secret".into() }).unwrap();
		assert_eq!(params, json!({ "text": "secret" }));
	}
}
