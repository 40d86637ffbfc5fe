//! In-memory browser used by unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use slotwatch_runtime::{Error as EngineError, Launcher, Page, PageResponse};

use crate::notify::{DesktopNotifier, Notification, UrlOpener};

#[derive(Default)]
struct State {
	events: Vec<String>,
	launches: usize,
	fail_launch: bool,
	reject_sign_in: bool,
	fail_close: bool,
	bodies: VecDeque<Result<Option<String>, String>>,
	fallback_body: Option<String>,
	listing_delay: Duration,
}

/// Hands out [`FakePage`]s and records everything they are asked to do.
#[derive(Clone, Default)]
pub(crate) struct FakeBrowser {
	state: Arc<Mutex<State>>,
}

impl FakeBrowser {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn with_listing(self, body: &str) -> Self {
		self.state.lock().fallback_body = Some(body.to_string());
		self
	}

	/// Queues a body for the next listing request; `Err` fails the navigation.
	pub(crate) fn push_body(&self, body: Result<Option<&str>, &str>) {
		self.state
			.lock()
			.bodies
			.push_back(body.map(|b| b.map(str::to_string)).map_err(str::to_string));
	}

	/// Makes every listing request take `delay` of tokio time.
	pub(crate) fn slow_listing(&self, delay: Duration) {
		self.state.lock().listing_delay = delay;
	}

	pub(crate) fn fail_launch(&self, fail: bool) {
		self.state.lock().fail_launch = fail;
	}

	pub(crate) fn reject_sign_in(&self, reject: bool) {
		self.state.lock().reject_sign_in = reject;
	}

	/// Makes `close` report an error after recording it.
	pub(crate) fn fail_close(&self, fail: bool) {
		self.state.lock().fail_close = fail;
	}

	pub(crate) fn launches(&self) -> usize {
		self.state.lock().launches
	}

	pub(crate) fn events(&self) -> Vec<String> {
		self.state.lock().events.clone()
	}

	pub(crate) fn count(&self, prefix: &str) -> usize {
		self.state.lock().events.iter().filter(|e| e.starts_with(prefix)).count()
	}

	pub(crate) fn launcher(&self) -> Arc<dyn Launcher> {
		Arc::new(self.clone())
	}
}

#[async_trait]
impl Launcher for FakeBrowser {
	async fn launch(&self, _headless: bool) -> slotwatch_runtime::Result<Box<dyn Page>> {
		let mut state = self.state.lock();
		if state.fail_launch {
			return Err(EngineError::Launch("no chromium here".into()));
		}
		state.launches += 1;
		let id = state.launches;
		state.events.push(format!("launch#{id}"));
		Ok(Box::new(FakePage {
			id,
			state: Arc::clone(&self.state),
			closed: false,
		}))
	}
}

pub(crate) struct FakePage {
	id: usize,
	state: Arc<Mutex<State>>,
	closed: bool,
}

#[async_trait]
impl Page for FakePage {
	async fn goto(&self, url: &str) -> slotwatch_runtime::Result<PageResponse> {
		let delay = {
			let mut state = self.state.lock();
			state.events.push(format!("goto#{}:{url}", self.id));
			if url.contains("sign_in") {
				return Ok(PageResponse::new(url, Some(String::new())));
			}
			state.listing_delay
		};
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}

		let mut state = self.state.lock();
		match state.bodies.pop_front() {
			Some(Ok(body)) => Ok(PageResponse::new(url, body)),
			Some(Err(reason)) => Err(EngineError::Navigation {
				url: url.to_string(),
				reason,
			}),
			None => Ok(PageResponse::new(url, state.fallback_body.clone())),
		}
	}

	async fn wait_for_selector(&self, selector: &str) -> slotwatch_runtime::Result<()> {
		let mut state = self.state.lock();
		state.events.push(format!("wait#{}:{selector}", self.id));
		if state.reject_sign_in && selector.contains("sign_out") {
			return Err(EngineError::Timeout {
				ms: 30_000,
				condition: format!("selector {selector}"),
			});
		}
		Ok(())
	}

	async fn type_text(&self, selector: &str, _text: &str) -> slotwatch_runtime::Result<()> {
		self.state.lock().events.push(format!("type#{}:{selector}", self.id));
		Ok(())
	}

	async fn click(&self, selector: &str) -> slotwatch_runtime::Result<()> {
		self.state.lock().events.push(format!("click#{}:{selector}", self.id));
		Ok(())
	}

	async fn close(&mut self) -> slotwatch_runtime::Result<()> {
		if self.closed {
			return Ok(());
		}
		self.closed = true;
		let mut state = self.state.lock();
		state.events.push(format!("close#{}", self.id));
		if state.fail_close {
			return Err(EngineError::TargetClosed("browser already gone".into()));
		}
		Ok(())
	}
}

/// Counts alerts and browser openings instead of performing them.
#[derive(Default)]
pub(crate) struct CountingAlerts {
	pub(crate) notified: AtomicUsize,
	pub(crate) opened: AtomicUsize,
}

impl CountingAlerts {
	pub(crate) fn notified(&self) -> usize {
		self.notified.load(Ordering::SeqCst)
	}

	pub(crate) fn opened(&self) -> usize {
		self.opened.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl DesktopNotifier for CountingAlerts {
	async fn notify(&self, _notification: &Notification) -> crate::error::Result<bool> {
		self.notified.fetch_add(1, Ordering::SeqCst);
		Ok(false)
	}
}

#[async_trait]
impl UrlOpener for CountingAlerts {
	async fn open(&self, _url: &str) -> crate::error::Result<()> {
		self.opened.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}
