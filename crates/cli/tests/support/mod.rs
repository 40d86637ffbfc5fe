#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use slotwatch::config::Credentials;
use slotwatch::notify::{DesktopNotifier, Notification, Notifier, UrlOpener};
use slotwatch::scheduler::Poller;
use slotwatch::session::SessionManager;
use slotwatch::slots::{SlotEvaluator, SlotFetcher};
use slotwatch_runtime::{Error, Launcher, Page, PageResponse};

pub const SIGN_IN: &str = "https://scheduler.test/niv/users/sign_in";
pub const LISTING: &str = "https://scheduler.test/niv/schedule/42/appointment/days/55.json?appointments%5Bexpedite%5D=false";
pub const BOOKING: &str = "https://scheduler.test/niv/schedule/42/appointment";

/// What the fake site answers to one listing request.
#[derive(Debug, Clone)]
pub enum Reply {
	Body(&'static str),
	Fail(&'static str),
}

#[derive(Default)]
struct Site {
	replies: VecDeque<Reply>,
	otherwise: Option<Reply>,
	launches: usize,
	closes: usize,
	listing_requests: usize,
}

/// Scripted scheduler site behind a fake browser.
#[derive(Clone, Default)]
pub struct FakeSite {
	site: Arc<Mutex<Site>>,
}

impl FakeSite {
	pub fn new(otherwise: Reply) -> Self {
		let site = Self::default();
		site.site.lock().otherwise = Some(otherwise);
		site
	}

	pub fn then(&self, reply: Reply) -> &Self {
		self.site.lock().replies.push_back(reply);
		self
	}

	pub fn launches(&self) -> usize {
		self.site.lock().launches
	}

	pub fn closes(&self) -> usize {
		self.site.lock().closes
	}

	pub fn listing_requests(&self) -> usize {
		self.site.lock().listing_requests
	}
}

#[async_trait]
impl Launcher for FakeSite {
	async fn launch(&self, _headless: bool) -> slotwatch_runtime::Result<Box<dyn Page>> {
		self.site.lock().launches += 1;
		Ok(Box::new(FakeTab {
			site: Arc::clone(&self.site),
			open: true,
		}))
	}
}

struct FakeTab {
	site: Arc<Mutex<Site>>,
	open: bool,
}

#[async_trait]
impl Page for FakeTab {
	async fn goto(&self, url: &str) -> slotwatch_runtime::Result<PageResponse> {
		if url == SIGN_IN {
			return Ok(PageResponse::new(url, Some("Sign in".into())));
		}

		let mut site = self.site.lock();
		site.listing_requests += 1;
		let reply = site.replies.pop_front().or_else(|| site.otherwise.clone());
		match reply {
			Some(Reply::Body(body)) => Ok(PageResponse::new(url, Some(body.to_string()))),
			Some(Reply::Fail(reason)) => Err(Error::Navigation {
				url: url.to_string(),
				reason: reason.to_string(),
			}),
			None => Ok(PageResponse::new(url, None)),
		}
	}

	async fn wait_for_selector(&self, _selector: &str) -> slotwatch_runtime::Result<()> {
		Ok(())
	}

	async fn type_text(&self, _selector: &str, _text: &str) -> slotwatch_runtime::Result<()> {
		Ok(())
	}

	async fn click(&self, _selector: &str) -> slotwatch_runtime::Result<()> {
		Ok(())
	}

	async fn close(&mut self) -> slotwatch_runtime::Result<()> {
		if std::mem::take(&mut self.open) {
			self.site.lock().closes += 1;
		}
		Ok(())
	}
}

#[derive(Default)]
pub struct Alerts {
	notified: AtomicUsize,
	opened: Mutex<Vec<String>>,
}

impl Alerts {
	pub fn notified(&self) -> usize {
		self.notified.load(Ordering::SeqCst)
	}

	pub fn opened(&self) -> Vec<String> {
		self.opened.lock().clone()
	}
}

#[async_trait]
impl DesktopNotifier for Alerts {
	async fn notify(&self, _notification: &Notification) -> slotwatch::error::Result<bool> {
		self.notified.fetch_add(1, Ordering::SeqCst);
		Ok(false)
	}
}

#[async_trait]
impl UrlOpener for Alerts {
	async fn open(&self, url: &str) -> slotwatch::error::Result<()> {
		self.opened.lock().push(url.to_string());
		Ok(())
	}
}

pub fn deadline() -> NaiveDate {
	NaiveDate::from_ymd_opt(2022, 8, 31).expect("valid date")
}

pub fn poller(site: &FakeSite, alerts: &Arc<Alerts>) -> Poller {
	let credentials = Credentials {
		email: "someone@example.com".into(),
		password: "hunter2".into(),
	};
	let sessions = SessionManager::new(Arc::new(site.clone()), credentials, SIGN_IN, true);
	let notifier = Notifier::new(deadline(), BOOKING, alerts.clone(), alerts.clone());
	Poller::new(sessions, SlotFetcher::new(LISTING), SlotEvaluator::new(3), notifier)
}
