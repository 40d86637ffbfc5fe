//! Alerting when an early slot appears.

pub mod desktop;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::Result;
use crate::slots::{RankedResult, is_notable};

pub use desktop::{SystemNotifier, SystemOpener};

pub const ALERT_TITLE: &str = "Visa appointment available";
pub const ACTION_LABEL: &str = "Open";
pub const ACTION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
	pub title: String,
	pub message: String,
	pub sound: bool,
	pub action_label: String,
	pub action_timeout: Duration,
}

impl Notification {
	/// Alert listing every ranked date, one per line.
	pub fn for_dates(ranked: &RankedResult) -> Self {
		let message = ranked
			.dates()
			.map(|d| d.format("%Y-%m-%d").to_string())
			.collect::<Vec<_>>()
			.join("\n");
		Self {
			title: ALERT_TITLE.to_string(),
			message,
			sound: true,
			action_label: ACTION_LABEL.to_string(),
			action_timeout: ACTION_TIMEOUT,
		}
	}
}

#[async_trait]
pub trait DesktopNotifier: Send + Sync {
	/// Shows `notification` and resolves once it is dismissed or times out.
	/// Returns `true` when the user picked the action.
	async fn notify(&self, notification: &Notification) -> Result<bool>;
}

#[async_trait]
pub trait UrlOpener: Send + Sync {
	async fn open(&self, url: &str) -> Result<()>;
}

/// Fires an alert and opens the booking page when the earliest date is early enough.
pub struct Notifier {
	deadline: NaiveDate,
	reference_url: String,
	desktop: Arc<dyn DesktopNotifier>,
	opener: Arc<dyn UrlOpener>,
}

impl Notifier {
	pub fn new(
		deadline: NaiveDate,
		reference_url: impl Into<String>,
		desktop: Arc<dyn DesktopNotifier>,
		opener: Arc<dyn UrlOpener>,
	) -> Self {
		Self {
			deadline,
			reference_url: reference_url.into(),
			desktop,
			opener,
		}
	}

	pub fn deadline(&self) -> NaiveDate {
		self.deadline
	}

	/// Submits the alert and returns immediately. Returns whether `ranked` was notable.
	///
	/// Both side effects run as detached tasks. Their failures are logged, never returned.
	/// Picking the notification's action opens the booking page once more.
	pub fn maybe_notify(&self, ranked: &RankedResult) -> bool {
		if !is_notable(ranked, self.deadline) {
			return false;
		}

		info!(target = "slotwatch.notify", dates = %ranked, deadline = %self.deadline, "early slot found; alerting");

		let notification = Notification::for_dates(ranked);
		let desktop = Arc::clone(&self.desktop);
		let opener = Arc::clone(&self.opener);
		let url = self.reference_url.clone();
		tokio::spawn(async move {
			match desktop.notify(&notification).await {
				Ok(true) => {
					info!(target = "slotwatch.notify", %url, "notification action chosen");
					if let Err(e) = opener.open(&url).await {
						warn!(target = "slotwatch.notify", error = %e, %url, "could not open browser");
					}
				}
				Ok(false) => {}
				Err(e) => warn!(target = "slotwatch.notify", error = %e, "desktop notification failed"),
			}
		});

		let url = self.reference_url.clone();
		let opener = Arc::clone(&self.opener);
		tokio::spawn(async move {
			if let Err(e) = opener.open(&url).await {
				warn!(target = "slotwatch.notify", error = %e, %url, "could not open browser");
			}
		});

		true
	}
}
