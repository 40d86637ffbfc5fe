//! Authenticated browser session and its lifecycle.
//!
//! At most one session exists at a time. It is created lazily by
//! [`SessionManager::ensure`], reused while younger than [`SESSION_TTL`],
//! and closed before any replacement is launched.

/// Session cache, expiry, and invalidation.
pub mod manager;
/// Sign-in form automation.
pub mod sign_in;

use std::time::Duration;

use slotwatch_runtime::Page;
use tokio::time::Instant;
use tracing::warn;

pub use manager::SessionManager;
pub use sign_in::SignInForm;

/// Sessions older than this are replaced on the next cycle.
pub const SESSION_TTL: Duration = Duration::from_secs(15 * 60);

/// A signed-in page and the moment sign-in completed.
pub struct Session {
	page: Box<dyn Page>,
	created_at: Instant,
}

impl Session {
	pub(crate) fn new(page: Box<dyn Page>) -> Self {
		Self {
			page,
			created_at: Instant::now(),
		}
	}

	pub fn page(&self) -> &dyn Page {
		self.page.as_ref()
	}

	pub fn age(&self) -> Duration {
		self.created_at.elapsed()
	}

	/// Shuts the browser down. Failures are logged; the session is gone either way.
	pub(crate) async fn close(mut self) {
		if let Err(e) = self.page.close().await {
			warn!(target = "slotwatch.session", error = %e, "browser did not close cleanly");
		}
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session").field("age", &self.age()).finish_non_exhaustive()
	}
}
