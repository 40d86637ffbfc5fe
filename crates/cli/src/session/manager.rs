//! Lazily created, time-limited browser session.

use std::sync::Arc;
use std::time::Duration;

use slotwatch_runtime::Launcher;
use tracing::{debug, info, warn};

use super::{SESSION_TTL, Session, SignInForm};
use crate::config::Credentials;
use crate::error::Result;

/// Owns the single cached session.
pub struct SessionManager {
	launcher: Arc<dyn Launcher>,
	form: SignInForm,
	credentials: Credentials,
	sign_in_url: String,
	headless: bool,
	ttl: Duration,
	cached: Option<Session>,
}

impl SessionManager {
	pub fn new(launcher: Arc<dyn Launcher>, credentials: Credentials, sign_in_url: impl Into<String>, headless: bool) -> Self {
		Self {
			launcher,
			form: SignInForm::default(),
			credentials,
			sign_in_url: sign_in_url.into(),
			headless,
			ttl: SESSION_TTL,
			cached: None,
		}
	}

	pub fn is_active(&self) -> bool {
		self.cached.is_some()
	}

	/// Returns the cached session, replacing it first when it has expired.
	///
	/// An expired session is closed before its replacement is launched. A
	/// browser that fails to sign in is closed before the error is returned.
	pub async fn ensure(&mut self) -> Result<&Session> {
		if let Some(session) = self.cached.take() {
			let age = session.age();
			if age < self.ttl {
				debug!(target = "slotwatch.session", age_secs = age.as_secs(), "reusing session");
				return Ok(self.cached.insert(session));
			}
			debug!(target = "slotwatch.session", age_secs = age.as_secs(), "session expired; closing");
			session.close().await;
		}

		let session = self.create().await?;
		Ok(self.cached.insert(session))
	}

	/// Closes and drops the cached session, if any.
	pub async fn invalidate(&mut self) {
		if let Some(session) = self.cached.take() {
			debug!(target = "slotwatch.session", "invalidating session");
			session.close().await;
		}
	}

	pub async fn shutdown(&mut self) {
		if let Some(session) = self.cached.take() {
			info!(target = "slotwatch.session", "closing browser");
			session.close().await;
		}
	}

	async fn create(&self) -> Result<Session> {
		info!(target = "slotwatch.session", headless = self.headless, "launching browser and signing in");
		let mut page = self.launcher.launch(self.headless).await?;

		if let Err(e) = self.form.submit(page.as_ref(), &self.sign_in_url, &self.credentials).await {
			if let Err(close_err) = page.close().await {
				warn!(target = "slotwatch.session", error = %close_err, "browser did not close after failed sign-in");
			}
			return Err(e);
		}

		info!(target = "slotwatch.session", "signed in");
		Ok(Session::new(page))
	}
}
