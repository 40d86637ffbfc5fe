use slotwatch_runtime::Page;
use tracing::debug;

use crate::config::Credentials;
use crate::error::{Result, WatchError};

/// Selectors of the scheduler's sign-in form.
#[derive(Debug, Clone)]
pub struct SignInForm {
	pub email: &'static str,
	pub password: &'static str,
	pub policy: &'static str,
	pub submit: &'static str,
	/// Only present once the account is signed in.
	pub landing: &'static str,
}

impl Default for SignInForm {
	fn default() -> Self {
		Self {
			email: "#user_email",
			password: "#user_password",
			policy: "#policy_confirmed",
			submit: ".new_user input.button",
			landing: "a[href*='sign_out']",
		}
	}
}

impl SignInForm {
	/// Fills and submits the form at `url`, then waits for the landing page.
	///
	/// Every engine failure along the way is reported as
	/// [`WatchError::Authentication`] naming the step that failed.
	pub async fn submit(&self, page: &dyn Page, url: &str, credentials: &Credentials) -> Result<()> {
		let step = |what: &'static str| move |e: slotwatch_runtime::Error| WatchError::Authentication(format!("{what}: {e}"));

		page.goto(url).await.map_err(step("opening sign-in page"))?;
		page.wait_for_selector(self.email).await.map_err(step("waiting for sign-in form"))?;
		debug!(target = "slotwatch.session", email = %credentials.email, "filling sign-in form");

		page.type_text(self.email, &credentials.email).await.map_err(step("typing email"))?;
		page.type_text(self.password, &credentials.password).await.map_err(step("typing password"))?;
		page.click(self.policy).await.map_err(step("accepting policy"))?;
		page.click(self.submit).await.map_err(step("submitting form"))?;

		page.wait_for_selector(self.landing).await.map_err(step("sign-in was not accepted"))?;
		Ok(())
	}
}
