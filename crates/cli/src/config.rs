//! Resolved runtime configuration and the URLs derived from it.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use url::Url;

use crate::error::{Result, WatchError};

pub const DEFAULT_BASE_URL: &str = "https://ais.usvisa-info.com/pt-br/niv";
pub const DEFAULT_TOP_N: usize = 3;

/// Account used for the sign-in flow. `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
	pub email: String,
	pub password: String,
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Credentials")
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
	pub consulate: String,
	pub schedule_id: String,
	pub credentials: Credentials,
	pub headless: bool,
	pub interval: Duration,
	pub deadline: NaiveDate,
	pub top_n: usize,
	pub base_url: Url,
	pub single_flight: bool,
	pub chrome_path: Option<PathBuf>,
}

impl WatchConfig {
	/// `{base}/users/sign_in`
	pub fn sign_in_url(&self) -> Result<Url> {
		extend(&self.base_url, &["users", "sign_in"])
	}

	/// `{base}/schedule/{id}/appointment/days/{consulate}.json?appointments%5Bexpedite%5D=false`
	pub fn slots_url(&self) -> Result<Url> {
		let file = format!("{}.json", self.consulate);
		let mut url = extend(&self.base_url, &["schedule", &self.schedule_id, "appointment", "days", &file])?;
		url.query_pairs_mut().append_pair("appointments[expedite]", "false");
		Ok(url)
	}

	/// Booking page opened when an early slot shows up.
	pub fn appointment_url(&self) -> Result<Url> {
		extend(&self.base_url, &["schedule", &self.schedule_id, "appointment"])
	}
}

fn extend(base: &Url, segments: &[&str]) -> Result<Url> {
	let mut url = base.clone();
	url.path_segments_mut()
		.map_err(|_| WatchError::Config(format!("base URL {base} cannot carry a path")))?
		.pop_if_empty()
		.extend(segments);
	Ok(url)
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) fn sample() -> WatchConfig {
		WatchConfig {
			consulate: "55".into(),
			schedule_id: "123456".into(),
			credentials: Credentials {
				email: "someone@example.com".into(),
				password: "hunter2".into(),
			},
			headless: true,
			interval: Duration::from_secs(60),
			deadline: NaiveDate::from_ymd_opt(2022, 8, 31).unwrap(),
			top_n: DEFAULT_TOP_N,
			base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
			single_flight: false,
			chrome_path: None,
		}
	}

	#[test]
	fn slots_url_matches_listing_endpoint() {
		let url = sample().slots_url().unwrap();
		assert_eq!(
			url.as_str(),
			"https://ais.usvisa-info.com/pt-br/niv/schedule/123456/appointment/days/55.json?appointments%5Bexpedite%5D=false"
		);
	}

	#[test]
	fn sign_in_url_tolerates_trailing_slash() {
		let mut config = sample();
		config.base_url = Url::parse("https://ais.usvisa-info.com/en-ca/niv/").unwrap();
		assert_eq!(
			config.sign_in_url().unwrap().as_str(),
			"https://ais.usvisa-info.com/en-ca/niv/users/sign_in"
		);
	}

	#[test]
	fn appointment_url_points_at_booking_page() {
		assert_eq!(
			sample().appointment_url().unwrap().as_str(),
			"https://ais.usvisa-info.com/pt-br/niv/schedule/123456/appointment"
		);
	}

	#[test]
	fn opaque_base_is_a_config_error() {
		let mut config = sample();
		config.base_url = Url::parse("mailto:ops@example.com").unwrap();
		assert!(matches!(config.sign_in_url(), Err(WatchError::Config(_))));
	}

	#[test]
	fn debug_output_redacts_password() {
		let rendered = format!("{:?}", sample());
		assert!(rendered.contains("someone@example.com"));
		assert!(!rendered.contains("hunter2"));
	}
}
