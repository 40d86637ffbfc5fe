use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser};
use url::Url;

use crate::config::{Credentials, DEFAULT_BASE_URL, WatchConfig};

/// Every option can also come from the environment variable named beside it.
#[derive(Parser, Debug)]
#[command(name = "slotwatch")]
#[command(about = "Watch an appointment scheduler for slots before a deadline")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v debug, -vv trace)
	#[arg(short, long, action = ArgAction::Count)]
	pub verbose: u8,

	/// Consulate id used in the slot-listing URL
	#[arg(long, env = "CONSULATE", value_parser = NonEmptyStringValueParser::new())]
	pub consulate: String,

	/// Account email
	#[arg(long, env = "EMAIL", value_parser = NonEmptyStringValueParser::new())]
	pub email: String,

	/// Account password
	#[arg(long, env = "PASSWORD", hide_env_values = true, value_parser = NonEmptyStringValueParser::new())]
	pub password: String,

	/// Schedule id used in the slot-listing URL
	#[arg(long, env = "SCHEDULE_ID", value_parser = NonEmptyStringValueParser::new())]
	pub schedule_id: String,

	/// "true" runs the browser headless; any other value shows it
	#[arg(long, env = "HEADLESS", action = ArgAction::Set, value_parser = parse_true)]
	pub headless: bool,

	/// Seconds between poll ticks
	#[arg(long, env = "INTERVAL", value_parser = clap::value_parser!(u64).range(1..))]
	pub interval: u64,

	/// Alert when a slot on or before this date (YYYY-MM-DD) appears
	#[arg(long, env = "DEADLINE", value_parser = parse_date)]
	pub deadline: NaiveDate,

	/// Number of closest dates to report
	#[arg(long, env = "TOP_N", default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
	pub top_n: u64,

	/// Scheduler site root, without a trailing path to a page
	#[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL, value_parser = parse_base_url)]
	pub base_url: Url,

	/// "true" skips a tick while the previous cycle is still running
	#[arg(long, env = "SINGLE_FLIGHT", action = ArgAction::Set, default_value = "false", value_parser = parse_true)]
	pub single_flight: bool,

	/// Chromium executable to launch instead of auto-discovery
	#[arg(long, env = "CHROME_PATH", value_name = "FILE")]
	pub chrome_path: Option<PathBuf>,
}

impl Cli {
	pub fn into_config(self) -> WatchConfig {
		WatchConfig {
			consulate: self.consulate,
			schedule_id: self.schedule_id,
			credentials: Credentials {
				email: self.email,
				password: self.password,
			},
			headless: self.headless,
			interval: Duration::from_secs(self.interval),
			deadline: self.deadline,
			top_n: usize::try_from(self.top_n).unwrap_or(usize::MAX),
			base_url: self.base_url,
			single_flight: self.single_flight,
			chrome_path: self.chrome_path,
		}
	}
}

/// Exactly `"true"` enables; anything else, including `"TRUE"` or `"1"`, disables.
fn parse_true(value: &str) -> Result<bool, String> {
	Ok(value == "true")
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
	NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_base_url(value: &str) -> Result<Url, String> {
	let url = Url::parse(value).map_err(|e| e.to_string())?;
	if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
		return Err(format!("{value} is not an http(s) site root"));
	}
	Ok(url)
}
