//! Slot listing retrieval through the authenticated page.

use serde_json::Value;
use slotwatch_runtime::{Page, PageResponse};
use tracing::{debug, warn};

use super::{CandidateDate, parse_listing_date};
use crate::error::FetchError;

/// One initial request plus exactly one retry.
pub const MAX_ATTEMPTS: u32 = 2;

pub struct SlotFetcher {
	url: String,
}

enum Listing {
	Dates(Vec<CandidateDate>),
	Empty,
	Malformed(String),
}

impl SlotFetcher {
	pub fn new(url: impl Into<String>) -> Self {
		Self { url: url.into() }
	}

	/// Requests the listing, retrying once when it comes back empty or unreadable.
	/// Navigation failures are not retried.
	pub async fn fetch_dates(&self, page: &dyn Page) -> Result<Vec<CandidateDate>, FetchError> {
		let mut last = Listing::Empty;

		for attempt in 1..=MAX_ATTEMPTS {
			let response = page.goto(&self.url).await.map_err(FetchError::Transport)?;

			last = parse_listing(&response);
			match &last {
				Listing::Dates(dates) => {
					debug!(target = "slotwatch.fetch", attempt, count = dates.len(), "slot listing received");
					break;
				}
				Listing::Empty => warn!(target = "slotwatch.fetch", attempt, "slot listing empty"),
				Listing::Malformed(reason) => warn!(target = "slotwatch.fetch", attempt, %reason, "slot listing malformed"),
			}
		}

		match last {
			Listing::Dates(dates) => Ok(dates),
			Listing::Empty => Err(FetchError::NoDates { attempts: MAX_ATTEMPTS }),
			Listing::Malformed(reason) => Err(FetchError::Malformed {
				attempts: MAX_ATTEMPTS,
				reason,
			}),
		}
	}
}

fn parse_listing(response: &PageResponse) -> Listing {
	let parsed = match response.json::<Value>() {
		None => return Listing::Malformed("response had no body".into()),
		Some(Err(e)) => return Listing::Malformed(format!("body is not JSON: {e}")),
		Some(Ok(value)) => value,
	};

	let entries = match parsed {
		Value::Array(entries) => entries,
		Value::Null => return Listing::Malformed("body is null".into()),
		other => return Listing::Malformed(format!("expected a JSON array, got {}", kind(&other))),
	};

	if entries.is_empty() {
		return Listing::Empty;
	}

	let total = entries.len();
	let mut dates = Vec::with_capacity(total);
	for (index, entry) in entries.into_iter().enumerate() {
		match entry.get("date").and_then(Value::as_str).and_then(parse_listing_date) {
			Some(date) => dates.push(CandidateDate::new(date, entry)),
			None => warn!(target = "slotwatch.fetch", index, %entry, "skipping listing entry without a usable date"),
		}
	}

	if dates.is_empty() {
		return Listing::Malformed(format!("none of {total} entries has a usable date"));
	}
	Listing::Dates(dates)
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
