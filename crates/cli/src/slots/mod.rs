//! Slot listing retrieval and ranking.

pub mod evaluator;
pub mod fetcher;

use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;

pub use evaluator::{SlotEvaluator, is_notable};
pub use fetcher::SlotFetcher;

/// One available day from the listing, with the entry it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDate {
	pub date: NaiveDate,
	pub raw: Value,
}

impl CandidateDate {
	pub fn new(date: NaiveDate, raw: Value) -> Self {
		Self { date, raw }
	}
}

/// Parses `YYYY-MM-DD`, ignoring anything after the tenth character
/// (`2022-08-30T00:00:00Z` and similar).
pub fn parse_listing_date(value: &str) -> Option<NaiveDate> {
	let day = value.trim().get(..10)?;
	NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Closest dates in ascending order, at most N long.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedResult(Vec<CandidateDate>);

impl RankedResult {
	pub fn new(dates: Vec<CandidateDate>) -> Self {
		Self(dates)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn earliest(&self) -> Option<NaiveDate> {
		self.0.first().map(|c| c.date)
	}

	pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
		self.0.iter().map(|c| c.date)
	}

	pub fn entries(&self) -> &[CandidateDate] {
		&self.0
	}
}

impl fmt::Display for RankedResult {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, date) in self.dates().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}", date.format("%Y-%m-%d"))?;
		}
		Ok(())
	}
}
