use chrono::NaiveDate;

use super::{CandidateDate, RankedResult};
use crate::config::DEFAULT_TOP_N;

/// Orders candidates and keeps the closest `top_n`.
#[derive(Debug, Clone, Copy)]
pub struct SlotEvaluator {
	top_n: usize,
}

impl Default for SlotEvaluator {
	fn default() -> Self {
		Self::new(DEFAULT_TOP_N)
	}
}

impl SlotEvaluator {
	pub fn new(top_n: usize) -> Self {
		Self { top_n: top_n.max(1) }
	}

	pub fn evaluate(&self, mut dates: Vec<CandidateDate>) -> RankedResult {
		// stable: equal dates keep listing order
		dates.sort_by_key(|c| c.date);
		dates.truncate(self.top_n);
		RankedResult::new(dates)
	}
}

/// True when the earliest ranked date is on or before `deadline`.
pub fn is_notable(ranked: &RankedResult, deadline: NaiveDate) -> bool {
	ranked.earliest().is_some_and(|earliest| earliest <= deadline)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn day(s: &str) -> NaiveDate {
		NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
	}

	fn candidates(days: &[&str]) -> Vec<CandidateDate> {
		days.iter()
			.enumerate()
			.map(|(i, d)| CandidateDate::new(day(d), json!({ "date": d, "seq": i })))
			.collect()
	}

	#[test]
	fn evaluate_sorts_and_truncates() {
		let ranked = SlotEvaluator::new(3).evaluate(candidates(&[
			"2023-01-10",
			"2022-09-15",
			"2022-12-01",
			"2022-08-30",
			"2022-10-05",
		]));
		let days: Vec<_> = ranked.dates().collect();
		assert_eq!(days, vec![day("2022-08-30"), day("2022-09-15"), day("2022-10-05")]);
	}

	#[test]
	fn evaluate_length_is_min_of_n_and_input() {
		let evaluator = SlotEvaluator::new(5);
		for len in 1..8 {
			let input: Vec<String> = (0..len).map(|i| format!("2022-09-{:02}", 28 - i)).collect();
			let refs: Vec<&str> = input.iter().map(String::as_str).collect();
			let ranked = evaluator.evaluate(candidates(&refs));
			assert_eq!(ranked.len(), len.min(5));
			let days: Vec<_> = ranked.dates().collect();
			assert!(days.windows(2).all(|w| w[0] <= w[1]), "not ascending: {days:?}");
		}
	}

	#[test]
	fn equal_dates_keep_listing_order() {
		let ranked = SlotEvaluator::new(3).evaluate(candidates(&["2022-09-01", "2022-08-30", "2022-09-01"]));
		let seqs: Vec<_> = ranked.entries().iter().map(|c| c.raw["seq"].as_u64().unwrap()).collect();
		assert_eq!(seqs, vec![1, 0, 2]);
	}

	#[test]
	fn empty_input_is_distinguishable() {
		let evaluator = SlotEvaluator::default();
		let empty = evaluator.evaluate(Vec::new());
		let late = evaluator.evaluate(candidates(&["2022-12-01"]));
		assert!(empty.is_empty());
		assert!(!late.is_empty());
		assert_ne!(empty, late);
	}

	#[test]
	fn notability_is_inclusive_of_deadline() {
		let deadline = day("2022-08-31");
		let evaluator = SlotEvaluator::default();
		assert!(is_notable(&evaluator.evaluate(candidates(&["2022-08-30"])), deadline));
		assert!(is_notable(&evaluator.evaluate(candidates(&["2022-08-31"])), deadline));
		assert!(!is_notable(&evaluator.evaluate(candidates(&["2022-09-01"])), deadline));
		assert!(!is_notable(&RankedResult::default(), deadline));
	}

	#[test]
	fn notability_uses_earliest_even_if_listed_last() {
		let ranked = SlotEvaluator::default().evaluate(candidates(&["2022-10-01", "2022-09-20", "2022-08-15"]));
		assert!(is_notable(&ranked, day("2022-08-31")));
	}
}
