//! Poll cycles and the interval loop that drives them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use crate::error::Result;
use crate::notify::Notifier;
use crate::session::SessionManager;
use crate::slots::{RankedResult, SlotEvaluator, SlotFetcher, is_notable};

/// Where a cycle is. Session refresh happens inside `EnsuringSession`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
	Idle,
	EnsuringSession,
	Fetching,
	Evaluating,
	Notifying,
}

impl fmt::Display for CycleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			CycleState::Idle => "IDLE",
			CycleState::EnsuringSession => "ENSURING_SESSION",
			CycleState::Fetching => "FETCHING",
			CycleState::Evaluating => "EVALUATING",
			CycleState::Notifying => "NOTIFYING",
		})
	}
}

/// Result of one cycle. Only logged.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
	Success(RankedResult),
	Empty,
	Error(String),
}

/// Runs individual cycles against the shared session.
pub struct Poller {
	sessions: Mutex<SessionManager>,
	fetcher: SlotFetcher,
	evaluator: SlotEvaluator,
	notifier: Notifier,
	cycles: AtomicU64,
}

impl Poller {
	pub fn new(sessions: SessionManager, fetcher: SlotFetcher, evaluator: SlotEvaluator, notifier: Notifier) -> Self {
		Self {
			sessions: Mutex::new(sessions),
			fetcher,
			evaluator,
			notifier,
			cycles: AtomicU64::new(0),
		}
	}

	/// One full cycle. Never fails; errors become [`PollOutcome::Error`].
	pub async fn run_cycle(&self) -> PollOutcome {
		let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;

		let outcome = match self.try_cycle(cycle).await {
			Ok(ranked) if ranked.is_empty() => PollOutcome::Empty,
			Ok(ranked) => PollOutcome::Success(ranked),
			Err(e) if e.is_no_dates() => PollOutcome::Empty,
			Err(e) => PollOutcome::Error(e.to_string()),
		};

		match &outcome {
			PollOutcome::Success(ranked) => {
				let notable = is_notable(ranked, self.notifier.deadline());
				info!(target = "slotwatch.scheduler", cycle, dates = %ranked, notable, "closest dates");
			}
			PollOutcome::Empty => info!(target = "slotwatch.scheduler", cycle, "no available dates"),
			PollOutcome::Error(reason) => error!(target = "slotwatch.scheduler", cycle, %reason, "cycle failed"),
		}
		enter(cycle, CycleState::Idle);
		outcome
	}

	async fn try_cycle(&self, cycle: u64) -> Result<RankedResult> {
		let dates = {
			let mut sessions = self.sessions.lock().await;

			enter(cycle, CycleState::EnsuringSession);
			let session = sessions.ensure().await?;

			enter(cycle, CycleState::Fetching);
			match self.fetcher.fetch_dates(session.page()).await {
				Ok(dates) => dates,
				Err(e) => {
					sessions.invalidate().await;
					return Err(e.into());
				}
			}
		};

		enter(cycle, CycleState::Evaluating);
		let ranked = self.evaluator.evaluate(dates);

		enter(cycle, CycleState::Notifying);
		self.notifier.maybe_notify(&ranked);
		Ok(ranked)
	}

	/// Number of cycles that have entered [`Poller::run_cycle`].
	pub fn cycles_started(&self) -> u64 {
		self.cycles.load(Ordering::Relaxed)
	}

	/// Closes the cached session.
	pub async fn shutdown(&self) {
		self.sessions.lock().await.shutdown().await;
	}
}

fn enter(cycle: u64, state: CycleState) {
	trace!(target = "slotwatch.scheduler", cycle, %state, "state");
}

/// Cycles allowed to exist at once: one running and one waiting for the session.
const MAX_IN_FLIGHT: usize = 2;

/// Counts a spawned cycle until it finishes, even by panicking.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
	/// Only the scheduler loop acquires, so load-then-increment cannot race.
	fn acquire(counter: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
		if counter.load(Ordering::SeqCst) >= limit {
			return None;
		}
		counter.fetch_add(1, Ordering::SeqCst);
		Some(Self(Arc::clone(counter)))
	}
}

impl Drop for InFlight {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

/// Fires a cycle immediately and then every `interval`, measured from start.
///
/// A tick is skipped while a cycle is still waiting for the session behind a
/// running one, so slow cycles never build a backlog. With single-flight, a
/// tick is skipped whenever any cycle is still running.
pub struct Scheduler {
	poller: Arc<Poller>,
	interval: Duration,
	single_flight: bool,
}

impl Scheduler {
	pub fn new(poller: Arc<Poller>, interval: Duration) -> Self {
		Self {
			poller,
			interval,
			single_flight: false,
		}
	}

	/// Skip ticks that arrive while the previous cycle is still running.
	pub fn single_flight(mut self, enabled: bool) -> Self {
		self.single_flight = enabled;
		self
	}

	/// Runs until `shutdown` resolves, then stops in-flight cycles and closes the session.
	pub async fn run(self, shutdown: impl Future<Output = ()>) {
		let mut ticker = tokio::time::interval(self.interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

		let limit = if self.single_flight { 1 } else { MAX_IN_FLIGHT };
		let in_flight = Arc::new(AtomicUsize::new(0));
		let mut cycles = JoinSet::new();
		tokio::pin!(shutdown);

		info!(
			target = "slotwatch.scheduler",
			interval_secs = self.interval.as_secs(),
			single_flight = self.single_flight,
			"polling started"
		);

		loop {
			tokio::select! {
				_ = &mut shutdown => break,
				_ = ticker.tick() => {
					let Some(guard) = InFlight::acquire(&in_flight, limit) else {
						warn!(target = "slotwatch.scheduler", in_flight = limit, "previous cycle still running; skipping tick");
						continue;
					};

					let poller = Arc::clone(&self.poller);
					cycles.spawn(async move {
						let _guard = guard;
						poller.run_cycle().await
					});
				}
				Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
					match joined {
						Ok(outcome) => debug!(target = "slotwatch.scheduler", ?outcome, "cycle finished"),
						Err(e) if e.is_panic() => error!(target = "slotwatch.scheduler", error = %e, "cycle panicked"),
						Err(_) => {}
					}
				}
			}
		}

		info!(
			target = "slotwatch.scheduler",
			running = cycles.len(),
			started = self.poller.cycles_started(),
			"shutting down"
		);
		cycles.shutdown().await;
		self.poller.shutdown().await;
	}
}
