use std::sync::Arc;

use clap::Parser;
use slotwatch::cli::Cli;
use slotwatch::config::WatchConfig;
use slotwatch::error::Result;
use slotwatch::logging;
use slotwatch::notify::{Notifier, SystemNotifier, SystemOpener};
use slotwatch::scheduler::{Poller, Scheduler};
use slotwatch::session::SessionManager;
use slotwatch::slots::{SlotEvaluator, SlotFetcher};
use slotwatch_runtime::ChromiumLauncher;
use tracing::{error, info};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	let config = cli.into_config();
	let scheduler = match build(&config) {
		Ok(scheduler) => scheduler,
		Err(err) => {
			error!(target = "slotwatch", error = %err, "startup failed");
			std::process::exit(1);
		}
	};

	info!(
		target = "slotwatch",
		consulate = %config.consulate,
		deadline = %config.deadline,
		top_n = config.top_n,
		"watching for appointment slots"
	);
	scheduler.run(shutdown_signal()).await;
}

fn build(config: &WatchConfig) -> Result<Scheduler> {
	let launcher = Arc::new(ChromiumLauncher::new(config.chrome_path.clone()));
	let sessions = SessionManager::new(
		launcher,
		config.credentials.clone(),
		config.sign_in_url()?,
		config.headless,
	);
	let notifier = Notifier::new(
		config.deadline,
		config.appointment_url()?,
		Arc::new(SystemNotifier),
		Arc::new(SystemOpener),
	);
	let poller = Poller::new(
		sessions,
		SlotFetcher::new(config.slots_url()?),
		SlotEvaluator::new(config.top_n),
		notifier,
	);
	Ok(Scheduler::new(Arc::new(poller), config.interval).single_flight(config.single_flight))
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			error!(target = "slotwatch", error = %err, "cannot listen for Ctrl-C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(err) => {
				error!(target = "slotwatch", error = %err, "cannot listen for SIGTERM");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {}
		_ = terminate => {}
	}
	info!(target = "slotwatch", "shutdown requested");
}
