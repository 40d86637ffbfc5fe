use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity count.
pub fn init_logging(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

	let fmt_layer = fmt::layer()
		.with_target(verbose > 0)
		.with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()));

	let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}

fn default_directive(verbose: u8) -> &'static str {
	match verbose {
		0 => "info",
		1 => "info,slotwatch=debug",
		_ => "trace",
	}
}
