// slotwatch-runtime: browser lifecycle and DevTools plumbing.
//
// The watcher core depends only on the `Launcher`/`Page` traits; everything
// Chromium-specific stays inside this crate.

pub mod chromium;
pub mod connection;
pub mod engine;
pub mod error;
pub mod finder;
pub mod process;

pub use chromium::{ChromiumLauncher, ChromiumPage};
pub use connection::Connection;
pub use engine::{DEFAULT_TIMEOUT, Launcher, Page, PageResponse};
pub use error::{Error, Result};
