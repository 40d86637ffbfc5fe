//! Browser child-process lifecycle.
//!
//! Each launch gets a throwaway profile directory. Chromium is started with
//! `--remote-debugging-port=0` and reports the port it picked in
//! `<profile>/DevToolsActivePort`, which avoids racing other processes for a
//! fixed port.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::{Error, Result};

const PORT_FILE: &str = "DevToolsActivePort";
const PORT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const PORT_POLL_ATTEMPTS: u32 = 100;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A running browser plus the profile directory it owns.
pub struct BrowserProcess {
	child: Child,
	port: u16,
	_profile: TempDir,
}

impl BrowserProcess {
	/// Spawns `executable` and waits for its DevTools port.
	pub async fn spawn(executable: &Path, headless: bool) -> Result<Self> {
		let profile = tempfile::Builder::new().prefix("slotwatch-profile-").tempdir()?;

		let mut cmd = Command::new(executable);
		cmd.args(launch_args(profile.path(), headless))
			.stdin(Stdio::null())
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.kill_on_drop(true);

		#[cfg(unix)]
		cmd.process_group(0);

		let mut child = cmd
			.spawn()
			.map_err(|e| Error::Launch(format!("Failed to start {}: {}", executable.display(), e)))?;

		let port_file = profile.path().join(PORT_FILE);
		for _ in 0..PORT_POLL_ATTEMPTS {
			tokio::time::sleep(PORT_POLL_INTERVAL).await;

			if let Some(status) = child.try_wait()? {
				return Err(Error::Launch(format!(
					"{} exited before the debugging endpoint became available (status: {})",
					executable.display(),
					status
				)));
			}

			let Ok(contents) = tokio::fs::read_to_string(&port_file).await else {
				continue;
			};
			if let Some(port) = parse_devtools_port(&contents) {
				debug!(target = "slotwatch.cdp", port, pid = child.id(), "browser is listening");
				return Ok(Self {
					child,
					port,
					_profile: profile,
				});
			}
		}

		let _ = child.start_kill();
		Err(Error::Launch(format!(
			"{} started but never reported a debugging port in {}",
			executable.display(),
			port_file.display()
		)))
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	/// Kills the browser and waits for it to exit.
	pub async fn shutdown(&mut self) -> Result<()> {
		if self.child.try_wait()?.is_some() {
			return Ok(());
		}
		self.child.start_kill()?;
		match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
			Ok(status) => {
				let status = status?;
				debug!(target = "slotwatch.cdp", %status, "browser exited");
				Ok(())
			}
			Err(_) => Err(Error::Timeout {
				ms: SHUTDOWN_GRACE.as_millis() as u64,
				condition: "browser exit".into(),
			}),
		}
	}
}

fn launch_args(profile: &Path, headless: bool) -> Vec<String> {
	let mut args = vec![
		"--remote-debugging-port=0".to_string(),
		format!("--user-data-dir={}", profile.display()),
		"--no-first-run".to_string(),
		"--no-default-browser-check".to_string(),
		"--disable-background-networking".to_string(),
	];
	if headless {
		args.push("--headless=new".to_string());
	}
	args.push("about:blank".to_string());
	args
}

/// First line of `DevToolsActivePort` is the port; the second is the browser socket path.
fn parse_devtools_port(contents: &str) -> Option<u16> {
	contents.lines().next()?.trim().parse().ok().filter(|port| *port != 0)
}

/// Resolves the executable to launch: explicit path first, then discovery.
pub fn resolve_executable(explicit: Option<&Path>) -> Result<PathBuf> {
	if let Some(path) = explicit {
		return if path.exists() {
			Ok(path.to_path_buf())
		} else {
			Err(Error::Launch(format!("Browser executable {} does not exist", path.display())))
		};
	}
	crate::finder::find_chromium_executable().ok_or_else(|| {
		Error::Launch(
			"Could not find a Chrome/Chromium executable. \n\
             Install one or point CHROME_PATH at it."
				.into(),
		)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn port_file_parses_first_line() {
		assert_eq!(parse_devtools_port("41235\n/devtools/browser/abc\n"), Some(41235));
	}

	#[test]
	fn port_file_rejects_empty_and_zero() {
		assert_eq!(parse_devtools_port(""), None);
		assert_eq!(parse_devtools_port("0\n"), None);
		assert_eq!(parse_devtools_port("not-a-port\n"), None);
	}

	#[test]
	fn headless_flag_only_when_requested() {
		let profile = Path::new("/tmp/profile");
		assert!(launch_args(profile, true).contains(&"--headless=new".to_string()));
		assert!(!launch_args(profile, false).iter().any(|a| a.starts_with("--headless")));
		assert!(launch_args(profile, false).contains(&"--user-data-dir=/tmp/profile".to_string()));
	}

	#[test]
	fn explicit_missing_executable_is_a_launch_error() {
		let err = resolve_executable(Some(Path::new("/definitely/missing/chrome"))).unwrap_err();
		assert!(matches!(err, Error::Launch(_)));
		assert!(err.to_string().contains("does not exist"));
	}
}
