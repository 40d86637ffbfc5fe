//! Platform notification and URL-opening commands.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{DesktopNotifier, Notification, UrlOpener};
use crate::error::{Result, WatchError};

/// Key `notify-send` prints on stdout when the action button is clicked.
const ACTION_KEY: &str = "open";

/// Extra time a notification command gets beyond its action timeout.
const EXIT_GRACE: Duration = Duration::from_secs(5);

/// How long a URL opener may take to hand the URL off.
const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// A program and its arguments, resolved for one operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemCommand {
	pub program: String,
	pub args: Vec<String>,
}

impl SystemCommand {
	fn new(program: &str, args: impl IntoIterator<Item = String>) -> Self {
		Self {
			program: program.to_string(),
			args: args.into_iter().collect(),
		}
	}

	/// Runs the command and returns its stdout, or `None` if it was still
	/// running after `limit` and had to be killed.
	async fn run(&self, limit: Duration) -> Result<Option<String>> {
		debug!(target = "slotwatch.notify", program = %self.program, limit_ms = limit.as_millis() as u64, "running");
		let child = Command::new(&self.program)
			.args(&self.args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| WatchError::Notification(format!("failed to run {}: {e}", self.program)))?;

		let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
			Ok(output) => output.map_err(|e| WatchError::Notification(format!("failed to wait for {}: {e}", self.program)))?,
			Err(_) => {
				debug!(target = "slotwatch.notify", program = %self.program, "still running after limit; killed");
				return Ok(None);
			}
		};

		if !output.status.success() {
			let stderr = String::from_utf8_lossy(&output.stderr);
			return Err(WatchError::Notification(format!(
				"{} exited with {}: {}",
				self.program,
				output.status,
				stderr.trim()
			)));
		}
		Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
	}
}

/// `notify-send` on Linux and the BSDs, `osascript` on macOS, a tray balloon on Windows.
///
/// Only `notify-send` offers the action button. It blocks until the button is
/// clicked or the notification closes, printing `open` on a click.
pub fn notification_command(os: &str, notification: &Notification) -> SystemCommand {
	let timeout_ms = notification.action_timeout.as_millis();
	match os {
		"macos" => {
			let mut script = format!(
				"display notification \"{}\" with title \"{}\"",
				applescript_escape(&notification.message),
				applescript_escape(&notification.title)
			);
			if notification.sound {
				script.push_str(" sound name \"default\"");
			}
			SystemCommand::new("osascript", ["-e".to_string(), script])
		}
		"windows" => {
			let script = format!(
				"Add-Type -AssemblyName System.Windows.Forms; \
				 $n = New-Object System.Windows.Forms.NotifyIcon; \
				 $n.Icon = [System.Drawing.SystemIcons]::Information; \
				 $n.Visible = $true; \
				 $n.ShowBalloonTip({timeout_ms}, '{}', '{}', 'Info'); \
				 Start-Sleep -Milliseconds {timeout_ms}; \
				 $n.Dispose()",
				powershell_escape(&notification.title),
				powershell_escape(&notification.message)
			);
			SystemCommand::new(
				"powershell",
				["-NoProfile".to_string(), "-NonInteractive".into(), "-Command".into(), script],
			)
		}
		_ => {
			let mut args = vec![
				"--app-name=slotwatch".to_string(),
				"--urgency=normal".into(),
				format!("--expire-time={timeout_ms}"),
				format!("--action={ACTION_KEY}={}", notification.action_label),
			];
			if notification.sound {
				args.push("--hint=string:sound-name:message-new-instant".into());
			}
			args.push(notification.title.clone());
			args.push(notification.message.clone());
			SystemCommand::new("notify-send", args)
		}
	}
}

/// Command that opens `url` in the default browser.
pub fn open_command(os: &str, url: &str) -> SystemCommand {
	match os {
		"macos" => SystemCommand::new("open", [url.to_string()]),
		// empty title argument so `start` does not treat the URL as one
		"windows" => SystemCommand::new("cmd", ["/C".to_string(), "start".into(), String::new(), url.to_string()]),
		_ => SystemCommand::new("xdg-open", [url.to_string()]),
	}
}

fn applescript_escape(text: &str) -> String {
	text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn powershell_escape(text: &str) -> String {
	text.replace('\'', "''")
}

/// Shows notifications through the host's notification tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNotifier;

#[async_trait]
impl DesktopNotifier for SystemNotifier {
	async fn notify(&self, notification: &Notification) -> Result<bool> {
		let limit = notification.action_timeout + EXIT_GRACE;
		match notification_command(std::env::consts::OS, notification).run(limit).await? {
			Some(stdout) => Ok(stdout.trim() == ACTION_KEY),
			None => Ok(false),
		}
	}
}

/// Opens URLs with the host's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

#[async_trait]
impl UrlOpener for SystemOpener {
	async fn open(&self, url: &str) -> Result<()> {
		let command = open_command(std::env::consts::OS, url);
		match command.run(OPEN_TIMEOUT).await? {
			Some(_) => Ok(()),
			None => Err(WatchError::Notification(format!(
				"{} did not exit within {}s",
				command.program,
				OPEN_TIMEOUT.as_secs()
			))),
		}
	}
}
