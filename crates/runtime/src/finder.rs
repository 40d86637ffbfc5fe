//! Chromium executable discovery.

use std::path::{Path, PathBuf};

/// Returns the first installed Chromium-family browser.
pub fn find_chromium_executable() -> Option<PathBuf> {
	let candidates = if cfg!(target_os = "macos") {
		macos_candidates()
	} else if cfg!(target_os = "windows") {
		windows_candidates()
	} else {
		linux_candidates()
	};

	candidates.into_iter().find_map(|candidate| resolve_candidate(&candidate))
}

fn resolve_candidate(candidate: &str) -> Option<PathBuf> {
	if candidate.starts_with('/') || candidate.contains('\\') || candidate.contains(':') {
		let path = Path::new(candidate);
		path.exists().then(|| path.to_path_buf())
	} else {
		which::which(candidate).ok()
	}
}

fn macos_candidates() -> Vec<String> {
	[
		"/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
		"/Applications/Chromium.app/Contents/MacOS/Chromium",
		"/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
		"/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
	]
	.into_iter()
	.map(str::to_string)
	.collect()
}

fn linux_candidates() -> Vec<String> {
	[
		"google-chrome-stable",
		"google-chrome",
		"chromium",
		"chromium-browser",
		"brave-browser",
		"/usr/bin/google-chrome-stable",
		"/usr/bin/chromium",
		"/usr/bin/chromium-browser",
		"/snap/bin/chromium",
	]
	.into_iter()
	.map(str::to_string)
	.collect()
}

fn windows_candidates() -> Vec<String> {
	let mut roots = Vec::new();
	for key in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
		if let Ok(value) = std::env::var(key) {
			roots.push(PathBuf::from(value));
		}
	}
	if roots.is_empty() {
		roots.push(PathBuf::from(r"C:\Program Files"));
		roots.push(PathBuf::from(r"C:\Program Files (x86)"));
	}

	let suffixes: &[&[&str]] = &[
		&["Google", "Chrome", "Application", "chrome.exe"],
		&["Microsoft", "Edge", "Application", "msedge.exe"],
		&["Chromium", "Application", "chrome.exe"],
	];

	let mut candidates = Vec::new();
	for root in roots {
		for suffix in suffixes {
			let path = suffix.iter().fold(root.clone(), |path, part| path.join(part));
			candidates.push(path.to_string_lossy().to_string());
		}
	}
	candidates.extend(["chrome.exe", "msedge.exe"].map(str::to_string));
	candidates
}
