//! Lightweight terminal progress bar without external dependencies.
//!
//! Shows message, bar, pos/len, percentage and speed (items/sec), redrawn in
//! place on stderr. Handles are cloneable and thread-safe.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Instant;

const BAR_WIDTH: usize = 20;

struct Inner {
	message: String,
	len: u64,
	pos: u64,
	start: Instant,
	finished: bool,
}

impl Inner {
	fn redraw(&self) {
		let len = self.len.max(1); // avoid div by zero
		let pos = self.pos.min(len);
		let elapsed = self.start.elapsed().as_secs_f64();
		let per_sec = if elapsed > 0.0 { pos as f64 / elapsed } else { 0.0 };
		let percent = (pos as f64 * 100.0 / len as f64).floor() as u64;
		let filled = (pos as usize * BAR_WIDTH) / len as usize;

		let mut line = String::new();
		let _ = write!(
			&mut line,
			"{}▕{}{}▏{}/{} ({:>3}%) {:.1}/s",
			self.message,
			"█".repeat(filled),
			" ".repeat(BAR_WIDTH - filled),
			pos,
			len,
			percent,
			per_sec
		);

		let mut stderr = io::stderr();
		let _ = write!(stderr, "\r\x1b[2K{line}");
		let _ = stderr.flush();
	}
}

/// A terminal progress bar handle.
#[derive(Clone)]
pub struct ProgressBar {
	inner: Arc<Mutex<Inner>>,
}

impl ProgressBar {
	/// Initialize the bar with a message and maximum value.
	pub fn new(message: &str, len: u64) -> ProgressBar {
		let progress = ProgressBar {
			inner: Arc::new(Mutex::new(Inner {
				message: message.to_string(),
				len,
				pos: 0,
				start: Instant::now(),
				finished: false,
			})),
		};
		progress.inner.lock().unwrap().redraw();
		progress
	}

	pub fn set_position(&self, pos: u64) {
		let mut inner = self.inner.lock().unwrap();
		if inner.finished {
			return;
		}
		inner.pos = pos.min(inner.len);
		inner.redraw();
	}

	pub fn inc(&self, delta: u64) {
		let mut inner = self.inner.lock().unwrap();
		if inner.finished {
			return;
		}
		inner.pos = (inner.pos + delta).min(inner.len);
		inner.redraw();
	}

	/// Complete the bar and move to the next line.
	pub fn finish(&self) {
		let mut inner = self.inner.lock().unwrap();
		if inner.finished {
			return;
		}
		inner.finished = true;
		inner.pos = inner.len;
		inner.redraw();
		let _ = writeln!(io::stderr());
	}
}

impl Drop for Inner {
	fn drop(&mut self) {
		if !self.finished {
			let _ = writeln!(io::stderr());
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn positions_are_clamped_to_len() {
		let progress = ProgressBar::new("test", 100);
		progress.set_position(50);
		progress.inc(10);
		progress.inc(1000);
		assert_eq!(progress.inner.lock().unwrap().pos, 100);
		progress.finish();
	}

	#[test]
	fn finish_is_idempotent_and_freezes_position() {
		let progress = ProgressBar::new("test", 10);
		progress.finish();
		progress.finish();
		progress.inc(5);
		let inner = progress.inner.lock().unwrap();
		assert!(inner.finished);
		assert_eq!(inner.pos, 10);
	}

	#[test]
	fn zero_length_bar_does_not_panic() {
		let progress = ProgressBar::new("empty", 0);
		progress.inc(1);
		progress.finish();
	}
}
