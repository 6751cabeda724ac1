/*!
# Mseedprune: Pass Log
*/

use crate::error::MseedPruneError;
use dactyl::NiceElapsed;
use std::{
	fmt,
	io::Write,
	time::Instant,
};



/// # Super Basic Log.
///
/// Holds the log-worthy details from a single pass, printing them out en
/// masse at the end rather than line-by-line, so interleaved work (e.g. a
/// verification step run on another thread) can never scramble the order.
pub struct PruneLog {
	/// # Pass Start Time.
	start: Option<Instant>,
	/// # Miscellaneous Events.
	events: Vec<PruneLogEvent>,
	/// # Per-Descriptor Notes.
	descriptors: Vec<(String, u32, PruneLogNoteKind)>,
}

impl Drop for PruneLog {
	fn drop(&mut self) { self.flush(); }
}

impl PruneLog {
	#[must_use]
	/// # New Instance.
	pub const fn new() -> Self {
		Self { start: None, events: Vec::new(), descriptors: Vec::new() }
	}

	/// # Begin a Pass.
	pub fn begin(&mut self) {
		self.flush();
		self.events.truncate(0);
		self.descriptors.truncate(0);
		self.start = Some(Instant::now());
	}

	/// # Record a Corrupt-Record Event.
	pub fn add_corrupt(&mut self, file: &str, err: &MseedPruneError) {
		self.events.push(PruneLogEvent::Corrupt(file.to_owned(), err.to_string()));
	}

	/// # Record an I/O Error.
	pub fn add_io_error(&mut self, path: &str, err: &MseedPruneError) {
		self.events.push(PruneLogEvent::Io(path.to_owned(), err.to_string()));
	}

	/// # Record a Removed Descriptor.
	pub fn add_removed(&mut self, channel: &str, offset: u32) {
		self.descriptors.push((channel.to_owned(), offset, PruneLogNoteKind::Removed));
	}

	/// # Record a Trimmed Descriptor.
	pub fn add_trimmed(&mut self, channel: &str, offset: u32) {
		self.descriptors.push((channel.to_owned(), offset, PruneLogNoteKind::Trimmed));
	}

	/// # Record a Skipped (Invalid Trim / Misclassified) Descriptor.
	pub fn add_skipped(&mut self, channel: &str, offset: u32) {
		self.descriptors.push((channel.to_owned(), offset, PruneLogNoteKind::Skipped));
	}

	/// # Flush.
	fn flush(&mut self) {
		let Some(start) = self.start.take() else { return; };
		let writer = std::io::stdout();
		let mut handle = writer.lock();
		let _res = writeln!(
			&mut handle,
			r"##
## Pass: {}
## Flagged Records: {}
##",
			NiceElapsed::from(start),
			self.descriptors.len(),
		);

		if ! self.events.is_empty() {
			for event in self.events.drain(..) {
				let _res = writeln!(&mut handle, r"## {event}");
			}
			let _res = writeln!(&mut handle, "##");
		}

		if ! self.descriptors.is_empty() {
			self.descriptors.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
			for (channel, offset, kind) in self.descriptors.drain(..) {
				let _res = writeln!(&mut handle, r"{channel}  {offset:010}  {}", kind.as_str());
			}
		}

		let _res = handle.flush();
	}
}

impl Default for PruneLog {
	fn default() -> Self { Self::new() }
}



/// # Event Kind.
enum PruneLogEvent {
	/// # Corrupt Record.
	Corrupt(String, String),
	/// # I/O Error.
	Io(String, String),
}

impl fmt::Display for PruneLogEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Corrupt(file, msg) => write!(f, "CORRUPT {file}: {msg}"),
			Self::Io(path, msg) => write!(f, "IO {path}: {msg}"),
		}
	}
}



#[derive(Debug, Clone, Copy)]
/// # Per-Descriptor Note Kind.
enum PruneLogNoteKind {
	/// # Fully Overlapped, Deleted.
	Removed,
	/// # Sample-Level Trimmed.
	Trimmed,
	/// # Skipped (Invalid Trim or Misclassified).
	Skipped,
}

impl PruneLogNoteKind {
	/// # As Str.
	const fn as_str(self) -> &'static str {
		match self {
			Self::Removed => "REMOVED",
			Self::Trimmed => "TRIMMED",
			Self::Skipped => "SKIPPED",
		}
	}
}
