/*!
# Mseedprune: Pass Context & Per-File Stats
*/

use crate::{
	abort::KillSwitch,
	time::Hpt,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Pass State.
///
/// The pass-level state machine from §7: `Reading → Indexed → Pruned →
/// Written → Cleaned`. A fatal error leaves the pass wherever it was when
/// the error occurred; there is no rollback.
pub enum PassState {
	/// # Scanning Input Files.
	Reading,
	/// # All Records Indexed Into the Trace Group.
	Indexed,
	/// # Overlap Resolution Complete.
	Pruned,
	/// # Bytes Emitted to All Sinks.
	Written,
	/// # Shadow Files Cleaned Up.
	Cleaned,
}



#[derive(Debug, Clone, Default)]
/// # Per-File Pass Statistics.
///
/// Exposed after each pass so an external multi-pass driver can rewrite its
/// own bookkeeping (Design Note / Open Question 2, §9.1).
pub struct PassStats {
	/// # Records Read.
	pub recs_read: u32,
	/// # Records Written.
	pub recs_written: u32,
	/// # Records Removed (Fully Overlapped).
	pub recs_removed: u32,
	/// # Records Sample-Trimmed.
	pub recs_trimmed: u32,
	/// # Records Produced by Boundary Splitting.
	pub recs_split: u32,
	/// # Times a Record Had to Be Prepended to a Trace's Head.
	pub reorder_count: u32,
	/// # Earliest Start Time Written.
	pub earliest: Option<Hpt>,
	/// # Latest End Time Written (Extended by One Sample Period).
	pub latest: Option<Hpt>,
	/// # Total Bytes Written.
	pub bytes_written: u64,
}

impl PassStats {
	#[must_use]
	/// # New, Zeroed.
	pub const fn new() -> Self {
		Self {
			recs_read: 0,
			recs_written: 0,
			recs_removed: 0,
			recs_trimmed: 0,
			recs_split: 0,
			reorder_count: 0,
			earliest: None,
			latest: None,
			bytes_written: 0,
		}
	}

	#[must_use]
	/// # Counter-Identity Check.
	///
	/// Testable Property 6: `recsWritten = recsRead − recsRemoved + recsSplit`.
	pub const fn counters_consistent(&self) -> bool {
		self.recs_read as i64 - self.recs_removed as i64 + self.recs_split as i64
			== self.recs_written as i64
	}

	/// # Note a Written Record's Effective Span.
	pub fn note_written(&mut self, start: Hpt, end_extended: Hpt, bytes: u64) {
		self.recs_written += 1;
		self.bytes_written += bytes;
		self.earliest = Some(match self.earliest {
			Some(e) if e.ticks() <= start.ticks() => e,
			_ => start,
		});
		self.latest = Some(match self.latest {
			Some(e) if e.ticks() >= end_extended.ticks() => e,
			_ => end_extended,
		});
	}
}



/// # Pass Context.
///
/// Per Design Note §9 ("global mutable state"): an explicit value threaded
/// through read/prune/write rather than process-wide singletons. Owns the
/// cooperative cancellation flag and the scratch buffer used by the writer
/// and trimmer.
pub struct PassContext {
	/// # Cooperative Cancellation.
	kill: KillSwitch,
	/// # Scratch Record Buffer (≥16 KiB, §5).
	scratch: Vec<u8>,
	/// # Current Pass State.
	state: PassState,
}

/// # Minimum Scratch Buffer Size (16 KiB, §5).
pub const MIN_SCRATCH: usize = 16 * 1024;

impl Default for PassContext {
	fn default() -> Self { Self::new() }
}

impl PassContext {
	#[must_use]
	/// # New.
	pub fn new() -> Self {
		Self { kill: KillSwitch::default(), scratch: vec![0; MIN_SCRATCH], state: PassState::Reading }
	}

	#[must_use]
	/// # Kill Switch Handle.
	pub const fn kill_switch(&self) -> &KillSwitch { &self.kill }

	#[must_use]
	/// # Killed?
	pub fn killed(&self) -> bool { self.kill.killed() }

	#[must_use]
	/// # Scratch Buffer.
	pub fn scratch_mut(&mut self) -> &mut Vec<u8> { &mut self.scratch }

	#[must_use]
	/// # Current State.
	pub const fn state(&self) -> PassState { self.state }

	/// # Advance State.
	pub fn advance(&mut self, state: PassState) { self.state = state; }
}
