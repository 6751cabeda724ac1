/*!
# Mseedprune: Trace & Trace Group
*/

use crate::{
	channel::ChannelId,
	record::{
		FileHandle,
		RecordDescriptor,
		RecordHandle,
	},
	time::{
		within_time_tolerance,
		Hpt,
		Quality,
	},
};
use std::cmp::Ordering;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # Trace Handle.
///
/// An index into a [`TraceGroup`]'s trace list.
pub struct TraceHandle(usize);

impl TraceHandle {
	#[must_use]
	/// # Raw Index.
	pub const fn index(self) -> usize { self.0 }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Insertion Classification ("Whence").
///
/// Tells the reader (§4.D) where a just-inserted record landed relative to
/// its trace's prior envelope.
pub enum Whence {
	/// # Record Extends the Tail.
	Tail,
	/// # Record Extends the Head.
	Head,
	/// # Record Started a Brand-New Trace.
	New,
	/// # Record Is Internal/Out-of-Order (an error condition).
	Internal,
}



#[derive(Debug, Clone)]
/// # Trace.
///
/// A channel's aggregated, contiguous-or-near-contiguous coverage: identity,
/// effective sample rate, envelope, and the record-map backing it.
pub struct Trace {
	/// # Channel Identity.
	pub id: ChannelId,
	/// # Effective Sample Rate.
	pub rate: f64,
	/// # Representative Quality.
	///
	/// Only meaningful (and only enforced) when `bestQuality` is enabled, in
	/// which case every record folded into this trace shares this quality.
	pub quality: Quality,
	/// # Envelope Start.
	pub start: Hpt,
	/// # Envelope End.
	pub end: Hpt,
	/// # Record-Map.
	pub map: crate::record::RecordMap,
}

impl Trace {
	#[must_use]
	/// # Total Span (Ticks).
	pub fn span(&self) -> u64 {
		if self.start.is_unset() || self.end.is_unset() { 0 }
		else { self.end.abs_diff(self.start) }
	}

	#[must_use]
	/// # Overlaps Another Trace?
	///
	/// `mst.end > imst.start && mst.start < imst.end`, per §4.E step 1.
	pub fn overlaps(&self, other: &Self) -> bool {
		self.end.ticks() > other.start.ticks() && self.start.ticks() < other.end.ticks()
	}
}



#[must_use]
/// # Sample-Rate Tolerance Check.
///
/// Two rates are considered the same series when their difference is within
/// `tol` if given, otherwise within `0.0001 ×` the higher rate OR `0.5%` of
/// it, whichever is looser (the specification leaves the exact codec
/// convention unstated beyond this; see `DESIGN.md`).
pub(crate) fn rates_match(a: f64, b: f64, tol: Option<f64>) -> bool {
	let hi = a.max(b);
	let diff = (a - b).abs();
	match tol {
		Some(t) => diff <= t,
		None => {
			let abs_tol = 0.0001 * hi;
			let pct_tol = 0.005 * hi;
			diff <= abs_tol.max(pct_tol)
		},
	}
}



#[derive(Debug, Clone, Default)]
/// # Trace Group.
///
/// An unordered collection of [`Trace`]s; callers needing the group's
/// canonical iteration order (§4.C) should use [`TraceGroup::sorted_handles`].
pub struct TraceGroup {
	/// # Traces.
	traces: Vec<Trace>,
}

impl TraceGroup {
	#[must_use]
	/// # New, Empty.
	pub const fn new() -> Self { Self { traces: Vec::new() } }

	#[must_use]
	/// # Number of Traces.
	pub fn len(&self) -> usize { self.traces.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.traces.is_empty() }

	#[must_use]
	/// # Get a Trace.
	pub fn get(&self, h: TraceHandle) -> &Trace { &self.traces[h.0] }

	#[must_use]
	/// # Get a Trace, Mutably.
	pub fn get_mut(&mut self, h: TraceHandle) -> &mut Trace { &mut self.traces[h.0] }

	#[must_use]
	/// # All Handles, Unsorted.
	pub fn handles(&self) -> Vec<TraceHandle> { (0..self.traces.len()).map(TraceHandle).collect() }

	#[must_use]
	/// # Handles in Canonical Group Order.
	///
	/// Channel identity ascending, sample rate ascending, start-time
	/// ascending, end-time **descending** (§4.C) — longer traces sort first
	/// when they share a start.
	pub fn sorted_handles(&self) -> Vec<TraceHandle> {
		let mut out = self.handles();
		out.sort_by(|&a, &b| {
			let (ta, tb) = (&self.traces[a.0], &self.traces[b.0]);
			ta.id.cmp(&tb.id)
				.then_with(|| ta.rate.partial_cmp(&tb.rate).unwrap_or(Ordering::Equal))
				.then_with(|| ta.start.cmp(&tb.start))
				.then_with(|| tb.end.cmp(&ta.end))
		});
		out
	}

	/// # Insert a Record.
	///
	/// Implements §4.C: find a trace with matching identity and compatible
	/// rate whose envelope is within `time_tol` of the record's range,
	/// refusing the merge on a quality mismatch when `best_quality` is set;
	/// otherwise start a new trace. Returns the owning handle and the
	/// [`Whence`] classification the reader uses to decide head/tail
	/// attachment.
	#[must_use]
	pub fn insert_record(
		&mut self,
		id: &ChannelId,
		rate: f64,
		quality: Quality,
		start: Hpt,
		end: Hpt,
		time_tol: Option<i64>,
		samp_rate_tol: Option<f64>,
		best_quality: bool,
	) -> (TraceHandle, Whence) {
		let found = self.traces.iter().position(|t| {
			&t.id == id
				&& rates_match(t.rate, rate, samp_rate_tol)
				&& (!best_quality || t.quality == quality)
				&& (
					within_time_tolerance(t.start, start, rate, time_tol)
					|| within_time_tolerance(t.start, end, rate, time_tol)
					|| within_time_tolerance(t.end, start, rate, time_tol)
					|| within_time_tolerance(t.end, end, rate, time_tol)
				)
		});

		if let Some(idx) = found {
			let whence = {
				let t = &self.traces[idx];
				classify(t.start, t.end, start, end)
			};
			let t = &mut self.traces[idx];
			if start.ticks() < t.start.ticks() || t.start.is_unset() { t.start = start; }
			if end.ticks() > t.end.ticks() || t.end.is_unset() { t.end = end; }
			(TraceHandle(idx), whence)
		}
		else {
			self.traces.push(Trace {
				id: id.clone(),
				rate,
				quality,
				start,
				end,
				map: crate::record::RecordMap::new(),
			});
			(TraceHandle(self.traces.len() - 1), Whence::New)
		}
	}

	/// # Attach a Descriptor Per `Whence`.
	///
	/// Returns the new record's handle, or `None` if `whence` was
	/// [`Whence::Internal`] (an error condition the reader should log and
	/// skip, never attaching the record).
	pub fn attach(&mut self, th: TraceHandle, whence: Whence, rec: RecordDescriptor) -> Option<RecordHandle> {
		let t = &mut self.traces[th.0];
		match whence {
			Whence::Tail | Whence::New => Some(t.map.append_tail(rec)),
			Whence::Head => Some(t.map.prepend_head(rec)),
			Whence::Internal => None,
		}
	}

	#[must_use]
	/// # File Handle Passthrough.
	///
	/// Convenience re-export so callers building descriptors don't need a
	/// separate import path.
	pub const fn file_handle(idx: usize) -> FileHandle { FileHandle::new(idx) }
}



/// # Classify Head/Tail/Internal.
///
/// Per §4.C: tail if the record extends (or matches) the trace's prior end,
/// head if it extends (or matches) the trace's prior start, nearest-endpoint
/// for zero-span records, otherwise internal (strictly contained within the
/// existing envelope, out-of-order, an error).
fn classify(prior_start: Hpt, prior_end: Hpt, start: Hpt, end: Hpt) -> Whence {
	let is_tail = end.ticks() >= prior_end.ticks();
	let is_head = start.ticks() <= prior_start.ticks();

	if start == end {
		// Zero-span: pick whichever endpoint is closer.
		if prior_start.is_unset() || prior_end.is_unset() { return Whence::Tail; }
		let d_head = start.abs_diff(prior_start);
		let d_tail = end.abs_diff(prior_end);
		return if d_head <= d_tail { Whence::Head } else { Whence::Tail };
	}

	if is_tail && !is_head { Whence::Tail }
	else if is_head && !is_tail { Whence::Head }
	else if is_tail { Whence::Tail }
	else { Whence::Internal }
}
