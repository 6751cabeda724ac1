/*!
# Mseedprune: Record Descriptor & Record-Map
*/

use crate::time::Hpt;
use crate::time::Quality;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # Record Handle.
///
/// An index into a [`RecordMap`]'s internal arena. Cheap to copy, cheap to
/// compare, and immune to the aliasing headaches of an intrusive pointer
/// chain.
pub struct RecordHandle(usize);

impl RecordHandle {
	#[must_use]
	/// # Raw Index.
	pub const fn index(self) -> usize { self.0 }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # File Handle.
///
/// An opaque reference to one of the pass's input files. The engine never
/// opens or reads bytes itself outside the writer/trimmer; descriptors only
/// carry this handle around so the writer can look the file back up.
pub struct FileHandle(usize);

impl FileHandle {
	#[must_use]
	/// # New.
	pub const fn new(idx: usize) -> Self { Self(idx) }

	#[must_use]
	/// # Raw Index.
	pub const fn index(self) -> usize { self.0 }
}



#[derive(Debug, Clone)]
/// # Record Descriptor.
///
/// Everything the engine needs to know about one physical Mini-SEED record
/// without ever unpacking its samples. Immutable except for the two trim
/// marks and `reclen`, which the pruner/splitter update in place.
pub struct RecordDescriptor {
	/// # Source File.
	pub file: FileHandle,
	/// # Byte Offset Within the File.
	pub offset: u64,
	/// # Byte Length ("reclen"). Zero means logically deleted.
	pub reclen: u32,
	/// # Original Start Time.
	pub start: Hpt,
	/// # Original End Time.
	pub end: Hpt,
	/// # Quality Code.
	pub quality: Quality,
	/// # New Start (Trim Mark).
	pub new_start: Option<Hpt>,
	/// # New End (Trim Mark).
	pub new_end: Option<Hpt>,
}

impl RecordDescriptor {
	#[must_use]
	/// # New.
	pub const fn new(
		file: FileHandle,
		offset: u64,
		reclen: u32,
		start: Hpt,
		end: Hpt,
		quality: Quality,
	) -> Self {
		Self { file, offset, reclen, start, end, quality, new_start: None, new_end: None }
	}

	#[must_use]
	/// # Is Deleted?
	pub const fn is_deleted(&self) -> bool { self.reclen == 0 }

	/// # Mark Deleted.
	pub fn mark_deleted(&mut self) { self.reclen = 0; }

	#[must_use]
	/// # Effective Start.
	///
	/// `new_start` when set, otherwise the original `start`.
	pub fn eff_start(&self) -> Hpt { self.new_start.unwrap_or(self.start) }

	#[must_use]
	/// # Effective End.
	pub fn eff_end(&self) -> Hpt { self.new_end.unwrap_or(self.end) }

	/// # Set New Start.
	///
	/// No-op if `t` is not strictly inside `(start, end)`; callers that need
	/// to know about the rejection should check [`RecordDescriptor::validate_trim`]
	/// themselves.
	pub fn set_new_start(&mut self, t: Hpt) { self.new_start = Some(t); }

	/// # Set New End.
	pub fn set_new_end(&mut self, t: Hpt) { self.new_end = Some(t); }

	/// # Tighten New Start.
	///
	/// Like [`RecordDescriptor::set_new_start`], but never loosens a mark
	/// already in place; a later effective start is always the stricter one.
	pub fn tighten_new_start(&mut self, t: Hpt) {
		self.new_start = Some(self.new_start.map_or(t, |cur| if t.ticks() > cur.ticks() { t } else { cur }));
	}

	/// # Tighten New End.
	///
	/// Like [`RecordDescriptor::set_new_end`], but never loosens a mark
	/// already in place; an earlier effective end is always the stricter one.
	pub fn tighten_new_end(&mut self, t: Hpt) {
		self.new_end = Some(self.new_end.map_or(t, |cur| if t.ticks() < cur.ticks() { t } else { cur }));
	}

	#[must_use]
	/// # Validate Trim Marks.
	///
	/// Enforces invariant 2: a set `new_start`/`new_end` must lie strictly
	/// inside the original span, and if both are set, `new_start < new_end`.
	pub fn validate_trim(&self) -> bool {
		if let Some(ns) = self.new_start {
			if !(self.start < ns && ns < self.end) { return false; }
		}
		if let Some(ne) = self.new_end {
			if !(self.start < ne && ne < self.end) { return false; }
		}
		if let (Some(ns), Some(ne)) = (self.new_start, self.new_end) {
			if !(ns < ne) { return false; }
		}
		true
	}
}



#[derive(Debug, Clone)]
/// # Record Node.
///
/// One slot in a [`RecordMap`]'s arena: the descriptor plus its chain
/// pointers. Nodes are never removed from the arena — "removal" from the
/// chain is expressed purely by marking the descriptor deleted; the node
/// itself stays put so existing handles remain valid.
struct RecordNode {
	/// # The Descriptor.
	rec: RecordDescriptor,
	/// # Previous Node.
	prev: Option<RecordHandle>,
	/// # Next Node.
	next: Option<RecordHandle>,
}



#[derive(Debug, Clone, Default)]
/// # Record-Map.
///
/// A per-trace, doubly-linked chain of record descriptors, backed by an
/// arena (`Vec`) of nodes addressed by [`RecordHandle`] rather than raw
/// pointers. Maintained in ascending start-time order by the reader; the map
/// itself never resorts.
pub struct RecordMap {
	/// # Arena.
	nodes: Vec<RecordNode>,
	/// # First (Head) Handle.
	first: Option<RecordHandle>,
	/// # Last (Tail) Handle.
	last: Option<RecordHandle>,
}

impl RecordMap {
	#[must_use]
	/// # New, Empty.
	pub const fn new() -> Self { Self { nodes: Vec::new(), first: None, last: None } }

	#[must_use]
	/// # Number of Nodes (Including Deleted).
	pub fn count(&self) -> usize { self.nodes.len() }

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

	#[must_use]
	/// # First Handle.
	pub const fn first(&self) -> Option<RecordHandle> { self.first }

	#[must_use]
	/// # Last Handle.
	pub const fn last(&self) -> Option<RecordHandle> { self.last }

	#[must_use]
	/// # Get a Descriptor.
	pub fn get(&self, h: RecordHandle) -> &RecordDescriptor { &self.nodes[h.0].rec }

	#[must_use]
	/// # Get a Descriptor, Mutably.
	pub fn get_mut(&mut self, h: RecordHandle) -> &mut RecordDescriptor { &mut self.nodes[h.0].rec }

	#[must_use]
	/// # Next Handle in Chain Order.
	pub fn next(&self, h: RecordHandle) -> Option<RecordHandle> { self.nodes[h.0].next }

	#[must_use]
	/// # Previous Handle in Chain Order.
	pub fn prev(&self, h: RecordHandle) -> Option<RecordHandle> { self.nodes[h.0].prev }

	/// # Append to Tail.
	///
	/// Returns the handle of the newly-appended node.
	pub fn append_tail(&mut self, rec: RecordDescriptor) -> RecordHandle {
		let idx = RecordHandle(self.nodes.len());
		let prev = self.last;
		self.nodes.push(RecordNode { rec, prev, next: None });
		if let Some(p) = prev { self.nodes[p.0].next = Some(idx); }
		self.last = Some(idx);
		if self.first.is_none() { self.first = Some(idx); }
		idx
	}

	/// # Prepend to Head.
	///
	/// Returns the handle of the newly-prepended node.
	pub fn prepend_head(&mut self, rec: RecordDescriptor) -> RecordHandle {
		let idx = RecordHandle(self.nodes.len());
		let next = self.first;
		self.nodes.push(RecordNode { rec, prev: None, next });
		if let Some(n) = next { self.nodes[n.0].prev = Some(idx); }
		self.first = Some(idx);
		if self.last.is_none() { self.last = Some(idx); }
		idx
	}

	/// # Insert a Sibling After `h`.
	///
	/// Used by the boundary splitter (§4.H) to link a fragment immediately
	/// after the record it was split from, without disturbing the rest of
	/// the chain.
	pub fn insert_after(&mut self, h: RecordHandle, rec: RecordDescriptor) -> RecordHandle {
		let idx = RecordHandle(self.nodes.len());
		let next = self.nodes[h.0].next;
		self.nodes.push(RecordNode { rec, prev: Some(h), next });
		self.nodes[h.0].next = Some(idx);
		if let Some(n) = next { self.nodes[n.0].prev = Some(idx); }
		else { self.last = Some(idx); }
		idx
	}

	/// # Mark Deleted.
	pub fn mark_deleted(&mut self, h: RecordHandle) { self.nodes[h.0].rec.mark_deleted(); }

	/// # Iterate in Chain Order.
	pub fn iter(&self) -> RecordMapIter<'_> { RecordMapIter { map: self, cur: self.first } }
}



#[derive(Debug, Clone)]
/// # Record-Map Iterator.
///
/// Walks a [`RecordMap`] head-to-tail, yielding every node (including
/// deleted ones — callers that care should check [`RecordDescriptor::is_deleted`]).
pub(crate) struct RecordMapIter<'a> {
	/// # The Map Being Walked.
	map: &'a RecordMap,
	/// # Current Position.
	cur: Option<RecordHandle>,
}

impl<'a> Iterator for RecordMapIter<'a> {
	type Item = (RecordHandle, &'a RecordDescriptor);

	fn next(&mut self) -> Option<Self::Item> {
		let h = self.cur?;
		self.cur = self.map.next(h);
		Some((h, self.map.get(h)))
	}
}
