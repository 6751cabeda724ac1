/*!
# Mseedprune: Reader / Indexer
*/

use crate::{
	channel::ChannelId,
	codec::MseedCodec,
	engine::{
		log::PruneLog,
		opts::{
			PruneOptions,
			SplitBoundary,
		},
		split::split_record,
	},
	error::MseedPruneError,
	record::{
		FileHandle,
		RecordDescriptor,
	},
	time::{
		sample_period_ticks,
		Quality,
	},
	trace::{
		TraceGroup,
		Whence,
	},
};



/// # Record Selector (External Collaborator).
///
/// Regex matching is out of scope for the core (§1); callers that want
/// `--match`/`--reject` filtering supply an implementation of this trait
/// built on whatever pattern engine the binary links in.
pub trait RecordSelector {
	/// # Is This Tag Selected?
	///
	/// `tag` is the record's `NET_STA_LOC_CHAN_QUAL` string.
	fn select(&self, tag: &str) -> bool;
}



#[derive(Debug, Clone, Copy, Default)]
/// # Per-File Read Outcome.
pub(crate) struct ReadStats {
	/// # Records Read (Before Filtering).
	pub read: u32,
	/// # Records Rejected by a Filter or Window.
	pub rejected: u32,
	/// # Head-Attachments (Out-of-Order Arrivals).
	pub reorder: u32,
	/// # Fragments Produced by Boundary Splitting.
	pub split: u32,
	/// # Records Dropped for Failing Head/Tail Classification.
	pub misclassified: u32,
}

/// # Scan One File Into a Trace Group.
///
/// Implements §4.D: sequential `read_next` calls over `bytes`, window and
/// selector filtering, insertion into `group`, sample-level window trimming,
/// and boundary splitting. A record whose span crosses `--ts`/`--te` is
/// always given a `new_start`/`new_end` mark when it crosses the boundary,
/// never only when one was already set.
///
/// ## Errors
///
/// Returns an error as soon as the codec reports a record it cannot parse;
/// the caller decides whether to abort the whole file or continue with the
/// next one.
pub(crate) fn read_file(
	file: FileHandle,
	bytes: &[u8],
	codec: &dyn MseedCodec,
	group: &mut TraceGroup,
	opts: &PruneOptions,
	selector: Option<&dyn RecordSelector>,
	log: &mut PruneLog,
) -> Result<ReadStats, MseedPruneError> {
	let mut stats = ReadStats::default();
	let mut offset: u64 = 0;
	let len = bytes.len() as u64;

	while offset < len {
		let (header, rec_offset, reclen) = codec.read_next(bytes, offset)?;
		if reclen == 0 {
			return Err(MseedPruneError::CorruptRecord(format!("zero-length record at offset {offset}")));
		}
		offset = rec_offset + u64::from(reclen);
		stats.read += 1;

		let quality = Quality::from(header.quality);
		let id = ChannelId::new(header.network, header.station, header.location, header.channel);

		if let Some(sel) = selector {
			let tag = id.tag(char::from(header.quality));
			if !sel.select(&tag) { stats.rejected += 1; continue; }
		}

		let (start, end) = (header.start, header.end);
		if let Some(ws) = opts.window_start() {
			if end.ticks() < ws.ticks() { stats.rejected += 1; continue; }
		}
		if let Some(we) = opts.window_end() {
			if start.ticks() > we.ticks() { stats.rejected += 1; continue; }
		}

		let mut new_start = None;
		let mut new_end = None;
		if let Some(ws) = opts.window_start() {
			if start.ticks() < ws.ticks() { new_start = Some(ws); }
		}
		if let Some(we) = opts.window_end() {
			if end.ticks() > we.ticks() { new_end = Some(we); }
		}

		let (th, whence) = group.insert_record(
			&id, header.rate, quality, start, end,
			opts.time_tol(), opts.samp_rate_tol(), opts.best_quality(),
		);

		if whence == Whence::Internal {
			stats.misclassified += 1;
			log.add_io_error(&id.to_string(), &MseedPruneError::Misclassification(id.to_string()));
			continue;
		}
		if whence == Whence::Head { stats.reorder += 1; }

		let mut rec = RecordDescriptor::new(file, rec_offset, reclen, start, end, quality);
		if let Some(ns) = new_start { rec.set_new_start(ns); }
		if let Some(ne) = new_end { rec.set_new_end(ne); }

		let Some(rh) = group.attach(th, whence, rec) else { continue; };

		if !matches!(opts.split_boundary(), SplitBoundary::None) {
			let period = sample_period_ticks(header.rate);
			let n = split_record(&mut group.get_mut(th).map, rh, opts.split_boundary(), period);
			stats.split += n;
		}
	}

	Ok(stats)
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		codec::{
			RecordHeader,
			RepackSink,
			UnpackedRecord,
		},
		time::Hpt,
	};

	/// # Fixture Codec.
	///
	/// Each byte in `bytes` is one "record" whose header is looked up by
	/// index from a preloaded table.
	struct FixtureCodec { headers: Vec<RecordHeader> }

	impl MseedCodec for FixtureCodec {
		fn read_next(&self, _bytes: &[u8], offset: u64) -> Result<(RecordHeader, u64, u32), MseedPruneError> {
			let idx = offset as usize;
			self.headers.get(idx).cloned()
				.map(|h| (h, offset, 1))
				.ok_or_else(|| MseedPruneError::CorruptRecord(format!("no record at {offset}")))
		}

		fn unpack(&self, _bytes: &[u8]) -> Result<UnpackedRecord, MseedPruneError> {
			Err(MseedPruneError::Bug("unused in reader tests"))
		}

		fn pack(&self, _u: &UnpackedRecord, _skip: usize, _count: usize, _sink: &mut dyn RepackSink) -> Result<(u32, u32), MseedPruneError> {
			Err(MseedPruneError::Bug("unused in reader tests"))
		}
	}

	fn hdr(start: i64, end: i64) -> RecordHeader {
		RecordHeader {
			network: "IU".into(), station: "ANMO".into(), location: "00".into(), channel: "BHZ".into(),
			quality: b'D', start: Hpt::from_ticks(start), end: Hpt::from_ticks(end), rate: 1.0, reclen: 1,
		}
	}

	#[test]
	fn t_reads_sequential_records() {
		let codec = FixtureCodec { headers: vec![hdr(0, 9), hdr(10, 19), hdr(20, 29)] };
		let mut group = TraceGroup::new();
		let opts = PruneOptions::new();
		let mut log = PruneLog::new();
		let stats = read_file(FileHandle::new(0), &[0, 0, 0], &codec, &mut group, &opts, None, &mut log).unwrap();
		assert_eq!(stats.read, 3);
		assert_eq!(group.len(), 1, "contiguous records fold into one trace");
		assert_eq!(group.get(group.handles()[0]).map.count(), 3);
	}

	#[test]
	fn t_window_sets_marks_unconditionally() {
		let codec = FixtureCodec { headers: vec![hdr(0, 19)] };
		let mut group = TraceGroup::new();
		let opts = PruneOptions::new().with_window(Some(Hpt::from_ticks(5)), None);
		let mut log = PruneLog::new();
		read_file(FileHandle::new(0), &[0], &codec, &mut group, &opts, None, &mut log).unwrap();
		let th = group.handles()[0];
		let (_, rec) = group.get(th).map.iter().next().unwrap();
		assert_eq!(rec.new_start, Some(Hpt::from_ticks(5)));
	}

	#[test]
	fn t_rejects_outside_window() {
		let codec = FixtureCodec { headers: vec![hdr(0, 9), hdr(100, 109)] };
		let mut group = TraceGroup::new();
		let opts = PruneOptions::new().with_window(Some(Hpt::from_ticks(50)), None);
		let mut log = PruneLog::new();
		let stats = read_file(FileHandle::new(0), &[0, 0], &codec, &mut group, &opts, None, &mut log).unwrap();
		assert_eq!(stats.rejected, 1);
	}

	struct RejectAll;
	impl RecordSelector for RejectAll {
		fn select(&self, _tag: &str) -> bool { false }
	}

	#[test]
	fn t_selector_rejects() {
		let codec = FixtureCodec { headers: vec![hdr(0, 9)] };
		let mut group = TraceGroup::new();
		let opts = PruneOptions::new();
		let sel = RejectAll;
		let mut log = PruneLog::new();
		let stats = read_file(FileHandle::new(0), &[0], &codec, &mut group, &opts, Some(&sel), &mut log).unwrap();
		assert_eq!(stats.rejected, 1);
		assert!(group.is_empty());
	}

	#[test]
	fn t_split_bumps_count() {
		let codec = FixtureCodec { headers: vec![hdr(0, 200 * 1_000_000)] };
		let mut group = TraceGroup::new();
		let opts = PruneOptions::new().with_split_boundary(SplitBoundary::Minute);
		let mut log = PruneLog::new();
		let stats = read_file(FileHandle::new(0), &[0], &codec, &mut group, &opts, None, &mut log).unwrap();
		assert!(stats.split > 0);
	}
}
