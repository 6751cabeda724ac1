/*!
# Mseedprune: Engine
*/

pub mod log;
pub mod opts;
pub mod pass;
pub mod prune;
pub mod reader;
pub mod split;
pub mod trim;
pub mod writer;

use crate::{
	codec::MseedCodec,
	error::MseedPruneError,
	record::FileHandle,
	trace::TraceGroup,
};
use ahash::AHashMap;
use log::PruneLog;
use opts::PruneOptions;
use pass::{
	PassContext,
	PassState,
	PassStats,
};
use reader::{
	read_file,
	RecordSelector,
};
use std::path::PathBuf;
use writer::{
	write_group,
	FileTable,
	PassSink,
};



/// # The Pruning Engine.
///
/// Ties reading, overlap resolution, and writing together for a single pass
/// over a set of input files (§4, §7). Holds no state of its own beyond the
/// codec collaborator; everything else is threaded through explicitly via
/// [`PassContext`] and the returned per-file stats, per the Design Note
/// against global mutable state.
pub struct Engine<'c> {
	/// # Mini-SEED Codec.
	codec: &'c dyn MseedCodec,
}

impl<'c> Engine<'c> {
	#[must_use]
	/// # New.
	pub const fn new(codec: &'c dyn MseedCodec) -> Self { Self { codec } }

	/// # Run One Pass.
	///
	/// Reads every file in `inputs`, resolves overlaps according to `opts`,
	/// and writes the survivors to `sink`. Returns per-file statistics
	/// (Open Question 2, §9.1) keyed by each input's position in `inputs`.
	///
	/// ## Errors
	///
	/// Returns [`MseedPruneError::Noop`] if no records survive indexing, or
	/// propagates the first I/O, corruption, or cancellation error
	/// encountered while reading or writing.
	pub fn run_pass(
		&self,
		inputs: Vec<PathBuf>,
		opts: &PruneOptions,
		selector: Option<&dyn RecordSelector>,
		sink: &mut dyn PassSink,
		log: &mut PruneLog,
		ctx: &mut PassContext,
	) -> Result<AHashMap<FileHandle, PassStats>, MseedPruneError> {
		log.begin();
		ctx.advance(PassState::Reading);

		let mut group = TraceGroup::new();
		let mut stats: AHashMap<FileHandle, PassStats> = AHashMap::default();

		for (idx, path) in inputs.iter().enumerate() {
			if ctx.killed() { return Err(MseedPruneError::Killed); }

			let file = FileHandle::new(idx);
			let bytes = std::fs::read(path)
				.map_err(|_| MseedPruneError::Open(path.display().to_string()))?;

			match read_file(file, &bytes, self.codec, &mut group, opts, selector, log) {
				Ok(rstats) => {
					let entry = stats.entry(file).or_default();
					entry.recs_read = rstats.read;
					entry.recs_split = rstats.split;
					entry.reorder_count = rstats.reorder;
				},
				Err(err) => {
					log.add_io_error(&path.display().to_string(), &err);
					return Err(err);
				},
			}
		}
		ctx.advance(PassState::Indexed);

		if group.is_empty() { return Err(MseedPruneError::Noop); }

		prune::prune_group(&mut group, opts, &mut stats, log);
		ctx.advance(PassState::Pruned);

		if ctx.killed() { return Err(MseedPruneError::Killed); }

		let mut files = FileTable::new(inputs);
		write_group(&group, &mut files, self.codec, opts.restamp_quality(), sink, &mut stats, ctx.scratch_mut())?;
		ctx.advance(PassState::Written);

		Ok(stats)
	}
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
	use writer::CombinedSink;

	struct NullCodec;
	impl MseedCodec for NullCodec {
		fn read_next(&self, bytes: &[u8], offset: u64) -> Result<(RecordHeader, u64, u32), MseedPruneError> {
			if offset as usize >= bytes.len() { return Err(MseedPruneError::CorruptRecord("eof".into())); }
			Ok((
				RecordHeader {
					network: "IU".into(), station: "ANMO".into(), location: "00".into(), channel: "BHZ".into(),
					quality: b'D', start: Hpt::from_ticks(0), end: Hpt::from_ticks(9_000_000), rate: 1.0, reclen: 1,
				},
				offset,
				1,
			))
		}
		fn unpack(&self, bytes: &[u8]) -> Result<UnpackedRecord, MseedPruneError> {
			Ok(UnpackedRecord {
				header: RecordHeader {
					network: "IU".into(), station: "ANMO".into(), location: "00".into(), channel: "BHZ".into(),
					quality: b'D', start: Hpt::from_ticks(0), end: Hpt::from_ticks(9_000_000), rate: 1.0, reclen: bytes.len() as u32,
				},
				sample_type: 0,
				samples: bytes.iter().map(|&b| i32::from(b)).collect(),
			})
		}
		fn pack(&self, u: &UnpackedRecord, skip: usize, count: usize, sink: &mut dyn RepackSink) -> Result<(u32, u32), MseedPruneError> {
			let slice = &u.samples[skip..skip + count];
			let bytes: Vec<u8> = slice.iter().map(|&s| s as u8).collect();
			sink.accept(&bytes)?;
			Ok((1, bytes.len() as u32))
		}
	}

	#[test]
	fn t_empty_input_is_noop() {
		let codec = NullCodec;
		let engine = Engine::new(&codec);
		let mut log = PruneLog::new();
		let mut ctx = PassContext::new();
		let mut out = Vec::new();
		let mut sink = CombinedSink::new(&mut out);
		let opts = PruneOptions::new();
		let err = engine.run_pass(Vec::new(), &opts, None, &mut sink, &mut log, &mut ctx).unwrap_err();
		assert!(matches!(err, MseedPruneError::Noop));
	}
}
