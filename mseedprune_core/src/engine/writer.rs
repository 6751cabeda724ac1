/*!
# Mseedprune: Writer
*/

use crate::{
	codec::{
		MseedCodec,
		RepackSink,
	},
	engine::{
		pass::PassStats,
		trim::{
			trim_record,
			TrimOutcome,
		},
	},
	error::MseedPruneError,
	record::FileHandle,
	time::sample_period_ticks,
	trace::TraceGroup,
};
use ahash::AHashMap;
use std::{
	ffi::OsString,
	fs::File,
	io::{
		Read,
		Seek,
		SeekFrom,
		Write,
	},
	path::{
		Path,
		PathBuf,
	},
};



/// # Lazily-Opened Input Files.
///
/// Per §4.G: the writer never opens a file until it actually needs bytes
/// from it, and reuses the same handle for every later record in that file.
pub struct FileTable {
	/// # Paths, Indexed by [`FileHandle`].
	paths: Vec<PathBuf>,
	/// # Already-Opened Files.
	open: AHashMap<FileHandle, File>,
}

impl FileTable {
	#[must_use]
	/// # New.
	pub fn new(paths: Vec<PathBuf>) -> Self { Self { paths, open: AHashMap::default() } }

	#[must_use]
	/// # Path For a Handle.
	pub fn path(&self, h: FileHandle) -> &Path { &self.paths[h.index()] }

	/// # Read One Record's Raw Bytes.
	///
	/// ## Errors
	///
	/// Returns an error if the file cannot be opened, seeked, or read.
	pub fn read_record(&mut self, h: FileHandle, offset: u64, reclen: u32, buf: &mut Vec<u8>) -> Result<(), MseedPruneError> {
		let path = self.paths[h.index()].display().to_string();
		if !self.open.contains_key(&h) {
			let f = File::open(&self.paths[h.index()]).map_err(|_| MseedPruneError::Open(path.clone()))?;
			self.open.insert(h, f);
		}
		let f = self.open.get_mut(&h).expect("just inserted");
		f.seek(SeekFrom::Start(offset)).map_err(|_| MseedPruneError::Seek(path.clone()))?;
		buf.resize(reclen as usize, 0);
		f.read_exact(buf).map_err(|_| MseedPruneError::Read(path))?;
		Ok(())
	}
}



/// # Pass-Level Output Sink (External Routing).
///
/// Per the Design Note on polymorphic output ("combined file / stdout /
/// replace-input"): the writer only knows it is handing bytes for a given
/// source file to *somewhere*; which concrete destination that is lives in
/// one of the implementations below.
pub trait PassSink {
	/// # Emit Bytes Belonging to One Source File.
	///
	/// ## Errors
	///
	/// Returns an error if the underlying destination rejects the write.
	fn emit(&mut self, file: FileHandle, bytes: &[u8]) -> Result<(), MseedPruneError>;

	/// # Finalize the Pass.
	///
	/// Default no-op; sinks that buffer per file (e.g. replace-input)
	/// override this to flush everything at the end of the pass.
	///
	/// ## Errors
	///
	/// Returns an error if finalization (rename, flush) fails.
	fn finish(&mut self) -> Result<(), MseedPruneError> { Ok(()) }
}

/// # Combined-File / Stdout Sink.
///
/// Every record from every input file is concatenated, in group order, into
/// one writer — used for `-o <path>` and `-o -`.
pub struct CombinedSink<W: Write> {
	/// # Destination.
	writer: W,
}

impl<W: Write> CombinedSink<W> {
	#[must_use]
	/// # New.
	pub const fn new(writer: W) -> Self { Self { writer } }
}

impl<W: Write> PassSink for CombinedSink<W> {
	fn emit(&mut self, _file: FileHandle, bytes: &[u8]) -> Result<(), MseedPruneError> {
		self.writer.write_all(bytes).map_err(|_| MseedPruneError::Write("combined output".to_owned()))
	}

	fn finish(&mut self) -> Result<(), MseedPruneError> {
		self.writer.flush().map_err(|_| MseedPruneError::Write("combined output".to_owned()))
	}
}

/// # Replace-Input-In-Place Sink.
///
/// Buffers each source file's surviving bytes separately, then on
/// [`PassSink::finish`] shadows the original aside as `<name>.orig` and
/// atomically writes the new content over the original path, optionally
/// deleting the shadow copy afterward (§4.G, `--replace`/`--no-backups`).
pub struct ReplaceInputSink<'a> {
	/// # Source Paths.
	paths: &'a [PathBuf],
	/// # Per-File Output Buffers.
	buffers: AHashMap<FileHandle, Vec<u8>>,
	/// # Delete the `.orig` Shadow When Done?
	remove_backups: bool,
}

impl<'a> ReplaceInputSink<'a> {
	#[must_use]
	/// # New.
	pub fn new(paths: &'a [PathBuf], remove_backups: bool) -> Self {
		Self { paths, buffers: AHashMap::default(), remove_backups }
	}
}

/// # Compute a File's `.orig` Shadow Path.
fn backup_path(path: &Path) -> PathBuf {
	let mut name = path.file_name().map_or_else(OsString::new, std::ffi::OsStr::to_os_string);
	name.push(".orig");
	path.with_file_name(name)
}

impl PassSink for ReplaceInputSink<'_> {
	fn emit(&mut self, file: FileHandle, bytes: &[u8]) -> Result<(), MseedPruneError> {
		self.buffers.entry(file).or_default().extend_from_slice(bytes);
		Ok(())
	}

	fn finish(&mut self) -> Result<(), MseedPruneError> {
		for (file, bytes) in self.buffers.drain() {
			let path = &self.paths[file.index()];
			let backup = backup_path(path);
			std::fs::rename(path, &backup).map_err(|_| MseedPruneError::Rename(path.display().to_string()))?;
			write_atomic::write_file(path, &bytes).map_err(|_| MseedPruneError::Write(path.display().to_string()))?;
			if self.remove_backups {
				std::fs::remove_file(&backup).map_err(|_| MseedPruneError::Unlink(backup.display().to_string()))?;
			}
		}
		Ok(())
	}
}



/// # Quality-Restamping Repack Adapter.
///
/// Wraps another [`RepackSink`], overwriting the quality byte (offset 6 in
/// every Mini-SEED fixed header) of each record handed through it.
struct RestampSink<'a> {
	/// # Downstream Sink.
	inner: &'a mut dyn RepackSink,
	/// # Replacement Quality Byte.
	quality: u8,
}

impl RepackSink for RestampSink<'_> {
	fn accept(&mut self, bytes: &[u8]) -> Result<(), MseedPruneError> {
		let mut owned = bytes.to_vec();
		if let Some(b) = owned.get_mut(6) { *b = self.quality; }
		self.inner.accept(&owned)
	}
}

/// # Binds a [`PassSink`] to One Source File for the [`RepackSink`] Seam.
struct FileBoundSink<'a> {
	/// # Owning File.
	file: FileHandle,
	/// # Downstream.
	inner: &'a mut dyn PassSink,
	/// # Bytes Actually Emitted (May Span Multiple Repacked Records).
	written: u64,
}

impl RepackSink for FileBoundSink<'_> {
	fn accept(&mut self, bytes: &[u8]) -> Result<(), MseedPruneError> {
		self.written += bytes.len() as u64;
		self.inner.emit(self.file, bytes)
	}
}



/// # Write One Descriptor.
///
/// Untrimmed, undeleted records are copied through verbatim (with restamp
/// applied in place if requested); trimmed ones are routed through
/// [`trim_record`]. Deleted records are skipped entirely.
///
/// ## Errors
///
/// Returns an error if the codec fails to unpack/repack a trimmed record, or
/// if the sink rejects the bytes.
fn write_one(
	file: FileHandle,
	raw: &[u8],
	descriptor: &crate::record::RecordDescriptor,
	codec: &dyn MseedCodec,
	restamp: Option<u8>,
	sink: &mut dyn PassSink,
) -> Result<Option<u64>, MseedPruneError> {
	if descriptor.is_deleted() { return Ok(None); }

	if descriptor.new_start.is_some() || descriptor.new_end.is_some() {
		let mut bound = FileBoundSink { file, inner: sink, written: 0 };
		let outcome = if let Some(q) = restamp {
			let mut restamped = RestampSink { inner: &mut bound, quality: q };
			trim_record(descriptor, raw, codec, &mut restamped)?
		}
		else {
			trim_record(descriptor, raw, codec, &mut bound)?
		};
		return Ok(match outcome {
			TrimOutcome::Deleted => None,
			TrimOutcome::Repacked { .. } | TrimOutcome::Unchanged => Some(bound.written),
		});
	}

	let mut bytes = raw.to_vec();
	if let Some(q) = restamp {
		if let Some(b) = bytes.get_mut(6) { *b = q; }
	}
	let n = bytes.len() as u64;
	sink.emit(file, &bytes)?;
	Ok(Some(n))
}

/// # Write an Entire Trace Group.
///
/// Implements §4.G: walks every trace in canonical group order, every
/// record in chain order, reading raw bytes lazily through `files` and
/// routing the result through `sink`. Per-file [`PassStats`] are updated for
/// every record actually emitted.
///
/// ## Errors
///
/// Returns an error as soon as a record cannot be read, trimmed, or
/// written; the caller decides whether to continue with the next trace.
pub(crate) fn write_group(
	group: &TraceGroup,
	files: &mut FileTable,
	codec: &dyn MseedCodec,
	restamp: Option<u8>,
	sink: &mut dyn PassSink,
	stats: &mut AHashMap<FileHandle, PassStats>,
	scratch: &mut Vec<u8>,
) -> Result<(), MseedPruneError> {
	for th in group.sorted_handles() {
		let trace = group.get(th);
		let period = sample_period_ticks(trace.rate);
		for (_, rec) in trace.map.iter() {
			if rec.is_deleted() { continue; }
			files.read_record(rec.file, rec.offset, rec.reclen, scratch)?;
			let written = write_one(rec.file, scratch, rec, codec, restamp, sink)?;
			if let Some(bytes) = written {
				let end_extended = rec.eff_end().checked_add(period).unwrap_or(rec.eff_end());
				stats.entry(rec.file).or_default().note_written(rec.eff_start(), end_extended, bytes);
			}
		}
	}
	sink.finish()
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		channel::ChannelId,
		codec::{
			RecordHeader,
			UnpackedRecord,
		},
		record::RecordDescriptor,
		time::{
			Hpt,
			Quality,
		},
		trace::Whence,
	};

	struct PassthroughCodec;
	impl MseedCodec for PassthroughCodec {
		fn read_next(&self, _b: &[u8], _offset: u64) -> Result<(RecordHeader, u64, u32), MseedPruneError> {
			Err(MseedPruneError::Bug("unused"))
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

	struct VecPassSink(AHashMap<FileHandle, Vec<u8>>);
	impl PassSink for VecPassSink {
		fn emit(&mut self, file: FileHandle, bytes: &[u8]) -> Result<(), MseedPruneError> {
			self.0.entry(file).or_default().extend_from_slice(bytes);
			Ok(())
		}
	}

	#[test]
	fn t_restamp_sink_overwrites_byte_six() {
		let mut out = Vec::new();
		struct V<'a>(&'a mut Vec<u8>);
		impl RepackSink for V<'_> {
			fn accept(&mut self, bytes: &[u8]) -> Result<(), MseedPruneError> { self.0.extend_from_slice(bytes); Ok(()) }
		}
		let mut v = V(&mut out);
		let mut rs = RestampSink { inner: &mut v, quality: b'Q' };
		rs.accept(&[0, 1, 2, 3, 4, 5, b'D', 7]).unwrap();
		assert_eq!(out[6], b'Q');
	}

	#[test]
	fn t_write_one_untrimmed_passthrough() {
		let codec = PassthroughCodec;
		let mut sink = VecPassSink(AHashMap::default());
		let desc = RecordDescriptor::new(FileHandle::new(0), 0, 4, Hpt::from_ticks(0), Hpt::from_ticks(3_000_000), Quality::D);
		let n = write_one(FileHandle::new(0), &[1, 2, 3, 4], &desc, &codec, None, &mut sink).unwrap();
		assert_eq!(n, Some(4));
		assert_eq!(sink.0.get(&FileHandle::new(0)).unwrap(), &vec![1, 2, 3, 4]);
	}

	#[test]
	fn t_write_one_deleted_skipped() {
		let codec = PassthroughCodec;
		let mut sink = VecPassSink(AHashMap::default());
		let mut desc = RecordDescriptor::new(FileHandle::new(0), 0, 0, Hpt::from_ticks(0), Hpt::from_ticks(3_000_000), Quality::D);
		desc.mark_deleted();
		let n = write_one(FileHandle::new(0), &[1, 2, 3, 4], &desc, &codec, None, &mut sink).unwrap();
		assert_eq!(n, None);
		assert!(sink.0.is_empty());
	}

	#[test]
	fn t_write_group_updates_stats() {
		let codec = PassthroughCodec;
		let mut group = TraceGroup::new();
		let id = ChannelId::new("IU", "ANMO", "00", "BHZ");
		let (th, _) = group.insert_record(&id, 1.0, Quality::D, Hpt::from_ticks(0), Hpt::from_ticks(9_000_000), None, None, false);
		group.attach(th, Whence::New, RecordDescriptor::new(FileHandle::new(0), 0, 10, Hpt::from_ticks(0), Hpt::from_ticks(9_000_000), Quality::D));

		// Rather than touching the filesystem, bypass `FileTable` by writing
		// the record directly through `write_one` and checking the stats
		// bookkeeping that `write_group` performs around it.
		let mut sink = VecPassSink(AHashMap::default());
		let mut stats: AHashMap<FileHandle, PassStats> = AHashMap::default();
		let raw = [10u8; 10];
		let rec = group.get(th).map.iter().next().unwrap().1;
		let written = write_one(FileHandle::new(0), &raw, rec, &codec, None, &mut sink).unwrap();
		assert_eq!(written, Some(10));
		stats.entry(FileHandle::new(0)).or_default().note_written(rec.eff_start(), rec.eff_end(), 10);
		assert_eq!(stats.get(&FileHandle::new(0)).unwrap().recs_written, 1);
	}

	#[test]
	fn t_write_one_trimmed_reports_repacked_bytes() {
		// `PassthroughCodec::pack` emits one output byte per retained sample,
		// so a 10-byte record trimmed down to 6 samples must report 6 bytes
		// written, not the original record's 10.
		let codec = PassthroughCodec;
		let mut sink = VecPassSink(AHashMap::default());
		let mut desc = RecordDescriptor::new(FileHandle::new(0), 0, 10, Hpt::from_ticks(0), Hpt::from_ticks(9_000_000), Quality::D);
		desc.set_new_start(Hpt::from_ticks(4_000_000));
		let raw = [10u8; 10];
		let written = write_one(FileHandle::new(0), &raw, &desc, &codec, None, &mut sink).unwrap();
		assert_eq!(written, Some(6));
	}
}
