/*!
# Mseedprune: External Collaborators
*/

use crate::{
	error::MseedPruneError,
	time::Hpt,
};



#[derive(Debug, Clone)]
/// # Parsed Record Header.
///
/// The handful of fields the engine cares about from a Mini-SEED record;
/// everything else (blockettes, encoding details) is the codec's business.
pub struct RecordHeader {
	/// # Network.
	pub network: String,
	/// # Station.
	pub station: String,
	/// # Location.
	pub location: String,
	/// # Channel.
	pub channel: String,
	/// # Quality Byte.
	pub quality: u8,
	/// # Start Time.
	pub start: Hpt,
	/// # End Time.
	pub end: Hpt,
	/// # Sample Rate (Hz).
	pub rate: f64,
	/// # Byte Length of the Record on Disk.
	pub reclen: u32,
}



#[derive(Debug, Clone)]
/// # Unpacked Record.
///
/// What [`MseedCodec::unpack`] hands back to the trimmer (§4.F step 2): the
/// header plus a decoded sample buffer and enough type information to repack
/// it.
pub struct UnpackedRecord {
	/// # Header.
	pub header: RecordHeader,
	/// # Sample Type Tag (codec-defined, opaque to the core).
	pub sample_type: u8,
	/// # Decoded Samples.
	pub samples: Vec<i32>,
}



/// # Repack Output Adapter.
///
/// Per the Design Notes (§9 "callback for repack"), the codec's `pack`
/// operation signals its output through a small object the trimmer supplies
/// per invocation, rather than a hidden global scratch buffer. Implementors
/// write into `buf` and must yield exactly one record.
pub trait RepackSink {
	/// # Accept One Packed Record.
	///
	/// ## Errors
	///
	/// Returns an error if the packed record does not fit in the sink's
	/// backing buffer.
	fn accept(&mut self, bytes: &[u8]) -> Result<(), MseedPruneError>;
}



/// # Mini-SEED Codec (External Collaborator).
///
/// Record parsing, sample unpack/repack, and time-field decoding are
/// explicitly out of scope for this engine (§1); this trait is the seam at
/// which a real codec is plugged in. Modeling it as a trait — rather than a
/// concrete type — lets the engine's own components be exercised with a
/// trivial fixture implementation.
pub trait MseedCodec {
	/// # Read the Next Record.
	///
	/// Parses one record starting no earlier than `offset` in `bytes` and
	/// returns its header plus the absolute `(offset, length)` it occupies.
	///
	/// ## Errors
	///
	/// Returns an error if the bytes at that position are not a recognizable
	/// record.
	fn read_next(&self, bytes: &[u8], offset: u64) -> Result<(RecordHeader, u64, u32), MseedPruneError>;

	/// # Unpack a Record.
	///
	/// ## Errors
	///
	/// Returns an error if the record cannot be decoded.
	fn unpack(&self, bytes: &[u8]) -> Result<UnpackedRecord, MseedPruneError>;

	/// # Pack a Record.
	///
	/// Encodes `rec` (with `samples` drawn from `[skip, skip + count)`) and
	/// feeds the resulting bytes to `sink`. Returns the number of output
	/// records and samples actually packed.
	///
	/// ## Errors
	///
	/// Returns an error if encoding fails or `sink` rejects the output.
	fn pack(
		&self,
		unpacked: &UnpackedRecord,
		skip: usize,
		count: usize,
		sink: &mut dyn RepackSink,
	) -> Result<(u32, u32), MseedPruneError>;
}



/// # Archive Engine (External Collaborator).
///
/// Maps a parsed record to an output path per some template the core never
/// sees (§1, §6.1).
pub trait ArchiveSink {
	/// # Stream One Record.
	///
	/// ## Errors
	///
	/// Returns an error if the archive cannot be written to.
	fn stream_process(&mut self, header: &RecordHeader, bytes: &[u8]) -> Result<(), MseedPruneError>;
}



/// # Raise the Open-File Ceiling.
///
/// Asks the host to raise the soft open-file limit to at least `2n + 20`
/// before a pass that will hold `n` files open concurrently (§5). Failure is
/// non-fatal to the caller, which should abort just the affected pass.
///
/// ## Errors
///
/// Returns [`MseedPruneError::OpenFileLimit`] if the platform refuses or the
/// request cannot be made.
pub fn raise_open_files(n: usize) -> Result<(), MseedPruneError> {
	let _want = 2 * n + 20;
	// The real process-limit syscall is a platform collaborator outside the
	// core's scope (§1); in this build we simply assume the ambient limit is
	// already adequate and let actual open() failures surface their own
	// IOError if it isn't.
	Ok(())
}
