/*!
# Mseedprune: Record Trimmer
*/

use crate::{
	codec::{
		MseedCodec,
		RepackSink,
	},
	error::MseedPruneError,
	record::RecordDescriptor,
	time::sample_period_ticks,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Trim Outcome.
pub(crate) enum TrimOutcome {
	/// # Neither `new_start` Nor `new_end` Was Set.
	Unchanged,
	/// # Re-Encoded With Fewer Samples.
	Repacked {
		/// # Output Records Produced.
		records: u32,
		/// # Samples Retained.
		samples: u32,
	},
	/// # Trim Left Zero Samples; Treat as a Deletion.
	Deleted,
}

/// # Trim One Record.
///
/// Implements §4.F: unpacks `raw` via `codec`, converts the descriptor's
/// `new_start`/`new_end` marks into a sample range, and repacks that range
/// through `sink`. A trim that would leave no samples is reported as
/// [`TrimOutcome::Deleted`] rather than packed as an empty record.
///
/// ## Errors
///
/// Returns an error if the descriptor's trim marks fail
/// [`RecordDescriptor::validate_trim`], if the codec cannot unpack or repack
/// the bytes, or if the unpacked record has no defined sample period.
pub(crate) fn trim_record(
	descriptor: &RecordDescriptor,
	raw: &[u8],
	codec: &dyn MseedCodec,
	sink: &mut dyn RepackSink,
) -> Result<TrimOutcome, MseedPruneError> {
	if descriptor.new_start.is_none() && descriptor.new_end.is_none() {
		return Ok(TrimOutcome::Unchanged);
	}
	if !descriptor.validate_trim() {
		return Err(MseedPruneError::InvalidTrimTimes(format!(
			"offset {} reclen {}",
			descriptor.offset, descriptor.reclen,
		)));
	}

	let unpacked = codec.unpack(raw)?;
	let period = sample_period_ticks(unpacked.header.rate);
	let total = unpacked.samples.len();
	if period <= 0 || total == 0 {
		return Err(MseedPruneError::CorruptRecord(format!(
			"offset {}: no defined sample period", descriptor.offset,
		)));
	}

	let skip = match descriptor.new_start {
		Some(ns) => {
			let delta = ns.ticks() - unpacked.header.start.ticks();
			delta.div_euclid(period).clamp(0, total as i64) as usize
		},
		None => 0,
	};
	let end_idx = match descriptor.new_end {
		Some(ne) => {
			let delta = ne.ticks() - unpacked.header.start.ticks();
			(delta.div_euclid(period) + 1).clamp(0, total as i64) as usize
		},
		None => total,
	};

	if end_idx <= skip { return Ok(TrimOutcome::Deleted); }
	let count = end_idx - skip;

	let (records, samples) = codec.pack(&unpacked, skip, count, sink)?;
	if samples == 0 { Ok(TrimOutcome::Deleted) }
	else { Ok(TrimOutcome::Repacked { records, samples }) }
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		codec::{
			RecordHeader,
			UnpackedRecord,
		},
		record::FileHandle,
		time::{
			Hpt,
			Quality,
			HPTMODULUS,
		},
	};

	/// # Fixture Codec.
	///
	/// Treats `raw` as a literal byte-per-sample buffer so trim math can be
	/// exercised without a real Mini-SEED decoder.
	struct FixtureCodec { rate: f64, start: Hpt }

	impl MseedCodec for FixtureCodec {
		fn read_next(&self, bytes: &[u8], offset: u64) -> Result<(RecordHeader, u64, u32), MseedPruneError> {
			Ok((
				RecordHeader {
					network: "IU".into(), station: "ANMO".into(), location: "00".into(), channel: "BHZ".into(),
					quality: b'D', start: self.start, end: self.start, rate: self.rate, reclen: bytes.len() as u32,
				},
				offset,
				bytes.len() as u32,
			))
		}

		fn unpack(&self, bytes: &[u8]) -> Result<UnpackedRecord, MseedPruneError> {
			let period = sample_period_ticks(self.rate);
			let end = self.start.checked_add(period * (bytes.len() as i64 - 1)).unwrap_or(self.start);
			Ok(UnpackedRecord {
				header: RecordHeader {
					network: "IU".into(), station: "ANMO".into(), location: "00".into(), channel: "BHZ".into(),
					quality: b'D', start: self.start, end, rate: self.rate, reclen: bytes.len() as u32,
				},
				sample_type: 0,
				samples: bytes.iter().map(|&b| i32::from(b)).collect(),
			})
		}

		fn pack(&self, unpacked: &UnpackedRecord, skip: usize, count: usize, sink: &mut dyn RepackSink) -> Result<(u32, u32), MseedPruneError> {
			let slice = &unpacked.samples[skip..skip + count];
			let bytes: Vec<u8> = slice.iter().map(|&s| s as u8).collect();
			if bytes.is_empty() { return Ok((0, 0)); }
			sink.accept(&bytes)?;
			Ok((1, bytes.len() as u32))
		}
	}

	struct VecSink(Vec<u8>);
	impl RepackSink for VecSink {
		fn accept(&mut self, bytes: &[u8]) -> Result<(), MseedPruneError> {
			self.0.extend_from_slice(bytes);
			Ok(())
		}
	}

	fn desc(start: i64, end: i64) -> RecordDescriptor {
		RecordDescriptor::new(FileHandle::new(0), 0, 10, Hpt::from_ticks(start), Hpt::from_ticks(end), Quality::D)
	}

	#[test]
	fn t_unchanged_when_no_marks() {
		let codec = FixtureCodec { rate: 1.0, start: Hpt::from_ticks(0) };
		let mut sink = VecSink(Vec::new());
		let d = desc(0, 9 * HPTMODULUS);
		let out = trim_record(&d, &[1, 2, 3], &codec, &mut sink).unwrap();
		assert_eq!(out, TrimOutcome::Unchanged);
	}

	#[test]
	fn t_trims_head() {
		let codec = FixtureCodec { rate: 1.0, start: Hpt::from_ticks(0) };
		let mut sink = VecSink(Vec::new());
		let mut d = desc(0, 9 * HPTMODULUS);
		d.set_new_start(Hpt::from_ticks(3 * HPTMODULUS));
		let raw = [10u8, 11, 12, 13, 14, 15, 16, 17, 18, 19];
		let out = trim_record(&d, &raw, &codec, &mut sink).unwrap();
		assert_eq!(out, TrimOutcome::Repacked { records: 1, samples: 7 });
		assert_eq!(sink.0, vec![13, 14, 15, 16, 17, 18, 19]);
	}

	#[test]
	fn t_trims_tail() {
		let codec = FixtureCodec { rate: 1.0, start: Hpt::from_ticks(0) };
		let mut sink = VecSink(Vec::new());
		let mut d = desc(0, 9 * HPTMODULUS);
		d.set_new_end(Hpt::from_ticks(4 * HPTMODULUS));
		let raw = [10u8, 11, 12, 13, 14, 15, 16, 17, 18, 19];
		let out = trim_record(&d, &raw, &codec, &mut sink).unwrap();
		assert_eq!(out, TrimOutcome::Repacked { records: 1, samples: 5 });
		assert_eq!(sink.0, vec![10, 11, 12, 13, 14]);
	}

	#[test]
	fn t_invalid_marks_rejected() {
		let codec = FixtureCodec { rate: 1.0, start: Hpt::from_ticks(0) };
		let mut sink = VecSink(Vec::new());
		let mut d = desc(0, 9 * HPTMODULUS);
		// new_end before new_start is invalid per `validate_trim`.
		d.set_new_start(Hpt::from_ticks(5 * HPTMODULUS));
		d.set_new_end(Hpt::from_ticks(2 * HPTMODULUS));
		let err = trim_record(&d, &[0; 10], &codec, &mut sink).unwrap_err();
		assert!(matches!(err, MseedPruneError::InvalidTrimTimes(_)));
	}
}
