/*!
# Mseedprune: Mini-SEED Codec

A concrete implementation of [`mseedprune_core::MseedCodec`] for plain
(uncompressed) sample encodings. The core treats record parsing as an
external collaborator (it only ever sees header fields, offsets, and
decoded samples); this module is that collaborator for the CLI binary.

STEIM-compressed records (encoding formats 10/11) are not decoded; reading
one reports [`MseedPruneError::CorruptRecord`] rather than guessing.
*/

use mseedprune_core::{
	sample_period_ticks,
	Hpt,
	MseedCodec,
	MseedPruneError,
	RecordHeader,
	RepackSink,
	UnpackedRecord,
	HPTMODULUS,
};

/// # Fixed Header Length (Bytes).
const FIXED_HEADER_LEN: usize = 48;

/// # Output Record Length (Bytes, Power of Two).
const OUT_RECLEN: usize = 512;

/// # `log2(OUT_RECLEN)`, For Blockette 1000's Length Field.
const OUT_RECLEN_EXP: u8 = 9;



/// # A Minimal, Pure-Rust Mini-SEED Codec.
///
/// Understands the SEED v2 fixed header, Blockette 1000 (Data Only SEED
/// Blockette), and the 16-bit/32-bit plain-integer sample encodings (formats
/// 1 and 3). Everything it writes back out uses format 3.
pub(super) struct MiniseedCodec;

impl MseedCodec for MiniseedCodec {
	fn read_next(&self, bytes: &[u8], offset: u64) -> Result<(RecordHeader, u64, u32), MseedPruneError> {
		let off = offset as usize;
		let fixed = bytes.get(off..off + FIXED_HEADER_LEN)
			.ok_or_else(|| MseedPruneError::CorruptRecord(format!("truncated fixed header at {offset}")))?;

		let station = ascii_field(&fixed[8..13]);
		let location = ascii_field(&fixed[13..15]);
		let channel = ascii_field(&fixed[15..18]);
		let network = ascii_field(&fixed[18..20]);
		let quality = fixed[6];

		let year = be16(&fixed[20..22]);
		let day = be16(&fixed[22..24]);
		let hour = fixed[24];
		let min = fixed[25];
		let sec = fixed[26];
		let fract = be16(&fixed[28..30]);
		let start = btime_to_hpt(year, day, hour, min, sec, fract)?;

		let num_samples = u32::from(be16(&fixed[30..32]));
		let rate_factor = be16(&fixed[32..34]) as i16;
		let rate_mult = be16(&fixed[34..36]) as i16;
		let rate = sample_rate(rate_factor, rate_mult);

		let first_blockette = be16(&fixed[46..48]) as usize;
		let (_encoding, reclen_exp) = find_blockette_1000(bytes, off, first_blockette)?;

		let reclen = 1u32 << reclen_exp;
		let period = sample_period_ticks(rate);
		let end = if num_samples == 0 { start }
			else { Hpt::from_ticks(start.ticks() + period * i64::from(num_samples - 1)) };

		let header = RecordHeader { network, station, location, channel, quality, start, end, rate, reclen };
		Ok((header, offset, reclen))
	}

	fn unpack(&self, bytes: &[u8]) -> Result<UnpackedRecord, MseedPruneError> {
		let fixed = bytes.get(..FIXED_HEADER_LEN)
			.ok_or_else(|| MseedPruneError::CorruptRecord("truncated fixed header".to_owned()))?;

		let station = ascii_field(&fixed[8..13]);
		let location = ascii_field(&fixed[13..15]);
		let channel = ascii_field(&fixed[15..18]);
		let network = ascii_field(&fixed[18..20]);
		let quality = fixed[6];

		let year = be16(&fixed[20..22]);
		let day = be16(&fixed[22..24]);
		let hour = fixed[24];
		let min = fixed[25];
		let sec = fixed[26];
		let fract = be16(&fixed[28..30]);
		let start = btime_to_hpt(year, day, hour, min, sec, fract)?;

		let num_samples = usize::from(be16(&fixed[30..32]));
		let rate_factor = be16(&fixed[32..34]) as i16;
		let rate_mult = be16(&fixed[34..36]) as i16;
		let rate = sample_rate(rate_factor, rate_mult);

		let first_blockette = be16(&fixed[46..48]) as usize;
		let (encoding, _) = find_blockette_1000(bytes, 0, first_blockette)?;
		let data_start = usize::from(be16(&fixed[44..46]));

		let samples = decode_samples(bytes, data_start, num_samples, encoding)?;
		let period = sample_period_ticks(rate);
		let end = if num_samples == 0 { start }
			else { Hpt::from_ticks(start.ticks() + period * (num_samples as i64 - 1)) };

		Ok(UnpackedRecord {
			header: RecordHeader { network, station, location, channel, quality, start, end, rate, reclen: bytes.len() as u32 },
			sample_type: encoding,
			samples,
		})
	}

	fn pack(&self, unpacked: &UnpackedRecord, skip: usize, count: usize, sink: &mut dyn RepackSink) -> Result<(u32, u32), MseedPruneError> {
		let period = sample_period_ticks(unpacked.header.rate);
		let overhead = FIXED_HEADER_LEN + 8;
		let per_record = (OUT_RECLEN - overhead) / 4;
		if per_record == 0 { return Err(MseedPruneError::Bug("output record too small for any samples")); }

		let mut records = 0u32;
		let mut written = 0u32;
		let mut pos = 0usize;
		while pos < count {
			let n = per_record.min(count - pos);
			let chunk_start = Hpt::from_ticks(unpacked.header.start.ticks() + period * (skip + pos) as i64);
			let buf = encode_record(unpacked, &unpacked.samples[skip + pos..skip + pos + n], chunk_start);
			sink.accept(&buf)?;
			records += 1;
			written += n as u32;
			pos += n;
		}
		Ok((records, written))
	}
}

/// # Trim Trailing Spaces/NULs From a Fixed-Width ASCII Field.
fn ascii_field(raw: &[u8]) -> String {
	String::from_utf8_lossy(raw).trim_end_matches([' ', '\0']).to_owned()
}

/// # Big-Endian `u16`.
fn be16(b: &[u8]) -> u16 { u16::from_be_bytes([b[0], b[1]]) }

/// # Compute the Sample Rate From SEED's Factor/Multiplier Pair.
fn sample_rate(factor: i16, mult: i16) -> f64 {
	match (factor.signum(), mult.signum()) {
		(1 | 0, 1 | 0) => f64::from(factor) * f64::from(mult.max(1)),
		(1 | 0, -1) => f64::from(factor) / f64::from(-mult),
		(-1, 1 | 0) => f64::from(mult.max(1)) / f64::from(-factor),
		(-1, -1) => 1.0 / (f64::from(-factor) * f64::from(-mult)),
		_ => 0.0,
	}
}

/// # Convert a SEED BTIME to an [`Hpt`].
///
/// `day` is the (1-based) day-of-year and `fract` is in 1/10000-second
/// units. Pure integer arithmetic — no calendar crate, same as the
/// boundary splitter's day/hour/minute math.
fn btime_to_hpt(year: u16, day: u16, hour: u8, min: u8, sec: u8, fract: u16) -> Result<Hpt, MseedPruneError> {
	if year < 1900 || day == 0 || day > 366 {
		return Err(MseedPruneError::CorruptRecord(format!("implausible start time {year}-{day}")));
	}
	let leap_count = |y: i64| y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400);
	let days_before_year = 365 * (i64::from(year) - 1970) + (leap_count(i64::from(year) - 1) - leap_count(1969));
	let total_days = days_before_year + i64::from(day - 1);
	let secs = total_days * 86_400 + i64::from(hour) * 3600 + i64::from(min) * 60 + i64::from(sec);
	let ticks = secs.checked_mul(HPTMODULUS)
		.and_then(|t| t.checked_add(i64::from(fract) * 100))
		.ok_or_else(|| MseedPruneError::CorruptRecord("start time overflow".to_owned()))?;
	Ok(Hpt::from_ticks(ticks))
}

/// # Walk the Blockette Chain Looking for Blockette 1000.
///
/// Returns `(encoding format, record-length exponent)`. `base` is the
/// absolute offset of the record's fixed header within `bytes`.
fn find_blockette_1000(bytes: &[u8], base: usize, mut next: usize) -> Result<(u8, u8), MseedPruneError> {
	for _ in 0..16 {
		if next == 0 { break; }
		let at = base + next;
		let blk = bytes.get(at..at + 8)
			.ok_or_else(|| MseedPruneError::CorruptRecord("truncated blockette chain".to_owned()))?;
		let kind = be16(&blk[0..2]);
		if kind == 1000 {
			return Ok((blk[4], blk[6]));
		}
		next = usize::from(be16(&blk[2..4]));
	}
	Err(MseedPruneError::CorruptRecord("missing blockette 1000".to_owned()))
}

/// # Decode Plain-Integer Samples.
fn decode_samples(bytes: &[u8], data_start: usize, count: usize, encoding: u8) -> Result<Vec<i32>, MseedPruneError> {
	match encoding {
		1 => {
			let want = data_start + count * 2;
			let slice = bytes.get(data_start..want)
				.ok_or_else(|| MseedPruneError::CorruptRecord("truncated 16-bit sample data".to_owned()))?;
			Ok(slice.chunks_exact(2).map(|c| i32::from(i16::from_be_bytes([c[0], c[1]]))).collect())
		},
		3 => {
			let want = data_start + count * 4;
			let slice = bytes.get(data_start..want)
				.ok_or_else(|| MseedPruneError::CorruptRecord("truncated 32-bit sample data".to_owned()))?;
			Ok(slice.chunks_exact(4).map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]])).collect())
		},
		n => Err(MseedPruneError::CorruptRecord(format!("unsupported encoding format {n}"))),
	}
}

/// # Encode One Output Record (Format 3, Fixed 512-Byte Length).
fn encode_record(unpacked: &UnpackedRecord, samples: &[i32], start: Hpt) -> Vec<u8> {
	let mut buf = vec![0u8; OUT_RECLEN];
	buf[0..6].copy_from_slice(b"000001");
	buf[6] = unpacked.header.quality;
	buf[7] = b' ';
	write_ascii_field(&mut buf[8..13], &unpacked.header.station);
	write_ascii_field(&mut buf[13..15], &unpacked.header.location);
	write_ascii_field(&mut buf[15..18], &unpacked.header.channel);
	write_ascii_field(&mut buf[18..20], &unpacked.header.network);

	let (year, day, hour, min, sec, fract) = hpt_to_btime(start);
	buf[20..22].copy_from_slice(&year.to_be_bytes());
	buf[22..24].copy_from_slice(&day.to_be_bytes());
	buf[24] = hour;
	buf[25] = min;
	buf[26] = sec;
	buf[28..30].copy_from_slice(&fract.to_be_bytes());

	buf[30..32].copy_from_slice(&(samples.len() as u16).to_be_bytes());
	let (factor, mult) = encode_sample_rate(unpacked.header.rate);
	buf[32..34].copy_from_slice(&factor.to_be_bytes());
	buf[34..36].copy_from_slice(&mult.to_be_bytes());
	buf[39] = 1; // one blockette follows
	buf[44..46].copy_from_slice(&(FIXED_HEADER_LEN as u16 + 8).to_be_bytes());
	buf[46..48].copy_from_slice(&(FIXED_HEADER_LEN as u16).to_be_bytes());

	let blk = FIXED_HEADER_LEN;
	buf[blk..blk + 2].copy_from_slice(&1000u16.to_be_bytes());
	buf[blk + 2..blk + 4].copy_from_slice(&0u16.to_be_bytes());
	buf[blk + 4] = 3;
	buf[blk + 5] = 1;
	buf[blk + 6] = OUT_RECLEN_EXP;

	let data_start = FIXED_HEADER_LEN + 8;
	for (i, s) in samples.iter().enumerate() {
		let at = data_start + i * 4;
		buf[at..at + 4].copy_from_slice(&s.to_be_bytes());
	}
	buf
}

/// # Write an ASCII Field, Space-Padded to Width.
fn write_ascii_field(dst: &mut [u8], s: &str) {
	dst.fill(b' ');
	let bytes = s.as_bytes();
	let n = bytes.len().min(dst.len());
	dst[..n].copy_from_slice(&bytes[..n]);
}

/// # Encode a Sample Rate Back Into SEED's Factor/Multiplier Pair.
///
/// Reproduces the simple "whole Hz" cases produced by [`sample_rate`];
/// fractional rates are encoded as `1 / round(1/rate)` to stay lossless
/// for the tick-aligned rates this codec actually writes.
fn encode_sample_rate(rate: f64) -> (i16, i16) {
	if rate >= 1.0 { (rate.round() as i16, 1) }
	else if rate > 0.0 { (-((1.0 / rate).round() as i16), 1) }
	else { (0, 0) }
}

/// # Convert an [`Hpt`] Back Into a SEED BTIME.
fn hpt_to_btime(t: Hpt) -> (u16, u16, u8, u8, u8, u16) {
	let ticks = t.ticks();
	let secs = ticks.div_euclid(HPTMODULUS);
	let fract = ticks.rem_euclid(HPTMODULUS) / 100;
	let mut days = secs.div_euclid(86_400);
	let mut rem = secs.rem_euclid(86_400);
	let hour = (rem / 3600) as u8;
	rem %= 3600;
	let min = (rem / 60) as u8;
	let sec = (rem % 60) as u8;

	let leap_count = |y: i64| y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400);
	let mut year = 1970i64;
	loop {
		let year_len = if leap_count(year) - leap_count(year - 1) == 1 { 366 } else { 365 };
		if days < year_len { break; }
		days -= year_len;
		year += 1;
	}
	((year as u16), (days + 1) as u16, hour, min, sec, fract as u16)
}



#[cfg(test)]
mod test {
	use super::*;

	fn sample_record(station: &str, samples: &[i32]) -> Vec<u8> {
		let unpacked = UnpackedRecord {
			header: RecordHeader {
				network: "IU".into(), station: station.into(), location: "00".into(), channel: "BHZ".into(),
				quality: b'D', start: Hpt::from_ticks(1_577_923_200 * HPTMODULUS), end: Hpt::from_ticks(0),
				rate: 1.0, reclen: 0,
			},
			sample_type: 3,
			samples: samples.to_vec(),
		};
		encode_record(&unpacked, samples, unpacked.header.start)
	}

	#[test]
	fn t_roundtrip_header_and_samples() {
		let codec = MiniseedCodec;
		let raw = sample_record("ANMO", &[1, -2, 3, 4]);
		let (header, offset, reclen) = codec.read_next(&raw, 0).unwrap();
		assert_eq!(offset, 0);
		assert_eq!(reclen, OUT_RECLEN as u32);
		assert_eq!(header.station, "ANMO");
		assert_eq!(header.network, "IU");
		assert!((header.rate - 1.0).abs() < f64::EPSILON);

		let unpacked = codec.unpack(&raw).unwrap();
		assert_eq!(unpacked.samples, vec![1, -2, 3, 4]);
	}

	#[test]
	fn t_btime_roundtrip() {
		let t = Hpt::from_ticks(1_577_923_200 * HPTMODULUS + 250_000);
		let (year, day, hour, min, sec, fract) = hpt_to_btime(t);
		let back = btime_to_hpt(year, day, hour, min, sec, fract).unwrap();
		assert_eq!(back.ticks(), t.ticks());
	}

	#[test]
	fn t_pack_splits_across_records_when_needed() {
		let codec = MiniseedCodec;
		let samples: Vec<i32> = (0..200).collect();
		let unpacked = UnpackedRecord {
			header: RecordHeader {
				network: "IU".into(), station: "ANMO".into(), location: "00".into(), channel: "BHZ".into(),
				quality: b'D', start: Hpt::from_ticks(0), end: Hpt::from_ticks(0), rate: 1.0, reclen: 0,
			},
			sample_type: 3,
			samples,
		};
		let mut out = Vec::new();
		struct V<'a>(&'a mut Vec<Vec<u8>>);
		impl RepackSink for V<'_> {
			fn accept(&mut self, bytes: &[u8]) -> Result<(), MseedPruneError> { self.0.push(bytes.to_vec()); Ok(()) }
		}
		let mut collected = Vec::new();
		let mut sink = V(&mut collected);
		let (records, written) = codec.pack(&unpacked, 0, 200, &mut sink).unwrap();
		assert!(records > 1, "200 samples at 4 bytes each must not fit in one 512-byte record");
		assert_eq!(written, 200);
		assert_eq!(collected.len(), records as usize);
	}

	#[test]
	fn t_unsupported_encoding_rejected() {
		let err = decode_samples(&[0; 16], 0, 4, 10).unwrap_err();
		assert!(matches!(err, MseedPruneError::CorruptRecord(_)));
	}
}
