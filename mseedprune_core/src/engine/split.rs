/*!
# Mseedprune: Boundary Splitter
*/

use crate::{
	engine::opts::SplitBoundary,
	record::{
		RecordDescriptor,
		RecordHandle,
		RecordMap,
	},
	time::{
		Hpt,
		HPTMODULUS,
	},
};

/// # Seconds Per Minute.
const SECS_MINUTE: i64 = 60;
/// # Seconds Per Hour.
const SECS_HOUR: i64 = 60 * SECS_MINUTE;
/// # Seconds Per Day.
const SECS_DAY: i64 = 24 * SECS_HOUR;



#[must_use]
/// # Next Boundary Strictly After `t`.
///
/// Unix-time day/hour/minute boundaries are exact multiples of 86400/3600/60
/// seconds, so this needs no calendar library: the broken-down-time
/// increment-and-zero described in §4.H step 1 reduces to integer div/mul.
fn next_boundary(t: Hpt, mode: SplitBoundary) -> Option<Hpt> {
	let unit_secs = match mode {
		SplitBoundary::None => return None,
		SplitBoundary::Day => SECS_DAY,
		SplitBoundary::Hour => SECS_HOUR,
		SplitBoundary::Minute => SECS_MINUTE,
	};
	let secs = t.ticks().div_euclid(HPTMODULUS);
	let next_secs = secs.div_euclid(unit_secs).checked_add(1)?.checked_mul(unit_secs)?;
	Some(Hpt::from_ticks(next_secs.checked_mul(HPTMODULUS)?))
}



/// # Split a Record at Wall-Clock Boundaries.
///
/// Implements §4.H: repeatedly finds the next boundary after the record's
/// (possibly already-trimmed) effective start, and if it falls strictly
/// before the record's end, carves off a new sibling descriptor after it in
/// the record-map. Returns the number of additional fragments created.
///
/// Never leaves a fragment with `new_start >= new_end`, and never emits an
/// empty final fragment — a boundary landing exactly on `end` terminates the
/// loop without a split.
pub(crate) fn split_record(map: &mut RecordMap, mut h: RecordHandle, mode: SplitBoundary, sample_period: i64) -> u32 {
	if matches!(mode, SplitBoundary::None) { return 0; }

	let mut splits = 0_u32;
	loop {
		let (end, orig_start, orig_end) = {
			let r = map.get(h);
			(r.eff_end(), r.start, r.end)
		};
		let Some(boundary) = next_boundary(map.get(h).eff_start(), mode) else { break; };
		if boundary.ticks() >= end.ticks() { break; }

		let new_end = Hpt::from_ticks(boundary.ticks() - sample_period);
		// Guard invariant 2: new_end must stay strictly inside (start, end).
		if !(orig_start.ticks() < new_end.ticks() && new_end.ticks() < orig_end.ticks()) { break; }

		let sibling = {
			let r = map.get(h);
			RecordDescriptor::new(r.file, r.offset, r.reclen, r.start, r.end, r.quality)
		};
		let new_h = map.insert_after(h, sibling);
		map.get_mut(new_h).set_new_start(boundary);
		map.get_mut(h).set_new_end(new_end);

		splits += 1;
		h = new_h;
	}
	splits
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::record::FileHandle;
	use crate::time::Quality;

	fn rec(start: i64, end: i64) -> RecordDescriptor {
		RecordDescriptor::new(FileHandle::new(0), 0, 512, Hpt::from_ticks(start), Hpt::from_ticks(end), Quality::D)
	}

	#[test]
	fn t_next_boundary_day() {
		// 2020-01-01T23:59:55 UTC is 1577923195s; next day boundary is
		// 2020-01-02T00:00:00 = 1577923200s.
		let t = Hpt::from_ticks(1_577_923_195 * HPTMODULUS);
		let b = next_boundary(t, SplitBoundary::Day).unwrap();
		assert_eq!(b.ticks(), 1_577_923_200 * HPTMODULUS);
	}

	#[test]
	fn t_split_crossing_day() {
		let mut map = RecordMap::new();
		let start = 1_577_923_195 * HPTMODULUS; // 23:59:55
		let end = 1_577_923_205 * HPTMODULUS; // 00:00:05 next day
		let h = map.append_tail(rec(start, end));
		let sample_period = HPTMODULUS; // 1 Hz
		let n = split_record(&mut map, h, SplitBoundary::Day, sample_period);
		assert_eq!(n, 1);
		assert_eq!(map.count(), 2);
		let first = map.get(h);
		assert_eq!(first.eff_end().ticks(), 1_577_923_199 * HPTMODULUS);
		let second_h = map.next(h).unwrap();
		let second = map.get(second_h);
		assert_eq!(second.eff_start().ticks(), 1_577_923_200 * HPTMODULUS);
	}

	#[test]
	fn t_no_split_when_boundary_not_crossed() {
		let mut map = RecordMap::new();
		let h = map.append_tail(rec(0, 10 * HPTMODULUS));
		let n = split_record(&mut map, h, SplitBoundary::Day, HPTMODULUS);
		assert_eq!(n, 0);
		assert_eq!(map.count(), 1);
	}

	#[test]
	fn t_split_off() {
		let mut map = RecordMap::new();
		let h = map.append_tail(rec(1_577_923_195 * HPTMODULUS, 1_577_923_205 * HPTMODULUS));
		let n = split_record(&mut map, h, SplitBoundary::None, HPTMODULUS);
		assert_eq!(n, 0);
	}
}
