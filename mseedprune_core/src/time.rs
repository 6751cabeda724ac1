/*!
# Mseedprune: Time & Quality Primitives
*/

use std::{
	cmp::Ordering,
	fmt,
};



/// # HPT Ticks Per Second.
///
/// All timestamps and durations in the engine are integers in these units;
/// nothing in the core ever touches a float.
pub const HPTMODULUS: i64 = 1_000_000;

/// # Unset Sentinel.
///
/// Mirrors the "unset" HPT value used throughout the reference format: a
/// number no real timestamp can take on.
pub const HPT_UNSET: i64 = i64::MIN;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// # High-Precision Timestamp.
///
/// A thin wrapper around an [`i64`] tick count, `HPTMODULUS` per second. Kept
/// as a distinct type rather than a bare integer so the rest of the codebase
/// cannot confuse it with a record count, offset, or length.
pub struct Hpt(i64);

impl fmt::Display for Hpt {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_unset() { f.write_str("unset") }
		else {
			let secs = self.0.div_euclid(HPTMODULUS);
			let frac = self.0.rem_euclid(HPTMODULUS);
			write!(f, "{secs}.{frac:06}")
		}
	}
}

impl Hpt {
	#[must_use]
	/// # Unset Value.
	pub const fn unset() -> Self { Self(HPT_UNSET) }

	#[must_use]
	/// # From Raw Ticks.
	pub const fn from_ticks(ticks: i64) -> Self { Self(ticks) }

	#[must_use]
	/// # Raw Ticks.
	pub const fn ticks(self) -> i64 { self.0 }

	#[must_use]
	/// # Is Unset?
	pub const fn is_unset(self) -> bool { self.0 == HPT_UNSET }

	#[must_use]
	/// # Checked Add.
	///
	/// Returns `None` (rather than wrapping) on overflow; neither operand may
	/// be unset.
	pub fn checked_add(self, ticks: i64) -> Option<Self> {
		if self.is_unset() { None }
		else { self.0.checked_add(ticks).map(Self) }
	}

	#[must_use]
	/// # Checked Sub.
	pub fn checked_sub(self, ticks: i64) -> Option<Self> {
		if self.is_unset() { None }
		else { self.0.checked_sub(ticks).map(Self) }
	}

	#[must_use]
	/// # Absolute Difference (Ticks).
	///
	/// Panics in debug builds if either value is unset; callers are expected
	/// to have already filtered those out.
	pub fn abs_diff(self, other: Self) -> u64 {
		debug_assert!(! self.is_unset() && ! other.is_unset(), "abs_diff on unset Hpt");
		self.0.abs_diff(other.0)
	}
}

impl From<i64> for Hpt {
	#[inline]
	fn from(ticks: i64) -> Self { Self(ticks) }
}



#[must_use]
/// # Sample Period (Ticks).
///
/// The number of HPT ticks occupied by a single sample at `rate` (samples
/// per second). Zero when the rate is non-positive, matching the codec
/// convention that a zero/unknown rate has no defined period.
pub const fn sample_period_ticks(rate: f64) -> i64 {
	if rate > 0.0 { (HPTMODULUS as f64 / rate) as i64 }
	else { 0 }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
/// # Record Quality.
///
/// One of `Q` (quality-controlled), `D` (data-center-modified), or `R` (raw),
/// plus an `Other` catch-all for any byte the codec hands back that isn't one
/// of those three; `Other` always ranks lowest.
pub enum Quality {
	/// # Quality-Controlled.
	Q,
	/// # Data-Center-Modified.
	D,
	/// # Raw.
	R,
	/// # Anything Else.
	Other(u8),
}

impl fmt::Display for Quality {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Q => "Q",
			Self::D => "D",
			Self::R => "R",
			Self::Other(_) => "?",
		})
	}
}

impl From<u8> for Quality {
	fn from(byte: u8) -> Self {
		match byte {
			b'Q' => Self::Q,
			b'D' => Self::D,
			b'R' => Self::R,
			other => Self::Other(other),
		}
	}
}

impl Quality {
	#[must_use]
	/// # Rank.
	///
	/// Lower is better; used to implement [`Quality::compare`] and `Ord`.
	const fn rank(self) -> u8 {
		match self {
			Self::Q => 0,
			Self::D => 1,
			Self::R => 2,
			Self::Other(_) => 3,
		}
	}

	#[must_use]
	/// # Compare.
	///
	/// Returns an [`Ordering`] where [`Ordering::Less`] means `self` outranks
	/// `other` (Q outranks D outranks R outranks anything else). Equal bytes
	/// always compare equal, even two different `Other` bytes.
	pub const fn compare(self, other: Self) -> Ordering {
		let (a, b) = (self.rank(), other.rank());
		if a < b { Ordering::Less }
		else if a > b { Ordering::Greater }
		else { Ordering::Equal }
	}

	#[must_use]
	/// # Outranks?
	pub const fn outranks(self, other: Self) -> bool {
		matches!(self.compare(other), Ordering::Less)
	}
}



#[must_use]
/// # Within Time Tolerance?
///
/// `timeTol` is `None` for "auto" (half a sample period at `rate`), or
/// `Some(ticks)` for an explicit tolerance.
pub fn within_time_tolerance(a: Hpt, b: Hpt, rate: f64, time_tol: Option<i64>) -> bool {
	let tol = time_tol.unwrap_or_else(|| sample_period_ticks(rate) / 2);
	a.abs_diff(b) <= tol.unsigned_abs()
}
