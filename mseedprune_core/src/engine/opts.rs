/*!
# Mseedprune: Prune Options
*/

use crate::time::Hpt;
use std::path::PathBuf;



/// # Flag: Best Quality.
const FLAG_BEST_QUALITY: u8 = 0b0001;

/// # Flag: Replace Input In Place.
const FLAG_REPLACE_INPUT: u8 = 0b0010;

/// # Flag: Remove `.orig` Backups.
const FLAG_REMOVE_BACKUPS: u8 = 0b0100;

/// # Flag: Default (All Off).
const FLAG_DEFAULT: u8 = 0b0000;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
/// # Pruner Mode.
pub enum PruneMode {
	#[default]
	/// # No Pruning.
	Off,
	/// # Whole-Record Deletion Only.
	Record,
	/// # Record Deletion Plus Sample-Level Trimming.
	Sample,
}

impl PruneMode {
	#[must_use]
	/// # Sample-Level Trimming Enabled?
	pub const fn is_sample(self) -> bool { matches!(self, Self::Sample) }

	#[must_use]
	/// # Any Pruning At All?
	pub const fn is_enabled(self) -> bool { !matches!(self, Self::Off) }
}



#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
/// # Boundary Split Mode.
pub enum SplitBoundary {
	#[default]
	/// # No Splitting.
	None,
	/// # Split at UTC Day Boundaries.
	Day,
	/// # Split at Hour Boundaries.
	Hour,
	/// # Split at Minute Boundaries.
	Minute,
}



#[derive(Debug, Clone, Default)]
/// # Prune Options.
///
/// A builder-style configuration object constructed once per pass and
/// passed by reference into the engine (§9 "pass context"); nothing here is
/// ever read from a global.
pub struct PruneOptions {
	/// # Packed Boolean Flags.
	flags: u8,
	/// # Pruner Mode.
	prunedata: PruneMode,
	/// # Continuity Time Tolerance (Ticks); `None` = auto (half sample period).
	time_tol: Option<i64>,
	/// # Sample-Rate Tolerance (Hz); `None` = codec default.
	samp_rate_tol: Option<f64>,
	/// # Re-Quality-Stamp Byte.
	restamp_quality: Option<u8>,
	/// # Window Start.
	window_start: Option<Hpt>,
	/// # Window End.
	window_end: Option<Hpt>,
	/// # Boundary Split Mode.
	split_boundary: SplitBoundary,
	/// # Combined Output File ("-" for stdout).
	output_file: Option<PathBuf>,
	/// # Archive Path Templates.
	archives: Vec<String>,
}

impl PruneOptions {
	#[must_use]
	/// # New, All Defaults.
	pub const fn new() -> Self {
		Self {
			flags: FLAG_DEFAULT,
			prunedata: PruneMode::Off,
			time_tol: None,
			samp_rate_tol: None,
			restamp_quality: None,
			window_start: None,
			window_end: None,
			split_boundary: SplitBoundary::None,
			output_file: None,
			archives: Vec::new(),
		}
	}

	#[must_use]
	/// # With Best-Quality Priority.
	///
	/// ```
	/// use mseedprune_core::PruneOptions;
	/// let opts = PruneOptions::new().with_best_quality(true);
	/// assert!(opts.best_quality());
	/// ```
	pub const fn with_best_quality(mut self, on: bool) -> Self {
		if on { self.flags |= FLAG_BEST_QUALITY; }
		else { self.flags &= !FLAG_BEST_QUALITY; }
		self
	}

	#[must_use]
	/// # With Replace-Input.
	pub const fn with_replace_input(mut self, on: bool) -> Self {
		if on { self.flags |= FLAG_REPLACE_INPUT; }
		else { self.flags &= !FLAG_REPLACE_INPUT; }
		self
	}

	#[must_use]
	/// # With Remove-Backups.
	pub const fn with_remove_backups(mut self, on: bool) -> Self {
		if on { self.flags |= FLAG_REMOVE_BACKUPS; }
		else { self.flags &= !FLAG_REMOVE_BACKUPS; }
		self
	}

	#[must_use]
	/// # With Prune Mode.
	pub const fn with_prune_mode(mut self, mode: PruneMode) -> Self {
		self.prunedata = mode;
		self
	}

	#[must_use]
	/// # With Time Tolerance (Seconds).
	pub fn with_time_tol(mut self, secs: Option<f64>) -> Self {
		self.time_tol = secs.map(|s| (s * crate::time::HPTMODULUS as f64) as i64);
		self
	}

	#[must_use]
	/// # With Sample-Rate Tolerance (Hz).
	pub const fn with_samp_rate_tol(mut self, hz: Option<f64>) -> Self {
		self.samp_rate_tol = hz;
		self
	}

	#[must_use]
	/// # With Restamp Quality.
	pub const fn with_restamp_quality(mut self, q: Option<u8>) -> Self {
		self.restamp_quality = q;
		self
	}

	#[must_use]
	/// # With Window.
	pub const fn with_window(mut self, start: Option<Hpt>, end: Option<Hpt>) -> Self {
		self.window_start = start;
		self.window_end = end;
		self
	}

	#[must_use]
	/// # With Split Boundary.
	pub const fn with_split_boundary(mut self, b: SplitBoundary) -> Self {
		self.split_boundary = b;
		self
	}

	#[must_use]
	/// # With Output File.
	pub fn with_output_file(mut self, path: Option<PathBuf>) -> Self {
		self.output_file = path;
		self
	}

	#[must_use]
	/// # With an Archive Template.
	pub fn with_archive(mut self, template: String) -> Self {
		self.archives.push(template);
		self
	}

	#[must_use]
	/// # Best Quality?
	pub const fn best_quality(&self) -> bool { self.flags & FLAG_BEST_QUALITY != 0 }

	#[must_use]
	/// # Replace Input?
	pub const fn replace_input(&self) -> bool { self.flags & FLAG_REPLACE_INPUT != 0 }

	#[must_use]
	/// # Remove Backups?
	pub const fn remove_backups(&self) -> bool { self.flags & FLAG_REMOVE_BACKUPS != 0 }

	#[must_use]
	/// # Prune Mode.
	pub const fn prune_mode(&self) -> PruneMode { self.prunedata }

	#[must_use]
	/// # Time Tolerance (Ticks).
	pub const fn time_tol(&self) -> Option<i64> { self.time_tol }

	#[must_use]
	/// # Sample-Rate Tolerance (Hz).
	pub const fn samp_rate_tol(&self) -> Option<f64> { self.samp_rate_tol }

	#[must_use]
	/// # Restamp Quality Byte.
	pub const fn restamp_quality(&self) -> Option<u8> { self.restamp_quality }

	#[must_use]
	/// # Window Start.
	pub const fn window_start(&self) -> Option<Hpt> { self.window_start }

	#[must_use]
	/// # Window End.
	pub const fn window_end(&self) -> Option<Hpt> { self.window_end }

	#[must_use]
	/// # Split Boundary Mode.
	pub const fn split_boundary(&self) -> SplitBoundary { self.split_boundary }

	#[must_use]
	/// # Output File.
	pub const fn output_file(&self) -> Option<&PathBuf> { self.output_file.as_ref() }

	#[must_use]
	/// # Archive Templates.
	pub fn archives(&self) -> &[String] { &self.archives }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_defaults() {
		let opts = PruneOptions::new();
		assert!(! opts.best_quality());
		assert_eq!(opts.prune_mode(), PruneMode::Off);
		assert!(opts.output_file().is_none());
	}

	#[test]
	fn t_builder_roundtrip() {
		let opts = PruneOptions::new()
			.with_best_quality(true)
			.with_prune_mode(PruneMode::Sample)
			.with_replace_input(true);
		assert!(opts.best_quality());
		assert!(opts.replace_input());
		assert!(! opts.remove_backups());
		assert!(opts.prune_mode().is_sample());
	}

	#[test]
	fn t_time_tol_conversion() {
		let opts = PruneOptions::new().with_time_tol(Some(0.5));
		assert_eq!(opts.time_tol(), Some(500_000));
	}

	#[test]
	fn t_flags_toggle_off() {
		let opts = PruneOptions::new().with_best_quality(true).with_best_quality(false);
		assert!(! opts.best_quality());
	}
}
