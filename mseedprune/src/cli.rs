/*!
# Mseedprune: CLI
*/

use argyle::Argument;
use mseedprune_core::{
	Hpt,
	MseedPruneError,
	PruneMode,
	PruneOptions,
	SplitBoundary,
	HPTMODULUS,
};
use regex::Regex;
use std::path::PathBuf;



/// # A Compiled `--match`/`--reject` Filter.
///
/// Implements [`mseedprune_core::RecordSelector`] over a small set of
/// user-supplied patterns; a tag is selected when it matches at least one
/// `match` pattern (or no `match` patterns were given) and no `reject`
/// pattern.
pub(super) struct Selector {
	/// # `--match` Patterns (Any Hit Selects).
	matches: Vec<Regex>,
	/// # `--reject` Patterns (Any Hit Excludes).
	rejects: Vec<Regex>,
}

impl mseedprune_core::RecordSelector for Selector {
	fn select(&self, tag: &str) -> bool {
		if self.rejects.iter().any(|r| r.is_match(tag)) { return false; }
		self.matches.is_empty() || self.matches.iter().any(|r| r.is_match(tag))
	}
}

impl Selector {
	/// # Is This a No-Op?
	pub(super) fn is_noop(&self) -> bool { self.matches.is_empty() && self.rejects.is_empty() }
}



/// # Parsed CLI State.
pub(super) struct Parsed {
	/// # Input Files.
	pub(super) inputs: Vec<PathBuf>,
	/// # Prune Options.
	pub(super) opts: PruneOptions,
	/// # Match/Reject Filter.
	pub(super) selector: Selector,
	/// # Verbose Per-File Accounting?
	pub(super) verbose: bool,
}



/// # Parse Options.
///
/// ## Errors
///
/// Returns [`MseedPruneError::PrintHelp`]/[`MseedPruneError::PrintVersion`]
/// for `-h`/`-V`, or [`MseedPruneError::CliParse`]/[`MseedPruneError::CliArg`]
/// for anything malformed.
pub(super) fn parse() -> Result<Parsed, MseedPruneError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut opts = PruneOptions::new();
	let mut verbose = false;
	let mut matches = Vec::new();
	let mut rejects = Vec::new();
	let mut inputs = Vec::new();
	let mut ts = None;
	let mut te = None;

	for arg in args {
		match arg {
			Argument::Key("--best-quality") => { opts = opts.with_best_quality(true); },
			Argument::Key("-h" | "--help") => return Err(MseedPruneError::PrintHelp),
			Argument::Key("--no-backups") => { opts = opts.with_remove_backups(true); },
			Argument::Key("-R" | "--replace") => { opts = opts.with_replace_input(true); },
			Argument::Key("-v" | "--verbose") => { verbose = true; },
			Argument::Key("-V" | "--version") => return Err(MseedPruneError::PrintVersion),

			Argument::KeyWithValue("--reject", s) => {
				rejects.push(Regex::new(&s).map_err(|_| MseedPruneError::CliParse("--reject"))?);
			},
			Argument::KeyWithValue("-m" | "--match", s) => {
				matches.push(Regex::new(&s).map_err(|_| MseedPruneError::CliParse("-m/--match"))?);
			},
			Argument::KeyWithValue("-o" | "--output", s) => {
				opts = opts.with_output_file(Some(PathBuf::from(s)));
			},
			Argument::KeyWithValue("-P" | "--prune", s) => {
				opts = opts.with_prune_mode(parse_prune_mode(&s)?);
			},
			Argument::KeyWithValue("--restamp", s) => {
				opts = opts.with_restamp_quality(Some(parse_restamp(&s)?));
			},
			Argument::KeyWithValue("-S" | "--split", s) => {
				opts = opts.with_split_boundary(parse_split_boundary(&s)?);
			},
			Argument::KeyWithValue("--te", s) => { te = Some(parse_time(&s)?); },
			Argument::KeyWithValue("--ts", s) => { ts = Some(parse_time(&s)?); },

			Argument::Arg(p) => { inputs.push(PathBuf::from(p)); },

			_ => {},
		}
	}

	if ts.is_some() || te.is_some() { opts = opts.with_window(ts, te); }

	if inputs.is_empty() { return Err(MseedPruneError::CliArg("no input files given".to_owned())); }

	Ok(Parsed { inputs, opts, selector: Selector { matches, rejects }, verbose })
}

/// # Parse a `--prune` Mode.
fn parse_prune_mode(s: &str) -> Result<PruneMode, MseedPruneError> {
	match s {
		"off" => Ok(PruneMode::Off),
		"record" => Ok(PruneMode::Record),
		"sample" => Ok(PruneMode::Sample),
		_ => Err(MseedPruneError::CliParse("-P/--prune")),
	}
}

/// # Parse a `--split` Mode.
fn parse_split_boundary(s: &str) -> Result<SplitBoundary, MseedPruneError> {
	match s {
		"none" => Ok(SplitBoundary::None),
		"day" => Ok(SplitBoundary::Day),
		"hour" => Ok(SplitBoundary::Hour),
		"minute" => Ok(SplitBoundary::Minute),
		_ => Err(MseedPruneError::CliParse("-S/--split")),
	}
}

/// # Parse a `--restamp` Quality Byte.
fn parse_restamp(s: &str) -> Result<u8, MseedPruneError> {
	match s {
		"Q" | "q" => Ok(b'Q'),
		"D" | "d" => Ok(b'D'),
		"R" | "r" => Ok(b'R'),
		_ => Err(MseedPruneError::CliParse("--restamp")),
	}
}

/// # Parse a `--ts`/`--te` Time.
fn parse_time(s: &str) -> Result<Hpt, MseedPruneError> {
	let parsed: utc2k::Utc2k = s.parse().map_err(|_| MseedPruneError::CliParse("--ts/--te"))?;
	let secs = i64::from(parsed.unixtime());
	Ok(Hpt::from_ticks(secs * HPTMODULUS))
}
