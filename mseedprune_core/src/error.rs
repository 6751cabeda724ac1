/*!
# Mseedprune: Errors
*/

use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r#"
   .   .  .    Mseedprune v"#, env!("CARGO_PKG_VERSION"), r#"
    \  |  /    Select, time-order, and prune
  '  \ | /  '  overlapping Mini-SEED coverage.
----  (*)  ----
  .  / | \  .
    /  |  \
   '   .   '

USAGE:
    mseedprune [OPTIONS] <FILE(s)>

PRUNING:
    -P, --prune <MODE>
                      Overlap pruning mode: off, record, or sample.
                      [default: off]
        --best-quality
                      Prefer higher-quality (Q>D>R) coverage over longer
                      coverage when two traces for the same channel overlap.

WINDOWING & FILTERING:
        --ts <TIME>   Discard (or, in sample mode, trim) records entirely
                      before this time.
        --te <TIME>   Discard (or, in sample mode, trim) records entirely
                      after this time.
    -m, --match <REGEX>
                      Only process records whose NET_STA_LOC_CHAN_QUAL matches
                      this pattern. May be repeated.
        --reject <REGEX>
                      Skip records whose NET_STA_LOC_CHAN_QUAL matches this
                      pattern. May be repeated.

SPLITTING & RESTAMPING:
    -S, --split <MODE>
                      Boundary split mode: none, day, hour, or minute.
                      [default: none]
        --restamp <Q|D|R>
                      Overwrite the quality byte of every written record.

OUTPUT:
    -o, --output <PATH>
                      Write all surviving records to a single combined file
                      ("-" for stdout).
    -R, --replace     Rewrite each input file in place.
        --no-backups  Delete the .orig shadow copy after a successful
                      in-place pass.

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -v, --verbose     Print a detailed per-file accounting of removed,
                      trimmed, and split records.
    -V, --version     Print version information to STDOUT and exit.
");



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum MseedPruneError {
	/// # Internal bug; should never happen.
	Bug(&'static str),

	/// # The codec reported a corrupt record.
	CorruptRecord(String),

	/// # A record is larger than the scratch buffer.
	OversizeRecord(u32),

	/// # A trim would violate the new-start/new-end invariant.
	InvalidTrimTimes(String),

	/// # Could not raise the open-file ceiling.
	OpenFileLimit,

	/// # Unable to open a file for reading.
	Open(String),

	/// # Unable to read from a file.
	Read(String),

	/// # Unable to seek within a file.
	Seek(String),

	/// # Unable to write to a file.
	Write(String),

	/// # Unable to rename a file (input shadowing).
	Rename(String),

	/// # Unable to remove a backup shadow file.
	Unlink(String),

	/// # The reader could not classify a record as head or tail.
	Misclassification(String),

	/// # There is nothing to do.
	Noop,

	/// # User abort (e.g. Ctrl-C).
	Killed,

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for MseedPruneError {}

impl From<MseedPruneError> for Msg {
	#[inline]
	fn from(src: MseedPruneError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for MseedPruneError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::CorruptRecord(s) => write!(f, "Corrupt record in {s}."),
			Self::OversizeRecord(n) => write!(f, "Record of {n} bytes exceeds the scratch buffer."),
			Self::InvalidTrimTimes(s) => write!(f, "Invalid trim times for record in {s}."),
			Self::OpenFileLimit => f.write_str("Unable to raise the open-file ceiling for this pass."),
			Self::Open(s) => write!(f, "Unable to open {s}."),
			Self::Read(s) => write!(f, "Unable to read {s}."),
			Self::Seek(s) => write!(f, "Unable to seek within {s}."),
			Self::Write(s) => write!(f, "Unable to write {s}."),
			Self::Rename(s) => write!(f, "Unable to rename {s}."),
			Self::Unlink(s) => write!(f, "Unable to remove {s}."),
			Self::Misclassification(s) => write!(f, "Could not place record from {s} in its trace."),
			Self::Noop => f.write_str("There's nothing to do!"),
			Self::Killed => f.write_str("User abort."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Mseedprune v", env!("CARGO_PKG_VERSION"))),
		}
	}
}
