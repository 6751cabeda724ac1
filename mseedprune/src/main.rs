/*!
# Mseedprune
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

mod cli;
mod codec;

use ahash::AHashMap;
use codec::MiniseedCodec;
use dactyl::NiceU64;
use fyi_msg::Msg;
use mseedprune_core::{
	CombinedSink,
	Engine,
	FileHandle,
	MseedPruneError,
	PassContext,
	PassSink,
	PassStats,
	PruneLog,
	PruneMode,
	RecordSelector,
	ReplaceInputSink,
	SplitBoundary,
};
use std::{
	path::PathBuf,
	sync::{
		atomic::{
			AtomicBool,
			Ordering::{
				Relaxed,
				SeqCst,
			},
		},
		Arc,
	},
};



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() {
	match _main() {
		Ok(()) => {},
		Err(e @ (MseedPruneError::PrintHelp | MseedPruneError::PrintVersion)) => {
			println!("{e}");
		},
		Err(e) => {
			Msg::from(e).eprint();
			std::process::exit(1);
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn _main() -> Result<(), MseedPruneError> {
	let parsed = cli::parse()?;

	if matches!(parsed.opts.prune_mode(), PruneMode::Off)
		&& matches!(parsed.opts.split_boundary(), SplitBoundary::None)
		&& parsed.opts.restamp_quality().is_none()
	{
		return Err(MseedPruneError::Noop);
	}

	let mut ctx = PassContext::new();
	sigint(ctx.kill_switch().inner());

	let codec = MiniseedCodec;
	let engine = Engine::new(&codec);
	let mut log = PruneLog::new();

	let selector: Option<&dyn RecordSelector> =
		if parsed.selector.is_noop() { None } else { Some(&parsed.selector) };

	let input_paths = parsed.inputs.clone();
	let mut sink: Box<dyn PassSink> = if parsed.opts.replace_input() {
		Box::new(ReplaceInputSink::new(&input_paths, parsed.opts.remove_backups()))
	}
	else {
		match parsed.opts.output_file() {
			Some(p) if p.as_os_str() == "-" => Box::new(CombinedSink::new(std::io::stdout())),
			Some(p) => {
				let f = std::fs::File::create(p).map_err(|_| MseedPruneError::Open(p.display().to_string()))?;
				Box::new(CombinedSink::new(f))
			},
			None => Box::new(CombinedSink::new(std::io::stdout())),
		}
	};

	let stats = engine.run_pass(parsed.inputs, &parsed.opts, selector, &mut *sink, &mut log, &mut ctx)?;

	if ctx.killed() { return Err(MseedPruneError::Killed); }

	if parsed.verbose { print_summary(&input_paths, &stats); }

	Ok(())
}

/// # Print a Per-File Accounting.
///
/// Only shown with `-v`/`--verbose`; the log (`PruneLog`) already covers
/// removed/trimmed/skipped records as they happen.
fn print_summary(paths: &[PathBuf], stats: &AHashMap<FileHandle, PassStats>) {
	let mut entries: Vec<_> = stats.iter().collect();
	entries.sort_by_key(|(h, _)| h.index());

	let mut total_written = 0_u64;
	let mut total_removed = 0_u32;
	let mut total_trimmed = 0_u32;
	let mut total_split = 0_u32;

	for (h, s) in entries {
		let path = paths.get(h.index()).map_or("?", |p| p.to_str().unwrap_or("?"));
		eprintln!(
			"\x1b[1m{path}\x1b[0m: read {}, wrote {}, removed {}, trimmed {}, split {}, bytes {}",
			s.recs_read, s.recs_written, s.recs_removed, s.recs_trimmed, s.recs_split,
			NiceU64::from(s.bytes_written),
		);
		total_written += s.bytes_written;
		total_removed += s.recs_removed;
		total_trimmed += s.recs_trimmed;
		total_split += s.recs_split;
	}

	eprintln!(
		"\x1b[2mTotals: removed {total_removed}, trimmed {total_trimmed}, split {total_split}, {} bytes written.\x1b[0m",
		NiceU64::from(total_written),
	);
}

/// # Hook Up CTRL+C.
fn sigint(killed: Arc<AtomicBool>) {
	let _res = ctrlc::set_handler(move || {
		let _res = killed.compare_exchange(false, true, SeqCst, Relaxed);
	});
}
