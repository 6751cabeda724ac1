/*!
# Mseedprune: Library
*/

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
	unsafe_code,
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

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]

mod abort;
mod channel;
mod codec;
mod engine;
mod error;
mod record;
mod time;
mod trace;

pub use abort::KillSwitch;
pub use channel::ChannelId;
pub use codec::{
	raise_open_files,
	ArchiveSink,
	MseedCodec,
	RecordHeader,
	RepackSink,
	UnpackedRecord,
};
pub use engine::{
	log::PruneLog,
	opts::{
		PruneMode,
		PruneOptions,
		SplitBoundary,
	},
	pass::{
		PassContext,
		PassState,
		PassStats,
		MIN_SCRATCH,
	},
	reader::RecordSelector,
	writer::{
		CombinedSink,
		FileTable,
		PassSink,
		ReplaceInputSink,
	},
	Engine,
};
pub use error::MseedPruneError;
pub use record::{
	FileHandle,
	RecordDescriptor,
	RecordHandle,
	RecordMap,
};
pub use time::{
	sample_period_ticks,
	within_time_tolerance,
	Hpt,
	Quality,
	HPTMODULUS,
	HPT_UNSET,
};
pub use trace::{
	Trace,
	TraceGroup,
	TraceHandle,
	Whence,
};
