// Utility functions and helpers
//
// This module provides text cleanup and markup helpers, the StarDict key
// ordering, and file helpers for output directories and clean-entry files.

pub mod string_utils;
pub mod sort_key;
pub mod io_utils;

pub use string_utils::{
    normalize_whitespace, fix_sentence_end, fix_sentence_spacing, remove_diacritics,
    replace_okina, escape_for_xml, wrap_in_tag, wrap_target_in_tag, OKINA, SYLLABLE_DOT,
};
pub use sort_key::{get_sort_key, stardict_key_compare};
pub use io_utils::{ensure_dir, create_output_file, read_clean_entries, write_clean_entries};
