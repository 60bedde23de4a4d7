// Readers for generated dictionary files
//
// This module provides read-back of StarDict dictionaries, used to verify
// the files written by the builders.

pub mod stardict_reader;

pub use stardict_reader::{StarDictIndexEntry, StarDictReader};
