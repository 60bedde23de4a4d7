//! Builder module for StarDict and XDXF dictionary creation
//!
//! This module contains the output encoders and the build units that turn
//! cleaned lexicon entries into dictionary files.

pub mod stardict_builder;
pub mod xdxf_builder;
pub mod output_format;
pub mod dict_builder;

// Re-export commonly used types for convenience
pub use stardict_builder::{StarDictBuilder, StarDictStats};
pub use xdxf_builder::XdxfBuilder;
pub use output_format::OutputFormat;
pub use dict_builder::{BuildContext, BuildManifest, BuilderConfig, DictBuilder, SourceDictionary};
