//! # hawdict - Hawaiian-English Dictionary Exporter
//!
//! This crate turns cleaned Hawaiian-English lexicon entries into dictionary
//! files for offline readers: StarDict (`.dict`, `.idx`, `.syn`, `.ifo`) and
//! XDXF (`.xdxf`).
//!
//! ## Features
//!
//! - **Text cleanup**: whitespace, sentence end and sentence spacing fixes aware of
//!   macronized vowels and the ʻokina
//! - **Article rendering**: abbreviation tagging, grammar prefixes and numbered senses
//! - **StarDict output**: indexes sorted in the order StarDict readers search with,
//!   plus diacritic- and ʻokina-free synonyms
//! - **XDXF output**: indented, well-formed XDXF 0.33 logical documents
//! - **Parallel builds**: independent dictionaries built side by side, failures
//!   reported per dictionary
//!
//! ## Quick Start
//!
//! ```no_run
//! use hawdict::builder::{BuilderConfig, DictBuilder, SourceDictionary};
//! use hawdict::storage::{AbbreviationDef, AbbreviationType, DictionaryMeta};
//!
//! # fn main() -> hawdict::Result<()> {
//! let source = SourceDictionary {
//!     id: "PukuiElbert".to_string(),
//!     meta: DictionaryMeta {
//!         title: "Pukui-Elbert".to_string(),
//!         authors: vec!["Mary Kawena Pukui".to_string(), "Samuel H. Elbert".to_string()],
//!         ..Default::default()
//!     },
//!     abbreviations: vec![AbbreviationDef {
//!         key: "n.".to_string(),
//!         expansion: "noun".to_string(),
//!         category: AbbreviationType::Grammatical,
//!     }],
//!     entries: vec![("hale, home".to_string(), "n. 1. House. 2. Building.".to_string())],
//!     ..Default::default()
//! };
//!
//! DictBuilder::new(BuilderConfig::default()).build_all(&[source])?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **Builders**: [`builder`] for the StarDict and XDXF encoders and build units
//! - **Readers**: [`readers`] for reading generated StarDict files back
//! - **Storage & core types**: [`storage`] for abbreviations, articles and dictionaries
//! - **Utilities**: [`utils`] for text cleanup, key ordering and file helpers
//!
//! ## Error Handling
//!
//! All fallible operations return a [`Result<T>`] type, where errors are represented by
//! [`DictError`]. The crate uses the `snafu` library for ergonomic error handling with
//! context and backtraces.
//!
//! ```
//! use hawdict::{Result, DictError};
//!
//! fn example() -> Result<String> {
//!     // Operations that may fail return Result<T>
//!     Ok("success".to_string())
//! }
//! ```

pub mod builder;
pub mod error;
pub mod readers;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use builder::{DictBuilder, OutputFormat};
pub use readers::StarDictReader;
pub use storage::{Article, Dictionary};

// Re-export error types for convenience
pub use error::{DictError, Result, UnitFailure, snafu};
