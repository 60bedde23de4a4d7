// Core data structures for dictionary content
//
// This module provides the abbreviation, article and dictionary types that
// the output formats read from.

pub mod abbreviation;
pub mod article;
pub mod dictionary;

pub use abbreviation::{Abbreviation, AbbreviationDef, AbbreviationType};
pub use article::{Article, get_definitions};
pub use dictionary::{Dictionary, DictionaryMeta, TranslationDirection};
