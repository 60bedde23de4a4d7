//! The dictionary aggregate handed to the output formats.
//!
//! A [`Dictionary`] is built for one (source, direction) pair, filled with
//! abbreviations and articles, and then only read by the encoders.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::abbreviation::Abbreviation;
use super::article::Article;
use crate::{Result, DictError};

/// Version stamped into generated files as `file_ver`.
pub const FILE_VERSION_MAJOR: u32 = 0;
pub const FILE_VERSION_MINOR: u32 = 9;

/// Translation direction of a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranslationDirection {
    /// Source language to target language, e.g. Hawaiian to English
    #[default]
    SourceToTarget,
    /// Target language to source language
    TargetToSource,
}

/// Descriptive metadata of a source dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryMeta {
    /// Short title
    pub title: String,
    /// Long title; the short title is used when empty
    pub full_title: String,
    pub description: String,
    pub authors: Vec<String>,
    /// Where the lexicon was taken from
    pub source_url: String,
    /// Three-letter code of the source language
    pub source_lang: String,
    /// Three-letter code of the target language
    pub target_lang: String,
}

impl Default for DictionaryMeta {
    fn default() -> Self {
        DictionaryMeta {
            title: String::new(),
            full_title: String::new(),
            description: String::new(),
            authors: Vec::new(),
            source_url: String::new(),
            source_lang: "HAW".to_string(),
            target_lang: "ENG".to_string(),
        }
    }
}

/// One dictionary for one translation direction.
#[derive(Debug, Clone)]
pub struct Dictionary {
    id: String,
    direction: TranslationDirection,
    meta: DictionaryMeta,
    creation_date: DateTime<Utc>,
    articles: Vec<Article>,
    abbreviations: Vec<Abbreviation>,
}

impl Dictionary {
    /// Creates an empty dictionary stamped with the current UTC time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `id` is empty.
    pub fn new(id: &str, direction: TranslationDirection, meta: DictionaryMeta) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(DictError::invalid_parameter("dictionary id"));
        }
        Ok(Self {
            id: id.to_string(),
            direction,
            meta,
            creation_date: Utc::now(),
            articles: Vec::new(),
            abbreviations: Vec::new(),
        })
    }

    /// Replaces the creation timestamp.
    pub fn with_creation_date(mut self, creation_date: DateTime<Utc>) -> Self {
        self.creation_date = creation_date;
        self
    }

    pub fn add_article(&mut self, article: Article) {
        self.articles.push(article);
    }

    pub fn add_abbreviation(&mut self, abbreviation: Abbreviation) {
        self.abbreviations.push(abbreviation);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn direction(&self) -> TranslationDirection {
        self.direction
    }

    pub fn meta(&self) -> &DictionaryMeta {
        &self.meta
    }

    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    /// Articles in insertion order.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn abbreviations(&self) -> &[Abbreviation] {
        &self.abbreviations
    }

    pub fn lang_from(&self) -> &str {
        match self.direction {
            TranslationDirection::SourceToTarget => &self.meta.source_lang,
            TranslationDirection::TargetToSource => &self.meta.target_lang,
        }
    }

    pub fn lang_to(&self) -> &str {
        match self.direction {
            TranslationDirection::SourceToTarget => &self.meta.target_lang,
            TranslationDirection::TargetToSource => &self.meta.source_lang,
        }
    }

    /// Direction label used in file names and log lines, e.g. `HawToEng`.
    pub fn direction_label(&self) -> String {
        direction_label(&self.meta, self.direction)
    }

    /// Common prefix of every output file: `{id}.{direction}`.
    pub fn base_name(&self) -> String {
        format!("{}.{}", self.id, self.direction_label())
    }

    /// Display name: the full title, or the short title when that is empty.
    pub fn bookname(&self) -> &str {
        if self.meta.full_title.trim().is_empty() {
            &self.meta.title
        } else {
            &self.meta.full_title
        }
    }

    /// `file_ver` value for this dictionary's creation date.
    pub fn file_version(&self) -> String {
        file_version(FILE_VERSION_MAJOR, FILE_VERSION_MINOR, &self.creation_date)
    }
}

/// Formats `major.minor.build.revision`.
///
/// Released versions (major 1 or later with an odd minor) carry a build of
/// `1000 * yy + day_of_year` and a revision of `100 * hour + minute`; every
/// other version has both set to zero.
pub fn file_version(major: u32, minor: u32, at: &DateTime<Utc>) -> String {
    let (build, revision) = if major >= 1 && minor % 2 == 1 {
        let yy = (at.year() % 100) as u32;
        (1000 * yy + at.ordinal(), 100 * at.hour() + at.minute())
    } else {
        (0, 0)
    };
    format!("{}.{}.{:04}.{:04}", major, minor, build, revision)
}

/// `{From}To{To}` label for `direction`, e.g. `HawToEng` or `EngToHaw`.
pub fn direction_label(meta: &DictionaryMeta, direction: TranslationDirection) -> String {
    let (from, to) = match direction {
        TranslationDirection::SourceToTarget => (&meta.source_lang, &meta.target_lang),
        TranslationDirection::TargetToSource => (&meta.target_lang, &meta.source_lang),
    };
    format!("{}To{}", title_case(from), title_case(to))
}

fn title_case(code: &str) -> String {
    let lower = code.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta() -> DictionaryMeta {
        DictionaryMeta {
            title: "Pukui-Elbert".to_string(),
            full_title: "Hawaiian Dictionary (Pukui-Elbert)".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_direction_labels() {
        let dict = Dictionary::new("PukuiElbert", TranslationDirection::SourceToTarget, meta()).unwrap();
        assert_eq!(dict.lang_from(), "HAW");
        assert_eq!(dict.lang_to(), "ENG");
        assert_eq!(dict.direction_label(), "HawToEng");
        assert_eq!(dict.base_name(), "PukuiElbert.HawToEng");

        let dict = Dictionary::new("PukuiElbert", TranslationDirection::TargetToSource, meta()).unwrap();
        assert_eq!(dict.lang_from(), "ENG");
        assert_eq!(dict.direction_label(), "EngToHaw");
    }

    #[test]
    fn test_new_rejects_empty_id() {
        assert!(Dictionary::new(" ", TranslationDirection::SourceToTarget, meta()).unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_bookname_falls_back_to_title() {
        let dict = Dictionary::new("a", TranslationDirection::SourceToTarget, meta()).unwrap();
        assert_eq!(dict.bookname(), "Hawaiian Dictionary (Pukui-Elbert)");

        let mut short = meta();
        short.full_title.clear();
        let dict = Dictionary::new("a", TranslationDirection::SourceToTarget, short).unwrap();
        assert_eq!(dict.bookname(), "Pukui-Elbert");
    }

    #[test]
    fn test_file_version() {
        let at = Utc.with_ymd_and_hms(2024, 2, 3, 14, 5, 0).unwrap();
        assert_eq!(file_version(0, 9, &at), "0.9.0000.0000");
        assert_eq!(file_version(1, 2, &at), "1.2.0000.0000");
        assert_eq!(file_version(1, 3, &at), "1.3.24034.1405");

        let dict = Dictionary::new("a", TranslationDirection::SourceToTarget, meta())
            .unwrap()
            .with_creation_date(at);
        assert_eq!(dict.file_version(), "0.9.0000.0000");
    }

    #[test]
    fn test_meta_defaults_from_json() {
        let meta: DictionaryMeta = serde_json::from_str(r#"{"title": "Andrews"}"#).unwrap();
        assert_eq!(meta.title, "Andrews");
        assert_eq!(meta.source_lang, "HAW");
        assert_eq!(meta.target_lang, "ENG");
        assert!(meta.authors.is_empty());
    }
}
