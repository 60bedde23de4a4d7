//! Dictionary build orchestration.
//!
//! A *build unit* turns one [`SourceDictionary`] (cleaned entries, metadata
//! and abbreviations for one translation direction) into every configured
//! [`OutputFormat`]. Units share nothing and may run in parallel; a failing
//! unit never stops its siblings, and all failures are returned together as
//! [`DictError::AggregateFailure`].
//!
//! # Examples
//!
//! ```no_run
//! use hawdict::builder::{BuilderConfig, DictBuilder, SourceDictionary};
//!
//! # fn main() -> hawdict::Result<()> {
//! let mut config = BuilderConfig::default();
//! config.output_dir = "out".into();
//!
//! let source = SourceDictionary {
//!     id: "PukuiElbert".to_string(),
//!     entries: vec![("aloha".to_string(), "Love.".to_string())],
//!     ..Default::default()
//! };
//!
//! DictBuilder::new(config).build_all(&[source])?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::builder::output_format::OutputFormat;
use crate::error::UnitFailure;
use crate::storage::dictionary::direction_label;
use crate::storage::{Abbreviation, AbbreviationDef, Article, Dictionary, DictionaryMeta, TranslationDirection};
use crate::utils::io_utils::{ensure_dir, read_clean_entries, write_clean_entries};
use crate::utils::string_utils::{fix_sentence_end, fix_sentence_spacing, normalize_whitespace};
use crate::{Result, DictError};

/// Logging context of one build unit.
///
/// Every line is prefixed with the time elapsed since the unit started and
/// the unit label: `00:00:02 > PukuiElbert\HawToEng: message`.
#[derive(Debug, Clone)]
pub struct BuildContext {
    unit: String,
    started: Instant,
}

impl BuildContext {
    pub fn new(id: &str, direction: &str) -> Self {
        Self {
            unit: format!("{}\\{}", id, direction),
            started: Instant::now(),
        }
    }

    /// Unit label, `{id}\{direction}`.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn format_line<M: Display>(&self, message: M) -> String {
        format!("{} > {}: {}", format_elapsed(self.started.elapsed()), self.unit, message)
    }

    pub fn info<M: Display>(&self, message: M) {
        info!("{}", self.format_line(message));
    }

    pub fn debug<M: Display>(&self, message: M) {
        debug!("{}", self.format_line(message));
    }

    pub fn warn<M: Display>(&self, message: M) {
        warn!("{}", self.format_line(message));
    }

    pub fn error<M: Display>(&self, message: M) {
        error!("{}", self.format_line(message));
    }
}

/// `hh:mm:ss`, hours not wrapped at 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Configuration shared by all build units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Root output directory; each dictionary id gets a subdirectory
    pub output_dir: PathBuf,
    /// Formats written by every unit
    pub formats: Vec<OutputFormat>,
    /// Whether to write `{id}.{direction}.clean.txt` beside the outputs
    pub write_clean_file: bool,
    /// Run units on the rayon thread pool
    pub parallel: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            output_dir: PathBuf::from("output"),
            formats: OutputFormat::ALL.to_vec(),
            write_clean_file: true,
            parallel: true,
        }
    }
}

/// Input of one build unit.
///
/// Entries are taken from `entries_file` (a clean-entry file) followed by the
/// inline `entries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceDictionary {
    pub id: String,
    pub direction: TranslationDirection,
    pub meta: DictionaryMeta,
    pub abbreviations: Vec<AbbreviationDef>,
    pub entries: Vec<(String, String)>,
    pub entries_file: Option<PathBuf>,
    /// Run whitespace and sentence cleanup over every entry first
    pub fix_sentences: bool,
}

impl SourceDictionary {
    /// Label used in logs and failure reports, `{id}\{direction}`.
    pub fn unit_label(&self) -> String {
        format!("{}\\{}", self.id, direction_label(&self.meta, self.direction))
    }
}

/// A build configuration plus the dictionaries to build, as read from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildManifest {
    #[serde(default)]
    pub config: BuilderConfig,
    pub dictionaries: Vec<SourceDictionary>,
}

impl BuildManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Runs build units.
#[derive(Debug, Clone)]
pub struct DictBuilder {
    config: BuilderConfig,
}

impl DictBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Loads and cleans the entries of `source`.
    ///
    /// # Errors
    ///
    /// Fails when the entries file cannot be read, or when sentence fixing
    /// meets an empty key or value.
    pub fn load_entries(&self, source: &SourceDictionary, ctx: &BuildContext) -> Result<Vec<(String, String)>> {
        let mut entries = match &source.entries_file {
            Some(path) => {
                ctx.info(format_args!("Loading entries from {}", path.display()));
                read_clean_entries(path)?
            }
            None => Vec::new(),
        };
        entries.extend(source.entries.iter().cloned());

        if source.fix_sentences {
            ctx.debug("Fixing sentences");
            entries = entries
                .iter()
                .map(|(key, value)| -> Result<(String, String)> {
                    let key = normalize_whitespace(key)?;
                    let value = fix_sentence_spacing(&fix_sentence_end(&normalize_whitespace(value)?)?);
                    Ok((key, value))
                })
                .collect::<Result<Vec<_>>>()?;
        }

        ctx.info(format_args!("Loaded {} entries", entries.len()));
        Ok(entries)
    }

    /// Assembles the [`Dictionary`] of `source` from already loaded entries.
    pub fn prepare_dictionary(&self, source: &SourceDictionary, entries: &[(String, String)]) -> Result<Dictionary> {
        let mut dict = Dictionary::new(&source.id, source.direction, source.meta.clone())?;
        for def in &source.abbreviations {
            dict.add_abbreviation(Abbreviation::try_from(def)?);
        }
        for (key, value) in entries {
            dict.add_article(Article::new(key, value)?);
        }
        Ok(dict)
    }

    /// Runs one build unit and returns the directory written to.
    pub fn build_unit(&self, source: &SourceDictionary) -> Result<PathBuf> {
        let label = direction_label(&source.meta, source.direction);
        let ctx = BuildContext::new(&source.id, &label);
        ctx.info("Building");

        if source.id.trim().is_empty() {
            return Err(DictError::invalid_parameter("dictionary id"));
        }
        let output_dir = ensure_dir(self.config.output_dir.join(source.id.trim()))?;

        let entries = self.load_entries(source, &ctx)?;
        let dict = self.prepare_dictionary(source, &entries)?;

        if self.config.write_clean_file {
            let clean_file = output_dir.join(format!("{}.clean.txt", dict.base_name()));
            write_clean_entries(&clean_file, &entries)?;
            ctx.debug(format_args!("Wrote {}", clean_file.display()));
        }

        for format in &self.config.formats {
            ctx.info(format_args!("Saving {:?}", format));
            format.save(&dict, &output_dir, &ctx)?;
        }

        ctx.info("Done");
        Ok(output_dir)
    }

    /// Runs every unit, in parallel when configured.
    ///
    /// # Errors
    ///
    /// Returns `AggregateFailure` holding one [`UnitFailure`] per failed
    /// unit. Units that succeeded keep their output.
    pub fn build_all(&self, sources: &[SourceDictionary]) -> Result<()> {
        let run = |source: &SourceDictionary| (source.unit_label(), self.build_unit(source));
        let results: Vec<(String, Result<PathBuf>)> = if self.config.parallel {
            sources.par_iter().map(run).collect()
        } else {
            sources.iter().map(run).collect()
        };

        let failures: Vec<UnitFailure> = results
            .into_iter()
            .filter_map(|(unit, result)| match result {
                Ok(_) => None,
                Err(error) => {
                    error!("{} failed: {}", unit, error);
                    Some(UnitFailure { unit, error })
                }
            })
            .collect();

        if failures.is_empty() {
            info!("Built {} dictionaries", sources.len());
            Ok(())
        } else {
            Err(DictError::aggregate(failures))
        }
    }

    /// Builds everything listed in `manifest`.
    pub fn build_with_manifest(manifest: &BuildManifest) -> Result<()> {
        DictBuilder::new(manifest.config.clone()).build_all(&manifest.dictionaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::StarDictReader;
    use crate::storage::AbbreviationType;

    fn source(id: &str) -> SourceDictionary {
        SourceDictionary {
            id: id.to_string(),
            meta: DictionaryMeta {
                title: id.to_string(),
                ..Default::default()
            },
            abbreviations: vec![AbbreviationDef {
                key: "n.".to_string(),
                expansion: "noun".to_string(),
                category: AbbreviationType::Grammatical,
            }],
            entries: vec![
                ("hale, home".to_string(), "1. House. 2. Building.".to_string()),
                ("aloha".to_string(), "n. Love.".to_string()),
            ],
            ..Default::default()
        }
    }

    fn config(output_dir: &Path, parallel: bool) -> BuilderConfig {
        BuilderConfig {
            output_dir: output_dir.to_path_buf(),
            parallel,
            ..Default::default()
        }
    }

    #[test]
    fn test_context_line_format() {
        let ctx = BuildContext::new("PukuiElbert", "HawToEng");
        assert_eq!(ctx.unit(), "PukuiElbert\\HawToEng");
        assert_eq!(ctx.format_line("Done"), "00:00:00 > PukuiElbert\\HawToEng: Done");
        assert_eq!(format_elapsed(Duration::from_secs(3723)), "01:02:03");
        assert_eq!(format_elapsed(Duration::from_secs(90_000)), "25:00:00");
    }

    #[test]
    fn test_build_unit_writes_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let builder = DictBuilder::new(config(dir.path(), false));
        let output_dir = builder.build_unit(&source("Test")).unwrap();
        assert_eq!(output_dir, dir.path().join("Test"));

        for name in [
            "Test.HawToEng.clean.txt",
            "Test.HawToEng.StarDict.dict",
            "Test.HawToEng.StarDict.idx",
            "Test.HawToEng.StarDict.syn",
            "Test.HawToEng.StarDict.ifo",
            "Test.HawToEng.dict.xdxf",
        ] {
            assert!(output_dir.join(name).is_file(), "missing {}", name);
        }

        let reader = StarDictReader::open(&output_dir, "Test.HawToEng.StarDict").unwrap();
        assert_eq!(reader.word_count(), 2);
        assert_eq!(
            reader.lookup("hale").unwrap().as_deref(),
            Some("<p><b>1</b>. House.</p><p><b>2</b>. Building.</p>")
        );
    }

    #[test]
    fn test_build_unit_respects_formats_and_clean_flag() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuilderConfig {
            output_dir: dir.path().to_path_buf(),
            formats: vec![OutputFormat::Xdxf],
            write_clean_file: false,
            parallel: false,
        };
        let mut source = source("Only");
        source.direction = TranslationDirection::TargetToSource;
        let output_dir = DictBuilder::new(config).build_unit(&source).unwrap();
        assert!(output_dir.join("Only.EngToHaw.dict.xdxf").is_file());
        assert!(!output_dir.join("Only.EngToHaw.StarDict.idx").exists());
        assert!(!output_dir.join("Only.EngToHaw.clean.txt").exists());
    }

    #[test]
    fn test_fix_sentences_and_entries_file() {
        let dir = tempfile::tempdir().unwrap();
        let entries_file = dir.path().join("input.clean.txt");
        std::fs::write(&entries_file, "wai\tWater,\nkai\tSea.Ocean\n").unwrap();

        let mut source = source("Fix");
        source.entries = vec![("ʻai".to_string(), "  food\n and  eating ".to_string())];
        source.entries_file = Some(entries_file);
        source.fix_sentences = true;

        let builder = DictBuilder::new(config(&dir.path().join("out"), false));
        let ctx = BuildContext::new("Fix", "HawToEng");
        let entries = builder.load_entries(&source, &ctx).unwrap();
        assert_eq!(entries, vec![
            ("wai".to_string(), "Water.".to_string()),
            ("kai".to_string(), "Sea. Ocean.".to_string()),
            ("ʻai".to_string(), "food and eating.".to_string()),
        ]);

        let output_dir = builder.build_unit(&source).unwrap();
        let clean = read_clean_entries(output_dir.join("Fix.HawToEng.clean.txt")).unwrap();
        assert_eq!(clean, entries);
    }

    #[test]
    fn test_invalid_entry_fails_unit() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = source("Bad");
        source.entries.push(("kapa".to_string(), "   ".to_string()));
        let result = DictBuilder::new(config(dir.path(), false)).build_unit(&source);
        assert!(result.unwrap_err().is_invalid_parameter());
    }

    fn check_aggregate_failure(parallel: bool) {
        let dir = tempfile::tempdir().unwrap();
        let mut missing_file = source("Missing");
        missing_file.entries_file = Some(dir.path().join("does-not-exist.txt"));
        let sources = vec![source("Good"), source(""), missing_file];

        let error = DictBuilder::new(config(dir.path(), parallel)).build_all(&sources).unwrap_err();
        let failures = error.unit_failures();
        let mut units: Vec<&str> = failures.iter().map(|f| f.unit.as_str()).collect();
        units.sort();
        assert_eq!(units, vec!["Missing\\HawToEng", "\\HawToEng"]);
        assert!(failures.iter().any(|f| f.error.is_invalid_parameter()));
        assert!(failures.iter().any(|f| matches!(f.error, DictError::Io { .. })));
        assert!(error.to_string().starts_with("2 build unit(s) failed"));

        // The sibling unit still completed.
        assert!(dir.path().join("Good").join("Good.HawToEng.dict.xdxf").is_file());
    }

    #[test]
    fn test_build_all_collects_failures_in_parallel() {
        check_aggregate_failure(true);
    }

    #[test]
    fn test_build_all_collects_failures_sequentially() {
        check_aggregate_failure(false);
    }

    #[test]
    fn test_build_all_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut reverse = source("Test");
        reverse.direction = TranslationDirection::TargetToSource;
        let sources = vec![source("Test"), reverse];
        DictBuilder::new(config(dir.path(), true)).build_all(&sources).unwrap();
        assert!(dir.path().join("Test").join("Test.HawToEng.StarDict.ifo").is_file());
        assert!(dir.path().join("Test").join("Test.EngToHaw.StarDict.ifo").is_file());
    }

    #[test]
    fn test_manifest_from_json() {
        let manifest = BuildManifest::from_json(
            r#"{
                "config": { "output_dir": "dist", "formats": ["StarDict"], "parallel": false },
                "dictionaries": [
                    {
                        "id": "Andrews",
                        "direction": "TargetToSource",
                        "meta": { "title": "Andrews", "authors": ["Lorrin Andrews"] },
                        "abbreviations": [{ "key": "v.", "expansion": "verb", "category": "Grammatical" }],
                        "entries": [["aloha", "Love."]]
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.config.output_dir, PathBuf::from("dist"));
        assert_eq!(manifest.config.formats, vec![OutputFormat::StarDict]);
        assert!(manifest.config.write_clean_file);
        assert!(!manifest.config.parallel);

        let source = &manifest.dictionaries[0];
        assert_eq!(source.unit_label(), "Andrews\\EngToHaw");
        assert_eq!(source.abbreviations[0].category, AbbreviationType::Grammatical);
        assert_eq!(source.entries, vec![("aloha".to_string(), "Love.".to_string())]);
        assert!(!source.fix_sentences);

        assert!(BuildManifest::from_json("{").is_err());
    }
}
