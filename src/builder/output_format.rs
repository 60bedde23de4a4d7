//! Output formats a dictionary can be saved as.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::builder::dict_builder::BuildContext;
use crate::builder::stardict_builder::StarDictBuilder;
use crate::builder::xdxf_builder::XdxfBuilder;
use crate::storage::Dictionary;
use crate::Result;

/// A supported dictionary file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// `.dict`, `.idx`, `.syn` and `.ifo` files
    StarDict,
    /// A single `.xdxf` XML file
    Xdxf,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::StarDict, OutputFormat::Xdxf];

    /// Writes `dict` in this format into `output_dir`.
    pub fn save(&self, dict: &Dictionary, output_dir: &Path, ctx: &BuildContext) -> Result<()> {
        match self {
            OutputFormat::StarDict => {
                StarDictBuilder::new(dict).save(output_dir, ctx)?;
            }
            OutputFormat::Xdxf => {
                XdxfBuilder::new(dict).save(output_dir, ctx)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Article, DictionaryMeta, TranslationDirection};

    #[test]
    fn test_save_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut dict = Dictionary::new("Unit", TranslationDirection::SourceToTarget, DictionaryMeta::default()).unwrap();
        dict.add_article(Article::new("wai", "Water.").unwrap());
        let ctx = BuildContext::new("Unit", "HawToEng");

        for format in OutputFormat::ALL {
            format.save(&dict, dir.path(), &ctx).unwrap();
        }
        for name in [
            "Unit.HawToEng.StarDict.dict",
            "Unit.HawToEng.StarDict.idx",
            "Unit.HawToEng.StarDict.syn",
            "Unit.HawToEng.StarDict.ifo",
            "Unit.HawToEng.dict.xdxf",
        ] {
            assert!(dir.path().join(name).is_file(), "missing {}", name);
        }
    }

    #[test]
    fn test_serde_names() {
        let formats: Vec<OutputFormat> = serde_json::from_str(r#"["StarDict", "Xdxf"]"#).unwrap();
        assert_eq!(formats, OutputFormat::ALL.to_vec());
    }
}
