//! Abbreviations used in definitions, such as `n.` (noun) or `Gram.` (grammar).
//!
//! Abbreviations are tagged inside article values and listed in the XDXF
//! `<abbreviations>` table.

use serde::{Deserialize, Serialize};

use crate::utils::string_utils::{capitalize_first, escape_for_xml, wrap_in_tag};
use crate::{Result, DictError};

/// Abbreviation category, mirrored by the XDXF `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AbbreviationType {
    #[default]
    None,
    Grammatical,
    Stylistic,
    Knowledge,
    Auxiliary,
    Other,
}

impl AbbreviationType {
    /// XDXF short code; `None` has no code and the attribute is omitted.
    pub fn xdxf_code(&self) -> Option<&'static str> {
        match self {
            AbbreviationType::None => None,
            AbbreviationType::Grammatical => Some("grm"),
            AbbreviationType::Stylistic => Some("stl"),
            AbbreviationType::Knowledge => Some("knl"),
            AbbreviationType::Auxiliary => Some("aux"),
            AbbreviationType::Other => Some("oth"),
        }
    }
}

/// Serializable form of an abbreviation as handed over by the input layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbbreviationDef {
    pub key: String,
    pub expansion: String,
    #[serde(default)]
    pub category: AbbreviationType,
}

/// One abbreviation of a dictionary. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Abbreviation {
    key: String,
    expansion: String,
    category: AbbreviationType,
}

impl Abbreviation {
    /// Creates an abbreviation; key and expansion are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the key or the expansion is empty.
    pub fn new(key: &str, expansion: &str, category: AbbreviationType) -> Result<Self> {
        let key = key.trim();
        let expansion = expansion.trim();
        if key.is_empty() {
            return Err(DictError::invalid_parameter("abbreviation key"));
        }
        if expansion.is_empty() {
            return Err(DictError::invalid_parameter(format!("expansion of abbreviation {}", key)));
        }
        Ok(Self {
            key: key.to_string(),
            expansion: expansion.to_string(),
            category,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn expansion(&self) -> &str {
        &self.expansion
    }

    pub fn category(&self) -> AbbreviationType {
        self.category
    }

    pub fn is_grammatical(&self) -> bool {
        self.category == AbbreviationType::Grammatical
    }

    /// The key with its first letter capitalized, when the key starts
    /// lowercase and is longer than one character (`adj.` → `Adj.`).
    pub fn capitalized_key(&self) -> Option<String> {
        let first = self.key.chars().next()?;
        if first.is_lowercase() && self.key.chars().count() > 1 {
            Some(capitalize_first(&self.key))
        } else {
            None
        }
    }

    /// The key followed by its capitalized variant, if any.
    pub fn variants(&self) -> Vec<String> {
        let mut variants = vec![self.key.clone()];
        variants.extend(self.capitalized_key());
        variants
    }

    /// `<abbr_k>` element(s) for the XDXF abbreviation table.
    pub fn xdxf_key(&self) -> String {
        self.variants()
            .iter()
            .map(|variant| wrap_in_tag(&escape_for_xml(variant), "abbr_k"))
            .collect()
    }

    /// `<abbr_v>` element for the XDXF abbreviation table.
    pub fn xdxf_value(&self) -> String {
        wrap_in_tag(&escape_for_xml(&self.expansion), "abbr_v")
    }
}

impl TryFrom<&AbbreviationDef> for Abbreviation {
    type Error = DictError;

    fn try_from(def: &AbbreviationDef) -> Result<Self> {
        Abbreviation::new(&def.key, &def.expansion, def.category)
    }
}
