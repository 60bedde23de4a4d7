//! Dictionary articles and their XDXF / StarDict renderings.
//!
//! An article is one cleaned `(key, value)` pair. The key may list several
//! comma-separated headwords (`"hale, home"`); the value is free text that may
//! open with a grammar abbreviation and may hold numbered senses
//! (`"1. House. 2. Building."`).
//!
//! Rendering never mutates the article. The StarDict synonym set is computed
//! once at construction; markup is produced on demand from the abbreviation
//! table of the owning dictionary.
//!
//! # Examples
//!
//! ```
//! use hawdict::storage::{Abbreviation, AbbreviationType, Article};
//!
//! let article = Article::new("hale, home", "n. 1. House. 2. Building.").unwrap();
//! let abbreviations = vec![Abbreviation::new("n.", "noun", AbbreviationType::Grammatical).unwrap()];
//!
//! assert_eq!(article.xdxf_key(), "<k>hale</k><k>home</k>");
//! assert_eq!(
//!     article.stardict_value(&abbreviations),
//!     "<p><i>n.</i></p><p><b>1</b>. House.</p><p><b>2</b>. Building.</p>"
//! );
//! ```

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::abbreviation::Abbreviation;
use crate::utils::string_utils::{
    escape_for_xml, remove_diacritics, replace_okina, wrap_in_tag, wrap_target_in_tag, SYLLABLE_DOT,
};
use crate::{Result, DictError};

static BOLD_DEFINITION_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<p>([0-9]+)\. ").unwrap());
static PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"<p>(.*?)</p>").unwrap());
static FIRST_NUMBER_AFTER_PRETEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?[^>0-9])1\. ").unwrap());

/// Characters that may sit right before a standalone abbreviation.
const ABBR_LEADING: [char; 7] = [' ', '(', '[', ',', ';', '/', '\u{2014}'];
/// Characters that may sit right after a standalone abbreviation.
const ABBR_TRAILING: [char; 9] = [' ', ')', ']', ',', ';', ':', '/', '.', '\u{2014}'];

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    key: String,
    value: String,
    synonyms: IndexSet<String>,
}

impl Article {
    /// Creates an article; key and value are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the key or the value is empty.
    pub fn new(key: &str, value: &str) -> Result<Self> {
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(DictError::invalid_parameter("article key"));
        }
        if value.is_empty() {
            return Err(DictError::invalid_parameter(format!("value of article {}", key)));
        }
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
            synonyms: build_synonyms(key),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Primary StarDict index key: the key as written.
    pub fn stardict_key(&self) -> &str {
        &self.key
    }

    /// Extra StarDict lookup keys, in generation order. Never contains the
    /// primary key.
    pub fn stardict_synonyms(&self) -> &IndexSet<String> {
        &self.synonyms
    }

    /// One `<k>` element per comma-separated headword, with syllable dots and
    /// periods marked `<opt>`.
    pub fn xdxf_key(&self) -> String {
        self.key
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|k| {
                let k = escape_for_xml(k);
                let k = wrap_target_in_tag(&k, SYLLABLE_DOT, "opt");
                let k = wrap_target_in_tag(&k, ".", "opt");
                wrap_in_tag(&k, "k")
            })
            .collect()
    }

    /// XDXF `<def>` markup, definition numbers stripped.
    pub fn xdxf_value(&self, abbreviations: &[Abbreviation]) -> String {
        self.render_xdxf_value(abbreviations, false)
    }

    /// HTML fragment for a StarDict `h` record.
    pub fn stardict_value(&self, abbreviations: &[Abbreviation]) -> String {
        let value = self
            .render_xdxf_value(abbreviations, true)
            .replace("<gr>", "<p>")
            .replace("</gr>", "</p>")
            .replace("<abbr>", "<i>")
            .replace("</abbr>", "</i>")
            .replace("<def>", "")
            .replace("</def>", "")
            .replace("<deftext>", "<p>")
            .replace("</deftext>", "</p>");

        let value = BOLD_DEFINITION_NUMBER.replace_all(&value, "<p><b>$1</b>. ").into_owned();

        if value.contains("<b>2</b>. ") && !value.contains("<b>1</b>. ") {
            // "1." preceded by some pre-text inside its paragraph
            let mut fixed = false;
            return PARAGRAPH
                .replace_all(&value, |caps: &Captures| {
                    let inner = &caps[1];
                    if !fixed && FIRST_NUMBER_AFTER_PRETEXT.is_match(inner) {
                        fixed = true;
                        let inner = FIRST_NUMBER_AFTER_PRETEXT.replace(inner, "$1<b>1</b>. ");
                        format!("<p>{}</p>", inner)
                    } else {
                        caps[0].to_string()
                    }
                })
                .into_owned();
        }

        value
    }

    fn render_xdxf_value(&self, abbreviations: &[Abbreviation], keep_definition_numbers: bool) -> String {
        let mut value = escape_for_xml(&self.value);

        for abbreviation in abbreviations {
            for variant in abbreviation.variants() {
                value = add_abbreviation_tags(&value, &escape_for_xml(&variant));
            }
        }

        let (grammar, body) = split_grammar(&value, abbreviations);
        let definitions = get_definitions(body, keep_definition_numbers);

        if definitions.len() > 1 {
            format!(
                "<def>{}<def><deftext>{}</deftext></def></def>",
                grammar,
                definitions.join("</deftext></def><def><deftext>")
            )
        } else {
            format!("<def>{}<deftext>{}</deftext></def>", grammar, definitions.concat())
        }
    }
}

/// Lookup aliases for every comma-separated headword of `key`.
fn build_synonyms(key: &str) -> IndexSet<String> {
    let mut synonyms = IndexSet::new();
    for sub_key in key.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        synonyms.insert(sub_key.to_string());

        let bare = sub_key.replace(SYLLABLE_DOT, "").replace(['.', '*', '-'], "");
        let plain = remove_diacritics(&bare);

        synonyms.insert(replace_okina(&bare, "'"));
        synonyms.insert(replace_okina(&bare, ""));
        synonyms.insert(replace_okina(&plain, "'"));
        synonyms.insert(replace_okina(&plain, ""));
        synonyms.insert(plain);
        synonyms.insert(bare);
    }
    synonyms.shift_remove(key);
    synonyms.retain(|s| !s.trim().is_empty());
    synonyms
}

/// Wraps every standalone occurrence of `abbreviation` in `<abbr>`.
///
/// An occurrence is standalone when it starts the value or follows one of
/// [`ABBR_LEADING`], and ends the value or precedes one of [`ABBR_TRAILING`].
fn add_abbreviation_tags(value: &str, abbreviation: &str) -> String {
    if abbreviation.is_empty() {
        return value.to_string();
    }

    let mut tagged = String::with_capacity(value.len() + 16);
    let mut last = 0;
    for (start, _) in value.match_indices(abbreviation) {
        let end = start + abbreviation.len();
        let leading_ok = value[..start].chars().next_back().is_none_or(|c| ABBR_LEADING.contains(&c));
        let trailing_ok = value[end..].chars().next().is_none_or(|c| ABBR_TRAILING.contains(&c));
        if leading_ok && trailing_ok {
            tagged.push_str(&value[last..start]);
            tagged.push_str("<abbr>");
            tagged.push_str(abbreviation);
            tagged.push_str("</abbr>");
            last = end;
        }
    }
    tagged.push_str(&value[last..]);
    tagged
}

/// Hoists grammatical abbreviations at the very start of `value` into a
/// `<gr>` prefix. Returns the prefix (possibly empty) and the remaining text.
fn split_grammar<'a>(value: &'a str, abbreviations: &[Abbreviation]) -> (String, &'a str) {
    let tags: Vec<String> = abbreviations
        .iter()
        .filter(|a| a.is_grammatical())
        .flat_map(|a| a.variants())
        .map(|v| wrap_in_tag(&escape_for_xml(&v), "abbr"))
        .flat_map(|tag| [format!("({})", tag), tag])
        .collect();

    let mut hoisted: Vec<&str> = Vec::new();
    let mut rest = value;
    'scan: loop {
        for tag in &tags {
            if let Some(after) = rest.strip_prefix(tag.as_str()) {
                if !after.starts_with(char::is_whitespace) {
                    break 'scan;
                }
                let after = after.trim_start();
                if after.is_empty() {
                    break 'scan;
                }
                hoisted.push(&rest[..tag.len()]);
                rest = after;
                continue 'scan;
            }
        }
        break;
    }

    if hoisted.is_empty() {
        (String::new(), value)
    } else {
        (wrap_in_tag(&hoisted.join(" "), "gr"), rest)
    }
}

/// Splits `value` into its numbered senses.
///
/// Senses are introduced by `"1. "`, `"2. "`, …; each runs until the next
/// `" N. "` marker. Text before `"1. "` belongs to the first sense. A marker
/// only counts at the start of the text or after a space. Without a `"1. "`
/// marker the whole value is a single sense.
pub fn get_definitions(value: &str, keep_definition_numbers: bool) -> Vec<String> {
    let mut definitions = Vec::new();
    let mut rest = value;
    let mut num = 1;

    loop {
        let marker = format!("{}. ", num);
        let next_marker = format!(" {}. ", num + 1);

        let found = find_marker(rest, &marker);
        let next = found.and_then(|f| rest[f + 1..].find(&next_marker).map(|n| n + f + 1));

        match (found, next) {
            (Some(found), Some(next)) if num == 1 || found == 0 => {
                let definition = if keep_definition_numbers {
                    rest[..next].to_string()
                } else {
                    format!("{}{}", &rest[..found], &rest[found + marker.len()..next])
                };
                definitions.push(definition.trim().to_string());
                // Skip the space; the next sense starts at its own marker.
                rest = &rest[next + 1..];
                num += 1;
            }
            (Some(0), None) => {
                let definition = if keep_definition_numbers { rest } else { &rest[marker.len()..] };
                definitions.push(definition.trim().to_string());
                break;
            }
            _ => {
                definitions.push(rest.trim().to_string());
                break;
            }
        }
    }

    definitions
}

// First `marker` at the start of `s` or right after a space, so "1. " never
// matches inside "11. ".
fn find_marker(s: &str, marker: &str) -> Option<usize> {
    s.match_indices(marker)
        .map(|(pos, _)| pos)
        .find(|&pos| pos == 0 || s[..pos].ends_with(' '))
}
