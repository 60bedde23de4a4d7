//! String helpers used to clean lexicon text and to assemble dictionary markup.
//!
//! Everything here is a pure function of its input. The helpers know about
//! Hawaiian orthography: macronized vowels (ā ē ī ō ū) are ordinary letters,
//! and the ʻokina (U+02BB) is treated as a letter as well.
//!
//! # Examples
//!
//! ```
//! use hawdict::utils::string_utils::{fix_sentence_end, remove_diacritics, replace_okina};
//!
//! assert_eq!(fix_sentence_end("house,").unwrap(), "house.");
//! assert_eq!(remove_diacritics("pōʻai"), "poʻai");
//! assert_eq!(replace_okina("pōʻai", "'"), "pō'ai");
//! ```

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::{Result, DictError};

/// The Hawaiian glottal stop.
pub const OKINA: &str = "\u{02BB}";

/// Syllable separator used in headwords.
pub const SYLLABLE_DOT: &str = "\u{00B7}";

/// Characters that already close a sentence.
const SENTENCE_TERMINATORS: [char; 8] = ['!', '?', '.', ')', ']', '"', '\u{201D}', '\u{2026}'];

// Acronyms such as "P.M." or "e.g." glued to the following word.
static ACRONYM_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b((?:[\p{L}ʻ]\.){2,})([\p{L}ʻ])").unwrap()
});

// List separators glued to the following word.
static SEPARATOR_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([,;:])([\p{L}ʻ])").unwrap()
});

// Sentence punctuation glued to a capitalized word. Group 1 is the word
// before the punctuation.
static SENTENCE_SPACING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^\s.!?]*)([.!?]+)(ʻ?\p{Lu})").unwrap()
});

// Titles ("Dr", "Mrs", "St") and single capitals of an acronym keep their
// period glued to the next word.
static TITLE_ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\p{Lu}|Dr|Mrs?|Ms|St|Mt|Jr|Sr)$").unwrap()
});

/// Collapses every run of whitespace, newlines included, into one space and trims.
///
/// # Errors
///
/// Returns `InvalidParameter` when the input is empty or only whitespace.
pub fn normalize_whitespace(s: &str) -> Result<String> {
    if s.trim().is_empty() {
        return Err(DictError::invalid_parameter("normalize_whitespace: empty input"));
    }
    Ok(s.split_whitespace().collect::<Vec<&str>>().join(" "))
}

/// Guarantees the text ends with terminal punctuation.
///
/// Text already ending in `! ? . ) ] " …` is returned unchanged. Trailing commas
/// are replaced by a period; anything else gets a period appended.
///
/// # Errors
///
/// Returns `InvalidParameter` when the input is empty or only whitespace.
pub fn fix_sentence_end(s: &str) -> Result<String> {
    let s = s.trim();
    let Some(last) = s.chars().last() else {
        return Err(DictError::invalid_parameter("fix_sentence_end: empty input"));
    };

    if SENTENCE_TERMINATORS.contains(&last) {
        return Ok(s.to_string());
    }

    let mut fixed = s.trim_end_matches(',').trim_end().to_string();
    fixed.push('.');
    Ok(fixed)
}

/// Inserts the missing space after punctuation glued to the next word.
///
/// Runs three passes in order: acronyms first, then list separators outside
/// parentheses, then sentence boundaries before a capital letter. Empty input
/// yields an empty string.
pub fn fix_sentence_spacing(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let s = ACRONYM_SPACING.replace_all(s, "$1 $2");

    let s = SEPARATOR_SPACING.replace_all(&s, |caps: &Captures| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if paren_depth(&s[..start]) > 0 {
            caps[0].to_string()
        } else {
            format!("{} {}", &caps[1], &caps[2])
        }
    });

    SENTENCE_SPACING
        .replace_all(&s, |caps: &Captures| {
            let word = &caps[1];
            if word.is_empty() || TITLE_ABBREVIATION.is_match(word) {
                caps[0].to_string()
            } else {
                format!("{}{} {}", word, &caps[2], &caps[3])
            }
        })
        .into_owned()
}

fn paren_depth(s: &str) -> i32 {
    s.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' if depth > 0 => depth - 1,
        _ => depth,
    })
}

/// Strips combining marks: decomposes, drops the marks, recomposes.
pub fn remove_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

/// Replaces every ʻokina with `replacement` and trims the result.
pub fn replace_okina(s: &str, replacement: &str) -> String {
    s.replace(OKINA, replacement).trim().to_string()
}

/// Escapes `&`, `<` and `>` and trims. Quotes are left as they are.
pub fn escape_for_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .trim()
        .to_string()
}

/// Wraps the whole string in `<tag>…</tag>`.
pub fn wrap_in_tag(s: &str, tag: &str) -> String {
    format!("<{tag}>{s}</{tag}>")
}

/// Wraps every occurrence of `target` inside `s` in `<tag>…</tag>` and trims.
pub fn wrap_target_in_tag(s: &str, target: &str, tag: &str) -> String {
    if target.is_empty() {
        return s.trim().to_string();
    }
    s.replace(target, &wrap_in_tag(target, tag)).trim().to_string()
}

/// Upper-cases the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t b\r\n c  ").unwrap(), "a b c");
        assert!(normalize_whitespace(" \n ").unwrap_err().is_invalid_parameter());
        assert!(normalize_whitespace("").is_err());
    }

    #[test]
    fn test_fix_sentence_end() {
        let cases = [
            ("word,", "word."),
            ("word,,", "word."),
            ("word", "word."),
            ("word.", "word."),
            ("word!", "word!"),
            ("word?", "word?"),
            ("(see hale)", "(see hale)"),
            ("\"quoted\"", "\"quoted\""),
            ("and so on…", "and so on…"),
            ("pōʻai", "pōʻai."),
        ];
        for (input, expected) in cases {
            assert_eq!(fix_sentence_end(input).unwrap(), expected, "fix_sentence_end({:?})", input);
        }
        assert!(fix_sentence_end("   ").is_err());
    }

    #[test]
    fn test_fix_sentence_spacing_changes() {
        let cases = [
            ("at 3 P.M.and later", "at 3 P.M. and later"),
            ("house,building", "house, building"),
            ("house;building", "house; building"),
            ("see:hale", "see: hale"),
            ("a house.A building.", "a house. A building."),
            ("to go.ʻAʻole", "to go. ʻAʻole"),
            ("kapa,ʻahu", "kapa, ʻahu"),
            ("loa.Ōlelo", "loa. Ōlelo"),
        ];
        for (input, expected) in cases {
            assert_eq!(fix_sentence_spacing(input), expected, "fix_sentence_spacing({:?})", input);
        }
    }

    #[test]
    fn test_fix_sentence_spacing_okina_and_short_words() {
        let cases = [
            ("He kaʻa.Ke kaʻa.", "He kaʻa. Ke kaʻa."),
            ("ʻAe.Ka hale.", "ʻAe. Ka hale."),
            ("Ua hele i.Ka hale.", "Ua hele i. Ka hale."),
            ("Ma 1990.The end.", "Ma 1990. The end."),
            ("ka poʻo!ʻAʻole", "ka poʻo! ʻAʻole"),
            ("ʻO Ka.Hale nui.", "ʻO Ka. Hale nui."),
        ];
        for (input, expected) in cases {
            let once = fix_sentence_spacing(input);
            assert_eq!(once, expected, "fix_sentence_spacing({:?})", input);
            assert_eq!(fix_sentence_spacing(&once), once, "idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_fix_sentence_spacing_no_change() {
        let cases = [
            "",
            "A house. A building.",
            "Dr.Smith arrived.",
            "1,000 people at 10:30.",
            "(Gram. 8.5,ho'o)",
            "P.M. and later",
            "Mrs.Kealoha and St.Andrew",
        ];
        for input in cases {
            let once = fix_sentence_spacing(input);
            assert_eq!(once, input, "fix_sentence_spacing({:?})", input);
            assert_eq!(fix_sentence_spacing(&once), once, "idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_remove_diacritics_and_okina() {
        assert_eq!(remove_diacritics("āēīōū ĀĒĪŌŪ"), "aeiou AEIOU");
        assert_eq!(remove_diacritics("ʻōlelo"), "ʻolelo");
        assert_eq!(replace_okina("ʻōlelo", "'"), "'ōlelo");
        assert_eq!(replace_okina(" ʻōlelo ", ""), "ōlelo");
    }

    #[test]
    fn test_escape_and_wrap() {
        assert_eq!(escape_for_xml(" a & <b> \"c\" "), "a &amp; &lt;b&gt; \"c\"");
        assert_eq!(wrap_in_tag("hale", "k"), "<k>hale</k>");
        assert_eq!(wrap_target_in_tag("ha·le.", ".", "opt"), "ha·le<opt>.</opt>");
        assert_eq!(wrap_target_in_tag("pō·ʻai", SYLLABLE_DOT, "opt"), "pō<opt>·</opt>ʻai");
        assert_eq!(capitalize_first("adj."), "Adj.");
        assert_eq!(capitalize_first("ʻa"), "ʻa");
    }
}
