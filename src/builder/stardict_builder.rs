//! StarDict encoder.
//!
//! Writes the four files of a StarDict 2.4.2 dictionary:
//!
//! - `.dict`: rendered article values, back to back
//! - `.idx`: `key\0`, big-endian `u32` offset, big-endian `u32` length, per article
//! - `.syn`: `alias\0`, big-endian `u32` article index, per alias
//! - `.ifo`: CRLF-terminated `key=value` metadata
//!
//! Index and synonym entries are sorted with
//! [`stardict_key_compare`](crate::utils::sort_key::stardict_key_compare),
//! the order StarDict readers binary-search with.

use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use crate::builder::dict_builder::BuildContext;
use crate::storage::{Article, Dictionary};
use crate::utils::io_utils::create_output_file;
use crate::utils::sort_key::get_sort_key;
use crate::{Result, DictError};

pub const IFO_MAGIC: &str = "StarDict's dict ifo file";
pub const STARDICT_VERSION: &str = "2.4.2";
/// Values are HTML fragments.
pub const SAME_TYPE_SEQUENCE: &str = "h";

/// Counters reported into the `.ifo` file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarDictStats {
    pub word_count: usize,
    pub syn_word_count: usize,
    pub idx_file_size: u64,
}

/// Encodes one [`Dictionary`] as StarDict.
pub struct StarDictBuilder<'a> {
    dict: &'a Dictionary,
    /// Articles in StarDict key order
    sorted: Vec<&'a Article>,
}

impl<'a> StarDictBuilder<'a> {
    pub fn new(dict: &'a Dictionary) -> Self {
        let mut sorted: Vec<&Article> = dict.articles().iter().collect();
        sorted.sort_by_cached_key(|a| (get_sort_key(a.stardict_key()), a.stardict_key().as_bytes().to_vec()));
        Self { dict, sorted }
    }

    /// Articles in the order they are written to `.idx`.
    pub fn sorted_articles(&self) -> &[&'a Article] {
        &self.sorted
    }

    /// Writes every article value to `dict_writer` and its index entry to
    /// `idx_writer`. Returns the number of bytes written to `.idx`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDataFormat` when the `.dict` data grows past 4 GiB,
    /// which 32-bit offsets cannot address.
    pub fn build_dict_and_idx<D: Write, I: Write>(&self, dict_writer: &mut D, idx_writer: &mut I) -> Result<u64> {
        let abbreviations = self.dict.abbreviations();
        let mut offset: u64 = 0;
        let mut idx_size: u64 = 0;

        for article in &self.sorted {
            let value = article.stardict_value(abbreviations);
            let data = value.as_bytes();
            dict_writer.write_all(data)?;

            let size = data.len() as u64;
            if offset + size > u32::MAX as u64 {
                return Err(DictError::invalid_data_format(format!(
                    "dict data exceeds 32-bit offsets at article {}",
                    article.key()
                )));
            }

            let key = article.stardict_key().as_bytes();
            idx_writer.write_all(key)?;
            idx_writer.write_u8(0)?;
            idx_writer.write_u32::<BigEndian>(offset as u32)?;
            idx_writer.write_u32::<BigEndian>(size as u32)?;

            offset += size;
            idx_size += key.len() as u64 + 9;
        }

        dict_writer.flush()?;
        idx_writer.flush()?;
        Ok(idx_size)
    }

    /// `(alias, article index)` pairs in StarDict key order.
    pub fn synonyms(&self) -> Vec<(&'a str, u32)> {
        let mut synonyms: Vec<(&str, u32)> = self
            .sorted
            .iter()
            .enumerate()
            .flat_map(|(index, article)| {
                article.stardict_synonyms().iter().map(move |alias| (alias.as_str(), index as u32))
            })
            .collect();
        synonyms.sort_by_cached_key(|(alias, index)| (get_sort_key(alias), alias.as_bytes().to_vec(), *index));
        synonyms
    }

    /// Writes the `.syn` entries. Returns the number of aliases written.
    pub fn build_syn<W: Write>(&self, syn_writer: &mut W) -> Result<usize> {
        let synonyms = self.synonyms();
        for (alias, index) in &synonyms {
            syn_writer.write_all(alias.as_bytes())?;
            syn_writer.write_u8(0)?;
            syn_writer.write_u32::<BigEndian>(*index)?;
        }
        syn_writer.flush()?;
        Ok(synonyms.len())
    }

    /// Writes the `.ifo` metadata lines.
    pub fn build_ifo<W: Write>(&self, ifo_writer: &mut W, stats: &StarDictStats) -> Result<()> {
        let meta = self.dict.meta();
        let lines = [
            IFO_MAGIC.to_string(),
            format!("version={}", STARDICT_VERSION),
            format!("bookname={}", single_line(self.dict.bookname())),
            format!("wordcount={}", stats.word_count),
            format!("synwordcount={}", stats.syn_word_count),
            format!("idxfilesize={}", stats.idx_file_size),
            format!("sametypesequence={}", SAME_TYPE_SEQUENCE),
            format!("author={}", single_line(&meta.authors.join(", "))),
            format!("description={}", single_line(&meta.description)),
            format!("date={}", self.dict.creation_date().format("%Y.%m.%d")),
        ];
        for line in &lines {
            write!(ifo_writer, "{}\r\n", line)?;
        }
        ifo_writer.flush()?;
        Ok(())
    }

    /// Writes `{id}.{direction}.StarDict.{dict,idx,syn,ifo}` into `output_dir`.
    pub fn save(&self, output_dir: &Path, ctx: &BuildContext) -> Result<StarDictStats> {
        let base_name = format!("{}.StarDict", self.dict.base_name());

        ctx.info(format_args!("Writing {} articles to {}.dict/.idx", self.sorted.len(), base_name));
        let mut dict_writer = create_output_file(output_dir, &format!("{}.dict", base_name))?;
        let mut idx_writer = create_output_file(output_dir, &format!("{}.idx", base_name))?;
        let idx_file_size = self.build_dict_and_idx(&mut dict_writer, &mut idx_writer)?;
        drop(dict_writer);
        drop(idx_writer);

        let mut syn_writer = create_output_file(output_dir, &format!("{}.syn", base_name))?;
        let syn_word_count = self.build_syn(&mut syn_writer)?;
        drop(syn_writer);
        ctx.debug(format_args!("Wrote {} synonyms", syn_word_count));

        let stats = StarDictStats {
            word_count: self.sorted.len(),
            syn_word_count,
            idx_file_size,
        };
        let mut ifo_writer = create_output_file(output_dir, &format!("{}.ifo", base_name))?;
        self.build_ifo(&mut ifo_writer, &stats)?;
        ctx.info(format_args!("StarDict done: {:?}", stats));
        Ok(stats)
    }
}

fn single_line(s: &str) -> String {
    s.split(['\r', '\n']).map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join(" ")
}
