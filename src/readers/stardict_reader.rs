//! StarDict dictionary reader.
//!
//! Loads a `.ifo`/`.idx`/`.syn`/`.dict` set fully into memory, checks the
//! counts declared in `.ifo` against the index files, and looks words up by
//! binary search in StarDict key order.
//!
//! # Examples
//!
//! ```no_run
//! use hawdict::readers::StarDictReader;
//!
//! # fn main() -> hawdict::Result<()> {
//! let reader = StarDictReader::open("output/PukuiElbert", "PukuiElbert.HawToEng.StarDict")?;
//! if let Some(definition) = reader.lookup("aloha")? {
//!     println!("{}", definition);
//! }
//! # Ok(())
//! # }
//! ```

use std::cmp::Ordering;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use indexmap::IndexMap;
use log::*;

use crate::builder::stardict_builder::IFO_MAGIC;
use crate::utils::sort_key::stardict_key_compare;
use crate::{Result, DictError};

/// One `.idx` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarDictIndexEntry {
    pub key: String,
    pub offset: u32,
    pub size: u32,
}

/// In-memory StarDict dictionary.
#[derive(Debug)]
pub struct StarDictReader {
    info: IndexMap<String, String>,
    entries: Vec<StarDictIndexEntry>,
    /// `(alias, entry index)` in `.syn` order
    synonyms: Vec<(String, u32)>,
    data: Vec<u8>,
}

impl StarDictReader {
    /// Opens `{base_name}.ifo`, `.idx`, `.syn` (optional) and `.dict` in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDataFormat` when the `.ifo` magic line is missing,
    /// a record is truncated, a declared count or size does not match the
    /// files, or an entry points outside `.dict`.
    pub fn open<P: AsRef<Path>>(dir: P, base_name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let ifo = fs::read_to_string(dir.join(format!("{}.ifo", base_name)))?;
        let info = parse_ifo(&ifo)?;

        let idx = fs::read(dir.join(format!("{}.idx", base_name)))?;
        let entries = parse_idx(&idx)?;

        let syn_path = dir.join(format!("{}.syn", base_name));
        let synonyms = if syn_path.is_file() {
            parse_syn(&fs::read(&syn_path)?)?
        } else {
            Vec::new()
        };

        let data = fs::read(dir.join(format!("{}.dict", base_name)))?;

        let reader = Self { info, entries, synonyms, data };
        reader.validate(idx.len() as u64)?;
        debug!(
            "Opened {}: {} words, {} synonyms",
            base_name,
            reader.entries.len(),
            reader.synonyms.len()
        );
        Ok(reader)
    }

    fn validate(&self, idx_file_size: u64) -> Result<()> {
        let declared = |key: &str| -> Result<u64> {
            match self.info.get(key) {
                Some(value) => value
                    .parse::<u64>()
                    .map_err(|e| DictError::invalid_data_format(format!("ifo {}={}: {}", key, value, e))),
                None => Ok(0),
            }
        };

        if declared("wordcount")? != self.entries.len() as u64 {
            return Err(DictError::invalid_data_format(format!(
                "wordcount mismatch: ifo says {}, idx has {}",
                declared("wordcount")?,
                self.entries.len()
            )));
        }
        if declared("synwordcount")? != self.synonyms.len() as u64 {
            return Err(DictError::invalid_data_format(format!(
                "synwordcount mismatch: ifo says {}, syn has {}",
                declared("synwordcount")?,
                self.synonyms.len()
            )));
        }
        if declared("idxfilesize")? != idx_file_size {
            return Err(DictError::invalid_data_format(format!(
                "idxfilesize mismatch: ifo says {}, idx is {} bytes",
                declared("idxfilesize")?,
                idx_file_size
            )));
        }
        for entry in &self.entries {
            if entry.offset as u64 + entry.size as u64 > self.data.len() as u64 {
                return Err(DictError::invalid_data_format(format!("entry {} points outside dict", entry.key)));
            }
        }
        for (alias, index) in &self.synonyms {
            if *index as usize >= self.entries.len() {
                return Err(DictError::invalid_data_format(format!("synonym {} points to entry {}", alias, index)));
            }
        }
        Ok(())
    }

    /// Value of an `.ifo` field.
    pub fn info(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    pub fn bookname(&self) -> &str {
        self.info("bookname").unwrap_or_default()
    }

    pub fn word_count(&self) -> usize {
        self.entries.len()
    }

    pub fn syn_word_count(&self) -> usize {
        self.synonyms.len()
    }

    /// Index records in file order.
    pub fn entries(&self) -> &[StarDictIndexEntry] {
        &self.entries
    }

    pub fn synonyms(&self) -> &[(String, u32)] {
        &self.synonyms
    }

    /// Definition of the entry at `index` in `.idx` order.
    pub fn definition(&self, index: usize) -> Result<String> {
        let entry = self
            .entries
            .get(index)
            .ok_or_else(|| DictError::invalid_parameter(format!("entry index {}", index)))?;
        let start = entry.offset as usize;
        let end = start + entry.size as usize;
        Ok(std::str::from_utf8(&self.data[start..end])?.to_string())
    }

    /// Finds `word` among the index keys, then among the synonyms.
    pub fn lookup(&self, word: &str) -> Result<Option<String>> {
        if let Some(index) = binary_search_first(&self.entries, word, |e| &e.key) {
            return self.definition(index).map(Some);
        }
        if let Some(syn_index) = binary_search_first(&self.synonyms, word, |(alias, _)| alias) {
            let (_, index) = &self.synonyms[syn_index];
            return self.definition(*index as usize).map(Some);
        }
        Ok(None)
    }
}

/// Leftmost position of `key` in `items`, sorted by [`stardict_key_compare`].
fn binary_search_first<T, F>(items: &[T], key: &str, key_of: F) -> Option<usize>
where
    F: Fn(&T) -> &String,
{
    let mut left = 0;
    let mut right = items.len();
    let mut found_index = None;

    while left < right {
        let mid = (left + right) / 2;
        match stardict_key_compare(key_of(&items[mid]), key) {
            Ordering::Less => left = mid + 1,
            Ordering::Greater => right = mid,
            Ordering::Equal => {
                found_index = Some(mid);
                right = mid;
            }
        }
    }
    found_index
}

fn parse_ifo(ifo: &str) -> Result<IndexMap<String, String>> {
    let mut lines = ifo.lines().map(|l| l.trim_end_matches('\r'));
    if lines.next().map(|l| l.trim_start_matches('\u{FEFF}')) != Some(IFO_MAGIC) {
        return Err(DictError::invalid_data_format("missing StarDict ifo magic line"));
    }

    let mut info = IndexMap::new();
    for line in lines.filter(|l| !l.trim().is_empty()) {
        let Some((key, value)) = line.split_once('=') else {
            return Err(DictError::invalid_data_format(format!("malformed ifo line: {}", line)));
        };
        info.insert(key.trim().to_string(), value.to_string());
    }
    Ok(info)
}

fn read_cstring(cursor: &mut Cursor<&[u8]>) -> Result<String> {
    let data = *cursor.get_ref();
    let start = cursor.position() as usize;
    let len = data[start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| DictError::invalid_data_format(format!("unterminated key at byte {}", start)))?;
    let key = std::str::from_utf8(&data[start..start + len])?.to_string();
    cursor.set_position((start + len + 1) as u64);
    Ok(key)
}

fn truncated(e: std::io::Error) -> DictError {
    DictError::invalid_data_format(format!("truncated record: {}", e))
}

fn parse_idx(idx: &[u8]) -> Result<Vec<StarDictIndexEntry>> {
    let mut cursor = Cursor::new(idx);
    let mut entries = Vec::new();
    while (cursor.position() as usize) < idx.len() {
        let key = read_cstring(&mut cursor)?;
        let offset = cursor.read_u32::<BigEndian>().map_err(truncated)?;
        let size = cursor.read_u32::<BigEndian>().map_err(truncated)?;
        entries.push(StarDictIndexEntry { key, offset, size });
    }
    Ok(entries)
}

fn parse_syn(syn: &[u8]) -> Result<Vec<(String, u32)>> {
    let mut cursor = Cursor::new(syn);
    let mut synonyms = Vec::new();
    while (cursor.position() as usize) < syn.len() {
        let alias = read_cstring(&mut cursor)?;
        let index = cursor.read_u32::<BigEndian>().map_err(truncated)?;
        synonyms.push((alias, index));
    }
    Ok(synonyms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Write;

    fn idx_record(key: &str, offset: u32, size: u32) -> Vec<u8> {
        let mut record = Vec::new();
        record.write_all(key.as_bytes()).unwrap();
        record.write_u8(0).unwrap();
        record.write_u32::<BigEndian>(offset).unwrap();
        record.write_u32::<BigEndian>(size).unwrap();
        record
    }

    fn write_files(dir: &Path, ifo_counts: (usize, usize, Option<usize>)) {
        let mut idx = idx_record("Aloha", 0, 5);
        idx.extend(idx_record("aloha", 5, 4));
        idx.extend(idx_record("wai", 9, 5));
        let mut syn = Vec::new();
        syn.write_all(b"love\0").unwrap();
        syn.write_u32::<BigEndian>(1).unwrap();

        let (word_count, syn_count, idx_size) = ifo_counts;
        let ifo = format!(
            "StarDict's dict ifo file\r\nversion=2.4.2\r\nbookname=Test\r\nwordcount={}\r\nsynwordcount={}\r\nidxfilesize={}\r\nsametypesequence=h\r\n",
            word_count,
            syn_count,
            idx_size.unwrap_or(idx.len())
        );
        fs::write(dir.join("t.ifo"), ifo).unwrap();
        fs::write(dir.join("t.idx"), idx).unwrap();
        fs::write(dir.join("t.syn"), syn).unwrap();
        fs::write(dir.join("t.dict"), "HelloLoveWater").unwrap();
    }

    #[test]
    fn test_open_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), (3, 1, None));
        let reader = StarDictReader::open(dir.path(), "t").unwrap();

        assert_eq!(reader.bookname(), "Test");
        assert_eq!(reader.info("sametypesequence"), Some("h"));
        assert_eq!(reader.word_count(), 3);
        assert_eq!(reader.syn_word_count(), 1);
        assert_eq!(reader.lookup("Aloha").unwrap().as_deref(), Some("Hello"));
        assert_eq!(reader.lookup("aloha").unwrap().as_deref(), Some("Love"));
        assert_eq!(reader.lookup("wai").unwrap().as_deref(), Some("Water"));
        assert_eq!(reader.lookup("love").unwrap().as_deref(), Some("Love"));
        assert_eq!(reader.lookup("ALOHA").unwrap(), None);
        assert_eq!(reader.lookup("kai").unwrap(), None);
    }

    #[test]
    fn test_count_mismatches_are_rejected() {
        for counts in [(2, 1, None), (3, 0, None), (3, 1, Some(1))] {
            let dir = tempfile::tempdir().unwrap();
            write_files(dir.path(), counts);
            let result = StarDictReader::open(dir.path(), "t");
            assert!(matches!(result, Err(DictError::InvalidDataFormat { .. })), "counts {:?}", counts);
        }
    }

    #[test]
    fn test_malformed_files_are_rejected() {
        assert!(parse_ifo("not a dictionary\r\n").is_err());
        assert!(parse_ifo("StarDict's dict ifo file\r\nbookname\r\n").is_err());
        assert!(parse_idx(b"key-without-terminator").is_err());
        assert!(parse_idx(b"key\0\0\0").is_err());
        assert!(parse_idx(b"").unwrap().is_empty());
    }

    #[test]
    fn test_binary_search_first() {
        let keys: Vec<String> = ["A", "a", "B", "b", "ʻai"].iter().map(|s| s.to_string()).collect();
        assert_eq!(binary_search_first(&keys, "a", |k| k), Some(1));
        assert_eq!(binary_search_first(&keys, "B", |k| k), Some(2));
        assert_eq!(binary_search_first(&keys, "ʻai", |k| k), Some(4));
        assert_eq!(binary_search_first(&keys, "c", |k| k), None);
    }
}
