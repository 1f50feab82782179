//! Documents: one file's front matter and body, snapshotted at sync time.
//!
//! # Front matter
//!
//! A document has front matter only when its first line is exactly `---`.
//! The block ends at the next line that is `---` or `...`:
//!
//! ```text
//! ---
//! description: Style guide
//! globs: src/**/*.rs
//! ---
//! body…
//! ```
//!
//! | Input                                 | Metadata | Body                  |
//! |---------------------------------------|----------|-----------------------|
//! | no opening `---`                      | none     | whole file            |
//! | opening `---`, no closing delimiter   | none     | whole file            |
//! | empty block                           | none     | after closing line    |
//! | YAML error / not a mapping            | none     | whole file            |
//! | YAML mapping                          | scalars  | after closing line    |

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde_yaml::Value;

use crate::error::{io_err, FrontMatterError, RenderError};

const BOM: &[u8] = b"\xEF\xBB\xBF";
const OPEN: &[u8] = b"---";
const CLOSE: [&[u8]; 2] = [b"---", b"..."];

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Raw front-matter fields in source order, keys in their original case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(Vec<(String, String)>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field (exact key match).
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut metadata = Metadata::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Snapshot of one physical file. Built fresh on every sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub metadata: Metadata,
    pub body: Vec<u8>,
}

impl Document {
    /// Read and parse the file at `path`.
    ///
    /// Only I/O failures are errors; unusable front matter degrades to
    /// "no metadata, whole file is body".
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
        let modified = meta.modified().map_err(|e| io_err(path, e))?;
        let data = std::fs::read(path).map_err(|e| io_err(path, e))?;
        Ok(Self::from_bytes(path, modified, &data))
    }

    /// Parse in-memory bytes as if read from `path` at `modified`.
    pub fn from_bytes(path: impl Into<PathBuf>, modified: SystemTime, data: &[u8]) -> Self {
        let path = path.into();
        let data = data.strip_prefix(BOM).unwrap_or(data);
        let (metadata, body) = match split_front_matter(data) {
            Ok((metadata, body)) => (metadata, body),
            Err(err) => {
                tracing::warn!(
                    "ignoring front matter of {}: {err}; treating whole file as body",
                    path.display()
                );
                (Metadata::new(), data)
            }
        };
        Self {
            path,
            modified,
            metadata,
            body: body.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split `data` into front-matter fields and body.
///
/// Returns `Err` only when a delimited block is present but unusable; the
/// caller decides how to degrade.
pub fn split_front_matter(data: &[u8]) -> Result<(Metadata, &[u8]), FrontMatterError> {
    let mut lines = Lines::new(data);
    match lines.next() {
        Some((line, _)) if line == OPEN => {}
        _ => return Ok((Metadata::new(), data)),
    }

    let yaml_start = lines.offset();
    let mut block = None;
    while let Some((line, line_start)) = lines.next() {
        if CLOSE.contains(&line) {
            block = Some((&data[yaml_start..line_start], &data[lines.offset()..]));
            break;
        }
    }
    let Some((yaml, body)) = block else {
        tracing::debug!("front matter has no closing delimiter; treating as body");
        return Ok((Metadata::new(), data));
    };

    let yaml = std::str::from_utf8(yaml).map_err(|_| FrontMatterError::NotUtf8)?;
    if yaml.trim().is_empty() {
        return Ok((Metadata::new(), body));
    }

    let mapping = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok((Metadata::new(), body)),
        _ => return Err(FrontMatterError::NotAMapping),
    };

    let mut metadata = Metadata::new();
    for (key, value) in mapping {
        let (Some(key), Some(value)) = (scalar_to_string(&key), value_to_string(&value)) else {
            continue;
        };
        if key.is_empty() || value.is_empty() {
            continue;
        }
        metadata.insert(key, value);
    }
    Ok((metadata, body))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Tagged(tagged) => return scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => return None,
    };
    Some(text.trim().to_string())
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(scalar_to_string)
                .filter(|s| !s.is_empty())
                .collect();
            Some(parts.join(","))
        }
        other => scalar_to_string(other),
    }
}

/// Line iterator yielding each line without its `\n`/`\r\n` terminator,
/// together with the byte offset where it starts.
struct Lines<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Offset of the first byte not yet consumed.
    fn offset(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (&'a [u8], usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        let start = self.pos;
        let rest = &self.data[start..];
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        Some((line.strip_suffix(b"\r").unwrap_or(line), start))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn split(data: &str) -> (Metadata, String) {
        let (metadata, body) = split_front_matter(data.as_bytes()).expect("split");
        (metadata, String::from_utf8(body.to_vec()).expect("utf8"))
    }

    #[test]
    fn no_front_matter_is_all_body() {
        let (metadata, body) = split("# Title\n\ntext\n");
        assert!(metadata.is_empty());
        assert_eq!(body, "# Title\n\ntext\n");
    }

    #[test]
    fn front_matter_fields_keep_case_and_order() {
        let (metadata, body) = split("---\nDescription: Style\nalwaysApply: true\nglobs: src/**\n---\nbody\n");
        let keys: Vec<&str> = metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Description", "alwaysApply", "globs"]);
        assert_eq!(metadata.get("description"), Some("Style"));
        assert_eq!(metadata.get("alwaysapply"), Some("true"));
        assert_eq!(body, "body\n");
    }

    #[test]
    fn dots_close_front_matter() {
        let (metadata, body) = split("---\na: 1\n...\nrest");
        assert_eq!(metadata.get("a"), Some("1"));
        assert_eq!(body, "rest");
    }

    #[test]
    fn crlf_delimiters_are_recognised() {
        let (metadata, body) = split("---\r\ndescription: x\r\n---\r\nbody\r\n");
        assert_eq!(metadata.get("description"), Some("x"));
        assert_eq!(body, "body\r\n");
    }

    #[test]
    fn unterminated_front_matter_is_all_body() {
        let input = "---\ndescription: x\nno close\n";
        let (metadata, body) = split(input);
        assert!(metadata.is_empty());
        assert_eq!(body, input);
    }

    #[test]
    fn empty_block_keeps_body_after_delimiter() {
        let (metadata, body) = split("---\n---\nbody");
        assert!(metadata.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn blank_and_null_values_are_dropped() {
        let (metadata, _) = split("---\ndescription: \"  \"\nglobs:\nkeep: v\n---\n");
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata.get("keep"), Some("v"));
    }

    #[test]
    fn sequences_are_joined_with_commas() {
        let (metadata, _) = split("---\nglobs:\n  - src/**\n  - tests/**\n---\n");
        assert_eq!(metadata.get("globs"), Some("src/**,tests/**"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let err = split_front_matter(b"---\nglobs: [unclosed\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn scalar_front_matter_is_not_a_mapping() {
        let err = split_front_matter(b"---\njust text\n---\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::NotAMapping));
    }

    #[test]
    fn document_degrades_malformed_front_matter() {
        let data = b"---\nglobs: [unclosed\n---\nbody";
        let doc = Document::from_bytes("x.md", SystemTime::UNIX_EPOCH, data);
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.body, data.to_vec());
    }

    #[test]
    fn document_strips_bom() {
        let doc = Document::from_bytes("x.md", SystemTime::UNIX_EPOCH, b"\xEF\xBB\xBF---\na: b\n---\nbody");
        assert_eq!(doc.metadata.get("a"), Some("b"));
        assert_eq!(doc.body, b"body".to_vec());
    }
}
