//! Front-matter block handling.
//!
//! A document carries at most one block at its head, delimited by `---` lines.
//! The block is modelled as an ordered mapping so that reconciliation can
//! replace the keys it owns while every other key keeps its value and position.

use serde_yaml::{Mapping, Value};

use crate::{Error, Result};

pub const DELIMITER: &str = "---";

/// Raw slices of a document that starts with a front-matter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentParts<'a> {
    /// Text between the delimiter lines, without the delimiters
    pub yaml: &'a str,
    /// Everything after the closing delimiter line
    pub body: &'a str,
}

/// Split a document into its front-matter text and body.
///
/// Returns `None` when the document does not open with a delimited block.
pub fn split_document(content: &str) -> Option<DocumentParts<'_>> {
    let first_end = content.find('\n')?;
    if content[..first_end].trim_end() != DELIMITER {
        return None;
    }

    let rest = &content[first_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = rest[..offset].trim_end_matches(['\n', '\r']);
            let body = &rest[offset + line.len()..];
            return Some(DocumentParts { yaml, body });
        }
        offset += line.len();
    }

    None
}

/// Body of a document with any front-matter block removed, trimmed.
pub fn strip_frontmatter(content: &str) -> &str {
    split_document(content).map_or(content, |parts| parts.body).trim()
}

/// One top-level piece of a block in its original source text.
///
/// A keyed chunk spans the key line and its indented continuation. Comment and
/// blank lines that are not inside a value form unkeyed chunks.
#[derive(Debug, Clone, PartialEq)]
struct Chunk {
    key: Option<String>,
    text: String,
}

impl Chunk {
    fn is_blank(&self) -> bool {
        self.key.is_none() && self.text.trim().is_empty()
    }
}

/// Parsed front-matter as an ordered key/value mapping.
///
/// Values are read from the parsed mapping; rendering works on the source
/// text of each top-level key, so keys that are never replaced are written
/// back byte for byte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    entries: Mapping,
    chunks: Vec<Chunk>,
}

impl Frontmatter {
    /// Parse block text. An empty block is an empty mapping; anything that is
    /// not a mapping is rejected.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let entries = match serde_yaml::from_str::<Value>(yaml) {
            Ok(Value::Mapping(entries)) => entries,
            Ok(Value::Null) => Mapping::new(),
            Ok(_) => {
                return Err(Error::Frontmatter(
                    "front-matter must be a key/value mapping".to_string(),
                ))
            }
            Err(error) => return Err(Error::Frontmatter(error.to_string())),
        };

        Ok(Self {
            entries,
            chunks: split_chunks(yaml),
        })
    }

    /// No keys and nothing but whitespace left in the source text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.chunks.iter().all(Chunk::is_blank)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Scalar value rendered as trimmed text. Empty strings and `null` read as absent.
    pub fn get_str(&self, key: &str) -> Option<String> {
        let text = match self.get(key)? {
            Value::String(value) => value.clone(),
            Value::Number(value) => value.to_string(),
            Value::Bool(value) => value.to_string(),
            _ => return None,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(value) => Some(*value),
            Value::String(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// A YAML sequence, or a comma-separated string, as a list of non-empty items.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(value) => Some(value.trim().to_string()),
                    Value::Number(value) => Some(value.to_string()),
                    _ => None,
                })
                .filter(|item| !item.is_empty())
                .collect(),
            Some(Value::String(value)) => value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Keys in document order.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .keys()
            .filter_map(|key| key.as_str().map(ToString::to_string))
            .collect()
    }

    /// Drop every key in `owned`, then append `updates` in order.
    ///
    /// Keys outside `owned` keep their source text and relative order.
    pub fn merge_owned(&mut self, owned: &[&str], updates: &[(&str, Value)]) -> Result<()> {
        self.remove_keys(owned);
        for (key, value) in updates {
            let mut single = Mapping::new();
            single.insert(Value::String((*key).to_string()), value.clone());
            let text = serde_yaml::to_string(&single)
                .map_err(|error| Error::Frontmatter(error.to_string()))?;

            self.entries
                .insert(Value::String((*key).to_string()), value.clone());
            self.chunks.push(Chunk {
                key: Some((*key).to_string()),
                text,
            });
        }
        Ok(())
    }

    /// Remove keys while preserving the order of the remaining entries.
    pub fn remove_keys(&mut self, keys: &[&str]) {
        let is_removed = |key: Option<&str>| key.is_some_and(|key| keys.contains(&key));

        let entries = std::mem::take(&mut self.entries);
        self.entries = entries
            .into_iter()
            .filter(|(key, _)| !is_removed(key.as_str()))
            .collect();
        self.chunks.retain(|chunk| !is_removed(chunk.key.as_deref()));
    }

    /// YAML text without delimiters, ending in a newline.
    pub fn to_yaml(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut output = String::new();
        for chunk in &self.chunks {
            output.push_str(&chunk.text);
            if !chunk.text.ends_with('\n') {
                output.push('\n');
            }
        }
        output
    }
}

/// Whether a line opens a new top-level entry: not indented, not a comment,
/// not a sequence item and not a document marker.
fn starts_top_level_entry(line: &str) -> bool {
    let Some(first) = line.chars().next() else {
        return false;
    };
    !first.is_whitespace()
        && !matches!(first, '#' | '-' | '.')
        && line.contains(':')
}

fn chunk_key(text: &str) -> Option<String> {
    if let Ok(Value::Mapping(mapping)) = serde_yaml::from_str::<Value>(text) {
        return mapping
            .keys()
            .next()
            .and_then(|key| key.as_str().map(ToString::to_string));
    }
    let (key, _) = text.split_once(':')?;
    Some(key.trim().trim_matches(['"', '\'']).to_string())
}

/// Cut already validated block text into top-level chunks.
///
/// Comment and blank lines between entries stand alone; inside a value they
/// stay with the entry they interrupt.
fn split_chunks(yaml: &str) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for line in yaml.split_inclusive('\n') {
        if starts_top_level_entry(line) {
            flush_pending(&mut chunks, &mut pending);
            chunks.push(Chunk {
                key: chunk_key(line),
                text: line.to_string(),
            });
            continue;
        }

        let is_loose = line.trim().is_empty() || line.starts_with('#');
        match chunks.last_mut() {
            Some(chunk) if !is_loose => {
                for held in pending.drain(..) {
                    chunk.text.push_str(held);
                }
                chunk.text.push_str(line);
            }
            _ => pending.push(line),
        }
    }
    flush_pending(&mut chunks, &mut pending);
    chunks
}

fn flush_pending(chunks: &mut Vec<Chunk>, pending: &mut Vec<&str>) {
    for line in pending.drain(..) {
        chunks.push(Chunk {
            key: None,
            text: line.to_string(),
        });
    }
}

/// A document split into front-matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub frontmatter: Frontmatter,
    /// Whether the source text had a delimited block
    pub has_block: bool,
    pub body: String,
}

impl Document {
    /// Parse a document. A missing block yields an empty mapping; a block that
    /// fails to parse is an error and nothing is guessed.
    pub fn parse(content: &str) -> Result<Self> {
        match split_document(content) {
            Some(parts) => Ok(Self {
                frontmatter: Frontmatter::parse(parts.yaml)?,
                has_block: true,
                body: parts.body.to_string(),
            }),
            None => Ok(Self {
                frontmatter: Frontmatter::default(),
                has_block: false,
                body: content.to_string(),
            }),
        }
    }

    /// Render with the `---` delimiter pair and exactly one blank line before
    /// the body. An empty mapping renders the body alone.
    pub fn render(&self) -> Result<String> {
        let body = self.body.trim_start();
        if self.frontmatter.is_empty() {
            return Ok(body.to_string());
        }

        let yaml = self.frontmatter.to_yaml();
        let mut output = String::with_capacity(yaml.len() + body.len() + 16);
        output.push_str(DELIMITER);
        output.push('\n');
        output.push_str(&yaml);
        if !yaml.ends_with('\n') {
            output.push('\n');
        }
        output.push_str(DELIMITER);
        output.push('\n');
        if !body.is_empty() {
            output.push('\n');
            output.push_str(body);
        }
        Ok(output)
    }
}
