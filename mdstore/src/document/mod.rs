// Document codec - split, parse, merge and re-render YAML front matter

use crate::util::json_to_yaml;
use serde_yaml::{Mapping, Value as YamlValue};
use thiserror::Error;

/// Front matter keyed by field name, in document order.
pub type Frontmatter = Mapping;

const DELIMITER: &str = "---";

/// A front matter block that could not be decoded or encoded.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct FrontmatterError(String);

impl From<serde_yaml::Error> for FrontmatterError {
    fn from(e: serde_yaml::Error) -> Self {
        FrontmatterError(e.to_string())
    }
}

impl From<serde_json::Error> for FrontmatterError {
    fn from(e: serde_json::Error) -> Self {
        FrontmatterError(e.to_string())
    }
}

/// Raw halves of a document, borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// Text strictly between the two delimiter lines, if there is a block.
    pub block: Option<&'a str>,
    pub body: &'a str,
}

/// A decoded document: front matter plus the untouched body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self, FrontmatterError> {
        let split = split(text);
        let frontmatter = match split.block {
            Some(block) => parse_block(block)?,
            None => Frontmatter::new(),
        };
        Ok(Document {
            frontmatter,
            body: split.body.to_string(),
        })
    }

    /// Shallow top-level overwrite: each key in `updates` is set, nested
    /// values replace the old ones wholesale, other keys are left alone.
    pub fn merge(&mut self, updates: &serde_json::Map<String, serde_json::Value>) {
        for (key, value) in updates {
            self.frontmatter
                .insert(YamlValue::String(key.clone()), json_to_yaml(value));
        }
    }

    pub fn render(&self) -> Result<String, FrontmatterError> {
        let block = render_block(&self.frontmatter)?;
        let mut out = String::with_capacity(block.len() + self.body.len() + 9);
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&block);
        out.push_str(DELIMITER);
        out.push('\n');
        if !self.body.is_empty() {
            out.push('\n');
            out.push_str(&self.body);
        }
        Ok(out)
    }
}

/// Find the front matter block at the head of `text`.
///
/// The first line must be a delimiter and a later line must match it.
/// Without such a pair the whole text is the body, byte for byte.
pub fn split(text: &str) -> Split<'_> {
    let no_block = Split {
        block: None,
        body: text,
    };

    let mut lines = text.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) if is_delimiter(line) => line,
        _ => return no_block,
    };

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if is_delimiter(line) {
            let body = text[offset + line.len()..].trim_start_matches(['\r', '\n']);
            return Split {
                block: Some(&text[block_start..offset]),
                body,
            };
        }
        offset += line.len();
    }

    no_block
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Decode a block into a mapping. Empty or comment-only blocks are an empty mapping.
pub fn parse_block(block: &str) -> Result<Frontmatter, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Frontmatter::new());
    }
    match serde_yaml::from_str::<YamlValue>(block)? {
        YamlValue::Mapping(mapping) => Ok(mapping),
        YamlValue::Null => Ok(Frontmatter::new()),
        other => Err(FrontmatterError(format!(
            "front matter must be a mapping, found {}",
            kind_name(&other)
        ))),
    }
}

/// Encode a mapping as block text ending in a newline; empty mappings encode as "".
pub fn render_block(frontmatter: &Frontmatter) -> Result<String, FrontmatterError> {
    if frontmatter.is_empty() {
        return Ok(String::new());
    }
    let mut yaml = serde_yaml::to_string(frontmatter)?;
    if !yaml.ends_with('\n') {
        yaml.push('\n');
    }
    Ok(yaml)
}

/// JSON view of the front matter, for hosts that speak JSON.
pub fn frontmatter_to_json(frontmatter: &Frontmatter) -> Result<serde_json::Value, FrontmatterError> {
    Ok(serde_json::to_value(frontmatter)?)
}

fn kind_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}
