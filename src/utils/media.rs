// src/utils/media.rs

//! Content-type matching for binary pass-through.

use crate::error::{AppError, Result};

/// A single `type/subtype` pattern. A `*` subtype matches any subtype.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MediaPattern {
    kind: String,
    subtype: Option<String>,
}

impl MediaPattern {
    fn parse(raw: &str) -> Result<Self> {
        let essence = essence(raw);
        let (kind, subtype) = essence
            .split_once('/')
            .ok_or_else(|| AppError::config(format!("invalid binary content type: {raw:?}")))?;

        if kind.is_empty() || kind == "*" || subtype.is_empty() || subtype.contains('/') {
            return Err(AppError::config(format!(
                "invalid binary content type: {raw:?}"
            )));
        }

        Ok(Self {
            kind: kind.to_string(),
            subtype: (subtype != "*").then(|| subtype.to_string()),
        })
    }

    fn matches(&self, kind: &str, subtype: &str) -> bool {
        self.kind == kind && self.subtype.as_deref().is_none_or(|s| s == subtype)
    }
}

/// Lower-cased media type without parameters, e.g. `image/png` for
/// `Image/PNG; q=0.9`.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Set of content types whose bodies must travel as raw bytes.
#[derive(Debug, Clone, Default)]
pub struct BinaryTypes {
    patterns: Vec<MediaPattern>,
}

impl BinaryTypes {
    /// Parse configured patterns, rejecting malformed entries.
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| MediaPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Check whether a `Content-Type` header value is binary.
    pub fn is_binary(&self, content_type: &str) -> bool {
        let essence = essence(content_type);
        match essence.split_once('/') {
            Some((kind, subtype)) => self.patterns.iter().any(|p| p.matches(kind, subtype)),
            None => false,
        }
    }
}
