use std::borrow::Cow;

use serde::Serialize;

/// A single text field as it arrives from a dataset or a transcription file.
///
/// Missing values are normalized to empty text before they reach the
/// evaluator; bytes that do not decode as UTF-8 are kept as-is so the
/// evaluator can reject the pair instead of silently mangling it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCell {
    Text(String),
    Undecodable(Vec<u8>),
}

impl TextCell {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => TextCell::Text(text.to_string()),
            Err(_) => TextCell::Undecodable(bytes.to_vec()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TextCell::Text(text) => Some(text),
            TextCell::Undecodable(_) => None,
        }
    }

    /// Text for display purposes; undecodable bytes are replaced.
    pub fn to_lossy(&self) -> Cow<'_, str> {
        match self {
            TextCell::Text(text) => Cow::Borrowed(text),
            TextCell::Undecodable(bytes) => String::from_utf8_lossy(bytes),
        }
    }
}

impl Default for TextCell {
    fn default() -> Self {
        TextCell::Text(String::new())
    }
}

impl From<&str> for TextCell {
    fn from(text: &str) -> Self {
        TextCell::Text(text.to_string())
    }
}

impl From<String> for TextCell {
    fn from(text: String) -> Self {
        TextCell::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_decodes_utf8() {
        let cell = TextCell::from_bytes("über".as_bytes());
        assert_eq!(cell, TextCell::Text("über".to_string()));
        assert_eq!(cell.as_text(), Some("über"));
    }

    #[test]
    fn test_from_bytes_keeps_invalid_utf8() {
        let cell = TextCell::from_bytes(&[0x66, 0xff, 0x6f]);
        assert_eq!(cell, TextCell::Undecodable(vec![0x66, 0xff, 0x6f]));
        assert!(cell.as_text().is_none());
    }

    #[test]
    fn test_lossy_replaces_invalid_bytes() {
        let cell = TextCell::Undecodable(vec![0x61, 0xff]);
        assert_eq!(cell.to_lossy(), "a\u{fffd}");
    }

    #[test]
    fn test_default_is_empty_text() {
        assert_eq!(TextCell::default().as_text(), Some(""));
    }
}
