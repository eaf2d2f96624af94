/// BOM and newline preservation for catalog text
///
/// Catalogs are handled internally as BOM-less, LF-only UTF-8 so patch
/// patterns see one line ending; the original style is restored on write.
use crate::formats::FormatError;
use std::path::Path;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    #[default]
    Lf,
    Crlf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextMetadata {
    pub newline: Newline,
    pub has_bom: bool,
}

impl TextMetadata {
    /// Detect BOM and newline style from raw file content
    pub fn detect(content: &[u8]) -> Self {
        let newline = if content.windows(2).any(|w| w == b"\r\n") {
            Newline::Crlf
        } else {
            Newline::Lf
        };

        Self {
            newline,
            has_bom: content.starts_with(&UTF8_BOM),
        }
    }

    /// Decode raw content into normalized text
    pub fn decode(content: &[u8]) -> Result<(String, Self), FormatError> {
        let metadata = Self::detect(content);
        let body = if metadata.has_bom { &content[UTF8_BOM.len()..] } else { content };

        let text = std::str::from_utf8(body)
            .map_err(|e| FormatError::EncodingError(format!("catalog is not valid UTF-8: {e}")))?;

        Ok((text.replace("\r\n", "\n"), metadata))
    }

    /// Encode normalized text back into the original style
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let text = match self.newline {
            Newline::Lf => text.to_string(),
            Newline::Crlf => text.replace("\r\n", "\n").replace('\n', "\r\n"),
        };

        let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
        if self.has_bom {
            bytes.extend_from_slice(&UTF8_BOM);
        }
        bytes.extend_from_slice(text.as_bytes());
        bytes
    }
}

/// Read a catalog file as normalized text
pub fn read_text(path: &Path) -> Result<(String, TextMetadata), FormatError> {
    let bytes = std::fs::read(path)?;
    TextMetadata::decode(&bytes)
}
