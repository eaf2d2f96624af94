/// Balanced-block extraction by delimiter counting
///
/// Locates the translation object inside a larger source file without a
/// grammar: the opening delimiter is the n-th one counted from the front and
/// the closing delimiter the n-th one counted from the back. Offsets are byte
/// offsets into the UTF-8 text.
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("block level must be at least 1")]
    InvalidLevel,

    #[error("opening '{delimiter}' #{level} not found")]
    OpeningNotFound { delimiter: String, level: usize },

    #[error("closing '{delimiter}' #{level} (from the end) not found")]
    ClosingNotFound { delimiter: String, level: usize },

    #[error("closing delimiter at {close} precedes opening delimiter at {open}")]
    Inverted { open: usize, close: usize },
}

/// Offset immediately following the `n`-th (1-based) occurrence of
/// `delimiter`, scanning left to right.
pub fn find_nth_from_start(text: &str, delimiter: &str, n: usize) -> Option<usize> {
    if n == 0 || delimiter.is_empty() {
        return None;
    }

    let mut cursor = 0;
    for _ in 0..n {
        let found = text[cursor..].find(delimiter)?;
        cursor += found + delimiter.len();
    }
    Some(cursor)
}

/// Offset of the `n`-th (1-based) occurrence of `delimiter`, scanning right
/// to left. Each step searches backwards from the previous match's start.
pub fn find_nth_from_end(text: &str, delimiter: &str, n: usize) -> Option<usize> {
    if n == 0 || delimiter.is_empty() {
        return None;
    }

    let mut limit = text.len();
    let mut found = None;
    for _ in 0..n {
        let at = text[..limit].rfind(delimiter)?;
        found = Some(at);
        limit = at;
    }
    found
}

/// Span of a balanced block found at a fixed nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Offset of the opening delimiter itself.
    pub open: usize,
    /// Offset right after the opening delimiter (start of the body).
    pub body_start: usize,
    /// Offset of the closing delimiter (end of the body, exclusive).
    pub body_end: usize,
    /// Offset right after the closing delimiter.
    pub close_end: usize,
}

impl BlockSpan {
    pub fn body<'a>(&self, text: &'a str) -> &'a str {
        &text[self.body_start..self.body_end]
    }

    /// The block including both delimiters.
    pub fn block<'a>(&self, text: &'a str) -> &'a str {
        &text[self.open..self.close_end]
    }
}

/// Locate the block opened by the `level`-th `open` from the front and closed
/// by the `level`-th `close` from the back.
///
/// A level that does not fit the file is an error, never a best-effort span.
pub fn locate_block(text: &str, open: &str, close: &str, level: usize) -> Result<BlockSpan, BlockError> {
    if level == 0 {
        return Err(BlockError::InvalidLevel);
    }

    let body_start = find_nth_from_start(text, open, level).ok_or_else(|| BlockError::OpeningNotFound {
        delimiter: open.to_string(),
        level,
    })?;
    let body_end = find_nth_from_end(text, close, level).ok_or_else(|| BlockError::ClosingNotFound {
        delimiter: close.to_string(),
        level,
    })?;

    let open_at = body_start - open.len();
    if body_end < body_start {
        return Err(BlockError::Inverted {
            open: open_at,
            close: body_end,
        });
    }

    Ok(BlockSpan {
        open: open_at,
        body_start,
        body_end,
        close_end: body_end + close.len(),
    })
}
