/// TypeScript/JavaScript catalog handler
/// Reads the translation object found at the configured block level and
/// patches single lines in place, leaving the rest of the file untouched.
use super::{CatalogFormat, CatalogHandler, Entries, FormatError};
use crate::config::LiteralOptions;
use crate::diff::ChangeRecord;
use crate::scanners::block::{locate_block, BlockSpan};
use crate::scanners::literal;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_$][\p{L}\p{N}_$]*$")
        .expect("valid identifier regex")
});

pub struct StructuredHandler {
    options: LiteralOptions,
}

impl StructuredHandler {
    pub fn new(options: LiteralOptions) -> Self {
        Self { options }
    }

    fn locate(&self, content: &str) -> Result<BlockSpan, FormatError> {
        Ok(locate_block(content, "{", "}", self.options.block_level)?)
    }

    /// Template literals are not valid property names.
    fn key_quote(&self) -> char {
        match self.options.quote {
            '`' => '\'',
            quote => quote,
        }
    }

    /// One catalog line: `indent + 'key': 'value',`
    pub fn render_line(&self, key: &str, value: &Value) -> String {
        format!(
            "{}{}: {},",
            self.options.indent(),
            quote_literal(key, self.key_quote()),
            render_value(value, self.options.quote)
        )
    }

    fn insert_line(&self, content: &str, span: &BlockSpan, line: &str) -> String {
        let (head, tail) = content.split_at(span.body_start);
        let mut out = String::with_capacity(content.len() + line.len() + 2);
        out.push_str(head);
        out.push('\n');
        out.push_str(line);
        if !tail.starts_with('\n') {
            out.push('\n');
        }
        out.push_str(tail);
        out
    }

    /// Replace the single line holding `key: old_value` with `replacement`.
    fn replace_line(
        &self,
        content: &str,
        span: &BlockSpan,
        key: &str,
        old_value: &Value,
        replacement: &str,
    ) -> Result<String, FormatError> {
        let pattern = entry_pattern(key, old_value)?;
        let body = span.body(content);

        let found: Vec<_> = pattern.find_iter(body).collect();
        if found.len() != 1 {
            return Err(FormatError::PatchMatch {
                pattern: format!("{key}: {old_value}"),
                matches: found.len(),
            });
        }

        let start = span.body_start + found[0].start();
        let end = span.body_start + found[0].end();
        Ok(format!("{}{}{}", &content[..start], replacement, &content[end..]))
    }

    /// The patched text must read back to exactly the expected entries.
    fn verify(&self, patched: String, expected: &Entries) -> Result<String, FormatError> {
        let reread = self.read(&patched)?;
        if &reread != expected {
            return Err(FormatError::Verification(
                "catalog entries differ from the requested change".into(),
            ));
        }
        Ok(patched)
    }
}

impl CatalogHandler for StructuredHandler {
    fn read(&self, content: &str) -> Result<Entries, FormatError> {
        let span = self.locate(content)?;
        match literal::parse(span.block(content))? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(FormatError::ParseError(format!(
                "translation block is not an object: {other}"
            ))),
        }
    }

    fn apply(
        &self,
        content: &str,
        key: &str,
        change: &ChangeRecord,
        entries_after: &Entries,
    ) -> Result<String, FormatError> {
        let span = self.locate(content)?;

        let patched = match change {
            ChangeRecord::Added { new_value, .. } => {
                self.insert_line(content, &span, &self.render_line(key, new_value))
            }
            ChangeRecord::Updated {
                old_value, new_value, ..
            } => self.replace_line(content, &span, key, old_value, &self.render_line(key, new_value))?,
            ChangeRecord::Deleted { old_value, .. } => self.replace_line(content, &span, key, old_value, "")?,
        };

        self.verify(patched, entries_after)
    }

    fn rename(
        &self,
        content: &str,
        old_key: &str,
        new_key: &str,
        entries_after: &Entries,
    ) -> Result<String, FormatError> {
        let span = self.locate(content)?;
        let pattern = key_pattern(old_key)?;
        let body = span.body(content);

        let found: Vec<_> = pattern.captures_iter(body).collect();
        if found.len() != 1 {
            return Err(FormatError::PatchMatch {
                pattern: format!("{old_key}:"),
                matches: found.len(),
            });
        }

        let caps = &found[0];
        let whole = caps.get(0).ok_or_else(|| FormatError::ParseError("empty key match".into()))?;
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let colon = caps.get(2).map_or(":", |m| m.as_str());

        let start = span.body_start + whole.start();
        let end = span.body_start + whole.end();
        let patched = format!(
            "{}{}{}{}{}",
            &content[..start],
            indent,
            quote_literal(new_key, self.key_quote()),
            colon,
            &content[end..]
        );

        self.verify(patched, entries_after)
    }

    fn format(&self) -> CatalogFormat {
        CatalogFormat::StructuredLiteral
    }
}

/// Quote a string as a JS literal using `quote`.
pub fn quote_literal(text: &str, quote: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' if quote == '`' && chars.peek() == Some(&'{') => out.push_str("\\$"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn render_value(value: &Value, quote: char) -> String {
    match value {
        Value::String(s) => quote_literal(s, quote),
        other => other.to_string(),
    }
}

fn is_identifier(key: &str) -> bool {
    IDENTIFIER_REGEX.is_match(key)
}

/// Literal spellings of a key token.
fn key_alternatives(key: &str) -> String {
    let mut spellings = vec![quote_literal(key, '\''), quote_literal(key, '"')];
    if is_identifier(key) {
        spellings.push(key.to_string());
    }
    spellings.iter().map(|s| regex::escape(s)).collect::<Vec<_>>().join("|")
}

/// Literal spellings of a value.
fn value_alternatives(value: &Value) -> String {
    let spellings = match value {
        Value::String(s) => vec![quote_literal(s, '\''), quote_literal(s, '"'), quote_literal(s, '`')],
        other => vec![other.to_string()],
    };
    spellings.iter().map(|s| regex::escape(s)).collect::<Vec<_>>().join("|")
}

fn entry_pattern(key: &str, value: &Value) -> Result<Regex, FormatError> {
    let source = format!(
        r"(?m)^[ \t]*(?:{})[ \t]*:[ \t]*(?:{})[ \t]*,?[ \t]*$",
        key_alternatives(key),
        value_alternatives(value)
    );
    Regex::new(&source).map_err(|e| FormatError::ParseError(format!("invalid patch pattern: {e}")))
}

fn key_pattern(key: &str) -> Result<Regex, FormatError> {
    let source = format!(r"(?m)^([ \t]*)(?:{})([ \t]*:)", key_alternatives(key));
    Regex::new(&source).map_err(|e| FormatError::ParseError(format!("invalid rename pattern: {e}")))
}
