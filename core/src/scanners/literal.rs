/// Object-literal reader for TypeScript/JavaScript catalog files
///
/// Understands the subset of the language that translation objects are
/// written in: objects, arrays, quoted and back-tick strings, numbers,
/// `true`/`false`/`null`/`undefined`, trailing commas and comments. The
/// result is a plain JSON value, so catalogs in both formats compare
/// structurally.
use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct LiteralError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Parse a complete literal fragment. Anything but whitespace and comments
/// after the value is an error.
pub fn parse(fragment: &str) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser::new(fragment);
    parser.skip_trivia()?;
    let value = parser.parse_value()?;
    parser.skip_trivia()?;
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(value)
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl LiteralParser {
    fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        let mut line = 1;
        let mut column = 1;
        for &c in &self.chars[..self.pos.min(self.chars.len())] {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        LiteralError {
            message: message.into(),
            line,
            column,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    /// Skip whitespace, line comments and block comments.
    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.pos += 1;
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => return Err(self.error("unterminated block comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some(q @ ('\'' | '"' | '`')) => self.parse_string(q).map(Value::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.parse_number(),
            Some(c) if is_ident_start(c) => {
                let ident = self.parse_identifier();
                match ident.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" | "undefined" => Ok(Value::Null),
                    other => Err(self.error(format!("unsupported identifier '{other}'"))),
                }
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();

        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }

            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_trivia()?;
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.error(format!("expected ',' or '}}', found '{c}'")));
                }
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(q @ ('\'' | '"')) => self.parse_string(q),
            Some(c) if is_ident_start(c) => Ok(self.parse_identifier()),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}' in key"))),
            None => Err(self.error("unterminated object")),
        }
    }

    fn parse_array(&mut self) -> Result<Value, LiteralError> {
        self.expect('[')?;
        let mut items = Vec::new();

        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }

            items.push(self.parse_value()?);

            self.skip_trivia()?;
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Value::Array(items)),
                Some(c) => {
                    self.pos -= 1;
                    return Err(self.error(format!("expected ',' or ']', found '{c}'")));
                }
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_part) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.expect(quote)?;
        let mut out = String::new();

        loop {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(self.error("unterminated string")),
            };

            if c == quote {
                return Ok(out);
            }

            match c {
                '\\' => self.parse_escape(&mut out)?,
                '\n' if quote != '`' => {
                    self.pos -= 1;
                    return Err(self.error("newline in string literal"));
                }
                '$' if quote == '`' && self.peek() == Some('{') => {
                    return Err(self.error("template interpolation is not supported"));
                }
                _ => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let c = match self.bump() {
            Some(c) => c,
            None => return Err(self.error("unterminated escape sequence")),
        };

        match c {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.parse_hex_digits(2)?;
                out.push(self.char_from(code)?);
            }
            'u' => {
                if self.peek() == Some('{') {
                    self.pos += 1;
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        self.pos += 1;
                    }
                    let digits: String = self.chars[start..self.pos].iter().collect();
                    self.expect('}')?;
                    let code = u32::from_str_radix(&digits, 16)
                        .map_err(|_| self.error("invalid unicode escape"))?;
                    out.push(self.char_from(code)?);
                } else {
                    let code = self.parse_hex_digits(4)?;
                    if (0xD800..0xDC00).contains(&code)
                        && self.peek() == Some('\\')
                        && self.peek_at(1) == Some('u')
                    {
                        self.pos += 2;
                        let low = self.parse_hex_digits(4)?;
                        if !(0xDC00..0xE000).contains(&low) {
                            return Err(self.error("invalid surrogate pair"));
                        }
                        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        out.push(self.char_from(combined)?);
                    } else {
                        out.push(self.char_from(code)?);
                    }
                }
            }
            // line continuation
            '\r' => {
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
            }
            '\n' => {}
            other => out.push(other),
        }
        Ok(())
    }

    fn parse_hex_digits(&mut self, count: usize) -> Result<u32, LiteralError> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid hex escape"))?;
            code = code * 16 + digit;
            self.pos += 1;
        }
        Ok(code)
    }

    fn char_from(&self, code: u32) -> Result<char, LiteralError> {
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point {code:#x}")))
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.pos += 1;
                true
            }
            Some('+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };

        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.pos += 1;
            }
            let digits: String = self.chars[digits_start..self.pos]
                .iter()
                .filter(|c| **c != '_')
                .collect();
            let magnitude = i64::from_str_radix(&digits, 16).map_err(|_| self.error("invalid hex number"))?;
            return Ok(Value::Number(Number::from(if negative { -magnitude } else { magnitude })));
        }

        let digits_start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_'))
            || (matches!(self.peek(), Some('-' | '+'))
                && matches!(self.chars.get(self.pos.wrapping_sub(1)), Some('e' | 'E')))
        {
            self.pos += 1;
        }

        let raw: String = self.chars[digits_start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        if raw.is_empty() {
            self.pos = start;
            return Err(self.error("invalid number"));
        }

        if raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(int) = raw.parse::<i64>() {
                return Ok(Value::Number(Number::from(if negative { -int } else { int })));
            }
        }

        let float: f64 = raw.parse().map_err(|_| self.error(format!("invalid number '{raw}'")))?;
        let float = if negative { -float } else { float };
        Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| self.error("number is not finite"))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_typical_catalog_object() {
        let fragment = r#"{
    // header
    'greeting.hello': 'Hallo',
    "greeting.bye": "Tschüss",
    plain: `multi
line`,
    /* block */ 'count': 3,
}"#;
        let value = parse(fragment).unwrap();
        assert_eq!(
            value,
            json!({
                "greeting.hello": "Hallo",
                "greeting.bye": "Tschüss",
                "plain": "multi\nline",
                "count": 3
            })
        );
    }

    #[test]
    fn keeps_source_order() {
        let value = parse("{ 'b': 1, 'a': 2 }").unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn decodes_escapes() {
        let value = parse(r#"{ 'a': 'It\'s\né\x41\u{1F600}', 'b': "say \"hi\"" }"#).unwrap();
        assert_eq!(value["a"], "It's\néA😀");
        assert_eq!(value["b"], "say \"hi\"");
    }

    #[test]
    fn decodes_control_escapes_and_continuations() {
        let value = parse("{ 'a': '\\v\\b\\f\\0', 'b': 'one \\\ntwo', 'c': 'crlf\\\r\nend' }").unwrap();
        assert_eq!(value["a"], "\u{b}\u{8}\u{c}\0");
        assert_eq!(value["b"], "one two");
        assert_eq!(value["c"], "crlfend");
    }

    #[test]
    fn combines_surrogate_pairs() {
        let value = parse(r#"{ 'smile': '\uD83D\uDE00', 'plain': '\u00e9' }"#).unwrap();
        assert_eq!(value["smile"], "😀");
        assert_eq!(value["plain"], "é");

        let err = parse(r#"{ 'broken': '\uD83D\u0041' }"#).unwrap_err();
        assert!(err.message.contains("invalid surrogate pair"));
        assert!(parse(r#"{ 'lone': '\uD83D' }"#).is_err());
    }

    #[test]
    fn parses_nested_values_and_keywords() {
        let value = parse("{ list: [1, -2.5, true, null, undefined,], nested: { deep: 'x' } }").unwrap();
        assert_eq!(
            value,
            json!({ "list": [1, -2.5, true, null, null], "nested": { "deep": "x" } })
        );

        let numbers = parse("{ hex: 0x1F, negHex: -0x10, tiny: 1e-5, big: 2E3, plus: +7, frac: .5 }").unwrap();
        assert_eq!(numbers["hex"], json!(31));
        assert_eq!(numbers["negHex"], json!(-16));
        assert_eq!(numbers["tiny"], json!(1e-5));
        assert_eq!(numbers["big"], json!(2000.0));
        assert_eq!(numbers["plus"], json!(7));
        assert_eq!(numbers["frac"], json!(0.5));
    }

    #[test]
    fn reports_position_of_errors() {
        let err = parse("{\n  'a': 'b'\n  'c': 'd'\n}").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("expected ','"));

        assert!(parse("{ 'a': 'unterminated }").is_err());
        assert!(parse("{ a: someVariable }").is_err());
        assert!(parse("{ a: `${x}` }").is_err());
        assert!(parse("{ 'a': 1 } extra").is_err());
    }
}
