//! Permissive literal notation: the dict/list/string grammar that annotation
//! producers emit when they print a mapping instead of serializing it as JSON.
//!
//! Accepted: single/double/triple-quoted strings (with `r`/`u`/`b` prefixes and
//! adjacent-literal concatenation), ints, floats, `True`/`False`/`None`, lists,
//! tuples, sets and dicts, trailing commas. Tuples and sets decode to arrays.
//! Dict entries whose key is not a string are dropped.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Same nesting limit serde_json applies, so both decoders give up together.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Error, PartialEq)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("trailing input at offset {0}")]
    TrailingInput(usize),

    #[error("nesting too deep at offset {0}")]
    TooDeep(usize),
}

/// Parses a complete literal expression. Surrounding whitespace is ignored.
pub fn parse_literal(input: &str) -> Result<Value, LiteralError> {
    let mut parser = LiteralParser {
        chars: input.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(LiteralError::TrailingInput(parser.pos));
    }
    Ok(value)
}

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl LiteralParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Result<char, LiteralError> {
        let c = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), LiteralError> {
        self.skip_whitespace();
        match self.bump()? {
            c if c == wanted => Ok(()),
            found => Err(LiteralError::Unexpected {
                found,
                offset: self.pos - 1,
            }),
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(found) => LiteralError::Unexpected {
                found,
                offset: self.pos,
            },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('{' | '[' | '(') => {
                if self.depth >= MAX_DEPTH {
                    return Err(LiteralError::TooDeep(self.pos));
                }
                self.depth += 1;
                let value = self.parse_container();
                self.depth -= 1;
                value
            }
            Some('\'') | Some('"') => self.parse_strings(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                self.parse_number()
            }
            Some(c) if c.is_alphabetic() || c == '_' => {
                if self.at_string_prefix() {
                    self.parse_strings()
                } else {
                    self.parse_name()
                }
            }
            Some(_) => Err(self.unexpected()),
        }
    }

    fn parse_container(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some('{') => self.parse_braced(),
            Some('[') => {
                self.pos += 1;
                let (items, _) = self.parse_items(']')?;
                Ok(Value::Array(items))
            }
            Some('(') => {
                self.pos += 1;
                let (mut items, trailing_comma) = self.parse_items(')')?;
                // `(x)` is a parenthesized value, `(x,)` is a one-element tuple.
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Value::Array(items))
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Comma-separated values up to `close`. Returns whether the last item had a trailing comma.
    fn parse_items(&mut self, close: char) -> Result<(Vec<Value>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, trailing_comma));
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.bump()? {
                ',' => trailing_comma = true,
                c if c == close => return Ok((items, false)),
                found => {
                    return Err(LiteralError::Unexpected {
                        found,
                        offset: self.pos - 1,
                    })
                }
            }
        }
    }

    /// `{}` is an empty dict; `{k: v, ...}` a dict; `{a, b}` a set.
    fn parse_braced(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Value::Object(Map::new()));
        }

        let first = self.parse_value()?;
        self.skip_whitespace();
        if self.peek() != Some(':') {
            let mut items = vec![first];
            match self.bump()? {
                '}' => return Ok(Value::Array(items)),
                ',' => {
                    let (rest, _) = self.parse_items('}')?;
                    items.extend(rest);
                    return Ok(Value::Array(items));
                }
                found => {
                    return Err(LiteralError::Unexpected {
                        found,
                        offset: self.pos - 1,
                    })
                }
            }
        }

        let mut map = Map::new();
        let mut key = first;
        loop {
            self.expect(':')?;
            let value = self.parse_value()?;
            if let Value::String(k) = key {
                map.insert(k, value);
            }
            self.skip_whitespace();
            match self.bump()? {
                '}' => return Ok(Value::Object(map)),
                ',' => {
                    self.skip_whitespace();
                    if self.peek() == Some('}') {
                        self.pos += 1;
                        return Ok(Value::Object(map));
                    }
                    key = self.parse_value()?;
                }
                found => {
                    return Err(LiteralError::Unexpected {
                        found,
                        offset: self.pos - 1,
                    })
                }
            }
        }
    }

    fn at_string_prefix(&self) -> bool {
        let is_prefix = |c: char| matches!(c.to_ascii_lowercase(), 'r' | 'u' | 'b');
        match (self.peek(), self.peek_at(1), self.peek_at(2)) {
            (Some(a), Some('\'' | '"'), _) => is_prefix(a),
            (Some(a), Some(b), Some('\'' | '"')) => {
                is_prefix(a) && is_prefix(b) && a.to_ascii_lowercase() != b.to_ascii_lowercase()
            }
            _ => false,
        }
    }

    /// One or more adjacent string literals, concatenated.
    fn parse_strings(&mut self) -> Result<Value, LiteralError> {
        let mut out = self.parse_string()?;
        loop {
            let checkpoint = self.pos;
            self.skip_whitespace();
            match self.peek() {
                Some('\'' | '"') => out.push_str(&self.parse_string()?),
                Some(c) if c.is_alphabetic() && self.at_string_prefix() => {
                    out.push_str(&self.parse_string()?)
                }
                _ => {
                    self.pos = checkpoint;
                    return Ok(Value::String(out));
                }
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let mut raw = false;
        while let Some(c) = self.peek() {
            if c == '\'' || c == '"' {
                break;
            }
            if c.eq_ignore_ascii_case(&'r') {
                raw = true;
            }
            self.pos += 1;
        }

        let quote = self.bump()?;
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let c = self.bump()?;
            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.peek() == Some(quote) && self.peek_at(1) == Some(quote) {
                    self.pos += 2;
                    return Ok(out);
                }
                out.push(c);
                continue;
            }
            if c == '\n' && !triple {
                return Err(LiteralError::Unexpected {
                    found: c,
                    offset: self.pos - 1,
                });
            }
            if c == '\\' {
                let escaped = self.bump()?;
                if raw {
                    out.push('\\');
                    out.push(escaped);
                } else {
                    self.push_escape(escaped, &mut out)?;
                }
                continue;
            }
            out.push(c);
        }
    }

    fn push_escape(&mut self, escaped: char, out: &mut String) -> Result<(), LiteralError> {
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' | '\'' | '"' => out.push(escaped),
            '\n' => {}
            'x' => out.push(self.parse_hex_escape(2)?),
            'u' => out.push(self.parse_hex_escape(4)?),
            'U' => out.push(self.parse_hex_escape(8)?),
            other => {
                // Unknown escapes keep their backslash.
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let start = self.pos;
        let mut code = 0u32;
        for _ in 0..digits {
            let c = self.bump()?;
            let digit = c.to_digit(16).ok_or(LiteralError::Unexpected {
                found: c,
                offset: self.pos - 1,
            })?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| {
            LiteralError::InvalidNumber(self.chars[start..self.pos].iter().collect())
        })
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
            self.skip_whitespace();
        }
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_alphanumeric() || c == '.' || c == '_'
                || ((c == '-' || c == '+') && matches!(self.chars.get(self.pos - 1), Some('e' | 'E')))
        ) {
            self.pos += 1;
        }

        let literal: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| !c.is_whitespace() && **c != '_')
            .collect();
        let unsigned = literal.trim_start_matches(['-', '+']);
        let negative = literal.starts_with('-');

        let is_float = !unsigned.starts_with("0x")
            && !unsigned.starts_with("0X")
            && unsigned.contains(['.', 'e', 'E']);
        if !is_float {
            let parsed = if let Some(hex) = unsigned
                .strip_prefix("0x")
                .or_else(|| unsigned.strip_prefix("0X"))
            {
                i64::from_str_radix(hex, 16).ok()
            } else {
                unsigned.parse::<i64>().ok()
            };
            if let Some(n) = parsed {
                return Ok(Value::Number(Number::from(if negative { -n } else { n })));
            }
        }

        literal
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(LiteralError::InvalidNumber(literal))
    }

    fn parse_name(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "True" => Ok(Value::Bool(true)),
            "False" => Ok(Value::Bool(false)),
            "None" => Ok(Value::Null),
            _ => Err(LiteralError::UnknownName(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_quoted_dict() {
        let value = parse_literal("{'Required Skills': ['Python', 'SQL'], 'remote': True}").unwrap();
        assert_eq!(
            value,
            json!({"Required Skills": ["Python", "SQL"], "remote": true})
        );
    }

    #[test]
    fn test_none_and_numbers() {
        let value = parse_literal("{'a': None, 'b': -3, 'c': 2.5, 'd': 1e3}").unwrap();
        assert_eq!(value, json!({"a": null, "b": -3, "c": 2.5, "d": 1000.0}));
    }

    #[test]
    fn test_tuple_and_set_become_arrays() {
        assert_eq!(parse_literal("('a', 'b')").unwrap(), json!(["a", "b"]));
        assert_eq!(parse_literal("('a',)").unwrap(), json!(["a"]));
        assert_eq!(parse_literal("{'x', 'y'}").unwrap(), json!(["x", "y"]));
        assert_eq!(parse_literal("('a')").unwrap(), json!("a"));
    }

    #[test]
    fn test_trailing_commas_accepted() {
        let value = parse_literal("{'skills': ['rust', 'go',],}").unwrap();
        assert_eq!(value, json!({"skills": ["rust", "go"]}));
    }

    #[test]
    fn test_escapes_and_mixed_quotes() {
        let value = parse_literal(r#"{"it's": 'say \"hi\"\nnow'}"#).unwrap();
        assert_eq!(value, json!({"it's": "say \"hi\"\nnow"}));
    }

    #[test]
    fn test_triple_quoted_and_concatenated_strings() {
        let value = parse_literal("'''line one\nline two''' ' more'").unwrap();
        assert_eq!(value, json!("line one\nline two more"));
    }

    #[test]
    fn test_raw_string_keeps_backslashes() {
        assert_eq!(parse_literal(r"r'a\nb'").unwrap(), json!(r"a\nb"));
    }

    #[test]
    fn test_non_string_keys_dropped() {
        let value = parse_literal("{1: 'one', 'two': 2}").unwrap();
        assert_eq!(value, json!({"two": 2}));
    }

    #[test]
    fn test_malformed_inputs_fail() {
        assert!(parse_literal("not json {{{").is_err());
        assert!(parse_literal("{'a': 1").is_err());
        assert!(parse_literal("['a' 'b'").is_err());
        assert!(parse_literal("{'a': 1} extra").is_err());
        assert!(parse_literal("").is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        for open in ["[", "(", "{", "{'a': "] {
            let input = open.repeat(10_000);
            assert!(matches!(parse_literal(&input), Err(LiteralError::TooDeep(_))));
        }
    }

    #[test]
    fn test_nesting_up_to_limit_is_accepted() {
        let input = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&input).is_ok());

        let input = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert_eq!(parse_literal(&input), Err(LiteralError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_sibling_containers_do_not_accumulate_depth() {
        let input = format!("[{}]", vec!["[1]"; 500].join(", "));
        assert_eq!(parse_literal(&input).unwrap().as_array().map(Vec::len), Some(500));
    }

    #[test]
    fn test_lone_and_unterminated_prefixes() {
        assert_eq!(parse_literal("r"), Err(LiteralError::UnknownName("r".to_string())));
        assert_eq!(parse_literal("u'"), Err(LiteralError::UnexpectedEnd));
        assert_eq!(parse_literal("rb\""), Err(LiteralError::UnexpectedEnd));
        assert_eq!(parse_literal("'''never closed"), Err(LiteralError::UnexpectedEnd));
        assert!(parse_literal(r"'\x4'").is_err());
        assert!(parse_literal(r"'\U0011FFFF'").is_err());
        assert!(parse_literal("-").is_err());
        assert!(parse_literal("[1, 2").is_err());
    }

    #[test]
    fn test_very_long_inputs() {
        let word = "a".repeat(200_000);
        assert_eq!(parse_literal(&word), Err(LiteralError::UnknownName(word.clone())));

        let quoted = format!("'{word}'");
        assert_eq!(parse_literal(&quoted), Ok(Value::String(word)));

        let list = format!("[{}]", vec!["'x'"; 50_000].join(","));
        assert_eq!(parse_literal(&list).unwrap().as_array().map(Vec::len), Some(50_000));
    }
}
