//! A tolerant parser for the client's quasi-Python report literals
//!
//! `SpiderOak --space` was written against python 2, and it prints its space
//! report by `repr`-ing python values. That means the mapping and sequence
//! literals we need to read carry two legacy markers:
//!
//! * big integers have a trailing `L` (python 2 longs): `20792934558L`
//! * some strings have a `u` prefix (unicode strings): `u'Deleted Folders'`
//!
//! Both markers are only meaningful in marker position. A category named
//! `MusicL` or a device named `XL, ukulele` must come through untouched, so
//! this is a real tokenizer with a tiny grammar rather than a pile of string
//! replacements:
//!
//! ```text
//! value  := int | string | map | seq
//! int    := DIGIT+ 'L'?
//! string := 'u'? QUOTE char* QUOTE          (single or double quotes)
//! map    := '{' (string ':' value),* '}'
//! seq    := '[' value,* ']'
//! ```

use std::fmt;
use std::str::FromStr;

/// A single value out of the client's report
#[derive(Debug, PartialEq)]
pub enum Literal {
    /// A non-negative integer, `L` suffix already stripped
    Int(u64),
    /// A quoted string, `u` prefix and quotes already stripped
    Str(String),
    /// A `{'key': value}` mapping, entries in source order
    Map(Vec<(String, Literal)>),
    /// A `[value, ...]` sequence, in source order
    Seq(Vec<Literal>),
}

/// Where and why tokenizing a literal failed
#[derive(Debug, PartialEq)]
pub struct LiteralError {
    pub offset: usize,
    pub msg: String,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at byte {}", self.msg, self.offset)
    }
}

impl FromStr for Literal {
    type Err = LiteralError;

    fn from_str(s: &str) -> Result<Literal, LiteralError> {
        let mut parser = Parser { src: s, pos: 0 };
        let value = parser.value()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return Err(parser.error("trailing characters after literal"));
        }
        Ok(value)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, msg: &str) -> LiteralError {
        LiteralError {
            offset: self.pos,
            msg: msg.to_owned(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).cloned()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, b: u8) -> Result<(), LiteralError> {
        self.skip_whitespace();
        if self.peek() == Some(b) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", b as char)))
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'{') => self.map(),
            Some(b'[') => self.seq(),
            Some(b'\'') | Some(b'"') => Ok(Literal::Str(self.string()?)),
            // a `u` only starts a string if a quote follows, otherwise it is
            // just garbage input
            Some(b'u') if self.quote_follows() => Ok(Literal::Str(self.string()?)),
            Some(b) if b.is_ascii_digit() => self.int(),
            _ => Err(self.error("expected an integer, string, mapping or sequence")),
        }
    }

    fn quote_follows(&self) -> bool {
        match self.src.as_bytes().get(self.pos + 1) {
            Some(&b'\'') | Some(&b'"') => true,
            _ => false,
        }
    }

    fn int(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
        let digits = &self.src[start..self.pos];
        // the python 2 long marker sits directly after the digit run
        if self.peek() == Some(b'L') {
            self.bump();
        }
        digits.parse::<u64>().map(Literal::Int).map_err(|e| LiteralError {
            offset: start,
            msg: format!("invalid integer '{}': {}", digits, e),
        })
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        self.skip_whitespace();
        if self.peek() == Some(b'u') && self.quote_follows() {
            self.bump();
        }
        let quote = match self.peek() {
            Some(q @ b'\'') | Some(q @ b'"') => q,
            _ => return Err(self.error("expected a quoted string")),
        };
        self.bump();
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b) if b == quote => {
                    self.bump();
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.bump();
                    match self.peek() {
                        None => return Err(self.error("unterminated escape")),
                        Some(_) => {
                            let rest = &self.src[self.pos..];
                            let c = rest.chars().next().unwrap();
                            out.push(c);
                            self.pos += c.len_utf8();
                        }
                    }
                }
                Some(_) => {
                    let rest = &self.src[self.pos..];
                    let c = rest.chars().next().unwrap();
                    out.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    fn map(&mut self) -> Result<Literal, LiteralError> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.bump();
            return Ok(Literal::Map(entries));
        }
        loop {
            let key = self.string()?;
            self.expect(b':')?;
            let value = self.value()?;
            entries.push((key, value));
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                    self.skip_whitespace();
                }
                Some(b'}') => {
                    self.bump();
                    return Ok(Literal::Map(entries));
                }
                _ => return Err(self.error("expected ',' or '}' in mapping")),
            }
        }
    }

    fn seq(&mut self) -> Result<Literal, LiteralError> {
        self.expect(b'[')?;
        let mut values = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.bump();
            return Ok(Literal::Seq(values));
        }
        loop {
            values.push(self.value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => {
                    self.bump();
                    self.skip_whitespace();
                }
                Some(b']') => {
                    self.bump();
                    return Ok(Literal::Seq(values));
                }
                _ => return Err(self.error("expected ',' or ']' in sequence")),
            }
        }
    }
}
