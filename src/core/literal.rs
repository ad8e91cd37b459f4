// src/core/literal.rs
//! Small reader for Python literal text (`repr()` of dicts, lists, tuples,
//! strings, numbers, `True`/`False`/`None`).
//!
//! Spreadsheet round-trips stringify native collections, so seat-count cells
//! arrive as `"{'Labour': 353, 'Conservative': 196}"`. Only literals are
//! accepted; names, calls and operators (other than a leading sign) are errors.

use crate::error::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Str(_) => "str",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Bool(_) => "bool",
            Literal::None => "None",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Dict(_) => "dict",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self { Literal::Str(s) => Some(s), _ => None }
    }

    /// Integers, integral floats and bools (Python treats `True` as 1).
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Literal::Int(v) => Some(v),
            Literal::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
            Literal::Bool(b) => Some(b as i64),
            _ => None,
        }
    }
}

pub fn parse(text: &str) -> Result<Literal, ParseError> {
    let mut p = Parser { chars: text.chars().collect(), pos: 0 };
    p.skip_ws();
    let value = p.value()?;
    p.skip_ws();
    if p.pos < p.chars.len() {
        return Err(ParseError::Trailing { pos: p.pos });
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Result<char, ParseError> {
        let c = self.peek().ok_or(ParseError::Eof { pos: self.pos })?;
        self.pos += 1;
        Ok(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<(), ParseError> {
        let pos = self.pos;
        match self.bump()? {
            c if c == want => Ok(()),
            found => Err(ParseError::Unexpected { found, pos }),
        }
    }

    fn value(&mut self) -> Result<Literal, ParseError> {
        match self.peek() {
            None => Err(ParseError::Eof { pos: self.pos }),
            Some('{') => self.dict(),
            Some('[') => self.seq('[', ']').map(Literal::List),
            Some('(') => self.seq('(', ')').map(Literal::Tuple),
            Some(q @ ('\'' | '"')) => self.string(q).map(Literal::Str),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() => self.keyword(),
            Some(found) => Err(ParseError::Unexpected { found, pos: self.pos }),
        }
    }

    // Comma-separated items up to `close`; trailing comma allowed.
    fn items(&mut self, close: char) -> Result<Vec<Literal>, ParseError> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(out);
            }
            out.push(self.value()?);
            self.skip_ws();
            let pos = self.pos;
            match self.bump()? {
                ',' => continue,
                c if c == close => return Ok(out),
                found => return Err(ParseError::Unexpected { found, pos }),
            }
        }
    }

    fn seq(&mut self, open: char, close: char) -> Result<Vec<Literal>, ParseError> {
        self.expect(open)?;
        self.items(close)
    }

    fn dict(&mut self) -> Result<Literal, ParseError> {
        self.expect('{')?;
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Literal::Dict(out));
            }
            let key = self.value()?;
            self.skip_ws();
            self.expect(':')?;
            self.skip_ws();
            let val = self.value()?;
            out.push((key, val));
            self.skip_ws();
            let pos = self.pos;
            match self.bump()? {
                ',' => continue,
                '}' => return Ok(Literal::Dict(out)),
                found => return Err(ParseError::Unexpected { found, pos }),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, ParseError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Ok(out),
                '\\' => {
                    let pos = self.pos;
                    match self.bump()? {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        c @ ('\\' | '\'' | '"') => out.push(c),
                        'x' => out.push(self.hex_escape(2, pos)?),
                        'u' => out.push(self.hex_escape(4, pos)?),
                        found => return Err(ParseError::Unexpected { found, pos }),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, len: usize, pos: usize) -> Result<char, ParseError> {
        let mut digits = String::with_capacity(len);
        for _ in 0..len {
            digits.push(self.bump()?);
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(ParseError::Unexpected { found: 'x', pos })
    }

    fn number(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        if let Some(sign @ ('-' | '+')) = self.peek() {
            self.pos += 1;
            if matches!(self.peek(), Some(c) if c.is_alphabetic()) {
                // signed inf / nan
                return match self.keyword()? {
                    Literal::Float(f) if sign == '-' => Ok(Literal::Float(-f)),
                    lit @ Literal::Float(_) => Ok(lit),
                    _ => Err(ParseError::Number(self.chars[start..self.pos].iter().collect())),
                };
            }
        }
        let mut float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => float = true,
                'e' | 'E' => {
                    float = true;
                    if matches!(self.chars.get(self.pos + 1), Some('-' | '+')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().filter(|&&c| c != '_').collect();
        if float {
            text.parse::<f64>().map(Literal::Float).map_err(|_| ParseError::Number(text))
        } else {
            text.parse::<i64>().map(Literal::Int).map_err(|_| ParseError::Number(text))
        }
    }

    fn keyword(&mut self) -> Result<Literal, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            "nan" => Ok(Literal::Float(f64::NAN)),
            "inf" => Ok(Literal::Float(f64::INFINITY)),
            _ => Err(ParseError::Unexpected { found: self.chars[start], pos: start }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seat_dict() {
        let v = parse("{'Labour': 353, 'Conservative': 196}").unwrap();
        assert_eq!(
            v,
            Literal::Dict(vec![
                (Literal::Str(s!("Labour")), Literal::Int(353)),
                (Literal::Str(s!("Conservative")), Literal::Int(196)),
            ])
        );
    }

    #[test]
    fn nested_and_trailing_commas() {
        let v = parse(r#"{"a": [1, 2.5, (True, None),], 'b\'c': -3e2}"#).unwrap();
        let Literal::Dict(pairs) = v else { panic!("not a dict") };
        assert_eq!(pairs[0].1, Literal::List(vec![
            Literal::Int(1),
            Literal::Float(2.5),
            Literal::Tuple(vec![Literal::Bool(true), Literal::None]),
        ]));
        assert_eq!(pairs[1].0, Literal::Str(s!("b'c")));
        assert_eq!(pairs[1].1, Literal::Float(-300.0));
    }

    #[test]
    fn signed_inf_and_nan() {
        assert_eq!(parse("-inf").unwrap(), Literal::Float(f64::NEG_INFINITY));
        assert_eq!(parse("[+inf, 1]").unwrap(), Literal::List(vec![Literal::Float(f64::INFINITY), Literal::Int(1)]));
        let Literal::Float(f) = parse("-nan").unwrap() else { panic!("not a float") };
        assert!(f.is_nan());
        assert!(parse("-None").is_err());
        assert!(parse("-True").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("{'Labour': 353").is_err());
        assert!(parse("not a dict").is_err());
        assert!(parse("{'a': 1} extra").is_err());
        assert!(parse("{'a' 1}").is_err());
    }
}
