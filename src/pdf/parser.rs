//! Tokenizer and object-literal parser

use std::collections::VecDeque;
use log::{debug, trace};

use crate::error::{ModelResult, ObjectModelError};
use super::{Dictionary, Document, Object, ObjectRef};

/// Lexical token of PDF object syntax
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Integer(i64),
    Real(f64),
    Name(String),
    String(Vec<u8>),
    HexString(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
    Keyword(String),
}

pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\0' | b'\t' | b'\n' | 0x0c | b'\r' | b' ')
}

pub(crate) fn is_delimiter(b: u8) -> bool {
    matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%')
}

fn is_regular(b: u8) -> bool {
    !is_whitespace(b) && !is_delimiter(b)
}

/// Splits a byte buffer into tokens, skipping whitespace and comments
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek_byte() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek_byte() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Read the next token with its starting offset, or `None` at end of input
    pub fn next_token(&mut self) -> ModelResult<Option<(usize, Token)>> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        let b = match self.peek_byte() {
            Some(b) => b,
            None => return Ok(None),
        };

        let token = match b {
            b'[' => {
                self.pos += 1;
                Token::ArrayStart
            }
            b']' => {
                self.pos += 1;
                Token::ArrayEnd
            }
            b'<' if self.data.get(self.pos + 1) == Some(&b'<') => {
                self.pos += 2;
                Token::DictStart
            }
            b'>' if self.data.get(self.pos + 1) == Some(&b'>') => {
                self.pos += 2;
                Token::DictEnd
            }
            b'<' => self.read_hex_string()?,
            b'(' => self.read_literal_string()?,
            b'/' => self.read_name()?,
            b'0'..=b'9' | b'+' | b'-' | b'.' => self.read_number()?,
            _ if is_regular(b) => {
                let word = self.read_regular();
                Token::Keyword(String::from_utf8_lossy(word).into_owned())
            }
            _ => {
                return Err(ObjectModelError::parse(
                    start,
                    format!("unexpected character '{}'", b as char),
                ))
            }
        };

        Ok(Some((start, token)))
    }

    fn read_regular(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.peek_byte().map_or(false, is_regular) {
            self.pos += 1;
        }
        &self.data[start..self.pos]
    }

    fn read_number(&mut self) -> ModelResult<Token> {
        let start = self.pos;
        let text = std::str::from_utf8(self.read_regular())?;
        if text.contains('.') {
            text.parse::<f64>()
                .map(Token::Real)
                .map_err(|_| ObjectModelError::parse(start, format!("invalid real '{}'", text)))
        } else {
            text.parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| ObjectModelError::parse(start, format!("invalid number '{}'", text)))
        }
    }

    fn read_name(&mut self) -> ModelResult<Token> {
        let start = self.pos;
        self.pos += 1; // Skip '/'
        let raw = self.read_regular();

        let mut bytes = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                let decoded = hex::decode(&raw[i + 1..i + 3])
                    .map_err(|_| ObjectModelError::parse(start + 1 + i, "invalid name escape"))?;
                bytes.extend_from_slice(&decoded);
                i += 3;
            } else {
                bytes.push(raw[i]);
                i += 1;
            }
        }

        let name = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
        Ok(Token::Name(name))
    }

    fn read_hex_string(&mut self) -> ModelResult<Token> {
        let start = self.pos;
        self.pos += 1; // Skip '<'
        let mut digits = Vec::new();

        loop {
            match self.peek_byte() {
                None => return Err(ObjectModelError::UnexpectedEof("hex string")),
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b) if is_whitespace(b) => self.pos += 1,
                Some(b) if b.is_ascii_hexdigit() => {
                    digits.push(b);
                    self.pos += 1;
                }
                Some(_) => return Err(ObjectModelError::parse(self.pos, "invalid hex string")),
            }
        }

        // Odd number of digits: final digit is followed by an implicit 0
        if digits.len() % 2 != 0 {
            digits.push(b'0');
        }

        let bytes = hex::decode(&digits)
            .map_err(|_| ObjectModelError::parse(start, "invalid hex string"))?;
        Ok(Token::HexString(bytes))
    }

    fn read_literal_string(&mut self) -> ModelResult<Token> {
        self.pos += 1; // Skip '('
        let mut content = Vec::new();
        let mut nesting = 1;

        loop {
            let b = self.peek_byte().ok_or(ObjectModelError::UnexpectedEof("literal string"))?;
            self.pos += 1;
            match b {
                b'(' => {
                    nesting += 1;
                    content.push(b);
                }
                b')' => {
                    nesting -= 1;
                    if nesting == 0 {
                        break;
                    }
                    content.push(b);
                }
                b'\\' => self.read_escape(&mut content)?,
                _ => content.push(b),
            }
        }

        Ok(Token::String(content))
    }

    fn read_escape(&mut self, content: &mut Vec<u8>) -> ModelResult<()> {
        let b = self.peek_byte().ok_or(ObjectModelError::UnexpectedEof("string escape"))?;
        self.pos += 1;
        match b {
            b'n' => content.push(b'\n'),
            b'r' => content.push(b'\r'),
            b't' => content.push(b'\t'),
            b'b' => content.push(0x08),
            b'f' => content.push(0x0c),
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek_byte() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                content.push((value & 0xff) as u8);
            }
            // Line continuation
            b'\r' => {
                if self.peek_byte() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            other => content.push(other),
        }
        Ok(())
    }
}

/// Deepest array / dictionary nesting accepted in one object
pub const MAX_NESTING_DEPTH: usize = 256;

/// Recursive-descent parser over the lexer's token stream
struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<(usize, Token)>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: Lexer::new(data),
            lookahead: VecDeque::new(),
            depth: 0,
        }
    }

    fn fill(&mut self, count: usize) -> ModelResult<()> {
        while self.lookahead.len() < count {
            match self.lexer.next_token()? {
                Some(token) => self.lookahead.push_back(token),
                None => break,
            }
        }
        Ok(())
    }

    fn peek(&mut self, n: usize) -> ModelResult<Option<&Token>> {
        self.fill(n + 1)?;
        Ok(self.lookahead.get(n).map(|(_, token)| token))
    }

    fn next(&mut self) -> ModelResult<Option<(usize, Token)>> {
        self.fill(1)?;
        Ok(self.lookahead.pop_front())
    }

    fn expect_next(&mut self, context: &'static str) -> ModelResult<(usize, Token)> {
        self.next()?.ok_or(ObjectModelError::UnexpectedEof(context))
    }

    fn expect_keyword(&mut self, keyword: &str) -> ModelResult<()> {
        match self.expect_next("keyword")? {
            (_, Token::Keyword(k)) if k == keyword => Ok(()),
            (offset, token) => Err(ObjectModelError::parse(
                offset,
                format!("expected '{}', found {:?}", keyword, token),
            )),
        }
    }

    fn parse_value(&mut self) -> ModelResult<Object> {
        let (offset, token) = self.expect_next("object")?;
        match token {
            Token::Integer(n) => self.parse_number_or_reference(n),
            Token::Real(r) => Ok(Object::Real(r)),
            Token::Name(n) => Ok(Object::Name(n)),
            Token::String(s) => Ok(Object::String(s)),
            Token::HexString(s) => Ok(Object::HexString(s)),
            Token::ArrayStart => self.nested(offset, Self::parse_array),
            Token::DictStart => self.nested(offset, Self::parse_dictionary).map(Object::Dictionary),
            Token::Keyword(k) => match k.as_str() {
                "null" => Ok(Object::Null),
                "true" => Ok(Object::Boolean(true)),
                "false" => Ok(Object::Boolean(false)),
                _ => Err(ObjectModelError::parse(offset, format!("unexpected keyword '{}'", k))),
            },
            Token::ArrayEnd | Token::DictEnd => {
                Err(ObjectModelError::parse(offset, format!("unexpected {:?}", token)))
            }
        }
    }

    fn nested<T>(
        &mut self,
        offset: usize,
        inner: impl FnOnce(&mut Self) -> ModelResult<T>,
    ) -> ModelResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ObjectModelError::parse(offset, "nesting too deep"));
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    fn parse_number_or_reference(&mut self, number: i64) -> ModelResult<Object> {
        let generation = match self.peek(0)? {
            Some(Token::Integer(g)) => *g,
            _ => return Ok(Object::Integer(number)),
        };
        let is_reference = matches!(self.peek(1)?, Some(Token::Keyword(k)) if k == "R");
        match (is_reference, u32::try_from(number), u16::try_from(generation)) {
            (true, Ok(number), Ok(generation)) => {
                self.lookahead.drain(..2);
                Ok(Object::Reference(ObjectRef::new(number, generation)))
            }
            _ => Ok(Object::Integer(number)),
        }
    }

    fn parse_array(&mut self) -> ModelResult<Object> {
        let mut array = Vec::new();
        loop {
            let at_end = match self.peek(0)? {
                None => return Err(ObjectModelError::UnexpectedEof("array")),
                Some(token) => *token == Token::ArrayEnd,
            };
            if at_end {
                self.next()?;
                break;
            }
            array.push(self.parse_value()?);
        }
        Ok(Object::Array(array))
    }

    fn parse_dictionary(&mut self) -> ModelResult<Dictionary> {
        let mut dict = Dictionary::new();
        loop {
            match self.expect_next("dictionary")? {
                (_, Token::DictEnd) => break,
                (_, Token::Name(key)) => {
                    let value = self.parse_value()?;
                    dict.set(key, value);
                }
                (offset, token) => {
                    return Err(ObjectModelError::parse(
                        offset,
                        format!("expected dictionary key, found {:?}", token),
                    ))
                }
            }
        }
        Ok(dict)
    }

    fn offset(&mut self) -> ModelResult<usize> {
        self.fill(1)?;
        Ok(self.lookahead.front().map_or(self.lexer.position(), |(offset, _)| *offset))
    }
}

/// Parse exactly one object literal. Surrounding whitespace and comments are allowed.
pub fn parse_object(data: &[u8]) -> ModelResult<Object> {
    trace!("Parsing object literal of {} bytes", data.len());
    let mut parser = Parser::new(data);
    let object = parser.parse_value()?;

    if parser.peek(0)?.is_some() {
        return Err(ObjectModelError::TrailingData { offset: parser.offset()? });
    }

    Ok(object)
}

/// Parse a document body: `n g obj ... endobj` definitions followed by a trailer
pub fn parse_document(data: &[u8]) -> ModelResult<Document> {
    debug!("Parsing document body of {} bytes", data.len());
    let mut parser = Parser::new(data);
    let mut objects = Vec::new();

    loop {
        let offset = parser.offset()?;
        match parser.next()? {
            None => return Err(ObjectModelError::invalid_document("missing trailer")),
            Some((_, Token::Integer(number))) => {
                let generation = match parser.expect_next("object header")? {
                    (_, Token::Integer(g)) => g,
                    (at, token) => {
                        return Err(ObjectModelError::parse(
                            at,
                            format!("expected generation number, found {:?}", token),
                        ))
                    }
                };
                parser.expect_keyword("obj")?;
                let value = parser.parse_value()?;
                parser.expect_keyword("endobj")?;

                let number = u32::try_from(number)
                    .map_err(|_| ObjectModelError::parse(offset, "object number out of range"))?;
                let generation = u16::try_from(generation)
                    .map_err(|_| ObjectModelError::parse(offset, "generation number out of range"))?;
                trace!("Parsed object {} {}", number, generation);
                objects.push((ObjectRef::new(number, generation), value));
            }
            Some((_, Token::Keyword(k))) if k == "trailer" => {
                let trailer = parser.parse_value()?;
                if !trailer.is_dictionary() {
                    return Err(ObjectModelError::InvalidObjectType {
                        expected: "Dictionary",
                        found: trailer.data_type().as_str(),
                    });
                }
                let mut document = Document::new(trailer);
                for (reference, object) in objects {
                    document.insert(reference, object);
                }
                debug!("Parsed document with {} objects", document.len());
                return Ok(document);
            }
            Some((at, token)) => {
                return Err(ObjectModelError::parse(
                    at,
                    format!("expected object definition or trailer, found {:?}", token),
                ))
            }
        }
    }
}
