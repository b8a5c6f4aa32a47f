//! SQL lexer for DDL statements.
//!
//! Runs on comment-free text (see [`super::comments`]). Every token carries a
//! byte span into that text so parsers can recover source slices for default
//! expressions and non-reserved keywords used as names.

use super::ParseError;
use super::comments::dollar_delimiter;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Table,
    Type,
    As,
    Enum,
    Sequence,
    Alter,
    Add,
    Only,
    Constraint,
    Primary,
    Key,
    Foreign,
    References,
    Unique,
    Not,
    Null,
    Default,
    Check,
    On,
    Delete,
    Update,
    Cascade,
    Restrict,
    Set,
    No,
    Action,
    If,
    Exists,
    Index,
    Start,
    With,
    Increment,
    By,
    Array,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Symbol(char),

    // End of input
    Eof,
}

impl Token {
    /// Keywords that may still name a table, column or type.
    pub fn is_non_reserved(&self) -> bool {
        matches!(
            self,
            Token::Type
                | Token::Enum
                | Token::Sequence
                | Token::Add
                | Token::Key
                | Token::Delete
                | Token::Update
                | Token::Cascade
                | Token::Restrict
                | Token::Set
                | Token::No
                | Token::Action
                | Token::If
                | Token::Exists
                | Token::Index
                | Token::Start
                | Token::Increment
                | Token::By
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "identifier `{s}`"),
            Token::Str(s) => write!(f, "string '{s}'"),
            Token::Num(n) => write!(f, "number {n}"),
            Token::LParen => f.write_str("`(`"),
            Token::RParen => f.write_str("`)`"),
            Token::LBracket => f.write_str("`[`"),
            Token::RBracket => f.write_str("`]`"),
            Token::Comma => f.write_str("`,`"),
            Token::Semicolon => f.write_str("`;`"),
            Token::Dot => f.write_str("`.`"),
            Token::Symbol(c) => write!(f, "`{c}`"),
            Token::Eof => f.write_str("end of input"),
            keyword => write!(f, "keyword {}", format!("{keyword:?}").to_uppercase()),
        }
    }
}

/// Byte range of a token in the lexed text, plus its 1-based line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// SQL lexer.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    current: Option<(usize, char)>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.char_indices().peekable();
        let current = chars.next();
        Self {
            input,
            chars,
            current,
            line: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.current.map(|(i, _)| i).unwrap_or(self.input.len())
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
        }
        self.current = self.chars.next();
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Quoted identifier or string literal body; a doubled quote is an escaped quote.
    fn read_quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let line = self.line;
        self.advance(); // skip opening quote
        let mut s = String::new();
        loop {
            match self.current_char() {
                Some(c) if c == quote => {
                    self.advance();
                    if self.current_char() == Some(quote) {
                        s.push(quote);
                        self.advance();
                    } else {
                        return Ok(s);
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None if quote == '\'' => return Err(ParseError::UnterminatedString { line }),
                None => return Err(ParseError::UnterminatedIdentifier { line }),
            }
        }
    }

    /// Body of an `E'...'` literal, where a backslash escapes the next character.
    fn read_escape_string(&mut self) -> Result<String, ParseError> {
        let line = self.line;
        self.advance(); // skip opening quote
        let mut s = String::new();
        loop {
            match self.current_char() {
                Some('\\') => {
                    self.advance();
                    let Some(c) = self.current_char() else {
                        return Err(ParseError::UnterminatedString { line });
                    };
                    s.push(match c {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        other => other,
                    });
                    self.advance();
                }
                Some('\'') => {
                    self.advance();
                    if self.current_char() == Some('\'') {
                        s.push('\'');
                        self.advance();
                    } else {
                        return Ok(s);
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => return Err(ParseError::UnterminatedString { line }),
            }
        }
    }

    fn read_dollar_quoted(&mut self, delim_len: usize) -> Result<String, ParseError> {
        let line = self.line;
        let start = self.offset();
        let delim = &self.input[start..start + delim_len];
        let body_start = start + delim_len;
        let Some(off) = self.input[body_start..].find(delim) else {
            return Err(ParseError::UnterminatedString { line });
        };
        let end = body_start + off + delim_len;
        let body = self.input[body_start..body_start + off].to_string();
        while self.offset() < end {
            self.advance();
        }
        Ok(body)
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        if self.current_char() == Some('-') {
            num.push('-');
            self.advance();
        }

        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(s: &str) -> Token {
        match s.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "TYPE" => Token::Type,
            "AS" => Token::As,
            "ENUM" => Token::Enum,
            "SEQUENCE" => Token::Sequence,
            "ALTER" => Token::Alter,
            "ADD" => Token::Add,
            "ONLY" => Token::Only,
            "CONSTRAINT" => Token::Constraint,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "UNIQUE" => Token::Unique,
            "NOT" => Token::Not,
            "NULL" => Token::Null,
            "DEFAULT" => Token::Default,
            "CHECK" => Token::Check,
            "ON" => Token::On,
            "DELETE" => Token::Delete,
            "UPDATE" => Token::Update,
            "CASCADE" => Token::Cascade,
            "RESTRICT" => Token::Restrict,
            "SET" => Token::Set,
            "NO" => Token::No,
            "ACTION" => Token::Action,
            "IF" => Token::If,
            "EXISTS" => Token::Exists,
            "INDEX" => Token::Index,
            "START" => Token::Start,
            "WITH" => Token::With,
            "INCREMENT" => Token::Increment,
            "BY" => Token::By,
            "ARRAY" => Token::Array,
            _ => Token::Ident(s.to_string()),
        }
    }

    pub fn next_token(&mut self) -> Result<Spanned, ParseError> {
        self.skip_whitespace();
        let start = self.offset();
        let line = self.line;

        let token = match self.current_char() {
            None => Token::Eof,
            Some('-') if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                Token::Num(self.read_number())
            }
            Some(c) if c.is_ascii_digit() => Token::Num(self.read_number()),
            Some('\'') => Token::Str(self.read_quoted('\'')?),
            Some('E' | 'e') if self.peek() == Some('\'') => {
                self.advance();
                Token::Str(self.read_escape_string()?)
            }
            Some('"') => Token::Ident(self.read_quoted('"')?),
            Some('`') => Token::Ident(self.read_quoted('`')?),
            Some('$') => match dollar_delimiter(&self.input[start..]) {
                Some(delim) => Token::Str(self.read_dollar_quoted(delim.len())?),
                None => {
                    self.advance();
                    Token::Symbol('$')
                }
            },
            Some(c) if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                Self::keyword_or_ident(&ident)
            }
            Some(c) => {
                self.advance();
                match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    ';' => Token::Semicolon,
                    '.' => Token::Dot,
                    other => Token::Symbol(other),
                }
            }
        };

        Ok(Spanned {
            token,
            span: Span {
                start,
                end: self.offset(),
                line,
            },
        })
    }

    /// Collect all tokens, ending with [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}
