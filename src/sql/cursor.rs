//! Token cursor and the sub-grammars both statement parsers share.

use super::ParseError;
use super::lexer::{Lexer, Span, Spanned, Token};
use super::types::{continues_phrase, normalize_type};
use crate::ast::{DefaultExpr, ReferenceSpec};
use crate::model::{DataType, ReferentialAction};

pub(super) struct Cursor<'a> {
    source: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    /// Skip malformed details (non-numeric type parameters and the like)
    /// instead of failing.
    lenient: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str, lenient: bool) -> Result<Self, ParseError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
            lenient,
        })
    }

    pub fn current(&self) -> &Token {
        self.peek_at(0)
    }

    pub fn peek_at(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    pub fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or(self.tokens.last())
            .map(|s| s.span)
            .unwrap_or_default()
    }

    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub fn at(&self, token: &Token) -> bool {
        self.current() == token
    }

    pub fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Unquoted-or-quoted identifier spelled `word`, case-insensitively.
    pub fn at_word(&self, word: &str) -> bool {
        matches!(self.current(), Token::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    pub fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn text(&self, span: Span) -> &'a str {
        &self.source[span.start..span.end]
    }

    /// The current token as a name, if it can be one.
    pub fn ident_like(&self) -> Option<String> {
        match self.current() {
            Token::Ident(s) => Some(s.clone()),
            t if t.is_non_reserved() => Some(self.text(self.span()).to_string()),
            _ => None,
        }
    }

    pub fn expected(&self, what: &'static str) -> ParseError {
        ParseError::Expected {
            expected: what,
            found: self.current().to_string(),
            line: self.span().line,
        }
    }

    pub fn expect(&mut self, token: Token, what: &'static str) -> Result<(), ParseError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    pub fn expect_ident(&mut self, what: &'static str) -> Result<String, ParseError> {
        match self.ident_like() {
            Some(name) => {
                self.advance();
                Ok(name)
            }
            None => Err(self.expected(what)),
        }
    }

    /// `[IF NOT EXISTS]`
    pub fn eat_if_not_exists(&mut self) -> Result<(), ParseError> {
        if self.at(&Token::If) && self.peek_at(1) == &Token::Not {
            self.advance();
            self.advance();
            self.expect(Token::Exists, "EXISTS")?;
        }
        Ok(())
    }

    /// `[IF EXISTS]`
    pub fn eat_if_exists(&mut self) {
        if self.at(&Token::If) && self.peek_at(1) == &Token::Exists {
            self.advance();
            self.advance();
        }
    }

    /// `name` or `schema.name`; only the trailing component is kept.
    pub fn qualified_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_ident("name")?;
        while self.eat(&Token::Dot) {
            name = self.expect_ident("name")?;
        }
        Ok(name)
    }

    /// `( name [, name]* )`
    pub fn column_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(Token::LParen, "`(`")?;
        let mut cols = Vec::new();
        loop {
            cols.push(self.expect_ident("column name")?);
            if self.eat(&Token::Comma) {
                continue;
            }
            self.expect(Token::RParen, "`,` or `)`")?;
            return Ok(cols);
        }
    }

    /// Column list of `CREATE INDEX`; expression elements are left out.
    pub fn index_columns(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(Token::LParen, "`(`")?;
        let mut cols = Vec::new();
        loop {
            let simple = matches!(
                self.peek_at(1),
                Token::Comma | Token::RParen | Token::Ident(_)
            );
            match self.ident_like() {
                Some(name) if simple => cols.push(name),
                _ => log::debug!("skipping index expression at line {}", self.span().line),
            }
            self.skip_until_element_end();
            match self.current() {
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    return Ok(cols);
                }
                _ => return Err(self.expected("`,` or `)`")),
            }
        }
    }

    /// Column data type with parameters and array suffix.
    pub fn data_type(&mut self) -> Result<DataType, ParseError> {
        let mut words = vec![self.expect_ident("data type")?];
        while self.eat(&Token::Dot) {
            words = vec![self.expect_ident("data type")?];
        }

        let mut params = Vec::new();
        loop {
            if self.at(&Token::LParen) && params.is_empty() {
                params = self.type_params()?;
                continue;
            }
            let word = self.text(self.span());
            if !word.is_empty() && continues_phrase(&words, word) {
                words.push(word.to_string());
                self.advance();
            } else {
                break;
            }
        }

        let mut is_array = false;
        loop {
            match self.current() {
                Token::LBracket => {
                    self.advance();
                    if matches!(self.current(), Token::Num(_)) {
                        self.advance();
                    }
                    self.expect(Token::RBracket, "`]`")?;
                    is_array = true;
                }
                Token::Array => {
                    self.advance();
                    is_array = true;
                }
                _ => break,
            }
        }

        Ok(normalize_type(&words, params, is_array))
    }

    fn type_params(&mut self) -> Result<Vec<u32>, ParseError> {
        self.advance(); // (
        let mut params = Vec::new();
        loop {
            match self.current().clone() {
                Token::Num(n) => match n.parse::<u32>() {
                    Ok(v) => {
                        params.push(v);
                        self.advance();
                    }
                    Err(_) if self.lenient => self.advance(),
                    Err(_) => {
                        return Err(ParseError::InvalidNumber {
                            text: n,
                            line: self.span().line,
                        });
                    }
                },
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    return Ok(params);
                }
                Token::Eof | Token::Semicolon => return Err(self.expected("`)`")),
                _ if self.lenient => self.advance(),
                _ => return Err(self.expected("type parameter")),
            }
        }
    }

    /// Expression after `DEFAULT`, up to the next column option or element end.
    pub fn default_expr(&mut self) -> Result<DefaultExpr, ParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let first = self.pos == start;
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen if depth == 0 => break,
                Token::RParen => depth -= 1,
                Token::Comma if depth == 0 => break,
                Token::Semicolon | Token::Eof => break,
                Token::Not
                | Token::Null
                | Token::Primary
                | Token::Unique
                | Token::References
                | Token::Check
                | Token::Constraint
                | Token::Default
                    if depth == 0 && !first =>
                {
                    break;
                }
                Token::Ident(w)
                    if depth == 0
                        && !first
                        && (w.eq_ignore_ascii_case("collate")
                            || w.eq_ignore_ascii_case("generated")) =>
                {
                    break;
                }
                _ => {}
            }
            self.advance();
        }

        let toks = &self.tokens[start..self.pos];
        let (Some(first), Some(last)) = (toks.first(), toks.last()) else {
            return Err(self.expected("default expression"));
        };

        if toks.len() == 1 {
            let literal = match &first.token {
                Token::Str(s) => format!("'{}'", s.replace('\'', "''")),
                _ => self.text(first.span).to_string(),
            };
            return Ok(DefaultExpr::Literal(literal));
        }

        if let Some(name) = self.function_name(toks) {
            return Ok(DefaultExpr::FunctionCall { name });
        }

        let raw = &self.source[first.span.start..last.span.end];
        Ok(DefaultExpr::Expression(
            raw.split_whitespace().collect::<Vec<_>>().join(" "),
        ))
    }

    /// `[schema.]name( ... )` spanning exactly `toks`.
    fn function_name(&self, toks: &[Spanned]) -> Option<String> {
        let open = toks.iter().position(|t| t.token == Token::LParen)?;
        if open == 0 || open % 2 == 0 {
            return None;
        }
        for (i, t) in toks[..open].iter().enumerate() {
            let ok = if i % 2 == 0 {
                matches!(t.token, Token::Ident(_)) || t.token.is_non_reserved()
            } else {
                t.token == Token::Dot
            };
            if !ok {
                return None;
            }
        }

        let mut depth = 0usize;
        for (i, t) in toks.iter().enumerate().skip(open) {
            match t.token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        if i + 1 != toks.len() {
                            return None;
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
        if depth != 0 {
            return None;
        }

        let name_tok = &toks[open - 1];
        Some(match &name_tok.token {
            Token::Ident(s) => s.clone(),
            _ => self.text(name_tok.span).to_string(),
        })
    }

    /// Target of `REFERENCES`, with its `ON DELETE` / `ON UPDATE` actions.
    pub fn reference(&mut self) -> Result<ReferenceSpec, ParseError> {
        let table = self.qualified_name()?;
        let columns = if self.at(&Token::LParen) {
            self.column_list()?
        } else {
            Vec::new()
        };

        let mut on_delete = None;
        let mut on_update = None;
        loop {
            if self.eat(&Token::On) {
                match self.current() {
                    Token::Delete => {
                        self.advance();
                        on_delete = Some(self.referential_action()?);
                    }
                    Token::Update => {
                        self.advance();
                        on_update = Some(self.referential_action()?);
                    }
                    _ => return Err(self.expected("DELETE or UPDATE")),
                }
            } else if self.eat_word("match") {
                self.expect_ident("match type")?;
            } else if !self.eat_deferrable_clause() {
                break;
            }
        }

        Ok(ReferenceSpec {
            table,
            columns,
            on_delete,
            on_update,
        })
    }

    fn referential_action(&mut self) -> Result<ReferentialAction, ParseError> {
        let action = match self.current() {
            Token::Cascade => ReferentialAction::Cascade,
            Token::Restrict => ReferentialAction::Restrict,
            Token::Set => {
                self.advance();
                match self.current() {
                    Token::Null => ReferentialAction::SetNull,
                    Token::Default => ReferentialAction::SetDefault,
                    _ => return Err(self.expected("NULL or DEFAULT")),
                }
            }
            Token::No => {
                self.advance();
                if !self.at(&Token::Action) {
                    return Err(self.expected("ACTION"));
                }
                ReferentialAction::NoAction
            }
            _ => return Err(self.expected("referential action")),
        };
        self.advance();
        Ok(action)
    }

    /// `[NOT] DEFERRABLE` or `INITIALLY DEFERRED | IMMEDIATE`.
    pub fn eat_deferrable_clause(&mut self) -> bool {
        if self.eat_word("deferrable") {
            return true;
        }
        if self.at(&Token::Not)
            && matches!(self.peek_at(1), Token::Ident(s) if s.eq_ignore_ascii_case("deferrable"))
        {
            self.advance();
            self.advance();
            return true;
        }
        if self.eat_word("initially") {
            self.advance();
            return true;
        }
        false
    }

    /// Skip to the `,` or `)` closing the current list element, without consuming it.
    pub fn skip_until_element_end(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Comma | Token::RParen if depth == 0 => break,
                Token::Semicolon | Token::Eof => break,
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip a balanced `( ... )` group if one starts here.
    pub fn skip_parenthesized(&mut self) {
        if !self.at(&Token::LParen) {
            return;
        }
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                Token::Semicolon | Token::Eof => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip past the next `;`.
    pub fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            self.advance();
        }
        self.eat(&Token::Semicolon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(sql: &str) -> Cursor<'_> {
        Cursor::new(sql, false).unwrap()
    }

    #[test]
    fn test_qualified_name_keeps_last_part() {
        let mut c = cursor(r#"public."Users""#);
        assert_eq!(c.qualified_name().unwrap(), "Users");
        assert_eq!(c.current(), &Token::Eof);
    }

    #[test]
    fn test_non_reserved_keyword_as_name() {
        let mut c = cursor("type key");
        assert_eq!(c.expect_ident("name").unwrap(), "type");
        assert_eq!(c.expect_ident("name").unwrap(), "key");
    }

    #[test]
    fn test_multi_word_types() {
        let mut c = cursor("character varying(40) timestamp(3) with time zone double precision");
        assert_eq!(c.data_type().unwrap().to_string(), "VARCHAR(40)");
        assert_eq!(c.data_type().unwrap().to_string(), "TIMESTAMPTZ(3)");
        assert_eq!(c.data_type().unwrap().to_string(), "DOUBLE");
    }

    #[test]
    fn test_array_types() {
        let mut c = cursor("text[] int[3][3] integer ARRAY");
        assert_eq!(c.data_type().unwrap().to_string(), "TEXT[]");
        assert_eq!(c.data_type().unwrap().to_string(), "INT[]");
        assert_eq!(c.data_type().unwrap().to_string(), "INT[]");
    }

    #[test]
    fn test_bad_type_param_strict_vs_lenient() {
        let mut strict = cursor("varchar(max)");
        assert!(strict.data_type().is_err());

        let mut lenient = Cursor::new("varchar(max)", true).unwrap();
        assert_eq!(lenient.data_type().unwrap().to_string(), "VARCHAR");
    }

    #[test]
    fn test_default_classification() {
        let mut c = cursor("now() NOT NULL");
        assert_eq!(
            c.default_expr().unwrap(),
            DefaultExpr::FunctionCall {
                name: "now".to_string()
            }
        );
        assert_eq!(c.current(), &Token::Not);

        let mut c = cursor("pg_catalog.gen_random_uuid()");
        assert_eq!(
            c.default_expr().unwrap(),
            DefaultExpr::FunctionCall {
                name: "gen_random_uuid".to_string()
            }
        );

        let mut c = cursor("'it''s',");
        assert_eq!(
            c.default_expr().unwrap(),
            DefaultExpr::Literal("'it''s'".to_string())
        );

        let mut c = cursor("NULL)");
        assert_eq!(c.default_expr().unwrap(), DefaultExpr::Literal("NULL".to_string()));

        let mut c = cursor("'active'::status  ,");
        assert_eq!(
            c.default_expr().unwrap(),
            DefaultExpr::Expression("'active'::status".to_string())
        );

        let mut c = cursor("(1 +\n   2)");
        assert_eq!(
            c.default_expr().unwrap(),
            DefaultExpr::Expression("(1 + 2)".to_string())
        );
    }

    #[test]
    fn test_function_call_with_tail_is_expression() {
        let mut c = cursor("now() + interval '1 day'");
        assert!(matches!(c.default_expr().unwrap(), DefaultExpr::Expression(_)));
    }

    #[test]
    fn test_reference_actions() {
        let mut c = cursor("users(id) ON DELETE SET NULL ON UPDATE NO ACTION DEFERRABLE");
        let r = c.reference().unwrap();
        assert_eq!(r.table, "users");
        assert_eq!(r.columns, vec!["id"]);
        assert_eq!(r.on_delete, Some(ReferentialAction::SetNull));
        assert_eq!(r.on_update, Some(ReferentialAction::NoAction));
        assert_eq!(c.current(), &Token::Eof);
    }

    #[test]
    fn test_index_columns_skip_expressions() {
        let mut c = cursor("(tenant_id, lower(email), created_at DESC)");
        assert_eq!(c.index_columns().unwrap(), vec!["tenant_id", "created_at"]);
    }

    #[test]
    fn test_skip_statement_consumes_semicolon() {
        let mut c = cursor("CREATE VIEW v AS SELECT (1); CREATE");
        c.skip_statement();
        assert_eq!(c.current(), &Token::Create);
    }
}
