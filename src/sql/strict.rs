//! Grammar-driven parser: anything a recognized statement does not admit is an error.

use super::cursor::Cursor;
use super::lexer::Token;
use super::{ParseError, StatementParser, strip_comments};
use crate::ast::{
    AlterTableAddForeignKey, ColumnConstraint, ColumnDef, ColumnOption, ConstraintKind,
    CreateEnum, CreateIndex, CreateSequence, CreateTable, Declaration, TableConstraint,
    TableElement,
};

/// Recursive-descent DDL parser with line-numbered errors.
///
/// Statements other than the recognized `CREATE` / `ALTER TABLE` forms are
/// skipped up to the next `;`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictParser;

impl StatementParser for StrictParser {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn parse(&self, text: &str) -> Result<Vec<Declaration>, ParseError> {
        let source = strip_comments(text)?;
        let mut parser = Parser {
            cur: Cursor::new(&source, false)?,
        };
        parser.parse()
    }
}

struct Parser<'a> {
    cur: Cursor<'a>,
}

impl Parser<'_> {
    fn parse(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut decls = Vec::new();
        loop {
            match self.cur.current() {
                Token::Eof => break,
                Token::Semicolon => self.cur.advance(),
                Token::Create => {
                    if let Some(decl) = self.parse_create()? {
                        decls.push(decl);
                    }
                }
                Token::Alter => decls.extend(self.parse_alter()?),
                _ => self.cur.skip_statement(),
            }
        }
        Ok(decls)
    }

    fn end_statement(&mut self) -> Result<(), ParseError> {
        match self.cur.current() {
            Token::Semicolon => {
                self.cur.advance();
                Ok(())
            }
            Token::Eof => Ok(()),
            _ => Err(self.cur.expected("`;`")),
        }
    }

    fn parse_create(&mut self) -> Result<Option<Declaration>, ParseError> {
        self.cur.advance(); // CREATE

        if self.cur.at(&Token::Unique) || self.cur.at(&Token::Index) {
            return self.parse_index().map(Some);
        }

        let qualified = self.cur.eat_word("temp")
            || self.cur.eat_word("temporary")
            || self.cur.eat_word("unlogged");

        match self.cur.current() {
            Token::Table => self.parse_table(),
            Token::Sequence => self.parse_sequence().map(Some),
            Token::Type if !qualified => self.parse_type(),
            _ => {
                self.cur.skip_statement();
                Ok(None)
            }
        }
    }

    fn parse_table(&mut self) -> Result<Option<Declaration>, ParseError> {
        self.cur.advance(); // TABLE
        self.cur.eat_if_not_exists()?;
        let name = self.cur.qualified_name()?;

        // CREATE TABLE ... AS / PARTITION OF / OF type carry no column list.
        if self.cur.at(&Token::As) || self.cur.at_word("partition") || self.cur.at_word("of") {
            self.cur.skip_statement();
            return Ok(None);
        }

        self.cur.expect(Token::LParen, "`(`")?;
        let mut elements = Vec::new();
        if !self.cur.eat(&Token::RParen) {
            loop {
                if let Some(element) = self.parse_element()? {
                    elements.push(element);
                }
                if self.cur.eat(&Token::Comma) {
                    continue;
                }
                self.cur.expect(Token::RParen, "`,` or `)`")?;
                break;
            }
        }

        self.parse_table_options()?;
        self.end_statement()?;
        Ok(Some(Declaration::CreateTable(CreateTable { name, elements })))
    }

    fn parse_table_options(&mut self) -> Result<(), ParseError> {
        loop {
            match self.cur.current() {
                Token::Semicolon | Token::Eof => return Ok(()),
                Token::With => {
                    self.cur.advance();
                    self.expect_parenthesized()?;
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("inherits") => {
                    self.cur.advance();
                    self.cur.column_list()?;
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("tablespace") => {
                    self.cur.advance();
                    self.cur.expect_ident("tablespace name")?;
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("partition") => {
                    self.cur.advance();
                    self.cur.expect(Token::By, "BY")?;
                    self.cur.expect_ident("partition strategy")?;
                    self.expect_parenthesized()?;
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("using") => {
                    self.cur.advance();
                    self.cur.expect_ident("access method")?;
                }
                _ => return Err(self.cur.expected("`;`")),
            }
        }
    }

    fn expect_parenthesized(&mut self) -> Result<(), ParseError> {
        if !self.cur.at(&Token::LParen) {
            return Err(self.cur.expected("`(`"));
        }
        self.cur.skip_parenthesized();
        Ok(())
    }

    fn parse_element(&mut self) -> Result<Option<TableElement>, ParseError> {
        let name = if self.cur.eat(&Token::Constraint) {
            Some(self.cur.expect_ident("constraint name")?)
        } else {
            None
        };

        match self.cur.current() {
            Token::Primary | Token::Unique | Token::Foreign | Token::Check => {
                let kind = self.parse_table_constraint()?;
                Ok(kind.map(|kind| TableElement::Constraint(TableConstraint { name, kind })))
            }
            Token::Ident(w) if w.eq_ignore_ascii_case("exclude") => {
                self.cur.skip_until_element_end();
                Ok(None)
            }
            _ if name.is_some() => Err(self.cur.expected("table constraint")),
            Token::Ident(w) if w.eq_ignore_ascii_case("like") => {
                self.cur.skip_until_element_end();
                Ok(None)
            }
            _ => self.parse_column().map(|c| Some(TableElement::Column(c))),
        }
    }

    fn parse_table_constraint(&mut self) -> Result<Option<ConstraintKind>, ParseError> {
        let kind = match self.cur.current() {
            Token::Primary => {
                self.cur.advance();
                self.cur.expect(Token::Key, "KEY")?;
                ConstraintKind::PrimaryKey(self.cur.column_list()?)
            }
            Token::Unique => {
                self.cur.advance();
                self.eat_nulls_distinct()?;
                ConstraintKind::Unique(self.cur.column_list()?)
            }
            Token::Foreign => {
                self.cur.advance();
                self.cur.expect(Token::Key, "KEY")?;
                let columns = self.cur.column_list()?;
                self.cur.expect(Token::References, "REFERENCES")?;
                let reference = self.cur.reference()?;
                ConstraintKind::ForeignKey { columns, reference }
            }
            _ => {
                self.cur.advance(); // CHECK
                self.expect_parenthesized()?;
                self.eat_no_inherit()?;
                return Ok(None);
            }
        };
        while self.cur.eat_deferrable_clause() {}
        Ok(Some(kind))
    }

    /// `NULLS [NOT] DISTINCT`
    fn eat_nulls_distinct(&mut self) -> Result<(), ParseError> {
        if self.cur.eat_word("nulls") {
            self.cur.eat(&Token::Not);
            if !self.cur.eat_word("distinct") {
                return Err(self.cur.expected("DISTINCT"));
            }
        }
        Ok(())
    }

    /// `NO INHERIT` after a check constraint.
    fn eat_no_inherit(&mut self) -> Result<(), ParseError> {
        if self.cur.eat(&Token::No) && !self.cur.eat_word("inherit") {
            return Err(self.cur.expected("INHERIT"));
        }
        Ok(())
    }

    fn parse_column(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.cur.expect_ident("column name")?;
        let data_type = self.cur.data_type()?;
        let mut constraints = Vec::new();
        let mut pending_name: Option<String> = None;

        loop {
            if self.cur.eat_deferrable_clause() {
                continue;
            }
            let option = match self.cur.current() {
                Token::Comma | Token::RParen if pending_name.is_none() => break,
                Token::Constraint if pending_name.is_none() => {
                    self.cur.advance();
                    pending_name = Some(self.cur.expect_ident("constraint name")?);
                    continue;
                }
                Token::Not => {
                    self.cur.advance();
                    self.cur.expect(Token::Null, "NULL")?;
                    ColumnOption::NotNull
                }
                Token::Null => {
                    self.cur.advance();
                    ColumnOption::Null
                }
                Token::Primary => {
                    self.cur.advance();
                    self.cur.expect(Token::Key, "KEY")?;
                    ColumnOption::PrimaryKey
                }
                Token::Unique => {
                    self.cur.advance();
                    self.eat_nulls_distinct()?;
                    ColumnOption::Unique
                }
                Token::Default => {
                    self.cur.advance();
                    ColumnOption::Default(self.cur.default_expr()?)
                }
                Token::References => {
                    self.cur.advance();
                    ColumnOption::References(self.cur.reference()?)
                }
                Token::Check => {
                    self.cur.advance();
                    self.expect_parenthesized()?;
                    self.eat_no_inherit()?;
                    pending_name = None;
                    continue;
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("collate") => {
                    self.cur.advance();
                    self.cur.qualified_name()?;
                    continue;
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("generated") => {
                    self.parse_generated()?;
                    pending_name = None;
                    continue;
                }
                _ => return Err(self.cur.expected("column constraint")),
            };
            constraints.push(ColumnConstraint {
                name: pending_name.take(),
                option,
            });
        }

        Ok(ColumnDef {
            name,
            data_type,
            constraints,
        })
    }

    /// `GENERATED { ALWAYS | BY DEFAULT } AS { IDENTITY [(...)] | (expr) STORED }`
    fn parse_generated(&mut self) -> Result<(), ParseError> {
        self.cur.advance(); // GENERATED
        if !self.cur.eat_word("always") {
            self.cur.expect(Token::By, "ALWAYS or BY DEFAULT")?;
            self.cur.expect(Token::Default, "DEFAULT")?;
        }
        self.cur.expect(Token::As, "AS")?;
        if self.cur.eat_word("identity") {
            if self.cur.at(&Token::LParen) {
                self.cur.skip_parenthesized();
            }
        } else {
            self.expect_parenthesized()?;
            if !self.cur.eat_word("stored") {
                return Err(self.cur.expected("STORED"));
            }
        }
        Ok(())
    }

    fn parse_type(&mut self) -> Result<Option<Declaration>, ParseError> {
        self.cur.advance(); // TYPE
        let name = self.cur.qualified_name()?;

        // Composite, range and shell types are not modelled.
        if !(self.cur.at(&Token::As) && self.cur.peek_at(1) == &Token::Enum) {
            self.cur.skip_statement();
            return Ok(None);
        }
        self.cur.advance();
        self.cur.advance();

        self.cur.expect(Token::LParen, "`(`")?;
        let mut values = Vec::new();
        if !self.cur.eat(&Token::RParen) {
            loop {
                match self.cur.current() {
                    Token::Str(s) => {
                        values.push(s.clone());
                        self.cur.advance();
                    }
                    _ => return Err(self.cur.expected("string literal")),
                }
                if self.cur.eat(&Token::Comma) {
                    continue;
                }
                self.cur.expect(Token::RParen, "`,` or `)`")?;
                break;
            }
        }

        self.end_statement()?;
        Ok(Some(Declaration::CreateEnum(CreateEnum { name, values })))
    }

    fn parse_sequence(&mut self) -> Result<Declaration, ParseError> {
        self.cur.advance(); // SEQUENCE
        self.cur.eat_if_not_exists()?;
        let name = self.cur.qualified_name()?;
        let mut start = None;
        let mut increment = None;

        loop {
            match self.cur.current() {
                Token::Semicolon | Token::Eof => break,
                Token::As => {
                    self.cur.advance();
                    self.cur.data_type()?;
                }
                Token::Start => {
                    self.cur.advance();
                    self.cur.eat(&Token::With);
                    start = Some(self.integer()?);
                }
                Token::Increment => {
                    self.cur.advance();
                    self.cur.eat(&Token::By);
                    increment = Some(self.integer()?);
                }
                Token::No => {
                    self.cur.advance();
                    if !(self.cur.eat_word("minvalue")
                        || self.cur.eat_word("maxvalue")
                        || self.cur.eat_word("cycle"))
                    {
                        return Err(self.cur.expected("MINVALUE, MAXVALUE or CYCLE"));
                    }
                }
                Token::Ident(w)
                    if ["minvalue", "maxvalue", "cache", "restart"]
                        .iter()
                        .any(|k| w.eq_ignore_ascii_case(k)) =>
                {
                    self.cur.advance();
                    self.cur.eat(&Token::With);
                    self.integer()?;
                }
                Token::Ident(w) if w.eq_ignore_ascii_case("cycle") => self.cur.advance(),
                Token::Ident(w) if w.eq_ignore_ascii_case("owned") => {
                    self.cur.advance();
                    self.cur.expect(Token::By, "BY")?;
                    self.cur.qualified_name()?;
                }
                _ => return Err(self.cur.expected("sequence option")),
            }
        }

        self.end_statement()?;
        Ok(Declaration::CreateSequence(CreateSequence {
            name,
            start,
            increment,
        }))
    }

    fn integer(&mut self) -> Result<i64, ParseError> {
        match self.cur.current().clone() {
            Token::Num(n) => {
                let value = n.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
                    text: n.clone(),
                    line: self.cur.span().line,
                })?;
                self.cur.advance();
                Ok(value)
            }
            _ => Err(self.cur.expected("integer")),
        }
    }

    /// `CREATE [UNIQUE] INDEX [CONCURRENTLY] [[IF NOT EXISTS] name] ON [ONLY] table [USING m] (cols) ...`
    fn parse_index(&mut self) -> Result<Declaration, ParseError> {
        let unique = self.cur.eat(&Token::Unique);
        self.cur.expect(Token::Index, "INDEX")?;
        self.cur.eat_word("concurrently");
        self.cur.eat_if_not_exists()?;

        let name = if self.cur.at(&Token::On) {
            None
        } else {
            Some(self.cur.qualified_name()?)
        };
        self.cur.expect(Token::On, "ON")?;
        self.cur.eat(&Token::Only);
        let table = self.cur.qualified_name()?;
        if self.cur.eat_word("using") {
            self.cur.expect_ident("index method")?;
        }
        let columns = self.cur.index_columns()?;

        // INCLUDE, WITH, TABLESPACE and partial-index predicates do not matter here.
        self.cur.skip_statement();

        Ok(Declaration::CreateIndex(CreateIndex {
            name,
            table,
            columns,
            unique,
        }))
    }

    /// `ALTER TABLE [IF EXISTS] [ONLY] name action [, action]*`
    ///
    /// Only `ADD [CONSTRAINT name] FOREIGN KEY` actions produce declarations.
    fn parse_alter(&mut self) -> Result<Vec<Declaration>, ParseError> {
        self.cur.advance(); // ALTER
        if !self.cur.eat(&Token::Table) {
            self.cur.skip_statement();
            return Ok(Vec::new());
        }
        self.cur.eat_if_exists();
        self.cur.eat(&Token::Only);
        let table = self.cur.qualified_name()?;

        let mut decls = Vec::new();
        loop {
            if let Some(fk) = self.parse_add_foreign_key(&table)? {
                decls.push(Declaration::AlterTableAddForeignKey(fk));
            } else {
                self.skip_action();
            }
            if self.cur.eat(&Token::Comma) {
                continue;
            }
            self.end_statement()?;
            return Ok(decls);
        }
    }

    fn parse_add_foreign_key(
        &mut self,
        table: &str,
    ) -> Result<Option<AlterTableAddForeignKey>, ParseError> {
        let is_fk = match (self.cur.current(), self.cur.peek_at(1), self.cur.peek_at(3)) {
            (Token::Add, Token::Foreign, _) => true,
            (Token::Add, Token::Constraint, Token::Foreign) => true,
            _ => false,
        };
        if !is_fk {
            return Ok(None);
        }

        self.cur.advance(); // ADD
        let constraint_name = if self.cur.eat(&Token::Constraint) {
            Some(self.cur.expect_ident("constraint name")?)
        } else {
            None
        };
        self.cur.expect(Token::Foreign, "FOREIGN")?;
        self.cur.expect(Token::Key, "KEY")?;
        let columns = self.cur.column_list()?;
        self.cur.expect(Token::References, "REFERENCES")?;
        let reference = self.cur.reference()?;
        while self.cur.eat_deferrable_clause() {}
        if self.cur.at(&Token::Not)
            && matches!(self.cur.peek_at(1), Token::Ident(w) if w.eq_ignore_ascii_case("valid"))
        {
            self.cur.advance();
            self.cur.advance();
        }

        Ok(Some(AlterTableAddForeignKey {
            table: table.to_string(),
            constraint_name,
            columns,
            reference,
        }))
    }

    /// Skip one comma-separated `ALTER TABLE` action.
    fn skip_action(&mut self) {
        loop {
            match self.cur.current() {
                Token::Comma | Token::Semicolon | Token::Eof => return,
                Token::LParen => self.cur.skip_parenthesized(),
                _ => self.cur.advance(),
            }
        }
    }
}
