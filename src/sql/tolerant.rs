//! Pattern-based parser that skips whatever it does not understand.

use super::cursor::Cursor;
use super::lexer::Token;
use super::{ParseError, StatementParser, strip_comments};
use crate::ast::{
    AlterTableAddForeignKey, ColumnConstraint, ColumnDef, ColumnOption, ConstraintKind,
    CreateEnum, CreateIndex, CreateSequence, CreateTable, Declaration, TableConstraint,
    TableElement,
};

/// Lenient DDL parser. Fails only on lexical errors: unterminated strings,
/// quoted identifiers and block comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct TolerantParser;

impl StatementParser for TolerantParser {
    fn name(&self) -> &'static str {
        "tolerant"
    }

    fn parse(&self, text: &str) -> Result<Vec<Declaration>, ParseError> {
        let source = strip_comments(text)?;
        let mut parser = Parser {
            cur: Cursor::new(&source, true)?,
        };
        Ok(parser.parse())
    }
}

struct Parser<'a> {
    cur: Cursor<'a>,
}

impl Parser<'_> {
    fn parse(&mut self) -> Vec<Declaration> {
        let mut decls = Vec::new();

        while self.cur.current() != &Token::Eof {
            match self.cur.current() {
                Token::Create => {
                    self.cur.advance();
                    if let Some(decl) = self.parse_create() {
                        decls.push(decl);
                    }
                }
                Token::Alter => {
                    self.cur.advance();
                    decls.extend(self.parse_alter());
                }
                _ => {
                    self.cur.advance();
                }
            }
        }

        decls
    }

    fn parse_create(&mut self) -> Option<Declaration> {
        // OR REPLACE, TEMP, UNLOGGED and friends
        while matches!(self.cur.current(), Token::Ident(_)) {
            self.cur.advance();
        }

        let unique = self.cur.eat(&Token::Unique);
        match self.cur.current() {
            Token::Table => {
                self.cur.advance();
                self.parse_table()
            }
            Token::Type => {
                self.cur.advance();
                self.parse_enum()
            }
            Token::Sequence => {
                self.cur.advance();
                self.parse_sequence()
            }
            Token::Index => {
                self.cur.advance();
                self.parse_index(unique)
            }
            _ => {
                self.cur.skip_statement();
                None
            }
        }
    }

    fn parse_table(&mut self) -> Option<Declaration> {
        if self.cur.at(&Token::If) {
            self.cur.advance();
            self.cur.eat(&Token::Not);
            self.cur.eat(&Token::Exists);
        }

        let Ok(name) = self.cur.qualified_name() else {
            self.cur.skip_statement();
            return None;
        };
        if !self.cur.eat(&Token::LParen) {
            self.cur.skip_statement();
            return None;
        }

        let mut elements = Vec::new();
        let mut constraint_name: Option<String> = None;

        loop {
            match self.cur.current() {
                Token::RParen => {
                    self.cur.advance();
                    break;
                }
                Token::Comma => {
                    self.cur.advance();
                    constraint_name = None;
                }
                Token::Semicolon | Token::Eof => break,
                Token::Constraint => {
                    self.cur.advance();
                    constraint_name = self.cur.ident_like();
                    if constraint_name.is_some() {
                        self.cur.advance();
                    }
                }
                Token::Primary | Token::Unique | Token::Foreign => {
                    if let Some(kind) = self.parse_table_constraint() {
                        elements.push(TableElement::Constraint(TableConstraint {
                            name: constraint_name.take(),
                            kind,
                        }));
                    }
                    self.cur.skip_until_element_end();
                }
                Token::Check => {
                    self.cur.advance();
                    self.cur.skip_parenthesized();
                    self.cur.skip_until_element_end();
                }
                Token::Ident(w)
                    if w.eq_ignore_ascii_case("exclude") || w.eq_ignore_ascii_case("like") =>
                {
                    self.cur.skip_until_element_end();
                }
                _ if self.cur.ident_like().is_some() => {
                    if let Some(col) = self.parse_column() {
                        elements.push(TableElement::Column(col));
                    }
                    self.cur.skip_until_element_end();
                }
                _ => {
                    self.cur.advance();
                }
            }
        }

        // Table options (WITH, INHERITS, PARTITION BY, ...)
        self.cur.skip_statement();

        Some(Declaration::CreateTable(CreateTable { name, elements }))
    }

    fn parse_table_constraint(&mut self) -> Option<ConstraintKind> {
        match self.cur.current() {
            Token::Primary => {
                self.cur.advance();
                self.cur.eat(&Token::Key);
                self.cur.column_list().ok().map(ConstraintKind::PrimaryKey)
            }
            Token::Unique => {
                self.cur.advance();
                while !matches!(
                    self.cur.current(),
                    Token::LParen | Token::Comma | Token::RParen | Token::Eof
                ) {
                    self.cur.advance(); // NULLS NOT DISTINCT, KEY
                }
                self.cur.column_list().ok().map(ConstraintKind::Unique)
            }
            _ => {
                self.cur.advance(); // FOREIGN
                self.cur.eat(&Token::Key);
                let columns = self.cur.column_list().ok()?;
                if !self.cur.eat(&Token::References) {
                    return None;
                }
                let reference = self.cur.reference().ok()?;
                Some(ConstraintKind::ForeignKey { columns, reference })
            }
        }
    }

    fn parse_column(&mut self) -> Option<ColumnDef> {
        let name = self.cur.ident_like()?;
        self.cur.advance();
        let data_type = self.cur.data_type().ok()?;

        let mut constraints = Vec::new();
        let mut pending_name: Option<String> = None;

        loop {
            let option = match self.cur.current() {
                Token::Comma | Token::RParen | Token::Semicolon | Token::Eof => break,
                Token::Constraint => {
                    self.cur.advance();
                    pending_name = self.cur.ident_like();
                    if pending_name.is_some() {
                        self.cur.advance();
                    }
                    continue;
                }
                Token::Primary => {
                    self.cur.advance();
                    self.cur.eat(&Token::Key);
                    ColumnOption::PrimaryKey
                }
                Token::Not => {
                    self.cur.advance();
                    if !self.cur.eat(&Token::Null) {
                        continue;
                    }
                    ColumnOption::NotNull
                }
                Token::Null => {
                    self.cur.advance();
                    ColumnOption::Null
                }
                Token::Unique => {
                    self.cur.advance();
                    ColumnOption::Unique
                }
                Token::Default => {
                    self.cur.advance();
                    match self.cur.default_expr() {
                        Ok(expr) => ColumnOption::Default(expr),
                        Err(_) => continue,
                    }
                }
                Token::References => {
                    self.cur.advance();
                    match self.cur.reference() {
                        Ok(reference) => ColumnOption::References(reference),
                        Err(_) => continue,
                    }
                }
                Token::Check => {
                    self.cur.advance();
                    self.cur.skip_parenthesized();
                    continue;
                }
                Token::LParen => {
                    self.cur.skip_parenthesized();
                    continue;
                }
                _ => {
                    self.cur.advance();
                    continue;
                }
            };
            constraints.push(ColumnConstraint {
                name: pending_name.take(),
                option,
            });
        }

        Some(ColumnDef {
            name,
            data_type,
            constraints,
        })
    }

    fn parse_enum(&mut self) -> Option<Declaration> {
        let Ok(name) = self.cur.qualified_name() else {
            self.cur.skip_statement();
            return None;
        };
        if !(self.cur.eat(&Token::As) && self.cur.eat(&Token::Enum) && self.cur.eat(&Token::LParen))
        {
            self.cur.skip_statement();
            return None;
        }

        let mut values = Vec::new();
        loop {
            match self.cur.current() {
                Token::Str(s) => {
                    values.push(s.clone());
                    self.cur.advance();
                }
                Token::RParen | Token::Semicolon | Token::Eof => break,
                _ => self.cur.advance(),
            }
        }
        self.cur.skip_statement();

        Some(Declaration::CreateEnum(CreateEnum { name, values }))
    }

    fn parse_sequence(&mut self) -> Option<Declaration> {
        if self.cur.at(&Token::If) {
            self.cur.advance();
            self.cur.eat(&Token::Not);
            self.cur.eat(&Token::Exists);
        }
        let Ok(name) = self.cur.qualified_name() else {
            self.cur.skip_statement();
            return None;
        };

        let mut start = None;
        let mut increment = None;
        loop {
            match self.cur.current() {
                Token::Semicolon | Token::Eof => break,
                Token::Start => {
                    self.cur.advance();
                    self.cur.eat(&Token::With);
                    start = self.number().or(start);
                }
                Token::Increment => {
                    self.cur.advance();
                    self.cur.eat(&Token::By);
                    increment = self.number().or(increment);
                }
                _ => self.cur.advance(),
            }
        }
        self.cur.skip_statement();

        Some(Declaration::CreateSequence(CreateSequence {
            name,
            start,
            increment,
        }))
    }

    fn number(&mut self) -> Option<i64> {
        match self.cur.current() {
            Token::Num(n) => {
                let value = n.parse().ok();
                self.cur.advance();
                value
            }
            _ => None,
        }
    }

    fn parse_index(&mut self, unique: bool) -> Option<Declaration> {
        let mut name = None;
        while !matches!(self.cur.current(), Token::On | Token::Semicolon | Token::Eof) {
            // CONCURRENTLY, IF NOT EXISTS, then the index name
            if !matches!(self.cur.current(), Token::If | Token::Not | Token::Exists)
                && !self.cur.at_word("concurrently")
            {
                name = self.cur.ident_like();
            }
            self.cur.advance();
        }
        if !self.cur.eat(&Token::On) {
            self.cur.skip_statement();
            return None;
        }
        self.cur.eat(&Token::Only);
        let table = self.cur.qualified_name().ok();
        while !matches!(self.cur.current(), Token::LParen | Token::Semicolon | Token::Eof) {
            self.cur.advance(); // USING method
        }
        let columns = self.cur.index_columns().ok();
        self.cur.skip_statement();

        Some(Declaration::CreateIndex(CreateIndex {
            name,
            table: table?,
            columns: columns?,
            unique,
        }))
    }

    fn parse_alter(&mut self) -> Vec<Declaration> {
        let mut decls = Vec::new();
        if !self.cur.eat(&Token::Table) {
            self.cur.skip_statement();
            return decls;
        }
        if self.cur.at(&Token::If) {
            self.cur.advance();
            self.cur.eat(&Token::Exists);
        }
        self.cur.eat(&Token::Only);
        let Ok(table) = self.cur.qualified_name() else {
            self.cur.skip_statement();
            return decls;
        };

        loop {
            match self.cur.current() {
                Token::Semicolon | Token::Eof => break,
                Token::Add => {
                    self.cur.advance();
                    let constraint_name = if self.cur.eat(&Token::Constraint) {
                        let name = self.cur.ident_like();
                        if name.is_some() {
                            self.cur.advance();
                        }
                        name
                    } else {
                        None
                    };
                    if !self.cur.eat(&Token::Foreign) {
                        continue;
                    }
                    self.cur.eat(&Token::Key);
                    let Ok(columns) = self.cur.column_list() else {
                        continue;
                    };
                    if !self.cur.eat(&Token::References) {
                        continue;
                    }
                    if let Ok(reference) = self.cur.reference() {
                        decls.push(Declaration::AlterTableAddForeignKey(
                            AlterTableAddForeignKey {
                                table: table.clone(),
                                constraint_name,
                                columns,
                                reference,
                            },
                        ));
                    }
                }
                Token::LParen => self.cur.skip_parenthesized(),
                _ => self.cur.advance(),
            }
        }
        self.cur.skip_statement();

        decls
    }
}
