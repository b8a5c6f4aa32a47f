//! Typed declarations produced by the statement parsers.
//!
//! One closed variant per recognized statement kind. Both parser
//! implementations produce these, and the model builder matches them
//! exhaustively.

use crate::model::{DataType, ReferentialAction};

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    CreateTable(CreateTable),
    CreateEnum(CreateEnum),
    CreateSequence(CreateSequence),
    AlterTableAddForeignKey(AlterTableAddForeignKey),
    CreateIndex(CreateIndex),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub elements: Vec<TableElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    Column(ColumnDef),
    Constraint(TableConstraint),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

/// A column-level option, optionally introduced by `CONSTRAINT name`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnConstraint {
    pub name: Option<String>,
    pub option: ColumnOption,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnOption {
    PrimaryKey,
    NotNull,
    Null,
    Unique,
    Default(DefaultExpr),
    References(ReferenceSpec),
}

/// Unevaluated `DEFAULT` expression.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultExpr {
    /// A single literal, kept as written (string literals keep their quotes).
    Literal(String),
    /// A bare function call; arguments are discarded.
    FunctionCall { name: String },
    /// Any other expression, whitespace-collapsed source text.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSpec {
    pub table: String,
    /// Empty when the source names no target columns.
    pub columns: Vec<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    pub name: Option<String>,
    pub kind: ConstraintKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    ForeignKey {
        columns: Vec<String>,
        reference: ReferenceSpec,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateEnum {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSequence {
    pub name: String,
    pub start: Option<i64>,
    pub increment: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableAddForeignKey {
    pub table: String,
    pub constraint_name: Option<String>,
    pub columns: Vec<String>,
    pub reference: ReferenceSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub name: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}
