//! Declarations to per-file entity records.

use crate::ast::{
    ColumnDef, ColumnOption, ConstraintKind, CreateSequence, CreateTable, Declaration,
    DefaultExpr, ReferenceSpec, TableConstraint, TableElement,
};
use crate::model::{Column, ColumnReference, EnumType, ForeignKey, Index, Sequence, Table};

/// Entities declared by one file, plus alterations that target tables by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialModel {
    pub source_file: String,
    pub tables: Vec<Table>,
    pub enums: Vec<EnumType>,
    pub sequences: Vec<Sequence>,
    pub deferred: Vec<Deferred>,
}

/// An alteration applied once every file's tables are known.
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    ForeignKey { table: String, foreign_key: ForeignKey },
    Index { table: String, index: Index },
}

impl Deferred {
    /// Name of the table the alteration applies to.
    pub fn table(&self) -> &str {
        match self {
            Deferred::ForeignKey { table, .. } | Deferred::Index { table, .. } => table,
        }
    }
}

/// Build the partial model for one file's declarations.
pub fn build_partial(source_file: &str, decls: Vec<Declaration>) -> PartialModel {
    let mut partial = PartialModel {
        source_file: source_file.to_string(),
        ..Default::default()
    };

    for decl in decls {
        match decl {
            Declaration::CreateTable(create) => {
                partial.tables.push(build_table(create, source_file));
            }
            Declaration::CreateEnum(create) => partial.enums.push(EnumType {
                name: create.name,
                values: create.values,
                source_file: source_file.to_string(),
            }),
            Declaration::CreateSequence(create) => {
                partial.sequences.push(build_sequence(create, source_file));
            }
            Declaration::AlterTableAddForeignKey(alter) => {
                partial.deferred.push(Deferred::ForeignKey {
                    table: alter.table,
                    foreign_key: foreign_key(alter.constraint_name, alter.columns, alter.reference),
                });
            }
            Declaration::CreateIndex(create) => partial.deferred.push(Deferred::Index {
                table: create.table,
                index: Index {
                    name: create.name,
                    columns: create.columns,
                    unique: create.unique,
                },
            }),
        }
    }

    log::debug!(
        "{}: {} tables, {} enums, {} sequences, {} deferred",
        source_file,
        partial.tables.len(),
        partial.enums.len(),
        partial.sequences.len(),
        partial.deferred.len()
    );

    partial
}

fn build_table(create: CreateTable, source_file: &str) -> Table {
    let mut table = Table::new(create.name, source_file);

    for element in create.elements {
        match element {
            TableElement::Column(def) => add_column(&mut table, def),
            TableElement::Constraint(constraint) => add_constraint(&mut table, constraint),
        }
    }

    for column in &mut table.columns {
        if table.primary_key.contains(&column.name) {
            column.is_primary_key = true;
            column.nullable = false;
        }
    }

    table
}

fn add_column(table: &mut Table, def: ColumnDef) {
    let mut column = Column::new(def.name, def.data_type);

    for constraint in def.constraints {
        match constraint.option {
            ColumnOption::PrimaryKey => {
                column.is_primary_key = true;
                column.nullable = false;
                push_unique(&mut table.primary_key, &column.name);
            }
            ColumnOption::NotNull => column.nullable = false,
            ColumnOption::Null => column.nullable = !column.is_primary_key,
            ColumnOption::Unique => {
                column.is_unique = true;
                table.unique_constraints.push(vec![column.name.clone()]);
            }
            ColumnOption::Default(expr) => column.default_value = Some(format_default(expr)),
            ColumnOption::References(reference) => {
                let fk = foreign_key(constraint.name, vec![column.name.clone()], reference);
                column.references = Some(ColumnReference {
                    table: fk.referenced_table.clone(),
                    columns: fk.referenced_columns.clone(),
                });
                table.foreign_keys.push(fk);
            }
        }
    }

    // `NULL` after `PRIMARY KEY` must not reopen nullability.
    if column.is_primary_key {
        column.nullable = false;
    }

    table.columns.push(column);
}

fn add_constraint(table: &mut Table, constraint: TableConstraint) {
    match constraint.kind {
        ConstraintKind::PrimaryKey(columns) => {
            for column in &columns {
                push_unique(&mut table.primary_key, column);
            }
        }
        ConstraintKind::Unique(columns) => table.unique_constraints.push(columns),
        ConstraintKind::ForeignKey { columns, reference } => {
            table
                .foreign_keys
                .push(foreign_key(constraint.name, columns, reference));
        }
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

/// Referenced columns default to the referencing ones.
fn foreign_key(
    constraint_name: Option<String>,
    columns: Vec<String>,
    reference: ReferenceSpec,
) -> ForeignKey {
    let referenced_columns = if reference.columns.is_empty() {
        columns.clone()
    } else {
        reference.columns
    };
    ForeignKey {
        constraint_name,
        columns,
        referenced_table: reference.table,
        referenced_columns,
        on_delete: reference.on_delete,
        on_update: reference.on_update,
    }
}

fn build_sequence(create: CreateSequence, source_file: &str) -> Sequence {
    Sequence {
        name: create.name,
        start: create.start.unwrap_or(1),
        increment: create.increment.unwrap_or(1),
        source_file: source_file.to_string(),
    }
}

/// Render a `DEFAULT` expression the way the model stores it.
pub fn format_default(expr: DefaultExpr) -> String {
    match expr {
        DefaultExpr::Literal(text) | DefaultExpr::Expression(text) => text,
        DefaultExpr::FunctionCall { name } => format!("{name}()"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataType, ReferentialAction};
    use crate::sql::{StatementParser, TolerantParser};
    use pretty_assertions::assert_eq;

    fn build(sql: &str) -> PartialModel {
        build_partial("test.sql", TolerantParser.parse(sql).unwrap())
    }

    #[test]
    fn test_columns_in_declaration_order() {
        let partial = build("CREATE TABLE t (a INT, b TEXT, c BOOLEAN, d DATE);");
        let names: Vec<_> = partial.tables[0]
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        assert!(partial.tables[0].columns.iter().all(|c| c.nullable));
    }

    #[test]
    fn test_table_level_primary_key_marks_columns() {
        let partial = build("CREATE TABLE t (a INT NULL, b INT, PRIMARY KEY (b, a));");
        let t = &partial.tables[0];
        assert_eq!(t.primary_key, vec!["b", "a"]);
        assert!(t.columns.iter().all(|c| c.is_primary_key && !c.nullable));
    }

    #[test]
    fn test_inline_reference_defaults_to_self() {
        let partial = build(
            "CREATE TABLE orders (user_id INT REFERENCES users ON DELETE CASCADE, note TEXT);",
        );
        let t = &partial.tables[0];
        assert_eq!(
            t.columns[0].references,
            Some(ColumnReference {
                table: "users".to_string(),
                columns: vec!["user_id".to_string()],
            })
        );
        assert_eq!(
            t.foreign_keys,
            vec![ForeignKey {
                constraint_name: None,
                columns: vec!["user_id".to_string()],
                referenced_table: "users".to_string(),
                referenced_columns: vec!["user_id".to_string()],
                on_delete: Some(ReferentialAction::Cascade),
                on_update: None,
            }]
        );
    }

    #[test]
    fn test_constraints_accumulate() {
        let partial = build(
            "CREATE TABLE t (
                id INT PRIMARY KEY,
                code TEXT UNIQUE,
                a INT,
                b INT,
                UNIQUE (a, b),
                CONSTRAINT fk_a FOREIGN KEY (a, b) REFERENCES other (x, y)
            );",
        );
        let t = &partial.tables[0];
        assert_eq!(t.primary_key, vec!["id"]);
        assert_eq!(
            t.unique_constraints,
            vec![vec!["code".to_string()], vec!["a".to_string(), "b".to_string()]]
        );
        assert!(t.column("code").unwrap().is_unique);
        assert_eq!(t.foreign_keys[0].constraint_name.as_deref(), Some("fk_a"));
        assert_eq!(t.foreign_keys[0].referenced_columns, vec!["x", "y"]);
    }

    #[test]
    fn test_default_values() {
        let partial = build(
            "CREATE TABLE t (
                a TIMESTAMPTZ DEFAULT now(),
                b UUID DEFAULT gen_random_uuid(),
                c TEXT DEFAULT 'x',
                d INT DEFAULT 42,
                e INT DEFAULT (1 + 2)
            );",
        );
        let defaults: Vec<_> = partial.tables[0]
            .columns
            .iter()
            .map(|c| c.default_value.as_deref().unwrap())
            .collect();
        assert_eq!(defaults, vec!["now()", "gen_random_uuid()", "'x'", "42", "(1 + 2)"]);
    }

    #[test]
    fn test_explicit_null_stays_nullable() {
        let partial = build(
            "CREATE TABLE t (a INT NULL, b INT DEFAULT 0 NULL, c INT NOT NULL, d INT PRIMARY KEY NULL);",
        );
        let nullable: Vec<_> = partial.tables[0].columns.iter().map(|c| c.nullable).collect();
        assert_eq!(nullable, vec![true, true, false, false]);
    }

    #[test]
    fn test_varchar_without_length() {
        let partial = build("CREATE TABLE t (a VARCHAR, b CHARACTER VARYING(20));");
        let cols = &partial.tables[0].columns;
        assert_eq!(cols[0].data_type, DataType::new("VARCHAR"));
        assert_eq!(cols[1].data_type, DataType::new("VARCHAR").with_params(vec![20]));
    }

    #[test]
    fn test_enum_sequence_and_deferred() {
        let partial = build(
            "CREATE TYPE status AS ENUM ('active', 'inactive');
             CREATE SEQUENCE s INCREMENT BY 2;
             ALTER TABLE orders ADD FOREIGN KEY (user_id) REFERENCES users;
             CREATE INDEX idx ON orders (user_id);",
        );
        assert_eq!(
            partial.enums,
            vec![EnumType {
                name: "status".to_string(),
                values: vec!["active".to_string(), "inactive".to_string()],
                source_file: "test.sql".to_string(),
            }]
        );
        assert_eq!(partial.sequences[0].start, 1);
        assert_eq!(partial.sequences[0].increment, 2);
        assert_eq!(partial.deferred.len(), 2);
        assert!(partial.deferred.iter().all(|d| d.table() == "orders"));
        let Deferred::ForeignKey { foreign_key, .. } = &partial.deferred[0] else {
            panic!("expected foreign key");
        };
        assert_eq!(foreign_key.referenced_columns, vec!["user_id"]);
    }
}
