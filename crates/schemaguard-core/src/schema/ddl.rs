//! Schema construction from `CREATE TABLE` DDL.

use super::{Schema, Table};
use crate::error::SchemaLoadError;
use crate::parser::parse_sql_with_dialect;
use crate::types::Dialect;
use sqlparser::ast::{ObjectName, Statement};

impl Schema {
    /// Build a schema from DDL containing `CREATE TABLE` statements.
    ///
    /// Column descriptions are the declared data types. Statements other than
    /// `CREATE TABLE` are ignored. Qualified names keep only the table part.
    pub fn from_ddl(sql: &str, dialect: Dialect) -> Result<Self, SchemaLoadError> {
        let statements =
            parse_sql_with_dialect(sql, dialect).map_err(|err| err.with_dialect(dialect))?;

        let tables: Vec<Table> = statements
            .iter()
            .filter_map(|statement| match statement {
                Statement::CreateTable(create) => {
                    let mut table = Table::new(unqualified_name(&create.name));
                    for column in &create.columns {
                        table = table
                            .with_column(column.name.value.clone(), column.data_type.to_string());
                    }
                    Some(table)
                }
                _ => None,
            })
            .collect();

        if tables.is_empty() {
            return Err(SchemaLoadError::Empty);
        }

        Self::from_tables(tables)
    }
}

/// The last part of `schema.table`, unquoted.
fn unqualified_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|part| {
            part.as_ident()
                .map(|ident| ident.value.clone())
                .unwrap_or_else(|| part.to_string())
        })
        .unwrap_or_default()
}
