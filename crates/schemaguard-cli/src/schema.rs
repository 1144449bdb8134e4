//! Schema loading from JSON documents or DDL files.

use anyhow::{Context, Result};
use schemaguard_core::{Dialect, Schema};
use std::path::Path;

/// Load the schema at `path`.
///
/// Files with a `.sql` extension are read as `CREATE TABLE` DDL in `dialect`;
/// anything else is read as a JSON schema document.
pub fn load_schema(path: &Path, dialect: Dialect) -> Result<Schema> {
    if !is_ddl(path) {
        return Schema::load(path)
            .with_context(|| format!("Invalid schema in {}", path.display()));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path.display()))?;

    Schema::from_ddl(&content, dialect)
        .with_context(|| format!("Invalid schema in {}", path.display()))
}

fn is_ddl(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

/// Tables that declare no columns; every qualified reference to them fails.
pub fn tables_without_columns(schema: &Schema) -> Vec<&str> {
    schema
        .tables()
        .iter()
        .filter(|table| table.columns.is_empty())
        .map(|table| table.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_load_json_schema() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"tables":[{{"table_name":"users","columns":{{"user_id":"","name":""}}}}]}}"#
        )
        .unwrap();

        let schema = load_schema(file.path(), Dialect::Generic).unwrap();
        assert!(schema.has_column("users", "name"));
    }

    #[test]
    fn test_load_ddl_schema() {
        let mut file = Builder::new().suffix(".SQL").tempfile().unwrap();
        writeln!(file, "CREATE TABLE incidents (incident_id INT, status TEXT);").unwrap();

        let schema = load_schema(file.path(), Dialect::Generic).unwrap();
        assert_eq!(schema.available_columns("incidents"), vec!["incident_id", "status"]);
    }

    #[test]
    fn test_invalid_schema_names_the_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json").unwrap();

        let err = load_schema(file.path(), Dialect::Generic).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid schema in"));
    }

    #[test]
    fn test_missing_schema_file() {
        let result = load_schema(Path::new("/nonexistent/schema.json"), Dialect::Generic);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("failed to read schema file"), "{message}");

        let result = load_schema(Path::new("/nonexistent/schema.sql"), Dialect::Generic);
        assert!(result.is_err());
    }

    #[test]
    fn test_tables_without_columns() {
        let schema = Schema::from_json_str(
            r#"{"tables":[{"table_name":"empty"},{"table_name":"users","columns":{"id":""}}]}"#,
        )
        .unwrap();
        assert_eq!(tables_without_columns(&schema), vec!["empty"]);
    }
}
