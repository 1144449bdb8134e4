//! SQL statement parsing.
//!
//! [`parse`] runs a light structural pass over the token stream: it finds the
//! statement kind, the tables named in `FROM`/`JOIN` position, their aliases
//! and every dotted column reference. It does not need the statement to be
//! grammatical. [`parse_sql_with_dialect`] runs the full `sqlparser` parser
//! and is used for strict mode and for DDL schema sources.

mod extract;
mod token;

pub use token::{tokenize, Name, Punctuation, SqlToken, TokenKind};

use crate::error::{ParseError, ParseErrorKind, Position};
use crate::types::{ColumnRef, Dialect, StatementKind, ValidateOptions};
use serde::Serialize;
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use std::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "tracing")]
use tracing::debug;

/// Structural summary of one SQL statement.
///
/// All names are lowercased. Collections are ordered so iteration (and any
/// diagnostic built from them) is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStatement {
    pub kind: StatementKind,
    /// Tables named after `FROM`, `JOIN` or a comma in a `FROM` list,
    /// excluding CTE names
    pub referenced_tables: BTreeSet<String>,
    /// Dotted names outside table position, as `(qualifier, column)`
    pub qualified_columns: BTreeSet<ColumnRef>,
    /// Qualified columns resolved to `(table, column)` through the bindings
    /// in scope where each appears. References through CTEs and derived
    /// tables are left out.
    pub column_refs: BTreeSet<ColumnRef>,
    /// Every alias binding in the statement, alias to table name. An alias
    /// bound in several scopes keeps its last binding; resolution uses
    /// [`ParsedStatement::column_refs`] instead.
    pub aliases: BTreeMap<String, String>,
    /// Names bound by `name AS (...)` in a `WITH` clause
    pub cte_names: BTreeSet<String>,
    /// Aliases of parenthesized subqueries in table position
    pub derived_aliases: BTreeSet<String>,
}

impl ParsedStatement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            referenced_tables: BTreeSet::new(),
            qualified_columns: BTreeSet::new(),
            column_refs: BTreeSet::new(),
            aliases: BTreeMap::new(),
            cte_names: BTreeSet::new(),
            derived_aliases: BTreeSet::new(),
        }
    }
}

/// Parse a single statement with the default options.
pub fn parse(raw_sql: &str) -> Result<ParsedStatement, ParseError> {
    parse_with_options(raw_sql, &ValidateOptions::default())
}

pub fn parse_with_dialect(raw_sql: &str, dialect: Dialect) -> Result<ParsedStatement, ParseError> {
    parse_with_options(raw_sql, &ValidateOptions::default().with_dialect(dialect))
}

/// Parse a single statement.
///
/// Fails on empty input, tokenizer errors, unbalanced parentheses and input
/// holding more than one non-empty statement. With
/// [`ValidateOptions::strict_syntax`] the statement must also be accepted by
/// the full SQL parser for the selected dialect.
pub fn parse_with_options(
    raw_sql: &str,
    options: &ValidateOptions,
) -> Result<ParsedStatement, ParseError> {
    if raw_sql.trim().is_empty() {
        return Err(ParseError::empty());
    }

    let dialect = options.dialect;
    let tokens = tokenize(raw_sql, dialect)?;
    let statement = single_statement(&tokens)?;
    check_balanced(statement).map_err(|err| err.with_dialect(dialect))?;

    let kind = statement_kind(statement);
    let parsed = extract::extract(kind, statement);

    if options.strict_syntax {
        parse_sql_with_dialect(raw_sql, dialect).map_err(|err| err.with_dialect(dialect))?;
    }

    #[cfg(feature = "tracing")]
    debug!(
        kind = %parsed.kind,
        tables = parsed.referenced_tables.len(),
        columns = parsed.qualified_columns.len(),
        "parsed statement"
    );

    Ok(parsed)
}

/// The only non-empty statement in `tokens`.
fn single_statement(tokens: &[SqlToken]) -> Result<&[SqlToken], ParseError> {
    let mut statements = tokens
        .split(|token| matches!(token.kind, TokenKind::Terminator))
        .filter(|statement| !statement.is_empty());

    let first = statements.next().ok_or_else(ParseError::empty)?;

    if let Some(second) = statements.next() {
        let mut err = ParseError::new("multiple statements; submit one statement at a time")
            .with_kind(ParseErrorKind::MultipleStatements);
        err.position = second.first().map(|token| token.position);
        return Err(err);
    }

    Ok(first)
}

fn check_balanced(tokens: &[SqlToken]) -> Result<(), ParseError> {
    let mut open: Vec<Position> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Punctuation(Punctuation::OpenParen) => open.push(token.position),
            TokenKind::Punctuation(Punctuation::CloseParen) => {
                if open.pop().is_none() {
                    return Err(unbalanced("unexpected ')'", token.position));
                }
            }
            _ => {}
        }
    }

    match open.last() {
        Some(position) => Err(unbalanced("unclosed '('", *position)),
        None => Ok(()),
    }
}

fn unbalanced(message: &str, position: Position) -> ParseError {
    ParseError::with_position(
        format!("unbalanced parentheses: {message}"),
        position.line,
        position.column,
    )
    .with_kind(ParseErrorKind::UnbalancedParentheses)
}

/// Statement kind from the leading keyword, looking through opening
/// parentheses and a `WITH` prologue.
fn statement_kind(tokens: &[SqlToken]) -> StatementKind {
    let Some(lead) = tokens
        .iter()
        .position(|token| !token.is_punctuation(Punctuation::OpenParen))
    else {
        return StatementKind::Malformed;
    };

    match &tokens[lead].kind {
        TokenKind::Keyword(Keyword::WITH) => kind_after_with(&tokens[lead + 1..]),
        TokenKind::Keyword(keyword) => kind_from_keyword(*keyword).unwrap_or(StatementKind::Other),
        TokenKind::Name(_) => StatementKind::Other,
        TokenKind::Literal
        | TokenKind::Operator
        | TokenKind::Punctuation(_)
        | TokenKind::Terminator => StatementKind::Malformed,
    }
}

fn kind_from_keyword(keyword: Keyword) -> Option<StatementKind> {
    let kind = match keyword {
        Keyword::SELECT => StatementKind::Select,
        Keyword::INSERT => StatementKind::Insert,
        Keyword::UPDATE => StatementKind::Update,
        Keyword::DELETE => StatementKind::Delete,
        Keyword::CREATE => StatementKind::Create,
        Keyword::DROP => StatementKind::Drop,
        Keyword::ALTER => StatementKind::Alter,
        Keyword::TRUNCATE => StatementKind::Truncate,
        _ => return None,
    };
    Some(kind)
}

/// First top-level SELECT/INSERT/UPDATE/DELETE after the CTE list.
fn kind_after_with(tokens: &[SqlToken]) -> StatementKind {
    let mut depth = 0usize;

    for token in tokens {
        match &token.kind {
            TokenKind::Punctuation(Punctuation::OpenParen) => depth += 1,
            TokenKind::Punctuation(Punctuation::CloseParen) => depth = depth.saturating_sub(1),
            TokenKind::Keyword(
                keyword @ (Keyword::SELECT | Keyword::INSERT | Keyword::UPDATE | Keyword::DELETE),
            ) if depth == 0 => {
                return kind_from_keyword(*keyword).unwrap_or(StatementKind::Other);
            }
            _ => {}
        }
    }

    StatementKind::Other
}

/// Parse SQL using the specified dialect
pub fn parse_sql_with_dialect(sql: &str, dialect: Dialect) -> Result<Vec<Statement>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    match Parser::parse_sql(sqlparser_dialect.as_ref(), sql) {
        Ok(statements) => Ok(statements),
        Err(primary_err) => {
            // Generic rejects Postgres-only operators (`?`, `->>`, `::`) that
            // generated SQL uses often.
            if matches!(dialect, Dialect::Generic) && looks_like_postgres_syntax(sql) {
                let postgres = PostgreSqlDialect {};
                if let Ok(statements) = Parser::parse_sql(&postgres, sql) {
                    return Ok(statements);
                }
            }
            Err(primary_err.into())
        }
    }
}

fn looks_like_postgres_syntax(sql: &str) -> bool {
    sql.contains("::")
        || sql.contains("->")
        || sql.contains("?|")
        || sql.contains("?&")
        || sql.contains(" ? ")
        || sql.contains(" ?\n")
        || sql.contains("? '")
}

/// Parse SQL using the generic dialect
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>, ParseError> {
    parse_sql_with_dialect(sql, Dialect::Generic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(parsed: &ParsedStatement) -> Vec<&str> {
        parsed.referenced_tables.iter().map(String::as_str).collect()
    }

    fn columns(parsed: &ParsedStatement) -> Vec<String> {
        parsed
            .qualified_columns
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_parse_select_with_join() {
        let parsed = parse(
            "SELECT u.name, i.status FROM users u JOIN incidents i ON u.user_id = i.user_id",
        )
        .unwrap();

        assert_eq!(parsed.kind, StatementKind::Select);
        assert_eq!(tables(&parsed), vec!["incidents", "users"]);
        assert_eq!(
            columns(&parsed),
            vec!["i.status", "i.user_id", "u.name", "u.user_id"]
        );
        assert_eq!(parsed.aliases.get("u").map(String::as_str), Some("users"));
        assert_eq!(parsed.aliases.get("i").map(String::as_str), Some("incidents"));
    }

    #[test]
    fn test_names_are_lowercased() {
        let parsed = parse("SELECT Users.Name FROM USERS").unwrap();
        assert_eq!(tables(&parsed), vec!["users"]);
        assert_eq!(columns(&parsed), vec!["users.name"]);
    }

    #[test]
    fn test_alias_with_as() {
        let parsed = parse("SELECT x.id FROM accounts AS x").unwrap();
        assert_eq!(parsed.aliases.get("x").map(String::as_str), Some("accounts"));
        assert!(parsed
            .column_refs
            .contains(&ColumnRef::new("accounts", "id")));
    }

    #[test]
    fn test_comma_join_tables() {
        let parsed = parse("SELECT * FROM users u, incidents i WHERE u.user_id = i.user_id").unwrap();
        assert_eq!(tables(&parsed), vec!["incidents", "users"]);
        assert_eq!(parsed.aliases.len(), 2);
    }

    #[test]
    fn test_select_list_commas_are_not_tables() {
        let parsed = parse("SELECT a, b, c FROM t").unwrap();
        assert_eq!(tables(&parsed), vec!["t"]);
    }

    #[test]
    fn test_subquery_from_is_extracted() {
        let parsed = parse(
            "SELECT name FROM users WHERE user_id IN (SELECT user_id FROM incidents), extra",
        )
        .unwrap();
        assert_eq!(tables(&parsed), vec!["incidents", "users"]);
    }

    #[test]
    fn test_extract_from_is_not_table_position() {
        let parsed = parse("SELECT EXTRACT(YEAR FROM created_at) FROM incidents").unwrap();
        assert_eq!(tables(&parsed), vec!["incidents"]);
    }

    #[test]
    fn test_is_distinct_from_is_not_table_position() {
        let parsed = parse("SELECT * FROM t WHERE a IS NOT DISTINCT FROM b").unwrap();
        assert_eq!(tables(&parsed), vec!["t"]);
    }

    #[test]
    fn test_table_function_is_not_a_table() {
        let parsed = parse("SELECT * FROM generate_series(1, 10)").unwrap();
        assert!(parsed.referenced_tables.is_empty());
    }

    #[test]
    fn test_qualified_table_uses_last_segment() {
        let parsed = parse("SELECT public.users.name FROM public.users").unwrap();
        assert_eq!(tables(&parsed), vec!["users"]);
        assert_eq!(columns(&parsed), vec!["users.name"]);
    }

    #[test]
    fn test_cte_names_are_not_tables() {
        let parsed = parse(
            "WITH recent AS (SELECT * FROM incidents) SELECT r.status FROM recent r",
        )
        .unwrap();
        assert_eq!(parsed.kind, StatementKind::Select);
        assert_eq!(tables(&parsed), vec!["incidents"]);
        assert!(parsed.cte_names.contains("recent"));
        assert!(parsed.column_refs.is_empty());
    }

    #[test]
    fn test_derived_table_alias() {
        let parsed = parse("SELECT d.total FROM (SELECT count(*) AS total FROM users) AS d").unwrap();
        assert_eq!(tables(&parsed), vec!["users"]);
        assert!(parsed.derived_aliases.contains("d"));
        assert!(parsed.column_refs.is_empty());
    }

    #[test]
    fn test_derived_table_keeps_from_list_open() {
        let parsed =
            parse("SELECT * FROM (SELECT user_id FROM incidents) d, users u WHERE d.user_id = u.user_id")
                .unwrap();
        assert_eq!(tables(&parsed), vec!["incidents", "users"]);
    }

    #[test]
    fn test_qualifier_without_alias_resolves_to_itself() {
        let parsed = parse("SELECT users.name FROM users").unwrap();
        assert!(parsed.column_refs.contains(&ColumnRef::new("users", "name")));
    }

    #[test]
    fn test_statement_kinds() {
        let cases = [
            ("SELECT 1", StatementKind::Select),
            ("select 1", StatementKind::Select),
            ("(SELECT 1) UNION (SELECT 2)", StatementKind::Select),
            ("INSERT INTO t VALUES (1)", StatementKind::Insert),
            ("UPDATE t SET a = 1", StatementKind::Update),
            ("DELETE FROM t", StatementKind::Delete),
            ("CREATE TABLE t (a INT)", StatementKind::Create),
            ("DROP TABLE t", StatementKind::Drop),
            ("ALTER TABLE t ADD COLUMN b INT", StatementKind::Alter),
            ("TRUNCATE t", StatementKind::Truncate),
            ("EXPLAIN SELECT 1", StatementKind::Other),
            ("SHOW TABLES", StatementKind::Other),
            ("VALUES (1)", StatementKind::Other),
            ("'users'", StatementKind::Malformed),
            ("42", StatementKind::Malformed),
            ("* FROM users", StatementKind::Malformed),
        ];

        for (sql, expected) in cases {
            assert_eq!(parse(sql).unwrap().kind, expected, "sql: {sql}");
        }
    }

    #[test]
    fn test_with_resolves_to_main_statement() {
        let parsed = parse("WITH x AS (SELECT 1) DELETE FROM t WHERE id IN (SELECT * FROM x)").unwrap();
        assert_eq!(parsed.kind, StatementKind::Delete);

        let parsed = parse("WITH RECURSIVE x AS (SELECT 1) SELECT * FROM x").unwrap();
        assert_eq!(parsed.kind, StatementKind::Select);
    }

    #[test]
    fn test_empty_input() {
        for sql in ["", "   \n\t", ";", ";;", "-- only a comment", "/* block */ ;"] {
            let err = parse(sql).unwrap_err();
            assert_eq!(err.kind, ParseErrorKind::Empty, "sql: {sql:?}");
            assert_eq!(err.message, "empty statement");
        }
    }

    #[test]
    fn test_trailing_terminators_ignored() {
        let parsed = parse("SELECT 1;;").unwrap();
        assert_eq!(parsed.kind, StatementKind::Select);
    }

    #[test]
    fn test_multiple_statements_rejected() {
        let err = parse("SELECT 1; SELECT 2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MultipleStatements);
        assert_eq!(err.position, Some(Position { line: 1, column: 11 }));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse("SELECT count(* FROM users").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedParentheses);
        assert_eq!(err.position, Some(Position { line: 1, column: 13 }));

        let err = parse("SELECT a) FROM users").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedParentheses);
    }

    #[test]
    fn test_unterminated_quote_is_lexer_error() {
        let err = parse("SELECT * FROM users WHERE name = 'bob").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::LexerError);
    }

    #[test]
    fn test_strict_mode_rejects_ungrammatical_select() {
        let sql = "SELECT name FROM users WHERE";
        assert!(parse(sql).is_ok());

        let err = parse_with_options(sql, &ValidateOptions::default().strict()).unwrap_err();
        assert_eq!(err.dialect, Some(Dialect::Generic));
    }

    #[test]
    fn test_strict_mode_accepts_valid_select() {
        let options = ValidateOptions::default()
            .with_dialect(Dialect::Postgres)
            .strict();
        let parsed = parse_with_options("SELECT u.name FROM users u WHERE u.name ILIKE '%a%'", &options)
            .unwrap();
        assert_eq!(parsed.kind, StatementKind::Select);
    }

    #[test]
    fn test_dialect_quoting() {
        let parsed = parse_with_dialect("SELECT `u`.`name` FROM `users` `u`", Dialect::Mysql).unwrap();
        assert_eq!(columns(&parsed), vec!["u.name"]);
        assert_eq!(tables(&parsed), vec!["users"]);
    }

    #[test]
    fn test_parse_sql_valid_select() {
        let statements = parse_sql("SELECT * FROM users").unwrap();
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_parse_sql_invalid() {
        assert!(parse_sql("SELECT * FROM").is_err());
    }

    #[test]
    fn test_parse_sql_generic_falls_back_for_postgres_cast_operator() {
        assert!(parse_sql("SELECT workspace_id::text FROM ledger.usage_line_item").is_ok());
    }
}
