//! Token model for the statement parser.
//!
//! Raw tokens come from the `sqlparser` tokenizer and are reduced to a small
//! closed set of classes. Whitespace and comments are dropped, and adjacent
//! `word . word` sequences are merged into one dotted [`Name`].

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token as RawToken, TokenWithSpan, Tokenizer};

use crate::error::{ParseError, Position};
use crate::types::Dialect;

/// Token class seen by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// An unquoted structural keyword (see [`is_structural_keyword`]).
    Keyword(Keyword),
    /// An identifier, possibly dotted (`schema.table.column`).
    Name(Name),
    /// A string or numeric literal.
    Literal,
    Operator,
    Punctuation(Punctuation),
    /// Statement terminator (`;`).
    Terminator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
    Comma,
    OpenParen,
    CloseParen,
    Period,
    Other,
}

/// An identifier split on `.` separators, with quotes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub parts: Vec<String>,
}

impl Name {
    fn single(part: String) -> Self {
        Self { parts: vec![part] }
    }

    pub fn is_qualified(&self) -> bool {
        self.parts.len() > 1
    }

    /// The full dotted name, lowercased.
    pub fn to_lowercase(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Lowercased `(qualifier, column)` from the last two segments.
    pub fn qualifier_and_column(&self) -> Option<(String, String)> {
        match self.parts.as_slice() {
            [.., qualifier, column] => Some((qualifier.to_lowercase(), column.to_lowercase())),
            _ => None,
        }
    }
}

/// A classified token with the position of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlToken {
    pub kind: TokenKind,
    pub position: Position,
}

impl SqlToken {
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.kind, TokenKind::Keyword(k) if k == keyword)
    }

    pub fn is_punctuation(&self, punctuation: Punctuation) -> bool {
        matches!(self.kind, TokenKind::Punctuation(p) if p == punctuation)
    }

    pub fn as_name(&self) -> Option<&Name> {
        match &self.kind {
            TokenKind::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// Keywords that shape statement structure. Every other word, including
/// soft keywords such as `name` or `status` and all quoted identifiers, is a
/// [`TokenKind::Name`].
pub fn is_structural_keyword(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::SELECT
            | Keyword::FROM
            | Keyword::WHERE
            | Keyword::JOIN
            | Keyword::INNER
            | Keyword::LEFT
            | Keyword::RIGHT
            | Keyword::FULL
            | Keyword::OUTER
            | Keyword::CROSS
            | Keyword::NATURAL
            | Keyword::LATERAL
            | Keyword::ON
            | Keyword::USING
            | Keyword::AS
            | Keyword::GROUP
            | Keyword::BY
            | Keyword::ORDER
            | Keyword::HAVING
            | Keyword::LIMIT
            | Keyword::OFFSET
            | Keyword::FETCH
            | Keyword::UNION
            | Keyword::INTERSECT
            | Keyword::EXCEPT
            | Keyword::ALL
            | Keyword::DISTINCT
            | Keyword::WITH
            | Keyword::RECURSIVE
            | Keyword::INSERT
            | Keyword::UPDATE
            | Keyword::DELETE
            | Keyword::CREATE
            | Keyword::DROP
            | Keyword::ALTER
            | Keyword::TRUNCATE
            | Keyword::INTO
            | Keyword::VALUES
            | Keyword::SET
            | Keyword::FOR
            | Keyword::WINDOW
            | Keyword::QUALIFY
            | Keyword::RETURNING
            | Keyword::AND
            | Keyword::OR
            | Keyword::NOT
            | Keyword::IN
            | Keyword::IS
            | Keyword::LIKE
            | Keyword::ILIKE
            | Keyword::BETWEEN
            | Keyword::CASE
            | Keyword::WHEN
            | Keyword::THEN
            | Keyword::ELSE
            | Keyword::END
            | Keyword::EXISTS
            | Keyword::ASC
            | Keyword::DESC
            | Keyword::EXPLAIN
    )
}

/// Tokenize `sql` into significant tokens.
pub fn tokenize(sql: &str, dialect: Dialect) -> Result<Vec<SqlToken>, ParseError> {
    let sqlparser_dialect = dialect.to_sqlparser_dialect();
    let mut tokenizer = Tokenizer::new(sqlparser_dialect.as_ref(), sql);
    let raw_tokens: Vec<TokenWithSpan> = tokenizer
        .tokenize_with_location()
        .map_err(|err| ParseError::from(err).with_dialect(dialect))?;

    let mut out: Vec<SqlToken> = Vec::with_capacity(raw_tokens.len());

    for raw in raw_tokens {
        let position = Position {
            line: raw.span.start.line as usize,
            column: raw.span.start.column as usize,
        };

        let kind = match raw.token {
            RawToken::Whitespace(_) | RawToken::EOF => continue,
            RawToken::Word(word) => {
                if extends_dotted_name(&out) {
                    out.pop();
                    if let Some(TokenKind::Name(name)) = out.last_mut().map(|t| &mut t.kind) {
                        name.parts.push(word.value);
                    }
                    continue;
                }
                if word.quote_style.is_none() && is_structural_keyword(word.keyword) {
                    TokenKind::Keyword(word.keyword)
                } else {
                    TokenKind::Name(Name::single(word.value))
                }
            }
            other => classify_token(&other),
        };

        out.push(SqlToken { kind, position });
    }

    Ok(out)
}

/// True when the last two tokens are `Name` followed by `.`.
fn extends_dotted_name(tokens: &[SqlToken]) -> bool {
    matches!(
        tokens,
        [.., SqlToken { kind: TokenKind::Name(_), .. }, SqlToken {
            kind: TokenKind::Punctuation(Punctuation::Period),
            ..
        }]
    )
}

fn classify_token(token: &RawToken) -> TokenKind {
    match token {
        RawToken::Number(_, _)
        | RawToken::SingleQuotedString(_)
        | RawToken::DoubleQuotedString(_)
        | RawToken::DollarQuotedString(_)
        | RawToken::NationalStringLiteral(_)
        | RawToken::EscapedStringLiteral(_)
        | RawToken::HexStringLiteral(_) => TokenKind::Literal,
        RawToken::Comma => TokenKind::Punctuation(Punctuation::Comma),
        RawToken::LParen => TokenKind::Punctuation(Punctuation::OpenParen),
        RawToken::RParen => TokenKind::Punctuation(Punctuation::CloseParen),
        RawToken::Period => TokenKind::Punctuation(Punctuation::Period),
        RawToken::SemiColon => TokenKind::Terminator,
        RawToken::LBracket
        | RawToken::RBracket
        | RawToken::LBrace
        | RawToken::RBrace
        | RawToken::Colon
        | RawToken::DoubleColon => TokenKind::Punctuation(Punctuation::Other),
        _ => TokenKind::Operator,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        tokenize(sql, Dialect::Generic)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn name(parts: &[&str]) -> TokenKind {
        TokenKind::Name(Name {
            parts: parts.iter().map(|p| p.to_string()).collect(),
        })
    }

    #[test]
    fn test_dotted_names_are_merged() {
        assert_eq!(
            kinds("SELECT u.name FROM users u"),
            vec![
                TokenKind::Keyword(Keyword::SELECT),
                name(&["u", "name"]),
                TokenKind::Keyword(Keyword::FROM),
                name(&["users"]),
                name(&["u"]),
            ]
        );
    }

    #[test]
    fn test_soft_keywords_are_names() {
        assert_eq!(
            kinds("SELECT status FROM logs"),
            vec![
                TokenKind::Keyword(Keyword::SELECT),
                name(&["status"]),
                TokenKind::Keyword(Keyword::FROM),
                name(&["logs"]),
            ]
        );
    }

    #[test]
    fn test_quoted_keyword_is_name() {
        assert_eq!(
            kinds("SELECT \"select\" FROM t"),
            vec![
                TokenKind::Keyword(Keyword::SELECT),
                name(&["select"]),
                TokenKind::Keyword(Keyword::FROM),
                name(&["t"]),
            ]
        );
    }

    #[test]
    fn test_star_after_qualifier_is_not_merged() {
        assert_eq!(
            kinds("SELECT u.* FROM users u"),
            vec![
                TokenKind::Keyword(Keyword::SELECT),
                name(&["u"]),
                TokenKind::Punctuation(Punctuation::Period),
                TokenKind::Operator,
                TokenKind::Keyword(Keyword::FROM),
                name(&["users"]),
                name(&["u"]),
            ]
        );
    }

    #[test]
    fn test_comments_and_literals() {
        assert_eq!(
            kinds("-- leading comment\nSELECT 'open', 1; /* trailing */"),
            vec![
                TokenKind::Keyword(Keyword::SELECT),
                TokenKind::Literal,
                TokenKind::Punctuation(Punctuation::Comma),
                TokenKind::Literal,
                TokenKind::Terminator,
            ]
        );
    }

    #[test]
    fn test_positions_are_recorded() {
        let tokens = tokenize("SELECT\n  x", Dialect::Generic).unwrap();
        assert_eq!(tokens[1].position, Position { line: 2, column: 3 });
    }

    #[test]
    fn test_unterminated_string_is_lexer_error() {
        let err = tokenize("SELECT 'open FROM t", Dialect::Generic).unwrap_err();
        assert_eq!(err.kind, crate::error::ParseErrorKind::LexerError);
        assert_eq!(err.dialect, Some(Dialect::Generic));
    }

    #[test]
    fn test_qualifier_and_column_uses_last_segments() {
        let name = Name {
            parts: vec!["Public".into(), "Users".into(), "Name".into()],
        };
        assert_eq!(
            name.qualifier_and_column(),
            Some(("users".to_string(), "name".to_string()))
        );
        assert_eq!(name.to_lowercase(), "public.users.name");
    }
}
