//! Table, alias and column extraction for a single statement.
//!
//! The walk keeps a stack of parenthesis scopes. Each scope remembers
//! whether a `FROM` list is open in it, so a comma continues the list only at
//! the depth where the list started. Each scope also owns the table and alias
//! bindings made by its `FROM` list. A dotted name is resolved against the
//! bindings of its own scope first and then the enclosing ones. Resolution
//! happens when a scope closes, because a select list names aliases before
//! the `FROM` that binds them.

use super::token::{Name, Punctuation, SqlToken, TokenKind};
use super::ParsedStatement;
use crate::types::{ColumnRef, StatementKind};
use sqlparser::keywords::Keyword;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Statement,
    /// Arguments of a function call: `count(...)`, `extract(...)`
    Call,
    /// Subquery or expression grouping
    Group,
    /// Subquery in table position: `FROM (SELECT ...) alias`
    DerivedTable,
}

/// What a qualifier bound in a `FROM` list stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Table(String),
    /// A derived table; its columns have no schema entry.
    Derived,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    from_list: bool,
    /// Inside an `ON`/`USING` condition of the open `FROM` list
    join_condition: bool,
    bindings: BTreeMap<String, Binding>,
    /// `(qualifier, column)` pairs not yet resolved
    pending: Vec<(String, String)>,
}

impl Scope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            from_list: false,
            join_condition: false,
            bindings: BTreeMap::new(),
            pending: Vec::new(),
        }
    }
}

/// Keywords that may appear inside a `FROM` list without ending it.
fn continues_from_list(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::JOIN
            | Keyword::INNER
            | Keyword::LEFT
            | Keyword::RIGHT
            | Keyword::FULL
            | Keyword::OUTER
            | Keyword::CROSS
            | Keyword::NATURAL
            | Keyword::LATERAL
            | Keyword::AS
    )
}

/// Keywords that start the clause after a `FROM` list, or a new query.
fn ends_from_list(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::WHERE
            | Keyword::GROUP
            | Keyword::HAVING
            | Keyword::ORDER
            | Keyword::LIMIT
            | Keyword::OFFSET
            | Keyword::FETCH
            | Keyword::WINDOW
            | Keyword::QUALIFY
            | Keyword::UNION
            | Keyword::INTERSECT
            | Keyword::EXCEPT
            | Keyword::SELECT
            | Keyword::FOR
            | Keyword::RETURNING
            | Keyword::SET
            | Keyword::VALUES
            | Keyword::INTO
    )
}

pub(super) fn extract(kind: StatementKind, tokens: &[SqlToken]) -> ParsedStatement {
    let mut walker = Walker {
        tokens,
        parsed: ParsedStatement::new(kind),
        scopes: vec![Scope::new(ScopeKind::Statement)],
        table_position: false,
    };

    let mut index = 0;
    while index < tokens.len() {
        index = walker.step(index);
    }

    walker.finish()
}

struct Walker<'a> {
    tokens: &'a [SqlToken],
    parsed: ParsedStatement,
    scopes: Vec<Scope>,
    /// The next token is in table position
    table_position: bool,
}

impl<'a> Walker<'a> {
    /// Handle the token at `index` and return the index of the next token to handle.
    fn step(&mut self, index: usize) -> usize {
        let at_table = std::mem::take(&mut self.table_position);
        let tokens = self.tokens;

        match &tokens[index].kind {
            TokenKind::Keyword(keyword) => {
                self.keyword(index, *keyword, at_table);
                index + 1
            }
            TokenKind::Name(name) => self.name(index, name, at_table),
            TokenKind::Punctuation(Punctuation::OpenParen) => {
                self.open_paren(index, at_table);
                index + 1
            }
            TokenKind::Punctuation(Punctuation::CloseParen) => self.close_paren(index),
            TokenKind::Punctuation(Punctuation::Comma) => {
                let scope = self.scope_mut();
                if scope.from_list {
                    scope.join_condition = false;
                    self.table_position = true;
                }
                index + 1
            }
            TokenKind::Punctuation(Punctuation::Period | Punctuation::Other)
            | TokenKind::Literal
            | TokenKind::Operator
            | TokenKind::Terminator => index + 1,
        }
    }

    fn keyword(&mut self, index: usize, keyword: Keyword, at_table: bool) {
        match keyword {
            Keyword::FROM => {
                if self.starts_from_clause(index) {
                    let scope = self.scope_mut();
                    scope.from_list = true;
                    scope.join_condition = false;
                    self.table_position = true;
                }
            }
            Keyword::JOIN => {
                let scope = self.scope_mut();
                scope.from_list = true;
                scope.join_condition = false;
                self.table_position = true;
            }
            Keyword::LATERAL if at_table => self.table_position = true,
            Keyword::ON | Keyword::USING if self.scope().from_list => {
                self.scope_mut().join_condition = true;
            }
            keyword if continues_from_list(keyword) => {}
            keyword if self.scope().join_condition && !ends_from_list(keyword) => {}
            _ => {
                let scope = self.scope_mut();
                scope.from_list = false;
                scope.join_condition = false;
            }
        }
    }

    /// `FROM` inside a call (`EXTRACT(YEAR FROM d)`) or in `IS [NOT] DISTINCT
    /// FROM` is not a table clause.
    fn starts_from_clause(&self, index: usize) -> bool {
        if self.scope().kind == ScopeKind::Call {
            return false;
        }

        let distinct_comparison = index >= 2
            && self.tokens[index - 1].is_keyword(Keyword::DISTINCT)
            && (self.tokens[index - 2].is_keyword(Keyword::IS)
                || self.tokens[index - 2].is_keyword(Keyword::NOT));

        !distinct_comparison
    }

    fn name(&mut self, index: usize, name: &Name, at_table: bool) -> usize {
        if at_table && !self.punctuation_at(index + 1, Punctuation::OpenParen) {
            return self.table_reference(index, name);
        }

        if let Some((qualifier, column)) = name.qualifier_and_column() {
            self.parsed
                .qualified_columns
                .insert(ColumnRef::new(qualifier.clone(), column.clone()));
            self.scope_mut().pending.push((qualifier, column));
        } else if self.keyword_at(index + 1, Keyword::AS)
            && self.punctuation_at(index + 2, Punctuation::OpenParen)
        {
            self.parsed.cte_names.insert(name.to_lowercase());
        }

        index + 1
    }

    /// Record a table and its optional alias; returns the index after both.
    ///
    /// An aliased table is visible only through its alias.
    fn table_reference(&mut self, index: usize, name: &Name) -> usize {
        let table = name
            .parts
            .last()
            .map(|part| part.to_lowercase())
            .unwrap_or_default();
        self.parsed.referenced_tables.insert(table.clone());

        let mut next = index + 1;
        if self.keyword_at(next, Keyword::AS) {
            next += 1;
        }

        let qualifier = match self.alias_at(next) {
            Some(alias) => {
                self.parsed.aliases.insert(alias.clone(), table.clone());
                next += 1;
                alias
            }
            None => table.clone(),
        };
        self.scope_mut()
            .bindings
            .insert(qualifier, Binding::Table(table));

        next
    }

    fn open_paren(&mut self, index: usize, at_table: bool) {
        let kind = if at_table {
            ScopeKind::DerivedTable
        } else if index > 0 && self.tokens[index - 1].as_name().is_some() {
            ScopeKind::Call
        } else {
            ScopeKind::Group
        };
        self.scopes.push(Scope::new(kind));
    }

    fn close_paren(&mut self, index: usize) -> usize {
        // The statement scope is never popped; balance is checked before the walk.
        if self.scopes.len() < 2 {
            return index + 1;
        }

        let closed_kind = self.pop_scope();

        let mut next = index + 1;
        if closed_kind == ScopeKind::DerivedTable {
            if self.keyword_at(next, Keyword::AS) {
                next += 1;
            }
            if let Some(alias) = self.alias_at(next) {
                self.parsed.derived_aliases.insert(alias.clone());
                self.scope_mut().bindings.insert(alias, Binding::Derived);
                next += 1;
            }
        }
        next
    }

    /// Close the innermost scope, resolving what its bindings can and handing
    /// the rest to the enclosing scope.
    fn pop_scope(&mut self) -> ScopeKind {
        let Some(scope) = self.scopes.pop() else {
            return ScopeKind::Statement;
        };

        let unresolved = self.resolve(scope.pending, &scope.bindings);
        match self.scopes.last_mut() {
            Some(parent) => parent.pending.extend(unresolved),
            // Outside every binding, a qualifier names a table directly.
            None => {
                for (qualifier, column) in unresolved {
                    self.parsed
                        .column_refs
                        .insert(ColumnRef::new(qualifier, column));
                }
            }
        }

        scope.kind
    }

    /// Record each pending pair bound in `bindings`; return the rest.
    fn resolve(
        &mut self,
        pending: Vec<(String, String)>,
        bindings: &BTreeMap<String, Binding>,
    ) -> Vec<(String, String)> {
        let mut unresolved = Vec::new();
        for (qualifier, column) in pending {
            match bindings.get(&qualifier) {
                Some(Binding::Table(table)) => {
                    self.parsed
                        .column_refs
                        .insert(ColumnRef::new(table.clone(), column));
                }
                Some(Binding::Derived) => {}
                None => unresolved.push((qualifier, column)),
            }
        }
        unresolved
    }

    fn finish(mut self) -> ParsedStatement {
        while !self.scopes.is_empty() {
            self.pop_scope();
        }

        let ParsedStatement {
            referenced_tables,
            column_refs,
            cte_names,
            ..
        } = &mut self.parsed;
        referenced_tables.retain(|table| !cte_names.contains(table));
        column_refs.retain(|reference| !cte_names.contains(&reference.table));
        self.parsed
    }

    fn scope(&self) -> &Scope {
        // Never empty while walking: the statement scope stays at the bottom.
        &self.scopes[self.scopes.len() - 1]
    }

    fn scope_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn keyword_at(&self, index: usize, keyword: Keyword) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|token| token.is_keyword(keyword))
    }

    fn punctuation_at(&self, index: usize, punctuation: Punctuation) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|token| token.is_punctuation(punctuation))
    }

    /// A single-part name at `index`, lowercased.
    fn alias_at(&self, index: usize) -> Option<String> {
        self.tokens
            .get(index)
            .and_then(SqlToken::as_name)
            .filter(|name| !name.is_qualified())
            .map(Name::to_lowercase)
    }
}
