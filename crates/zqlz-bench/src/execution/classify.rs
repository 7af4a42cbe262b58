//! Statement shape classification

use sqlparser::ast;
use sqlparser::dialect::{Dialect, GenericDialect, dialect_from_str};
use sqlparser::parser::Parser;

/// Whether a statement produces a result set.
///
/// Decided from the statement text before it runs. Row-returning statements
/// are timed through a full drain of their results; mutating statements are
/// timed until the database acknowledges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    RowReturning,
    Mutating,
}

/// Leading keywords of statements that return rows
const ROW_RETURNING_KEYWORDS: &[&str] = &[
    "SELECT", "WITH", "VALUES", "TABLE", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "PRAGMA",
];

impl StatementKind {
    /// Classify `sql` using the parser dialect named by `dialect_id`.
    ///
    /// Falls back to the leading keyword when the dialect cannot parse the
    /// text (vendor extensions such as `SELECT TOP (n)` in some dialects).
    pub fn classify(sql: &str, dialect_id: Option<&str>) -> Self {
        let dialect: Box<dyn Dialect> = dialect_id
            .and_then(|id| dialect_from_str(id))
            .unwrap_or_else(|| Box::new(GenericDialect {}));

        match Parser::parse_sql(dialect.as_ref(), sql) {
            Ok(statements) => match statements.first() {
                Some(statement) => Self::from_ast(statement),
                None => Self::from_leading_keyword(sql),
            },
            Err(e) => {
                tracing::trace!(error = %e, "statement not parseable, classifying by keyword");
                Self::from_leading_keyword(sql)
            }
        }
    }

    pub fn is_row_returning(self) -> bool {
        self == StatementKind::RowReturning
    }

    fn from_ast(statement: &ast::Statement) -> Self {
        match statement {
            ast::Statement::Query(_)
            | ast::Statement::Explain { .. }
            | ast::Statement::ExplainTable { .. }
            | ast::Statement::ShowTables { .. }
            | ast::Statement::ShowColumns { .. }
            | ast::Statement::Pragma { .. } => StatementKind::RowReturning,
            ast::Statement::Insert(insert) if insert.returning.is_some() => {
                StatementKind::RowReturning
            }
            ast::Statement::Delete(delete) if delete.returning.is_some() => {
                StatementKind::RowReturning
            }
            ast::Statement::Update { returning, .. } if returning.is_some() => {
                StatementKind::RowReturning
            }
            _ => StatementKind::Mutating,
        }
    }

    fn from_leading_keyword(sql: &str) -> Self {
        let keyword: String = skip_trivia(sql)
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_uppercase();

        if ROW_RETURNING_KEYWORDS.contains(&keyword.as_str()) {
            StatementKind::RowReturning
        } else {
            StatementKind::Mutating
        }
    }
}

/// Skip whitespace, comments, stray `;` and opening parentheses
fn skip_trivia(mut sql: &str) -> &str {
    loop {
        let trimmed = sql.trim_start_matches(|c: char| c.is_whitespace() || c == ';' || c == '(');
        if let Some(rest) = trimmed.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, after)| after);
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, after)| after);
        } else {
            return trimmed;
        }
    }
}
