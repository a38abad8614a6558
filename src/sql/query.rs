//! Parsed query structures.
//!
//! The classifier produces a [`ParsedQuery`] holding one [`Query`] variant per
//! supported statement kind. WHERE and ORDER BY text is kept as raw source and
//! re-interpreted by the executor.

use crate::cell::Cell;

/// The result of classifying one SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    /// The classified statement.
    pub query: Query,
    /// Number of `?` markers outside quoted regions.
    pub param_count: usize,
}

/// A classified SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// CREATE TABLE statement.
    CreateTable(CreateTableStmt),
    /// DROP TABLE statement.
    DropTable(DropTableStmt),
    /// SELECT without a FROM clause (or FROM a pseudo-table such as DUAL).
    LiteralSelect(LiteralSelectStmt),
    /// SELECT from a catalog table.
    Select(SelectStmt),
    /// INSERT statement.
    Insert(InsertStmt),
    /// UPDATE statement.
    Update(MutationStmt),
    /// DELETE statement.
    Delete(MutationStmt),
}

impl Query {
    /// Returns the statement kind as an upper-case keyword.
    pub fn kind(&self) -> &'static str {
        match self {
            Query::CreateTable(_) => "CREATE TABLE",
            Query::DropTable(_) => "DROP TABLE",
            Query::LiteralSelect(_) | Query::Select(_) => "SELECT",
            Query::Insert(_) => "INSERT",
            Query::Update(_) => "UPDATE",
            Query::Delete(_) => "DELETE",
        }
    }

    /// Returns the target table, if the statement has one.
    pub fn table(&self) -> Option<&str> {
        match self {
            Query::CreateTable(s) => Some(&s.name),
            Query::DropTable(s) => Some(&s.name),
            Query::LiteralSelect(_) => None,
            Query::Select(s) => Some(&s.table),
            Query::Insert(s) => Some(&s.table),
            Query::Update(s) | Query::Delete(s) => Some(&s.table),
        }
    }
}

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    /// Table name.
    pub name: String,
    /// Column definitions.
    pub columns: Vec<ColumnDef>,
    /// IF NOT EXISTS clause.
    pub if_not_exists: bool,
}

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Type name as written (e.g., `VARCHAR`, `DOUBLE PRECISION`).
    pub type_name: String,
    /// Parenthesized size arguments (e.g., `[10, 2]` for `DECIMAL(10,2)`).
    pub type_params: Vec<usize>,
}

/// DROP TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStmt {
    /// Table name.
    pub name: String,
    /// IF EXISTS clause.
    pub if_exists: bool,
}

/// SELECT over literal expressions only.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralSelectStmt {
    pub items: Vec<LiteralItem>,
}

/// One expression in a literal SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralItem {
    /// Expression source text.
    pub expr: String,
    /// Output column name: the `AS` alias or `EXPR_n`.
    pub alias: String,
    /// Ordinal of the `?` marker when the expression is a parameter (or a
    /// CAST of one).
    pub parameter: Option<usize>,
}

/// SELECT from a table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    /// Table name.
    pub table: String,
    /// Select list.
    pub projection: Projection,
    /// Raw WHERE tail, including any trailing ORDER BY. A statement with
    /// ORDER BY and no WHERE stores the text starting at `ORDER BY`.
    pub filter: Option<String>,
}

/// The select list of a table SELECT.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`
    All,
    /// `COUNT(*)`
    CountStar,
    /// Named columns in request order.
    Columns(Vec<SelectColumn>),
}

/// A named column in a select list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// Column name with any table qualifier removed.
    pub name: String,
    /// Optional alias.
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Returns the column name reported in the result set.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    /// Table name.
    pub table: String,
    /// Explicit column list (empty for positional inserts).
    pub columns: Vec<String>,
    /// The VALUES tuple.
    pub values: Vec<InsertValue>,
}

/// A value in an INSERT tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertValue {
    /// A literal value.
    Literal(Cell),
    /// A `?` marker; holds the 1-based parameter ordinal.
    Parameter(usize),
}

/// UPDATE or DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationStmt {
    /// Table name.
    pub table: String,
    /// Raw WHERE tail.
    pub filter: Option<String>,
}
