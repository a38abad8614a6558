//! Statement execution against the catalog.
//!
//! [`execute`] takes a classified [`Query`] and materializes a
//! [`QueryResult`]:
//!
//! - DDL mutates the catalog's table list.
//! - Literal SELECTs evaluate their expressions into a single row.
//! - Table SELECTs read inserted rows, or synthesize mock rows for fixture
//!   tables, then filter, sort and project.
//! - INSERT appends one row; UPDATE and DELETE only validate the target.

use tracing::debug;

use crate::catalog::{Catalog, Column, Table};
use crate::cell::{Cell, Row, SqlType, TypeSpec};
use crate::eval::{coerce, parse_literal};
use crate::sql::{
    CreateTableStmt, DropTableStmt, InsertStmt, InsertValue, LiteralSelectStmt, MutationStmt,
    Projection, Query, SelectStmt,
};

use super::column::ColumnDesc;
use super::error::ExecutorError;
use super::generate::generate_mock_data;
use super::predicate::Predicate;

/// Rows reported by INSERT, UPDATE and DELETE.
const MUTATION_ROW_COUNT: u64 = 1;

/// The materialized result of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Result columns; empty for statements that return no rows.
    pub columns: Vec<ColumnDesc>,
    pub rows: Vec<Row>,
    /// Rows affected by INSERT, UPDATE or DELETE.
    pub affected_rows: u64,
}

impl QueryResult {
    /// An empty result with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    fn affected(count: u64) -> Self {
        Self {
            affected_rows: count,
            ..Self::default()
        }
    }

    /// The value reported by `row_count`: affected rows for DML, otherwise
    /// the number of result rows.
    pub fn row_count(&self) -> u64 {
        if self.affected_rows > 0 {
            self.affected_rows
        } else {
            self.rows.len() as u64
        }
    }
}

/// Execution inputs that come from the statement and its configuration.
#[derive(Debug, Clone, Copy)]
pub struct ExecOptions<'a> {
    /// Number of rows synthesized for fixture tables.
    pub result_set_size: usize,
    /// Bound parameter values; the n-th `?` reads index n-1.
    pub params: &'a [Cell],
}

impl<'a> ExecOptions<'a> {
    pub fn new(result_set_size: usize) -> Self {
        Self {
            result_set_size,
            params: &[],
        }
    }

    pub fn with_params(self, params: &'a [Cell]) -> Self {
        Self { params, ..self }
    }

    fn param(&self, ordinal: usize) -> Cell {
        ordinal
            .checked_sub(1)
            .and_then(|i| self.params.get(i))
            .cloned()
            .unwrap_or(Cell::Null)
    }
}

/// Executes a classified statement.
pub fn execute(
    query: &Query,
    catalog: &mut Catalog,
    options: ExecOptions<'_>,
) -> Result<QueryResult, ExecutorError> {
    let result = match query {
        Query::CreateTable(stmt) => create_table(stmt, catalog),
        Query::DropTable(stmt) => drop_table(stmt, catalog),
        Query::LiteralSelect(stmt) => Ok(literal_select(stmt, &options)),
        Query::Select(stmt) => select(stmt, catalog, &options),
        Query::Insert(stmt) => insert(stmt, catalog, &options),
        Query::Update(stmt) | Query::Delete(stmt) => mutation(stmt, catalog),
    }?;

    debug!(
        kind = query.kind(),
        columns = result.columns.len(),
        rows = result.rows.len(),
        affected = result.affected_rows,
        "statement executed"
    );
    Ok(result)
}

fn create_table(stmt: &CreateTableStmt, catalog: &mut Catalog) -> Result<QueryResult, ExecutorError> {
    if catalog.find_table(&stmt.name).is_some() {
        if stmt.if_not_exists {
            return Ok(QueryResult::empty());
        }
        return Err(ExecutorError::TableExists {
            name: stmt.name.clone(),
        });
    }

    let columns = stmt
        .columns
        .iter()
        .map(|def| Column::new(&def.name, TypeSpec::from_type_name(&def.type_name, &def.type_params)))
        .collect();
    catalog.add_table(Table::new(&stmt.name, columns));
    Ok(QueryResult::empty())
}

fn drop_table(stmt: &DropTableStmt, catalog: &mut Catalog) -> Result<QueryResult, ExecutorError> {
    match catalog.remove_table(&stmt.name) {
        Some(_) => Ok(QueryResult::empty()),
        None if stmt.if_exists => Ok(QueryResult::empty()),
        None => Err(ExecutorError::TableNotFound {
            name: stmt.name.clone(),
        }),
    }
}

fn literal_select(stmt: &LiteralSelectStmt, options: &ExecOptions<'_>) -> QueryResult {
    let mut columns = Vec::with_capacity(stmt.items.len());
    let mut row = Vec::with_capacity(stmt.items.len());

    for item in &stmt.items {
        let literal = parse_literal(&item.expr);
        let value = match item.parameter {
            // A bare `?` takes the bound value as is; a CAST of one converts it.
            Some(ordinal) if item.expr.trim() == "?" => options.param(ordinal),
            Some(ordinal) => coerce(options.param(ordinal), literal.type_spec.sql_type),
            None => literal.value,
        };
        columns.push(ColumnDesc::new(&item.alias, literal.type_spec));
        row.push(value);
    }

    QueryResult {
        columns,
        rows: vec![row],
        affected_rows: 0,
    }
}

fn select(
    stmt: &SelectStmt,
    catalog: &Catalog,
    options: &ExecOptions<'_>,
) -> Result<QueryResult, ExecutorError> {
    let table = find_table(catalog, &stmt.table)?;
    let inserted = catalog.inserted_rows(&table.name);

    let (columns, indices) = match &stmt.projection {
        Projection::CountStar => {
            let count = if !inserted.is_empty() {
                inserted.len()
            } else if table.generates_mock_data {
                options.result_set_size
            } else {
                0
            };
            let column = ColumnDesc::new("COUNT(*)", TypeSpec::new(SqlType::Integer, 10, 0)).not_null();
            return Ok(QueryResult {
                columns: vec![column],
                rows: vec![vec![Cell::Integer(count as i64)]],
                affected_rows: 0,
            });
        }
        Projection::All => (
            table.columns.iter().map(ColumnDesc::from_column).collect::<Vec<_>>(),
            (0..table.columns.len()).collect::<Vec<_>>(),
        ),
        Projection::Columns(requested) => {
            let mut columns = Vec::with_capacity(requested.len());
            let mut indices = Vec::with_capacity(requested.len());
            for col in requested {
                let index = table
                    .column_index(&col.name)
                    .ok_or_else(|| ExecutorError::ColumnNotFound {
                        table: table.name.clone(),
                        name: col.name.clone(),
                    })?;
                columns.push(ColumnDesc::from_column(&table.columns[index]).with_name(col.output_name()));
                indices.push(index);
            }
            (columns, indices)
        }
    };

    let mut rows = if !inserted.is_empty() {
        inserted.to_vec()
    } else if table.generates_mock_data {
        generate_mock_data(table, options.result_set_size)
    } else {
        Vec::new()
    };

    if let Some(clause) = &stmt.filter {
        Predicate::parse(clause, table).apply(&mut rows);
    }

    let rows = match &stmt.projection {
        Projection::All => rows,
        _ => rows
            .into_iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(Cell::Null))
                    .collect()
            })
            .collect(),
    };

    Ok(QueryResult {
        columns,
        rows,
        affected_rows: 0,
    })
}

fn insert(
    stmt: &InsertStmt,
    catalog: &mut Catalog,
    options: &ExecOptions<'_>,
) -> Result<QueryResult, ExecutorError> {
    let table = find_table(catalog, &stmt.table)?;
    let width = table.columns.len();
    let mut row: Row = vec![Cell::Null; width];

    let value_of = |value: &InsertValue| match value {
        InsertValue::Literal(cell) => cell.clone(),
        InsertValue::Parameter(ordinal) => options.param(*ordinal),
    };

    if stmt.columns.is_empty() {
        for (slot, value) in row.iter_mut().zip(&stmt.values) {
            *slot = value_of(value);
        }
    } else {
        for (name, value) in stmt.columns.iter().zip(&stmt.values) {
            let index = table
                .column_index(name)
                .ok_or_else(|| ExecutorError::ColumnNotFound {
                    table: table.name.clone(),
                    name: name.clone(),
                })?;
            row[index] = value_of(value);
        }
    }

    let name = table.name.clone();
    catalog.insert_row(&name, row);
    Ok(QueryResult::affected(MUTATION_ROW_COUNT))
}

fn mutation(stmt: &MutationStmt, catalog: &Catalog) -> Result<QueryResult, ExecutorError> {
    find_table(catalog, &stmt.table)?;
    Ok(QueryResult::affected(MUTATION_ROW_COUNT))
}

fn find_table<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a Table, ExecutorError> {
    catalog
        .find_table(name)
        .ok_or_else(|| ExecutorError::TableNotFound {
            name: name.to_string(),
        })
}
