//! Catalog function result sets (`SQLTables`, `SQLColumns`, ...).
//!
//! Each builder returns a [`QueryResult`] with the ODBC-standard column
//! layout for its function. Empty catalog and schema names are reported as
//! NULL.

use crate::catalog::Catalog;
use crate::cell::{Cell, Row};

use super::column::ColumnDesc;
use super::runner::QueryResult;

/// `SQL_CASCADE`
const CASCADE: i64 = 0;
/// `SQL_NOT_DEFERRABLE`
const NOT_DEFERRABLE: i64 = 7;
/// `SQL_NULLABLE` / `SQL_NO_NULLS`
const NULLABLE: i64 = 1;
const NO_NULLS: i64 = 0;

/// Mock index statistics.
const INDEX_CARDINALITY: i64 = 100;
const INDEX_PAGES: i64 = 10;

fn optional(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Null
    } else {
        Cell::text(s)
    }
}

fn result(columns: Vec<ColumnDesc>, rows: Vec<Row>) -> QueryResult {
    QueryResult {
        columns,
        rows,
        affected_rows: 0,
    }
}

/// `SQLTables`: tables matching `pattern`, optionally filtered by a
/// comma-separated type list.
pub fn tables(catalog: &Catalog, pattern: &str, types: Option<&str>) -> QueryResult {
    let columns = vec![
        ColumnDesc::varchar("TABLE_CAT"),
        ColumnDesc::varchar("TABLE_SCHEM"),
        ColumnDesc::varchar("TABLE_NAME").not_null(),
        ColumnDesc::varchar("TABLE_TYPE").not_null(),
        ColumnDesc::varchar("REMARKS"),
    ];
    let rows = catalog
        .get_tables(pattern, types)
        .into_iter()
        .map(|t| {
            vec![
                optional(&t.catalog),
                optional(&t.schema),
                Cell::text(&t.name),
                Cell::text(t.kind.as_str()),
                Cell::text(&t.remarks),
            ]
        })
        .collect();
    result(columns, rows)
}

/// `SQLColumns`: 18 columns per matching column.
pub fn columns(catalog: &Catalog, table_pattern: &str, column_pattern: &str) -> QueryResult {
    let columns = vec![
        ColumnDesc::varchar("TABLE_CAT"),
        ColumnDesc::varchar("TABLE_SCHEM"),
        ColumnDesc::varchar("TABLE_NAME").not_null(),
        ColumnDesc::varchar("COLUMN_NAME").not_null(),
        ColumnDesc::smallint("DATA_TYPE").not_null(),
        ColumnDesc::varchar("TYPE_NAME").not_null(),
        ColumnDesc::integer("COLUMN_SIZE"),
        ColumnDesc::integer("BUFFER_LENGTH"),
        ColumnDesc::smallint("DECIMAL_DIGITS"),
        ColumnDesc::smallint("NUM_PREC_RADIX"),
        ColumnDesc::smallint("NULLABLE").not_null(),
        ColumnDesc::varchar("REMARKS"),
        ColumnDesc::varchar("COLUMN_DEF"),
        ColumnDesc::smallint("SQL_DATA_TYPE").not_null(),
        ColumnDesc::smallint("SQL_DATETIME_SUB"),
        ColumnDesc::integer("CHAR_OCTET_LENGTH"),
        ColumnDesc::integer("ORDINAL_POSITION").not_null(),
        ColumnDesc::varchar("IS_NULLABLE"),
    ];
    let rows = catalog
        .get_columns(table_pattern, column_pattern)
        .into_iter()
        .map(|(table, column, ordinal)| {
            let spec = column.type_spec;
            let size = spec.column_size as i64;
            let numeric = spec.sql_type.is_numeric();
            vec![
                optional(&table.catalog),
                optional(&table.schema),
                Cell::text(&table.name),
                Cell::text(&column.name),
                Cell::Integer(spec.sql_type.code().into()),
                Cell::text(spec.sql_type.type_name()),
                Cell::Integer(size),
                Cell::Integer(size),
                Cell::Integer(spec.decimal_digits.into()),
                if numeric { Cell::Integer(10) } else { Cell::Null },
                Cell::Integer(if column.nullable { NULLABLE } else { NO_NULLS }),
                Cell::text(""),
                column.default_value.as_deref().map_or(Cell::Null, Cell::text),
                Cell::Integer(spec.sql_type.code().into()),
                Cell::Null,
                if numeric { Cell::Null } else { Cell::Integer(size) },
                Cell::Integer(ordinal as i64),
                Cell::text(if column.nullable { "YES" } else { "NO" }),
            ]
        })
        .collect();
    result(columns, rows)
}

/// `SQLPrimaryKeys`: one row per key column, named `PK_<table>`.
pub fn primary_keys(catalog: &Catalog, table_pattern: &str) -> QueryResult {
    let columns = vec![
        ColumnDesc::varchar("TABLE_CAT"),
        ColumnDesc::varchar("TABLE_SCHEM"),
        ColumnDesc::varchar("TABLE_NAME").not_null(),
        ColumnDesc::varchar("COLUMN_NAME").not_null(),
        ColumnDesc::smallint("KEY_SEQ").not_null(),
        ColumnDesc::varchar("PK_NAME"),
    ];
    let rows = catalog
        .get_primary_keys(table_pattern)
        .into_iter()
        .map(|(table, column, seq)| {
            vec![
                optional(&table.catalog),
                optional(&table.schema),
                Cell::text(&table.name),
                Cell::text(&column.name),
                Cell::Integer(seq as i64),
                Cell::text(format!("PK_{}", table.name)),
            ]
        })
        .collect();
    result(columns, rows)
}

/// `SQLForeignKeys`: 14 columns per referencing column.
pub fn foreign_keys(catalog: &Catalog, pk_table_pattern: &str, fk_table_pattern: &str) -> QueryResult {
    let columns = vec![
        ColumnDesc::varchar("PKTABLE_CAT"),
        ColumnDesc::varchar("PKTABLE_SCHEM"),
        ColumnDesc::varchar("PKTABLE_NAME").not_null(),
        ColumnDesc::varchar("PKCOLUMN_NAME").not_null(),
        ColumnDesc::varchar("FKTABLE_CAT"),
        ColumnDesc::varchar("FKTABLE_SCHEM"),
        ColumnDesc::varchar("FKTABLE_NAME").not_null(),
        ColumnDesc::varchar("FKCOLUMN_NAME").not_null(),
        ColumnDesc::smallint("KEY_SEQ").not_null(),
        ColumnDesc::smallint("UPDATE_RULE"),
        ColumnDesc::smallint("DELETE_RULE"),
        ColumnDesc::varchar("FK_NAME"),
        ColumnDesc::varchar("PK_NAME"),
        ColumnDesc::smallint("DEFERRABILITY"),
    ];
    let rows = catalog
        .get_foreign_keys(pk_table_pattern, fk_table_pattern)
        .into_iter()
        .map(|fk| {
            vec![
                optional(&fk.pk_table.catalog),
                optional(&fk.pk_table.schema),
                Cell::text(&fk.pk_table.name),
                Cell::text(&fk.pk_column.name),
                optional(&fk.fk_table.catalog),
                optional(&fk.fk_table.schema),
                Cell::text(&fk.fk_table.name),
                Cell::text(&fk.fk_column.name),
                // Every foreign key is a single column.
                Cell::Integer(1),
                Cell::Integer(CASCADE),
                Cell::Integer(CASCADE),
                Cell::text(format!("FK_{}_{}", fk.fk_table.name, fk.fk_column.name)),
                Cell::text(format!("PK_{}", fk.pk_table.name)),
                Cell::Integer(NOT_DEFERRABLE),
            ]
        })
        .collect();
    result(columns, rows)
}

/// `SQLStatistics`: one row per indexed column.
pub fn statistics(catalog: &Catalog, table_pattern: &str) -> QueryResult {
    let columns = vec![
        ColumnDesc::varchar("TABLE_CAT"),
        ColumnDesc::varchar("TABLE_SCHEM"),
        ColumnDesc::varchar("TABLE_NAME").not_null(),
        ColumnDesc::smallint("NON_UNIQUE"),
        ColumnDesc::varchar("INDEX_QUALIFIER"),
        ColumnDesc::varchar("INDEX_NAME"),
        ColumnDesc::smallint("TYPE").not_null(),
        ColumnDesc::smallint("ORDINAL_POSITION"),
        ColumnDesc::varchar("COLUMN_NAME"),
        ColumnDesc::char("ASC_OR_DESC"),
        ColumnDesc::integer("CARDINALITY"),
        ColumnDesc::integer("PAGES"),
        ColumnDesc::varchar("FILTER_CONDITION"),
    ];
    let mut rows = Vec::new();
    for index in catalog.get_statistics(table_pattern) {
        let table = catalog.find_table(&index.table_name);
        for (i, column) in index.columns.iter().enumerate() {
            rows.push(vec![
                table.map_or(Cell::Null, |t| optional(&t.catalog)),
                table.map_or(Cell::Null, |t| optional(&t.schema)),
                Cell::text(&index.table_name),
                Cell::Integer(if index.unique { 0 } else { 1 }),
                optional(&index.qualifier),
                Cell::text(&index.index_name),
                Cell::Integer(index.kind.code()),
                Cell::Integer(i as i64 + 1),
                Cell::text(column),
                Cell::text("A"),
                Cell::Integer(INDEX_CARDINALITY),
                Cell::Integer(INDEX_PAGES),
                Cell::Null,
            ]);
        }
    }
    result(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogPreset;

    fn catalog() -> Catalog {
        Catalog::with_preset(CatalogPreset::Default)
    }

    #[test]
    fn test_tables_layout() {
        let result = tables(&catalog(), "%", None);
        assert_eq!(result.columns.len(), 5);
        assert_eq!(result.rows.len(), 4);
        assert_eq!(
            result.rows[0],
            vec![
                Cell::Null,
                Cell::Null,
                Cell::text("USERS"),
                Cell::text("TABLE"),
                Cell::text("User accounts"),
            ]
        );
    }

    #[test]
    fn test_columns_layout() {
        let result = columns(&catalog(), "USERS", "%");
        assert_eq!(result.columns.len(), 18);
        assert_eq!(result.rows.len(), 6);

        let user_id = &result.rows[0];
        assert_eq!(user_id[3], Cell::text("USER_ID"));
        assert_eq!(user_id[4], Cell::Integer(4));
        assert_eq!(user_id[5], Cell::text("INTEGER"));
        assert_eq!(user_id[10], Cell::Integer(NO_NULLS));
        assert_eq!(user_id[16], Cell::Integer(1));
        assert_eq!(user_id[17], Cell::text("NO"));

        let status = columns(&catalog(), "ORDERS", "STATUS");
        assert_eq!(status.rows[0][12], Cell::text("PENDING"));
        assert_eq!(status.rows[0][16], Cell::Integer(5));
    }

    #[test]
    fn test_primary_keys_layout() {
        let result = primary_keys(&catalog(), "ORDERS");
        assert_eq!(result.columns.len(), 6);
        assert_eq!(
            result.rows,
            vec![vec![
                Cell::Null,
                Cell::Null,
                Cell::text("ORDERS"),
                Cell::text("ORDER_ID"),
                Cell::Integer(1),
                Cell::text("PK_ORDERS"),
            ]]
        );
    }

    #[test]
    fn test_foreign_keys_layout() {
        let result = foreign_keys(&catalog(), "", "ORDERS");
        assert_eq!(result.columns.len(), 14);
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row[2], Cell::text("USERS"));
        assert_eq!(row[3], Cell::text("USER_ID"));
        assert_eq!(row[6], Cell::text("ORDERS"));
        assert_eq!(row[11], Cell::text("FK_ORDERS_USER_ID"));
        assert_eq!(row[12], Cell::text("PK_USERS"));
        assert_eq!(row[13], Cell::Integer(NOT_DEFERRABLE));
    }

    #[test]
    fn test_statistics_layout() {
        let result = statistics(&catalog(), "USERS");
        assert_eq!(result.columns.len(), 13);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0][5], Cell::text("PK_USERS"));
        assert_eq!(result.rows[0][6], Cell::Integer(1));
        assert_eq!(result.rows[1][8], Cell::text("USERNAME"));
        assert_eq!(result.rows[1][10], Cell::Integer(INDEX_CARDINALITY));
    }
}
