//! Catalog store for table, column and index metadata.
//!
//! This module manages the in-memory schema the mock driver serves. Schema
//! types ([`Table`], [`Column`], [`Index`]) describe catalog entries,
//! [`CatalogPreset`] selects the fixture loaded at connect time, and
//! [`Catalog`] holds the tables plus the rows inserted during the session.
//!
//! ## Presets
//!
//! | Preset    | Tables                                              |
//! |-----------|-----------------------------------------------------|
//! | `default` | USERS, ORDERS, PRODUCTS, ORDER_ITEMS                |
//! | `empty`   | none                                                |
//! | `large`   | default tables plus `TABLE_1`..`TABLE_100`          |
//!
//! Name lookups are case-insensitive. Catalog projections accept SQL LIKE
//! patterns (see [`matches_pattern`]).

mod pattern;
mod preset;
mod schema;

pub use pattern::matches_pattern;
pub use preset::{CatalogPreset, LARGE_COLUMN_COUNT, LARGE_TABLE_COUNT};
pub use schema::{Column, ForeignKeyRef, Index, IndexKind, Table, TableKind};

use std::collections::HashMap;

use crate::cell::Row;

/// A foreign-key relationship found by [`Catalog::get_foreign_keys`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForeignKey<'a> {
    pub pk_table: &'a Table,
    pub pk_column: &'a Column,
    pub fk_table: &'a Table,
    pub fk_column: &'a Column,
}

/// The in-memory catalog: tables, indexes and inserted rows.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: Vec<Table>,
    indexes: Vec<Index>,
    /// Upper-cased table name → rows inserted during the session.
    inserted: HashMap<String, Vec<Row>>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog initialized from `preset`.
    pub fn with_preset(preset: CatalogPreset) -> Self {
        let mut catalog = Self::new();
        catalog.initialize(preset);
        catalog
    }

    /// Replaces the table and index lists with the preset's fixtures.
    ///
    /// Inserted rows are kept; use [`clear_inserted_data`](Self::clear_inserted_data)
    /// to discard them.
    pub fn initialize(&mut self, preset: CatalogPreset) {
        let (tables, indexes) = preset.build();
        self.tables = tables;
        self.indexes = indexes;
    }

    /// Returns all tables in creation order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Returns all indexes.
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Looks up a table by case-insensitive name.
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Registers a table. Rejecting duplicate names is the caller's job.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Removes a table and any rows inserted into it.
    pub fn remove_table(&mut self, name: &str) -> Option<Table> {
        let pos = self
            .tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))?;
        self.inserted.remove(&name.to_ascii_uppercase());
        Some(self.tables.remove(pos))
    }

    /// Appends a row to a table's inserted data.
    pub fn insert_row(&mut self, table_name: &str, row: Row) {
        self.inserted
            .entry(table_name.to_ascii_uppercase())
            .or_default()
            .push(row);
    }

    /// Returns the rows inserted into a table, oldest first.
    pub fn inserted_rows(&self, table_name: &str) -> &[Row] {
        self.inserted
            .get(&table_name.to_ascii_uppercase())
            .map_or(&[][..], Vec::as_slice)
    }

    /// Discards inserted rows for one table, or for all tables when `None`.
    pub fn clear_inserted_data(&mut self, table_name: Option<&str>) {
        match table_name {
            Some(name) => {
                self.inserted.remove(&name.to_ascii_uppercase());
            }
            None => self.inserted.clear(),
        }
    }

    /// Tables whose name matches `pattern`, optionally restricted to a
    /// comma-separated list of table types (quotes around entries allowed).
    pub fn get_tables(&self, pattern: &str, types: Option<&str>) -> Vec<&Table> {
        let types: Vec<String> = types
            .map(|list| {
                list.split(',')
                    .map(|t| t.trim().trim_matches('\'').to_ascii_uppercase())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        self.tables
            .iter()
            .filter(|t| matches_pattern(&t.name, pattern))
            .filter(|t| types.is_empty() || types.iter().any(|ty| ty == t.kind.as_str()))
            .collect()
    }

    /// Columns matching both patterns, with their 1-based ordinal position.
    pub fn get_columns(&self, table_pattern: &str, column_pattern: &str) -> Vec<(&Table, &Column, usize)> {
        self.tables
            .iter()
            .filter(|t| matches_pattern(&t.name, table_pattern))
            .flat_map(|t| {
                t.columns
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| matches_pattern(&c.name, column_pattern))
                    .map(move |(i, c)| (t, c, i + 1))
            })
            .collect()
    }

    /// Primary-key columns of matching tables, with their 1-based key sequence.
    pub fn get_primary_keys(&self, table_pattern: &str) -> Vec<(&Table, &Column, usize)> {
        self.tables
            .iter()
            .filter(|t| matches_pattern(&t.name, table_pattern))
            .flat_map(|t| {
                t.columns
                    .iter()
                    .filter(|c| c.primary_key)
                    .enumerate()
                    .map(move |(i, c)| (t, c, i + 1))
            })
            .collect()
    }

    /// Foreign keys whose referenced table matches `pk_table_pattern` and
    /// whose referencing table matches `fk_table_pattern`. References to
    /// tables or columns that no longer exist are skipped.
    pub fn get_foreign_keys(&self, pk_table_pattern: &str, fk_table_pattern: &str) -> Vec<ForeignKey<'_>> {
        let mut keys = Vec::new();
        for fk_table in self
            .tables
            .iter()
            .filter(|t| matches_pattern(&t.name, fk_table_pattern))
        {
            for fk_column in &fk_table.columns {
                let Some(target) = &fk_column.foreign_key else {
                    continue;
                };
                if !matches_pattern(&target.table, pk_table_pattern) {
                    continue;
                }
                let Some(pk_table) = self.find_table(&target.table) else {
                    continue;
                };
                let Some(pk_column) = pk_table.column(&target.column) else {
                    continue;
                };
                keys.push(ForeignKey {
                    pk_table,
                    pk_column,
                    fk_table,
                    fk_column,
                });
            }
        }
        keys
    }

    /// Indexes on matching tables.
    pub fn get_statistics(&self, table_pattern: &str) -> Vec<&Index> {
        self.indexes
            .iter()
            .filter(|i| matches_pattern(&i.table_name, table_pattern))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, SqlType, TypeSpec};

    fn default_catalog() -> Catalog {
        Catalog::with_preset(CatalogPreset::Default)
    }

    #[test]
    fn test_find_table_case_insensitive() {
        let catalog = default_catalog();
        assert_eq!(catalog.find_table("users").map(|t| t.name.as_str()), Some("USERS"));
        assert!(catalog.find_table("NOPE").is_none());
    }

    #[test]
    fn test_add_and_remove_table() {
        let mut catalog = default_catalog();
        catalog.add_table(Table::new(
            "FOO",
            vec![Column::new("ID", TypeSpec::new(SqlType::Integer, 10, 0))],
        ));
        catalog.insert_row("foo", vec![Cell::Integer(1)]);
        assert!(catalog.find_table("foo").is_some());

        let removed = catalog.remove_table("Foo").unwrap();
        assert_eq!(removed.name, "FOO");
        assert!(catalog.find_table("FOO").is_none());
        assert!(catalog.inserted_rows("FOO").is_empty());
        assert!(catalog.remove_table("FOO").is_none());
    }

    #[test]
    fn test_inserted_rows() {
        let mut catalog = default_catalog();
        catalog.insert_row("orders", vec![Cell::Integer(1)]);
        catalog.insert_row("ORDERS", vec![Cell::Integer(2)]);
        catalog.insert_row("USERS", vec![Cell::Integer(3)]);
        assert_eq!(catalog.inserted_rows("Orders").len(), 2);

        catalog.clear_inserted_data(Some("orders"));
        assert!(catalog.inserted_rows("ORDERS").is_empty());
        assert_eq!(catalog.inserted_rows("USERS").len(), 1);

        catalog.clear_inserted_data(None);
        assert!(catalog.inserted_rows("USERS").is_empty());
    }

    #[test]
    fn test_initialize_keeps_inserted_rows() {
        let mut catalog = default_catalog();
        catalog.insert_row("USERS", vec![Cell::Integer(1)]);
        catalog.initialize(CatalogPreset::Empty);
        assert!(catalog.tables().is_empty());
        assert_eq!(catalog.inserted_rows("USERS").len(), 1);
    }

    #[test]
    fn test_get_tables() {
        let catalog = default_catalog();
        let names = |tables: Vec<&Table>| tables.iter().map(|t| t.name.clone()).collect::<Vec<_>>();
        assert_eq!(catalog.get_tables("%", None).len(), 4);
        assert_eq!(names(catalog.get_tables("ORDER%", None)), vec!["ORDERS", "ORDER_ITEMS"]);
        assert_eq!(catalog.get_tables("%", Some("'TABLE','VIEW'")).len(), 4);
        assert!(catalog.get_tables("%", Some("VIEW")).is_empty());
    }

    #[test]
    fn test_get_columns() {
        let catalog = default_catalog();
        let cols = catalog.get_columns("USERS", "%");
        assert_eq!(cols.len(), 6);
        assert_eq!(cols[5].1.name, "BALANCE");
        assert_eq!(cols[5].2, 6);

        let ids = catalog.get_columns("%", "%_ID");
        assert!(ids.iter().all(|(_, c, _)| c.name.ends_with("_ID")));
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn test_get_primary_keys() {
        let catalog = default_catalog();
        let keys = catalog.get_primary_keys("USERS");
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].1.name, "USER_ID");
        assert_eq!(keys[0].2, 1);
    }

    #[test]
    fn test_get_foreign_keys() {
        let catalog = default_catalog();
        let refs_to_orders = catalog.get_foreign_keys("ORDERS", "");
        assert_eq!(refs_to_orders.len(), 1);
        assert_eq!(refs_to_orders[0].fk_table.name, "ORDER_ITEMS");
        assert_eq!(refs_to_orders[0].fk_column.name, "ORDER_ID");

        let from_items = catalog.get_foreign_keys("", "ORDER_ITEMS");
        assert_eq!(from_items.len(), 2);
        assert_eq!(catalog.get_foreign_keys("", "").len(), 3);
    }

    #[test]
    fn test_get_statistics() {
        let catalog = default_catalog();
        assert_eq!(catalog.get_statistics("USERS").len(), 2);
        assert!(catalog.get_statistics("ORDERS").is_empty());
    }
}
