//! Catalog presets selected by the `Catalog` connection attribute.

use std::str::FromStr;

use super::schema::{Column, Index, IndexKind, Table};
use crate::cell::{SqlType, TypeSpec};

/// Number of generated tables in the large preset.
pub const LARGE_TABLE_COUNT: usize = 100;

/// Number of columns per generated table in the large preset.
pub const LARGE_COLUMN_COUNT: usize = 20;

/// Named catalog fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogPreset {
    /// Four related tables: USERS, ORDERS, PRODUCTS, ORDER_ITEMS.
    #[default]
    Default,
    /// No tables.
    Empty,
    /// The default tables plus `TABLE_1`..`TABLE_100`, 20 columns each.
    Large,
}

impl FromStr for CatalogPreset {
    type Err = std::convert::Infallible;

    /// Parses a preset name. Unknown names select the default preset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "empty" => CatalogPreset::Empty,
            "large" => CatalogPreset::Large,
            _ => CatalogPreset::Default,
        })
    }
}

impl CatalogPreset {
    /// Builds the preset's tables and indexes.
    pub fn build(self) -> (Vec<Table>, Vec<Index>) {
        match self {
            CatalogPreset::Empty => (Vec::new(), Vec::new()),
            CatalogPreset::Default => (default_tables(), default_indexes()),
            CatalogPreset::Large => {
                let mut tables = default_tables();
                tables.extend((1..=LARGE_TABLE_COUNT).map(generated_table));
                (tables, default_indexes())
            }
        }
    }
}

fn integer() -> TypeSpec {
    TypeSpec::new(SqlType::Integer, 10, 0)
}

fn varchar(size: usize) -> TypeSpec {
    TypeSpec::new(SqlType::Varchar, size, 0)
}

fn decimal() -> TypeSpec {
    TypeSpec::new(SqlType::Decimal, 10, 2)
}

fn default_tables() -> Vec<Table> {
    vec![
        Table::fixture(
            "USERS",
            "User accounts",
            vec![
                Column::new("USER_ID", integer()).primary_key().auto_increment(),
                Column::new("USERNAME", varchar(50)).not_null(),
                Column::new("EMAIL", varchar(100)),
                Column::new("CREATED_DATE", TypeSpec::new(SqlType::Date, 10, 0)),
                Column::new("IS_ACTIVE", TypeSpec::new(SqlType::Bit, 1, 0)).default_value("1"),
                Column::new("BALANCE", decimal()).default_value("0.00"),
            ],
        ),
        Table::fixture(
            "ORDERS",
            "Order records",
            vec![
                Column::new("ORDER_ID", integer()).primary_key().auto_increment(),
                Column::new("USER_ID", integer()).not_null().references("USERS", "USER_ID"),
                Column::new("ORDER_DATE", TypeSpec::new(SqlType::Timestamp, 26, 6)),
                Column::new("TOTAL_AMOUNT", decimal()),
                Column::new("STATUS", varchar(20)).default_value("PENDING"),
            ],
        ),
        Table::fixture(
            "PRODUCTS",
            "Product catalog",
            vec![
                Column::new("PRODUCT_ID", integer()).primary_key().auto_increment(),
                Column::new("NAME", varchar(100)).not_null(),
                Column::new("DESCRIPTION", TypeSpec::new(SqlType::LongVarchar, 65535, 0)),
                Column::new("PRICE", decimal()).not_null(),
                Column::new("STOCK_QUANTITY", integer()).default_value("0"),
                Column::new("CATEGORY", varchar(50)),
            ],
        ),
        Table::fixture(
            "ORDER_ITEMS",
            "Order line items",
            vec![
                Column::new("ORDER_ITEM_ID", integer()).primary_key().auto_increment(),
                Column::new("ORDER_ID", integer()).not_null().references("ORDERS", "ORDER_ID"),
                Column::new("PRODUCT_ID", integer())
                    .not_null()
                    .references("PRODUCTS", "PRODUCT_ID"),
                Column::new("QUANTITY", integer()).not_null().default_value("1"),
                Column::new("UNIT_PRICE", decimal()).not_null(),
            ],
        ),
    ]
}

fn default_indexes() -> Vec<Index> {
    vec![
        Index::new("USERS", "PK_USERS", true, IndexKind::Clustered, &["USER_ID"]),
        Index::new("USERS", "UQ_USERS_USERNAME", true, IndexKind::Other, &["USERNAME"]),
    ]
}

/// `TABLE_i` with `COLUMN_1`..`COLUMN_20`; every third column is an integer.
fn generated_table(i: usize) -> Table {
    let columns = (1..=LARGE_COLUMN_COUNT)
        .map(|j| {
            let name = format!("COLUMN_{j}");
            let column = if j % 3 == 0 {
                Column::new(name, integer())
            } else {
                Column::new(name, varchar(50))
            };
            if j == 1 {
                column.primary_key().auto_increment()
            } else {
                column
            }
        })
        .collect();
    Table::fixture(format!("TABLE_{i}"), format!("Generated table {i}"), columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names() {
        assert_eq!("EMPTY".parse::<CatalogPreset>(), Ok(CatalogPreset::Empty));
        assert_eq!("large".parse::<CatalogPreset>(), Ok(CatalogPreset::Large));
        assert_eq!("default".parse::<CatalogPreset>(), Ok(CatalogPreset::Default));
        assert_eq!("bogus".parse::<CatalogPreset>(), Ok(CatalogPreset::Default));
    }

    #[test]
    fn test_default_preset() {
        let (tables, indexes) = CatalogPreset::Default.build();
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["USERS", "ORDERS", "PRODUCTS", "ORDER_ITEMS"]);
        assert!(tables.iter().all(|t| t.generates_mock_data));
        assert_eq!(indexes.len(), 2);

        let users = &tables[0];
        let columns: Vec<_> = users.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            columns,
            vec!["USER_ID", "USERNAME", "EMAIL", "CREATED_DATE", "IS_ACTIVE", "BALANCE"]
        );
        assert!(users.columns[0].auto_increment);
    }

    #[test]
    fn test_large_preset() {
        let (tables, _) = CatalogPreset::Large.build();
        assert_eq!(tables.len(), 4 + LARGE_TABLE_COUNT);
        let t = tables.last().unwrap();
        assert_eq!(t.name, "TABLE_100");
        assert_eq!(t.columns.len(), LARGE_COLUMN_COUNT);
        assert_eq!(t.columns[2].type_spec.sql_type, SqlType::Integer);
        assert_eq!(t.columns[1].type_spec.sql_type, SqlType::Varchar);
        assert!(t.columns[0].primary_key);
    }

    #[test]
    fn test_empty_preset() {
        let (tables, indexes) = CatalogPreset::Empty.build();
        assert!(tables.is_empty());
        assert!(indexes.is_empty());
    }
}
