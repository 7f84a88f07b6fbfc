//! MySQL source: information_schema introspection and column formatting
//! for the warehouse and pipeline DDL families.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mysql_async::prelude::*;
use mysql_async::{Pool, Row};
use std::collections::BTreeMap;
use tracing::info;

use crate::config::{Config, TableRule};
use crate::core::schema::{ColumnMeta, KeyColumnUsage, KeyRoles, TableMeta};
use crate::error::{MigrateError, Result};
use crate::source::{Dialect, DialectImpl, EmitterKind, SchemaSource, SourceSnapshot};

const DATE_TEMPLATE: &str = "%Y-%m-%d";
const DATETIME_TEMPLATE: &str = "%Y-%m-%d %H:%M:%S";

/// Column formatting for MySQL sources.
#[derive(Debug, Clone)]
pub struct MySqlDialect {
    use_decimal_v3: bool,
}

impl MySqlDialect {
    pub fn new(use_decimal_v3: bool) -> Self {
        Self { use_decimal_v3 }
    }

    /// Map a MySQL column to its warehouse type. Unsigned integer types
    /// widen one step; the declared display width is preserved where the
    /// target type keeps it.
    fn warehouse_type(&self, col: &ColumnMeta) -> String {
        let widen = |narrow: &str, wide: &str| {
            let target = if is_unsigned(&col.column_type) { wide } else { narrow };
            col.column_type.replace(&col.data_type, target)
        };

        let mapped = match col.data_type.as_str() {
            "char" | "year" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext"
            | "tinyblob" | "blob" | "mediumblob" | "longblob" | "json" | "binary"
            | "varbinary" | "set" | "enum" => "STRING".to_string(),
            "tinyint" => widen("TINYINT", "SMALLINT"),
            "smallint" => widen("SMALLINT", "INT"),
            "mediumint" | "int" | "integer" => widen("INT", "BIGINT"),
            "bigint" => widen("BIGINT", "LARGEINT"),
            "bit" => match col.numeric_precision {
                0..=7 => "TINYINT",
                8..=15 => "SMALLINT",
                16..=31 => "INT",
                32..=63 => "BIGINT",
                _ => "LARGEINT",
            }
            .to_string(),
            "float" => "FLOAT".to_string(),
            "double" => "DOUBLE".to_string(),
            "decimal" => self.decimal_type(col),
            "date" => "DATE".to_string(),
            "time" | "datetime" | "timestamp" => "DATETIME".to_string(),
            _ => "STRING".to_string(),
        };

        mapped.replace("unsigned", "").replace("UNSIGNED", "")
    }

    /// DECIMAL keeps precision/scale up to the engine limit; beyond it the
    /// value degrades to STRING. V3 raises the limit from 27 to 38.
    fn decimal_type(&self, col: &ColumnMeta) -> String {
        if (!self.use_decimal_v3 && col.numeric_precision > 27) || col.numeric_precision > 38 {
            "STRING".to_string()
        } else {
            format!("DECIMAL({}, {})", col.numeric_precision, col.numeric_scale)
        }
    }

    /// Map a MySQL column to its Flink SQL type.
    fn pipeline_type(&self, col: &ColumnMeta) -> String {
        match col.data_type.as_str() {
            "tinyint" => pick(col, "TINYINT", "SMALLINT"),
            "smallint" => pick(col, "SMALLINT", "INT"),
            "mediumint" | "int" | "integer" => pick(col, "INT", "BIGINT"),
            "bigint" => pick(col, "BIGINT", "DECIMAL(20, 0)"),
            "bit" => {
                if col.numeric_precision == 1 {
                    "BOOLEAN".to_string()
                } else {
                    "BINARY".to_string()
                }
            }
            "real" | "float" => "FLOAT".to_string(),
            "binary" | "varbinary" | "double" | "date" => col.data_type.to_uppercase(),
            "decimal" => self.decimal_type(col),
            "time" | "datetime" | "timestamp" => "TIMESTAMP".to_string(),
            _ => "STRING".to_string(),
        }
    }

    /// Render the DEFAULT clause for a warehouse column; a date/datetime
    /// default that does not parse drops the default and forces NULL.
    fn warehouse_default(&self, col: &ColumnMeta) -> (String, bool) {
        let Some(default) = col.default.as_deref() else {
            return (String::new(), false);
        };
        if default.is_empty() {
            return (format!("DEFAULT \"{}\"", default), false);
        }
        if col.data_type == "bit" {
            let bits = default
                .to_lowercase()
                .replace("b'", "")
                .replace('\'', "")
                .replace("0b", "");
            let value = i64::from_str_radix(&bits, 2).unwrap_or(0);
            return (format!("DEFAULT \"{}\"", value), false);
        }
        match col.data_type.as_str() {
            "date" => {
                if NaiveDate::parse_from_str(default, DATE_TEMPLATE).is_ok() {
                    (format!("DEFAULT \"{}\"", default), false)
                } else {
                    (String::new(), true)
                }
            }
            "datetime" | "timestamp" => {
                if NaiveDateTime::parse_from_str(default, DATETIME_TEMPLATE).is_ok() {
                    (format!("DEFAULT \"{}\"", default), false)
                } else {
                    (String::new(), true)
                }
            }
            _ => (format!("DEFAULT \"{}\"", default), false),
        }
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn combine_schema_name(&self) -> bool {
        false
    }

    fn external_engine(&self) -> &'static str {
        "mysql"
    }

    fn pipeline_connector(&self) -> &'static str {
        "mysql-cdc"
    }

    fn pipeline_needs_endpoint(&self) -> bool {
        true
    }

    fn pipeline_special_props(&self, _rule: &TableRule) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn format_warehouse_column(&self, _table: &TableMeta, col: &ColumnMeta) -> Result<String> {
        let col_type = self.warehouse_type(col);
        let (default, force_null) = self.warehouse_default(col);
        let nullable = if col.is_nullable || force_null {
            "NULL"
        } else {
            "NOT NULL"
        };
        Ok(format!(
            "  `{}` {} {} {} COMMENT \"{}\"",
            col.name,
            col_type,
            nullable,
            default,
            encode_comment(&col.comment)
        ))
    }

    fn format_pipeline_column(&self, _table: &TableMeta, col: &ColumnMeta) -> Result<String> {
        let nullable = if col.is_nullable { "NULL" } else { "NOT NULL" };
        Ok(format!(
            "  `{}` {} {}",
            col.name,
            self.pipeline_type(col),
            nullable
        ))
    }

    fn emitters(&self) -> &'static [EmitterKind] {
        &[
            EmitterKind::StarRocks,
            EmitterKind::StarRocksExternal,
            EmitterKind::Flink,
        ]
    }
}

fn pick(col: &ColumnMeta, signed: &str, unsigned: &str) -> String {
    if is_unsigned(&col.column_type) {
        unsigned.to_string()
    } else {
        signed.to_string()
    }
}

fn is_unsigned(column_type: &str) -> bool {
    column_type.contains("unsigned") || column_type.contains("UNSIGNED")
}

/// Escape quotes and strip newlines so a comment can sit inside a
/// double-quoted DDL literal.
pub(crate) fn encode_comment(comment: &str) -> String {
    comment
        .replace('"', "\\\"")
        .replace('\n', " ")
        .replace('\r', " ")
}

/// MySQL information_schema introspection.
pub struct MySqlSource {
    pool: Pool,
    use_decimal_v3: bool,
}

impl MySqlSource {
    /// Open a connection pool against the configured server.
    pub async fn connect(config: &Config) -> Result<Self> {
        let opts = mysql_async::Opts::from_url(&config.source.connection_url())
            .map_err(mysql_async::Error::from)?;
        Ok(Self {
            pool: Pool::new(opts),
            use_decimal_v3: config.planning.use_decimal_v3,
        })
    }

    pub(crate) fn pool(&self) -> &Pool {
        &self.pool
    }

    pub(crate) fn use_decimal_v3(&self) -> bool {
        self.use_decimal_v3
    }

    async fn load_tables(&self) -> Result<Vec<TableMeta>> {
        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<Row> = conn
            .query(
                "SELECT TABLE_SCHEMA, TABLE_NAME, ENGINE, DATA_LENGTH, CREATE_TIME, TABLE_COMMENT
                 FROM information_schema.tables
                 WHERE TABLE_TYPE = 'BASE TABLE'
                 ORDER BY TABLE_SCHEMA ASC, TABLE_NAME ASC",
            )
            .await?;

        let tables = rows
            .into_iter()
            .map(|row| {
                let schema: String = row.get("TABLE_SCHEMA").unwrap_or_default();
                TableMeta {
                    // MySQL has no separate catalog level: catalog == schema.
                    catalog: schema.clone(),
                    schema,
                    name: row.get("TABLE_NAME").unwrap_or_default(),
                    engine: row
                        .get::<Option<String>, _>("ENGINE")
                        .flatten()
                        .unwrap_or_default(),
                    data_length: row
                        .get::<Option<u64>, _>("DATA_LENGTH")
                        .flatten()
                        .unwrap_or(0),
                    create_time: row
                        .get::<Option<NaiveDateTime>, _>("CREATE_TIME")
                        .flatten()
                        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
                        .unwrap_or_else(Utc::now),
                    comment: row
                        .get::<Option<String>, _>("TABLE_COMMENT")
                        .flatten()
                        .unwrap_or_default(),
                }
            })
            .collect();
        Ok(tables)
    }

    async fn load_columns(&self) -> Result<Vec<ColumnMeta>> {
        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<Row> = conn
            .query(
                "SELECT TABLE_SCHEMA, TABLE_NAME, COLUMN_NAME, ORDINAL_POSITION, COLUMN_DEFAULT,
                        IS_NULLABLE, DATA_TYPE, NUMERIC_PRECISION, NUMERIC_SCALE, COLUMN_TYPE,
                        COLUMN_COMMENT
                 FROM information_schema.columns
                 ORDER BY TABLE_SCHEMA ASC, TABLE_NAME ASC, ORDINAL_POSITION ASC",
            )
            .await?;

        let columns = rows
            .into_iter()
            .map(|row| {
                let schema: String = row.get("TABLE_SCHEMA").unwrap_or_default();
                let is_nullable: String = row.get("IS_NULLABLE").unwrap_or_default();
                ColumnMeta {
                    catalog: schema.clone(),
                    schema,
                    table: row.get("TABLE_NAME").unwrap_or_default(),
                    name: row.get("COLUMN_NAME").unwrap_or_default(),
                    ordinal_position: row
                        .get::<Option<u64>, _>("ORDINAL_POSITION")
                        .flatten()
                        .unwrap_or(0),
                    data_type: row.get("DATA_TYPE").unwrap_or_default(),
                    column_type: row.get("COLUMN_TYPE").unwrap_or_default(),
                    numeric_precision: row
                        .get::<Option<u64>, _>("NUMERIC_PRECISION")
                        .flatten()
                        .unwrap_or(0),
                    numeric_scale: row
                        .get::<Option<u64>, _>("NUMERIC_SCALE")
                        .flatten()
                        .unwrap_or(0),
                    is_nullable: is_nullable == "YES",
                    default: row.get::<Option<String>, _>("COLUMN_DEFAULT").flatten(),
                    comment: row
                        .get::<Option<String>, _>("COLUMN_COMMENT")
                        .flatten()
                        .unwrap_or_default(),
                    key_roles: KeyRoles::default(),
                }
            })
            .collect();
        Ok(columns)
    }

    async fn load_key_usage(&self) -> Result<Vec<KeyColumnUsage>> {
        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<Row> = conn
            .query(
                "SELECT TABLE_SCHEMA, TABLE_NAME, COLUMN_NAME, CONSTRAINT_NAME, ORDINAL_POSITION
                 FROM information_schema.key_column_usage
                 WHERE REFERENCED_TABLE_NAME IS NULL
                 ORDER BY TABLE_SCHEMA ASC, TABLE_NAME ASC, CONSTRAINT_NAME ASC,
                          ORDINAL_POSITION ASC",
            )
            .await?;

        let key_usage = rows
            .into_iter()
            .map(|row| {
                let schema: String = row.get("TABLE_SCHEMA").unwrap_or_default();
                KeyColumnUsage {
                    catalog: schema.clone(),
                    schema,
                    table: row.get("TABLE_NAME").unwrap_or_default(),
                    column_name: row.get("COLUMN_NAME").unwrap_or_default(),
                    constraint_name: row.get("CONSTRAINT_NAME").unwrap_or_default(),
                    ordinal_position: row
                        .get::<Option<u64>, _>("ORDINAL_POSITION")
                        .flatten()
                        .unwrap_or(0),
                }
            })
            .collect();
        Ok(key_usage)
    }

    pub(crate) async fn snapshot_inner(&self) -> Result<SourceSnapshot> {
        let tables = self.load_tables().await?;
        if tables.is_empty() {
            return Err(MigrateError::Introspection(
                "no rows in information_schema.tables".to_string(),
            ));
        }
        let columns = self.load_columns().await?;
        if columns.is_empty() {
            return Err(MigrateError::Introspection(
                "no rows in information_schema.columns".to_string(),
            ));
        }
        let key_usage = self.load_key_usage().await?;

        info!(
            tables = tables.len(),
            columns = columns.len(),
            keys = key_usage.len(),
            "introspected source schema"
        );
        Ok(SourceSnapshot {
            tables,
            columns,
            key_usage,
        })
    }
}

#[async_trait]
impl SchemaSource for MySqlSource {
    async fn snapshot(&self) -> Result<SourceSnapshot> {
        self.snapshot_inner().await
    }

    async fn dialect(&self) -> Result<DialectImpl> {
        Ok(DialectImpl::Mysql(MySqlDialect::new(self.use_decimal_v3)))
    }

    async fn close(&self) {
        let _ = self.pool.clone().disconnect().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect() -> MySqlDialect {
        MySqlDialect::new(false)
    }

    fn table() -> TableMeta {
        TableMeta {
            catalog: "app".to_string(),
            schema: "app".to_string(),
            name: "orders".to_string(),
            engine: "InnoDB".to_string(),
            data_length: 0,
            create_time: Utc::now(),
            comment: String::new(),
        }
    }

    fn column(data_type: &str, column_type: &str) -> ColumnMeta {
        ColumnMeta {
            catalog: "app".to_string(),
            schema: "app".to_string(),
            table: "orders".to_string(),
            name: "c".to_string(),
            ordinal_position: 1,
            data_type: data_type.to_string(),
            column_type: column_type.to_string(),
            numeric_precision: 0,
            numeric_scale: 0,
            is_nullable: true,
            default: None,
            comment: String::new(),
            key_roles: KeyRoles::default(),
        }
    }

    #[test]
    fn test_integer_widening_preserves_display_width() {
        let d = dialect();
        assert_eq!(d.warehouse_type(&column("int", "int(11)")), "INT(11)");
        assert_eq!(
            d.warehouse_type(&column("tinyint", "tinyint(3) unsigned")),
            "SMALLINT(3) "
        );
        assert_eq!(
            d.warehouse_type(&column("bigint", "bigint(20) unsigned")),
            "LARGEINT(20) "
        );
        assert_eq!(d.warehouse_type(&column("mediumint", "mediumint(9)")), "INT(9)");
    }

    #[test]
    fn test_bit_maps_by_precision() {
        let d = dialect();
        let mut col = column("bit", "bit(1)");
        col.numeric_precision = 1;
        assert_eq!(d.warehouse_type(&col), "TINYINT");
        col.numeric_precision = 12;
        assert_eq!(d.warehouse_type(&col), "SMALLINT");
        col.numeric_precision = 64;
        assert_eq!(d.warehouse_type(&col), "LARGEINT");
    }

    #[test]
    fn test_decimal_precision_limits() {
        let mut col = column("decimal", "decimal(30,4)");
        col.numeric_precision = 30;
        col.numeric_scale = 4;
        assert_eq!(dialect().warehouse_type(&col), "STRING");
        assert_eq!(
            MySqlDialect::new(true).warehouse_type(&col),
            "DECIMAL(30, 4)"
        );
        col.numeric_precision = 39;
        assert_eq!(MySqlDialect::new(true).warehouse_type(&col), "STRING");
    }

    #[test]
    fn test_temporal_and_text_types() {
        let d = dialect();
        assert_eq!(d.warehouse_type(&column("datetime", "datetime")), "DATETIME");
        assert_eq!(d.warehouse_type(&column("date", "date")), "DATE");
        assert_eq!(d.warehouse_type(&column("varchar", "varchar(255)")), "STRING");
        assert_eq!(d.warehouse_type(&column("enum", "enum('a','b')")), "STRING");
    }

    #[test]
    fn test_bit_default_parses_binary_literal() {
        let d = dialect();
        let mut col = column("bit", "bit(2)");
        col.numeric_precision = 2;
        col.is_nullable = false;
        col.default = Some("b'01'".to_string());
        let rendered = d.format_warehouse_column(&table(), &col).unwrap();
        assert!(rendered.contains("DEFAULT \"1\""));
        assert!(rendered.contains("NOT NULL"));
    }

    #[test]
    fn test_unparseable_datetime_default_forces_null() {
        let d = dialect();
        let mut col = column("datetime", "datetime");
        col.is_nullable = false;
        col.default = Some("CURRENT_TIMESTAMP".to_string());
        let rendered = d.format_warehouse_column(&table(), &col).unwrap();
        assert!(!rendered.contains("DEFAULT"));
        assert!(rendered.contains("` DATETIME NULL"));
    }

    #[test]
    fn test_pipeline_types() {
        let d = dialect();
        assert_eq!(d.pipeline_type(&column("int", "int(11)")), "INT");
        assert_eq!(
            d.pipeline_type(&column("bigint", "bigint unsigned")),
            "DECIMAL(20, 0)"
        );
        assert_eq!(d.pipeline_type(&column("datetime", "datetime")), "TIMESTAMP");
        assert_eq!(d.pipeline_type(&column("json", "json")), "STRING");
        let mut bit = column("bit", "bit(1)");
        bit.numeric_precision = 1;
        assert_eq!(d.pipeline_type(&bit), "BOOLEAN");
    }

    #[test]
    fn test_encode_comment() {
        assert_eq!(encode_comment("say \"hi\"\nthere"), "say \\\"hi\\\" there");
    }
}
