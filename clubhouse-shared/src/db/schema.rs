/// Declared table metadata and drift detection
///
/// The models in [`crate::models`] read and write a fixed set of columns.
/// [`DECLARED_TABLES`] lists them, and [`check_schema`] diffs that list
/// against `information_schema` so a database that was migrated by hand, or
/// not at all, is caught before the server starts serving requests.

use serde::Serialize;
use sqlx::PgPool;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// Expected columns of one table, with their `information_schema` data types
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [(&'static str, &'static str)],
}

/// Tables and columns the models depend on
pub const DECLARED_TABLES: &[TableSpec] = &[
    TableSpec {
        name: "organizations",
        columns: &[
            ("id", "bigint"),
            ("name", "character varying"),
            ("created_at", "timestamp with time zone"),
            ("updated_at", "timestamp with time zone"),
            ("is_deleted", "boolean"),
            ("deleted_at", "timestamp with time zone"),
        ],
    },
    TableSpec {
        name: "users",
        columns: &[
            ("id", "bigint"),
            ("uuid", "uuid"),
            ("first_name", "character varying"),
            ("last_name", "character varying"),
            ("username", "character varying"),
            ("email", "character varying"),
            ("hashed_password", "character varying"),
            ("profile_image_url", "character varying"),
            ("role", "character varying"),
            ("organization_id", "bigint"),
            ("is_superuser", "boolean"),
            ("is_deleted", "boolean"),
            ("deleted_at", "timestamp with time zone"),
            ("created_at", "timestamp with time zone"),
            ("updated_at", "timestamp with time zone"),
        ],
    },
];

/// One difference between declared and live schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaDrift {
    MissingTable {
        table: String,
    },
    MissingColumn {
        table: String,
        column: String,
    },
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
    /// Present in the database but not declared; harmless, reported for review
    ExtraColumn {
        table: String,
        column: String,
    },
}

impl SchemaDrift {
    /// Extra columns don't break the models; everything else does
    pub fn is_breaking(&self) -> bool {
        !matches!(self, SchemaDrift::ExtraColumn { .. })
    }
}

impl fmt::Display for SchemaDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaDrift::MissingTable { table } => write!(f, "missing table {}", table),
            SchemaDrift::MissingColumn { table, column } => {
                write!(f, "missing column {}.{}", table, column)
            }
            SchemaDrift::TypeMismatch {
                table,
                column,
                expected,
                actual,
            } => write!(
                f,
                "column {}.{} is {} (expected {})",
                table, column, actual, expected
            ),
            SchemaDrift::ExtraColumn { table, column } => {
                write!(f, "undeclared column {}.{}", table, column)
            }
        }
    }
}

/// Live columns keyed by table, then column, valued by data type
pub type LiveColumns = BTreeMap<String, BTreeMap<String, String>>;

/// Compares declared tables against a snapshot of live columns
pub fn diff_schema(declared: &[TableSpec], live: &LiveColumns) -> Vec<SchemaDrift> {
    let mut drift = Vec::new();

    for table in declared {
        let Some(live_columns) = live.get(table.name) else {
            drift.push(SchemaDrift::MissingTable {
                table: table.name.to_string(),
            });
            continue;
        };

        let mut declared_names = BTreeSet::new();
        for (column, expected) in table.columns {
            declared_names.insert(*column);
            match live_columns.get(*column) {
                None => drift.push(SchemaDrift::MissingColumn {
                    table: table.name.to_string(),
                    column: column.to_string(),
                }),
                Some(actual) if actual != expected => drift.push(SchemaDrift::TypeMismatch {
                    table: table.name.to_string(),
                    column: column.to_string(),
                    expected: expected.to_string(),
                    actual: actual.clone(),
                }),
                Some(_) => {}
            }
        }

        for column in live_columns.keys() {
            if !declared_names.contains(column.as_str()) {
                drift.push(SchemaDrift::ExtraColumn {
                    table: table.name.to_string(),
                    column: column.clone(),
                });
            }
        }
    }

    drift
}

/// Reads declared tables' columns from `information_schema`
pub async fn load_live_columns(pool: &PgPool) -> Result<LiveColumns, sqlx::Error> {
    let tables: Vec<String> = DECLARED_TABLES.iter().map(|t| t.name.to_string()).collect();

    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT table_name::text, column_name::text, data_type::text
         FROM information_schema.columns
         WHERE table_schema = 'public' AND table_name::text = ANY($1)",
    )
    .bind(&tables)
    .fetch_all(pool)
    .await?;

    let mut live = LiveColumns::new();
    for (table, column, data_type) in rows {
        live.entry(table).or_default().insert(column, data_type);
    }

    debug!(tables = live.len(), "Loaded live schema");
    Ok(live)
}

/// Diffs [`DECLARED_TABLES`] against the live database
pub async fn check_schema(pool: &PgPool) -> Result<Vec<SchemaDrift>, sqlx::Error> {
    let live = load_live_columns(pool).await?;
    let drift = diff_schema(DECLARED_TABLES, &live);

    for item in &drift {
        warn!(drift = %item, "Schema drift detected");
    }

    Ok(drift)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_matching(declared: &[TableSpec]) -> LiveColumns {
        declared
            .iter()
            .map(|t| {
                let columns = t
                    .columns
                    .iter()
                    .map(|(c, ty)| (c.to_string(), ty.to_string()))
                    .collect();
                (t.name.to_string(), columns)
            })
            .collect()
    }

    #[test]
    fn test_matching_schema_has_no_drift() {
        let live = live_matching(DECLARED_TABLES);
        assert!(diff_schema(DECLARED_TABLES, &live).is_empty());
    }

    #[test]
    fn test_missing_table_reported_once() {
        let mut live = live_matching(DECLARED_TABLES);
        live.remove("users");

        let drift = diff_schema(DECLARED_TABLES, &live);
        assert_eq!(
            drift,
            vec![SchemaDrift::MissingTable {
                table: "users".to_string()
            }]
        );
        assert!(drift[0].is_breaking());
    }

    #[test]
    fn test_column_drift_kinds() {
        let mut live = live_matching(DECLARED_TABLES);
        let users = live.get_mut("users").unwrap();
        users.remove("uuid");
        users.insert("role".to_string(), "text".to_string());
        users.insert("nickname".to_string(), "text".to_string());

        let drift = diff_schema(DECLARED_TABLES, &live);
        assert_eq!(drift.len(), 3);
        assert!(drift.contains(&SchemaDrift::MissingColumn {
            table: "users".to_string(),
            column: "uuid".to_string(),
        }));
        assert!(drift.contains(&SchemaDrift::TypeMismatch {
            table: "users".to_string(),
            column: "role".to_string(),
            expected: "character varying".to_string(),
            actual: "text".to_string(),
        }));

        let extra = SchemaDrift::ExtraColumn {
            table: "users".to_string(),
            column: "nickname".to_string(),
        };
        assert!(drift.contains(&extra));
        assert!(!extra.is_breaking());
    }

    #[test]
    fn test_drift_display() {
        let drift = SchemaDrift::TypeMismatch {
            table: "users".to_string(),
            column: "role".to_string(),
            expected: "character varying".to_string(),
            actual: "text".to_string(),
        };
        assert_eq!(
            drift.to_string(),
            "column users.role is text (expected character varying)"
        );
    }
}
