//! `vinos` table schema, bulk insert and sample queries

use sqlx::{Connection, Row};
use tracing::info;

use super::connect;
use crate::features::{Feature, Sample, ID_COLUMN, QUALITY_COLUMN};
use crate::schema::{RawTable, RawValue};
use crate::Result;

/// Table holding the reference wines
pub const TABLE_NAME: &str = "vinos";

/// Create the table if it does not exist yet
pub async fn create_vinos_table(url: &str) -> Result<()> {
    let mut conn = connect(url).await?;
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vinos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fixed_acidity REAL,
            volatile_acidity REAL,
            citric_acid REAL,
            residual_sugar REAL,
            chlorides REAL,
            free_sulfur_dioxide INTEGER,
            total_sulfur_dioxide INTEGER,
            density REAL,
            ph REAL,
            sulphates REAL,
            alcohol REAL,
            quality TEXT
        )
        "#,
    )
    .execute(&mut conn)
    .await?;
    conn.close().await?;
    Ok(())
}

/// INTEGER columns; values are truncated toward zero on insert
fn is_integer_column(feature: Feature) -> bool {
    matches!(
        feature,
        Feature::FreeSulfurDioxide | Feature::TotalSulfurDioxide
    )
}

/// Insert samples in transactions of `batch_size` rows
///
/// Sample ids are ignored; the table assigns its own. Returns the number
/// of inserted rows.
pub async fn insert_samples(url: &str, samples: &[Sample], batch_size: usize) -> Result<usize> {
    let columns = Feature::names().join(", ");
    let placeholders = vec!["?"; Feature::ALL.len() + 1].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}, {}) VALUES ({})",
        TABLE_NAME, columns, QUALITY_COLUMN, placeholders
    );

    let mut conn = connect(url).await?;
    let mut inserted = 0;
    for batch in samples.chunks(batch_size.max(1)) {
        let mut tx = conn.begin().await?;
        for sample in batch {
            let mut query = sqlx::query(&sql);
            for feature in Feature::ALL {
                let value = sample.features[feature];
                query = if is_integer_column(feature) {
                    query.bind(value.trunc() as i64)
                } else {
                    query.bind(value)
                };
            }
            query
                .bind(sample.ground_truth.as_deref())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        inserted += batch.len();
        info!("Inserted {} / {} rows", inserted, samples.len());
    }
    conn.close().await?;
    Ok(inserted)
}

/// Load reference rows as raw records, ordered by id
///
/// `limit` of `None` reads the whole table. Feature columns come back as
/// numbers, `id` and `quality` as text, so the result feeds the same
/// normalize/validate path as an uploaded file.
pub async fn fetch_samples(url: &str, limit: Option<u32>) -> Result<RawTable> {
    let feature_select = Feature::ALL
        .iter()
        .map(|f| format!("CAST({0} AS REAL) AS {0}", f.name()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!(
        "SELECT CAST(id AS TEXT) AS id, {}, CAST(quality AS TEXT) AS quality FROM {} ORDER BY {1}.id",
        feature_select, TABLE_NAME
    );
    if limit.is_some() {
        sql.push_str(" LIMIT ?");
    }

    let mut conn = connect(url).await?;
    let mut query = sqlx::query(&sql);
    if let Some(limit) = limit {
        query = query.bind(i64::from(limit));
    }
    let rows = query.fetch_all(&mut conn).await?;
    conn.close().await?;

    let mut headers = vec![ID_COLUMN.to_string()];
    headers.extend(Feature::names().iter().map(|s| s.to_string()));
    headers.push(QUALITY_COLUMN.to_string());

    let mut table_rows = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut values = Vec::with_capacity(headers.len());
        values.push(text_or_null(row.try_get::<Option<String>, _>(ID_COLUMN)?));
        for feature in Feature::ALL {
            values.push(match row.try_get::<Option<f64>, _>(feature.name())? {
                Some(n) => RawValue::Number(n),
                None => RawValue::Null,
            });
        }
        values.push(text_or_null(row.try_get::<Option<String>, _>(QUALITY_COLUMN)?));
        table_rows.push(values);
    }

    info!("Fetched {} sample rows", table_rows.len());
    Ok(RawTable::new(headers, table_rows))
}

fn text_or_null(value: Option<String>) -> RawValue {
    value.map(RawValue::Text).unwrap_or(RawValue::Null)
}
