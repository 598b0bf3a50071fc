//! Requirement persistence operations on the `requisitos` table.

use sqlx::PgPool;
use totem_core::{NewRequisito, Requisito, RequisitoFilter, RequisitoUpdate};

/// Requirements ordered by procedure, display order, then id.
pub async fn list(pool: &PgPool, filter: RequisitoFilter) -> Result<Vec<Requisito>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RequisitoRow>(
        "SELECT id, tramite_id, texto, sort_order FROM requisitos
         WHERE ($1::BIGINT IS NULL OR tramite_id = $1)
         ORDER BY tramite_id, sort_order, id",
    )
    .bind(filter.tramite_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RequisitoRow::into_record).collect())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Requisito>, sqlx::Error> {
    let row = sqlx::query_as::<_, RequisitoRow>(
        "SELECT id, tramite_id, texto, sort_order FROM requisitos WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(RequisitoRow::into_record))
}

/// Append a requirement after the procedure's current last one.
///
/// A missing procedure surfaces as a foreign key violation.
pub async fn insert(pool: &PgPool, input: &NewRequisito) -> Result<Requisito, sqlx::Error> {
    let row = sqlx::query_as::<_, RequisitoRow>(
        "INSERT INTO requisitos (tramite_id, texto, sort_order)
         SELECT $1, $2, COALESCE(MAX(sort_order) + 1, 0) FROM requisitos WHERE tramite_id = $1
         RETURNING id, tramite_id, texto, sort_order",
    )
    .bind(input.tramite_id)
    .bind(&input.texto)
    .fetch_one(pool)
    .await?;

    Ok(row.into_record())
}

/// Edit a requirement; an absent sort order keeps the stored one.
pub async fn update(
    pool: &PgPool,
    id: i64,
    input: &RequisitoUpdate,
) -> Result<Option<Requisito>, sqlx::Error> {
    let row = sqlx::query_as::<_, RequisitoRow>(
        "UPDATE requisitos SET texto = $1, sort_order = COALESCE($2, sort_order)
         WHERE id = $3 RETURNING id, tramite_id, texto, sort_order",
    )
    .bind(&input.texto)
    .bind(input.sort_order)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(RequisitoRow::into_record))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM requisitos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct RequisitoRow {
    id: i64,
    tramite_id: i64,
    texto: String,
    sort_order: i32,
}

impl RequisitoRow {
    fn into_record(self) -> Requisito {
        Requisito {
            id: self.id,
            tramite_id: self.tramite_id,
            texto: self.texto,
            sort_order: self.sort_order,
        }
    }
}
