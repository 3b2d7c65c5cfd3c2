use sqlx::PgPool;
use uuid::Uuid;

use crate::notes::repo_types::Note;

impl Note {
    /// Newest-first page of notes.
    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Note>> {
        let rows = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, created_at
            FROM notes
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn count(db: &PgPool) -> anyhow::Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notes")
            .fetch_one(db)
            .await?;
        Ok(total)
    }

    pub async fn create(db: &PgPool, title: &str, content: &str) -> anyhow::Result<Note> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (title, content)
            VALUES ($1, $2)
            RETURNING id, title, content, created_at
            "#,
        )
        .bind(title)
        .bind(content)
        .fetch_one(db)
        .await?;
        Ok(note)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, title, content, created_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(note)
    }

    /// Partial update; unspecified fields keep their current value.
    /// Returns `None` when the note does not exist.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> anyhow::Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes
            SET title = COALESCE($2, title),
                content = COALESCE($3, content)
            WHERE id = $1
            RETURNING id, title, content, created_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(db)
        .await?;
        Ok(note)
    }

    /// Returns whether a row was deleted.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
