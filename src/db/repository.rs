use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::InsightRow;

use super::schema::SCHEMA;

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    // Credential operations

    pub async fn get_credential(&self, kind: &str) -> Result<Option<String>> {
        let kind = kind.to_string();
        let token = self
            .conn
            .call(move |conn| {
                let token = conn
                    .query_row(
                        "SELECT token FROM credentials WHERE type = ?1",
                        params![kind],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(token)
            })
            .await?;
        Ok(token)
    }

    pub async fn save_credential(&self, kind: &str, token: &str) -> Result<()> {
        let kind = kind.to_string();
        let token = token.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO credentials (type, token) VALUES (?1, ?2)",
                    params![kind, token],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // Insight operations

    /// Replaces the metrics of an already known article instead of adding
    /// a second row. The row keeps its original position for export.
    pub async fn upsert_insight(&self, row: InsightRow) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO insights (id, headline, publication_date, author, url,
                                            total_views, average_view_duration, average_scroll_depth)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                       ON CONFLICT(id) DO UPDATE SET
                           headline = excluded.headline,
                           publication_date = excluded.publication_date,
                           author = excluded.author,
                           url = excluded.url,
                           total_views = excluded.total_views,
                           average_view_duration = excluded.average_view_duration,
                           average_scroll_depth = excluded.average_scroll_depth,
                           updated_at = datetime('now')"#,
                    params![
                        row.id,
                        row.headline,
                        row.publication_date,
                        row.author,
                        row.url,
                        row.total_views,
                        row.average_view_duration,
                        row.average_scroll_depth,
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    pub async fn all_insights(&self) -> Result<Vec<InsightRow>> {
        let rows = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, headline, publication_date, author, url,
                              total_views, average_view_duration, average_scroll_depth
                       FROM insights
                       ORDER BY rowid"#,
                )?;
                let rows = stmt
                    .query_map([], insight_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }
}

fn insight_from_row(row: &Row) -> rusqlite::Result<InsightRow> {
    Ok(InsightRow {
        id: row.get(0)?,
        headline: row.get(1)?,
        publication_date: row.get(2)?,
        author: row.get(3)?,
        url: row.get(4)?,
        total_views: row.get(5)?,
        average_view_duration: row.get(6)?,
        average_scroll_depth: row.get(7)?,
    })
}
