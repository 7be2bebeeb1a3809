//! Learning resource repository contracts and SQLite implementation.

use crate::model::study::{LearningResource, NewLearningResource, ResourceKind};
use crate::model::RecordId;
use crate::repo::{parse_small, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Repository interface for learning resources.
pub trait ResourceRepository {
    fn insert_resource(&self, resource: &NewLearningResource) -> RepoResult<RecordId>;
    /// Lists resources in insertion order, optionally for one subject.
    fn list_resources(&self, subject: Option<&str>) -> RepoResult<Vec<LearningResource>>;
    fn count_resources(&self) -> RepoResult<i64>;
}

/// SQLite-backed learning resource repository.
pub struct SqliteResourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResourceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ResourceRepository for SqliteResourceRepository<'_> {
    fn insert_resource(&self, resource: &NewLearningResource) -> RepoResult<RecordId> {
        resource.validate()?;

        self.conn.execute(
            "INSERT INTO learning_resources (
                title,
                kind,
                subject,
                url,
                description,
                progress_percent,
                rating
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                resource.title.as_str(),
                resource.kind.as_str(),
                resource.subject.as_str(),
                resource.url.as_deref(),
                resource.description.as_deref(),
                resource.progress_percent,
                resource.rating,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_resources(&self, subject: Option<&str>) -> RepoResult<Vec<LearningResource>> {
        let mut sql = String::from(
            "SELECT id, title, kind, subject, url, description, progress_percent, rating
             FROM learning_resources",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(subject) = subject {
            sql.push_str(" WHERE subject = ? COLLATE NOCASE");
            bind_values.push(Value::Text(subject.trim().to_string()));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut resources = Vec::new();
        while let Some(row) = rows.next()? {
            resources.push(parse_resource_row(row)?);
        }
        Ok(resources)
    }

    fn count_resources(&self) -> RepoResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM learning_resources;", [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}

fn parse_resource_row(row: &Row<'_>) -> RepoResult<LearningResource> {
    let kind_text: String = row.get("kind")?;
    let kind = ResourceKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid resource kind `{kind_text}` in learning_resources.kind"
        ))
    })?;
    let progress = parse_small(
        "learning_resources.progress_percent",
        Some(row.get("progress_percent")?),
    )?
    .unwrap_or_default();

    Ok(LearningResource {
        id: row.get("id")?,
        title: row.get("title")?,
        kind,
        subject: row.get("subject")?,
        url: row.get("url")?,
        description: row.get("description")?,
        progress_percent: progress,
        rating: parse_small("learning_resources.rating", row.get("rating")?)?,
    })
}
