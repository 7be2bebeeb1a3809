//! Coding project and NLP task repositories.
//!
//! Both tables track hands-on work and share this module; each keeps its own
//! trait so callers depend only on what they use.

use crate::model::project::{
    CodingProject, NewCodingProject, NewNlpTask, NlpTask, NlpTaskStatus, ProjectStatus,
};
use crate::model::RecordId;
use crate::repo::{parse_date, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Repository interface for coding projects.
pub trait ProjectRepository {
    fn insert_project(&self, project: &NewCodingProject) -> RepoResult<RecordId>;
    fn list_projects(&self, status: Option<ProjectStatus>) -> RepoResult<Vec<CodingProject>>;
    fn count_projects(&self, status: Option<ProjectStatus>) -> RepoResult<i64>;
}

/// Repository interface for NLP tasks.
pub trait NlpTaskRepository {
    fn insert_nlp_task(&self, task: &NewNlpTask) -> RepoResult<RecordId>;
    fn list_nlp_tasks(&self) -> RepoResult<Vec<NlpTask>>;
}

/// SQLite-backed repository for both project tables.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn insert_project(&self, project: &NewCodingProject) -> RepoResult<RecordId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO coding_projects (name, description, language, local_path, status)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.name.as_str(),
                project.description.as_deref(),
                project.language.as_str(),
                project.local_path.as_deref(),
                project.status.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_projects(&self, status: Option<ProjectStatus>) -> RepoResult<Vec<CodingProject>> {
        let mut sql = String::from(
            "SELECT id, name, description, language, local_path, status, created_date
             FROM coding_projects",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(status) = status {
            sql.push_str(" WHERE status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn count_projects(&self, status: Option<ProjectStatus>) -> RepoResult<i64> {
        let count = match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM coding_projects WHERE status = ?1;",
                [status.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM coding_projects;", [], |row| {
                    row.get(0)
                })?,
        };
        Ok(count)
    }
}

impl NlpTaskRepository for SqliteProjectRepository<'_> {
    fn insert_nlp_task(&self, task: &NewNlpTask) -> RepoResult<RecordId> {
        task.validate()?;

        self.conn.execute(
            "INSERT INTO nlp_tasks (task_name, task_type, dataset_name, model_used, status)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                task.task_name.as_str(),
                task.task_type.as_str(),
                task.dataset_name.as_deref(),
                task.model_used.as_deref(),
                task.status.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn list_nlp_tasks(&self) -> RepoResult<Vec<NlpTask>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                task_name,
                task_type,
                dataset_name,
                model_used,
                accuracy_score,
                status,
                created_date,
                completion_date
             FROM nlp_tasks
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_nlp_task_row(row)?);
        }
        Ok(tasks)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<CodingProject> {
    let status_text: String = row.get("status")?;
    let status = ProjectStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid project status `{status_text}` in coding_projects.status"
        ))
    })?;
    let created_text: String = row.get("created_date")?;

    Ok(CodingProject {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        language: row.get("language")?,
        local_path: row.get("local_path")?,
        status,
        created_date: parse_date("coding_projects.created_date", &created_text)?,
    })
}

fn parse_nlp_task_row(row: &Row<'_>) -> RepoResult<NlpTask> {
    let status_text: String = row.get("status")?;
    let status = NlpTaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid nlp task status `{status_text}` in nlp_tasks.status"
        ))
    })?;
    let created_text: String = row.get("created_date")?;
    let completion_date = match row.get::<_, Option<String>>("completion_date")? {
        Some(value) => Some(parse_date("nlp_tasks.completion_date", &value)?),
        None => None,
    };

    Ok(NlpTask {
        id: row.get("id")?,
        task_name: row.get("task_name")?,
        task_type: row.get("task_type")?,
        dataset_name: row.get("dataset_name")?,
        model_used: row.get("model_used")?,
        accuracy_score: row.get("accuracy_score")?,
        status,
        created_date: parse_date("nlp_tasks.created_date", &created_text)?,
        completion_date,
    })
}
