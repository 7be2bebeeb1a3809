//! First-run sample records.

use crate::model::notification::{kind, NewNotification, Priority};
use crate::model::project::{NewCodingProject, NewNlpTask};
use crate::model::study::{NewLearningResource, NewStudySession, ResourceKind, StudyType};
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::project_repo::{NlpTaskRepository, ProjectRepository};
use crate::repo::resource_repo::ResourceRepository;
use crate::repo::study_repo::StudyRepository;
use crate::service::dashboard_service::DashboardService;
use crate::service::study_service::AdvisorResult;
use log::info;

/// Row counts written by [`seed_sample_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub notifications: usize,
    pub sessions: usize,
    pub resources: usize,
    pub projects: usize,
    pub nlp_tasks: usize,
}

/// Inserts a small demo data set. Sessions are dated today.
///
/// Not idempotent: every call appends another copy.
pub fn seed_sample_data<N, S, P, Q>(
    services: &DashboardService<N, S, P, Q>,
    created_at: i64,
) -> AdvisorResult<SeedSummary>
where
    N: NotificationRepository,
    S: StudyRepository,
    P: ProjectRepository + NlpTaskRepository,
    Q: ResourceRepository,
{
    let mut summary = SeedSummary::default();

    let notifications = [
        (kind::REMINDER, "Study NLP", "Time for daily NLP learning session", Priority::High),
        (kind::EMAIL, "Important Email", "You have 3 unread important emails", Priority::Medium),
        ("coding", "Code Review", "Complete code review for Python project", Priority::Medium),
    ];
    for (notification_kind, title, message, priority) in notifications {
        let notification =
            NewNotification::new(notification_kind, title, Some(message.to_string()), created_at)
                .with_priority(priority);
        services.notifications().create(&notification)?;
        summary.notifications += 1;
    }

    let study = services.study();
    let today = study.today();
    let sessions = [
        ("NLP", "Text Preprocessing", 60, StudyType::Practice),
        ("Python", "Data Structures", 45, StudyType::Coding),
        ("Machine Learning", "Neural Networks", 90, StudyType::Reading),
    ];
    for (subject, topic, minutes, study_type) in sessions {
        let mut session = NewStudySession::new(subject, topic, minutes, today);
        session.study_type = study_type;
        study.log_session(&session)?;
        summary.sessions += 1;
    }

    let mut nltk_book = NewLearningResource::new(
        "Natural Language Processing with Python",
        ResourceKind::Book,
        "nlp",
    );
    nltk_book.url = Some("https://nltk.org/book/".to_string());
    nltk_book.description = Some("Comprehensive NLP guide".to_string());
    let mut crash_course =
        NewLearningResource::new("Python Crash Course", ResourceKind::Book, "coding");
    crash_course.description = Some("Great Python learning resource".to_string());
    for resource in [nltk_book, crash_course] {
        services.resources().insert_resource(&resource)?;
        summary.resources += 1;
    }

    let projects = [
        ("Personal Assistant", "AI-powered personal assistant"),
        ("Text Classifier", "NLP text classification tool"),
    ];
    for (name, description) in projects {
        let mut project = NewCodingProject::new(name, "python");
        project.description = Some(description.to_string());
        services.projects().insert_project(&project)?;
        summary.projects += 1;
    }

    let tasks = [
        ("Sentiment Analysis", "sentiment_analysis", "IMDB Reviews", "BERT"),
        ("Named Entity Recognition", "ner", "CoNLL-2003", "spaCy"),
    ];
    for (name, task_type, dataset, model) in tasks {
        let mut task = NewNlpTask::new(name, task_type);
        task.dataset_name = Some(dataset.to_string());
        task.model_used = Some(model.to_string());
        services.projects().insert_nlp_task(&task)?;
        summary.nlp_tasks += 1;
    }

    info!(
        "event=seed_sample_data module=service status=ok notifications={} sessions={} resources={} projects={} nlp_tasks={}",
        summary.notifications,
        summary.sessions,
        summary.resources,
        summary.projects,
        summary.nlp_tasks
    );
    Ok(summary)
}
