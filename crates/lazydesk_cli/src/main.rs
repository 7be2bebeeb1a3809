//! LazyDesk console entry point.
//!
//! # Responsibility
//! - Load `lazydesk.json` from the working directory and start logging.
//! - Run the job orchestrator on a background thread.
//! - Drive the numbered menu loop over [`Assistant`].

mod input;
mod study_menu;

use input::{invalid_input, prompt, prompt_optional, prompt_or};
use lazydesk_core::config::CONFIG_FILE_NAME;
use lazydesk_core::model::project::{NewCodingProject, NewNlpTask};
use lazydesk_core::repo::project_repo::{NlpTaskRepository, ProjectRepository};
use lazydesk_core::scheduler::DEFAULT_TICK;
use lazydesk_core::service::sample_data::seed_sample_data;
use lazydesk_core::service::study_service::AdvisorResult;
use lazydesk_core::{
    default_log_level, init_logging_at, AdvisorError, Assistant, AssistantConfig, Clock,
    Gateway, GmailClient, SharedClock, SystemClock,
};
use log::{error, info};
use std::path::Path;
use std::sync::Arc;

const MAIN_MENU: &str = "\
PERSONAL ASSISTANT
 1. Check emails now
 2. Study assistant
 3. View notifications
 4. Mark notifications as read
 5. Coding projects
 6. NLP tasks
 7. Detailed progress report
 8. Export data
 9. Load sample data
 0. Exit";

fn main() {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("cannot resolve working directory: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = run(&cwd) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cwd: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AssistantConfig::load_or_default(cwd.join(CONFIG_FILE_NAME))?;
    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Err(err) = init_logging_at(&level, cwd, &config.log_dir) {
        eprintln!("logging disabled: {err}");
    }

    let gateway = Gateway::open(cwd.join(&config.database_path))?;
    let clock: SharedClock = Arc::new(SystemClock);
    let client = GmailClient::from_config(&config, clock.clone());
    let assistant = Assistant::new(config, gateway, clock, Box::new(client));

    let mut orchestrator = assistant.orchestrator();
    for (name, next_run) in orchestrator.schedule() {
        info!("event=job_scheduled module=cli status=ok job={name} next_run={next_run}");
    }
    std::thread::Builder::new()
        .name("lazydesk-scheduler".to_string())
        .spawn(move || {
            orchestrator.run(DEFAULT_TICK);
        })?;

    info!("event=startup module=cli status=ok version={}", lazydesk_core::core_version());
    menu_loop(&assistant);
    info!("event=shutdown module=cli status=ok");
    Ok(())
}

fn menu_loop(assistant: &Assistant) {
    loop {
        match assistant.with_services(|services| services.collect()) {
            Ok(dashboard) => println!("\n{dashboard}"),
            Err(err) => println!("\nDashboard unavailable: {err}"),
        }
        println!("{MAIN_MENU}");

        let Some(choice) = prompt("Select option: ") else {
            println!();
            return;
        };
        let outcome = match choice.as_str() {
            "0" => {
                println!("Goodbye!");
                return;
            }
            "1" => check_emails(assistant),
            "2" => study_menu::run(assistant),
            "3" => show_notifications(assistant),
            "4" => mark_read(assistant),
            "5" => projects(assistant),
            "6" => nlp_tasks(assistant),
            "7" => progress_report(assistant),
            "8" => export(assistant),
            "9" => load_sample_data(assistant),
            other => {
                invalid_input(other);
                Ok(())
            }
        };
        if let Err(err) = outcome {
            error!("event=menu_action module=cli status=error choice={choice} error={err}");
            println!("Error: {err}");
        }
    }
}

fn check_emails(assistant: &Assistant) -> AdvisorResult<()> {
    println!("Checking emails...");
    let fetched = assistant.check_emails()?;
    println!("{fetched} email(s) processed");
    Ok(())
}

fn show_notifications(assistant: &Assistant) -> AdvisorResult<()> {
    let pending = assistant.with_services(|services| {
        services.notifications().pending().map_err(AdvisorError::from)
    })?;
    println!("\nPENDING NOTIFICATIONS ({}):", pending.len());
    for notification in pending {
        let action = if notification.action_required {
            " [action]"
        } else {
            ""
        };
        println!(
            "   #{} [{}] {}{}",
            notification.id, notification.priority, notification.title, action
        );
        if let Some(message) = notification.message.as_deref() {
            println!("        {message}");
        }
    }
    Ok(())
}

fn mark_read(assistant: &Assistant) -> AdvisorResult<()> {
    let Some(target) = prompt("Notification id (or `all`): ") else {
        return Ok(());
    };
    if target.eq_ignore_ascii_case("all") {
        let updated = assistant.with_services(|services| {
            services.notifications().mark_all_read().map_err(AdvisorError::from)
        })?;
        println!("{updated} notification(s) marked as read");
        return Ok(());
    }
    let Ok(id) = target.parse::<i64>() else {
        invalid_input(&target);
        return Ok(());
    };
    assistant.with_services(|services| {
        services.notifications().mark_read(id).map_err(AdvisorError::from)
    })?;
    println!("Notification #{id} marked as read");
    Ok(())
}

fn projects(assistant: &Assistant) -> AdvisorResult<()> {
    let listed = assistant.with_services(|services| {
        services.projects().list_projects(None).map_err(AdvisorError::from)
    })?;
    println!("\nCODING PROJECTS:");
    if listed.is_empty() {
        println!("   No projects yet");
    }
    for project in &listed {
        println!(
            "   #{} {} ({}, {})",
            project.id,
            project.name,
            project.language,
            project.status.as_str()
        );
    }

    let Some(action) = prompt("a = add project, r = coding reminder, blank = back: ") else {
        return Ok(());
    };
    match action.as_str() {
        "" => Ok(()),
        "a" => {
            let Some(name) = prompt("Project name: ") else {
                return Ok(());
            };
            let Some(language) = prompt_or("Language [python]: ", "python") else {
                return Ok(());
            };
            let Some(description) = prompt_optional("Description (optional): ") else {
                return Ok(());
            };
            let mut project = NewCodingProject::new(name, language);
            project.description = description;
            let id = assistant.with_services(|services| {
                services.projects().insert_project(&project).map_err(AdvisorError::from)
            })?;
            println!("Project #{id} added");
            Ok(())
        }
        "r" => {
            let Some(name) = prompt("Project name: ") else {
                return Ok(());
            };
            assistant.with_services(|services| {
                services.notifications().coding_reminder(&name).map_err(AdvisorError::from)
            })?;
            println!("Reminder created for {name}");
            Ok(())
        }
        other => {
            invalid_input(other);
            Ok(())
        }
    }
}

fn nlp_tasks(assistant: &Assistant) -> AdvisorResult<()> {
    let listed = assistant.with_services(|services| {
        services.projects().list_nlp_tasks().map_err(AdvisorError::from)
    })?;
    println!("\nNLP TASKS:");
    if listed.is_empty() {
        println!("   No NLP tasks yet");
    }
    for task in &listed {
        println!(
            "   #{} {} [{}] dataset={} model={} ({})",
            task.id,
            task.task_name,
            task.task_type,
            task.dataset_name.as_deref().unwrap_or("-"),
            task.model_used.as_deref().unwrap_or("-"),
            task.status.as_str()
        );
    }

    let Some(action) = prompt("a = add task, blank = back: ") else {
        return Ok(());
    };
    match action.as_str() {
        "" => Ok(()),
        "a" => {
            let Some(name) = prompt("Task name: ") else {
                return Ok(());
            };
            let default_type = "text_classification";
            let Some(task_type) = prompt_or("Task type [text_classification]: ", default_type) else {
                return Ok(());
            };
            let Some(dataset) = prompt_optional("Dataset (optional): ") else {
                return Ok(());
            };
            let Some(model) = prompt_optional("Model (optional): ") else {
                return Ok(());
            };
            let mut task = NewNlpTask::new(name, task_type);
            task.dataset_name = dataset;
            task.model_used = model;
            let id = assistant.with_services(|services| {
                services.projects().insert_nlp_task(&task).map_err(AdvisorError::from)
            })?;
            println!("NLP task #{id} added");
            Ok(())
        }
        other => {
            invalid_input(other);
            Ok(())
        }
    }
}

fn progress_report(assistant: &Assistant) -> AdvisorResult<()> {
    let (rows, recommendations, minutes_today) = assistant.with_services(|services| {
        let study = services.study();
        Ok::<_, AdvisorError>((
            study.study_progress(None, 14)?,
            study.study_recommendations()?,
            study.minutes_today()?,
        ))
    })?;
    let goal = assistant.config().daily_study_goal_minutes;

    println!("\nPROGRESS REPORT (last 14 days):");
    println!("   Today: {minutes_today}/{goal} minutes");
    for row in &rows {
        println!(
            "   - {}: {} sessions, {:.1}h, last studied {}",
            row.subject,
            row.sessions,
            row.total_minutes as f64 / 60.0,
            row.last_session
        );
    }
    println!("\nRECOMMENDATIONS:");
    for recommendation in &recommendations {
        println!("   - {} ({})", recommendation.message, recommendation.action);
    }
    Ok(())
}

fn export(assistant: &Assistant) -> AdvisorResult<()> {
    match assistant.export() {
        Ok(dir) => println!("Data exported to {}", dir.display()),
        Err(err) => {
            error!("event=export module=cli status=error error={err}");
            println!("Export failed: {err}");
        }
    }
    Ok(())
}

fn load_sample_data(assistant: &Assistant) -> AdvisorResult<()> {
    let created_at = assistant.clock().now_ms();
    let summary = assistant.with_services(|services| seed_sample_data(services, created_at))?;
    println!(
        "Sample data loaded: {} notifications, {} sessions, {} resources, {} projects, {} NLP tasks",
        summary.notifications,
        summary.sessions,
        summary.resources,
        summary.projects,
        summary.nlp_tasks
    );
    Ok(())
}
