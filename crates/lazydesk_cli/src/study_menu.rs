//! Study advisor submenu.

use crate::input::{invalid_input, prompt, prompt_optional, prompt_or, prompt_parse};
use lazydesk_core::model::study::{NewStudySession, StudyType};
use lazydesk_core::service::curriculum::{NLP_LEARNING_PATH, SUBJECTS};
use lazydesk_core::service::study_service::{
    build_plan, coding_challenge_with_rng, nlp_project_with_rng, quiz_questions_with_rng,
    AdvisorResult,
};
use lazydesk_core::Assistant;

const PROGRESS_DAYS: u32 = 30;

const STUDY_MENU: &str = "\
STUDY ASSISTANT
 1. Get topic suggestion
 2. Track study session
 3. Create study plan
 4. Get coding challenge
 5. Get NLP project idea
 6. Study recommendations
 7. Quiz questions
 8. Study progress
 9. NLP learning path
 0. Back";

pub fn run(assistant: &Assistant) -> AdvisorResult<()> {
    loop {
        println!("\n{STUDY_MENU}");
        let Some(choice) = prompt("Select option: ") else {
            return Ok(());
        };
        match choice.as_str() {
            "0" => return Ok(()),
            "1" => suggest_topic(assistant)?,
            "2" => track_session(assistant)?,
            "3" => create_plan(),
            "4" => coding_challenge(),
            "5" => nlp_project(),
            "6" => recommendations(assistant)?,
            "7" => quiz(),
            "8" => progress(assistant)?,
            "9" => learning_path(),
            other => invalid_input(other),
        }
    }
}

fn subject_prompt() -> String {
    format!("Subject ({}): ", SUBJECTS.join("/"))
}

fn suggest_topic(assistant: &Assistant) -> AdvisorResult<()> {
    let Some(subject) = prompt_or(&subject_prompt(), "nlp") else {
        return Ok(());
    };
    let Some(level) = prompt_or("Level (beginner/intermediate/advanced): ", "beginner") else {
        return Ok(());
    };
    let suggestion =
        assistant.with_services(|services| services.study().suggest_topic(&subject, &level))?;
    match suggestion {
        Some(suggestion) => println!("Suggested topic: {suggestion}"),
        None => println!("No topics found for {subject} at level {level}"),
    }
    Ok(())
}

fn track_session(assistant: &Assistant) -> AdvisorResult<()> {
    let Some(subject) = prompt("Subject: ") else {
        return Ok(());
    };
    let Some(topic) = prompt("Topic: ") else {
        return Ok(());
    };
    let duration = match prompt_parse::<i64>("Duration (minutes): ", "") {
        Some(Ok(minutes)) => minutes,
        Some(Err(raw)) => {
            invalid_input(&raw);
            return Ok(());
        }
        None => return Ok(()),
    };
    let study_type = match prompt_or(
        "Study type (reading/practice/video/coding/nlp): ",
        "reading",
    ) {
        Some(raw) => match StudyType::parse(&raw.to_lowercase()) {
            Some(study_type) => study_type,
            None => {
                invalid_input(&raw);
                return Ok(());
            }
        },
        None => return Ok(()),
    };
    let Some(notes) = prompt_optional("Notes (optional): ") else {
        return Ok(());
    };

    let result = assistant.with_services(|services| {
        let study = services.study();
        let mut session = NewStudySession::new(&subject, &topic, duration, study.today());
        session.study_type = study_type;
        session.notes = notes.clone();
        study.track_session(&session, services.notifications())
    });
    match result {
        Ok(_) => println!("Study session tracked: {topic} ({subject}) for {duration} minutes"),
        Err(err) => println!("Could not track session: {err}"),
    }
    Ok(())
}

fn create_plan() {
    let Some(subject) = prompt_or(&subject_prompt(), "nlp") else {
        return;
    };
    let hours = match prompt_parse::<f64>("Hours per week [5]: ", "5") {
        Some(Ok(hours)) => hours,
        Some(Err(raw)) => return invalid_input(&raw),
        None => return,
    };
    let weeks = match prompt_parse::<u32>("Duration in weeks [4]: ", "4") {
        Some(Ok(weeks)) => weeks,
        Some(Err(raw)) => return invalid_input(&raw),
        None => return,
    };

    let plan = match build_plan(&subject, hours, weeks) {
        Ok(plan) => plan,
        Err(err) => {
            println!("{err}");
            return;
        }
    };
    let Some(plan) = plan else {
        println!("Unknown subject `{subject}`");
        return;
    };

    println!(
        "\n{}-week plan for {} ({}h/week, {}h per topic):",
        plan.duration_weeks,
        plan.subject.to_uppercase(),
        plan.hours_per_week,
        plan.hours_per_topic
    );
    for week in &plan.weekly_schedule {
        let topics: Vec<String> = week
            .topics
            .iter()
            .map(|(topic, level)| format!("{topic} ({level})"))
            .collect();
        let listed = if topics.is_empty() {
            "free study".to_string()
        } else {
            topics.join(", ")
        };
        println!("   Week {}: {} [{}h]", week.week, listed, week.estimated_hours);
    }
}

fn coding_challenge() {
    let Some(level) = prompt_or("Level (beginner/intermediate/advanced): ", "beginner") else {
        return;
    };
    let challenge = coding_challenge_with_rng(&level, &mut rand::thread_rng());
    println!("Coding challenge: {challenge}");
}

fn nlp_project() {
    let Some(level) = prompt_or("Level (beginner/intermediate/advanced): ", "beginner") else {
        return;
    };
    match nlp_project_with_rng(&level, &mut rand::thread_rng()) {
        Some(idea) => {
            println!("\n{}", idea.name);
            println!("   {}", idea.description);
            println!("   Libraries: {}", idea.libraries.join(", "));
            println!("   Difficulty: {}", idea.difficulty);
            println!("   Estimated time: {}", idea.estimated_time);
        }
        None => println!("No project ideas for level {level}"),
    }
}

fn recommendations(assistant: &Assistant) -> AdvisorResult<()> {
    let recommendations =
        assistant.with_services(|services| services.study().study_recommendations())?;
    println!("\nSTUDY RECOMMENDATIONS:");
    for recommendation in recommendations {
        println!("   - {}", recommendation.message);
        println!("     Action: {}", recommendation.action);
    }
    Ok(())
}

fn quiz() {
    let Some(subject) = prompt_or("Subject (nlp/python): ", "nlp") else {
        return;
    };
    let Some(level) = prompt_or("Level (beginner/intermediate): ", "beginner") else {
        return;
    };
    let count = match prompt_parse::<usize>("Number of questions [3]: ", "3") {
        Some(Ok(count)) => count,
        Some(Err(raw)) => return invalid_input(&raw),
        None => return,
    };
    match quiz_questions_with_rng(&subject, &level, count, &mut rand::thread_rng()) {
        Some(questions) => {
            for (index, question) in questions.iter().enumerate() {
                println!("   {}. {}", index + 1, question);
            }
        }
        None => println!("No quiz questions for {subject} at level {level}"),
    }
}

fn progress(assistant: &Assistant) -> AdvisorResult<()> {
    let Some(subject) = prompt_optional("Subject (blank for all): ") else {
        return Ok(());
    };
    let rows = assistant.with_services(|services| {
        services
            .study()
            .study_progress(subject.as_deref(), PROGRESS_DAYS)
    })?;
    println!("\nSTUDY PROGRESS (last {PROGRESS_DAYS} days):");
    if rows.is_empty() {
        println!("   No study sessions recorded");
    }
    for row in rows {
        println!(
            "   - {}: {} sessions, {:.1}h total, {:.0} min average, last {}",
            row.subject,
            row.sessions,
            row.total_minutes as f64 / 60.0,
            row.average_minutes,
            row.last_session
        );
    }
    Ok(())
}

fn learning_path() {
    println!("\nNLP LEARNING PATH:");
    for phase in NLP_LEARNING_PATH {
        println!("\n{}", phase.title);
        println!("   Topics: {}", phase.topics.join(", "));
        println!("   Projects: {}", phase.projects.join(", "));
        println!("   Resources: {}", phase.resources.join(", "));
    }
}
