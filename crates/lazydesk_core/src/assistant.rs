//! Process-level wiring of storage, mailbox, services and scheduled jobs.
//!
//! # Responsibility
//! - Own the configuration, database gateway, clock and mailbox poller.
//! - Open one connection per operation and hand it to the services.
//! - Register the default job table on an [`Orchestrator`].
//!
//! # Invariants
//! - `Assistant` clones share the poller; everything else is stateless, so
//!   the console thread and the scheduler thread each hold a clone.

use crate::clock::SharedClock;
use crate::config::AssistantConfig;
use crate::db::{DbError, Gateway};
use crate::export::{export_progress, ExportResult};
use crate::mailbox::{MailboxClient, MailboxPoller};
use crate::scheduler::{JobError, Orchestrator, Trigger};
use crate::service::dashboard_service::{sqlite_dashboard, SqliteDashboard};
use crate::service::notification_service::PriorityRules;
use crate::service::study_service::AdvisorResult;
use log::info;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mailbox transport shared between threads.
pub type BoxedMailboxClient = Box<dyn MailboxClient + Send>;

#[derive(Clone)]
pub struct Assistant {
    config: Arc<AssistantConfig>,
    gateway: Gateway,
    clock: SharedClock,
    rules: PriorityRules,
    poller: Arc<Mutex<MailboxPoller<BoxedMailboxClient>>>,
}

impl Assistant {
    pub fn new(
        config: AssistantConfig,
        gateway: Gateway,
        clock: SharedClock,
        client: BoxedMailboxClient,
    ) -> Self {
        let rules = PriorityRules::from_config(&config);
        let poller = MailboxPoller::new(client, gateway.clone(), clock.clone());
        Self {
            config: Arc::new(config),
            gateway,
            clock,
            rules,
            poller: Arc::new(Mutex::new(poller)),
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Runs `operation` against services bound to a fresh connection.
    pub fn with_services<T, E, F>(&self, operation: F) -> Result<T, E>
    where
        E: From<DbError>,
        F: FnOnce(&SqliteDashboard<'_>) -> Result<T, E>,
    {
        let conn = self.gateway.connect()?;
        let services = sqlite_dashboard(&conn, self.clock.clone(), self.rules.clone());
        operation(&services)
    }

    /// Polls the mailbox and posts notifications for what it returned.
    /// Returns the number of emails fetched.
    pub fn check_emails(&self) -> AdvisorResult<usize> {
        let emails = {
            let mut poller = self
                .poller
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            poller.fetch_recent(self.config.email_max_results, &self.config.email_query)
        };
        if emails.is_empty() {
            return Ok(0);
        }

        self.with_services(|services| {
            services.notifications().notify_emails(&emails)?;
            Ok(emails.len())
        })
    }

    /// Goal-gated study reminder.
    pub fn study_reminder(&self) -> AdvisorResult<Option<i64>> {
        let goal = self.config.daily_study_goal_minutes;
        self.with_services(|services| services.goal_reminder(goal))
    }

    pub fn daily_summary(&self) -> AdvisorResult<i64> {
        self.with_services(|services| services.daily_summary())
    }

    /// Writes the export set into the configured export directory.
    pub fn export(&self) -> ExportResult<PathBuf> {
        let now = self.clock.now();
        let dir = self.config.export_dir.clone();
        self.with_services(|services| export_progress(services, &dir, now))
    }

    /// Builds the default job table.
    pub fn orchestrator(&self) -> Orchestrator<SharedClock> {
        let mut orchestrator = Orchestrator::new(self.clock.clone());

        let interval =
            Duration::from_secs(self.config.email_check_interval_minutes.saturating_mul(60));
        let assistant = self.clone();
        orchestrator.add_job("email_check", Trigger::Every(interval), move || {
            assistant.check_emails().map(|_| ()).map_err(JobError::from)
        });

        for at in &self.config.study_reminder_times {
            let assistant = self.clone();
            orchestrator.add_job(
                format!("study_reminder_{}", at.format("%H%M")),
                Trigger::DailyAt(*at),
                move || assistant.study_reminder().map(|_| ()).map_err(JobError::from),
            );
        }

        let assistant = self.clone();
        orchestrator.add_job(
            "daily_summary",
            Trigger::DailyAt(self.config.daily_summary_time),
            move || assistant.daily_summary().map(|_| ()).map_err(JobError::from),
        );

        info!(
            "event=scheduler_setup module=assistant status=ok jobs={}",
            orchestrator.schedule().len()
        );
        orchestrator
    }
}
