//! # Scheduled Sync
//!
//! Enqueues a fixed list of users on a crontab schedule.
//!
//! The schedule is written as a standard five-field crontab
//! (`minute hour day-of-month month day-of-week`) and evaluated in an IANA
//! timezone. Numeric weekdays follow crontab (`0` and `7` are Sunday); they
//! are rewritten to names so the seconds-first scheduler expression means the
//! same days.
//!
//! ```rust,ignore
//! if let Some(settings) = ScheduleSettings::from_config(&config.schedule)? {
//!     let scheduler = SyncScheduler::start(settings, service.clone()).await?;
//!     // ...
//!     scheduler.shutdown().await?;
//! }
//! ```

use chrono_tz::Tz;
use core_library::Username;
use core_runtime::config::ScheduleConfig;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::error::{CoreError, Result};
use crate::CoreService;

const WEEKDAYS: [&str; 8] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

/// Validated schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSettings {
    /// The crontab as configured
    pub crontab: String,
    /// Seconds-first form handed to the scheduler
    pub expression: String,
    pub timezone: Tz,
    /// Normalized usernames, in configured order
    pub target_users: Vec<String>,
}

impl ScheduleSettings {
    /// Validate the schedule configuration. `Ok(None)` when scheduling is
    /// disabled.
    ///
    /// # Errors
    ///
    /// [`CoreError::Scheduler`] for an expression without five fields or with
    /// an unknown weekday, an unknown timezone, an empty user list or an
    /// invalid username. Out-of-range minutes or hours are caught when the
    /// job is registered in [`SyncScheduler::start`].
    pub fn from_config(config: &ScheduleConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }

        let expression = to_scheduler_expression(&config.expression)?;

        let timezone: Tz = config.timezone.trim().parse().map_err(|_| {
            CoreError::Scheduler(format!("unknown CRON_TIMEZONE '{}'", config.timezone))
        })?;

        if config.target_users.is_empty() {
            return Err(CoreError::Scheduler(
                "CRON_TARGET_USERS must name at least one user".to_string(),
            ));
        }
        let target_users = config
            .target_users
            .iter()
            .map(|raw| {
                Username::parse(raw)
                    .map(String::from)
                    .map_err(|e| CoreError::Scheduler(format!("CRON_TARGET_USERS: {}", e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Self {
            crontab: config.expression.trim().to_string(),
            expression,
            timezone,
            target_users,
        }))
    }
}

/// Convert a five-field crontab to the scheduler's six-field form.
///
/// ```
/// use core_service::to_scheduler_expression;
///
/// assert_eq!(to_scheduler_expression("30 6 * * 1-5").unwrap(), "0 30 6 * * MON-FRI");
/// ```
pub fn to_scheduler_expression(crontab: &str) -> Result<String> {
    let fields: Vec<&str> = crontab.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(CoreError::Scheduler(format!(
            "CRON_SCHEDULE must have 5 fields (minute hour day month weekday), got '{}'",
            crontab
        )));
    }

    let weekday = fields[4]
        .split(',')
        .map(weekday_names)
        .collect::<Result<Vec<_>>>()?
        .join(",");

    Ok(format!(
        "0 {} {} {} {} {}",
        fields[0], fields[1], fields[2], fields[3], weekday
    ))
}

/// Rewrite one comma-separated weekday item, keeping any `/step`.
fn weekday_names(item: &str) -> Result<String> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };
    let with_step = |base: String| match step {
        Some(step) => format!("{}/{}", base, step),
        None => base,
    };

    if range == "*" || range.chars().any(|c| c.is_ascii_alphabetic()) {
        return Ok(item.to_string());
    }

    match range.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (weekday_number(start)?, weekday_number(end)?);
            if end == 7 && start > 0 && step.is_none() {
                // "5-7" runs through Sunday; spell it as "FRI-SAT,SUN".
                if start == 7 {
                    return Ok(WEEKDAYS[0].to_string());
                }
                return Ok(format!("{}-SAT,SUN", WEEKDAYS[start]));
            }
            Ok(with_step(format!(
                "{}-{}",
                WEEKDAYS[start],
                WEEKDAYS[end.min(6)]
            )))
        }
        None => Ok(with_step(WEEKDAYS[weekday_number(range)?].to_string())),
    }
}

fn weekday_number(raw: &str) -> Result<usize> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n <= 7)
        .ok_or_else(|| CoreError::Scheduler(format!("invalid day of week '{}'", raw)))
}

/// Running scheduler; call [`SyncScheduler::shutdown`] on exit.
pub struct SyncScheduler {
    scheduler: JobScheduler,
}

impl SyncScheduler {
    /// Register the sync job and start ticking.
    pub async fn start(settings: ScheduleSettings, service: Arc<CoreService>) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| CoreError::Scheduler(format!("creating scheduler: {}", e)))?;

        let users = settings.target_users.clone();
        let job = Job::new_async_tz(
            settings.expression.as_str(),
            settings.timezone,
            move |_uuid, _scheduler| {
                let service = Arc::clone(&service);
                let users = users.clone();
                Box::pin(async move {
                    info!(usernames = %users.join(", "), "Scheduled TMDb sync triggered");
                    match service.trigger_sync(users).await {
                        Ok(ticket) => info!(job_id = %ticket.job_id, "Scheduled sync queued"),
                        Err(e) => error!(error = %e, "Scheduled sync could not be queued"),
                    }
                })
            },
        )
        .map_err(|e| {
            CoreError::Scheduler(format!("creating job for '{}': {}", settings.crontab, e))
        })?;

        scheduler
            .add(job)
            .await
            .map_err(|e| CoreError::Scheduler(format!("adding job: {}", e)))?;
        scheduler
            .start()
            .await
            .map_err(|e| CoreError::Scheduler(format!("starting scheduler: {}", e)))?;

        info!(
            schedule = %settings.crontab,
            timezone = %settings.timezone,
            users = settings.target_users.len(),
            "Scheduled TMDb sync enabled"
        );

        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| CoreError::Scheduler(format!("stopping scheduler: {}", e)))?;
        info!("Scheduler stopped");
        Ok(())
    }
}
