//! Periodic reclamation of expired session rows

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::repositories::SessionRepository;

/// Owns the recurring job that deletes expired sessions. Expired rows stop
/// validating the moment their expiry passes; the sweep only reclaims the
/// storage they occupy.
#[derive(Clone)]
pub struct SessionSweeper {
    session_repository: SessionRepository,
}

impl SessionSweeper {
    /// Create a new session sweeper
    pub fn new(session_repository: SessionRepository) -> Self {
        Self { session_repository }
    }

    /// Start the sweep on the given cron schedule
    ///
    /// The returned scheduler handle keeps the job alive; shut it down when
    /// the process exits. A failed run is logged and the next tick simply
    /// tries again, since the sweep is idempotent and keeps no state between
    /// runs.
    pub async fn start(&self, schedule: &str) -> Result<JobScheduler> {
        let sweeper = self.clone();

        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_, _| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                match sweeper.session_repository.sweep().await {
                    Ok(removed) => {
                        info!("Session sweep removed {} expired sessions", removed);
                    }
                    Err(e) => {
                        error!("Session sweep failed: {}", e);
                    }
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!("Started session sweep scheduler with schedule: {}", schedule);
        Ok(scheduler)
    }
}
