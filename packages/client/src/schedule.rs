//! A named background thread that runs a job at a fixed rate.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Handle to a running periodic job.
///
/// The first run happens one period after spawning. Stopping never waits:
/// a pending run is cancelled, one already in progress finishes on its own
/// and the thread exits afterwards. Dropping the handle stops the job.
pub struct PeriodicTask {
    name: String,
    stop: Option<Sender<()>>,
}

impl PeriodicTask {
    /// Run `job` every `period` on a thread called `name`, first after one period.
    pub fn spawn<F>(name: impl Into<String>, period: Duration, mut job: F) -> std::io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        let (stop, stopped) = mpsc::channel::<()>();

        thread::Builder::new().name(name.clone()).spawn(move || {
            let mut next_run = Instant::now() + period;
            loop {
                let wait = next_run.saturating_duration_since(Instant::now());
                match stopped.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => {
                        job();
                        // Fixed rate, but never queue up missed runs.
                        next_run = (next_run + period).max(Instant::now());
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })?;

        Ok(Self {
            name,
            stop: Some(stop),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `false` once stopped or once the thread has exited.
    pub fn is_running(&self) -> bool {
        self.stop.is_some()
    }

    /// Cancel future runs. Idempotent.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The thread may already be gone; nothing to cancel then.
            let _ = stop.send(());
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}
