//! Line ingestion - bounded fan-out of JSON lines onto blocking workers
//!
//! At most `max_in_flight` lines are being handled at once; reading stops
//! until a worker frees a permit. Finished tasks are reaped as the loop goes,
//! so the task set never outgrows the in-flight bound for long.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Counters for one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Non-empty lines handed to the handler
    pub lines: u64,
    /// Handler tasks that panicked or were cancelled
    pub failed_tasks: u64,
}

impl IngestStats {
    fn reap(&mut self, joined: Result<(), JoinError>) {
        if let Err(e) = joined {
            self.failed_tasks += 1;
            tracing::error!(error = %e, "Request task failed");
        }
    }
}

/// Feed every non-empty line of `reader` to `handler` on the blocking pool
pub async fn run_lines<R, F>(reader: R, max_in_flight: usize, handler: Arc<F>) -> io::Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
    F: Fn(String) + Send + Sync + 'static,
{
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks = JoinSet::new();
    let mut stats = IngestStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        while let Some(joined) = tasks.try_join_next() {
            stats.reap(joined);
        }

        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        let handler = handler.clone();
        tasks.spawn_blocking(move || {
            let _permit = permit;
            handler(line);
        });
        stats.lines += 1;
    }

    while let Some(joined) = tasks.join_next().await {
        stats.reap(joined);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::io::BufReader;

    fn input(n: usize) -> String {
        (0..n).map(|i| format!("{{\"line\":{}}}\n", i)).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_work_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        let handler = {
            let (active, peak, done) = (active.clone(), peak.clone(), done.clone());
            Arc::new(move |_line: String| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(2));
                active.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
            })
        };

        let data = input(60);
        let stats = run_lines(BufReader::new(data.as_bytes()), 3, handler).await.unwrap();

        assert_eq!(stats.lines, 60);
        assert_eq!(stats.failed_tasks, 0);
        assert_eq!(done.load(Ordering::SeqCst), 60);
        assert!(peak.load(Ordering::SeqCst) <= 3, "peak {}", peak.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_blank_lines_skipped() {
        let seen = Arc::new(AtomicUsize::new(0));
        let handler = {
            let seen = seen.clone();
            Arc::new(move |_line: String| {
                seen.fetch_add(1, Ordering::SeqCst);
            })
        };

        let data = "{}\n\n   \n{}\n";
        let stats = run_lines(BufReader::new(data.as_bytes()), 2, handler).await.unwrap();

        assert_eq!(stats.lines, 2);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_handler_is_reaped_and_loop_continues() {
        let ok = Arc::new(AtomicUsize::new(0));
        let handler = {
            let ok = ok.clone();
            Arc::new(move |line: String| {
                if line.contains("boom") {
                    panic!("handler failure");
                }
                ok.fetch_add(1, Ordering::SeqCst);
            })
        };

        let data = "{\"a\":1}\nboom\n{\"a\":2}\n{\"a\":3}\n";
        let stats = run_lines(BufReader::new(data.as_bytes()), 1, handler).await.unwrap();

        assert_eq!(stats.lines, 4);
        assert_eq!(stats.failed_tasks, 1);
        assert_eq!(ok.load(Ordering::SeqCst), 3);
    }
}
