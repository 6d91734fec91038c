use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::StorageError;

/// One async mutex per job id.
///
/// Holding the guard serializes every writer of that job; dropping it
/// releases the job on any exit path. An entry lives only while someone
/// holds or waits on it.
#[derive(Debug)]
pub struct JobLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    timeout: Duration,
}

/// Exclusive hold on one job id.
#[derive(Debug)]
pub struct JobGuard<'a> {
    locks: &'a JobLocks,
    job_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl JobLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub async fn acquire(&self, job_id: &str) -> Result<JobGuard<'_>, StorageError> {
        let lock = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(job_id.to_string())
            .or_default()
            .clone();

        match tokio::time::timeout(self.timeout, lock.lock_owned()).await {
            Ok(guard) => Ok(JobGuard {
                locks: self,
                job_id: job_id.to_string(),
                guard: Some(guard),
            }),
            Err(_) => {
                self.release(job_id);
                Err(StorageError::LockTimeout {
                    job_id: job_id.to_string(),
                    waited: self.timeout,
                })
            }
        }
    }

    /// Number of job ids currently held or waited on.
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Forget `job_id` if the map holds the only handle to its mutex.
    /// Waiters clone the handle under the same map lock, so a count of one
    /// means nobody can be queued on it.
    fn release(&self, job_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(job_id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(job_id);
        }
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so our own handle no longer counts.
        drop(self.guard.take());
        self.locks.release(&self.job_id);
    }
}
