//! In-memory job history.
//!
//! An ordered, id-de-duplicated collection of known jobs, shared
//! between concurrent conversion pipelines and the presentation layer.
//! Most recently added first. History does not survive a restart; the
//! server's job list is the durable record.

use crate::api::{Job, JobStatus};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

#[derive(Default)]
struct Inner {
    order: VecDeque<String>,
    jobs: HashMap<String, Job>,
}

/// Thread-safe job collection keyed by id.
///
/// All operations take the lock for the duration of one call only;
/// nothing is held across an await point.
#[derive(Default)]
pub struct JobStore {
    inner: RwLock<Inner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job, or refresh the fields of an already-known id in
    /// place (keeping its list position).
    ///
    /// A known id is only refreshed along the legal status edges: a
    /// terminal entry is never overwritten, and a stale snapshot (for
    /// example `pending` arriving after `converting`) is dropped.
    pub fn add_or_update(&self, job: Job) {
        let mut inner = self.inner.write();
        let Inner { order, jobs } = &mut *inner;

        match jobs.entry(job.id.clone()) {
            Entry::Occupied(mut entry) => {
                let current = entry.get().status;
                if current == job.status || current.can_transition_to(job.status) {
                    entry.insert(job);
                } else {
                    tracing::debug!(
                        job_id = %entry.key(),
                        current = %current,
                        incoming = %job.status,
                        "Dropping stale job snapshot"
                    );
                }
            }
            Entry::Vacant(entry) => {
                order.push_front(entry.key().clone());
                entry.insert(job);
            }
        }
    }

    /// Remove a job. Unknown ids are a no-op.
    pub fn remove(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.jobs.remove(id).is_none() {
            return false;
        }
        inner.order.retain(|known| known != id);
        true
    }

    pub fn get(&self, id: &str) -> Option<Job> {
        self.inner.read().jobs.get(id).cloned()
    }

    /// Snapshot of all jobs, most recently added first.
    pub fn jobs(&self) -> Vec<Job> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.jobs.get(id).cloned())
            .collect()
    }

    /// Number of finished jobs, the badge count of the history view.
    pub fn done_count(&self) -> usize {
        self.inner
            .read()
            .jobs
            .values()
            .filter(|job| job.status == JobStatus::Done)
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.read().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job(id: &str, status: JobStatus) -> Job {
        Job {
            id: id.to_string(),
            source: format!("https://example.com/{}.m3u8", id),
            status,
            output_file: None,
            output_url: None,
            error: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_or_update_deduplicates_by_id() {
        let store = JobStore::new();
        store.add_or_update(job("j1", JobStatus::Pending));
        store.add_or_update(job("j1", JobStatus::Pending));

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_or_update_refreshes_known_id() {
        let store = JobStore::new();
        store.add_or_update(job("j1", JobStatus::Pending));
        store.add_or_update(job("j1", JobStatus::Converting));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("j1").unwrap().status, JobStatus::Converting);
    }

    #[test]
    fn test_terminal_entry_never_regresses() {
        let store = JobStore::new();
        let mut done = job("j1", JobStatus::Done);
        done.output_url = Some("/converted/j1.mp4".to_string());
        store.add_or_update(done);

        store.add_or_update(job("j1", JobStatus::Pending));

        let stored = store.get("j1").unwrap();
        assert_eq!(stored.status, JobStatus::Done);
        assert_eq!(stored.output_url.as_deref(), Some("/converted/j1.mp4"));
    }

    #[test]
    fn test_stale_snapshot_dropped() {
        let store = JobStore::new();
        store.add_or_update(job("j1", JobStatus::Converting));
        store.add_or_update(job("j1", JobStatus::Pending));

        assert_eq!(store.get("j1").unwrap().status, JobStatus::Converting);
    }

    #[test]
    fn test_most_recent_first() {
        let store = JobStore::new();
        store.add_or_update(job("j1", JobStatus::Done));
        store.add_or_update(job("j2", JobStatus::Pending));
        store.add_or_update(job("j3", JobStatus::Converting));

        let ids: Vec<String> = store.jobs().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["j3", "j2", "j1"]);
    }

    #[test]
    fn test_refresh_keeps_list_position() {
        let store = JobStore::new();
        store.add_or_update(job("j1", JobStatus::Pending));
        store.add_or_update(job("j2", JobStatus::Pending));
        store.add_or_update(job("j1", JobStatus::Done));

        let ids: Vec<String> = store.jobs().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["j2", "j1"]);
    }

    #[test]
    fn test_remove() {
        let store = JobStore::new();
        store.add_or_update(job("j1", JobStatus::Done));

        assert!(store.remove("j1"));
        assert!(store.is_empty());
        assert!(store.get("j1").is_none());
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let store = JobStore::new();
        store.add_or_update(job("j1", JobStatus::Done));

        assert!(!store.remove("nope"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_done_count() {
        let store = JobStore::new();
        store.add_or_update(job("j1", JobStatus::Done));
        store.add_or_update(job("j2", JobStatus::Converting));
        store.add_or_update(job("j3", JobStatus::Error));

        assert_eq!(store.done_count(), 1);
    }
}
