//! Read-side seam to the external report store.
//!
//! The engine never subscribes to report changes. Each computation pulls
//! one snapshot through [`ReportStore::snapshot`] and works on that copy,
//! so concurrent writes to the store cannot tear a computation.

use std::sync::{Arc, PoisonError, RwLock};

use hotspots_report_models::Report;

/// Source of report snapshots.
pub trait ReportStore: Send + Sync {
    /// Returns the current report collection. Ordering is unspecified.
    fn snapshot(&self) -> Vec<Report>;
}

impl ReportStore for Vec<Report> {
    fn snapshot(&self) -> Vec<Report> {
        self.clone()
    }
}

/// A store whose contents the embedding application replaces on refresh.
impl ReportStore for RwLock<Vec<Report>> {
    fn snapshot(&self) -> Vec<Report> {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: ReportStore + ?Sized> ReportStore for Arc<T> {
    fn snapshot(&self) -> Vec<Report> {
        (**self).snapshot()
    }
}

#[cfg(test)]
mod tests {
    use hotspots_report_models::VerificationStatus;

    use super::*;

    fn report(id: &str) -> Report {
        Report {
            id: id.to_string(),
            latitude: Some(14.6),
            longitude: Some(121.0),
            reported_at: None,
            status: VerificationStatus::Pending,
            area: None,
            is_sensitive: false,
        }
    }

    #[test]
    fn rwlock_snapshot_is_detached_from_later_writes() {
        let store = RwLock::new(vec![report("a")]);
        let before = store.snapshot();

        store.write().unwrap().push(report("b"));

        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn arc_dyn_store_delegates() {
        let store: Arc<dyn ReportStore> = Arc::new(vec![report("a"), report("b")]);
        let ids: Vec<String> = store.snapshot().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
