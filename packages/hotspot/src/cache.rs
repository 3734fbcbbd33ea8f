//! Bounded memoization of hotspot computations.
//!
//! Results are keyed by a [`Fingerprint`] of the request plus a coarse
//! dataset version (total and verified report counts). Edits that leave
//! both counts unchanged are invisible to the fingerprint; callers that
//! make such edits must call [`HotspotCache::invalidate_all`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hotspots_models::Hotspot;
use hotspots_report_models::Report;

use crate::aggregate::AreaFilter;

/// Number of results kept before the oldest insertion is evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Cache key for one hotspot computation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint {
    area: String,
    days_window: i64,
    total_reports: usize,
    verified_reports: usize,
}

impl Fingerprint {
    /// Builds the fingerprint for a request against `reports`.
    #[must_use]
    pub fn new(filter: &AreaFilter, days_window: i64, reports: &[Report]) -> Self {
        Self {
            area: filter.cache_key(),
            days_window,
            total_reports: reports.len(),
            verified_reports: reports.iter().filter(|r| r.is_verified()).count(),
        }
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.area, self.days_window, self.total_reports, self.verified_reports
        )
    }
}

#[derive(Default)]
struct CacheInner {
    entries: BTreeMap<Fingerprint, Arc<[Hotspot]>>,
    insertion_order: VecDeque<Fingerprint>,
}

/// Insertion-ordered, size-bounded hotspot cache.
///
/// One mutex guards lookup, computation and insertion together, so two
/// callers racing on the same fingerprint compute it once.
pub struct HotspotCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl Default for HotspotCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl HotspotCache {
    /// Creates a cache holding at most `capacity` results. A capacity of
    /// `0` disables caching: every call computes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Maximum number of resident results.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether results are retained at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            log::warn!("Hotspot cache mutex was poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Returns the cached result for `fingerprint`, or runs `compute`,
    /// stores its result and returns it.
    pub fn get_or_compute<F>(&self, fingerprint: Fingerprint, compute: F) -> Arc<[Hotspot]>
    where
        F: FnOnce() -> Vec<Hotspot>,
    {
        if !self.is_enabled() {
            return compute().into();
        }

        let mut inner = self.lock();

        if let Some(hit) = inner.entries.get(&fingerprint) {
            log::debug!("Hotspot cache hit for {fingerprint}");
            return Arc::clone(hit);
        }

        log::debug!("Hotspot cache miss for {fingerprint}");
        let computed: Arc<[Hotspot]> = compute().into();

        inner.insertion_order.push_back(fingerprint.clone());
        inner.entries.insert(fingerprint, Arc::clone(&computed));

        while inner.entries.len() > self.capacity {
            let Some(oldest) = inner.insertion_order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            log::debug!("Evicted hotspot cache entry {oldest}");
        }

        computed
    }

    /// Drops every cached result.
    pub fn invalidate_all(&self) {
        let mut inner = self.lock();
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.insertion_order.clear();
        log::debug!("Invalidated {dropped} hotspot cache entries");
    }

    /// Whether a result for `fingerprint` is resident.
    #[must_use]
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.lock().entries.contains_key(fingerprint)
    }

    /// Number of resident results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether no results are resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use hotspots_models::RiskLevel;
    use hotspots_report_models::VerificationStatus;

    use super::*;
    use crate::aggregate::ALL_AREAS;

    fn fingerprint(n: usize) -> Fingerprint {
        Fingerprint {
            area: ALL_AREAS.to_string(),
            days_window: 30,
            total_reports: n,
            verified_reports: n,
        }
    }

    fn hotspot(count: u64) -> Hotspot {
        Hotspot {
            id: format!("h{count}"),
            latitude: 14.6,
            longitude: 121.0,
            incident_count: count,
            risk_level: RiskLevel::from_count(count).unwrap_or(RiskLevel::Low),
            radius_meters: 50.0,
            area: None,
            report_ids: Vec::new(),
        }
    }

    #[test]
    fn hit_skips_compute() {
        let cache = HotspotCache::default();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            vec![hotspot(3)]
        };

        let first = cache.get_or_compute(fingerprint(1), compute);
        let second = cache.get_or_compute(fingerprint(1), || {
            calls.set(calls.get() + 1);
            vec![hotspot(9)]
        });

        assert_eq!(calls.get(), 1);
        assert_eq!(first, second);
        assert_eq!(second[0].incident_count, 3);
    }

    #[test]
    fn evicts_oldest_insertion_past_capacity() {
        let cache = HotspotCache::default();
        for n in 0..=10 {
            cache.get_or_compute(fingerprint(n), Vec::new);
        }

        assert_eq!(cache.len(), 10);
        assert!(!cache.contains(&fingerprint(0)));
        assert!(cache.contains(&fingerprint(1)));
        assert!(cache.contains(&fingerprint(10)));
    }

    #[test]
    fn eviction_ignores_access_order() {
        let cache = HotspotCache::new(2);
        cache.get_or_compute(fingerprint(0), Vec::new);
        cache.get_or_compute(fingerprint(1), Vec::new);
        // A hit on the oldest entry must not protect it.
        cache.get_or_compute(fingerprint(0), Vec::new);
        cache.get_or_compute(fingerprint(2), Vec::new);

        assert!(!cache.contains(&fingerprint(0)));
        assert!(cache.contains(&fingerprint(1)));
        assert!(cache.contains(&fingerprint(2)));
    }

    #[test]
    fn invalidate_all_forces_recompute() {
        let cache = HotspotCache::default();
        let calls = Cell::new(0);

        for _ in 0..2 {
            cache.get_or_compute(fingerprint(1), || {
                calls.set(calls.get() + 1);
                Vec::new()
            });
        }
        cache.invalidate_all();
        assert!(cache.is_empty());

        cache.get_or_compute(fingerprint(1), || {
            calls.set(calls.get() + 1);
            Vec::new()
        });
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn zero_capacity_never_stores() {
        let cache = HotspotCache::new(0);
        let calls = Cell::new(0);

        for _ in 0..3 {
            let result = cache.get_or_compute(fingerprint(1), || {
                calls.set(calls.get() + 1);
                vec![hotspot(2)]
            });
            assert_eq!(result.len(), 1);
        }

        assert!(!cache.is_enabled());
        assert_eq!(calls.get(), 3);
        assert!(cache.is_empty());
    }

    #[test]
    fn fingerprint_tracks_counts_and_normalizes_area() {
        let reports = vec![
            Report {
                id: "a".to_string(),
                latitude: None,
                longitude: None,
                reported_at: None,
                status: VerificationStatus::Verified,
                area: None,
                is_sensitive: false,
            },
            Report {
                id: "b".to_string(),
                latitude: None,
                longitude: None,
                reported_at: None,
                status: VerificationStatus::Pending,
                area: None,
                is_sensitive: false,
            },
        ];

        let upper = Fingerprint::new(&AreaFilter::parse(Some("San Roque")), 7, &reports);
        let lower = Fingerprint::new(&AreaFilter::parse(Some("san roque")), 7, &reports);

        assert_eq!(upper, lower);
        assert_eq!(upper.to_string(), "san roque_7_2_1");
        assert_eq!(
            Fingerprint::new(&AreaFilter::All, 30, &reports[..1]).to_string(),
            "all_30_1_1"
        );
    }

    #[test]
    fn concurrent_callers_compute_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let cache = Arc::new(HotspotCache::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cache.get_or_compute(fingerprint(5), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        vec![hotspot(5)]
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }
}
