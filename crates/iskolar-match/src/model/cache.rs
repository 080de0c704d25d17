//! Per-scope TTL cache for resolved weight sets.
//!
//! The cache is the only mutable state shared between prediction and
//! training. A single mutex guards the map, so readers always observe the
//! last fully written entry; the retrain coordinator invalidates a scope
//! after persisting its new model.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use super::{ModelScope, ResolvedWeights};

#[derive(Debug, Clone)]
struct CacheEntry {
    resolved: ResolvedWeights,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WeightCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl WeightCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_seconds.max(0)),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, scope: &ModelScope) -> Option<ResolvedWeights> {
        self.get_at(scope, Utc::now())
    }

    pub(crate) fn get_at(&self, scope: &ModelScope, now: DateTime<Utc>) -> Option<ResolvedWeights> {
        let guard = self.entries.lock().expect("weight cache mutex poisoned");
        guard
            .get(&scope.key())
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.resolved.clone())
    }

    pub fn put(&self, scope: &ModelScope, resolved: ResolvedWeights) {
        self.put_at(scope, resolved, Utc::now());
    }

    pub(crate) fn put_at(
        &self,
        scope: &ModelScope,
        resolved: ResolvedWeights,
        now: DateTime<Utc>,
    ) {
        let mut guard = self.entries.lock().expect("weight cache mutex poisoned");
        guard.insert(
            scope.key(),
            CacheEntry {
                resolved,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop cached resolutions affected by a retrain of `scope`. A new
    /// global model changes the fallback for every scholarship, so a global
    /// invalidation clears the whole cache.
    pub fn invalidate(&self, scope: &ModelScope) {
        let mut guard = self.entries.lock().expect("weight cache mutex poisoned");
        match scope {
            ModelScope::Global => guard.clear(),
            scoped => {
                guard.remove(&scoped.key());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::defaults::default_weight_map;
    use crate::model::WeightSource;

    fn resolved() -> ResolvedWeights {
        ResolvedWeights {
            weights: default_weight_map(),
            bias: -1.5,
            source: WeightSource::Defaults,
        }
    }

    #[test]
    fn entries_expire_after_the_ttl() {
        let cache = WeightCache::new(60);
        let scope = ModelScope::Global;
        let now = Utc::now();

        cache.put_at(&scope, resolved(), now);
        assert!(cache.get_at(&scope, now + Duration::seconds(59)).is_some());
        assert!(cache.get_at(&scope, now + Duration::seconds(61)).is_none());
    }

    #[test]
    fn scholarship_invalidation_removes_only_that_scope() {
        let cache = WeightCache::new(600);
        let global = ModelScope::Global;
        let scoped = ModelScope::Scholarship(crate::matching::ScholarshipId(
            "SCH-001".to_string(),
        ));

        cache.put(&global, resolved());
        cache.put(&scoped, resolved());
        cache.invalidate(&scoped);

        assert!(cache.get(&global).is_some());
        assert!(cache.get(&scoped).is_none());
    }

    #[test]
    fn global_invalidation_clears_every_scope() {
        let cache = WeightCache::new(600);
        let scoped = ModelScope::Scholarship(crate::matching::ScholarshipId(
            "SCH-001".to_string(),
        ));

        cache.put(&ModelScope::Global, resolved());
        cache.put(&scoped, resolved());
        cache.invalidate(&ModelScope::Global);

        assert!(cache.get(&ModelScope::Global).is_none());
        assert!(cache.get(&scoped).is_none());
    }
}
