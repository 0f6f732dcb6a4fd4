use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::domain::{Category, ExamType, FinancialProfile, IncomeBand, ScoreInput, ScoreType};

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Every request parameter that changes a normalization or prediction result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub exam: ExamType,
    pub score_type: ScoreType,
    score_bits: u64,
    pub category: Category,
    pub state: Option<String>,
    pub year: u16,
    pub income_band: IncomeBand,
}

impl CacheKey {
    pub fn new(input: &ScoreInput, profile: &FinancialProfile) -> Self {
        Self {
            exam: input.exam(),
            score_type: input.score.score_type(),
            score_bits: input.score.value().to_bits(),
            category: input.category,
            state: input.state.as_ref().map(|state| state.to_lowercase()),
            year: input.year,
            income_band: profile.effective_band(),
        }
    }
}

struct CacheEntry<V> {
    value: Arc<V>,
    stored_at: DateTime<Utc>,
}

/// In-process memoization with lazy expiry: stale entries go on read or on the next insert.
///
/// Two callers missing on the same key may both compute; the later write
/// wins.
pub struct ResultCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh cached value, evicting the entry if it has expired.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let now = self.clock.now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if now - entry.stored_at < self.ttl => Some(Arc::clone(&entry.value)),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        match self.try_get_or_compute::<_, std::convert::Infallible>(key, || Ok(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`ResultCache::get_or_compute`], but failures are returned and not cached.
    pub fn try_get_or_compute<F, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            debug!("result cache hit");
            return Ok(value);
        }

        debug!("result cache miss");
        // Computed without holding the lock.
        let value = Arc::new(compute()?);
        let stored_at = self.clock.now();
        let mut entries = self.lock();
        // Inserts sweep every expired entry.
        entries.retain(|_, entry| stored_at - entry.stored_at < self.ttl);
        entries.insert(
            key,
            CacheEntry {
                value: Arc::clone(&value),
                stored_at,
            },
        );
        Ok(value)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        // Entries are replaced whole; a poisoned map still holds consistent data.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
