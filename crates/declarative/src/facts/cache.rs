//! Memoization of fact observations.
//!
//! Each [`FactKey`] owns a slot guarded by its own mutex. The outer map lock
//! is only held long enough to find or create a slot, so producers for
//! different keys run concurrently while concurrent first accesses to the
//! same key are serialized on the slot.

use crate::error::{Error, Result};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type CachedValue = Arc<dyn Any + Send + Sync>;
type Slot = Arc<Mutex<Option<CachedValue>>>;

/// Identity of a memoized observation: fact name plus its arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FactKey {
    pub name: &'static str,
    pub args: Vec<String>,
}

impl FactKey {
    /// Key for a fact that takes no arguments
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    /// Key for a fact called with arguments
    pub fn with_args<I, S>(name: &'static str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Process-lifetime cache of observations
///
/// No eviction and no TTL: values stay until [`FactCache::invalidate`].
#[derive(Default)]
pub struct FactCache {
    slots: Mutex<HashMap<FactKey, Slot>>,
}

impl FactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, running `observe` on a miss.
    ///
    /// A failing producer leaves the key uncached so the next call retries.
    /// A producer must not read its own key.
    pub fn get_or_observe<T, F>(&self, key: FactKey, observe: F) -> Result<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<T>,
    {
        let name = key.name;
        let slot = self.slot(key);
        let mut value = lock(&slot);

        if let Some(cached) = value.as_ref() {
            log::trace!("fact cache hit: {}", name);
            return cached
                .downcast_ref::<T>()
                .cloned()
                .ok_or(Error::FactType { fact: name });
        }

        log::debug!("fact cache miss: {}", name);
        let observed = observe()?;
        *value = Some(Arc::new(observed.clone()));
        Ok(observed)
    }

    /// Drop every cached value.
    ///
    /// Producers still running keep writing into their detached slots, so
    /// their results are never observed after this call.
    pub fn invalidate(&self) {
        let mut slots = lock(&self.slots);
        if !slots.is_empty() {
            log::debug!("invalidating {} cached facts", slots.len());
        }
        slots.clear();
    }

    /// Number of keys holding a cached value
    pub fn stats(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|s| lock(s).is_some()).count()
    }

    fn slot(&self, key: FactKey) -> Slot {
        Arc::clone(lock(&self.slots).entry(key).or_default())
    }
}

impl std::fmt::Debug for FactCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactCache")
            .field("cached", &self.stats())
            .finish()
    }
}

/// Lock a mutex, recovering the data if a producer panicked while holding it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_producer_runs_once_until_invalidated() {
        let cache = FactCache::new();
        let calls = AtomicUsize::new(0);
        let observe = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("Darwin".to_string())
        };

        for _ in 0..5 {
            let value: String = cache.get_or_observe(FactKey::new("system"), observe).unwrap();
            assert_eq!(value, "Darwin");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate();
        for _ in 0..3 {
            let _: String = cache.get_or_observe(FactKey::new("system"), observe).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cached_value_survives_changed_source() {
        let cache = FactCache::new();
        let source = Mutex::new("1.0".to_string());
        let read = || Ok(source.lock().unwrap().clone());

        let first: String = cache.get_or_observe(FactKey::new("version"), read).unwrap();
        *source.lock().unwrap() = "2.0".to_string();
        let second: String = cache.get_or_observe(FactKey::new("version"), read).unwrap();

        assert_eq!(first, "1.0");
        assert_eq!(second, "1.0");
    }

    #[test]
    fn test_arguments_are_part_of_the_key() {
        let cache = FactCache::new();
        let calls = AtomicUsize::new(0);
        let exists = |name: &str| {
            let name = name.to_string();
            cache.get_or_observe(FactKey::with_args("command_exists", [name.clone()]), || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(name == "brew")
            })
        };

        assert!(exists("brew").unwrap());
        assert!(!exists("apt-get").unwrap());
        assert!(exists("brew").unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats(), 2);
    }

    #[test]
    fn test_failures_are_not_memoized() {
        let cache = FactCache::new();
        let calls = AtomicUsize::new(0);
        let flaky = || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::probe("release", "uname not found"))
            } else {
                Ok("23.1.0".to_string())
            }
        };

        let first: Result<String> = cache.get_or_observe(FactKey::new("release"), flaky);
        assert!(first.is_err());
        assert_eq!(cache.stats(), 0);

        let second: String = cache.get_or_observe(FactKey::new("release"), flaky).unwrap();
        assert_eq!(second, "23.1.0");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_empty_cache() {
        let cache = FactCache::new();
        cache.invalidate();
        cache.invalidate();
        assert_eq!(cache.stats(), 0);
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let cache = FactCache::new();
        let _: String = cache
            .get_or_observe(FactKey::new("arch"), || Ok("x86_64".to_string()))
            .unwrap();
        let wrong: Result<bool> = cache.get_or_observe(FactKey::new("arch"), || Ok(true));
        assert!(matches!(wrong, Err(Error::FactType { fact: "arch" })));
    }

    #[test]
    fn test_concurrent_first_access_observes_once() {
        const READERS: usize = 16;

        let cache = &FactCache::new();
        let calls = &AtomicUsize::new(0);
        let barrier = &Barrier::new(READERS);

        let values: Vec<String> = thread::scope(|s| {
            let handles: Vec<_> = (0..READERS)
                .map(|_| {
                    s.spawn(move || {
                        barrier.wait();
                        cache
                            .get_or_observe(FactKey::new("system"), || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                thread::sleep(Duration::from_millis(20));
                                Ok("Linux".to_string())
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(values.len(), READERS);
        assert!(values.iter().all(|v| v == "Linux"));
    }

    #[test]
    fn test_distinct_keys_do_not_serialize() {
        let cache = FactCache::new();
        let barrier = Barrier::new(2);

        // Both producers wait on the same barrier; this only completes if
        // neither key blocks the other while its producer runs.
        thread::scope(|s| {
            for name in ["release", "version"] {
                let cache = &cache;
                let barrier = &barrier;
                s.spawn(move || {
                    let _: String = cache
                        .get_or_observe(FactKey::new(name), || {
                            barrier.wait();
                            Ok(name.to_string())
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(cache.stats(), 2);
    }
}
