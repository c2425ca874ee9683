//! Diagnostic observers for bean resolution.
//!
//! The container always emits `tracing` events; observers are the
//! programmatic hook for the same information (tests, metrics, custom
//! reporting). Every observer method has an empty default so implementors
//! only override what they care about.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::TypeKey;
use crate::registry::ProviderConflict;

/// Observer trait for container events.
///
/// Observer calls are made synchronously on the resolving thread. Keep
/// implementations lightweight.
///
/// # Examples
///
/// ```
/// use bean_ioc::{ContainerBuilder, DiError, DiObserver, TypeKey};
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct FailureLog {
///     failures: Mutex<Vec<String>>,
/// }
///
/// impl DiObserver for FailureLog {
///     fn construction_failed(&self, key: &TypeKey, error: &DiError) {
///         self.failures.lock().unwrap().push(format!("{}: {}", key.short_name(), error));
///     }
/// }
///
/// let log = Arc::new(FailureLog::default());
/// let container = ContainerBuilder::new().add_observer(log.clone()).build();
/// # let _ = container;
/// ```
pub trait DiObserver: Send + Sync {
    /// A bean is about to be constructed (singleton cache missed).
    fn resolving(&self, _key: &TypeKey) {}

    /// A bean was constructed and injected.
    fn resolved(&self, _key: &TypeKey, _duration: Duration) {}

    /// Construction failed and the failure was absorbed into "no instance".
    fn construction_failed(&self, _key: &TypeKey, _error: &DiError) {}

    /// A provider registration replaced an existing provider.
    fn provider_conflict(&self, _conflict: &ProviderConflict) {}

    /// A provider method or constructor panicked.
    fn factory_panic(&self, _key: &TypeKey, _message: &str) {}
}

/// Container for registered observers.
///
/// Designed to have minimal overhead when no observers are registered.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self { observers: Vec::new() }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &TypeKey) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &TypeKey, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    pub(crate) fn construction_failed(&self, key: &TypeKey, error: &DiError) {
        for observer in &self.observers {
            observer.construction_failed(key, error);
        }
    }

    pub(crate) fn provider_conflict(&self, conflict: &ProviderConflict) {
        for observer in &self.observers {
            observer.provider_conflict(conflict);
        }
    }

    pub(crate) fn factory_panic(&self, key: &TypeKey, message: &str) {
        for observer in &self.observers {
            observer.factory_panic(key, message);
        }
    }
}

/// Built-in observer that forwards events to `tracing` under a prefix.
///
/// The container already logs at `trace`/`warn`; this observer re-emits
/// resolutions at `info`, which is handy when wiring up an application.
///
/// ```
/// use bean_ioc::{ContainerBuilder, LoggingObserver};
/// use std::sync::Arc;
///
/// let container = ContainerBuilder::new()
///     .add_observer(Arc::new(LoggingObserver::with_prefix("[wiring]")))
///     .build();
/// # let _ = container;
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self { prefix: "[bean-ioc]".to_string() }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolved(&self, key: &TypeKey, duration: Duration) {
        tracing::info!(prefix = %self.prefix, bean = key.display_name(), ?duration, "resolved bean");
    }

    fn construction_failed(&self, key: &TypeKey, error: &DiError) {
        tracing::error!(prefix = %self.prefix, bean = key.display_name(), %error, "bean construction failed");
    }

    fn provider_conflict(&self, conflict: &ProviderConflict) {
        tracing::warn!(prefix = %self.prefix, %conflict, "provider conflict");
    }

    fn factory_panic(&self, key: &TypeKey, message: &str) {
        tracing::error!(prefix = %self.prefix, bean = key.display_name(), panic = message, "factory panicked");
    }
}

/// Observer that counts events.
///
/// ```
/// use bean_ioc::{Bean, BeanDescriptor, ContainerBuilder, MetricsObserver};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Job;
/// impl Bean for Job {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new().constructor(Job::default)
///     }
/// }
///
/// let metrics = Arc::new(MetricsObserver::new());
/// let container = ContainerBuilder::new().add_observer(metrics.clone()).build();
/// container.get_bean::<Job>().unwrap();
/// container.get_bean::<Job>().unwrap();
/// assert_eq!(metrics.resolution_count(), 2);
/// assert_eq!(metrics.failure_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MetricsObserver {
    resolutions: AtomicU64,
    total_resolution_nanos: AtomicU64,
    failures: AtomicU64,
    conflicts: AtomicU64,
    panics: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolution_count(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn conflict_count(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }

    pub fn panic_count(&self) -> u64 {
        self.panics.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_nanos.load(Ordering::Relaxed))
    }

    /// Average construction time, `None` before the first resolution.
    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        Some(self.total_resolution_time() / count as u32)
    }

    pub fn reset(&self) {
        self.resolutions.store(0, Ordering::Relaxed);
        self.total_resolution_nanos.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.conflicts.store(0, Ordering::Relaxed);
        self.panics.store(0, Ordering::Relaxed);
    }
}

impl DiObserver for MetricsObserver {
    fn resolved(&self, _key: &TypeKey, duration: Duration) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn construction_failed(&self, _key: &TypeKey, _error: &DiError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn provider_conflict(&self, _conflict: &ProviderConflict) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    fn factory_panic(&self, _key: &TypeKey, _message: &str) {
        self.panics.fetch_add(1, Ordering::Relaxed);
    }
}
