use std::sync::Arc;

use crate::config::{ContainerOptions, SingletonPolicy};
use crate::observer::{DiObserver, Observers};

use super::Container;

/// Builder for a [`Container`] with custom options and observers.
///
/// ```
/// use bean_ioc::{ContainerBuilder, MetricsObserver, SingletonPolicy};
/// use std::sync::Arc;
///
/// let container = ContainerBuilder::new()
///     .singleton_policy(SingletonPolicy::FirstWriteWins)
///     .max_depth(64)
///     .add_observer(Arc::new(MetricsObserver::new()))
///     .build();
/// assert_eq!(container.options().max_depth, 64);
/// ```
pub struct ContainerBuilder {
    options: ContainerOptions,
    observers: Observers,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            options: ContainerOptions::default(),
            observers: Observers::new(),
        }
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn singleton_policy(mut self, policy: SingletonPolicy) -> Self {
        self.options.singleton_policy = policy;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    pub fn report_conflicts(mut self, enabled: bool) -> Self {
        self.options.report_conflicts = enabled;
        self
    }

    /// Adds an observer. Observers are called in registration order.
    pub fn add_observer(mut self, observer: Arc<dyn DiObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn build(self) -> Container {
        tracing::debug!(options = ?self.options, observers = self.observers.len(), "building container");
        Container::from_parts(self.options, self.observers)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("options", &self.options)
            .field("observers", &self.observers.len())
            .finish()
    }
}
