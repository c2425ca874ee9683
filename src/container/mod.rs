//! The bean container.
//!
//! [`Container`] owns the type registry, the singleton cache, the observers
//! and the options. Resolution runs inline on the caller's thread; the
//! per-thread resolution stack guards against circular dependencies.

use std::any::type_name;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::args::{Arg, Args};
use crate::config::ContainerOptions;
use crate::descriptors::{Bean, BeanDescriptor, Constructor};
use crate::error::{DiError, DiResult};
use crate::internal::{current_chain, StackGuard};
use crate::key::{key_of_type, TypeKey};
use crate::observer::Observers;
use crate::registration::BeanConfig;
use crate::registry::{panic_message, Provider, ProviderConflict, TypeRegistry};
use crate::singletons::{AnyArc, SingletonCache};

mod builder;
pub mod global;

pub use builder::ContainerBuilder;

/// Inversion-of-control container.
///
/// Cloning is cheap and shares all state.
///
/// # Examples
///
/// ```
/// use bean_ioc::{args, Bean, BeanConfig, BeanDescriptor, ConfigDescriptor, Container, Inject};
/// use std::sync::Arc;
///
/// struct Database {
///     url: String,
/// }
/// impl Bean for Database {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new().singleton()
///     }
/// }
///
/// struct DatabaseConfig;
/// impl BeanConfig for DatabaseConfig {
///     fn providers() -> ConfigDescriptor<Self> {
///         ConfigDescriptor::new()
///             .provider("database", |_: &DatabaseConfig| Database { url: "postgres://localhost".into() })
///     }
/// }
///
/// #[derive(Default)]
/// struct UserService {
///     db: Inject<Database>,
///     page_size: usize,
/// }
/// impl Bean for UserService {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new()
///             .constructor(UserService::default)
///             .constructor1(|page_size: usize| UserService { page_size, ..Default::default() })
///             .inject("db", |s: &mut UserService| &mut s.db)
///     }
/// }
///
/// let container = Container::new();
/// container.register_bean_config(Arc::new(DatabaseConfig));
///
/// let users = container.get_bean::<UserService>().unwrap();
/// assert_eq!(users.db.url, "postgres://localhost");
///
/// let paged = container.get_bean_with::<UserService>(args![50usize]).unwrap();
/// assert_eq!(paged.page_size, 50);
/// assert!(Arc::ptr_eq(users.db.get().unwrap(), paged.db.get().unwrap()));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    registry: TypeRegistry,
    singletons: SingletonCache,
    observers: Observers,
    options: ContainerOptions,
}

impl Container {
    /// A container with default options and no observers.
    pub fn new() -> Self {
        ContainerBuilder::new().build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn from_parts(options: ContainerOptions, observers: Observers) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry: TypeRegistry::new(),
                singletons: SingletonCache::new(),
                observers,
                options,
            }),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    pub fn singletons(&self) -> &SingletonCache {
        &self.inner.singletons
    }

    /// Types mid-resolution on the calling thread, first-pushed first.
    ///
    /// Empty outside of a resolution.
    pub fn resolution_chain() -> Vec<TypeKey> {
        current_chain()
    }

    // ===== Resolution =====

    /// Resolves `T` with no constructor arguments.
    ///
    /// A cached singleton is returned as is. Otherwise the bean is built from
    /// its registered provider, or from its public no-argument constructor,
    /// then its injection points are resolved recursively.
    ///
    /// # Errors
    ///
    /// - [`DiError::Circular`] when `T` is already being resolved on this thread
    /// - [`DiError::DepthExceeded`] past [`ContainerOptions::max_depth`]
    /// - [`DiError::NullResult`] when no instance could be produced
    pub fn get_bean<T: Bean>(&self) -> DiResult<Arc<T>> {
        self.resolve(Args::new())
    }

    /// Resolves `T` through the public constructor whose parameter types
    /// exactly match the runtime types of `args`.
    ///
    /// Providers are not consulted when `args` is non-empty. A cached
    /// singleton still short-circuits the call.
    pub fn get_bean_with<T: Bean>(&self, args: Args) -> DiResult<Arc<T>> {
        self.resolve(args)
    }

    /// Whether `T` has a cached singleton instance.
    pub fn contains_singleton<T: Bean>(&self) -> bool {
        self.inner.singletons.contains_key(&key_of_type::<T>())
    }

    fn resolve<T: Bean>(&self, args: Args) -> DiResult<Arc<T>> {
        let key = key_of_type::<T>();

        // Fast path: cached singleton, no stack involvement
        if let Some(cached) = self.inner.singletons.get(&key) {
            return downcast_arc::<T>(cached, key);
        }

        match self.create_bean::<T>(key, args)? {
            Some(bean) => Ok(bean),
            None => Err(DiError::NullResult(key.display_name())),
        }
    }

    /// Builds one bean inside a resolution stack frame.
    ///
    /// `Ok(None)` means construction failed and was reported; only stack
    /// violations come back as `Err`.
    fn create_bean<T: Bean>(&self, key: TypeKey, args: Args) -> DiResult<Option<Arc<T>>> {
        let _frame = StackGuard::push(key, self.inner.options.max_depth)?;

        let start = Instant::now();
        tracing::trace!(bean = key.display_name(), args = args.len(), "resolving bean");
        if self.inner.observers.has_observers() {
            self.inner.observers.resolving(&key);
        }

        match self.build_bean::<T>(key, args) {
            Ok(bean) => {
                let duration = start.elapsed();
                tracing::trace!(bean = key.display_name(), ?duration, "resolved bean");
                self.inner.observers.resolved(&key, duration);
                Ok(Some(bean))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::warn!(bean = key.display_name(), error = %err, "bean construction failed");
                self.inner.observers.construction_failed(&key, &err);
                Ok(None)
            }
        }
    }

    fn build_bean<T: Bean>(&self, key: TypeKey, args: Args) -> DiResult<Arc<T>> {
        let descriptor = T::descriptor();
        let mut instance = self.instantiate(&descriptor, key, args)?;

        for point in descriptor.injection_points() {
            point.inject(self, &mut instance)?;
        }

        let bean = Arc::new(instance);
        if descriptor.get_lifetime().is_singleton() {
            let policy = self.inner.options.singleton_policy;
            let stored = self.inner.singletons.put(key, bean.clone(), policy);
            tracing::debug!(bean = key.display_name(), ?policy, "stored singleton");
            return downcast_arc::<T>(stored, key);
        }
        Ok(bean)
    }

    fn instantiate<T: Bean>(
        &self,
        descriptor: &BeanDescriptor<T>,
        key: TypeKey,
        args: Args,
    ) -> DiResult<T> {
        let bean = key.display_name();

        if args.is_empty() {
            if let Some(provider) = self.inner.registry.lookup(&key) {
                return self.invoke_provider::<T>(&provider);
            }
            return match descriptor.no_arg_constructor() {
                Some(ctor) if ctor.is_accessible() => self.invoke_constructor(key, ctor, Vec::new()),
                Some(_) => Err(DiError::InaccessibleConstructor(bean)),
                None => Err(DiError::MissingConstructor { bean, params: Vec::new() }),
            };
        }

        let signature = args.signature();
        match descriptor.find_constructor(&signature) {
            Some(ctor) => self.invoke_constructor(key, ctor, args.into_vec()),
            None => Err(DiError::MissingConstructor {
                bean,
                params: signature.iter().map(TypeKey::display_name).collect(),
            }),
        }
    }

    fn invoke_constructor<T: Bean>(
        &self,
        key: TypeKey,
        ctor: &Constructor<T>,
        args: Vec<Arg>,
    ) -> DiResult<T> {
        match catch_unwind(AssertUnwindSafe(|| ctor.invoke(args))) {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(err)) => Err(DiError::ConstructorFailed {
                bean: key.display_name(),
                reason: err.to_string(),
            }),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                self.inner.observers.factory_panic(&key, &message);
                Err(DiError::ConstructorFailed { bean: key.display_name(), reason: message })
            }
        }
    }

    fn invoke_provider<T: Bean>(&self, provider: &Provider) -> DiResult<T> {
        let key = provider.returns();
        match provider.invoke() {
            Ok(value) => value
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| DiError::TypeMismatch(type_name::<T>())),
            Err(failure) => {
                if failure.panicked {
                    self.inner.observers.factory_panic(&key, &failure.reason);
                }
                Err(DiError::ProviderFailed {
                    bean: key.display_name(),
                    method: provider.method(),
                    reason: failure.reason,
                })
            }
        }
    }

    // ===== Provider registration =====

    /// Registers the provider methods of `config`.
    ///
    /// Declared methods are scanned first, then the base table, then every
    /// implemented trait. A provider for a type that already has one replaces
    /// it and emits a [`ProviderConflict`] report.
    pub fn register_bean_config<C: BeanConfig>(&self, config: Arc<C>) {
        let descriptor = C::providers();
        for table in descriptor.tables() {
            for method in table.methods() {
                let provider = Provider::bind(config.clone(), method, table.owner());
                self.install_provider(provider);
            }
        }
        tracing::debug!(config = type_name::<C>(), providers = self.inner.registry.len(), "registered bean config");
    }

    /// Resolves `C` through the container, then registers it.
    pub fn register_bean_config_type<C: BeanConfig + Bean>(&self) -> DiResult<()> {
        let config = self.get_bean::<C>()?;
        self.register_bean_config(config);
        Ok(())
    }

    /// Removes the providers keyed by the return types of `config`'s own
    /// declared provider methods, returning how many were removed.
    ///
    /// Providers that came from the base table or from implemented traits
    /// are left registered.
    pub fn unregister_bean_config<C: BeanConfig>(&self, _config: &C) -> usize {
        let descriptor = C::providers();
        let removed = descriptor
            .declared()
            .methods()
            .iter()
            .filter(|method| self.inner.registry.remove(&method.returns()).is_some())
            .count();
        tracing::debug!(config = type_name::<C>(), removed, "unregistered bean config");
        removed
    }

    /// The provider currently registered for `T`.
    pub fn provider_for<T: 'static>(&self) -> Option<Provider> {
        self.inner.registry.lookup(&key_of_type::<T>())
    }

    fn install_provider(&self, provider: Provider) {
        let replaced = self.inner.registry.insert(provider.clone());
        if let Some(previous) = replaced {
            if self.inner.options.report_conflicts {
                let conflict = ProviderConflict::between(&previous, &provider);
                tracing::warn!(
                    bean = conflict.bean.display_name(),
                    previous = conflict.previous_method,
                    method = conflict.method,
                    config = conflict.config,
                    "provider conflict, previous provider overwritten"
                );
                self.inner.observers.provider_conflict(&conflict);
            }
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("providers", &self.inner.registry.len())
            .field("singletons", &self.inner.singletons.len())
            .field("observers", &self.inner.observers.len())
            .field("options", &self.inner.options)
            .finish()
    }
}

fn downcast_arc<T: Bean>(value: AnyArc, key: TypeKey) -> DiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(key.display_name()))
}
