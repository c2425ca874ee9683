//! Type registry: `TypeKey -> Provider` factories contributed by configurations.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::BoxError;
use crate::internal::sync::{new_map, Map, RwLock};
use crate::key::TypeKey;
use crate::registration::{BeanConfig, ProviderMethod};

type FactoryFn = Arc<dyn Fn() -> Result<Box<dyn Any + Send>, BoxError> + Send + Sync>;

/// A provider method bound to its configuration object.
#[derive(Clone)]
pub struct Provider {
    returns: TypeKey,
    method: &'static str,
    config: &'static str,
    declared_in: &'static str,
    factory: FactoryFn,
}

/// Why invoking a provider produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvocationFailure {
    pub(crate) reason: String,
    pub(crate) panicked: bool,
}

impl Provider {
    pub(crate) fn bind<C: BeanConfig>(
        config: Arc<C>,
        method: &ProviderMethod<C>,
        declared_in: &'static str,
    ) -> Self {
        let invoke = method.invoker();
        Self {
            returns: method.returns(),
            method: method.name(),
            config: std::any::type_name::<C>(),
            declared_in,
            factory: Arc::new(move || invoke(config.as_ref())),
        }
    }

    /// Type this provider produces.
    pub fn returns(&self) -> TypeKey {
        self.returns
    }

    /// Name of the provider method.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Type name of the configuration object the method is bound to.
    pub fn config(&self) -> &'static str {
        self.config
    }

    /// Owner of the method: the configuration type, its base, or a trait.
    pub fn declared_in(&self) -> &'static str {
        self.declared_in
    }

    /// Calls the provider method. Errors and panics both come back as a failure.
    pub(crate) fn invoke(&self) -> Result<Box<dyn Any + Send>, InvocationFailure> {
        match catch_unwind(AssertUnwindSafe(|| (self.factory)())) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(InvocationFailure { reason: err.to_string(), panicked: false }),
            Err(payload) => Err(InvocationFailure {
                reason: panic_message(payload.as_ref()),
                panicked: true,
            }),
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("returns", &self.returns)
            .field("method", &self.method)
            .field("config", &self.config)
            .field("declared_in", &self.declared_in)
            .finish()
    }
}

/// Report emitted when a provider overwrites an existing one for the same type.
///
/// Informational only: the newer provider wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConflict {
    /// The contested bean type
    pub bean: TypeKey,
    /// Method that was registered before
    pub previous_method: &'static str,
    /// Configuration type that owned the previous method
    pub previous_config: &'static str,
    /// Method now registered
    pub method: &'static str,
    /// Configuration type that owns the new method
    pub config: &'static str,
}

impl ProviderConflict {
    pub(crate) fn between(previous: &Provider, current: &Provider) -> Self {
        Self {
            bean: current.returns,
            previous_method: previous.method,
            previous_config: previous.config,
            method: current.method,
            config: current.config,
        }
    }
}

impl fmt::Display for ProviderConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "provider for {} overwritten: {}::{} replaced by {}::{}",
            self.bean, self.previous_config, self.previous_method, self.config, self.method
        )
    }
}

/// Thread-safe map from bean type to its provider.
///
/// Every operation is a single locked map access; at most one provider per key.
#[derive(Default)]
pub struct TypeRegistry {
    providers: RwLock<Map<TypeKey, Provider>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self { providers: RwLock::new(new_map()) }
    }

    /// Installs `provider`, returning the one it replaced.
    pub fn insert(&self, provider: Provider) -> Option<Provider> {
        self.providers.write().insert(provider.returns, provider)
    }

    pub fn remove(&self, key: &TypeKey) -> Option<Provider> {
        self.providers.write().remove(key)
    }

    pub fn lookup(&self, key: &TypeKey) -> Option<Provider> {
        self.providers.read().get(key).cloned()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.providers.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys with a registered provider, in no particular order.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.providers.read().keys().copied().collect()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("providers", &self.len())
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;
    use crate::registration::ConfigDescriptor;

    struct Token(u32);

    struct First;
    impl BeanConfig for First {
        fn providers() -> ConfigDescriptor<Self> {
            ConfigDescriptor::new().provider("token", |_: &First| Token(1))
        }
    }

    struct Broken;
    impl BeanConfig for Broken {
        fn providers() -> ConfigDescriptor<Self> {
            ConfigDescriptor::new()
                .try_provider("token", |_: &Broken| -> Result<Token, BoxError> { Err("offline".into()) })
                .provider("panics", |_: &Broken| -> u8 { panic!("boom") })
        }
    }

    fn bound<C: BeanConfig>(config: C, index: usize) -> Provider {
        let d = C::providers();
        Provider::bind(Arc::new(config), &d.declared().methods()[index], d.declared().owner())
    }

    #[test]
    fn insert_returns_replaced_provider() {
        let registry = TypeRegistry::new();
        assert!(registry.insert(bound(First, 0)).is_none());

        let previous = registry.insert(bound(First, 0)).unwrap();
        assert_eq!(previous.method(), "token");
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&key_of_type::<Token>()));
    }

    #[test]
    fn invoke_produces_value() {
        let provider = bound(First, 0);
        let value = provider.invoke().unwrap();
        assert_eq!(value.downcast::<Token>().unwrap().0, 1);
        assert!(provider.config().ends_with("First"));
    }

    #[test]
    fn invoke_captures_errors_and_panics() {
        let failure = bound(Broken, 0).invoke().err().unwrap();
        assert_eq!(failure.reason, "offline");
        assert!(!failure.panicked);

        let failure = bound(Broken, 1).invoke().err().unwrap();
        assert_eq!(failure.reason, "boom");
        assert!(failure.panicked);
    }

    #[test]
    fn remove_and_keys() {
        let registry = TypeRegistry::new();
        registry.insert(bound(First, 0));
        assert_eq!(registry.keys(), vec![key_of_type::<Token>()]);
        assert!(registry.remove(&key_of_type::<Token>()).is_some());
        assert!(registry.is_empty());
        assert!(registry.lookup(&key_of_type::<Token>()).is_none());
    }

    #[test]
    fn conflict_display_names_both_methods() {
        let a = bound(First, 0);
        let conflict = ProviderConflict::between(&a, &a);
        assert!(conflict.to_string().contains("token replaced by"));
    }
}
