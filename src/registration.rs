//! Configuration objects and their provider methods.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::key::{key_of_type, TypeKey};

pub(crate) type ProvideFn<C> = Arc<dyn Fn(&C) -> Result<Box<dyn Any + Send>, BoxError> + Send + Sync>;

/// A configuration object contributing provider methods.
///
/// The descriptor groups provider methods the way a type's members are laid
/// out: those declared on the type itself, those inherited from a base, and
/// those coming from implemented traits. Registration walks all three;
/// unregistration only walks the declared table.
///
/// # Examples
///
/// ```rust
/// use bean_ioc::{Bean, BeanConfig, ConfigDescriptor, Container};
///
/// struct Settings {
///     url: String,
/// }
/// impl Bean for Settings {}
///
/// struct AppConfig;
/// impl BeanConfig for AppConfig {
///     fn providers() -> ConfigDescriptor<Self> {
///         ConfigDescriptor::new()
///             .provider("settings", |_: &AppConfig| Settings { url: "mem://".into() })
///     }
/// }
///
/// let container = Container::new();
/// container.register_bean_config(std::sync::Arc::new(AppConfig));
/// assert_eq!(container.get_bean::<Settings>().unwrap().url, "mem://");
/// ```
pub trait BeanConfig: Any + Send + Sync + Sized {
    fn providers() -> ConfigDescriptor<Self>;
}

/// One provider method: a name, a return type and a zero-argument call on
/// the configuration object.
pub struct ProviderMethod<C> {
    name: &'static str,
    returns: TypeKey,
    invoke: ProvideFn<C>,
}

impl<C> ProviderMethod<C> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared return type; the registry key this method provides.
    pub fn returns(&self) -> TypeKey {
        self.returns
    }

    pub(crate) fn invoker(&self) -> ProvideFn<C> {
        self.invoke.clone()
    }
}

impl<C> fmt::Debug for ProviderMethod<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderMethod")
            .field("name", &self.name)
            .field("returns", &self.returns)
            .finish()
    }
}

/// Provider methods declared by one owner (the type itself, its base, or a trait).
pub struct ProviderTable<C> {
    owner: &'static str,
    methods: Vec<ProviderMethod<C>>,
}

impl<C: 'static> ProviderTable<C> {
    pub fn new(owner: &'static str) -> Self {
        Self { owner, methods: Vec::new() }
    }

    /// Adds an infallible provider method returning `R`.
    pub fn provider<R, F>(self, name: &'static str, f: F) -> Self
    where
        R: Any + Send,
        F: Fn(&C) -> R + Send + Sync + 'static,
    {
        self.try_provider(name, move |config: &C| Ok(f(config)))
    }

    /// Adds a fallible provider method returning `R`.
    pub fn try_provider<R, F>(mut self, name: &'static str, f: F) -> Self
    where
        R: Any + Send,
        F: Fn(&C) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        self.methods.push(ProviderMethod {
            name,
            returns: key_of_type::<R>(),
            invoke: Arc::new(move |config: &C| {
                f(config).map(|value| Box::new(value) as Box<dyn Any + Send>)
            }),
        });
        self
    }
}

impl<C> ProviderTable<C> {
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn methods(&self) -> &[ProviderMethod<C>] {
        &self.methods
    }
}

impl<C> fmt::Debug for ProviderTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTable")
            .field("owner", &self.owner)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Provider methods of a configuration type.
pub struct ConfigDescriptor<C> {
    declared: ProviderTable<C>,
    base: Option<ProviderTable<C>>,
    traits: Vec<ProviderTable<C>>,
}

impl<C: BeanConfig> ConfigDescriptor<C> {
    /// Descriptor with an empty declared table and no base.
    pub fn new() -> Self {
        Self {
            declared: ProviderTable::new(std::any::type_name::<C>()),
            base: None,
            traits: Vec::new(),
        }
    }

    /// Declares a provider method on the configuration type itself.
    pub fn provider<R, F>(mut self, name: &'static str, f: F) -> Self
    where
        R: Any + Send,
        F: Fn(&C) -> R + Send + Sync + 'static,
    {
        self.declared = self.declared.provider(name, f);
        self
    }

    /// Declares a fallible provider method on the configuration type itself.
    pub fn try_provider<R, F>(mut self, name: &'static str, f: F) -> Self
    where
        R: Any + Send,
        F: Fn(&C) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        self.declared = self.declared.try_provider(name, f);
        self
    }

    /// Provider methods inherited from a base named `owner`.
    pub fn base<F>(mut self, owner: &'static str, build: F) -> Self
    where
        F: FnOnce(ProviderTable<C>) -> ProviderTable<C>,
    {
        self.base = Some(build(ProviderTable::new(owner)));
        self
    }

    /// Provider methods coming from an implemented trait named `owner`.
    pub fn implements<F>(mut self, owner: &'static str, build: F) -> Self
    where
        F: FnOnce(ProviderTable<C>) -> ProviderTable<C>,
    {
        self.traits.push(build(ProviderTable::new(owner)));
        self
    }
}

impl<C> ConfigDescriptor<C> {
    pub fn declared(&self) -> &ProviderTable<C> {
        &self.declared
    }

    pub fn base_table(&self) -> Option<&ProviderTable<C>> {
        self.base.as_ref()
    }

    pub fn trait_tables(&self) -> &[ProviderTable<C>] {
        &self.traits
    }

    /// Registration scan order: declared, base, then traits in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &ProviderTable<C>> {
        std::iter::once(&self.declared)
            .chain(self.base.iter())
            .chain(self.traits.iter())
    }
}

impl<C: BeanConfig> Default for ConfigDescriptor<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for ConfigDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDescriptor")
            .field("declared", &self.declared)
            .field("base", &self.base)
            .field("traits", &self.traits)
            .finish()
    }
}
