//! Process-wide default container.
//!
//! The free functions here forward to [`global()`], for code that wants a
//! single shared registry without threading a [`Container`] through.
//! Options come from `BEAN_IOC_*` environment variables when the global is
//! first touched; invalid values are logged and the defaults are used.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::args::Args;
use crate::config::ContainerOptions;
use crate::descriptors::Bean;
use crate::error::DiResult;
use crate::registration::BeanConfig;

use super::{Container, ContainerBuilder};

static GLOBAL: Lazy<Container> = Lazy::new(|| {
    let options = ContainerOptions::from_env().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring invalid container options from environment");
        ContainerOptions::default()
    });
    ContainerBuilder::new().options(options).build()
});

/// The shared default container.
pub fn global() -> &'static Container {
    &GLOBAL
}

/// [`Container::get_bean`] on the global container.
pub fn get_bean<T: Bean>() -> DiResult<Arc<T>> {
    GLOBAL.get_bean::<T>()
}

/// [`Container::get_bean_with`] on the global container.
pub fn get_bean_with<T: Bean>(args: Args) -> DiResult<Arc<T>> {
    GLOBAL.get_bean_with::<T>(args)
}

/// [`Container::register_bean_config`] on the global container.
pub fn register_bean_config<C: BeanConfig>(config: Arc<C>) {
    GLOBAL.register_bean_config(config)
}

/// [`Container::register_bean_config_type`] on the global container.
pub fn register_bean_config_type<C: BeanConfig + Bean>() -> DiResult<()> {
    GLOBAL.register_bean_config_type::<C>()
}

/// [`Container::unregister_bean_config`] on the global container.
pub fn unregister_bean_config<C: BeanConfig>(config: &C) -> usize {
    GLOBAL.unregister_bean_config(config)
}
