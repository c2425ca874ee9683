//! # bean-ioc
//!
//! A small inversion-of-control container: resolve a bean by type, build it
//! from a registered provider or one of its constructors, then fill its
//! injection points recursively.
//!
//! ## Features
//!
//! - **Provider configs**: objects whose provider methods produce beans by type
//! - **Field injection**: [`Inject<T>`] fields resolved after construction
//! - **Singleton caching**: singleton-scoped beans are built once per container
//! - **Circular dependency detection**: per-thread resolution stack with the full chain
//! - **Constructor arguments**: exact-signature constructor selection with [`args!`]
//!
//! ## Quick Start
//!
//! ```rust
//! use bean_ioc::{Bean, BeanConfig, BeanDescriptor, ConfigDescriptor, Container, Inject};
//! use std::sync::Arc;
//!
//! // A bean produced by a provider method
//! struct Database {
//!     connection_string: String,
//! }
//! impl Bean for Database {
//!     fn descriptor() -> BeanDescriptor<Self> {
//!         BeanDescriptor::new().singleton()
//!     }
//! }
//!
//! struct PersistenceConfig;
//! impl BeanConfig for PersistenceConfig {
//!     fn providers() -> ConfigDescriptor<Self> {
//!         ConfigDescriptor::new().provider("database", |_: &PersistenceConfig| Database {
//!             connection_string: "postgres://localhost".to_string(),
//!         })
//!     }
//! }
//!
//! // A bean built from its constructor, with one injection point
//! #[derive(Default)]
//! struct UserService {
//!     db: Inject<Database>,
//! }
//! impl Bean for UserService {
//!     fn descriptor() -> BeanDescriptor<Self> {
//!         BeanDescriptor::new()
//!             .constructor(UserService::default)
//!             .inject("db", |s: &mut UserService| &mut s.db)
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_bean_config(Arc::new(PersistenceConfig));
//!
//! let users = container.get_bean::<UserService>().unwrap();
//! assert_eq!(users.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton**: built once, then served from the container's cache
//! - **Transient**: built on every resolution (the default)
//!
//! ## Failure handling
//!
//! Resolving a type already being resolved on the same thread fails with
//! [`DiError::Circular`]. Every other construction problem (no usable
//! constructor, a provider error or panic, a final injection point) is
//! logged through `tracing`, reported to [`DiObserver`]s and turned into
//! "no instance", which the caller sees as [`DiError::NullResult`].
//!
//! ```rust
//! use bean_ioc::{Bean, BeanDescriptor, Container, DiError, Inject};
//!
//! #[derive(Default)]
//! struct Left {
//!     right: Inject<Right>,
//! }
//! #[derive(Default)]
//! struct Right {
//!     left: Inject<Left>,
//! }
//! impl Bean for Left {
//!     fn descriptor() -> BeanDescriptor<Self> {
//!         BeanDescriptor::new()
//!             .constructor(Left::default)
//!             .inject("right", |l: &mut Left| &mut l.right)
//!     }
//! }
//! impl Bean for Right {
//!     fn descriptor() -> BeanDescriptor<Self> {
//!         BeanDescriptor::new()
//!             .constructor(Right::default)
//!             .inject("left", |r: &mut Right| &mut r.left)
//!     }
//! }
//!
//! let err = Container::new().get_bean::<Left>().err().unwrap();
//! assert!(matches!(err, DiError::Circular(ref chain) if chain.len() == 3));
//! ```
//!
//! ## Feature flags
//!
//! - `config`: serde support for [`ContainerOptions`] and [`ContainerOptions::from_json`]
//! - `parking-lot`, `ahash`, `smallvec`: faster locks, hashing and resolution stack
//! - `performance`: all of the above performance features

pub mod args;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod inject;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod registration;
pub mod registry;
pub mod singletons;

mod internal;

// Re-export core types
pub use args::{Arg, Args};
pub use config::{ContainerOptions, OptionsError, SingletonPolicy, DEFAULT_MAX_DEPTH};
pub use container::global::{
    get_bean, get_bean_with, global, register_bean_config, register_bean_config_type,
    unregister_bean_config,
};
pub use container::{Container, ContainerBuilder};
pub use descriptors::{Access, Bean, BeanDescriptor, Constructor, InjectionPoint, Mutability};
pub use error::{BoxError, DiError, DiResult};
pub use inject::Inject;
pub use key::{key_of_type, TypeKey};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver, MetricsObserver};
pub use registration::{BeanConfig, ConfigDescriptor, ProviderMethod, ProviderTable};
pub use registry::{Provider, ProviderConflict, TypeRegistry};
pub use singletons::{AnyArc, SingletonCache};
