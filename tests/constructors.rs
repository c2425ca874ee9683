use bean_ioc::{
    args, Access, Args, Bean, BeanDescriptor, BoxError, Constructor, Container, ContainerBuilder,
    DiError, DiObserver, Inject, MetricsObserver, TypeKey,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Account {
    id: i32,
    owner: String,
    balance: i64,
}

impl Bean for Account {
    fn descriptor() -> BeanDescriptor<Self> {
        BeanDescriptor::new()
            .constructor(Account::default)
            .constructor1(|id: i32| Account { id, ..Default::default() })
            .constructor2(|id: i32, owner: String| Account { id, owner, balance: 0 })
            .constructor3(|id: i32, owner: String, balance: i64| Account { id, owner, balance })
    }
}

#[test]
fn test_exact_signature_selects_constructor() {
    let container = Container::new();

    let account = container
        .get_bean_with::<Account>(args![7i32, "ada".to_string()])
        .unwrap();
    assert_eq!(account.id, 7);
    assert_eq!(account.owner, "ada");

    let account = container
        .get_bean_with::<Account>(args![1i32, "bob".to_string(), 250i64])
        .unwrap();
    assert_eq!(account.balance, 250);
}

#[test]
fn test_empty_args_use_no_arg_constructor() {
    let account = Container::new().get_bean_with::<Account>(Args::new()).unwrap();
    assert_eq!(account.id, 0);
}

#[test]
fn test_no_widening_or_reordering() {
    let container = Container::new();

    // u8 is not widened to i32
    let err = container.get_bean_with::<Account>(args![7u8]).err().unwrap();
    assert!(matches!(err, DiError::NullResult(_)));

    // &str is not String
    let err = container.get_bean_with::<Account>(args![7i32, "ada"]).err().unwrap();
    assert!(matches!(err, DiError::NullResult(_)));

    // Order matters
    let err = container
        .get_bean_with::<Account>(args!["ada".to_string(), 7i32])
        .err()
        .unwrap();
    assert!(matches!(err, DiError::NullResult(_)));
}

#[derive(Default)]
struct FailureLog {
    failures: Mutex<Vec<DiError>>,
}
impl DiObserver for FailureLog {
    fn construction_failed(&self, _key: &TypeKey, error: &DiError) {
        self.failures.lock().unwrap().push(error.clone());
    }
}

#[test]
fn test_missing_constructor_is_reported() {
    let log = Arc::new(FailureLog::default());
    let container = ContainerBuilder::new().add_observer(log.clone()).build();

    let err = container.get_bean_with::<Account>(args![true]).err().unwrap();
    assert!(matches!(err, DiError::NullResult(_)));

    let failures = log.failures.lock().unwrap();
    assert_eq!(
        failures[0],
        DiError::MissingConstructor {
            bean: std::any::type_name::<Account>(),
            params: vec!["bool"],
        }
    );
}

#[test]
fn test_private_no_arg_constructor_is_refused() {
    struct Locked;
    impl Bean for Locked {
        fn descriptor() -> BeanDescriptor<Self> {
            BeanDescriptor::new().private_constructor(|| Locked)
        }
    }

    let log = Arc::new(FailureLog::default());
    let container = ContainerBuilder::new().add_observer(log.clone()).build();

    let err = container.get_bean::<Locked>().err().unwrap();
    assert!(matches!(err, DiError::NullResult(_)));
    assert_eq!(
        log.failures.lock().unwrap()[0],
        DiError::InaccessibleConstructor(std::any::type_name::<Locked>())
    );
}

#[test]
fn test_private_constructor_with_args_is_not_selected() {
    struct Sealed(u16);
    impl Bean for Sealed {
        fn descriptor() -> BeanDescriptor<Self> {
            BeanDescriptor::new().with_constructor(Constructor::new(
                vec![TypeKey::of::<u16>()],
                Access::Private,
                |_| Ok(Sealed(0)),
            ))
        }
    }

    let err = Container::new().get_bean_with::<Sealed>(args![1u16]).err().unwrap();
    assert!(matches!(err, DiError::NullResult(_)));
}

#[test]
fn test_failing_and_panicking_constructors() {
    struct Fragile;
    impl Bean for Fragile {
        fn descriptor() -> BeanDescriptor<Self> {
            BeanDescriptor::new()
                .try_constructor(|| -> Result<Fragile, BoxError> { Err("disk full".into()) })
                .constructor1(|_: u32| -> Fragile { panic!("bad input") })
        }
    }

    let metrics = Arc::new(MetricsObserver::new());
    let container = ContainerBuilder::new().add_observer(metrics.clone()).build();

    assert!(matches!(container.get_bean::<Fragile>(), Err(DiError::NullResult(_))));
    assert!(matches!(
        container.get_bean_with::<Fragile>(args![1u32]),
        Err(DiError::NullResult(_))
    ));
    assert_eq!(metrics.failure_count(), 2);
    assert_eq!(metrics.panic_count(), 1);
    assert!(Container::resolution_chain().is_empty());
}

#[test]
fn test_args_are_not_forwarded_to_dependencies() {
    #[derive(Default)]
    struct Ledger {
        account: Inject<Account>,
        name: String,
    }
    impl Bean for Ledger {
        fn descriptor() -> BeanDescriptor<Self> {
            BeanDescriptor::new()
                .constructor1(|name: String| Ledger { name, ..Default::default() })
                .inject("account", |l: &mut Ledger| &mut l.account)
        }
    }

    let ledger = Container::new()
        .get_bean_with::<Ledger>(args!["main".to_string()])
        .unwrap();
    assert_eq!(ledger.name, "main");
    // The dependency came from its own no-arg constructor
    assert_eq!(ledger.account.id, 0);
}

#[test]
fn test_cached_singleton_ignores_args() {
    struct Settings(u32);
    impl Bean for Settings {
        fn descriptor() -> BeanDescriptor<Self> {
            BeanDescriptor::new()
                .singleton()
                .constructor1(|value: u32| Settings(value))
        }
    }

    let container = Container::new();
    let first = container.get_bean_with::<Settings>(args![1u32]).unwrap();
    let second = container.get_bean_with::<Settings>(args![2u32]).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.0, 1);
}

#[test]
fn test_final_injection_point_fails_after_resolving_dependency() {
    struct Audited {
        account: Inject<Account>,
    }
    impl Bean for Audited {
        fn descriptor() -> BeanDescriptor<Self> {
            BeanDescriptor::new()
                .constructor(|| Audited { account: Inject::empty() })
                .inject_final::<Account>("account")
        }
    }

    let log = Arc::new(FailureLog::default());
    let container = ContainerBuilder::new().add_observer(log.clone()).build();

    assert!(matches!(container.get_bean::<Audited>(), Err(DiError::NullResult(_))));
    assert_eq!(
        log.failures.lock().unwrap()[0],
        DiError::FinalField {
            bean: std::any::type_name::<Audited>(),
            field: "account",
        }
    );
}

#[test]
fn test_failed_dependency_is_absorbed_at_every_level() {
    struct Broken;
    impl Bean for Broken {}

    #[derive(Default)]
    struct Outer {
        broken: Inject<Broken>,
    }
    impl Bean for Outer {
        fn descriptor() -> BeanDescriptor<Self> {
            BeanDescriptor::new()
                .constructor(Outer::default)
                .inject("broken", |o: &mut Outer| &mut o.broken)
        }
    }

    let log = Arc::new(FailureLog::default());
    let container = ContainerBuilder::new().add_observer(log.clone()).build();

    let err = container.get_bean::<Outer>().err().unwrap();
    assert_eq!(err, DiError::NullResult(std::any::type_name::<Outer>()));

    let failures = log.failures.lock().unwrap();
    assert_eq!(failures.len(), 2);
    assert!(matches!(failures[0], DiError::MissingConstructor { .. }));
    assert_eq!(failures[1], DiError::NullResult(std::any::type_name::<Broken>()));
}
