use bean_ioc::{
    Bean, BeanDescriptor, ContainerBuilder, DiError, DiObserver, Inject, LoggingObserver,
    MetricsObserver, TypeKey,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("bean_ioc=trace"))
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct Leaf;
impl Bean for Leaf {
    fn descriptor() -> BeanDescriptor<Self> {
        BeanDescriptor::new().singleton().constructor(Leaf::default)
    }
}

#[derive(Default)]
struct Branch {
    leaf: Inject<Leaf>,
}
impl Bean for Branch {
    fn descriptor() -> BeanDescriptor<Self> {
        BeanDescriptor::new()
            .constructor(Branch::default)
            .inject("leaf", |b: &mut Branch| &mut b.leaf)
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl DiObserver for EventLog {
    fn resolving(&self, key: &TypeKey) {
        self.events.lock().unwrap().push(format!("resolving {}", key.short_name()));
    }

    fn resolved(&self, key: &TypeKey, _duration: Duration) {
        self.events.lock().unwrap().push(format!("resolved {}", key.short_name()));
    }

    fn construction_failed(&self, key: &TypeKey, _error: &DiError) {
        self.events.lock().unwrap().push(format!("failed {}", key.short_name()));
    }
}

#[test]
fn test_events_follow_resolution_order() {
    init_tracing();
    let log = Arc::new(EventLog::default());
    let container = ContainerBuilder::new()
        .add_observer(log.clone())
        .add_observer(Arc::new(LoggingObserver::new()))
        .build();

    container.get_bean::<Branch>().unwrap();
    assert_eq!(
        *log.events.lock().unwrap(),
        vec!["resolving Branch", "resolving Leaf", "resolved Leaf", "resolved Branch"]
    );

    // Cached singletons do not produce events
    log.events.lock().unwrap().clear();
    container.get_bean::<Leaf>().unwrap();
    assert!(log.events.lock().unwrap().is_empty());
}

#[test]
fn test_metrics_count_failures() {
    init_tracing();
    struct Unbuildable;
    impl Bean for Unbuildable {}

    let metrics = Arc::new(MetricsObserver::new());
    let container = ContainerBuilder::new().add_observer(metrics.clone()).build();

    container.get_bean::<Branch>().unwrap();
    assert!(container.get_bean::<Unbuildable>().is_err());

    assert_eq!(metrics.resolution_count(), 2);
    assert_eq!(metrics.failure_count(), 1);
    assert!(metrics.average_resolution_time().is_some());
}
