#![no_main]

use bean_ioc::{Args, Bean, BeanConfig, BeanDescriptor, ConfigDescriptor, Container, DiError, Inject};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

struct Target {
    id: u8,
}
impl Bean for Target {
    fn descriptor() -> BeanDescriptor<Self> {
        BeanDescriptor::new()
            .constructor(|| Target { id: 0 })
            .constructor1(|id: u8| Target { id })
            .constructor2(|id: u8, _: u32| Target { id })
    }
}

#[derive(Default)]
struct Dependent {
    target: Inject<Target>,
}
impl Bean for Dependent {
    fn descriptor() -> BeanDescriptor<Self> {
        BeanDescriptor::new()
            .singleton()
            .constructor(Dependent::default)
            .inject("target", |d: &mut Dependent| &mut d.target)
    }
}

struct TargetConfig(u8);
impl BeanConfig for TargetConfig {
    fn providers() -> ConfigDescriptor<Self> {
        ConfigDescriptor::new().provider("target", |c: &TargetConfig| Target { id: c.0 })
    }
}

fuzz_target!(|data: &[u8]| {
    let container = Container::new();

    for chunk in data.chunks(2) {
        let op = chunk[0] % 5;
        let value = chunk.get(1).copied().unwrap_or_default();

        match op {
            0 => container.register_bean_config(Arc::new(TargetConfig(value))),
            1 => {
                container.unregister_bean_config(&TargetConfig(value));
            }
            2 => {
                // Arbitrary argument lists must never panic
                let mut args = Args::new();
                for byte in chunk {
                    if byte % 2 == 0 {
                        args.push(*byte);
                    } else {
                        args.push(u32::from(*byte));
                    }
                }
                match container.get_bean_with::<Target>(args) {
                    Ok(_) | Err(DiError::NullResult(_)) => {}
                    Err(other) => panic!("unexpected error: {}", other),
                }
            }
            3 => {
                let bean = container.get_bean::<Target>().unwrap();
                if let Some(provider) = container.provider_for::<Target>() {
                    assert_eq!(provider.method(), "target");
                } else {
                    assert_eq!(bean.id, 0);
                }
            }
            _ => {
                let first = container.get_bean::<Dependent>().unwrap();
                let second = container.get_bean::<Dependent>().unwrap();
                assert!(Arc::ptr_eq(&first, &second));
            }
        }
    }

    assert!(Container::resolution_chain().is_empty());
});
