//! 依赖注入容器的集成测试

use component_macros::Injectable;
use di_abstractions::{
    ArgValue, CapabilityType, ComponentRegistry, DependencyResolver, DependencyResolverExt, Inject,
    InjectDirective, Injectable, InjectionPoint, Instance, RawFactory, Signature, SpawnFn,
    TypeToken,
};
use di_impl::Injector;
use infrastructure_common::{
    ContainerConfig, DependencyError, DependencyResult, Lifetime, ShapeViolation,
};
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const CALLERS: usize = 16;

trait Iface: Injectable + Debug {
    fn attr(&self) -> &str;
    fn dep(&self) -> Option<Arc<dyn Iface>>;
}

trait Other: Injectable + Debug {}

#[derive(Debug)]
struct Config {
    attr: String,
}

/// 依赖名为 "b" 的组件
#[derive(Debug, Injectable)]
struct ObjectA {
    attr: String,
    #[inject("b", require)]
    dep: Inject<dyn Iface>,
}

impl Iface for ObjectA {
    fn attr(&self) -> &str {
        &self.attr
    }

    fn dep(&self) -> Option<Arc<dyn Iface>> {
        self.dep.get()
    }
}

#[derive(Debug, Default, Injectable)]
struct ObjectB;

impl Iface for ObjectB {
    fn attr(&self) -> &str {
        "b"
    }

    fn dep(&self) -> Option<Arc<dyn Iface>> {
        None
    }
}

/// 按类型依赖另一种能力
#[derive(Debug, Injectable)]
struct Chained {
    label: &'static str,
    #[inject(default, require)]
    other: Inject<dyn Other>,
}

impl Iface for Chained {
    fn attr(&self) -> &str {
        self.label
    }

    fn dep(&self) -> Option<Arc<dyn Iface>> {
        None
    }
}

/// 按类型依赖 `dyn Iface`
#[derive(Debug, Injectable)]
struct OtherImpl {
    #[inject(default, require)]
    back: Inject<dyn Iface>,
}

impl Other for OtherImpl {}

#[derive(Debug, Default, Injectable)]
struct PlainOther;

impl Other for PlainOther {}

#[derive(Debug, Injectable)]
struct Optional {
    #[inject("missing")]
    dep: Inject<dyn Iface>,
}

impl Iface for Optional {
    fn attr(&self) -> &str {
        "optional"
    }

    fn dep(&self) -> Option<Arc<dyn Iface>> {
        self.dep.get()
    }
}

#[derive(Debug, Injectable)]
struct Required {
    #[inject("missing", require)]
    dep: Inject<dyn Iface>,
}

impl Iface for Required {
    fn attr(&self) -> &str {
        "required"
    }

    fn dep(&self) -> Option<Arc<dyn Iface>> {
        self.dep.get()
    }
}

fn new_a(cfg: Arc<Config>) -> anyhow::Result<Arc<dyn Iface>> {
    Ok(Arc::new(ObjectA {
        attr: cfg.attr.clone(),
        dep: Inject::new(),
    }))
}

fn new_b() -> anyhow::Result<Arc<dyn Iface>> {
    Ok(Arc::new(ObjectB))
}

fn new_plain_other() -> Arc<dyn Other> {
    Arc::new(PlainOther)
}

fn counting_b(calls: Arc<AtomicUsize>) -> impl Fn() -> Arc<dyn Iface> + Send + Sync + 'static {
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        Arc::new(ObjectB)
    }
}

#[test]
fn test_new_a_new_b_example() {
    let injector = Injector::new();
    injector.set_arg(Config {
        attr: "fddgg".into(),
    });
    injector.register(Lifetime::Singleton, new_a, "a").unwrap();
    injector.register(Lifetime::Singleton, new_b, "b").unwrap();

    let capability = CapabilityType::of::<dyn Iface>();
    let first = injector.resolve_instance_by_name(capability, "a").unwrap().unwrap();
    let second = injector.resolve_instance_by_name(capability, "a").unwrap().unwrap();
    assert!(first.ptr_eq(&second));

    let a = first.downcast::<dyn Iface>().unwrap();
    assert_eq!(a.attr(), "fddgg");

    let b = injector.resolve_instance_by_name(capability, "b").unwrap().unwrap();
    let injected = a.dep().unwrap();
    assert_eq!(injected.attr(), "b");
    assert!(Arc::ptr_eq(&b.downcast::<dyn Iface>().unwrap(), &injected));
}

#[test]
fn test_singleton_keeps_injected_transient() {
    let calls = Arc::new(AtomicUsize::new(0));
    let injector = Injector::new();
    injector.set_arg(Config {
        attr: "wired".into(),
    });
    injector.register(Lifetime::Singleton, new_a, "a").unwrap();
    injector
        .register(Lifetime::Transient, counting_b(calls.clone()), "b")
        .unwrap();

    let first = injector.resolve_by_name::<dyn Iface>("a").unwrap().unwrap();
    let dep = first.dep().unwrap();
    let second = injector.resolve_by_name::<dyn Iface>("a").unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&dep, &second.dep().unwrap()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_singleton_wired_once_under_concurrency() {
    let calls = Arc::new(AtomicUsize::new(0));
    let injector = Arc::new(Injector::new());
    injector.set_arg(Config {
        attr: "shared".into(),
    });
    injector.register(Lifetime::Singleton, new_a, "a").unwrap();
    injector
        .register(Lifetime::Transient, counting_b(calls.clone()), "b")
        .unwrap();

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let injector = injector.clone();
            tokio::task::spawn_blocking(move || injector.resolve_by_name::<dyn Iface>("a"))
        })
        .collect();

    let mut deps = Vec::with_capacity(CALLERS);
    for handle in handles {
        let a = handle.await.unwrap().unwrap().unwrap();
        deps.push(a.dep().unwrap());
    }

    assert!(deps.iter().all(|dep| Arc::ptr_eq(dep, &deps[0])));
}

#[test]
fn test_factory_shapes() {
    let injector = Injector::new();

    assert!(injector.register(Lifetime::Singleton, new_a, "value_and_failure").is_ok());
    assert!(injector.register(Lifetime::Singleton, new_plain_other, "value").is_ok());

    let err = injector
        .register(Lifetime::Singleton, || Arc::new(ObjectB), "concrete")
        .unwrap_err();
    assert!(matches!(
        err,
        DependencyError::InvalidFactoryShape {
            violation: ShapeViolation::ConcreteOutput { .. },
            ..
        }
    ));

    let opaque = RawFactory::opaque(
        "opaque",
        Signature::new(vec![], vec![TypeToken::capability::<dyn Iface>()]),
    );
    let err = injector.register_raw(Lifetime::Singleton, opaque, "opaque").unwrap_err();
    assert!(matches!(
        err,
        DependencyError::InvalidFactoryShape {
            violation: ShapeViolation::NotCallable,
            ..
        }
    ));

    assert_eq!(injector.len(), 2);
    assert!(!injector.is_registered("concrete"));
}

#[test]
fn test_raw_factory_registration() {
    let injector = Injector::new();
    let body: SpawnFn = Arc::new(|_: Vec<ArgValue>| -> DependencyResult<Option<Instance>> {
        Ok(Some(Instance::new::<dyn Iface>(Arc::new(ObjectB))))
    });
    let raw = RawFactory::new(
        "hand_written",
        Signature::new(vec![], vec![TypeToken::capability::<dyn Iface>()]),
        body,
    );
    injector.register_raw(Lifetime::Transient, raw, "raw").unwrap();

    let resolved = injector.resolve::<dyn Iface>().unwrap().unwrap();
    assert_eq!(resolved.attr(), "b");
}

#[test]
fn test_duplicate_name_with_different_capability() {
    let injector = Injector::new();
    injector.register(Lifetime::Singleton, new_b, "shared").unwrap();

    let err = injector
        .register(Lifetime::Transient, new_plain_other, "shared")
        .unwrap_err();
    assert!(matches!(err, DependencyError::DuplicateName { ref name } if name == "shared"));
    assert_eq!(injector.len(), 1);
}

#[test]
fn test_resolve_by_type_zero_one_many() {
    let injector = Injector::new();
    assert!(injector.resolve::<dyn Iface>().unwrap().is_none());

    injector.register(Lifetime::Singleton, new_b, "first").unwrap();
    assert_eq!(injector.resolve::<dyn Iface>().unwrap().unwrap().attr(), "b");

    injector.register(Lifetime::Transient, new_b, "second").unwrap();
    let err = injector.resolve::<dyn Iface>().unwrap_err();
    match err {
        DependencyError::AmbiguousResolution {
            count, candidates, ..
        } => {
            assert_eq!(count, 2);
            assert_eq!(candidates, ["first", "second"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(injector.resolve_by_name::<dyn Iface>("second").unwrap().is_some());
    assert!(injector.resolve_by_name::<dyn Other>("second").unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_singleton_concurrent_first_access() {
    let calls = Arc::new(AtomicUsize::new(0));
    let injector = Arc::new(Injector::new());
    injector
        .register(Lifetime::Singleton, counting_b(calls.clone()), "b")
        .unwrap();

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let injector = injector.clone();
            tokio::task::spawn_blocking(move || {
                injector.resolve_instance_by_name(CapabilityType::of::<dyn Iface>(), "b")
            })
        })
        .collect();

    let mut instances = Vec::with_capacity(CALLERS);
    for handle in handles {
        instances.push(handle.await.unwrap().unwrap().unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(instances.iter().all(|i| i.ptr_eq(&instances[0])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_singleton_concurrent_failure_is_shared() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let injector = Arc::new(Injector::new());
    injector
        .register(
            Lifetime::Singleton,
            move || -> anyhow::Result<Arc<dyn Iface>> {
                counted.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(20));
                anyhow::bail!("connection refused")
            },
            "broken",
        )
        .unwrap();

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let injector = injector.clone();
            tokio::task::spawn_blocking(move || injector.resolve::<dyn Iface>())
        })
        .collect();

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(injector.stats().resolution_errors, CALLERS as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_transient_creates_distinct_instances() {
    let calls = Arc::new(AtomicUsize::new(0));
    let injector = Arc::new(Injector::new());
    injector
        .register(Lifetime::Transient, counting_b(calls.clone()), "b")
        .unwrap();

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let injector = injector.clone();
            tokio::task::spawn_blocking(move || {
                injector.resolve_instance_by_type(CapabilityType::of::<dyn Iface>())
            })
        })
        .collect();

    let mut instances = Vec::with_capacity(CALLERS);
    for handle in handles {
        instances.push(handle.await.unwrap().unwrap().unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), CALLERS);
    for (i, left) in instances.iter().enumerate() {
        for right in &instances[i + 1..] {
            assert!(!left.ptr_eq(right));
        }
    }
}

#[test]
fn test_cycle_by_type() {
    let injector = Injector::new();
    injector
        .register(
            Lifetime::Singleton,
            || -> Arc<dyn Iface> {
                Arc::new(Chained {
                    label: "a",
                    other: Inject::new(),
                })
            },
            "a",
        )
        .unwrap();
    injector
        .register(
            Lifetime::Singleton,
            || -> Arc<dyn Other> {
                Arc::new(OtherImpl {
                    back: Inject::new(),
                })
            },
            "b",
        )
        .unwrap();

    let err = injector.resolve::<dyn Iface>().unwrap_err();
    let path = err.cycle_path().unwrap();
    assert_eq!(path, ["a", "b", "a"]);
    assert!(err.to_string().contains("a -> b -> a"));

    let err = injector.resolve::<dyn Other>().unwrap_err();
    assert_eq!(err.cycle_path().unwrap(), ["b", "a", "b"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_chains_do_not_interfere() {
    let injector = Arc::new(Injector::new());
    for chain in ["x", "y"] {
        let label = chain;
        let leaf_name = format!("{chain}_leaf");
        let leaf_label = leaf_name.clone();
        injector
            .register(
                Lifetime::Transient,
                move || -> Arc<dyn Iface> {
                    Arc::new(Named {
                        label,
                        dep: Inject::new(),
                        target: leaf_label.clone(),
                    })
                },
                chain,
            )
            .unwrap();
        injector
            .register(
                Lifetime::Transient,
                || -> Arc<dyn Other> { Arc::new(PlainOther) },
                &leaf_name,
            )
            .unwrap();
    }

    let handles: Vec<_> = (0..CALLERS)
        .map(|i| {
            let injector = injector.clone();
            let name = if i % 2 == 0 { "x" } else { "y" };
            tokio::task::spawn_blocking(move || injector.resolve_by_name::<dyn Iface>(name))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let resolved = handle.await.unwrap().unwrap().unwrap();
        assert_eq!(resolved.attr(), if i % 2 == 0 { "x" } else { "y" });
    }
}

/// 按运行时给出的名称依赖 `dyn Other`
#[derive(Debug)]
struct Named {
    label: &'static str,
    dep: Inject<dyn Other>,
    target: String,
}

impl Injectable for Named {
    fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
        vec![InjectionPoint::settable(
            "dep",
            InjectDirective::by_name(self.target.clone()).required(),
            &self.dep,
        )]
    }
}

impl Iface for Named {
    fn attr(&self) -> &str {
        if self.dep.is_set() {
            self.label
        } else {
            "unwired"
        }
    }

    fn dep(&self) -> Option<Arc<dyn Iface>> {
        None
    }
}

/// 按名称依赖若干个 `dyn Iface`
#[derive(Debug)]
struct Joint {
    label: &'static str,
    targets: &'static [&'static str],
    slots: Vec<Inject<dyn Iface>>,
}

impl Injectable for Joint {
    fn injection_points(&self) -> Vec<InjectionPoint<'_>> {
        self.targets
            .iter()
            .zip(&self.slots)
            .map(|(target, slot)| {
                let directive = InjectDirective::by_name(*target).required();
                InjectionPoint::settable("slots", directive, slot)
            })
            .collect()
    }
}

impl Iface for Joint {
    fn attr(&self) -> &str {
        self.label
    }

    fn dep(&self) -> Option<Arc<dyn Iface>> {
        self.slots.first().and_then(Inject::get)
    }
}

fn joint(
    label: &'static str,
    targets: &'static [&'static str],
) -> impl Fn() -> Arc<dyn Iface> + Send + Sync + 'static {
    move || {
        Arc::new(Joint {
            label,
            targets,
            slots: targets.iter().map(|_| Inject::new()).collect(),
        })
    }
}

#[test]
fn test_shared_dependency_in_sibling_branches() {
    let calls = Arc::new(AtomicUsize::new(0));
    let injector = Injector::new();
    injector.register(Lifetime::Singleton, joint("a", &["b", "c"]), "a").unwrap();
    injector.register(Lifetime::Transient, joint("b", &["d"]), "b").unwrap();
    injector.register(Lifetime::Transient, joint("c", &["d"]), "c").unwrap();
    injector
        .register(Lifetime::Transient, counting_b(calls.clone()), "d")
        .unwrap();

    let a = injector.resolve_by_name::<dyn Iface>("a").unwrap().unwrap();
    let b = a.dep().unwrap();
    assert_eq!(b.attr(), "b");
    assert!(b.dep().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_required_and_optional_missing_dependency() {
    let injector = Injector::new();
    injector
        .register(
            Lifetime::Singleton,
            || -> Arc<dyn Iface> {
                Arc::new(Optional {
                    dep: Inject::new(),
                })
            },
            "optional",
        )
        .unwrap();
    injector
        .register(
            Lifetime::Singleton,
            || -> Arc<dyn Iface> {
                Arc::new(Required {
                    dep: Inject::new(),
                })
            },
            "required",
        )
        .unwrap();

    let optional = injector.resolve_by_name::<dyn Iface>("optional").unwrap().unwrap();
    assert!(optional.dep().is_none());

    let err = injector.resolve_by_name::<dyn Iface>("required").unwrap_err();
    assert!(matches!(
        err,
        DependencyError::MissingRequiredDependency { ref name, field: "dep", .. }
            if name == "missing"
    ));
}

#[test]
fn test_missing_argument() {
    let injector = Injector::new();
    injector.register(Lifetime::Transient, new_a, "a").unwrap();

    let err = injector.resolve_by_name::<dyn Iface>("a").unwrap_err();
    assert!(matches!(
        err,
        DependencyError::MissingArgument { type_name } if type_name.ends_with("Config")
    ));

    injector.set_arg(Config {
        attr: "late".into(),
    });
    injector.register(Lifetime::Singleton, new_b, "b").unwrap();
    let a = injector.resolve_by_name::<dyn Iface>("a").unwrap().unwrap();
    assert_eq!(a.attr(), "late");
}

#[test]
fn test_empty_factory_output_is_not_found() {
    let injector = Injector::new();
    injector
        .register(Lifetime::Singleton, || -> Option<Arc<dyn Iface>> { None }, "nothing")
        .unwrap();

    assert!(injector.resolve::<dyn Iface>().unwrap().is_none());
    assert_eq!(injector.stats().resolution_errors, 0);
}

#[test]
fn test_strategy_identifiers() {
    let injector = Injector::new();
    injector.register_with_strategy("singleton", new_b, "s").unwrap();
    injector.register_with_strategy("FACTORY", new_plain_other, "f").unwrap();

    let err = injector.register_with_strategy("scoped", new_b, "x").unwrap_err();
    assert!(matches!(err, DependencyError::UnknownStrategy { .. }));

    let lifetimes: Vec<_> = injector
        .registered_units()
        .into_iter()
        .map(|unit| (unit.name, unit.lifetime))
        .collect();
    assert_eq!(
        lifetimes,
        [
            ("s".to_string(), Lifetime::Singleton),
            ("f".to_string(), Lifetime::Transient)
        ]
    );
}

#[test]
fn test_config_file_drives_container() -> anyhow::Result<()> {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(file, "max_resolution_depth = 1")?;
    writeln!(file, "default_lifetime = \"transient\"")?;

    let injector = Injector::with_config(ContainerConfig::load(Some(file.path()))?);
    injector.set_arg(Config {
        attr: "cfg".into(),
    });
    injector.register_default(new_a, "a")?;
    injector.register_default(new_b, "b")?;

    assert!(injector.registered_units().iter().all(|u| u.lifetime == Lifetime::Transient));
    let err = injector.resolve_by_name::<dyn Iface>("a").unwrap_err();
    assert!(matches!(
        err,
        DependencyError::ResolutionDepthExceeded { limit: 1, .. }
    ));
    Ok(())
}
