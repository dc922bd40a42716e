//! End-to-end wiring through the public API

use injector::{depends_on, BuildError, Lifetime, Registry, RegistrationError, ResolveError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn doubling_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_value("x", 1i64).unwrap();
    registry
        .register_factory("double", &["x"], |args| args.get::<i64>(0) * 2)
        .unwrap();
    registry
}

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    (Arc::clone(&calls), calls)
}

#[test]
fn test_factory_sees_its_dependency() {
    let injector = doubling_registry().build().unwrap();
    assert_eq!(*injector.get::<i64>("double").unwrap(), 2);
}

#[test]
fn test_inject_passes_values_in_order() {
    let injector = doubling_registry().build().unwrap();
    let result = injector
        .inject(&["x", "double"], |args| {
            (*args.get::<i64>(0), *args.get::<i64>(1))
        })
        .unwrap();
    assert_eq!(result, (1, 2));
}

#[test]
fn test_build_reports_unregistered_reference() {
    let mut registry = Registry::new();
    registry.register_factory("f1", &["f2"], |_| 1).unwrap();
    assert!(matches!(
        registry.build(),
        Err(BuildError::MissingDependency { .. })
    ));
}

#[test]
fn test_build_reports_cycle() {
    let mut registry = Registry::new();
    registry.register_factory("a", &["b"], |_| 1).unwrap();
    registry.register_factory("b", &["c"], |_| 2).unwrap();
    registry.register_factory("c", &["a"], |_| 3).unwrap();
    assert!(matches!(
        registry.build(),
        Err(BuildError::CircularDependency { .. })
    ));
}

#[test]
fn test_second_registration_is_duplicate() {
    let mut registry = Registry::new();
    registry.register_value("count", 0).unwrap();
    assert_eq!(
        registry.register_value("count", 0),
        Err(RegistrationError::DuplicateName("count".to_string()))
    );
}

#[test]
fn test_value_is_same_instance_every_time() {
    let mut registry = Registry::new();
    registry.register_value("config", vec![1, 2, 3]).unwrap();
    let injector = registry.build().unwrap();

    let a = injector.get::<Vec<i32>>("config").unwrap();
    let b = injector.get::<Vec<i32>>("config").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_factory_runs_once() {
    let (calls, count) = counter();
    let mut registry = Registry::new();
    registry
        .register_factory("conn", &[], move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            String::from("connection")
        })
        .unwrap();
    let injector = registry.build().unwrap();

    let first = injector.get_dependency("conn").unwrap();
    let second = injector.get_dependency("conn").unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_not_called_until_used() {
    let (calls, count) = counter();
    let mut registry = Registry::new();
    registry
        .register_factory("lazy", &[], move |_| calls.fetch_add(1, Ordering::SeqCst))
        .unwrap();
    let injector = registry.build().unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!injector.is_resolved("lazy"));
    injector.get_dependency("lazy").unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_service_runs_every_lookup_with_fresh_dependencies() {
    let (service_calls, service_count) = counter();
    let (ticket_calls, ticket_count) = counter();

    let mut registry = Registry::new();
    registry
        .register_service("ticket", &[], move |_| ticket_calls.fetch_add(1, Ordering::SeqCst))
        .unwrap();
    registry
        .register_service("request", &["ticket"], move |args| {
            service_calls.fetch_add(1, Ordering::SeqCst);
            *args.get::<usize>(0)
        })
        .unwrap();
    let injector = registry.build().unwrap();

    assert_eq!(*injector.get::<usize>("request").unwrap(), 0);
    assert_eq!(*injector.get::<usize>("request").unwrap(), 1);
    assert_eq!(*injector.get::<usize>("request").unwrap(), 2);
    assert_eq!(service_count.load(Ordering::SeqCst), 3);
    assert_eq!(ticket_count.load(Ordering::SeqCst), 3);
}

#[test]
fn test_diamond_resolves_shared_dependency_once() {
    let (calls, count) = counter();
    let mut registry = Registry::new();
    registry
        .register_factory("d", &[], move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            10i32
        })
        .unwrap();
    registry
        .register_factory("b", &["d"], |args| args.get::<i32>(0) + 1)
        .unwrap();
    registry
        .register_factory("c", &["d"], |args| args.get::<i32>(0) + 2)
        .unwrap();
    registry
        .register_factory("a", &["b", "c"], |args| args.get::<i32>(0) * args.get::<i32>(1))
        .unwrap();
    let injector = registry.build().unwrap();

    assert_eq!(*injector.get::<i32>("a").unwrap(), 11 * 12);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_duplicate_dependency_entries_pass_value_twice() {
    let mut registry = Registry::new();
    registry.register_value("n", 7u8).unwrap();
    registry
        .register_factory("pair", &["n", "n"], |args| {
            (args.len(), *args.get::<u8>(0), *args.get::<u8>(1))
        })
        .unwrap();
    let injector = registry.build().unwrap();

    assert_eq!(*injector.get::<(usize, u8, u8)>("pair").unwrap(), (2, 7, 7));
}

#[test]
fn test_unregistered_lookup_fails_after_valid_build() {
    let injector = doubling_registry().build().unwrap();
    assert_eq!(
        injector.get_dependency("nope").unwrap_err(),
        ResolveError::MissingDependency("nope".to_string())
    );
    assert!(injector.inject(&["x", "nope"], |_| ()).is_err());
}

#[test]
fn test_injector_is_frozen_at_build() {
    let mut registry = doubling_registry();
    let injector = registry.build().unwrap();
    registry.register_value("late", true).unwrap();

    assert!(!injector.has_dependency("late"));
    assert_eq!(injector.len(), 2);
}

#[test]
fn test_separate_injectors_do_not_share_cache() {
    let (calls, count) = counter();
    let mut registry = Registry::new();
    registry
        .register_factory("id", &[], move |_| calls.fetch_add(1, Ordering::SeqCst))
        .unwrap();

    let first = registry.build().unwrap();
    let second = registry.build().unwrap();
    assert_eq!(*first.get::<usize>("id").unwrap(), 0);
    assert_eq!(*second.get::<usize>("id").unwrap(), 1);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_dependant_registration_and_injection() {
    let mut registry = doubling_registry();
    let triple = depends_on(&["x"], |args| args.get::<i64>(0) * 3);
    registry
        .register_dependant("triple", triple, Lifetime::Transient)
        .unwrap();
    let injector = registry.build().unwrap();

    assert_eq!(*injector.get::<i64>("triple").unwrap(), 3);
    assert_eq!(injector.lifetime("triple"), Some(Lifetime::Transient));

    let sum = depends_on(&["double", "triple"], |args| args.get::<i64>(0) + args.get::<i64>(1));
    let value = injector.inject_dependant(&sum).unwrap();
    assert_eq!(value.downcast_ref::<i64>(), Some(&5));
}

#[test]
fn test_concurrent_first_lookups_produce_once() {
    const THREADS: usize = 8;
    let (calls, count) = counter();

    let mut registry = Registry::new();
    registry
        .register_factory("slow", &[], move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            String::from("expensive")
        })
        .unwrap();
    let injector = Arc::new(registry.build().unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let injector = Arc::clone(&injector);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                injector.get::<String>("slow").unwrap()
            })
        })
        .collect();

    let values: Vec<Arc<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
}
