//! End-to-end resolution through the public API.

mod mock;

use std::sync::Arc;
use std::time::Duration;

use khazin::{Container, ContainerError, Injectable, Lifetime, Resolver, TypeDescriptor};

use mock::config::Dependencies;
use mock::contracts::{User, UserRepository};
use mock::singleton_test::SingletonTest;
use mock::user_controller::UserController;
use mock::user_service::UserService;

fn application() -> Container {
    let container = Container::builder()
        .add_provider(Dependencies)
        .build()
        .unwrap();
    container.register(UserService::descriptor()).unwrap();
    container.register(UserController::descriptor()).unwrap();
    container
}

#[test]
fn contains_bound_dependencies() {
    let container = application();

    assert!(container.has("UserController"));
    assert!(container.has("UserService"));
    assert!(container.has("UserRepository"));
    assert_eq!(
        container.names(),
        vec!["singletontest", "usercontroller", "userrepository", "userservice"]
    );
}

#[test]
fn names_are_normalized() {
    let container = application();

    for spelling in ["UserController", "userController", "usercontroller", "user_controller", "user-controller"] {
        assert!(container.has(spelling), "{spelling} should be bound");
    }
}

#[test]
fn nested_dependencies_resolve() {
    let container = application();
    let controller: Arc<UserController> = container.get("UserController").unwrap();

    let response = controller.all();
    assert_eq!(response.status, 200);
    assert_eq!(response.body.users.len(), 2);
    assert_eq!(response.body.users[0].name, "Jon Snow");
    assert_eq!(controller.served(), 1);
}

#[test]
fn transient_controllers_are_distinct() {
    let container = application();
    let first: Arc<UserController> = container.get("user_controller").unwrap();
    let second: Arc<UserController> = container.get("UserController").unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    first.all();
    assert_eq!(second.served(), 0);
}

#[test]
fn singletons_return_the_same_instance() {
    let container = application();

    let first: Arc<SingletonTest> = container.get("SingletonTest").unwrap();
    std::thread::sleep(Duration::from_millis(5));
    let second: Arc<SingletonTest> = container.get("SingletonTest").unwrap();

    assert_eq!(first.created_at, second.created_at);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn instance_binding_returns_given_value() {
    let container = application();
    let user = Arc::new(User::new(3, "Slash"));

    container.instance("User", user.clone());
    let from_container: Arc<User> = container.get("User").unwrap();

    assert_eq!(from_container.name, "Slash");
    assert!(Arc::ptr_eq(&user, &from_container));
}

struct FixedRepository;

impl UserRepository for FixedRepository {
    fn all(&self) -> Vec<User> {
        vec![User::new(0, "Steve Jobs")]
    }
}

#[test]
fn manual_factory_composes_by_hand() {
    let container = application();
    container.bind_factory("ManualUserService", |resolver: &dyn Resolver| {
        let singleton = resolver.get::<SingletonTest>("SingletonTest")?;
        Ok(Arc::new(UserService::with_singleton(Arc::new(FixedRepository), singleton)))
    });

    let service: Arc<UserService> = container.get("ManualUserService").unwrap();
    assert_eq!(service.all()[0].name, "Steve Jobs");

    let composed = service.singleton_test.as_ref().unwrap();
    let shared: Arc<SingletonTest> = container.get("singleton_test").unwrap();
    assert!(Arc::ptr_eq(composed, &shared));
    assert_eq!(composed.created_at, shared.created_at);

    // Reflective construction leaves the optional field empty.
    let reflective: Arc<UserService> = container.get("UserService").unwrap();
    assert!(reflective.singleton_test.is_none());
}

#[test]
fn unknown_dependency_is_not_found() {
    let container = application();

    let err = container.get::<UserService>("OrderRepository").unwrap_err();
    assert!(err.is_not_found());
    assert!(!container.has("OrderRepository"));

    let err = container.get::<UserService>("Route").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn missing_contract_names_the_consumer() {
    let container = Container::new();
    container.register(UserService::descriptor()).unwrap();

    match container.get::<UserService>("UserService").unwrap_err() {
        ContainerError::NotFound(err) => {
            assert_eq!(err.requested.canonical(), "userrepository");
            assert_eq!(err.required_by.as_ref().unwrap().canonical(), "userservice");
            let message = err.to_string();
            assert!(message.contains("user_repository"));
        }
        other => panic!("Expected NotFound, got: {other:?}"),
    }
}

#[test]
fn contract_is_handed_out_as_trait_object() {
    let container = application();
    let repository: Arc<dyn UserRepository> = container.get("user_repository").unwrap();
    assert_eq!(repository.all().len(), 2);

    assert!(matches!(
        container.get::<mock::mock_user_repository::MockUserRepository>("UserRepository"),
        Err(ContainerError::TypeMismatch { .. })
    ));
}

// ── Deep chains ──

struct Level {
    depth: usize,
    next: Option<Arc<Level>>,
}

fn level_descriptor(depth: usize, last: usize) -> TypeDescriptor {
    let name = format!("level_{depth}");
    if depth == last {
        TypeDescriptor::new(name, Vec::<String>::new(), move |_| Ok(Level { depth, next: None }))
    } else {
        TypeDescriptor::new(name, [format!("Level{}", depth + 1)], move |args| {
            Ok(Level {
                depth,
                next: Some(args.next()?),
            })
        })
    }
}

fn chain_length(mut level: Arc<Level>) -> usize {
    let mut length = 1;
    while let Some(next) = level.next.clone() {
        assert_eq!(next.depth, level.depth + 1);
        level = next;
        length += 1;
    }
    length
}

#[test]
fn deep_chain_resolves_in_any_registration_order() {
    const DEPTH: usize = 12;

    let forward = Container::new();
    for depth in 0..DEPTH {
        forward.register(level_descriptor(depth, DEPTH - 1)).unwrap();
    }

    let backward = Container::new();
    for depth in (0..DEPTH).rev() {
        backward.register(level_descriptor(depth, DEPTH - 1)).unwrap();
    }

    let interleaved = Container::new();
    for depth in (0..DEPTH).filter(|d| d % 2 == 1).chain((0..DEPTH).filter(|d| d % 2 == 0)) {
        interleaved.register(level_descriptor(depth, DEPTH - 1)).unwrap();
    }

    for container in [&forward, &backward, &interleaved] {
        let root: Arc<Level> = container.get("Level0").unwrap();
        assert_eq!(chain_length(root), DEPTH);
    }
}

// ── Cycles ──

#[derive(Debug, Injectable)]
struct Chicken {
    egg: Arc<Egg>,
}

#[derive(Debug, Injectable)]
struct Egg {
    chicken: Arc<Chicken>,
}

#[test]
fn cycle_is_reported_with_its_chain() {
    let container = Container::new();
    container.register(Chicken::descriptor()).unwrap();
    container.register(Egg::descriptor()).unwrap();

    match container.get::<Chicken>("chicken").unwrap_err() {
        ContainerError::CyclicDependency(err) => {
            let chain: Vec<&str> = err.chain.iter().map(|key| key.canonical()).collect();
            assert_eq!(chain, vec!["chicken", "egg", "chicken"]);
            assert!(err.to_string().contains("→"));
        }
        other => panic!("Expected CyclicDependency, got: {other:?}"),
    }

    // Planning failed before construction: the bindings are untouched.
    assert!(container.has("egg"));
    assert!(container.get::<Egg>("egg").unwrap_err().to_string().contains("egg"));
}

// ── Diagnostics ──

#[test]
fn explain_shows_tree_with_lifetimes() {
    let container = application();
    let tree = container.explain("UserController").unwrap();

    let lines: Vec<&str> = tree.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("[Transient]"));
    assert!(lines[0].ends_with("UserController"));
    assert!(lines[2].ends_with("    UserRepository"));
}

#[test]
fn lifetimes_display() {
    assert_eq!(Lifetime::Singleton.to_string(), "Singleton");
}

#[test]
fn global_container_is_usable() {
    khazin::global().instance("integration_marker", Arc::new(String::from("on")));
    assert_eq!(*khazin::global().get::<String>("IntegrationMarker").unwrap(), "on");
}
