//! Basic example of the Khazin container.
//!
//! Run with `RUST_LOG=khazin_container=debug` to watch bindings being
//! registered and resolved.

use std::sync::Arc;

use khazin::{Container, Injectable, Provider, Resolver, Result};
use tracing_subscriber::EnvFilter;

// === Define your traits and types ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

#[derive(Injectable)]
struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Config {
    database_url: String,
    debug: bool,
}

#[derive(Injectable)]
struct Database {
    config: Arc<Config>,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.config.database_url)
    }
}

#[derive(Injectable)]
struct UserRepository {
    database: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.database.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

#[derive(Injectable)]
struct UserService {
    #[inject(name = "user_repository")]
    repo: Arc<UserRepository>,
    logger: Arc<dyn Logger>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        self.repo.find_user(id)
    }
}

// === Group infrastructure bindings in a provider ===

struct Infrastructure;

impl Provider for Infrastructure {
    fn register(&self, container: &Container) -> Result<()> {
        // Config: a value built outside the container
        container.instance(
            "Config",
            Arc::new(Config {
                database_url: "postgres://localhost/myapp".to_string(),
                debug: true,
            }),
        );
        // Logger: contract bound to an implementation
        container.bind(
            "Logger",
            ConsoleLogger::descriptor().expose(|logger: Arc<ConsoleLogger>| logger as Arc<dyn Logger>),
        );
        // Database: one connection for everybody
        container.singleton(Database::descriptor())
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("khazin_container=info")),
        )
        .init();

    let container = Container::builder()
        .add_provider(Infrastructure)
        .build()?;

    // Transient: a new service per request
    container.register(UserRepository::descriptor())?;
    container.register(UserService::descriptor())?;

    // Factory: composed by hand
    container.bind_factory("Greeting", |resolver: &dyn Resolver| {
        let config = resolver.get::<Config>("config")?;
        Ok(Arc::new(format!("Connected to {} (debug={})", config.database_url, config.debug)))
    });

    println!("✅ Container built: {container:?}");
    println!("{}", container.explain("UserService")?);

    let greeting: Arc<String> = container.get("greeting")?;
    println!("📋 {greeting}");

    let service: Arc<UserService> = container.get("UserService")?;
    println!("👤 {}", service.get_user(42));

    let again: Arc<UserService> = container.get("user_service")?;
    println!("👤 {}", again.get_user(7));
    println!(
        "Same service? {} | Same database? {}",
        Arc::ptr_eq(&service, &again),
        Arc::ptr_eq(&service.repo.database, &again.repo.database)
    );

    println!("\n🎉 Everything works!");
    Ok(())
}
