//! Service layer for Reelcast
//!
//! Provides a clean, testable API for business logic that can be
//! consumed by multiple interfaces (CLI tools, the daemon, the HTTP API)
//! without code duplication.
//!
//! # Architecture
//!
//! The service layer follows a facade pattern with `ReelcastService` as
//! the main entry point, coordinating specialized sub-services:
//!
//! - `GenerationService`: two-step script + annotation generation
//! - `PostingService`: multi-platform posting and retry
//! - `QueueService`: queue listing, deletion, and scheduling
//! - `ValidationService`: request validation before network calls
//! - `EventBus`: progress event distribution

pub mod events;
pub mod generation;
pub mod posting;
pub mod queue;
pub mod validation;

pub use events::{Event, EventBus, EventReceiver};
pub use generation::GenerationService;
pub use posting::PostingService;
pub use queue::QueueService;
pub use validation::{ValidationReport, ValidationService};

use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::dispatcher::Dispatcher;
use crate::error::{ConfigError, ReelcastError, Result};
use crate::llm::{backend_from_env, ChatBackend};
use crate::platforms::{build_platforms, Platform};

/// Main service facade that coordinates all sub-services
///
/// All sub-services share the same `Arc<Database>` and `Arc<Config>`
/// instances. The chat backend and platform adapters are injected, so
/// tests can substitute fakes while production wiring reads credentials
/// from the environment.
pub struct ReelcastService {
    db: Arc<Database>,
    generation: GenerationService,
    posting: PostingService,
    queue: QueueService,
    validation: ValidationService,
    event_bus: EventBus,
}

impl ReelcastService {
    /// Create a service with configuration from the default location
    pub async fn new() -> Result<Self> {
        let config = Config::load()?;
        Self::from_config(config).await
    }

    /// Create a service with a pre-loaded configuration
    ///
    /// Credentials for the chat backend and platform adapters come from
    /// the environment.
    pub async fn from_config(config: Config) -> Result<Self> {
        let backend = backend_from_env(&config);
        let platforms = build_platforms(&config);
        Self::from_parts(config, backend, platforms).await
    }

    /// Create a service with explicit backend and platform adapters
    ///
    /// The seam used by tests: pass a fake chat backend and mock
    /// platforms against an in-memory database path.
    pub async fn from_parts(
        config: Config,
        backend: Arc<dyn ChatBackend>,
        platforms: Vec<Box<dyn Platform>>,
    ) -> Result<Self> {
        let db_path = config.database.path.clone();
        if db_path.is_empty() {
            return Err(ReelcastError::Config(ConfigError::MissingField(
                "database.path".to_string(),
            )));
        }

        let db = Arc::new(Database::new(&db_path).await?);
        let config = Arc::new(config);
        let event_bus = EventBus::new(100);

        let dispatcher = Arc::new(Dispatcher::new(platforms, Arc::clone(&db)));
        let generation = GenerationService::new(
            Arc::clone(&db),
            backend,
            Arc::clone(&config),
            event_bus.clone(),
        );
        let posting = PostingService::new(Arc::clone(&db), dispatcher, event_bus.clone());
        let queue = QueueService::new(Arc::clone(&db), Arc::clone(&config));
        let validation = ValidationService::new();

        Ok(Self {
            db,
            generation,
            posting,
            queue,
            validation,
            event_bus,
        })
    }

    /// Access the database directly
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Access the generation service
    pub fn generation(&self) -> &GenerationService {
        &self.generation
    }

    /// Access the posting service
    pub fn posting(&self) -> &PostingService {
        &self.posting
    }

    /// Access the queue service
    pub fn queue(&self) -> &QueueService {
        &self.queue
    }

    /// Access the validation service
    pub fn validation(&self) -> &ValidationService {
        &self.validation
    }

    /// Subscribe to service events
    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }
}
