//! # Rental Service
//!
//! Property-rental booking backend: properties, their platform listings and
//! the reservations made against them, exposed as a JSON REST API.
//!
//! ## Architecture
//!
//! - **domain**: Records, patches and the store traits
//! - **infrastructure**: SeaORM persistence and the in-memory store
//! - **interfaces**: HTTP router, request pipeline and resource handlers
//! - **shared**: Errors, validation helpers and shutdown coordination
//! - **server**: Runtime bootstrap used by the CLI

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{
    init_database, DatabaseConfig, InMemoryStorage, Migrator, SeaOrmRepositoryProvider,
};

// Re-export API router
pub use interfaces::http::create_api_router;
