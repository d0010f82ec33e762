//! Infrastructure layer: event store, repository, read models and wiring.

pub mod config;
pub mod event_store;
pub mod gateway;
pub mod projections;
pub mod repository;
pub mod services;


pub use config::EditorConfig;
pub use gateway::CommandGateway;
pub use repository::{AggregateRepository, DeletionPolicy, RepositoryError};
pub use services::{RebuiltProjections, Services};
