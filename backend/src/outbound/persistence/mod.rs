//! PostgreSQL repositories built on Diesel, `diesel-async` and bb8.
//!
//! Row structs (`models`) and table definitions (`schema`) stay private to
//! this module; every repository converts rows into domain types and maps
//! driver failures onto its port's error enum.
//!
//! ```ignore
//! use forum_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/forum")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_answer_repository;
mod diesel_helpers;
mod diesel_notification_repository;
mod diesel_question_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_answer_repository::DieselAnswerRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_question_repository::DieselQuestionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
