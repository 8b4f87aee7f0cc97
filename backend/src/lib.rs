//! Q&A forum backend: accounts, questions, answers, votes and notifications
//! behind a JSON REST API.
//!
//! Layout follows ports and adapters: [`domain`] holds entities, services
//! and port traits; [`inbound`] adapts HTTP onto the driving ports;
//! [`outbound`] implements the driven ports over memory or PostgreSQL;
//! [`server`] wires them into an Actix application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
