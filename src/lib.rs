// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup
// - domain: core ledger model
// - application: port traits and use cases
// - infrastructure: SQLite and GitHub adapters
// - presentation: HTTP handlers and routing

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
