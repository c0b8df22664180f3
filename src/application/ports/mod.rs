pub mod github_port;
pub mod ledger_repository;
pub mod session_repository;
pub mod user_repository;
