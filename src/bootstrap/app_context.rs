use std::sync::Arc;

use crate::application::ports::github_port::GithubPort;
use crate::application::ports::ledger_repository::LedgerRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    ledger: Arc<dyn LedgerRepository>,
    github: Arc<dyn GithubPort>,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        ledger: Arc<dyn LedgerRepository>,
        github: Arc<dyn GithubPort>,
    ) -> Self {
        Self {
            users,
            sessions,
            ledger,
            github,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        self.services.users.clone()
    }

    pub fn sessions(&self) -> Arc<dyn SessionRepository> {
        self.services.sessions.clone()
    }

    pub fn ledger(&self) -> Arc<dyn LedgerRepository> {
        self.services.ledger.clone()
    }

    pub fn github(&self) -> Arc<dyn GithubPort> {
        self.services.github.clone()
    }
}
