use std::sync::Arc;

use crate::{
    config::Config,
    repositories::user::UserStore,
    services::{mailer::ContactMailer, session::SessionStore, turnstile::TurnstileClient},
};

/// Shared handles for the route handlers. Everything a request needs is
/// injected here; handlers never reach for ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub turnstile: Arc<TurnstileClient>,
    pub mailer: Arc<ContactMailer>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        turnstile: Arc<TurnstileClient>,
        mailer: Arc<ContactMailer>,
        config: Config,
    ) -> Self {
        Self {
            users,
            sessions,
            turnstile,
            mailer,
            config,
        }
    }
}
