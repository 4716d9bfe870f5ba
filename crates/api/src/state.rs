use std::sync::Arc;

use cadencea_core::config::Settings;
use cadencea_core::mailer::Mailer;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub mailer: Arc<Mailer>,
    pub settings: Arc<Settings>,
}

#[derive(Debug, Clone)]
pub struct RequestId(pub String);
