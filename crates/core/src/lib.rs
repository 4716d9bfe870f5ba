pub mod config;
pub mod email;
pub mod ids;
pub mod mailer;
pub mod newsletter;
