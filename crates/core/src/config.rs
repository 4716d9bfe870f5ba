use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub app_env: String,
    pub api_bind: String,
    /// External base URL used when building confirmation and unsubscribe
    /// links embedded in outgoing emails.
    pub public_base_url: String,
    pub email_api_url: String,
    pub email_api_token: String,
    pub email_sender: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let database_url =
            std::env::var("DATABASE_URL").or_else(|_| std::env::var("CADENCEA_DATABASE_URL"))?;
        let app_env = std::env::var("CADENCEA_ENV").unwrap_or_else(|_| "development".to_string());
        let api_bind =
            std::env::var("CADENCEA_API_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let public_base_url = std::env::var("CADENCEA_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let email_api_url = std::env::var("CADENCEA_EMAIL_API_URL")
            .unwrap_or_else(|_| "https://api.postmarkapp.com/email".to_string());
        let email_api_token =
            std::env::var("CADENCEA_EMAIL_API_TOKEN").unwrap_or_else(|_| String::new());
        let email_sender = std::env::var("CADENCEA_EMAIL_SENDER")
            .unwrap_or_else(|_| "newsletter@cadenceavn.com".to_string());

        Ok(Self {
            database_url,
            app_env,
            api_bind,
            public_base_url,
            email_api_url,
            email_api_token,
            email_sender,
        })
    }

    /// Development mode echoes confirmation tokens in API responses so the
    /// flow can be exercised without a mail inbox.
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
