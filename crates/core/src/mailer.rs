//! Outbound email via a hosted transactional-email HTTP API.
//!
//! Delivery is best-effort from the newsletter manager's point of view:
//! callers spawn sends fire-and-forget and only log failures.

use serde::Serialize;
use url::Url;

use crate::config::Settings;
use crate::email::EmailAddress;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("invalid public base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("email api request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("email api returned status {0}")]
    Status(u16),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: String,
    text_body: String,
}

#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_url: String,
    api_token: String,
    sender: String,
    public_base_url: Url,
}

impl Mailer {
    pub fn new(settings: &Settings) -> Result<Self, MailerError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        let public_base_url = Url::parse(&settings.public_base_url)?;
        Ok(Self {
            http,
            api_url: settings.email_api_url.clone(),
            api_token: settings.email_api_token.clone(),
            sender: settings.email_sender.clone(),
            public_base_url,
        })
    }

    fn link(&self, path: &str, param: &str, value: &str) -> String {
        let mut url = self.public_base_url.clone();
        url.set_path(path);
        url.query_pairs_mut().clear().append_pair(param, value);
        url.to_string()
    }

    pub fn confirmation_link(&self, token: &str) -> String {
        self.link("/v1/newsletter/confirm", "token", token)
    }

    pub fn unsubscribe_link(&self, email: &EmailAddress) -> String {
        self.link("/v1/newsletter/unsubscribe", "email", email.as_str())
    }

    pub async fn send_confirmation(
        &self,
        recipient: &EmailAddress,
        token: &str,
    ) -> Result<(), MailerError> {
        let confirm = self.confirmation_link(token);
        let unsubscribe = self.unsubscribe_link(recipient);
        let html_body = format!(
            "<p>Thanks for subscribing to the Cadencea Vault newsletter.</p>\
             <p><a href=\"{confirm}\">Confirm your subscription</a></p>\
             <p>If you didn't request this, you can ignore this email or \
             <a href=\"{unsubscribe}\">unsubscribe</a>.</p>"
        );
        let text_body = format!(
            "Thanks for subscribing to the Cadencea Vault newsletter.\n\
             Confirm your subscription: {confirm}\n\
             If you didn't request this, you can ignore this email.\n\
             Unsubscribe: {unsubscribe}\n"
        );
        let email = OutboundEmail {
            from: &self.sender,
            to: recipient.as_str(),
            subject: "Confirm your Cadencea Vault newsletter subscription",
            html_body,
            text_body,
        };

        let resp = self
            .http
            .post(&self.api_url)
            .header("X-Postmark-Server-Token", &self.api_token)
            .json(&email)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(MailerError::Status(resp.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer(base_url: &str) -> Mailer {
        let settings = Settings {
            database_url: "postgres://localhost/cadencea".to_string(),
            app_env: "development".to_string(),
            api_bind: "0.0.0.0:3000".to_string(),
            public_base_url: base_url.to_string(),
            email_api_url: "https://api.postmarkapp.com/email".to_string(),
            email_api_token: String::new(),
            email_sender: "newsletter@cadenceavn.com".to_string(),
        };
        Mailer::new(&settings).unwrap()
    }

    #[test]
    fn test_confirmation_link() {
        let m = mailer("https://cadenceavn.com");
        assert_eq!(
            m.confirmation_link("tok123"),
            "https://cadenceavn.com/v1/newsletter/confirm?token=tok123"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_url() {
        let m = mailer("https://cadenceavn.com/");
        assert_eq!(
            m.confirmation_link("tok123"),
            "https://cadenceavn.com/v1/newsletter/confirm?token=tok123"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let settings = Settings {
            database_url: "postgres://localhost/cadencea".to_string(),
            app_env: "development".to_string(),
            api_bind: "0.0.0.0:3000".to_string(),
            public_base_url: "not a url".to_string(),
            email_api_url: "https://api.postmarkapp.com/email".to_string(),
            email_api_token: String::new(),
            email_sender: "newsletter@cadenceavn.com".to_string(),
        };
        assert!(matches!(
            Mailer::new(&settings),
            Err(MailerError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_unsubscribe_link_is_percent_encoded() {
        let m = mailer("https://cadenceavn.com");
        let email = EmailAddress::parse("a@x.com".to_string()).unwrap();
        assert_eq!(
            m.unsubscribe_link(&email),
            "https://cadenceavn.com/v1/newsletter/unsubscribe?email=a%40x.com"
        );
    }

    // A '+' left raw in a query string decodes to a space, breaking the
    // round trip for plus-tagged addresses.
    #[test]
    fn test_unsubscribe_link_encodes_plus_sign() {
        let m = mailer("https://cadenceavn.com");
        let email = EmailAddress::parse("first.last+tag@x.com".to_string()).unwrap();
        let link = m.unsubscribe_link(&email);
        assert!(!link.contains('+'), "unencoded '+' in unsubscribe link: {link}");
        assert_eq!(
            link,
            "https://cadenceavn.com/v1/newsletter/unsubscribe?email=first.last%2Btag%40x.com"
        );
    }
}
