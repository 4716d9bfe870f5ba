//! HTML landing pages for confirmation and unsubscribe links clicked from
//! emails. Plain rendered strings, one page per outcome.

const STYLE: &str = "body { font-family: system-ui, sans-serif; margin: 0; padding: 2rem; \
                     background: #0f172a; color: white; text-align: center; } \
                     .container { max-width: 500px; margin: 0 auto; } \
                     .success { color: #10b981; } .error { color: #ef4444; } \
                     .warning { color: #f59e0b; } .info { color: #3b82f6; } \
                     .checkmark { font-size: 4rem; color: #10b981; margin: 2rem 0; } \
                     a { color: #8b5cf6; }";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>{title} - Cadencea Vault</title>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <style>{STYLE}</style>\n</head>\n<body>\n<div class=\"container\">\n{body}\n\
         <p><a href=\"/\">Return to Homepage</a></p>\n</div>\n</body>\n</html>\n"
    )
}

pub fn html_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn confirm_success(email: &str) -> String {
    layout(
        "Subscription Confirmed",
        &format!(
            "<div class=\"checkmark\">&#10003;</div>\
             <h1>Newsletter Subscription Confirmed!</h1>\
             <p class=\"success\">Thank you for subscribing to the Cadencea Vault newsletter!</p>\
             <p>You'll receive updates about our latest music production tools, sample libraries, and exclusive offers.</p>\
             <p><strong>Email:</strong> {}</p>",
            html_escape(email)
        ),
    )
}

pub fn confirm_already() -> String {
    layout(
        "Already Confirmed",
        "<h1>Newsletter Subscription</h1>\
         <p class=\"success\">Your email is already confirmed and subscribed to our newsletter!</p>\
         <p>You'll receive updates about our latest products and features.</p>",
    )
}

pub fn confirm_invalid() -> String {
    layout(
        "Confirmation Error",
        "<h1>Newsletter Confirmation</h1>\
         <p class=\"error\">Invalid or expired confirmation token.</p>\
         <p>Please try subscribing again or contact support if you continue to have issues.</p>",
    )
}

pub fn confirm_unsubscribed() -> String {
    layout(
        "Confirmation Error",
        "<h1>Newsletter Confirmation</h1>\
         <p class=\"error\">This email has been unsubscribed.</p>\
         <p>Please subscribe again if you wish to receive our newsletter.</p>",
    )
}

pub fn unsubscribe_success(email: &str) -> String {
    layout(
        "Successfully Unsubscribed",
        &format!(
            "<div class=\"checkmark\">&#10003;</div>\
             <h1>Successfully Unsubscribed</h1>\
             <p class=\"success\">You have been unsubscribed from the Cadencea Vault newsletter.</p>\
             <p><strong>Email:</strong> {}</p>\
             <p>You will no longer receive newsletter emails from us.</p>\
             <p>Changed your mind? You can resubscribe anytime by visiting our website.</p>",
            html_escape(email)
        ),
    )
}

pub fn unsubscribe_already() -> String {
    layout(
        "Already Unsubscribed",
        "<h1>Newsletter Unsubscribe</h1>\
         <p class=\"info\">This email address is already unsubscribed from our newsletter.</p>\
         <p>You will not receive any further newsletter emails from us.</p>",
    )
}

pub fn unsubscribe_missing_email() -> String {
    layout(
        "Unsubscribe Error",
        "<h1>Newsletter Unsubscribe</h1>\
         <p class=\"error\">Missing email address in unsubscribe link.</p>",
    )
}

pub fn unsubscribe_invalid_email() -> String {
    layout(
        "Unsubscribe Error",
        "<h1>Newsletter Unsubscribe</h1>\
         <p class=\"error\">The email address in this unsubscribe link is not valid.</p>\
         <p>Please use the link exactly as it appears in our email, or contact support.</p>",
    )
}

pub fn unsubscribe_not_found() -> String {
    layout(
        "Email Not Found",
        "<h1>Newsletter Unsubscribe</h1>\
         <p class=\"warning\">Email address not found in our newsletter database.</p>\
         <p>You may have already been unsubscribed or never subscribed to our newsletter.</p>",
    )
}

pub fn server_error() -> String {
    layout(
        "Error",
        "<h1>Newsletter</h1>\
         <p class=\"error\">An unexpected error occurred. Please try again later.</p>",
    )
}
