pub mod mailer;
pub mod session;
pub mod turnstile;
