pub mod account;
pub mod component;
pub mod github;
pub mod mailer;
pub mod password_reset;
pub mod pool;
pub mod profile;
pub mod session;
