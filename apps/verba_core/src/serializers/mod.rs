pub mod user_auth;
pub mod verba_health;
