pub mod handlers;
pub mod pages;
pub mod password;
pub mod session;
pub mod users;

/// Login page used by login-required routes.
pub const LOGIN_URL: &str = "/login/";
/// The dashboard sends anonymous visitors to sign-up instead.
pub const REGISTER_URL: &str = "/register/";
