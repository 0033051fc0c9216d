pub mod auth;
pub mod rank;
pub mod reviews;
