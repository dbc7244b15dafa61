pub mod auth;
pub mod datetime;
pub mod error;
pub mod pagination;
pub mod response;
pub mod user;
