pub mod auth;
pub mod catalog;
pub mod offers;
pub mod reviews;
pub mod users;
