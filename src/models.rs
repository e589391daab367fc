pub mod auth;
pub mod catalog;
pub mod assignment;
pub mod review;
