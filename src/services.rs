pub mod auth;
pub mod assignment_service;
pub mod review_service;
pub mod certificate_service;
