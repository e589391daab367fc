pub mod user_repo;
pub use user_repo::UserRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod assignment_repo;
pub use assignment_repo::AssignmentRepository;
pub mod review_repo;
pub use review_repo::ReviewRepository;
