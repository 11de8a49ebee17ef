pub mod repository;

pub use repository::Resolver;
