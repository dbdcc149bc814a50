// Adapters layer: concrete implementations of the collaborator ports.

pub mod cache;
pub mod http;

pub use cache::CachedCatalog;
pub use http::HttpStorefrontClient;
