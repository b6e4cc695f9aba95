//! Configuration: schema, loading, and the cascade resolver.

pub mod loader;
pub mod resolve;
pub mod schema;

pub use loader::*;
pub use resolve::*;
pub use schema::*;
