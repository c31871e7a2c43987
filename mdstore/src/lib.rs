pub mod config;
pub mod document;
pub mod error;
pub mod path_guard;
pub mod request;
pub mod schema;
pub mod store;
pub mod util;

pub use config::StoreConfig;
pub use document::{Document, Frontmatter};
pub use error::{ErrorKind, Result, StoreError};
pub use path_guard::PathGuard;
pub use request::{Request, Response};
pub use schema::SchemaAccessor;
pub use store::Store;
