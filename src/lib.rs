pub mod catalog;
pub mod config;
pub mod env;
pub mod error;
pub mod form;
pub mod input;
pub mod logger;
pub mod ports;
pub mod preview;
pub mod session;
pub mod submit;
pub mod templates;

pub use error::ConsoleError;

pub type Result<T> = std::result::Result<T, ConsoleError>;

pub use catalog::{CatalogSource, JsonCatalog, SessionSnapshot, StaticCatalog};
pub use config::ConsoleConfig;
pub use preview::{ConnectionPreview, DatabaseFamily};
pub use session::FormSession;
pub use submit::ContainerPayload;
