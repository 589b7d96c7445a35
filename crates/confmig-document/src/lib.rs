//! confmig Document Model
//!
//! The data the migration engine works on: configuration documents, the key
//! paths that address options inside them, and the flat environment-variable
//! form of the same options.
//!
//! # Core Concepts
//!
//! - [`Document`]: Order-preserving mapping of options to values
//! - [`KeyPath`]: Dot-delimited address of an option (`client.token.audience`)
//! - [`EnvSet`]: Ordered `KEY="value"` pairs
//! - [`DocumentFormat`]: JSON, YAML or TOML text form of a document
//!
//! # Example
//!
//! ```rust
//! use confmig_document::{DocumentFormat, KeyPath};
//!
//! let doc = DocumentFormat::Json.parse(r#"{"engine": {"type": "redis"}}"#).unwrap();
//! let path: KeyPath = "engine.type".parse().unwrap();
//! assert_eq!(doc.get(&path).and_then(|v| v.as_str()), Some("redis"));
//! ```

#![warn(unreachable_pub)]

mod document;
mod env;
mod error;
mod path;

pub mod formats;

pub use document::Document;
pub use env::{env_key, EnvSet, DEFAULT_ENV_PREFIX};
pub use error::{ParseError, SerializeError};
pub use formats::{DocumentFormat, DocumentParser, Indent};
pub use path::{KeyPath, PathError};

/// Re-export of the value type stored in documents
pub use serde_json::{Map, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
