//! confmig Migration Engine
//!
//! Converts Centrifugo configuration from one schema version to the next.
//!
//! # Architecture
//!
//! ```text
//! text ──parse──> Document ──PathRewriter──> Document ──Steps──> Document ──render──> text
//!                    │            (table)                (rules)
//!                    └──────────────── UnmappedKeyReporter ──────────────> ChangeLog
//! ```
//!
//! Every transition is a [`Plan`]: a [`MappingTable`] plus normalizer steps,
//! stored as TOML and embedded in this crate. The env form of a configuration
//! goes through the [`EnvConverter`] with the same tables instead.
//!
//! # Example
//!
//! ```rust
//! use confmig_document::DocumentFormat;
//! use confmig_engine::{Migrator, Transition};
//!
//! let conversion = Migrator::default()
//!     .convert(r#"{"port": 8000}"#, DocumentFormat::Json, Transition::V5ToV6)
//!     .unwrap();
//! assert!(conversion.output.contains("http_server"));
//! assert_eq!(conversion.log.lines()[0], r#"migrate value from "port" to path "http_server.port""#);
//! ```

#![warn(unreachable_pub)]

mod env;
mod error;
mod migrator;
mod plan;
mod report;
mod rewriter;
mod settings;
mod table;

pub use env::{Converted, EnvConverter};
pub use error::{MigrateError, PlanError, Result, SettingsError};
pub use migrator::{Conversion, Migration, Migrator};
pub use plan::{Plan, PlanKind, Transition};
pub use report::UnmappedKeyReporter;
pub use rewriter::{PathRewriter, Rewritten};
pub use settings::{Settings, ENV_PREFIX_VAR};
pub use table::MappingTable;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
