//! Message schema catalog for the ARNET protocol.
//!
//! A [`MessageSchema`] describes one command or event: its identity triple
//! `(featureId, classId, messageId)`, a dotted path, the ordered argument
//! layout, the acknowledgement class, and — for commands — the expected
//! response selector. The [`MessageCatalog`] resolves schemas by identity or
//! path and drives the per-argument binary codec.
//!
//! The catalog is built programmatically (see [`builtin`]); the upstream XML
//! definition files are out of scope here.

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod schema;
pub mod value;

pub use catalog::MessageCatalog;
pub use error::{CatalogError, Result};
pub use schema::{
    AckClass, ArgKind, ArgSpec, EventContent, Expectation, MessageKind, MessageSchema,
};
pub use value::{ArgValue, Params};
