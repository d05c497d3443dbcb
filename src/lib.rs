//! Schema Forge - build nested field trees and compile them to JSON Schema
//!
//! The library holds the field tree and the schema compiler; the
//! `schema-forge` binary wraps them in a line-oriented terminal editor.
//!
//! # Example
//!
//! ```
//! use schema_forge::{FieldPatch, FieldTree, FieldType, Slot};
//! use serde_json::json;
//!
//! let mut tree = FieldTree::new();
//! let addr = tree.add_root();
//! tree.update(addr, FieldPatch::new().name("addr").field_type(FieldType::Object));
//!
//! let city = tree.add_child(addr, Slot::Properties).unwrap();
//! tree.update(city, FieldPatch::new().name("city").required(true));
//!
//! assert_eq!(
//!     tree.compile(),
//!     json!({
//!         "type": "object",
//!         "properties": {
//!             "addr": {
//!                 "type": "object",
//!                 "properties": {"city": {"type": "string"}},
//!                 "required": ["city"]
//!             }
//!         }
//!     })
//! );
//! ```

mod config;
mod field;
mod schema;
mod tree;

// Re-export the public API
#[cfg(feature = "cli")]
pub use config::{Config, EditorConfig, GeneralConfig, OutputConfig};
pub use config::RenderOptions;
pub use field::{Field, FieldId, FieldPatch, FieldType, Slot, UnknownFieldType};
pub use schema::{compile, render_schema};
pub use tree::{FieldTree, Walk};
