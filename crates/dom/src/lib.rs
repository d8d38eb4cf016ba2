//! HTML tree processing: permissive parser, arena-backed mutable tree,
//! serializer, and character entity decoding.
//!
//! ## Core design
//!
//! ```text
//! HTML text → parse → DomArena (u32 indices) → mutate → serialize → HTML text
//! ```
//!
//! Text nodes store their source bytes verbatim; entity decoding is a
//! separate, explicit step (`entities::decode_html`) so byte offsets into
//! the stored text stay meaningful.

pub mod arena;
pub mod entities;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod types;

pub use arena::DomArena;
pub use entities::decode_html;
pub use error::{DomError, Result};
pub use parser::{parse, ParserOptions};
pub use serializer::{serialize, SerializerOptions};
pub use types::{AttrMap, DomNode, NodeId, NodeKind};
