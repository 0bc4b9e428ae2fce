//! Notion database as schema source and write sink.
//!
//! "Do X": Read a database's property layout and create pages in it.
//!
//! Property JSON ⇄ `Schema` conversion lives in internal.rs together with
//! the HTTP calls.

mod internal;

pub use internal::{schema_from_properties, NotionClient};

/// Public Notion API root.
pub const DEFAULT_API_URL: &str = "https://api.notion.com";

/// API version pinned in every request.
pub const DEFAULT_API_VERSION: &str = "2022-06-28";

/// Characters of a rejected response kept in the error message.
pub const ERROR_SNIPPET_CHARS: usize = 100;
