//! ragdb-vector
//!
//! LanceDB-backed persistence for embedding records: Arrow schema, table
//! housekeeping, batched append-only writes, and cosine nearest-neighbor
//! search returning ranked snippets.

pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use search::SnippetSearch;
pub use writer::SnippetWriter;
