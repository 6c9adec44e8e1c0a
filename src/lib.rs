//! Codec for the Android resource String Pool chunk.
//!
//! A string pool is the interning structure backing every symbolic name and
//! string constant in a compiled `resources.arsc` file and in binary XML
//! resources: a count-prefixed offset table followed by a contiguous payload
//! of variable-length, encoding-polymorphic entries (UTF-8 or UTF-16LE, each
//! with a short- and long-form length prefix). This crate parses that chunk,
//! offers random-access and linear-search lookup over it, and re-encodes it
//! under two rewrite operations used by a resource-renaming tool: full
//! replacement of a spec-name pool's table, and selective index-keyed
//! substitution of a table-name pool (which may carry styles) that leaves
//! every other entry byte-identical.
//!
//! Positioning a reader at the chunk, deciding which indices map to which new
//! names, and file I/O/CLI concerns are left to the caller — this crate only
//! reads and writes the chunk itself, via plain `std::io::Read`/`Write`.

mod error;
mod io;
mod length;
mod pool;
mod rewrite;

pub use error::{Error, Result};
pub use io::{CHUNK_NULL_TYPE, CHUNK_STRINGPOOL_TYPE};
pub use length::Encoding;
pub use pool::{DecodeOptions, StringPool, HEADER_SIZE, UTF8_FLAG};
pub use rewrite::{read, rewrite_spec_names, rewrite_table_names, write_all};
