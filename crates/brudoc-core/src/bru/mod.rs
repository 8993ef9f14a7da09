//! The subset of Bruno's `.bru` request format the tool reads: top-level
//! named blocks and the `key: value` lines of the `meta` block.

pub mod blocks;
pub mod meta;

pub use blocks::{Block, scan};
pub use meta::{WorkspaceFileMeta, read_file_meta};

/// Extension of request files.
pub const REQUEST_EXTENSION: &str = "bru";

/// Name of the block the generated documentation lives in.
pub const DOCS_BLOCK: &str = "docs";
