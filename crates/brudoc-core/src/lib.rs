//! Extract documentation from an OpenAPI 3.0 document and write it into the
//! `docs` blocks of a Bruno request collection.

pub mod backup;
pub mod bru;
pub mod config;
pub mod error;
pub mod files;
pub mod ir;
pub mod matcher;
pub mod merge;
pub mod parse;
pub mod pipeline;
pub mod render;
pub mod transform;

pub use pipeline::{DocReport, RevertReport, run_doc, run_revert};
