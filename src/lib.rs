//! ctxcat - bundle a source tree into a single Markdown file for LLM context.
//!
//! ctxcat walks a directory tree, selects text and code files by extension,
//! and concatenates their contents into one Markdown document with per-file
//! path markers and language-tagged fenced code blocks.
//!
//! # Quick Start
//!
//! ```no_run
//! use ctxcat::bundle::Bundler;
//!
//! let report = Bundler::new("./my-project")
//!     .write_to("project_context.md".as_ref())
//!     .unwrap();
//!
//! println!("{} files bundled, {} skipped", report.included, report.skipped);
//! ```
//!
//! # Modules
//!
//! - [`filter`] - Include/exclude rules and the language tag table
//! - [`walker`] - Deterministic directory traversal
//! - [`decode`] - Encoding recovery (UTF-8, charset detection, lossy fallback)
//! - [`emitter`] - Markdown section formatting
//! - [`bundle`] - Run orchestration and reporting

pub mod filter;
pub mod errors;
pub mod walker;
pub mod decode;
pub mod emitter;
pub mod bundle;

// Re-export key types at crate root for convenience
pub use bundle::{BundleReport, Bundler};
pub use decode::{DecodeError, DecodedText, EncodingResolver};
pub use emitter::EmitError;
pub use errors::{exit_code, BundleError};
pub use filter::{FilterResult, RuleSet};
pub use walker::{Candidate, WalkError};
