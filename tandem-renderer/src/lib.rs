//! # tandem-renderer
//!
//! Content transformer: rewrites a document between the context, rule and
//! workflow dialects, and stamps the result.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tandem_core::SyncStamp;
//! use tandem_renderer::Transformer;
//!
//! fn to_rule(context: &str, existing_rule: Option<&str>) -> Option<String> {
//!     let transformer = Transformer::new().ok()?;
//!     let stamp = SyncStamp::now("/work/app/CLAUDE.md");
//!     let merged = transformer.context_to_rule(context, &stamp, existing_rule);
//!     merged.success.then_some(merged.content)
//! }
//! ```

pub mod context;
pub mod convert;
pub mod engine;
pub mod error;
pub mod front_matter;
pub mod markup;
pub mod sections;

pub use context::ContextPart;
pub use convert::{Conversion, MergeResult, Transformer};
pub use engine::TemplateEngine;
pub use error::RenderError;
pub use front_matter::{parse_front_matter, strip_front_matter, FrontMatter, Trigger};
pub use markup::{adapt_body_markup, adapt_heading, Direction};
pub use sections::{decompose, recompose, Section};
