//! Restricted XSLT interpreter: a single `match="/"` template rendered
//! as plain text, with execution counters for diagnosing silent
//! no-match transforms.

pub mod error;
pub mod interpreter;

pub use error::XsltError;
pub use interpreter::{RenderStats, XsltRenderResult, render};
