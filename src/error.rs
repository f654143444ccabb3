use thiserror::Error;

use xmlbench_doc::ParseDiagnostic;
use xmlbench_xpath1::XPathError;
use xmlbench_xslt::XsltError;

/// A comprehensive error type for the workbench operations.
#[derive(Error, Debug)]
pub enum WorkbenchError {
    #[error("{0}")]
    Parse(#[from] ParseDiagnostic),

    #[error("XPath error: {0}")]
    XPath(#[from] XPathError),

    #[error("Transform error: {0}")]
    Xslt(#[from] XsltError),

    /// An operation was invoked without the state it needs, e.g. a
    /// validation with no schema loaded.
    #[error("{0}")]
    MissingInput(String),
}
