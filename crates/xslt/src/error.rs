use thiserror::Error;
use xmlbench_xpath1::XPathError;

#[derive(Error, Debug)]
pub enum XsltError {
    #[error("No template with match=\"/\" was found in the stylesheet")]
    UnsupportedStylesheet,

    #[error("<xsl:{instruction}> is missing its required '{attribute}' attribute")]
    MissingAttribute {
        instruction: String,
        attribute: String,
    },

    #[error("XPath evaluation error: {0}")]
    XPath(#[from] XPathError),
}
