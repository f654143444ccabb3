pub mod cursor;
pub mod namespaces;
pub mod node;
pub mod parse;
pub mod serialize;

pub use cursor::{infer_element_path, line_of_offset};
pub use namespaces::{NamespaceMap, extract_namespaces};
pub use node::{NodeKind, XmlNode};
pub use parse::{ParseDiagnostic, ParserIssue, XmlDocument, extract_issues};
pub use serialize::{format_document, serialize_node};
