//! Conversion of standalone HTML and CSS into the `@webflow/XscpData`
//! clipboard schema.

pub mod css;
pub mod diagnostics;
pub mod error;
pub mod html;
pub mod schema;
pub mod xscp;

pub use error::{ConvertError, Result};
pub use html::{ConvertOptions, DEFAULT_ASSET_PLACEHOLDER, convert, convert_with_options};
pub use schema::{validate_document, validate_document_value};
pub use xscp::{Node, Style, XSCP_TYPE, XscpDocument};
