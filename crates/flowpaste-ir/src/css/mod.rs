//! Stylesheet normalization and advanced-construct extraction.

pub mod extract;
pub mod normalize;
pub mod scanner;
pub mod shorthand;

pub use extract::{AdvancedCategory, AdvancedCss, is_relocated_selector};
pub use normalize::{NormalizedSheet, SelectorRule, normalize_selector, simple_class_name};
pub use shorthand::{expand_declaration, is_opaque_value, wrap_raw};
