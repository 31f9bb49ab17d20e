//! Validation of generated documents: the embedded JSON schema first, then
//! graph checks the schema language cannot express.

use std::{
    collections::{HashMap, HashSet},
    sync::OnceLock,
};

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::{
    error::{ConvertError, Result},
    xscp::XscpDocument,
};

static DOCUMENT_SCHEMA: OnceLock<JSONSchema> = OnceLock::new();

fn compile_schema(source: &'static str) -> JSONSchema {
    let schema_value: Value =
        serde_json::from_str(source).expect("embedded schema should parse as JSON");
    JSONSchema::options()
        .with_draft(Draft::Draft202012)
        .compile(&schema_value)
        .expect("embedded schema should compile")
}

fn document_schema() -> &'static JSONSchema {
    DOCUMENT_SCHEMA
        .get_or_init(|| compile_schema(include_str!("../schema/xscp_document.schema.json")))
}

/// Validates a serialized document against the embedded schema.
pub fn validate_document_value(value: &Value) -> Result<()> {
    if let Err(errors) = document_schema().validate(value) {
        let messages: Vec<String> = errors
            .map(|err| format!("{}: {}", err.instance_path, err))
            .collect();
        return Err(ConvertError::Schema(messages.join("\n")));
    }
    Ok(())
}

/// Schema validation plus reference integrity: root first, every child and
/// style reference resolves, ids unique, style names unique.
pub fn validate_document(document: &XscpDocument) -> Result<()> {
    let value = serde_json::to_value(document)?;
    validate_document_value(&value)?;
    check_references(document)
}

fn check_references(document: &XscpDocument) -> Result<()> {
    let nodes = &document.payload.nodes;
    let styles = &document.payload.styles;

    let mut node_ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !node_ids.insert(node.id()) {
            return Err(ConvertError::DuplicateId(node.id().to_string()));
        }
    }
    let mut style_ids: HashSet<&str> = HashSet::with_capacity(styles.len());
    let mut style_names: HashMap<&str, &str> = HashMap::with_capacity(styles.len());
    for style in styles {
        if !style_ids.insert(style.id.as_str()) {
            return Err(ConvertError::DuplicateId(style.id.clone()));
        }
        if style_names.insert(style.name.as_str(), style.id.as_str()).is_some() {
            return Err(ConvertError::DuplicateId(style.name.clone()));
        }
    }

    let mut referenced: HashSet<&str> = HashSet::new();
    for node in nodes {
        for child in node.children() {
            if !node_ids.contains(child.as_str()) {
                return Err(ConvertError::DanglingChild {
                    parent: node.id().to_string(),
                    child: child.clone(),
                });
            }
            referenced.insert(child.as_str());
        }
        for class in node.classes() {
            if !style_ids.contains(class.as_str()) {
                return Err(ConvertError::DanglingStyle {
                    node: node.id().to_string(),
                    style: class.clone(),
                });
            }
        }
    }

    // The root is the only node nobody references, and it must come first.
    match nodes.first() {
        Some(root) if !referenced.contains(root.id()) => {}
        _ => return Err(ConvertError::RootNotFirst),
    }
    if nodes.iter().skip(1).any(|node| !referenced.contains(node.id())) {
        return Err(ConvertError::RootNotFirst);
    }
    Ok(())
}
