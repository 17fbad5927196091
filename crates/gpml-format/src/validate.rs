//! Table-driven strict validation.
//!
//! Validation checks a parsed document against the dialect's attribute
//! table: the root element and namespace, that every attribute present is
//! declared, that every required attribute is present, and that numeric
//! attributes parse. The tables are generated from the same schema
//! definitions strict consumers validate against, so the checks share their
//! source of truth.

use std::collections::HashSet;

use roxmltree::{Document, Node};

use crate::dialect::DialectId;
use crate::error::ConversionError;
use crate::schema::{AttrType, AttributeSchema};

/// Element tags that keep a flat schema path at any nesting depth.
const FLAT_TAGS: &[&str] = &["Comment", "Attribute", "PublicationXref"];

/// Element tags without any attributes of their own.
const ATTRIBUTELESS_TAGS: &[&str] = &["BiopaxRef"];

/// Validates a parsed document against a dialect's schema table.
pub fn validate_document(doc: &Document, dialect: DialectId) -> Result<(), ConversionError> {
    let schema = dialect.schema();
    let root = doc.root_element();
    if root.tag_name().name() != "Pathway" {
        return Err(ConversionError::SchemaValidation {
            element: root.tag_name().name().to_owned(),
            reason: "root element must be `Pathway`".to_owned(),
        });
    }
    if root.tag_name().namespace() != Some(dialect.namespace()) {
        return Err(ConversionError::SchemaValidation {
            element: "Pathway".to_owned(),
            reason: format!(
                "root namespace does not match `{}`",
                dialect.namespace()
            ),
        });
    }

    let known_paths: HashSet<&'static str> = schema.element_paths().collect();
    validate_element(root, "Pathway", schema, &known_paths)
}

fn child_path(parent_path: &str, tag: &str) -> String {
    if FLAT_TAGS.contains(&tag) {
        return tag.to_owned();
    }
    if parent_path == "Pathway" && tag != "Graphics" {
        return tag.to_owned();
    }
    format!("{parent_path}.{tag}")
}

fn validate_element(
    node: Node,
    path: &str,
    schema: &AttributeSchema,
    known_paths: &HashSet<&'static str>,
) -> Result<(), ConversionError> {
    // the BioPAX payload is opaque and follows its own schemas
    if node.tag_name().name() == "Biopax" {
        return Ok(());
    }

    for attr in node.attributes() {
        if !schema.contains(path, attr.name()) {
            return Err(ConversionError::SchemaValidation {
                element: path.to_owned(),
                reason: format!("undeclared attribute `{}`", attr.name()),
            });
        }
        let spec = schema.spec(path, attr.name())?;
        let numeric_ok = match spec.ty {
            AttrType::Float | AttrType::Dimension => attr.value().parse::<f64>().is_ok(),
            AttrType::Integer => attr.value().parse::<i64>().is_ok(),
            AttrType::NonNegInteger => attr.value().parse::<u64>().is_ok(),
            _ => true,
        };
        if !numeric_ok {
            return Err(ConversionError::SchemaValidation {
                element: path.to_owned(),
                reason: format!(
                    "attribute `{}`: `{}` is not a valid number",
                    attr.name(),
                    attr.value()
                ),
            });
        }
    }

    for (name, spec) in schema.entries_for(path) {
        if spec.required && node.attribute(name).is_none() {
            return Err(ConversionError::SchemaValidation {
                element: path.to_owned(),
                reason: format!("missing required attribute `{name}`"),
            });
        }
    }

    for c in node.children().filter(Node::is_element) {
        let tag = c.tag_name().name();
        let c_path = child_path(path, tag);
        if tag != "Biopax"
            && !ATTRIBUTELESS_TAGS.contains(&tag)
            && !known_paths.contains(c_path.as_str())
        {
            return Err(ConversionError::SchemaValidation {
                element: path.to_owned(),
                reason: format!("unexpected element `{tag}`"),
            });
        }
        validate_element(c, &c_path, schema, known_paths)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(xml: &str, dialect: DialectId) -> Result<(), ConversionError> {
        let doc = Document::parse(xml).unwrap();
        validate_document(&doc, dialect)
    }

    #[test]
    fn test_valid_minimal_document() {
        let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="p">
            <Graphics BoardWidth="100.0" BoardHeight="100.0" />
        </Pathway>"#;
        validate(xml, DialectId::Gpml2013a).unwrap();
    }

    #[test]
    fn test_wrong_namespace_fails() {
        let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2008a" Name="p">
            <Graphics BoardWidth="100.0" BoardHeight="100.0" />
        </Pathway>"#;
        let err = validate(xml, DialectId::Gpml2013a).unwrap_err();
        assert!(matches!(err, ConversionError::SchemaValidation { .. }));
    }

    #[test]
    fn test_undeclared_attribute_fails() {
        let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="p" Frobnicate="yes">
            <Graphics BoardWidth="100.0" BoardHeight="100.0" />
        </Pathway>"#;
        let err = validate(xml, DialectId::Gpml2013a).unwrap_err();
        assert!(err.to_string().contains("Frobnicate"));
    }

    #[test]
    fn test_missing_required_attribute_fails() {
        let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="p">
            <Graphics BoardWidth="100.0" />
        </Pathway>"#;
        let err = validate(xml, DialectId::Gpml2013a).unwrap_err();
        assert!(err.to_string().contains("BoardHeight"));
    }

    #[test]
    fn test_bad_number_fails() {
        let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="p">
            <Graphics BoardWidth="wide" BoardHeight="100.0" />
        </Pathway>"#;
        let err = validate(xml, DialectId::Gpml2013a).unwrap_err();
        assert!(err.to_string().contains("wide"));
    }

    #[test]
    fn test_unexpected_element_fails() {
        let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="p">
            <Graphics BoardWidth="100.0" BoardHeight="100.0" />
            <Wormhole />
        </Pathway>"#;
        let err = validate(xml, DialectId::Gpml2013a).unwrap_err();
        assert!(err.to_string().contains("Wormhole"));
    }

    #[test]
    fn test_biopax_subtree_is_opaque() {
        let xml = r#"<Pathway xmlns="http://pathvisio.org/GPML/2013a" Name="p">
            <Graphics BoardWidth="100.0" BoardHeight="100.0" />
            <Biopax><something xmlns="http://example.org" weird="true" /></Biopax>
        </Pathway>"#;
        validate(xml, DialectId::Gpml2013a).unwrap();
    }

    #[test]
    fn test_legacy_dialect_accepts_legacy_casing() {
        let xml = r#"<Pathway xmlns="http://genmapp.org/GPML/2008a" Name="p">
            <Graphics BoardWidth="100.0" BoardHeight="100.0" />
            <Line Style="Solid">
              <Graphics>
                <Point x="0.0" y="0.0" />
                <Point x="100.0" y="0.0" ArrowHead="Arrow" />
              </Graphics>
            </Line>
        </Pathway>"#;
        validate(xml, DialectId::Gpml2008a).unwrap();
    }
}
