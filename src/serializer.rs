//! Serializer for writing a [`Model`] back to the text notation.
//!
//! Only what the notation can carry survives: a link keeps its
//! association-side cardinality, and `reversed`, descriptions and CIF
//! constraints are JSON-only.

use crate::model::{Association, Attribute, Cardinality, Entity, LinkCardinality, Model};
use std::fmt::Write;

/// Serialize a Model to notation text.
pub fn serialize(model: &Model) -> String {
    let mut output = String::new();

    for entity in &model.entities {
        serialize_entity(&mut output, entity);
    }

    let associations = association_order(model);
    if !associations.is_empty() {
        output.push('\n');
        for name in associations {
            serialize_association(&mut output, model, name);
        }
    }

    if !model.inheritance_links.is_empty() {
        output.push('\n');
        for link in &model.inheritance_links {
            let _ = writeln!(output, "{} extends {}", link.child, link.parent);
        }
    }

    output
}

/// Declared associations first, then names only seen on links.
fn association_order(model: &Model) -> Vec<&str> {
    let mut names: Vec<&str> = model.associations.iter().map(|a| a.name.as_str()).collect();
    for link in &model.association_links {
        if !names.contains(&link.association.as_str()) {
            names.push(&link.association);
        }
    }
    names
}

fn serialize_entity(output: &mut String, entity: &Entity) {
    output.push_str(&entity.name);
    if !entity.attributes.is_empty() {
        output.push_str(": ");
        serialize_attributes(output, &entity.attributes);
    }
    output.push('\n');
}

fn serialize_association(output: &mut String, model: &Model, name: &str) {
    let links: Vec<_> = model.links_of(name).collect();
    let attributes = model
        .association(name)
        .map(|a: &Association| a.attributes.as_slice())
        .unwrap_or_default();

    // A bare name would read back as an entity.
    if links.is_empty() {
        let _ = writeln!(output, "# association {} has no links", name);
        return;
    }

    output.push_str(name);
    for link in links {
        match compact_card(&link.card_assoc) {
            Some(card) => {
                let _ = write!(output, ", {} {}", card, link.entity);
            }
            None => {
                let _ = write!(output, ", {}", link.entity);
            }
        }
    }
    if !attributes.is_empty() {
        output.push_str(": ");
        serialize_attributes(output, attributes);
    }
    output.push('\n');
}

fn serialize_attributes(output: &mut String, attributes: &[Attribute]) {
    for (i, attr) in attributes.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        output.push_str(&attr.name);
        if !attr.typ.trim().is_empty() {
            output.push(' ');
            output.push_str(attr.typ.trim());
        }
        if attr.is_primary_key {
            output.push_str(" pk");
        }
        if attr.is_unique {
            output.push_str(" unique");
        }
        if attr.is_not_null {
            output.push_str(" not null");
        }
        if let Some(value) = &attr.default_value {
            let _ = write!(output, " default {}", value);
        }
    }
}

/// `01`, `11`, `0N`, `1N`; unknown cardinalities are left out.
fn compact_card(card: &LinkCardinality) -> Option<&'static str> {
    card.known().map(|c| match c {
        Cardinality::ZeroOne => "01",
        Cardinality::OneOne => "11",
        Cardinality::ZeroMany => "0N",
        Cardinality::OneMany => "1N",
    })
}
