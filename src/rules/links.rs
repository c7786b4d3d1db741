//! Association links: cardinalities, endpoints, connectivity.

use std::collections::HashSet;

use super::{Diagnostic, Target};
use crate::model::{LinkCardinality, Model};

const EXPECTED: &str = "expected 0,1 | 1,1 | 0,n | 1,n";

pub(super) fn check_cardinalities(model: &Model, out: &mut Vec<Diagnostic>) {
    for link in &model.association_links {
        let sides = [("entity", &link.card_entity), ("association", &link.card_assoc)];
        for (side, card) in sides {
            if let LinkCardinality::Unknown(raw) = card {
                out.push(
                    Diagnostic::error(
                        "invalid-cardinality",
                        format!(
                            "invalid {}-side cardinality '{}' on link {} - {} ({})",
                            side, raw, link.association, link.entity, EXPECTED
                        ),
                    )
                    .on(Target::association(link.association.trim())),
                );
            }
        }
    }
}

pub(super) fn check_endpoints(model: &Model, out: &mut Vec<Diagnostic>) {
    let entities: HashSet<&str> = model.entities.iter().map(|e| e.name.trim()).collect();
    let associations: HashSet<&str> = model.associations.iter().map(|a| a.name.trim()).collect();

    for link in &model.association_links {
        let association = link.association.trim();
        let entity = link.entity.trim();
        if !associations.contains(association) {
            out.push(
                Diagnostic::error(
                    "unknown-link-association",
                    format!("a link references unknown association '{}'", association),
                )
                .on(Target::association(association)),
            );
        }
        if !entities.contains(entity) {
            out.push(
                Diagnostic::error(
                    "unknown-link-entity",
                    format!("association '{}' references unknown entity '{}'", association, entity),
                )
                .on(Target::association(association)),
            );
        }
    }

    let mut seen = HashSet::new();
    for association in &model.associations {
        let name = association.name.trim();
        if name.is_empty() || !seen.insert(name) {
            continue;
        }
        match model.links_of(name).count() {
            0 => out.push(
                Diagnostic::error(
                    "association-without-links",
                    format!("association '{}' does not link any entity", name),
                )
                .on(Target::association(name)),
            ),
            1 => out.push(
                Diagnostic::warning(
                    "association-single-link",
                    format!(
                        "association '{}' links a single entity and is left out of \
                         the logical model",
                        name
                    ),
                )
                .on(Target::association(name)),
            ),
            _ => {}
        }
    }
}

pub(super) fn check_connectivity(model: &Model, out: &mut Vec<Diagnostic>) {
    let linked: HashSet<&str> = model
        .association_links
        .iter()
        .map(|l| l.entity.trim())
        .collect();

    let mut seen = HashSet::new();
    for entity in &model.entities {
        let name = entity.name.trim();
        if name.is_empty() || !seen.insert(name) {
            continue;
        }
        if !linked.contains(name) {
            out.push(
                Diagnostic::error(
                    "orphan-entity",
                    format!("entity '{}' must take part in at least one association", name),
                )
                .on(Target::entity(name)),
            );
        }
    }
}

pub(super) fn check_primary_keys(model: &Model, out: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    for entity in &model.entities {
        let name = entity.name.trim();
        if name.is_empty() || !seen.insert(name) {
            continue;
        }
        if !entity.has_primary_key() && !model.is_inheritance_child(name) {
            out.push(
                Diagnostic::warning(
                    "missing-primary-key",
                    format!(
                        "entity '{}' has no identifier; a surrogate key will be generated",
                        name
                    ),
                )
                .on(Target::entity(name)),
            );
        }
    }
}
