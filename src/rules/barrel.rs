//! Attribute-bearing associations.
//!
//! Only an association managing a correspondence table (every link "many"
//! on both ends, at least two links) may carry attributes. Independently, a
//! `1,1` association-side cardinality is always forbidden on such an
//! association. Both violations are reported when both apply.

use std::collections::HashSet;

use super::{Diagnostic, Target};
use crate::model::{AssociationLink, Cardinality, Model};

pub(super) fn check(model: &Model, out: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    for association in &model.associations {
        let name = association.name.trim();
        if name.is_empty() || !seen.insert(name) || !association.has_attributes() {
            continue;
        }
        let links: Vec<&AssociationLink> = model.links_of(name).collect();

        if !is_correspondence_table(&links) {
            out.push(
                Diagnostic::error(
                    "attributes-require-correspondence-table",
                    format!(
                        "association '{}' carries attributes but is not a correspondence table \
                         (needs at least two links, each 0,n or 1,n on both sides)",
                        name
                    ),
                )
                .on(Target::association(name)),
            );
        }

        if links.iter().any(|l| l.card_assoc.is(Cardinality::OneOne)) {
            out.push(
                Diagnostic::error(
                    "attributes-forbid-one-one",
                    format!(
                        "association '{}' carries attributes, so no link may have \
                         a 1,1 association-side cardinality",
                        name
                    ),
                )
                .on(Target::association(name)),
            );
        }
    }
}

pub fn is_correspondence_table(links: &[&AssociationLink]) -> bool {
    let many = |card: Option<Cardinality>| card.is_some_and(Cardinality::is_many);
    links.len() >= 2
        && links
            .iter()
            .all(|l| many(l.card_entity.known()) && many(l.card_assoc.known()))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{client_produit, codes};
    use super::super::validate;
    use super::*;
    use crate::model::Attribute;

    fn with_attribute(cards: [&str; 2]) -> Model {
        let mut model = client_produit();
        model.associations[0]
            .attributes
            .push(Attribute::new("quantite", "INT"));
        model.association_links = vec![
            AssociationLink::new("Achete", "Client", cards[0]),
            AssociationLink::new("Achete", "Produit", cards[1]),
        ];
        model
    }

    fn run(model: &Model) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        check(model, &mut out);
        out
    }

    #[test]
    fn test_many_many_with_attributes_is_legal() {
        assert!(run(&with_attribute(["1,n", "0,n"])).is_empty());
    }

    #[test]
    fn test_dual_report_on_one_one() {
        let out = run(&with_attribute(["1,1", "1,1"]));
        assert_eq!(
            codes(&out),
            vec!["attributes-require-correspondence-table", "attributes-forbid-one-one"]
        );
        assert!(out.iter().all(|d| d.target == Some(Target::association("Achete"))));
    }

    #[test]
    fn test_dual_report_survives_full_validation() {
        let diagnostics = validate(&with_attribute(["1,1", "1,1"]));
        let codes = codes(&diagnostics);
        assert!(codes.contains(&"attributes-require-correspondence-table"));
        assert!(codes.contains(&"attributes-forbid-one-one"));
    }

    #[test]
    fn test_one_many_with_attributes_single_report() {
        let out = run(&with_attribute(["0,1", "0,n"]));
        assert_eq!(codes(&out), vec!["attributes-require-correspondence-table"]);
    }

    #[test]
    fn test_entity_side_one_breaks_correspondence() {
        let mut model = with_attribute(["0,n", "0,n"]);
        model.association_links[0] = AssociationLink::with_sides("Achete", "Client", "1,1", "0,n");
        let out = run(&model);
        assert_eq!(codes(&out), vec!["attributes-require-correspondence-table"]);
    }

    #[test]
    fn test_single_link_is_not_correspondence() {
        let mut model = with_attribute(["0,n", "0,n"]);
        model.association_links.pop();
        let out = run(&model);
        assert_eq!(codes(&out), vec!["attributes-require-correspondence-table"]);
    }

    #[test]
    fn test_association_without_attributes_ignored() {
        let model = client_produit();
        assert!(run(&model).is_empty());
    }
}
