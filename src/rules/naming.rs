//! Names and attribute types.

use std::collections::HashSet;

use super::{Diagnostic, Target};
use crate::model::{Attribute, Model};

pub(super) fn check(model: &Model, out: &mut Vec<Diagnostic>) {
    if model.entities.is_empty() {
        out.push(Diagnostic::error(
            "empty-model",
            "the model must contain at least one entity",
        ));
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for entity in &model.entities {
        let name = entity.name.trim();
        if name.is_empty() {
            out.push(Diagnostic::error(
                "empty-entity-name",
                "an entity must have a non-empty name",
            ));
            continue;
        }
        if !seen.insert(name) && reported.insert(name) {
            out.push(
                Diagnostic::error(
                    "duplicate-entity",
                    format!("entity '{}' is declared more than once", name),
                )
                .on(Target::entity(name)),
            );
        }
        if entity.attributes.is_empty() {
            out.push(
                Diagnostic::warning(
                    "entity-without-attributes",
                    format!("entity '{}' has no attributes", name),
                )
                .on(Target::entity(name)),
            );
        }
        if !follows_convention(name) {
            out.push(
                Diagnostic::warning(
                    "naming-convention",
                    format!(
                        "entity name '{}' should start with a letter and use only letters, \
                         digits, '_' or '-'",
                        name
                    ),
                )
                .on(Target::entity(name)),
            );
        }
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for association in &model.associations {
        let name = association.name.trim();
        if name.is_empty() {
            out.push(Diagnostic::error(
                "empty-association-name",
                "an association must have a non-empty name",
            ));
            continue;
        }
        if !seen.insert(name) && reported.insert(name) {
            out.push(
                Diagnostic::error(
                    "duplicate-association",
                    format!("association '{}' is declared more than once", name),
                )
                .on(Target::association(name)),
            );
        }
    }

    for entity in &model.entities {
        check_attributes(entity.name.trim(), "entity", &entity.attributes, out);
    }
    for association in &model.associations {
        check_attributes(association.name.trim(), "association", &association.attributes, out);
    }
}

/// Starts with a letter; letters, digits, `_` and `-` after that.
fn follows_convention(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn check_attributes(
    owner: &str,
    owner_kind: &str,
    attributes: &[Attribute],
    out: &mut Vec<Diagnostic>,
) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for attr in attributes {
        let name = attr.name.trim();
        if name.is_empty() {
            out.push(
                Diagnostic::error(
                    "empty-attribute-name",
                    format!("{} '{}' has an attribute without a name", owner_kind, owner),
                )
                .on(Target::attribute(owner, "")),
            );
            continue;
        }

        if !seen.insert(name) && reported.insert(name) {
            out.push(
                Diagnostic::error(
                    "duplicate-attribute",
                    format!(
                        "attribute '{}' appears more than once in {} '{}'",
                        name, owner_kind, owner
                    ),
                )
                .on(Target::attribute(owner, name)),
            );
        }

        if attr.typ.trim().is_empty() {
            out.push(
                Diagnostic::error(
                    "missing-attribute-type",
                    format!("attribute '{}' of {} '{}' has no type", name, owner_kind, owner),
                )
                .on(Target::attribute(owner, name)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{client_produit, codes};
    use super::super::{validate, Severity};
    use super::*;
    use crate::model::{Association, Entity};

    fn run(model: &Model) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        check(model, &mut out);
        out
    }

    #[test]
    fn test_duplicate_entity_reported_once() {
        let mut model = client_produit();
        model.entities.push(Entity::new("Client", vec![Attribute::new("id", "INT")]));
        model.entities.push(Entity::new("Client", vec![Attribute::new("id", "INT")]));
        let out = run(&model);
        assert_eq!(codes(&out), vec!["duplicate-entity"]);
        assert_eq!(out[0].target, Some(Target::entity("Client")));
    }

    #[test]
    fn test_duplicate_association() {
        let mut model = client_produit();
        model.associations.push(Association::new("Achete", vec![]));
        assert_eq!(codes(&run(&model)), vec!["duplicate-association"]);
    }

    #[test]
    fn test_blank_names() {
        let mut model = client_produit();
        model.entities.push(Entity::new("   ", vec![]));
        model.associations.push(Association::new("", vec![]));
        let out = run(&model);
        assert_eq!(codes(&out), vec!["empty-entity-name", "empty-association-name"]);
    }

    #[test]
    fn test_duplicate_attributes_not_deduped() {
        let mut model = client_produit();
        model.entities[0].attributes.push(Attribute::new("name", "TEXT"));
        model.entities[0].attributes.push(Attribute::new("id", "INT"));
        let out = run(&model);
        assert_eq!(codes(&out), vec!["duplicate-attribute", "duplicate-attribute"]);
        assert_eq!(out[0].target, Some(Target::attribute("Client", "name")));
        // The model itself is untouched.
        assert_eq!(model.entities[0].attributes.len(), 4);
    }

    #[test]
    fn test_missing_type_on_association_attribute() {
        let mut model = client_produit();
        model.associations[0].attributes.push(Attribute::new("quantite", "  "));
        let out = validate(&model);
        assert!(out.iter().any(|d| d.code == "missing-attribute-type"
            && d.target == Some(Target::attribute("Achete", "quantite"))));
    }

    #[test]
    fn test_empty_model_is_an_error() {
        let out = validate(&Model::default());
        assert_eq!(codes(&out), vec!["empty-model"]);
        assert!(out[0].is_error());
        assert_eq!(out[0].target, None);
    }

    #[test]
    fn test_entity_without_attributes_warns() {
        let mut model = client_produit();
        model.entities.push(Entity::new("Vide", vec![]));
        let out = run(&model);
        assert_eq!(codes(&out), vec!["entity-without-attributes"]);
        assert_eq!(out[0].severity, Severity::Warning);
        assert_eq!(out[0].target, Some(Target::entity("Vide")));
    }

    #[test]
    fn test_naming_convention() {
        assert!(follows_convention("Client"));
        assert!(follows_convention("Ligne_Commande-2"));
        assert!(follows_convention("Employé"));
        assert!(!follows_convention("2024Vente"));
        assert!(!follows_convention("_Client"));
        assert!(!follows_convention("Prix TTC"));
        assert!(!follows_convention("@Var"));

        let mut model = client_produit();
        model.entities[0].name = "2024Vente".to_string();
        let out = run(&model);
        assert_eq!(codes(&out), vec!["naming-convention"]);
        assert_eq!(out[0].severity, Severity::Warning);
        assert!(out[0].message.contains("2024Vente"));
    }

    #[test]
    fn test_same_attribute_name_in_different_owners_is_fine() {
        let model = client_produit();
        assert!(run(&model).is_empty());
    }
}
