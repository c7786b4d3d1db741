//! Functional integrity constraints (CIF).

use super::{Diagnostic, Target};
use crate::model::{CifConstraint, CifKind, Model};

pub(super) fn check(model: &Model, out: &mut Vec<Diagnostic>) {
    for constraint in model.cif_constraints.iter().filter(|c| c.is_enabled) {
        let name = constraint.name.trim();
        if name.is_empty() {
            out.push(Diagnostic::error(
                "cif-empty-name",
                format!("a {} constraint must have a non-empty name", constraint.kind),
            ));
        }
        check_references(model, constraint, name, out);
        check_shape(constraint, name, out);
    }
}

fn check_references(
    model: &Model,
    constraint: &CifConstraint,
    name: &str,
    out: &mut Vec<Diagnostic>,
) {
    let mut unknown = |kind: &str, value: &str| {
        out.push(
            Diagnostic::error(
                "cif-unknown-reference",
                format!("constraint '{}' references unknown {} '{}'", name, kind, value),
            )
            .on(Target::constraint(name)),
        );
    };

    for entity in &constraint.entities {
        if model.entity(entity.trim()).is_none() {
            unknown("entity", entity.trim());
        }
    }
    for association in &constraint.associations {
        if model.association(association.trim()).is_none() {
            unknown("association", association.trim());
        }
    }
    for attribute in &constraint.attributes {
        if !attribute_exists(model, attribute.trim()) {
            unknown("attribute", attribute.trim());
        }
    }
}

/// `Owner.attr` must name an attribute of that entity or association; a
/// bare name may match any attribute of the model.
fn attribute_exists(model: &Model, reference: &str) -> bool {
    let owners = model
        .entities
        .iter()
        .map(|e| (e.name.trim(), &e.attributes))
        .chain(model.associations.iter().map(|a| (a.name.trim(), &a.attributes)));

    match reference.split_once('.') {
        Some((owner, attr)) => owners
            .filter(|(name, _)| *name == owner.trim())
            .any(|(_, attrs)| attrs.iter().any(|a| a.name.trim() == attr.trim())),
        None => owners
            .flat_map(|(_, attrs)| attrs.iter())
            .any(|a| a.name.trim() == reference.trim()),
    }
}

fn check_shape(constraint: &CifConstraint, name: &str, out: &mut Vec<Diagnostic>) {
    let problem = match constraint.kind {
        CifKind::InterAssociation | CifKind::Exclusion if constraint.associations.len() < 2 => {
            Some("needs at least two associations")
        }
        CifKind::Functional if constraint.associations.is_empty() => {
            Some("needs at least one association")
        }
        CifKind::Unique if constraint.attributes.is_empty() => Some("needs at least one attribute"),
        _ => None,
    };

    if let Some(problem) = problem {
        out.push(
            Diagnostic::error(
                "cif-shape",
                format!("{} constraint '{}' {}", constraint.kind, name, problem),
            )
            .on(Target::constraint(name)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{client_produit, codes};
    use super::*;
    use crate::model::{Association, AssociationLink};

    fn constraint(kind: CifKind) -> CifConstraint {
        CifConstraint {
            name: "c1".into(),
            kind,
            description: None,
            entities: vec![],
            associations: vec![],
            attributes: vec![],
            is_enabled: true,
        }
    }

    fn run(model: &Model) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        check(model, &mut out);
        out
    }

    #[test]
    fn test_inter_association_needs_two() {
        let mut model = client_produit();
        let mut c = constraint(CifKind::InterAssociation);
        c.associations = vec!["Achete".into()];
        model.cif_constraints.push(c);
        let out = run(&model);
        assert_eq!(codes(&out), vec!["cif-shape"]);
        assert_eq!(out[0].target, Some(Target::constraint("c1")));
        assert!(out[0].message.contains("inter_association"));
    }

    #[test]
    fn test_exclusion_with_two_associations_is_fine() {
        let mut model = client_produit();
        model.associations.push(Association::new("Retourne", vec![]));
        model.association_links.push(AssociationLink::new("Retourne", "Client", "0,n"));
        model.association_links.push(AssociationLink::new("Retourne", "Produit", "0,n"));
        let mut c = constraint(CifKind::Exclusion);
        c.associations = vec!["Achete".into(), "Retourne".into()];
        model.cif_constraints.push(c);
        assert!(run(&model).is_empty());
    }

    #[test]
    fn test_unique_needs_attribute() {
        let mut model = client_produit();
        model.cif_constraints.push(constraint(CifKind::Unique));
        assert_eq!(codes(&run(&model)), vec!["cif-shape"]);
    }

    #[test]
    fn test_attribute_references() {
        let mut model = client_produit();
        let mut c = constraint(CifKind::Unique);
        c.attributes = vec!["Client.name".into(), "nom".into(), "Client.nom".into(), "prix".into()];
        model.cif_constraints.push(c);
        let out = run(&model);
        assert_eq!(codes(&out), vec!["cif-unknown-reference", "cif-unknown-reference"]);
        assert!(out[0].message.contains("'Client.nom'"));
        assert!(out[1].message.contains("'prix'"));
    }

    #[test]
    fn test_padded_names_still_resolve() {
        let mut model = client_produit();
        model.entities[0].name = " Client ".into();
        model.entities[0].attributes[1].name = "name ".into();
        model.associations[0].name = "Achete  ".into();
        let mut c = constraint(CifKind::Functional);
        c.entities = vec!["Client".into()];
        c.associations = vec!["Achete".into()];
        c.attributes = vec!["Client.name".into(), " name".into()];
        model.cif_constraints.push(c);
        assert!(run(&model).is_empty());
    }

    #[test]
    fn test_unknown_entity_and_association() {
        let mut model = client_produit();
        let mut c = constraint(CifKind::Functional);
        c.entities = vec!["Fournisseur".into()];
        c.associations = vec!["Livre".into()];
        model.cif_constraints.push(c);
        let out = run(&model);
        assert_eq!(codes(&out), vec!["cif-unknown-reference", "cif-unknown-reference"]);
    }

    #[test]
    fn test_empty_name() {
        let mut model = client_produit();
        let mut c = constraint(CifKind::Functional);
        c.name = " ".into();
        c.associations = vec!["Achete".into()];
        model.cif_constraints.push(c);
        assert_eq!(codes(&run(&model)), vec!["cif-empty-name"]);
    }

    #[test]
    fn test_disabled_constraint_skipped() {
        let mut model = client_produit();
        let mut c = constraint(CifKind::Exclusion);
        c.is_enabled = false;
        model.cif_constraints.push(c);
        assert!(run(&model).is_empty());
    }
}
