//! Relation and inheritance cycles.

use std::collections::HashSet;
use std::fmt;

use super::{Diagnostic, Target};
use crate::graph::Graph;
use crate::model::Model;

/// Node of the entity/association graph. Entities and associations live in
/// separate namespaces, so an entity and an association may share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum RelationNode<'a> {
    Entity(&'a str),
    Association(&'a str),
}

impl RelationNode<'_> {
    fn target(&self) -> Target {
        match self {
            Self::Entity(name) => Target::entity(name),
            Self::Association(name) => Target::association(name),
        }
    }
}

impl fmt::Display for RelationNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(name) | Self::Association(name) => f.write_str(name),
        }
    }
}

fn format_path<T: fmt::Display>(path: &[T]) -> String {
    let mut parts: Vec<String> = path.iter().map(|n| n.to_string()).collect();
    if let Some(first) = parts.first().cloned() {
        parts.push(first);
    }
    parts.join(" -> ")
}

pub(super) fn check_relations(model: &Model, out: &mut Vec<Diagnostic>) {
    let mut graph = Graph::undirected();
    for entity in &model.entities {
        graph.add_node(RelationNode::Entity(entity.name.trim()));
    }
    for association in &model.associations {
        graph.add_node(RelationNode::Association(association.name.trim()));
    }
    for link in &model.association_links {
        graph.add_edge(
            RelationNode::Association(link.association.trim()),
            RelationNode::Entity(link.entity.trim()),
        );
    }

    if let Some(cycle) = graph.find_cycle() {
        let mut diagnostic = Diagnostic::warning(
            "relation-cycle",
            format!("relation cycle: {}", format_path(&cycle)),
        );
        if let Some(first) = cycle.first() {
            diagnostic = diagnostic.on(first.target());
        }
        out.push(diagnostic);
    }
}

pub(super) fn check_inheritance(model: &Model, out: &mut Vec<Diagnostic>) {
    let entities: HashSet<&str> = model.entities.iter().map(|e| e.name.trim()).collect();
    let mut graph = Graph::directed();

    for link in &model.inheritance_links {
        let child = link.child.trim();
        let parent = link.parent.trim();
        for name in [child, parent] {
            if !entities.contains(name) {
                out.push(
                    Diagnostic::error(
                        "unknown-inheritance-entity",
                        format!(
                            "inheritance link {} -> {} references unknown entity '{}'",
                            child, parent, name
                        ),
                    )
                    .on(Target::entity(name)),
                );
            }
        }
        graph.add_edge(child, parent);
    }

    if let Some(cycle) = graph.find_cycle() {
        out.push(
            Diagnostic::error(
                "inheritance-cycle",
                format!("inheritance cycle: {}", format_path(&cycle)),
            )
            .on(Target::entity(cycle[0])),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{client_produit, codes};
    use super::super::Severity;
    use super::*;
    use crate::model::{Association, AssociationLink, Attribute, Entity, InheritanceLink};

    fn entity(name: &str) -> Entity {
        Entity::new(name, vec![Attribute::new("id", "INT").primary_key()])
    }

    #[test]
    fn test_tree_has_no_relation_cycle() {
        let mut out = Vec::new();
        check_relations(&client_produit(), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_relation_cycle_is_warning_with_path() {
        let mut model = client_produit();
        model.associations.push(Association::new("Note", vec![]));
        model.association_links.push(AssociationLink::new("Note", "Client", "0,n"));
        model.association_links.push(AssociationLink::new("Note", "Produit", "0,n"));

        let mut out = Vec::new();
        check_relations(&model, &mut out);
        assert_eq!(codes(&out), vec!["relation-cycle"]);
        assert_eq!(out[0].severity, Severity::Warning);
        assert_eq!(
            out[0].message,
            "relation cycle: Client -> Achete -> Produit -> Note -> Client"
        );
        assert_eq!(out[0].target, Some(Target::entity("Client")));
    }

    #[test]
    fn test_reflexive_association_is_not_a_cycle() {
        let mut model = client_produit();
        model.associations.push(Association::new("Parraine", vec![]));
        model.association_links.push(AssociationLink::new("Parraine", "Client", "0,1"));
        model.association_links.push(AssociationLink::new("Parraine", "Client", "0,n"));
        let mut out = Vec::new();
        check_relations(&model, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_entity_and_association_sharing_a_name() {
        let model = Model {
            entities: vec![entity("Vente"), entity("Article")],
            associations: vec![Association::new("Vente", vec![])],
            association_links: vec![
                AssociationLink::new("Vente", "Vente", "0,n"),
                AssociationLink::new("Vente", "Article", "0,n"),
            ],
            ..Default::default()
        };
        let mut out = Vec::new();
        check_relations(&model, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_inheritance_cycle_is_error() {
        let model = Model {
            entities: vec![entity("A"), entity("B"), entity("C")],
            inheritance_links: vec![
                InheritanceLink::new("B", "A"),
                InheritanceLink::new("C", "B"),
                InheritanceLink::new("A", "C"),
            ],
            ..Default::default()
        };
        let mut out = Vec::new();
        check_inheritance(&model, &mut out);
        assert_eq!(codes(&out), vec!["inheritance-cycle"]);
        assert_eq!(out[0].severity, Severity::Error);
        assert_eq!(out[0].message, "inheritance cycle: A -> B -> C -> A");
    }

    #[test]
    fn test_inheritance_chain_is_fine() {
        let model = Model {
            entities: vec![entity("Personne"), entity("Employe"), entity("Cadre")],
            inheritance_links: vec![
                InheritanceLink::new("Personne", "Employe"),
                InheritanceLink::new("Employe", "Cadre"),
            ],
            ..Default::default()
        };
        let mut out = Vec::new();
        check_inheritance(&model, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_unknown_inheritance_entity() {
        let model = Model {
            entities: vec![entity("Personne")],
            inheritance_links: vec![InheritanceLink::new("Personne", "Fantome")],
            ..Default::default()
        };
        let mut out = Vec::new();
        check_inheritance(&model, &mut out);
        assert_eq!(codes(&out), vec!["unknown-inheritance-entity"]);
        assert_eq!(out[0].target, Some(Target::entity("Fantome")));
    }
}
