//! Conceptual data model (MCD).
//!
//! Plain data: entities, associations, the links between them, inheritance
//! and CIF constraints. Cardinality strings are normalized once, when a link
//! is built or deserialized, so the rest of the pipeline works on
//! [`LinkCardinality`] values.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub associations: Vec<Association>,
    #[serde(default)]
    pub association_links: Vec<AssociationLink>,
    #[serde(default)]
    pub inheritance_links: Vec<InheritanceLink>,
    #[serde(default)]
    pub cif_constraints: Vec<CifConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type", default)]
    pub typ: String,
    #[serde(default, alias = "primary_key")]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Swap the two `card_assoc` values of a binary association before
    /// placing its foreign key.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reversed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLink")]
pub struct AssociationLink {
    pub association: String,
    pub entity: String,
    /// Cardinality seen from the entity toward the association.
    pub card_entity: LinkCardinality,
    /// Cardinality seen from the association toward the entity.
    pub card_assoc: LinkCardinality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InheritanceLink {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CifConstraint {
    #[serde(default)]
    pub name: String,
    #[serde(alias = "type")]
    pub kind: CifKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub associations: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CifKind {
    Functional,
    InterAssociation,
    Unique,
    Exclusion,
}

impl fmt::Display for CifKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Functional => "functional",
            Self::InterAssociation => "inter_association",
            Self::Unique => "unique",
            Self::Exclusion => "exclusion",
        };
        f.write_str(s)
    }
}

fn default_true() -> bool {
    true
}

/// Merise cardinality `(min,max)` with min in {0,1} and max in {1,n}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ZeroOne,  // 0,1
    OneOne,   // 1,1
    ZeroMany, // 0,n
    OneMany,  // 1,n
}

impl Cardinality {
    pub const ALL: [Cardinality; 4] = [
        Cardinality::ZeroOne,
        Cardinality::OneOne,
        Cardinality::ZeroMany,
        Cardinality::OneMany,
    ];

    /// Parse any accepted spelling: `1,N`, `0..1`, `1..*`, `0n`, `n,1`, `n,n`.
    pub fn parse(s: &str) -> Option<Self> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        let (min, max) = if let Some((min, max)) = compact.split_once("..") {
            (min, max)
        } else if let Some((min, max)) = compact.split_once(',') {
            (min, max)
        } else if compact.len() == 2 && compact.is_ascii() {
            compact.split_at(1)
        } else {
            return None;
        };

        let many = |v: &str| matches!(v, "n" | "*" | "m");
        match (min, max) {
            ("0", "1") => Some(Self::ZeroOne),
            ("1", "1") => Some(Self::OneOne),
            ("0", m) if many(m) => Some(Self::ZeroMany),
            ("1", m) if many(m) => Some(Self::OneMany),
            // Legacy spellings kept by older diagrams.
            (n, "1") if many(n) => Some(Self::OneMany),
            (n, m) if many(n) && many(m) => Some(Self::ZeroMany),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZeroOne => "0,1",
            Self::OneOne => "1,1",
            Self::ZeroMany => "0,n",
            Self::OneMany => "1,n",
        }
    }

    pub fn is_many(self) -> bool {
        matches!(self, Self::ZeroMany | Self::OneMany)
    }

    pub fn is_one(self) -> bool {
        !self.is_many()
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Self::ZeroOne | Self::ZeroMany)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a cardinality string to its canonical spelling.
///
/// Unrecognized input comes back trimmed and lowercased, so
/// `normalize_cardinality(normalize_cardinality(x)) == normalize_cardinality(x)`.
pub fn normalize_cardinality(s: &str) -> String {
    match Cardinality::parse(s) {
        Some(card) => card.as_str().to_string(),
        None => s.trim().to_lowercase(),
    }
}

/// A link cardinality after normalization. Values outside the Merise set
/// are kept verbatim so diagnostics can quote them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LinkCardinality {
    Known(Cardinality),
    Unknown(String),
}

impl LinkCardinality {
    pub fn parse(s: &str) -> Self {
        match Cardinality::parse(s) {
            Some(card) => Self::Known(card),
            None => Self::Unknown(s.trim().to_string()),
        }
    }

    pub fn known(&self) -> Option<Cardinality> {
        match self {
            Self::Known(card) => Some(*card),
            Self::Unknown(_) => None,
        }
    }

    pub fn is(&self, card: Cardinality) -> bool {
        self.known() == Some(card)
    }
}

impl Default for LinkCardinality {
    fn default() -> Self {
        Self::Known(Cardinality::OneMany)
    }
}

impl From<String> for LinkCardinality {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<LinkCardinality> for String {
    fn from(card: LinkCardinality) -> Self {
        card.to_string()
    }
}

impl From<Cardinality> for LinkCardinality {
    fn from(card: Cardinality) -> Self {
        Self::Known(card)
    }
}

impl fmt::Display for LinkCardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(card) => f.write_str(card.as_str()),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Wire shape of a link. Older documents only carry a single `cardinality`
/// used for both sides.
#[derive(Deserialize)]
struct RawLink {
    association: String,
    entity: String,
    #[serde(default)]
    card_entity: Option<String>,
    #[serde(default)]
    card_assoc: Option<String>,
    #[serde(default)]
    cardinality: Option<String>,
}

impl From<RawLink> for AssociationLink {
    fn from(raw: RawLink) -> Self {
        let side = |value: Option<String>| {
            value
                .or_else(|| raw.cardinality.clone())
                .map(|s| LinkCardinality::parse(&s))
                .unwrap_or_default()
        };
        let card_entity = side(raw.card_entity);
        let card_assoc = side(raw.card_assoc);
        AssociationLink {
            association: raw.association,
            entity: raw.entity,
            card_entity,
            card_assoc,
        }
    }
}

impl Attribute {
    pub fn new(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: typ.into(),
            ..Default::default()
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_not_null = true;
        self
    }
}

impl Entity {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    pub fn has_primary_key(&self) -> bool {
        self.attributes.iter().any(|a| a.is_primary_key)
    }
}

impl Association {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
            reversed: false,
        }
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

impl AssociationLink {
    /// Link whose two sides share one cardinality string.
    pub fn new(association: impl Into<String>, entity: impl Into<String>, card: &str) -> Self {
        Self::with_sides(association, entity, card, card)
    }

    pub fn with_sides(
        association: impl Into<String>,
        entity: impl Into<String>,
        card_entity: &str,
        card_assoc: &str,
    ) -> Self {
        Self {
            association: association.into(),
            entity: entity.into(),
            card_entity: LinkCardinality::parse(card_entity),
            card_assoc: LinkCardinality::parse(card_assoc),
        }
    }
}

impl InheritanceLink {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

impl Model {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Lookup by name; surrounding whitespace is ignored on both sides.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name.trim() == name.trim())
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.name.trim() == name.trim())
    }

    /// Links of one association, in declaration order.
    pub fn links_of<'a>(
        &'a self,
        association: &'a str,
    ) -> impl Iterator<Item = &'a AssociationLink> + 'a {
        self.association_links
            .iter()
            .filter(move |l| l.association.trim() == association.trim())
    }

    pub fn is_inheritance_child(&self, entity: &str) -> bool {
        self.inheritance_links.iter().any(|l| l.child == entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        for card in Cardinality::ALL {
            assert_eq!(Cardinality::parse(card.as_str()), Some(card));
        }
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(Cardinality::parse("1,N"), Some(Cardinality::OneMany));
        assert_eq!(Cardinality::parse(" 0 , n "), Some(Cardinality::ZeroMany));
        assert_eq!(Cardinality::parse("0..1"), Some(Cardinality::ZeroOne));
        assert_eq!(Cardinality::parse("1..*"), Some(Cardinality::OneMany));
        assert_eq!(Cardinality::parse("11"), Some(Cardinality::OneOne));
        assert_eq!(Cardinality::parse("0N"), Some(Cardinality::ZeroMany));
        assert_eq!(Cardinality::parse("n,1"), Some(Cardinality::OneMany));
        assert_eq!(Cardinality::parse("n,n"), Some(Cardinality::ZeroMany));
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(Cardinality::parse("2,n"), None);
        assert_eq!(Cardinality::parse("1,2"), None);
        assert_eq!(Cardinality::parse(""), None);
        assert_eq!(Cardinality::parse("many"), None);
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "1,N", "n,n", " 0..1 ", "11", "x,y", "", "  Foo ", "1, n", "N,1", "0..*", "é,1",
        ];
        for input in inputs {
            let once = normalize_cardinality(input);
            assert_eq!(normalize_cardinality(&once), once, "input {:?}", input);
        }
        assert_eq!(normalize_cardinality("1,N"), "1,n");
        assert_eq!(normalize_cardinality("n,n"), "0,n");
        assert_eq!(normalize_cardinality("  X,Y "), "x,y");
    }

    #[test]
    fn test_link_from_json_both_sides() {
        let link: AssociationLink = serde_json::from_str(
            r#"{
                "association": "Achete",
                "entity": "Client",
                "card_entity": "1,N",
                "card_assoc": "0,1"
            }"#,
        )
        .unwrap();
        assert!(link.card_entity.is(Cardinality::OneMany));
        assert!(link.card_assoc.is(Cardinality::ZeroOne));
    }

    #[test]
    fn test_link_from_json_legacy_cardinality() {
        let link: AssociationLink = serde_json::from_str(
            r#"{"association": "Achete", "entity": "Client", "cardinality": "1,1"}"#,
        )
        .unwrap();
        assert!(link.card_entity.is(Cardinality::OneOne));
        assert!(link.card_assoc.is(Cardinality::OneOne));
    }

    #[test]
    fn test_link_defaults_to_one_many() {
        let link: AssociationLink =
            serde_json::from_str(r#"{"association": "A", "entity": "E"}"#).unwrap();
        assert!(link.card_entity.is(Cardinality::OneMany));
    }

    #[test]
    fn test_link_keeps_unknown_value() {
        let link = AssociationLink::new("A", "E", "3,n");
        assert_eq!(link.card_assoc, LinkCardinality::Unknown("3,n".into()));
        let json = serde_json::to_string(&link).unwrap();
        assert!(json.contains(r#""card_assoc":"3,n""#));
    }

    #[test]
    fn test_unknown_cif_kind_rejected() {
        let result: Result<CifConstraint, _> =
            serde_json::from_str(r#"{"name": "c", "kind": "bogus"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_attribute_primary_key_alias() {
        let attr: Attribute =
            serde_json::from_str(r#"{"name": "id", "type": "INT", "primary_key": true}"#).unwrap();
        assert!(attr.is_primary_key);
    }

    #[test]
    fn test_model_from_json() {
        let model = Model::from_json(
            r#"{
                "entities": [{
                    "name": "Client",
                    "attributes": [{"name": "id", "type": "INT", "is_primary_key": true}]
                }],
                "associations": [{"name": "Passe"}],
                "association_links": [{
                    "association": "Passe",
                    "entity": "Client",
                    "card_entity": "0,n",
                    "card_assoc": "0,n"
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(model.entities.len(), 1);
        assert!(model.entity("Client").unwrap().has_primary_key());
        assert_eq!(model.links_of("Passe").count(), 1);
        assert!(model.inheritance_links.is_empty());
    }

    #[test]
    fn test_lookup_ignores_padding() {
        let model = Model {
            entities: vec![Entity::new(" Client ", vec![])],
            associations: vec![Association::new("Passe ", vec![])],
            ..Default::default()
        };
        assert!(model.entity("Client").is_some());
        assert!(model.entity(" Client").is_some());
        assert!(model.association("Passe").is_some());
        assert!(model.entity("client").is_none());
    }
}
