//! Conceptual to logical transformation (MCD -> MLD).
//!
//! Entities become tables first, inheritance is resolved next, then every
//! association is placed according to the pair of its association-side
//! cardinalities:
//!
//! | shape      | result                                                  |
//! |------------|---------------------------------------------------------|
//! | one / one  | unique foreign key on the `0,1` side (else the first)   |
//! | one / many | foreign key on the "many" side, nullable if min is 0    |
//! | many/many  | junction table with a composite primary key             |
//! | n-ary      | junction table over every linked entity, plus a note    |
//!
//! The transformer never fails. Shapes it cannot place are skipped or
//! approximated, and each degradation is recorded in
//! [`LogicalSchema::notes`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::mld::{Column, ForeignKey, Index, LogicalSchema, ReferentialAction, Table, TableOrigin};
use crate::model::{Association, AssociationLink, Attribute, Cardinality, LinkCardinality, Model};

pub const DEFAULT_TYPE: &str = "VARCHAR(255)";
const SURROGATE_TYPE: &str = "INTEGER";
const DISCRIMINATOR: &str = "type";
const DISCRIMINATOR_TYPE: &str = "VARCHAR(50)";

/// How an inheritance link is mapped onto tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritanceStrategy {
    /// One table per entity; the child references its parent.
    #[default]
    Joined,
    /// Children are folded into the root table next to a `type` discriminator.
    SingleTable,
    /// Each child repeats the columns of its parent.
    TablePerClass,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    #[serde(default)]
    pub inheritance: InheritanceStrategy,
}

pub fn transform(model: &Model) -> LogicalSchema {
    transform_with(model, &TransformOptions::default())
}

pub fn transform_with(model: &Model, options: &TransformOptions) -> LogicalSchema {
    debug!(strategy = ?options.inheritance, "transforming model");
    let mut builder = Builder::new(options);
    builder.entities(model);
    builder.inheritance(model);
    builder.associations(model);
    builder.finish()
}

#[derive(Debug, Clone, Copy)]
struct End {
    table: usize,
    card: Cardinality,
}

#[derive(Debug, Clone, Copy)]
struct Reference {
    nullable: bool,
    unique: bool,
    primary_key: bool,
    on_delete: Option<ReferentialAction>,
}

struct Builder<'o> {
    options: &'o TransformOptions,
    tables: Vec<Table>,
    /// Tables folded into another one by single-table inheritance.
    merged: Vec<bool>,
    table_of: HashMap<String, usize>,
    discriminated: HashSet<usize>,
    foreign_keys: Vec<ForeignKey>,
    notes: Vec<String>,
}

impl<'o> Builder<'o> {
    fn new(options: &'o TransformOptions) -> Self {
        Self {
            options,
            tables: Vec::new(),
            merged: Vec::new(),
            table_of: HashMap::new(),
            discriminated: HashSet::new(),
            foreign_keys: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn note(&mut self, message: String) {
        warn!("{}", message);
        self.notes.push(message);
    }

    fn push_table(&mut self, table: Table) -> usize {
        self.tables.push(table);
        self.merged.push(false);
        self.tables.len() - 1
    }

    fn entities(&mut self, model: &Model) {
        for entity in &model.entities {
            let name = entity.name.trim();
            if name.is_empty() {
                self.note("an entity without a name was skipped".to_string());
                continue;
            }
            if self.table_of.contains_key(name) {
                self.note(format!("duplicate entity '{}' ignored", name));
                continue;
            }

            let mut table = Table::new(name, TableOrigin::Entity(name.to_string()));
            let mut dropped = Vec::new();
            for attr in &entity.attributes {
                let attr_name = attr.name.trim();
                if attr_name.is_empty() {
                    continue;
                }
                if table.has_column(attr_name) {
                    dropped.push(attr_name.to_string());
                    continue;
                }
                table.columns.push(attribute_column(attr, attr_name.to_string()));
            }
            for attr_name in dropped {
                self.note(format!("duplicate attribute '{}.{}' ignored", name, attr_name));
            }

            let idx = self.push_table(table);
            self.table_of.insert(name.to_string(), idx);
        }
    }

    fn inheritance(&mut self, model: &Model) {
        let ordered = self.inheritance_order(model);
        let children: HashSet<&str> = ordered.iter().map(|(child, _)| child.as_str()).collect();

        for table in &mut self.tables {
            let is_child = matches!(
                &table.origin,
                TableOrigin::Entity(name) if children.contains(name.as_str())
            );
            if !is_child && table.primary_key().next().is_none() {
                add_surrogate_key(table);
            }
        }

        for (child, parent) in &ordered {
            let (Some(&c), Some(&p)) = (self.table_of.get(child), self.table_of.get(parent)) else {
                continue;
            };
            match self.options.inheritance {
                InheritanceStrategy::Joined => self.join_to_parent(c, p),
                InheritanceStrategy::SingleTable => self.merge_into_parent(child, c, p),
                InheritanceStrategy::TablePerClass => self.copy_parent_columns(c, p),
            }
        }
    }

    /// Usable inheritance links, parents before children. Links that close a
    /// cycle are left out.
    fn inheritance_order(&mut self, model: &Model) -> Vec<(String, String)> {
        let mut links: Vec<(String, String)> = Vec::new();
        for link in &model.inheritance_links {
            let child = link.child.trim();
            let parent = link.parent.trim();
            if !self.table_of.contains_key(child) || !self.table_of.contains_key(parent) {
                self.note(format!(
                    "inheritance link {} -> {} references an unknown entity; ignored",
                    child, parent
                ));
            } else if child == parent {
                self.note(format!("entity '{}' cannot inherit from itself; ignored", child));
            } else if links.iter().any(|(c, _)| c == child) {
                self.note(format!(
                    "entity '{}' already has a parent; link to '{}' ignored",
                    child, parent
                ));
            } else {
                links.push((child.to_string(), parent.to_string()));
            }
        }

        let mut ordered = Vec::new();
        while let Some(i) = links
            .iter()
            .position(|(_, parent)| !links.iter().any(|(c, _)| c == parent))
        {
            ordered.push(links.remove(i));
        }
        for (child, parent) in links {
            self.note(format!(
                "inheritance link {} -> {} is part of a cycle; ignored",
                child, parent
            ));
        }
        ordered
    }

    fn join_to_parent(&mut self, child: usize, parent: usize) {
        let child_has_key = self.tables[child].primary_key().next().is_some();
        self.add_reference(
            child,
            parent,
            None,
            Reference {
                nullable: false,
                unique: child_has_key,
                primary_key: !child_has_key,
                on_delete: Some(ReferentialAction::Cascade),
            },
        );
    }

    fn merge_into_parent(&mut self, child_name: &str, child: usize, parent: usize) {
        let columns: Vec<Column> = self.tables[child]
            .columns
            .iter()
            .filter(|c| !c.is_primary_key)
            .cloned()
            .collect();

        let table = &mut self.tables[parent];
        if self.discriminated.insert(parent) {
            let name = unique_column_name(table, DISCRIMINATOR, None);
            let mut discriminator = Column::new(name, DISCRIMINATOR_TYPE);
            discriminator.nullable = false;
            table.columns.push(discriminator);
        }

        let mut clashes = Vec::new();
        for mut column in columns {
            if table.has_column(&column.name) {
                clashes.push(column.name);
                continue;
            }
            column.nullable = true;
            table.columns.push(column);
        }
        let parent_name = table.name.clone();

        self.merged[child] = true;
        self.table_of.insert(child_name.to_string(), parent);
        self.note(format!("entity '{}' merged into table '{}'", child_name, parent_name));
        for column in clashes {
            self.note(format!(
                "column '{}' of '{}' already exists in '{}'; dropped",
                column, child_name, parent_name
            ));
        }
    }

    fn copy_parent_columns(&mut self, child: usize, parent: usize) {
        let inherited = self.tables[parent].columns.clone();
        let table = &mut self.tables[child];
        let child_has_key = table.primary_key().next().is_some();

        let mut at = table.columns.iter().take_while(|c| c.is_primary_key).count();
        for column in inherited {
            if (column.is_primary_key && child_has_key) || table.has_column(&column.name) {
                continue;
            }
            table.columns.insert(at, column);
            at += 1;
        }
    }

    fn associations(&mut self, model: &Model) {
        let mut seen = HashSet::new();
        for association in &model.associations {
            let name = association.name.trim();
            if name.is_empty() || !seen.insert(name) {
                continue;
            }

            let mut ends = Vec::new();
            for link in model.links_of(name) {
                let entity = link.entity.trim();
                match self.table_of.get(entity).copied() {
                    Some(table) => {
                        let card = self.cardinality(link);
                        ends.push(End { table, card });
                    }
                    None => self.note(format!(
                        "association '{}' links unknown entity '{}'; link dropped",
                        name, entity
                    )),
                }
            }

            match ends.as_slice() {
                [] | [_] => self.note(format!(
                    "association '{}' links fewer than two entities; skipped",
                    name
                )),
                [a, b] => self.binary(association, name, *a, *b),
                _ => {
                    self.note(format!(
                        "association '{}' is {}-ary; mapped to a junction table",
                        name,
                        ends.len()
                    ));
                    self.junction(association, name, &ends);
                }
            }
        }
    }

    fn cardinality(&mut self, link: &AssociationLink) -> Cardinality {
        match &link.card_assoc {
            LinkCardinality::Known(card) => *card,
            LinkCardinality::Unknown(raw) => {
                self.note(format!(
                    "unknown cardinality '{}' on link {} - {}; treated as 1,n",
                    raw,
                    link.association.trim(),
                    link.entity.trim()
                ));
                Cardinality::OneMany
            }
        }
    }

    fn binary(&mut self, association: &Association, name: &str, a: End, b: End) {
        let (a, b) = if association.reversed {
            (End { card: b.card, ..a }, End { card: a.card, ..b })
        } else {
            (a, b)
        };

        let (holder, target, reference) = match (a.card.is_one(), b.card.is_one()) {
            (true, true) => {
                let b_optional = b.card == Cardinality::ZeroOne && a.card != Cardinality::ZeroOne;
                let (holder, target) = if b_optional { (b, a) } else { (a, b) };
                let nullable = holder.card == Cardinality::ZeroOne;
                (holder, target, one_reference(nullable, true))
            }
            (true, false) => (b, a, one_reference(a.card.is_optional(), false)),
            (false, true) => (a, b, one_reference(b.card.is_optional(), false)),
            (false, false) => return self.junction(association, name, &[a, b]),
        };

        self.add_reference(holder.table, target.table, Some(name), reference);
        if association.has_attributes() {
            let table_name = self.tables[holder.table].name.clone();
            self.note(format!(
                "attributes of association '{}' placed on table '{}'",
                name, table_name
            ));
            for attr in &association.attributes {
                let table = &mut self.tables[holder.table];
                let attr_name = attr.name.trim();
                if attr_name.is_empty() {
                    continue;
                }
                let column_name = unique_column_name(table, attr_name, Some(name));
                let mut column = attribute_column(attr, column_name);
                column.is_primary_key = false;
                column.nullable = !attr.is_not_null;
                table.columns.push(column);
            }
        }
    }

    fn junction(&mut self, association: &Association, name: &str, ends: &[End]) {
        let base = ends
            .iter()
            .map(|e| self.tables[e.table].name.as_str())
            .collect::<Vec<_>>()
            .join("_");
        let table_name = self.unique_table_name(&base, name);
        let origin = TableOrigin::Association(name.to_string());
        let idx = self.push_table(Table::new(table_name, origin));

        for end in ends {
            self.add_reference(
                idx,
                end.table,
                Some(name),
                Reference {
                    nullable: false,
                    unique: false,
                    primary_key: true,
                    on_delete: None,
                },
            );
        }

        let table = &mut self.tables[idx];
        for attr in &association.attributes {
            let attr_name = attr.name.trim();
            if attr_name.is_empty() {
                continue;
            }
            let column = attribute_column(attr, unique_column_name(table, attr_name, Some(name)));
            if column.is_primary_key {
                let at = table.columns.iter().take_while(|c| c.is_primary_key).count();
                table.columns.insert(at, column);
            } else {
                table.columns.push(column);
            }
        }
    }

    /// Add foreign-key columns on `holder` pointing at the primary key of
    /// `target`. Returns the number of columns added.
    fn add_reference(
        &mut self,
        holder: usize,
        target: usize,
        association: Option<&str>,
        reference: Reference,
    ) -> usize {
        let target_name = self.tables[target].name.clone();
        let keys: Vec<Column> = self.tables[target].primary_key().cloned().collect();
        let holder_name = self.tables[holder].name.clone();
        if keys.is_empty() {
            self.note(format!(
                "table '{}' has no primary key; reference from '{}' skipped",
                target_name, holder_name
            ));
            return 0;
        }

        let constraint = self.constraint_name(&holder_name, &target_name);
        let single = keys.len() == 1;
        for key in &keys {
            let table = &mut self.tables[holder];
            let base = fk_column_name(&target_name, &key.name);
            let column_name = unique_column_name(table, &base, association);
            let column = Column {
                name: column_name.clone(),
                data_type: key.data_type.clone(),
                is_primary_key: reference.primary_key,
                is_foreign_key: true,
                references: Some((target_name.clone(), key.name.clone())),
                nullable: reference.nullable && !reference.primary_key,
                is_unique: reference.unique && single,
                ..Default::default()
            };
            if reference.primary_key {
                let at = table.columns.iter().take_while(|c| c.is_primary_key).count();
                table.columns.insert(at, column);
            } else {
                table.columns.push(column);
            }

            self.foreign_keys.push(ForeignKey {
                name: constraint.clone(),
                from_table: holder_name.clone(),
                from_column: column_name,
                to_table: target_name.clone(),
                to_column: key.name.clone(),
                on_delete: reference.on_delete,
            });
        }
        keys.len()
    }

    fn constraint_name(&self, holder: &str, target: &str) -> String {
        let base = format!("fk_{}_{}", holder.to_lowercase(), target.to_lowercase());
        let taken = |candidate: &str| self.foreign_keys.iter().any(|fk| fk.name == candidate);
        if !taken(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn unique_table_name(&self, base: &str, association: &str) -> String {
        let taken = |candidate: &str| {
            self.tables
                .iter()
                .any(|t| t.name.eq_ignore_ascii_case(candidate))
        };
        if !taken(base) {
            return base.to_string();
        }
        if !taken(association) {
            return association.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn finish(self) -> LogicalSchema {
        let mut indexes: Vec<Index> = Vec::new();
        for (table, _) in self.tables.iter().zip(&self.merged).filter(|(_, merged)| !**merged) {
            let key: Vec<&str> = table.primary_key().map(|c| c.name.as_str()).collect();

            let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
            for fk in self.foreign_keys.iter().filter(|fk| fk.from_table == table.name) {
                match groups.iter_mut().find(|(name, _)| *name == fk.name) {
                    Some((_, columns)) => columns.push(fk.from_column.as_str()),
                    None => groups.push((fk.name.as_str(), vec![fk.from_column.as_str()])),
                }
            }

            for (_, columns) in groups {
                if key.starts_with(&columns) {
                    continue;
                }
                if let [only] = columns.as_slice() {
                    if table.column(only).is_some_and(|c| c.is_unique) {
                        continue;
                    }
                }
                let base = format!(
                    "idx_{}_{}",
                    table.name.to_lowercase(),
                    columns.join("_").to_lowercase()
                );
                let mut name = base.clone();
                let mut n = 2;
                while indexes.iter().any(|i| i.name == name) {
                    name = format!("{}_{}", base, n);
                    n += 1;
                }
                indexes.push(Index {
                    name,
                    table: table.name.clone(),
                    columns: columns.iter().map(|c| c.to_string()).collect(),
                    unique: false,
                });
            }
        }

        let tables: Vec<Table> = self
            .tables
            .into_iter()
            .zip(self.merged)
            .filter(|(_, merged)| !merged)
            .map(|(table, _)| table)
            .collect();

        debug!(
            tables = tables.len(),
            foreign_keys = self.foreign_keys.len(),
            indexes = indexes.len(),
            notes = self.notes.len(),
            "logical schema built"
        );
        LogicalSchema {
            tables,
            foreign_keys: self.foreign_keys,
            indexes,
            notes: self.notes,
        }
    }
}

fn one_reference(nullable: bool, unique: bool) -> Reference {
    Reference {
        nullable,
        unique,
        primary_key: false,
        on_delete: nullable.then_some(ReferentialAction::SetNull),
    }
}

fn attribute_column(attr: &Attribute, name: String) -> Column {
    let typ = attr.typ.trim();
    Column {
        name,
        data_type: if typ.is_empty() { DEFAULT_TYPE.to_string() } else { typ.to_string() },
        is_primary_key: attr.is_primary_key,
        nullable: !(attr.is_primary_key || attr.is_not_null),
        is_unique: attr.is_unique && !attr.is_primary_key,
        default_value: attr.default_value.clone(),
        comment: attr.description.clone(),
        ..Default::default()
    }
}

fn add_surrogate_key(table: &mut Table) {
    let name = unique_column_name(table, &format!("{}_id", table.name.to_lowercase()), None);
    let mut column = Column::new(name, SURROGATE_TYPE);
    column.is_primary_key = true;
    column.nullable = false;
    column.auto_increment = true;
    table.columns.insert(0, column);
}

/// `client` + `id` -> `client_id`; `client` + `client_id` stays `client_id`.
pub fn fk_column_name(target: &str, key: &str) -> String {
    let prefix = format!("{}_", target.to_lowercase());
    if key.to_lowercase().starts_with(&prefix) {
        key.to_string()
    } else {
        format!("{}{}", prefix, key)
    }
}

/// First free name among `base`, `<association>_<base>`, `<base>_2`, ...
fn unique_column_name(table: &Table, base: &str, association: Option<&str>) -> String {
    if !table.has_column(base) {
        return base.to_string();
    }
    if let Some(association) = association {
        let candidate = format!("{}_{}", association.to_lowercase(), base);
        if !table.has_column(&candidate) {
            return candidate;
        }
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if !table.has_column(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, InheritanceLink};
    use crate::rules::tests::client_produit;

    fn column<'a>(schema: &'a LogicalSchema, table: &str, column: &str) -> &'a Column {
        schema
            .table(table)
            .and_then(|t| t.column(column))
            .unwrap_or_else(|| panic!("missing column {}.{}", table, column))
    }

    fn column_names(schema: &LogicalSchema, table: &str) -> Vec<String> {
        schema
            .table(table)
            .map(|t| t.columns.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default()
    }

    fn with_cards(cards: [&str; 2]) -> Model {
        let mut model = client_produit();
        model.association_links = vec![
            AssociationLink::new("Achete", "Client", cards[0]),
            AssociationLink::new("Achete", "Produit", cards[1]),
        ];
        model
    }

    #[test]
    fn test_one_many_places_fk_on_many_side() {
        let schema = transform(&client_produit());
        assert_eq!(schema.tables.len(), 2);
        assert_eq!(column_names(&schema, "Client"), vec!["id", "name"]);

        let fk = column(&schema, "Produit", "client_id");
        assert!(fk.is_foreign_key);
        assert!(!fk.nullable);
        assert_eq!(fk.data_type, "INT");
        assert_eq!(fk.references, Some(("Client".to_string(), "id".to_string())));

        assert_eq!(schema.foreign_keys.len(), 1);
        assert_eq!(schema.foreign_keys[0].name, "fk_produit_client");
        assert_eq!(schema.foreign_keys[0].on_delete, None);
        assert_eq!(schema.indexes[0].name, "idx_produit_client_id");
        assert!(schema.notes.is_empty());
    }

    #[test]
    fn test_optional_one_side_gives_nullable_fk() {
        let schema = transform(&with_cards(["0,1", "1,n"]));
        let fk = column(&schema, "Produit", "client_id");
        assert!(fk.nullable);
        assert_eq!(schema.foreign_keys[0].on_delete, Some(ReferentialAction::SetNull));
    }

    #[test]
    fn test_one_one_prefers_optional_side() {
        let schema = transform(&with_cards(["1,1", "0,1"]));
        assert!(!schema.table("Client").unwrap().has_column("produit_id"));
        let fk = column(&schema, "Produit", "client_id");
        assert!(fk.nullable);
        assert!(fk.is_unique);
        assert!(schema.indexes.is_empty());
    }

    #[test]
    fn test_one_one_both_mandatory_uses_first_side() {
        let schema = transform(&with_cards(["1,1", "1,1"]));
        let fk = column(&schema, "Client", "produit_id");
        assert!(!fk.nullable);
        assert!(fk.is_unique);
        assert!(!schema.table("Produit").unwrap().has_column("client_id"));
    }

    #[test]
    fn test_reversed_swaps_cardinalities() {
        let mut model = client_produit();
        model.associations[0].reversed = true;
        let schema = transform(&model);
        assert!(schema.table("Client").unwrap().has_column("produit_id"));
        assert!(!schema.table("Produit").unwrap().has_column("client_id"));
    }

    #[test]
    fn test_many_many_junction_table() {
        let mut model = with_cards(["1,n", "0,n"]);
        model.associations[0].attributes.push(Attribute::new("quantite", "INT").not_null());
        let schema = transform(&model);

        assert_eq!(schema.tables.len(), 3);
        let junction = schema.table("Client_Produit").unwrap();
        assert_eq!(junction.origin, TableOrigin::Association("Achete".into()));
        assert_eq!(
            column_names(&schema, "Client_Produit"),
            vec!["client_id", "produit_id", "quantite"]
        );
        let key: Vec<&str> = junction.primary_key().map(|c| c.name.as_str()).collect();
        assert_eq!(key, vec!["client_id", "produit_id"]);
        assert!(!column(&schema, "Client_Produit", "quantite").nullable);

        assert_eq!(schema.foreign_keys.len(), 2);
        assert_eq!(schema.indexes.len(), 1);
        assert_eq!(schema.indexes[0].columns, vec!["produit_id"]);
    }

    #[test]
    fn test_junction_name_collision_uses_association() {
        let mut model = with_cards(["0,n", "0,n"]);
        let id = Attribute::new("id", "INT").primary_key();
        model.entities.push(Entity::new("Client_Produit", vec![id]));
        let schema = transform(&model);
        assert!(schema.table("Achete").is_some());
    }

    #[test]
    fn test_surrogate_key_and_reference() {
        let mut model = client_produit();
        model.entities[0].attributes[0].is_primary_key = false;
        let schema = transform(&model);

        let key = column(&schema, "Client", "client_id");
        assert!(key.is_primary_key);
        assert!(key.auto_increment);
        assert_eq!(key.data_type, "INTEGER");
        assert_eq!(column_names(&schema, "Client")[0], "client_id");

        let fk = column(&schema, "Produit", "client_id");
        assert!(!fk.auto_increment);
        assert_eq!(fk.references, Some(("Client".into(), "client_id".into())));
    }

    #[test]
    fn test_column_collision_uses_association_prefix() {
        let mut model = client_produit();
        model.associations.push(Association::new("Retourne", vec![]));
        model.association_links.push(AssociationLink::new("Retourne", "Client", "0,1"));
        model.association_links.push(AssociationLink::new("Retourne", "Produit", "0,n"));
        let schema = transform(&model);
        assert_eq!(
            column_names(&schema, "Produit"),
            vec!["id", "nom", "client_id", "retourne_client_id"]
        );
        assert_eq!(schema.foreign_keys[1].name, "fk_produit_client_2");
    }

    #[test]
    fn test_attributes_on_one_many_association_go_to_holder() {
        let mut model = client_produit();
        model.associations[0].attributes.push(Attribute::new("date", "DATE"));
        let schema = transform(&model);
        assert!(column(&schema, "Produit", "date").nullable);
        assert_eq!(schema.notes.len(), 1);
    }

    #[test]
    fn test_nary_association() {
        let mut model = client_produit();
        let code = Attribute::new("code", "CHAR(4)").primary_key();
        model.entities.push(Entity::new("Magasin", vec![code]));
        model.association_links.push(AssociationLink::new("Achete", "Magasin", "0,n"));
        let schema = transform(&model);
        let junction = schema.table("Client_Produit_Magasin").unwrap();
        assert_eq!(junction.primary_key().count(), 3);
        assert!(junction.has_column("magasin_code"));
        assert!(schema.notes.iter().any(|n| n.contains("3-ary")));
    }

    #[test]
    fn test_degenerate_associations_are_noted() {
        let mut model = client_produit();
        model.association_links[1] = AssociationLink::new("Achete", "Fantome", "0,n");
        let schema = transform(&model);
        assert!(schema.foreign_keys.is_empty());
        assert_eq!(schema.notes.len(), 2);
    }

    #[test]
    fn test_unknown_cardinality_treated_as_one_many() {
        let schema = transform(&with_cards(["1,1", "5,5"]));
        assert!(schema.table("Produit").unwrap().has_column("client_id"));
        assert!(schema.notes[0].contains("'5,5'"));
    }

    fn personne_employe() -> Model {
        let mut model = client_produit();
        model.entities.push(Entity::new(
            "Personne",
            vec![Attribute::new("id", "INT").primary_key(), Attribute::new("nom", "VARCHAR(50)")],
        ));
        let salaire = Attribute::new("salaire", "DECIMAL").not_null();
        model.entities.push(Entity::new("Employe", vec![salaire]));
        model.inheritance_links.push(InheritanceLink::new("Personne", "Employe"));
        model
    }

    #[test]
    fn test_joined_inheritance() {
        let schema = transform(&personne_employe());
        assert_eq!(column_names(&schema, "Employe"), vec!["personne_id", "salaire"]);
        let key = column(&schema, "Employe", "personne_id");
        assert!(key.is_primary_key && key.is_foreign_key);
        let fk = schema.foreign_keys_of("Employe").next().unwrap();
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
    }

    #[test]
    fn test_single_table_inheritance() {
        let options = TransformOptions {
            inheritance: InheritanceStrategy::SingleTable,
        };
        let schema = transform_with(&personne_employe(), &options);
        assert!(schema.table("Employe").is_none());
        assert_eq!(column_names(&schema, "Personne"), vec!["id", "nom", "type", "salaire"]);
        assert!(!column(&schema, "Personne", "type").nullable);
        assert!(column(&schema, "Personne", "salaire").nullable);
    }

    #[test]
    fn test_single_table_redirects_associations() {
        let mut model = personne_employe();
        model.associations.push(Association::new("Vend", vec![]));
        model.association_links.push(AssociationLink::new("Vend", "Employe", "0,n"));
        model.association_links.push(AssociationLink::new("Vend", "Produit", "1,1"));
        let options = TransformOptions {
            inheritance: InheritanceStrategy::SingleTable,
        };
        let schema = transform_with(&model, &options);
        assert_eq!(
            column(&schema, "Personne", "produit_id").references,
            Some(("Produit".into(), "id".into()))
        );
    }

    #[test]
    fn test_table_per_class_inheritance() {
        let options = TransformOptions {
            inheritance: InheritanceStrategy::TablePerClass,
        };
        let schema = transform_with(&personne_employe(), &options);
        assert_eq!(column_names(&schema, "Employe"), vec!["id", "nom", "salaire"]);
        assert!(schema.foreign_keys_of("Employe").next().is_none());
    }

    #[test]
    fn test_inheritance_cycle_is_ignored() {
        let mut model = personne_employe();
        model.inheritance_links.push(InheritanceLink::new("Client", "Employe"));
        let schema = transform(&model);
        assert!(schema.notes.iter().any(|n| n.contains("already has a parent")));

        let mut model = personne_employe();
        model.inheritance_links[0] = InheritanceLink::new("Employe", "Personne");
        model.inheritance_links.push(InheritanceLink::new("Personne", "Employe"));
        let schema = transform(&model);
        assert!(schema.notes.iter().filter(|n| n.contains("cycle")).count() == 2);
        assert!(column(&schema, "Employe", "employe_id").is_primary_key);
    }

    #[test]
    fn test_fk_column_name() {
        assert_eq!(fk_column_name("Client", "id"), "client_id");
        assert_eq!(fk_column_name("Client", "client_id"), "client_id");
        assert_eq!(fk_column_name("Client", "Client_ID"), "Client_ID");
    }

    #[test]
    fn test_transform_is_deterministic() {
        let mut model = personne_employe();
        model.association_links.push(AssociationLink::new("Achete", "Personne", "0,n"));
        let first = transform(&model);
        for _ in 0..5 {
            assert_eq!(transform(&model), first);
        }
    }
}
