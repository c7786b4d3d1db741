//! Dialect names for the tables, columns, constraints and indexes of one
//! schema.
//!
//! Normalizing folds case, replaces characters and truncates, so two distinct
//! logical names can land on the same identifier. Names are claimed in schema
//! order and a clash gets `_2`, `_3`, ... fitted inside the length limit.
//! Tables, key constraints and indexes share one namespace; columns are
//! unique within their table.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::Dialect;
use crate::mld::LogicalSchema;

#[derive(Debug)]
pub struct NameMap {
    dialect: Dialect,
    tables: HashMap<String, String>,
    columns: HashMap<(String, String), String>,
    primary_keys: HashMap<String, String>,
    /// Keyed by `(from_table, constraint)`.
    foreign_keys: HashMap<(String, String), String>,
    /// One entry per schema index, in order.
    indexes: Vec<String>,
}

/// Identifiers already handed out, compared case-insensitively.
struct Namespace {
    dialect: Dialect,
    taken: HashSet<String>,
}

impl Namespace {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            taken: HashSet::new(),
        }
    }

    fn claim(&mut self, name: &str) -> String {
        let base = self.dialect.normalize_identifier(name);
        let mut candidate = base.clone();
        let mut n = 2;
        while !self.taken.insert(candidate.to_lowercase()) {
            candidate = self.dialect.fit(&base, &format!("_{}", n));
            n += 1;
        }
        if candidate != base {
            debug!(original = name, resolved = %candidate, "identifier renamed");
        }
        candidate
    }
}

impl NameMap {
    pub fn resolve(schema: &LogicalSchema, dialect: Dialect) -> Self {
        let mut map = Self {
            dialect,
            tables: HashMap::new(),
            columns: HashMap::new(),
            primary_keys: HashMap::new(),
            foreign_keys: HashMap::new(),
            indexes: Vec::new(),
        };
        let mut global = Namespace::new(dialect);

        for table in &schema.tables {
            let resolved = global.claim(&table.name);
            map.tables.insert(table.name.clone(), resolved);

            let mut columns = Namespace::new(dialect);
            for column in &table.columns {
                let key = (table.name.clone(), column.name.clone());
                map.columns.insert(key, columns.claim(&column.name));
            }
        }

        for table in &schema.tables {
            if table.primary_key().next().is_some() {
                let resolved = global.claim(&format!("pk_{}", table.name.to_lowercase()));
                map.primary_keys.insert(table.name.clone(), resolved);
            }
        }

        for fk in &schema.foreign_keys {
            let key = (fk.from_table.clone(), fk.name.clone());
            if !map.foreign_keys.contains_key(&key) {
                let resolved = global.claim(&fk.name);
                map.foreign_keys.insert(key, resolved);
            }
        }

        for index in &schema.indexes {
            map.indexes.push(global.claim(&index.name));
        }

        map
    }

    pub fn table(&self, table: &str) -> String {
        self.tables
            .get(table)
            .cloned()
            .unwrap_or_else(|| self.dialect.normalize_identifier(table))
    }

    pub fn column(&self, table: &str, column: &str) -> String {
        self.columns
            .get(&(table.to_string(), column.to_string()))
            .cloned()
            .unwrap_or_else(|| self.dialect.normalize_identifier(column))
    }

    pub fn primary_key(&self, table: &str) -> String {
        match self.primary_keys.get(table) {
            Some(name) => name.clone(),
            None => self
                .dialect
                .normalize_identifier(&format!("pk_{}", table.to_lowercase())),
        }
    }

    pub fn foreign_key(&self, table: &str, constraint: &str) -> String {
        self.foreign_keys
            .get(&(table.to_string(), constraint.to_string()))
            .cloned()
            .unwrap_or_else(|| self.dialect.normalize_identifier(constraint))
    }

    pub fn index(&self, position: usize) -> Option<&str> {
        self.indexes.get(position).map(String::as_str)
    }
}
