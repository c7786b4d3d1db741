//! MCD rule engine.
//!
//! Each rule family lives in its own module and appends to a shared
//! diagnostic list. Rules never stop early and never touch the model: one
//! call reports every problem.
//!
//! ## Rules
//! 1. **Naming**: non-empty, unique entity/association/attribute names
//! 2. **Types**: every attribute carries a type
//! 3. **Links**: legal cardinalities, known endpoints, connected entities
//! 4. **Barrel**: attribute-bearing associations must be correspondence tables
//! 5. **Cycles**: relation cycles (warning), inheritance cycles (error)
//! 6. **CIF**: shape and references of functional integrity constraints

mod barrel;
mod cif;
mod cycles;
mod links;
mod naming;

use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::model::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Model element a diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Entity { name: String },
    Association { name: String },
    Attribute { owner: String, name: String },
    Constraint { name: String },
}

impl Target {
    pub fn entity(name: &str) -> Self {
        Self::Entity { name: name.to_string() }
    }

    pub fn association(name: &str) -> Self {
        Self::Association { name: name.to_string() }
    }

    pub fn attribute(owner: &str, name: &str) -> Self {
        Self::Attribute {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    pub fn constraint(name: &str) -> Self {
        Self::Constraint { name: name.to_string() }
    }

    /// Name of the element itself (the attribute name for attributes).
    pub fn name(&self) -> &str {
        match self {
            Self::Entity { name }
            | Self::Association { name }
            | Self::Attribute { name, .. }
            | Self::Constraint { name } => name,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity { name } => write!(f, "entity {}", name),
            Self::Association { name } => write!(f, "association {}", name),
            Self::Attribute { owner, name } => write!(f, "attribute {}.{}", owner, name),
            Self::Constraint { name } => write!(f, "constraint {}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            target: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            target: None,
        }
    }

    pub fn on(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)
    }
}

/// Run every rule against `model`.
pub fn validate(model: &Model) -> Vec<Diagnostic> {
    debug!(
        entities = model.entities.len(),
        associations = model.associations.len(),
        links = model.association_links.len(),
        "validating model"
    );

    let mut diagnostics = Vec::new();
    naming::check(model, &mut diagnostics);
    links::check_cardinalities(model, &mut diagnostics);
    links::check_endpoints(model, &mut diagnostics);
    barrel::check(model, &mut diagnostics);
    links::check_connectivity(model, &mut diagnostics);
    links::check_primary_keys(model, &mut diagnostics);
    cycles::check_relations(model, &mut diagnostics);
    cycles::check_inheritance(model, &mut diagnostics);
    cif::check(model, &mut diagnostics);

    let errors = error_count(&diagnostics);
    info!(
        errors,
        warnings = diagnostics.len() - errors,
        "validation finished"
    );
    diagnostics
}

pub fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
