//! Logical schema to DDL statements.
//!
//! Statement order: every `CREATE TABLE` in table order, then foreign keys
//! as `ALTER TABLE ... ADD CONSTRAINT` in the order of their owning tables,
//! then indexes, then column comments. SQLite has no `ADD CONSTRAINT`, so
//! its foreign keys are written inside `CREATE TABLE`.

use serde::Serialize;
use tracing::debug;

use super::names::NameMap;
use super::types::{identity_type, value_list, TypeSpec};
use super::Dialect;
use crate::mld::{Column, ForeignKey, LogicalSchema, Table};
use crate::rules::Diagnostic;

pub fn emit(schema: &LogicalSchema, dialect: Dialect) -> Vec<String> {
    SqlEmitter::new(dialect).emit(schema)
}

/// A generated script: statements plus the transformer's notes and the
/// validation findings of the model it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlScript {
    #[serde(serialize_with = "serialize_dialect")]
    pub dialect: Dialect,
    pub statements: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

fn serialize_dialect<S>(dialect: &Dialect, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(dialect.name())
}

impl SqlScript {
    pub fn new(schema: &LogicalSchema, dialect: Dialect) -> Self {
        Self {
            dialect,
            statements: emit(schema, dialect),
            notes: schema.notes.clone(),
            diagnostics: Vec::new(),
        }
    }

    /// One script, statements separated by blank lines. The header names the
    /// dialect and repeats the notes as comments.
    pub fn render(&self, header: bool) -> String {
        let mut out = String::new();
        if header {
            out.push_str(&format!(
                "-- {} schema generated by barrelmcd\n",
                self.dialect.label()
            ));
            for note in &self.notes {
                out.push_str(&format!("-- note: {}\n", note));
            }
            out.push('\n');
        }
        out.push_str(&self.statements.join("\n\n"));
        out.push('\n');
        out
    }
}

pub struct SqlEmitter {
    dialect: Dialect,
}

impl SqlEmitter {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn emit(&self, schema: &LogicalSchema) -> Vec<String> {
        let names = NameMap::resolve(schema, self.dialect);
        let mut statements = Vec::new();

        for table in &schema.tables {
            statements.push(self.create_table(table, schema, &names));
        }

        if self.dialect != Dialect::Sqlite {
            for table in &schema.tables {
                for group in constraint_groups(schema, &table.name) {
                    statements.push(self.add_constraint(&group, &names));
                }
            }
        }

        for (position, index) in schema.indexes.iter().enumerate() {
            let name = match names.index(position) {
                Some(name) => name.to_string(),
                None => self.dialect.normalize_identifier(&index.name),
            };
            let columns = index.columns.iter().map(|c| names.column(&index.table, c));
            statements.push(format!(
                "CREATE {}INDEX {} ON {} ({});",
                if index.unique { "UNIQUE " } else { "" },
                self.quoted(&name),
                self.quoted(&names.table(&index.table)),
                self.quoted_list(columns),
            ));
        }

        for table in &schema.tables {
            for column in &table.columns {
                let Some(comment) = column.comment.as_deref() else {
                    continue;
                };
                if let Some(statement) = self.comment(table, column, comment, &names) {
                    statements.push(statement);
                }
            }
        }

        debug!(dialect = %self.dialect, statements = statements.len(), "emitted SQL");
        statements
    }

    /// Quote a resolved name when it is a reserved word.
    fn quoted(&self, ident: &str) -> String {
        if self.dialect.is_reserved(ident) {
            self.dialect.quote(ident)
        } else {
            ident.to_string()
        }
    }

    fn quoted_list(&self, names: impl Iterator<Item = String>) -> String {
        names.map(|n| self.quoted(&n)).collect::<Vec<_>>().join(", ")
    }

    fn create_table(&self, table: &Table, schema: &LogicalSchema, names: &NameMap) -> String {
        let key: Vec<&Column> = table.primary_key().collect();
        let inline_key =
            self.dialect == Dialect::Sqlite && key.len() == 1 && key[0].auto_increment;

        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|c| {
                let name = names.column(&table.name, &c.name);
                format!("    {}", self.column_definition(c, &name, inline_key))
            })
            .collect();

        if !key.is_empty() && !inline_key {
            let columns =
                self.quoted_list(key.iter().map(|c| names.column(&table.name, &c.name)));
            match self.dialect {
                Dialect::Oracle | Dialect::SqlServer => lines.push(format!(
                    "    CONSTRAINT {} PRIMARY KEY ({})",
                    self.quoted(&names.primary_key(&table.name)),
                    columns
                )),
                _ => lines.push(format!("    PRIMARY KEY ({})", columns)),
            }
        }

        if self.dialect == Dialect::Sqlite {
            for group in constraint_groups(schema, &table.name) {
                lines.push(format!("    {}", self.foreign_key_clause(&group, names)));
            }
        }

        let suffix = match self.dialect {
            Dialect::MySql => " ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
            _ => "",
        };
        format!(
            "CREATE TABLE {} (\n{}\n){};",
            self.quoted(&names.table(&table.name)),
            lines.join(",\n"),
            suffix
        )
    }

    fn column_definition(&self, column: &Column, resolved: &str, inline_key: bool) -> String {
        let declared = TypeSpec::parse(&column.data_type);
        let mapped = declared.map(self.dialect);
        let name = self.quoted(resolved);
        let mut parts = vec![name.clone()];

        let inline = inline_key && column.is_primary_key;
        if inline {
            parts.push("INTEGER PRIMARY KEY AUTOINCREMENT".to_string());
        } else if column.auto_increment {
            parts.push(identity_type(&mapped, self.dialect));
        } else {
            parts.push(mapped);
        }

        if !column.nullable && !inline {
            parts.push("NOT NULL".to_string());
        }
        if column.is_unique && !column.is_primary_key {
            parts.push("UNIQUE".to_string());
        }
        if let Some(default) = &column.default_value {
            parts.push(format!("DEFAULT {}", default_literal(default)));
        }
        let values = &declared.params.values;
        if declared.is_enum() && !values.is_empty() && self.dialect != Dialect::MySql {
            parts.push(format!("CHECK ({} IN ({}))", name, value_list(values)));
        }
        if let (Dialect::MySql, Some(comment)) = (self.dialect, &column.comment) {
            parts.push(format!("COMMENT '{}'", escape(comment)));
        }
        parts.join(" ")
    }

    fn foreign_key_clause(&self, group: &[&ForeignKey], names: &NameMap) -> String {
        let first = group[0];
        let from = group.iter().map(|fk| names.column(&fk.from_table, &fk.from_column));
        let to = group.iter().map(|fk| names.column(&fk.to_table, &fk.to_column));
        let mut clause = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quoted(&names.foreign_key(&first.from_table, &first.name)),
            self.quoted_list(from),
            self.quoted(&names.table(&first.to_table)),
            self.quoted_list(to),
        );
        if let Some(action) = first.on_delete {
            clause.push_str(" ON DELETE ");
            clause.push_str(action.as_sql());
        }
        clause
    }

    fn add_constraint(&self, group: &[&ForeignKey], names: &NameMap) -> String {
        format!(
            "ALTER TABLE {} ADD {};",
            self.quoted(&names.table(&group[0].from_table)),
            self.foreign_key_clause(group, names)
        )
    }

    fn comment(
        &self,
        table: &Table,
        column: &Column,
        comment: &str,
        names: &NameMap,
    ) -> Option<String> {
        let table_name = names.table(&table.name);
        let column_name = names.column(&table.name, &column.name);
        match self.dialect {
            Dialect::PostgreSql | Dialect::Oracle => Some(format!(
                "COMMENT ON COLUMN {}.{} IS '{}';",
                self.quoted(&table_name),
                self.quoted(&column_name),
                escape(comment)
            )),
            Dialect::SqlServer => Some(format!(
                "EXEC sp_addextendedproperty @name=N'MS_Description', @value=N'{}', \
                 @level0type=N'SCHEMA', @level0name=N'dbo', \
                 @level1type=N'TABLE', @level1name=N'{}', \
                 @level2type=N'COLUMN', @level2name=N'{}';",
                escape(comment),
                escape(&table_name),
                escape(&column_name)
            )),
            Dialect::MySql | Dialect::Sqlite => None,
        }
    }
}

/// Foreign keys of `table`, grouped by constraint name in first-seen order.
fn constraint_groups<'a>(schema: &'a LogicalSchema, table: &'a str) -> Vec<Vec<&'a ForeignKey>> {
    let mut groups: Vec<Vec<&ForeignKey>> = Vec::new();
    for fk in schema.foreign_keys_of(table) {
        match groups.iter_mut().find(|g| g[0].name == fk.name) {
            Some(group) => group.push(fk),
            None => groups.push(vec![fk]),
        }
    }
    groups
}

fn escape(text: &str) -> String {
    text.replace('\'', "''")
}

/// Numbers, `NULL`, `TRUE`/`FALSE`, `CURRENT_*` and already quoted values are
/// written as is; anything else becomes a string literal.
fn default_literal(value: &str) -> String {
    let value = value.trim();
    let upper = value.to_uppercase();
    let keyword =
        matches!(upper.as_str(), "NULL" | "TRUE" | "FALSE") || upper.starts_with("CURRENT_");
    let quoted = value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'');
    let number = value.parse::<f64>().is_ok_and(f64::is_finite);
    if keyword || quoted || number {
        value.to_string()
    } else {
        format!("'{}'", escape(value))
    }
}
