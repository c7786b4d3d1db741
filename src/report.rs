//! Plain-text reports for terminals.
//!
//! Columns are aligned on display width, so accented or CJK identifiers
//! keep the layout straight.

use std::fmt::Write;

use unicode_width::UnicodeWidthStr;

use crate::mld::{Column, LogicalSchema};
use crate::rules::{error_count, Diagnostic};

/// Pad `text` with spaces up to `width` display columns.
fn pad(text: &str, width: usize) -> String {
    let shown = UnicodeWidthStr::width(text);
    let mut padded = String::from(text);
    padded.extend(std::iter::repeat_n(' ', width.saturating_sub(shown)));
    padded
}

fn widest<'a>(items: impl Iterator<Item = &'a str>) -> usize {
    items.map(UnicodeWidthStr::width).max().unwrap_or(0)
}

/// One line per diagnostic: severity, code, target, message.
pub fn diagnostics(diagnostics: &[Diagnostic]) -> String {
    let targets: Vec<String> = diagnostics
        .iter()
        .map(|d| d.target.as_ref().map(ToString::to_string).unwrap_or_default())
        .collect();
    let code_width = widest(diagnostics.iter().map(|d| d.code));
    let target_width = widest(targets.iter().map(String::as_str));

    let mut output = String::new();
    for (diag, target) in diagnostics.iter().zip(&targets) {
        let line = format!(
            "{} {} {} {}",
            pad(&diag.severity.to_string(), 7),
            pad(diag.code, code_width),
            pad(target, target_width),
            diag.message
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output.push_str(&summary(diagnostics));
    output.push('\n');
    output
}

pub fn summary(diagnostics: &[Diagnostic]) -> String {
    let errors = error_count(diagnostics);
    format!("{} error(s), {} warning(s)", errors, diagnostics.len() - errors)
}

/// Classic MLD notation: `Table (_pk_, column, #fk)`.
pub fn classic(schema: &LogicalSchema) -> String {
    let mut output = String::new();
    for table in &schema.tables {
        let columns: Vec<String> = table.columns.iter().map(classic_column).collect();
        let _ = writeln!(output, "{} ({})", table.name, columns.join(", "));
    }
    output
}

fn classic_column(column: &Column) -> String {
    let mut name = column.name.clone();
    if column.is_foreign_key {
        name.insert(0, '#');
    }
    if column.is_primary_key {
        name = format!("_{}_", name);
    }
    name
}

/// Table-by-table listing with types and flags, followed by the notes.
pub fn tables(schema: &LogicalSchema) -> String {
    let columns = || schema.tables.iter().flat_map(|t| t.columns.iter());
    let name_width = widest(columns().map(|c| c.name.as_str()));
    let type_width = widest(columns().map(|c| c.data_type.as_str()));

    let mut output = String::new();
    for (i, table) in schema.tables.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        output.push_str(&table.name);
        output.push('\n');
        for column in &table.columns {
            let line = format!(
                "  {} {} {}",
                pad(&column.name, name_width),
                pad(&column.data_type, type_width),
                flags(schema, &table.name, column)
            );
            output.push_str(line.trim_end());
            output.push('\n');
        }
    }

    for note in &schema.notes {
        let _ = writeln!(output, "note: {}", note);
    }
    output
}

fn flags(schema: &LogicalSchema, table: &str, column: &Column) -> String {
    let mut flags = Vec::new();
    if column.is_primary_key {
        flags.push("PK".to_string());
    }
    if let Some((to_table, to_column)) = &column.references {
        let action = schema
            .foreign_keys_of(table)
            .find(|fk| fk.from_column == column.name)
            .and_then(|fk| fk.on_delete)
            .map(|a| format!(" ON DELETE {}", a.as_sql()))
            .unwrap_or_default();
        flags.push(format!("FK -> {}.{}{}", to_table, to_column, action));
    }
    if column.is_unique {
        flags.push("UNIQUE".to_string());
    }
    if column.auto_increment {
        flags.push("AUTO".to_string());
    }
    if !column.nullable && !column.is_primary_key {
        flags.push("NOT NULL".to_string());
    }
    if let Some(value) = &column.default_value {
        flags.push(format!("DEFAULT {}", value));
    }
    flags.join(" ")
}
