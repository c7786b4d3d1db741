//! Target SQL dialects and identifier rules.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL and MariaDB
    MySql,
    #[default]
    PostgreSql,
    Sqlite,
    Oracle,
    /// Microsoft SQL Server (T-SQL)
    SqlServer,
}

/// Words quoted in every dialect.
const RESERVED: &[&str] = &[
    "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint",
    "create", "default", "delete", "desc", "distinct", "drop", "else", "end", "exists", "foreign",
    "from", "grant", "group", "having", "in", "index", "insert", "into", "is", "join", "key",
    "like", "limit", "not", "null", "on", "or", "order", "primary", "references", "revoke",
    "select", "table", "then", "to", "trigger", "union", "unique", "update", "user", "values",
    "view", "when", "where",
];

const RESERVED_MYSQL: &[&str] = &["interval", "keys", "range", "rank", "read", "usage", "write"];
const RESERVED_ORACLE: &[&str] = &[
    "access", "comment", "date", "file", "level", "mode", "number", "session", "size", "uid",
];
const RESERVED_SQLSERVER: &[&str] = &["file", "identity", "plan", "public", "rule", "schema"];

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::MySql,
        Dialect::PostgreSql,
        Dialect::Sqlite,
        Dialect::Oracle,
        Dialect::SqlServer,
    ];

    /// Canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::PostgreSql => "postgresql",
            Self::Sqlite => "sqlite",
            Self::Oracle => "oracle",
            Self::SqlServer => "sqlserver",
        }
    }

    /// Human-readable name, used in script headers.
    pub fn label(self) -> &'static str {
        match self {
            Self::MySql => "MySQL",
            Self::PostgreSql => "PostgreSQL",
            Self::Sqlite => "SQLite",
            Self::Oracle => "Oracle",
            Self::SqlServer => "SQL Server",
        }
    }

    pub fn max_identifier_length(self) -> Option<usize> {
        match self {
            Self::MySql => Some(64),
            Self::PostgreSql => Some(63),
            Self::Sqlite => None,
            Self::Oracle => Some(30),
            Self::SqlServer => Some(128),
        }
    }

    /// PostgreSQL and Oracle count the limit in bytes, the others in
    /// characters.
    fn limit_in_bytes(self) -> bool {
        matches!(self, Self::PostgreSql | Self::Oracle)
    }

    /// Oracle takes ASCII only; the others accept any Unicode letter or digit.
    pub fn is_identifier_char(self, c: char) -> bool {
        if c == '_' {
            return true;
        }
        match self {
            Self::Oracle => c.is_ascii_alphanumeric() || matches!(c, '$' | '#'),
            Self::MySql => c.is_alphanumeric() || c == '$',
            Self::PostgreSql | Self::Sqlite => c.is_alphanumeric(),
            Self::SqlServer => c.is_alphanumeric() || matches!(c, '$' | '#' | '@'),
        }
    }

    /// Whether an unquoted identifier may begin with `c`. Digits, `$`, and
    /// the T-SQL `#`/`@` prefixes never may; Oracle also refuses `_`.
    pub fn is_identifier_start(self, c: char) -> bool {
        match self {
            Self::Oracle => c.is_ascii_alphabetic(),
            _ => c.is_alphabetic() || c == '_',
        }
    }

    /// PostgreSQL keeps identifiers as written; the others are lowercased.
    pub fn folds_case(self) -> bool {
        !matches!(self, Self::PostgreSql)
    }

    pub fn is_reserved(self, ident: &str) -> bool {
        let lower = ident.to_lowercase();
        let extra: &[&str] = match self {
            Self::MySql => RESERVED_MYSQL,
            Self::Oracle => RESERVED_ORACLE,
            Self::SqlServer => RESERVED_SQLSERVER,
            Self::PostgreSql | Self::Sqlite => &[],
        };
        RESERVED.contains(&lower.as_str()) || extra.contains(&lower.as_str())
    }

    pub fn quote(self, ident: &str) -> String {
        match self {
            Self::MySql => format!("`{}`", ident),
            Self::PostgreSql => format!("\"{}\"", ident),
            Self::Sqlite | Self::SqlServer => format!("[{}]", ident),
            Self::Oracle => format!("\"{}\"", ident.to_uppercase()),
        }
    }

    /// Replace disallowed characters with `_`, fold case, prefix names that
    /// cannot start an identifier and truncate to the dialect's limit.
    /// Never quotes.
    pub fn normalize_identifier(self, name: &str) -> String {
        let mut ident: String = name
            .trim()
            .chars()
            .map(|c| if self.is_identifier_char(c) { c } else { '_' })
            .collect();
        if self.folds_case() {
            ident = ident.to_lowercase();
        }
        if ident.is_empty() {
            ident.push('_');
        }
        if !ident.chars().next().is_some_and(|c| self.is_identifier_start(c)) {
            let prefix = if self == Self::Oracle { "t_" } else { "_" };
            ident.insert_str(0, prefix);
        }
        self.fit(&ident, "")
    }

    /// `base` cut short enough that `base + suffix` fits the length limit.
    pub fn fit(self, base: &str, suffix: &str) -> String {
        let Some(max) = self.max_identifier_length() else {
            return format!("{}{}", base, suffix);
        };
        let room = max.saturating_sub(suffix.len());
        let mut end = 0;
        for (count, (at, c)) in base.char_indices().enumerate() {
            let used = if self.limit_in_bytes() { at + c.len_utf8() } else { count + 1 };
            if used > room {
                break;
            }
            end = at + c.len_utf8();
        }
        format!("{}{}", &base[..end], suffix)
    }

    /// [`normalize_identifier`](Self::normalize_identifier), then quote
    /// reserved words.
    pub fn sanitize_identifier(self, name: &str) -> String {
        let ident = self.normalize_identifier(name);
        if self.is_reserved(&ident) {
            self.quote(&ident)
        } else {
            ident
        }
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Self::PostgreSql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "oracle" => Ok(Self::Oracle),
            "sqlserver" | "sql server" | "mssql" | "tsql" => Ok(Self::SqlServer),
            _ => Err(ConfigError::UnsupportedDialect(s.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
