//! Abstract attribute types to dialect SQL types.

use super::Dialect;

/// Parameters of a declared type: `VARCHAR(100)`, `DECIMAL(10,2)`,
/// `ENUM('a','b')`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeParams {
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub values: Vec<String>,
}

/// A declared type split into its name and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub params: TypeParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AbstractType {
    Varchar,
    Char,
    Text,
    Integer,
    SmallInt,
    BigInt,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
    Timestamp,
    Blob,
    Json,
    Uuid,
    Enum,
    Set,
}

impl AbstractType {
    fn from_name(name: &str) -> Option<Self> {
        let t = match name {
            "VARCHAR" | "VARCHAR2" | "NVARCHAR" | "CHARACTER VARYING" | "STRING" => Self::Varchar,
            "CHAR" | "CHARACTER" | "NCHAR" => Self::Char,
            "TEXT" | "CLOB" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" => Self::Text,
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" => Self::Integer,
            "SMALLINT" | "TINYINT" | "INT2" => Self::SmallInt,
            "BIGINT" | "INT8" => Self::BigInt,
            "FLOAT" | "REAL" | "FLOAT4" => Self::Float,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => Self::Double,
            "DECIMAL" | "NUMERIC" | "NUMBER" | "MONEY" => Self::Decimal,
            "BOOLEAN" | "BOOL" | "BIT" => Self::Boolean,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" | "DATETIME2" => Self::DateTime,
            "TIMESTAMP" | "TIMESTAMPTZ" => Self::Timestamp,
            "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" | "LONGBLOB" => Self::Blob,
            "JSON" | "JSONB" => Self::Json,
            "UUID" | "GUID" | "UNIQUEIDENTIFIER" => Self::Uuid,
            "ENUM" => Self::Enum,
            "SET" => Self::Set,
            _ => return None,
        };
        Some(t)
    }
}

impl TypeSpec {
    /// Split `DECIMAL(10, 2)` into `DECIMAL` and its parameters. The name is
    /// uppercased with inner whitespace collapsed.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (name, args) = match raw.split_once('(') {
            Some((name, rest)) => (name, rest.strip_suffix(')').unwrap_or(rest)),
            None => (raw, ""),
        };
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        let args = split_args(args);

        let mut params = TypeParams::default();
        match AbstractType::from_name(&name) {
            Some(AbstractType::Enum | AbstractType::Set) => {
                params.values = args.iter().map(|a| unquote(a)).collect();
            }
            Some(AbstractType::Decimal | AbstractType::Float | AbstractType::Double) => {
                params.precision = args.first().and_then(|a| a.parse().ok());
                params.scale = args.get(1).and_then(|a| a.parse().ok());
            }
            _ => params.length = args.first().and_then(|a| a.parse().ok()),
        }
        Self { name, params }
    }

    pub fn is_enum(&self) -> bool {
        AbstractType::from_name(&self.name) == Some(AbstractType::Enum)
    }

    pub fn map(&self, dialect: Dialect) -> String {
        map_type(&self.name, &self.params, dialect)
    }
}

/// Map an abstract type name to `dialect`. Unknown names map to the
/// dialect's generic text type.
pub fn map_type(type_name: &str, params: &TypeParams, dialect: Dialect) -> String {
    let name = type_name.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
    match AbstractType::from_name(&name) {
        Some(t) => render(t, params, dialect),
        None => fallback_type(dialect).to_string(),
    }
}

/// Parse and map a declared type such as `VARCHAR(100)`.
pub fn map_declared_type(declared: &str, dialect: Dialect) -> String {
    TypeSpec::parse(declared).map(dialect)
}

pub fn fallback_type(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::MySql | Dialect::PostgreSql => "VARCHAR(255)",
        Dialect::Sqlite => "TEXT",
        Dialect::Oracle => "VARCHAR2(255)",
        Dialect::SqlServer => "NVARCHAR(255)",
    }
}

/// Column type of an auto-incremented key, from its already mapped type.
pub fn identity_type(mapped: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::MySql => format!("{} AUTO_INCREMENT", mapped),
        Dialect::PostgreSql if mapped == "BIGINT" => "BIGSERIAL".to_string(),
        Dialect::PostgreSql => "SERIAL".to_string(),
        Dialect::Sqlite => "INTEGER".to_string(),
        Dialect::Oracle => format!("{} GENERATED ALWAYS AS IDENTITY", mapped),
        Dialect::SqlServer => format!("{} IDENTITY(1,1)", mapped),
    }
}

fn render(t: AbstractType, p: &TypeParams, dialect: Dialect) -> String {
    use AbstractType as T;
    use Dialect as D;

    let fixed = |s: &str| s.to_string();
    match t {
        T::Varchar => varchar(p.length.unwrap_or(255), dialect),
        T::Char => {
            let n = p.length.unwrap_or(1);
            match dialect {
                D::SqlServer => format!("NCHAR({})", n),
                _ => format!("CHAR({})", n),
            }
        }
        T::Text => fixed(match dialect {
            D::MySql | D::PostgreSql | D::Sqlite => "TEXT",
            D::Oracle => "CLOB",
            D::SqlServer => "NVARCHAR(MAX)",
        }),
        T::Integer => fixed(match dialect {
            D::MySql | D::SqlServer => "INT",
            D::PostgreSql | D::Sqlite => "INTEGER",
            D::Oracle => "NUMBER(10)",
        }),
        T::SmallInt => fixed(match dialect {
            D::Sqlite => "INTEGER",
            D::Oracle => "NUMBER(5)",
            _ => "SMALLINT",
        }),
        T::BigInt => fixed(match dialect {
            D::Sqlite => "INTEGER",
            D::Oracle => "NUMBER(19)",
            _ => "BIGINT",
        }),
        T::Float => fixed(match dialect {
            D::MySql => "FLOAT",
            D::Oracle => "BINARY_FLOAT",
            _ => "REAL",
        }),
        T::Double => fixed(match dialect {
            D::MySql => "DOUBLE",
            D::PostgreSql => "DOUBLE PRECISION",
            D::Sqlite => "REAL",
            D::Oracle => "BINARY_DOUBLE",
            D::SqlServer => "FLOAT",
        }),
        T::Decimal => {
            let name = match dialect {
                D::MySql | D::SqlServer => "DECIMAL",
                D::PostgreSql | D::Sqlite => "NUMERIC",
                D::Oracle => "NUMBER",
            };
            match (p.precision, p.scale) {
                (None, _) => format!("{}(10,2)", name),
                (Some(precision), None) => format!("{}({})", name, precision),
                (Some(precision), Some(scale)) => format!("{}({},{})", name, precision, scale),
            }
        }
        T::Boolean => fixed(match dialect {
            D::MySql | D::PostgreSql => "BOOLEAN",
            D::Sqlite => "INTEGER",
            D::Oracle => "NUMBER(1)",
            D::SqlServer => "BIT",
        }),
        T::Date => fixed(match dialect {
            D::Sqlite => "TEXT",
            _ => "DATE",
        }),
        T::Time => fixed(match dialect {
            D::Sqlite => "TEXT",
            D::Oracle => "TIMESTAMP",
            _ => "TIME",
        }),
        T::DateTime => fixed(match dialect {
            D::MySql => "DATETIME",
            D::PostgreSql | D::Oracle => "TIMESTAMP",
            D::Sqlite => "TEXT",
            D::SqlServer => "DATETIME2",
        }),
        T::Timestamp => fixed(match dialect {
            D::MySql | D::PostgreSql | D::Oracle => "TIMESTAMP",
            D::Sqlite => "TEXT",
            D::SqlServer => "DATETIME2",
        }),
        T::Blob => fixed(match dialect {
            D::PostgreSql => "BYTEA",
            D::SqlServer => "VARBINARY(MAX)",
            _ => "BLOB",
        }),
        T::Json => fixed(match dialect {
            D::MySql => "JSON",
            D::PostgreSql => "JSONB",
            D::Sqlite => "TEXT",
            D::Oracle => "CLOB",
            D::SqlServer => "NVARCHAR(MAX)",
        }),
        T::Uuid => fixed(match dialect {
            D::MySql => "CHAR(36)",
            D::PostgreSql => "UUID",
            D::Sqlite => "TEXT",
            D::Oracle => "RAW(16)",
            D::SqlServer => "UNIQUEIDENTIFIER",
        }),
        T::Enum if p.values.is_empty() => fallback_type(dialect).to_string(),
        T::Enum => match dialect {
            D::MySql => format!("ENUM({})", value_list(&p.values)),
            D::Sqlite => fixed("TEXT"),
            _ => {
                let longest = p.values.iter().map(|v| v.chars().count()).max().unwrap_or(1);
                varchar(longest.max(1) as u32, dialect)
            }
        },
        T::Set => match dialect {
            D::MySql if !p.values.is_empty() => format!("SET({})", value_list(&p.values)),
            D::PostgreSql => fixed("TEXT[]"),
            D::Oracle => fixed("VARCHAR2(4000)"),
            D::SqlServer => fixed("NVARCHAR(MAX)"),
            _ => fixed("TEXT"),
        },
    }
}

fn varchar(n: u32, dialect: Dialect) -> String {
    match dialect {
        Dialect::MySql | Dialect::PostgreSql | Dialect::Sqlite => format!("VARCHAR({})", n),
        Dialect::Oracle if n > 4000 => "CLOB".to_string(),
        Dialect::Oracle => format!("VARCHAR2({})", n),
        Dialect::SqlServer if n > 4000 => "NVARCHAR(MAX)".to_string(),
        Dialect::SqlServer => format!("NVARCHAR({})", n),
    }
}

/// `'a', 'b'` with embedded quotes doubled.
pub fn value_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split on commas outside single quotes; empty input gives no arguments.
fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in args.chars() {
        match c {
            '\'' => {
                quoted = !quoted;
                current.push(c);
            }
            ',' if !quoted => out.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !out.is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

fn unquote(arg: &str) -> String {
    let inner = arg
        .strip_prefix('\'')
        .and_then(|a| a.strip_suffix('\''))
        .or_else(|| arg.strip_prefix('"').and_then(|a| a.strip_suffix('"')))
        .unwrap_or(arg);
    inner.replace("''", "'")
}
