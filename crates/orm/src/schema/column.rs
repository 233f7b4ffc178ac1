//! Column definitions and their fluent modifiers

use std::fmt;

/// Logical column type. Each variant renders to exactly one SQL type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Integer,
    BigInteger,
    Varchar(u32),
    Char(u32),
    Text,
    Boolean,
    DateTime,
    Timestamp,
    Date,
    Time,
    Decimal { precision: u32, scale: u32 },
    Float(u32),
    Double(u32),
    Binary(u32),
    VarBinary(u32),
    Enum(Vec<String>),
    Set(Vec<String>),
    Json,
}

impl ColumnType {
    /// SQL type text, e.g. `VARCHAR(255)` or `ENUM('a', 'b')`
    pub fn to_sql(&self) -> String {
        match self {
            ColumnType::Integer => "INT".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Varchar(length) => format!("VARCHAR({})", length),
            ColumnType::Char(length) => format!("CHAR({})", non_zero_or(*length, 255)),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({},{})", precision, scale),
            ColumnType::Float(0) => "FLOAT".to_string(),
            ColumnType::Float(precision) => format!("FLOAT({})", precision),
            ColumnType::Double(0) => "DOUBLE".to_string(),
            ColumnType::Double(precision) => format!("DOUBLE({})", precision),
            ColumnType::Binary(length) => format!("BINARY({})", non_zero_or(*length, 16)),
            ColumnType::VarBinary(length) => format!("VARBINARY({})", non_zero_or(*length, 255)),
            ColumnType::Enum(values) => enum_or_set("ENUM", values),
            ColumnType::Set(values) => enum_or_set("SET", values),
            ColumnType::Json => "JSON".to_string(),
        }
    }

    /// Integer types are the only ones that render `UNSIGNED`
    pub fn is_integer(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::BigInteger)
    }

    /// `TIMESTAMP` and `DATETIME` accept `CURRENT_TIMESTAMP` modifiers
    pub fn is_timestamp_like(&self) -> bool {
        matches!(self, ColumnType::Timestamp | ColumnType::DateTime)
    }
}

fn non_zero_or(value: u32, fallback: u32) -> u32 {
    if value > 0 {
        value
    } else {
        fallback
    }
}

fn enum_or_set(keyword: &str, values: &[String]) -> String {
    if values.is_empty() {
        return format!("{}('')", keyword);
    }
    let quoted: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
    format!("{}({})", keyword, quoted.join(", "))
}

/// Single-quote a string literal, doubling embedded quotes
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Column default value
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    CurrentTimestamp,
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Expression rendered verbatim
    Raw(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Null => write!(f, "NULL"),
            DefaultValue::CurrentTimestamp => write!(f, "CURRENT_TIMESTAMP"),
            DefaultValue::String(s) => write!(f, "{}", quote_literal(s)),
            DefaultValue::Bool(b) => write!(f, "{}", b),
            DefaultValue::Integer(i) => write!(f, "{}", i),
            DefaultValue::Float(v) => write!(f, "{}", v),
            DefaultValue::Raw(expr) => write!(f, "{}", expr),
        }
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        match value {
            "NULL" => DefaultValue::Null,
            "CURRENT_TIMESTAMP" => DefaultValue::CurrentTimestamp,
            other => DefaultValue::String(other.to_string()),
        }
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::from(value.as_str())
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Bool(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Integer(value as i64)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Integer(value)
    }
}

impl From<u32> for DefaultValue {
    fn from(value: u32) -> Self {
        DefaultValue::Integer(value as i64)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Float(value)
    }
}

/// One column of a blueprint
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) column_type: ColumnType,
    pub(crate) unsigned: bool,
    pub(crate) nullable: bool,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) auto_increment: bool,
    pub(crate) primary: bool,
    pub(crate) unique: bool,
    pub(crate) indexed: bool,
    pub(crate) on_update: Option<String>,
    pub(crate) annotation: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            unsigned: false,
            nullable: false,
            default: None,
            auto_increment: false,
            primary: false,
            unique: false,
            indexed: false,
            on_update: None,
            annotation: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Allow NULL values
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Set the default value
    pub fn default(&mut self, value: impl Into<DefaultValue>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    /// Mark as unsigned; only integer types render it
    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    pub fn index(&mut self) -> &mut Self {
        self.indexed = true;
        self
    }

    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }

    pub fn primary(&mut self) -> &mut Self {
        self.primary = true;
        self
    }

    /// `DEFAULT CURRENT_TIMESTAMP`, for `TIMESTAMP`/`DATETIME` columns only
    pub fn use_current(&mut self) -> &mut Self {
        if self.column_type.is_timestamp_like() {
            self.default = Some(DefaultValue::CurrentTimestamp);
        }
        self
    }

    /// `ON UPDATE CURRENT_TIMESTAMP`, for `TIMESTAMP`/`DATETIME` columns only
    pub fn on_update_current(&mut self) -> &mut Self {
        if self.column_type.is_timestamp_like() {
            self.on_update = Some("CURRENT_TIMESTAMP".to_string());
        }
        self
    }

    /// Place the column after another one. Replaces any earlier placement or charset.
    pub fn after(&mut self, column: &str) -> &mut Self {
        self.annotation = Some(format!("AFTER {}", column));
        self
    }

    /// Place the column first. Replaces any earlier placement or charset.
    pub fn first(&mut self) -> &mut Self {
        self.annotation = Some("FIRST".to_string());
        self
    }

    pub fn charset(&mut self, charset: &str) -> &mut Self {
        self.annotate(format!("CHARSET {}", charset))
    }

    pub fn collation(&mut self, collation: &str) -> &mut Self {
        self.annotate(format!("COLLATE {}", collation))
    }

    fn annotate(&mut self, text: String) -> &mut Self {
        self.annotation = Some(match self.annotation.take() {
            Some(existing) => format!("{} {}", existing, text),
            None => text,
        });
        self
    }

    /// Column clause as it appears inside `CREATE TABLE`
    pub fn to_sql(&self) -> String {
        let mut parts = vec![self.name.clone(), self.column_type.to_sql()];

        if self.unsigned && self.column_type.is_integer() {
            parts.push("UNSIGNED".to_string());
        }
        if !self.nullable {
            parts.push("NOT NULL".to_string());
        }
        if let Some(default) = &self.default {
            parts.push(format!("DEFAULT {}", default));
        }
        if self.auto_increment {
            parts.push("AUTO_INCREMENT".to_string());
        }
        if self.primary {
            parts.push("PRIMARY KEY".to_string());
        }
        if let Some(on_update) = &self.on_update {
            parts.push(format!("ON UPDATE {}", on_update));
        }
        if let Some(annotation) = &self.annotation {
            parts.push(annotation.clone());
        }

        parts.join(" ")
    }
}
