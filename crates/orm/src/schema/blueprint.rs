//! Blueprint - one table's columns, indexes and foreign keys
//!
//! A blueprint is filled synchronously inside a `Schema::create` callback and
//! rendered once to a MySQL `CREATE TABLE` statement.

use super::column::{Column, ColumnType};
use super::foreign::{ForeignKey, ForeignKeyBuilder};

/// Kind of an explicitly declared index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Index,
    Unique,
}

/// Named index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub kind: IndexKind,
}

impl Index {
    pub fn to_sql(&self) -> String {
        let columns = self.columns.join(", ");
        match self.kind {
            IndexKind::Unique => format!("UNIQUE KEY {} ({})", self.name, columns),
            IndexKind::Index => format!("KEY {} ({})", self.name, columns),
        }
    }
}

/// Table definition under construction
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    table: String,
    columns: Vec<Column>,
    indexes: Vec<Index>,
    pub(crate) foreign: Vec<ForeignKey>,
    primary_key: Vec<String>,
}

impl Blueprint {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign
    }

    fn add_column(&mut self, name: &str, column_type: ColumnType) -> &mut Column {
        self.columns.push(Column::new(name, column_type));
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    /// Auto-increment unsigned integer primary key
    pub fn increments(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Integer)
            .unsigned()
            .auto_increment()
            .primary()
    }

    /// `increments("id")`
    pub fn id(&mut self) -> &mut Column {
        self.increments("id")
    }

    pub fn integer(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Integer)
    }

    pub fn unsigned_integer(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Integer).unsigned()
    }

    pub fn big_integer(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::BigInteger)
    }

    /// `VARCHAR`, 255 characters unless a length is given
    pub fn string(&mut self, name: &str, length: Option<u32>) -> &mut Column {
        self.add_column(name, ColumnType::Varchar(length.unwrap_or(255)))
    }

    pub fn char(&mut self, name: &str, length: u32) -> &mut Column {
        self.add_column(name, ColumnType::Char(length))
    }

    pub fn text(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Text)
    }

    pub fn boolean(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Boolean)
    }

    pub fn date_time(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::DateTime)
    }

    pub fn timestamp(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Timestamp)
    }

    pub fn date(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Date)
    }

    pub fn time(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Time)
    }

    pub fn decimal(&mut self, name: &str, precision: u32, scale: u32) -> &mut Column {
        self.add_column(name, ColumnType::Decimal { precision, scale })
    }

    /// `FLOAT`, precision 8 unless given
    pub fn float(&mut self, name: &str, precision: Option<u32>) -> &mut Column {
        self.add_column(name, ColumnType::Float(precision.unwrap_or(8)))
    }

    /// `DOUBLE`, precision 15 unless given
    pub fn double(&mut self, name: &str, precision: Option<u32>) -> &mut Column {
        self.add_column(name, ColumnType::Double(precision.unwrap_or(15)))
    }

    /// UUID stored as `CHAR(36)`
    pub fn uuid(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Char(36))
    }

    pub fn uuid_primary(&mut self, name: &str) -> &mut Column {
        self.uuid(name).primary()
    }

    /// `uuid_primary("id")`
    pub fn uuid_id(&mut self) -> &mut Column {
        self.uuid_primary("id")
    }

    /// UUID stored as `BINARY(16)`
    pub fn binary_uuid(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Binary(16))
    }

    pub fn binary(&mut self, name: &str, length: u32) -> &mut Column {
        self.add_column(name, ColumnType::Binary(length))
    }

    pub fn var_binary(&mut self, name: &str, length: u32) -> &mut Column {
        self.add_column(name, ColumnType::VarBinary(length))
    }

    pub fn enumeration(&mut self, name: &str, values: &[&str]) -> &mut Column {
        let values = values.iter().map(|v| v.to_string()).collect();
        self.add_column(name, ColumnType::Enum(values))
    }

    pub fn set(&mut self, name: &str, values: &[&str]) -> &mut Column {
        let values = values.iter().map(|v| v.to_string()).collect();
        self.add_column(name, ColumnType::Set(values))
    }

    pub fn json(&mut self, name: &str) -> &mut Column {
        self.add_column(name, ColumnType::Json)
    }

    /// `created_at` and `updated_at` timestamps
    pub fn timestamps(&mut self) {
        self.timestamp("created_at");
        self.timestamp("updated_at");
    }

    /// Timestamps maintained by the database
    pub fn uuid_timestamps(&mut self) {
        self.timestamp("created_at").use_current();
        self.timestamp("updated_at").use_current().on_update_current();
    }

    /// Nullable `deleted_at`
    pub fn soft_deletes(&mut self) {
        self.timestamp("deleted_at").nullable();
    }

    /// Nullable `remember_token VARCHAR(100)`
    pub fn remember_token(&mut self) {
        self.string("remember_token", Some(100)).nullable();
    }

    /// Polymorphic `<name>_id` integer and `<name>_type` string, both indexed
    pub fn morphs(&mut self, name: &str) {
        self.integer(&format!("{}_id", name)).index();
        self.string(&format!("{}_type", name), None).index();
    }

    /// Polymorphic `<name>_id` UUID and `<name>_type` string, both indexed
    pub fn morphs_uuid(&mut self, name: &str) {
        self.uuid(&format!("{}_id", name)).index();
        self.string(&format!("{}_type", name), None).index();
    }

    /// Composite primary key, rendered as the last clause
    pub fn primary(&mut self, columns: &[&str]) {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
    }

    /// Single-column index named `idx_<table>_<column>`
    pub fn index(&mut self, column: &str) {
        self.indexes.push(Index {
            name: format!("idx_{}_{}", self.table, column),
            columns: vec![column.to_string()],
            kind: IndexKind::Index,
        });
    }

    /// Unique index named `unique_<table>_<col1>_<col2>...`
    pub fn unique(&mut self, columns: &[&str]) {
        self.indexes.push(Index {
            name: format!("unique_{}_{}", self.table, columns.join("_")),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            kind: IndexKind::Unique,
        });
    }

    /// Unique index with an explicit name
    pub fn unique_index(&mut self, columns: &[&str], name: &str) {
        self.indexes.push(Index {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            kind: IndexKind::Unique,
        });
    }

    /// Start a foreign key on a local column
    pub fn foreign(&mut self, column: &str) -> ForeignKeyBuilder<'_> {
        ForeignKeyBuilder::new(self, column)
    }

    /// Render the `CREATE TABLE` statement.
    ///
    /// Clause order: columns, per-column unique keys, per-column keys, named
    /// indexes, foreign keys, composite primary key.
    pub fn to_sql(&self) -> String {
        let mut clauses: Vec<String> = self.columns.iter().map(Column::to_sql).collect();

        clauses.extend(
            self.columns
                .iter()
                .filter(|c| c.unique && !c.primary)
                .map(|c| format!("UNIQUE KEY ({})", c.name)),
        );
        clauses.extend(
            self.columns
                .iter()
                .filter(|c| c.indexed && !c.primary && !c.unique)
                .map(|c| format!("KEY ({})", c.name)),
        );

        clauses.extend(self.indexes.iter().map(Index::to_sql));
        clauses.extend(self.foreign.iter().map(ForeignKey::to_sql));

        if !self.primary_key.is_empty() {
            clauses.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }

        format!("CREATE TABLE {} (\n\t{}\n);", self.table, clauses.join(",\n\t"))
    }
}
