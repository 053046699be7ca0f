use serde_derive::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub table: String,
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    pub fn new(table: &str, name: &str, columns: Vec<String>, unique: bool) -> Self {
        Self {
            table: table.to_owned(),
            name: name.to_owned(),
            columns,
            unique,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    pub name: Option<String>,
    pub unique: bool,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Picks which index definitions a `remove_index` call applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum IndexSelector {
    Name(String),
    Columns(Vec<String>),
}

impl IndexSelector {
    pub fn matches(&self, index: &Index) -> bool {
        match self {
            Self::Name(name) => index.name == *name,
            Self::Columns(columns) => index.columns == *columns,
        }
    }
}
