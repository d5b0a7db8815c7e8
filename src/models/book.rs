//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    /// Generated identifier, e.g. `TB-0001`
    pub id: String,
    pub name: String,
    pub author: String,
    pub year: i32,
    /// False while an unreturned record references this book
    pub is_available: bool,
}

impl Book {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        author: impl Into<String>,
        year: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            author: author.into(),
            year,
            is_available: true,
        }
    }

    /// A book reference is either its exact id or its name, case-insensitively
    pub fn matches(&self, reference: &str) -> bool {
        self.id == reference || self.name.to_lowercase() == reference.to_lowercase()
    }

    pub fn to_ref(&self) -> BookRef {
        BookRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {} ({}) - ID: {}", self.name, self.author, self.year, self.id)
    }
}

/// Reference from a record to a catalog entry.
///
/// Only identity is carried; availability is owned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookRef {
    pub id: String,
    pub name: String,
}

/// Book fields as entered by the user
#[derive(Debug, Clone, Default)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    /// Raw year text, validated as a non-negative integer
    pub year: String,
}
