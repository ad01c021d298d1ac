use std::fmt;

use crate::errors::{EavError, Result};

/// Selector for a single entity or attribute row
///
/// Resolves to a fixed column reference; caller text is only ever bound as a
/// statement parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    Id(i64),
    Slug(String),
}

impl Lookup {
    /// Build a lookup from an id selector and a slug selector
    ///
    /// Exactly one of the two must be given.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLookup` when both or neither selector is present, or
    /// when the slug is empty.
    pub fn from_selectors(id: Option<i64>, slug: Option<&str>) -> Result<Self> {
        match (id, slug) {
            (Some(id), None) => Ok(Lookup::Id(id)),
            (None, Some(slug)) => Self::slug(slug),
            (Some(_), Some(_)) => Err(EavError::InvalidLookup {
                reason: "id and slug are mutually exclusive".to_string(),
            }),
            (None, None) => Err(EavError::InvalidLookup {
                reason: "either id or slug is required".to_string(),
            }),
        }
    }

    /// Interpret a single argument: all digits is an id, anything else a slug
    ///
    /// # Errors
    ///
    /// Returns `InvalidLookup` for empty input or a digit string that does
    /// not fit an `i64`.
    pub fn parse(arg: &str) -> Result<Self> {
        let arg = arg.trim();
        if !arg.is_empty() && arg.bytes().all(|b| b.is_ascii_digit()) {
            return arg
                .parse::<i64>()
                .map(Lookup::Id)
                .map_err(|e| EavError::InvalidLookup {
                    reason: format!("id '{}' out of range: {}", arg, e),
                });
        }
        Self::slug(arg)
    }

    fn slug(slug: &str) -> Result<Self> {
        if slug.is_empty() {
            return Err(EavError::InvalidLookup {
                reason: "slug must not be empty".to_string(),
            });
        }
        Ok(Lookup::Slug(slug.to_string()))
    }

    /// WHERE clause for `table`, binding the selector as `?1`
    pub fn predicate(&self, table: LookupTable) -> &'static str {
        match (table, self) {
            (LookupTable::Entities, Lookup::Id(_)) => "entities.id = ?1",
            (LookupTable::Entities, Lookup::Slug(_)) => "entities.slug = ?1",
            (LookupTable::Attributes, Lookup::Id(_)) => "attributes.id = ?1",
            (LookupTable::Attributes, Lookup::Slug(_)) => "attributes.slug = ?1",
        }
    }
}

/// Tables a [`Lookup`] can be resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    Entities,
    Attributes,
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "id={}", id),
            Lookup::Slug(slug) => write!(f, "slug={}", slug),
        }
    }
}

impl From<i64> for Lookup {
    fn from(id: i64) -> Self {
        Lookup::Id(id)
    }
}
