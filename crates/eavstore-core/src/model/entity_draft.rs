use super::attribute_type::AttributeType;
use super::lookup::Lookup;

/// Attribute named in an entity definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftAttribute {
    /// An attribute already in the registry
    Existing(Lookup),
    /// An attribute created while the definition is saved
    New {
        name: String,
        slug: String,
        attribute_type: AttributeType,
    },
}

impl DraftAttribute {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Self {
        DraftAttribute::New {
            name: name.into(),
            slug: slug.into(),
            attribute_type,
        }
    }

    pub fn existing(lookup: Lookup) -> Self {
        DraftAttribute::Existing(lookup)
    }
}

impl From<Lookup> for DraftAttribute {
    fn from(lookup: Lookup) -> Self {
        DraftAttribute::Existing(lookup)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLink {
    pub attribute: DraftAttribute,
    pub required: bool,
}

/// An entity not yet saved, with the attributes it should be linked to
///
/// Saving creates the entity, creates each [`DraftAttribute::New`], then
/// links every attribute with its required flag, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDraft {
    pub name: String,
    pub slug: String,
    links: Vec<DraftLink>,
}

impl EntityDraft {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            links: Vec::new(),
        }
    }

    /// Add an optional attribute
    pub fn with_attribute(self, attribute: impl Into<DraftAttribute>) -> Self {
        self.push(attribute.into(), false)
    }

    /// Add an attribute the entity marks as required
    pub fn with_required_attribute(self, attribute: impl Into<DraftAttribute>) -> Self {
        self.push(attribute.into(), true)
    }

    fn push(mut self, attribute: DraftAttribute, required: bool) -> Self {
        self.links.push(DraftLink {
            attribute,
            required,
        });
        self
    }

    pub fn links(&self) -> &[DraftLink] {
        &self.links
    }
}
