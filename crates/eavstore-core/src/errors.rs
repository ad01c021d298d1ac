use thiserror::Error;

/// Result type alias using EavError
pub type Result<T> = std::result::Result<T, EavError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages. Store and engine operations report every failure as one
/// of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,

    // Storage constraints (unique slug, duplicate pair, foreign key)
    Conflict,

    // Aggregate payloads and stored rows that cannot be read back
    Decode,

    // Integration/IO
    Persistence,
    Serialization,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::Decode => "ERR_DECODE",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind for programmatic handling plus the record identifiers and
/// operation name that were in play when the failure happened.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<i64>,
    attribute_id: Option<i64>,
    item_id: Option<i64>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            attribute_id: None,
            item_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: i64) -> Self {
        self.entity_id = Some(id);
        self
    }

    /// Add attribute ID context
    pub fn with_attribute_id(mut self, id: i64) -> Self {
        self.attribute_id = Some(id);
        self
    }

    /// Add item ID context
    pub fn with_item_id(mut self, id: i64) -> Self {
        self.item_id = Some(id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<i64> {
        self.entity_id
    }

    /// Get the attribute ID context, if any
    pub fn attribute_id(&self) -> Option<i64> {
        self.attribute_id
    }

    /// Get the item ID context, if any
    pub fn item_id(&self) -> Option<i64> {
        self.item_id
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(attribute_id) = self.attribute_id {
            write!(f, " (attribute_id: {})", attribute_id)?;
        }
        if let Some(item_id) = self.item_id {
            write!(f, " (item_id: {})", item_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the model, codec and payload decoder
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EavError {
    // ===== Lookup Errors =====
    /// No entity row matched the lookup
    #[error("Entity not found: {selector}")]
    EntityNotFound { selector: String },

    /// No attribute row matched the lookup
    #[error("Attribute not found: {selector}")]
    AttributeNotFound { selector: String },

    /// No item row with this id
    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: i64 },

    /// No entity_attribute row for the pair
    #[error("Attribute {attribute_id} is not linked to entity {entity_id}")]
    LinkNotFound { entity_id: i64, attribute_id: i64 },

    /// No item_attribute row for the pair
    #[error("Item {item_id} has no value for attribute {attribute_id}")]
    ValueNotFound { item_id: i64, attribute_id: i64 },

    // ===== Validation Errors =====
    /// Type tag outside the fixed vocabulary
    #[error("Invalid attribute type: '{tag}'")]
    InvalidAttributeType { tag: String },

    /// Lookup selector missing, doubled, or unusable
    #[error("Invalid lookup: {reason}")]
    InvalidLookup { reason: String },

    /// Caller-supplied text does not parse as the declared type
    #[error("Invalid {attribute_type} value '{input}'")]
    InvalidValue {
        attribute_type: String,
        input: String,
    },

    /// Native value or stored scalar does not have the shape the tag expects
    #[error("Type mismatch for {attribute_type}: {reason}")]
    TypeMismatch {
        attribute_type: String,
        reason: String,
    },

    // ===== Decode Errors =====
    /// Aggregate hydration payload is not valid UTF-8 JSON of the expected shape
    #[error("Malformed relation payload: {reason}")]
    MalformedPayload { reason: String },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from EavError to ExError
///
/// Store and engine code propagates core errors with `?`; the kind is
/// decided here so every call site classifies the same way.
impl From<EavError> for ExError {
    fn from(err: EavError) -> Self {
        let message = err.to_string();
        match err {
            EavError::EntityNotFound { .. } | EavError::AttributeNotFound { .. } => {
                ExError::new(ExErrorKind::NotFound).with_message(message)
            }

            EavError::ItemNotFound { item_id } => ExError::new(ExErrorKind::NotFound)
                .with_item_id(item_id)
                .with_message(message),

            EavError::LinkNotFound {
                entity_id,
                attribute_id,
            } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(entity_id)
                .with_attribute_id(attribute_id)
                .with_message(message),

            EavError::ValueNotFound {
                item_id,
                attribute_id,
            } => ExError::new(ExErrorKind::NotFound)
                .with_item_id(item_id)
                .with_attribute_id(attribute_id)
                .with_message(message),

            EavError::InvalidAttributeType { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("parse_attribute_type")
                .with_message(message),

            EavError::InvalidLookup { .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("lookup")
                .with_message(message),

            EavError::InvalidValue { .. } | EavError::TypeMismatch { .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("value_codec")
                    .with_message(message)
            }

            EavError::MalformedPayload { .. } => ExError::new(ExErrorKind::Decode)
                .with_op("decode_relation_payload")
                .with_message(message),

            EavError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            EavError::Internal { .. } => ExError::new(ExErrorKind::Internal).with_message(message),
        }
    }
}

impl From<serde_json::Error> for EavError {
    fn from(err: serde_json::Error) -> Self {
        EavError::Serialization {
            message: err.to_string(),
        }
    }
}
