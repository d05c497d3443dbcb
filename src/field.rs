//! Core types for the field tree
//!
//! A `Field` is one node of the user-built tree. Object fields hold their
//! children in `properties`, array fields hold a single prototype `item`
//! describing every element of the array.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(Uuid);

impl FieldId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FieldId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// JSON type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Object,
        FieldType::Array,
        FieldType::Null,
    ];

    /// Name of the type as written in a schema document
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Null => "null",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field type: {0} (expected one of string, number, boolean, object, array, null)")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

/// Which child collection a new field is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Properties,
    Items,
}

/// A single node of the schema tree
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    pub name: String,
    pub field_type: FieldType,
    pub description: Option<String>,
    pub required: bool,
    /// Children of an object field
    pub properties: Vec<Field>,
    /// Prototype element of an array field
    pub item: Option<Box<Field>>,
}

impl Field {
    /// A fresh, unnamed string field with an empty property list
    pub fn new() -> Self {
        Self {
            id: FieldId::new(),
            name: String::new(),
            field_type: FieldType::String,
            description: None,
            required: false,
            properties: Vec::new(),
            item: None,
        }
    }

    /// Description, if set to something other than the empty string
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Whether an editor should offer to add a property here
    pub fn can_add_property(&self) -> bool {
        self.field_type == FieldType::Object
    }

    /// Whether an editor should offer to add an item type here
    pub fn can_add_item(&self) -> bool {
        self.field_type == FieldType::Array && self.item.is_none()
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

/// A partial update to a field.
///
/// Every key that is `Some` overwrites the corresponding attribute of the
/// target field when applied; `None` keys leave it untouched. Changing
/// `field_type` never clears children on its own; use [`FieldPatch::retype`]
/// for that.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub name: Option<String>,
    pub field_type: Option<FieldType>,
    pub description: Option<Option<String>>,
    pub required: Option<bool>,
    pub properties: Option<Vec<Field>>,
    pub item: Option<Option<Box<Field>>>,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn properties(mut self, properties: Vec<Field>) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn item(mut self, item: Option<Field>) -> Self {
        self.item = Some(item.map(Box::new));
        self
    }

    /// Type change that also drops children the new type cannot use:
    /// `properties` unless the new type is `object`, the item unless it is
    /// `array`. Children that stay relevant are left as they are.
    pub fn retype(field: &Field, new_type: FieldType) -> Self {
        let mut patch = Self::new().field_type(new_type);
        if new_type != FieldType::Object && !field.properties.is_empty() {
            patch = patch.properties(Vec::new());
        }
        if new_type != FieldType::Array && field.item.is_some() {
            patch = patch.item(None);
        }
        patch
    }

    /// Shallow-merge this patch into `field`
    pub fn apply(self, field: &mut Field) {
        if let Some(name) = self.name {
            field.name = name;
        }
        if let Some(field_type) = self.field_type {
            field.field_type = field_type;
        }
        if let Some(description) = self.description {
            field.description = description;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(properties) = self.properties {
            field.properties = properties;
        }
        if let Some(item) = self.item {
            field.item = item;
        }
    }
}
