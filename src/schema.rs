//! JSON Schema compilation for field trees
//!
//! Compilation is a pure function of the fields passed in. Unnamed fields are
//! skipped at every depth, and a `required` list is only emitted when it has
//! at least one entry.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::config::RenderOptions;
use crate::field::{Field, FieldType};

/// Compile a sequence of fields into a JSON Schema object
pub fn compile(fields: &[Field]) -> Value {
    tracing::trace!(fields = fields.len(), "compiling schema");
    object_schema(fields).build()
}

/// Build a JSON schema object
fn object_schema(fields: &[Field]) -> SchemaBuilder {
    fields
        .iter()
        .filter(|field| !field.name.is_empty())
        .fold(SchemaBuilder::new(), |schema, field| {
            schema.property(&field.name, field_schema(field), field.required)
        })
}

fn field_schema(field: &Field) -> Value {
    let mut schema = Map::new();
    schema.insert("type".to_string(), json!(field.field_type.as_str()));

    if let Some(description) = field.description() {
        schema.insert("description".to_string(), json!(description));
    }

    match field.field_type {
        FieldType::Object if !field.properties.is_empty() => {
            object_schema(&field.properties).write_members(&mut schema);
        }
        FieldType::Array => {
            if let Some(item) = field.item.as_deref() {
                schema.insert("items".to_string(), item_schema(item));
            }
        }
        _ => {}
    }

    Value::Object(schema)
}

/// Schema of an array's prototype item. Its name plays no part.
fn item_schema(item: &Field) -> Value {
    let mut schema = Map::new();
    schema.insert("type".to_string(), json!(item.field_type.as_str()));

    if item.field_type == FieldType::Object && !item.properties.is_empty() {
        object_schema(&item.properties).write_members(&mut schema);
    }

    if let Some(description) = item.description() {
        schema.insert("description".to_string(), json!(description));
    }

    Value::Object(schema)
}

/// Schema builder for object schemas
struct SchemaBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl SchemaBuilder {
    fn new() -> Self {
        Self {
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Add a property to the schema. A repeated name replaces the earlier
    /// schema in place and is listed in `required` once per occurrence.
    fn property(mut self, name: &str, schema: Value, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required {
            self.required.push(name.to_string());
        }
        self
    }

    /// Copy `properties` and a non-empty `required` into an existing schema
    fn write_members(self, target: &mut Map<String, Value>) {
        target.insert("properties".to_string(), Value::Object(self.properties));
        if !self.required.is_empty() {
            target.insert("required".to_string(), json!(self.required));
        }
    }

    /// Build the final schema
    fn build(self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(FieldType::Object.as_str()));
        self.write_members(&mut schema);
        Value::Object(schema)
    }
}

/// Serialize a compiled schema to text
pub fn render_schema(schema: &Value, options: &RenderOptions) -> serde_json::Result<String> {
    if !options.pretty {
        return serde_json::to_string(schema);
    }

    let indent = " ".repeat(options.indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    schema.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
