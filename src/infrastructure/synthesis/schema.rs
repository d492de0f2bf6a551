//! Type synthesis from JSON Schema documents
//!
//! Object schemas become interfaces, everything else an alias. Local `$ref`s
//! are declared once under the pascal-cased last segment of their pointer.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::registry::TypeRegistry;
use crate::generation::SynthesisError;
use crate::generation::emitter::{TsLiteral, TsPrimitive, TsProp, TsType};
use crate::generation::utils::to_pascal_case;

/// Declares `name` for a parsed schema document.
pub(crate) fn declare_schema(
    registry: &mut TypeRegistry,
    name: &str,
    document: &Value,
) -> Result<(), SynthesisError> {
    registry.claim(name);
    let slot = registry.reserve();
    let mut converter = SchemaConverter {
        registry: &mut *registry,
        document,
        refs: HashMap::new(),
    };

    match object_properties(document) {
        Some(_) if !is_composite(document) => {
            let properties = converter.properties(name, document)?;
            registry.declare_root(slot, name, properties);
        }
        _ => {
            let ty = converter.convert(document, name)?;
            registry.declare_alias(slot, name, ty);
        }
    }
    Ok(())
}

/// Parses schema text.
pub(crate) fn parse_schema(text: &str) -> Result<Value, SynthesisError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| SynthesisError::InvalidSchema(e.to_string()))?;
    match document {
        Value::Object(_) | Value::Bool(_) => Ok(document),
        other => Err(SynthesisError::InvalidSchema(format!(
            "expected a schema object, got {other}"
        ))),
    }
}

struct SchemaConverter<'r, 'd> {
    registry: &'r mut TypeRegistry,
    document: &'d Value,
    /// `$ref` pointer to declared type name
    refs: HashMap<String, String>,
}

fn object_properties(schema: &Value) -> Option<&Map<String, Value>> {
    let declares_object = match schema.get("type") {
        Some(Value::String(t)) => t == "object",
        None => true,
        _ => false,
    };
    if !declares_object {
        return None;
    }
    schema.get("properties").and_then(Value::as_object)
}

fn is_composite(schema: &Value) -> bool {
    ["$ref", "allOf", "anyOf", "oneOf", "enum", "const"]
        .iter()
        .any(|key| schema.get(key).is_some())
        || schema.get("nullable").and_then(Value::as_bool) == Some(true)
}

impl SchemaConverter<'_, '_> {
    /// Converts a schema to a type; `name` names a nested interface.
    fn convert(&mut self, schema: &Value, name: &str) -> Result<TsType, SynthesisError> {
        let object = match schema {
            Value::Bool(_) => return Ok(TsType::any()),
            Value::Object(object) => object,
            other => {
                return Err(SynthesisError::InvalidSchema(format!(
                    "expected a schema object at {name}, got {other}"
                )));
            }
        };

        let ty = self.convert_inner(schema, object, name)?;
        if object.get("nullable").and_then(Value::as_bool) == Some(true) {
            return Ok(with_null(ty));
        }
        Ok(ty)
    }

    fn convert_inner(
        &mut self,
        schema: &Value,
        object: &Map<String, Value>,
        name: &str,
    ) -> Result<TsType, SynthesisError> {
        if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
            return self.reference(reference).map(TsType::named);
        }

        if let Some(value) = object.get("const") {
            return Ok(literal_type(value));
        }

        if let Some(values) = object.get("enum").and_then(Value::as_array) {
            return Ok(union_of(values.iter().map(literal_type).collect()));
        }

        if let Some(all_of) = object.get("allOf").and_then(Value::as_array) {
            let mut types = self.convert_all(all_of, name)?;
            return Ok(match types.len() {
                0 => TsType::Primitive(TsPrimitive::Unknown),
                1 => types.remove(0),
                _ => TsType::Intersection(types),
            });
        }

        for key in ["anyOf", "oneOf"] {
            if let Some(variants) = object.get(key).and_then(Value::as_array) {
                let types = self.convert_all(variants, name)?;
                return Ok(union_of(types));
            }
        }

        match object.get("type") {
            Some(Value::String(t)) => self.type_keyword(t, schema, name),
            Some(Value::Array(types)) => {
                let mut members = Vec::with_capacity(types.len());
                for t in types.iter().filter_map(Value::as_str) {
                    members.push(self.type_keyword(t, schema, name)?);
                }
                Ok(union_of(members))
            }
            Some(other) => Err(SynthesisError::InvalidSchema(format!(
                "invalid type keyword at {name}: {other}"
            ))),
            None if object.contains_key("properties")
                || object.contains_key("additionalProperties") =>
            {
                self.object_type(schema, name)
            }
            None if object.contains_key("items") => self.type_keyword("array", schema, name),
            None => Ok(TsType::any()),
        }
    }

    fn convert_all(&mut self, schemas: &[Value], name: &str) -> Result<Vec<TsType>, SynthesisError> {
        schemas.iter().map(|s| self.convert(s, name)).collect()
    }

    fn type_keyword(
        &mut self,
        keyword: &str,
        schema: &Value,
        name: &str,
    ) -> Result<TsType, SynthesisError> {
        match keyword {
            "string" => Ok(TsType::Primitive(TsPrimitive::String)),
            "number" | "integer" => Ok(TsType::Primitive(TsPrimitive::Number)),
            "boolean" => Ok(TsType::Primitive(TsPrimitive::Boolean)),
            "null" => Ok(TsType::Primitive(TsPrimitive::Null)),
            "array" => {
                let item = match schema.get("items") {
                    Some(items) => self.convert(items, &format!("{name}Item"))?,
                    None => TsType::any(),
                };
                Ok(TsType::Array(Box::new(item)))
            }
            "object" => self.object_type(schema, name),
            other => Err(SynthesisError::InvalidSchema(format!(
                "unknown type '{other}' at {name}"
            ))),
        }
    }

    fn object_type(&mut self, schema: &Value, name: &str) -> Result<TsType, SynthesisError> {
        if schema.get("properties").and_then(Value::as_object).is_some() {
            let slot = self.registry.reserve();
            let type_name = self.registry.unique_name(name);
            let properties = self.properties(&type_name, schema)?;
            return Ok(TsType::named(
                self.registry.declare_nested(slot, type_name, properties),
            ));
        }

        let value = match schema.get("additionalProperties") {
            Some(Value::Bool(false)) => return Ok(TsType::object(Vec::new())),
            Some(additional @ Value::Object(_)) => {
                self.convert(additional, &format!("{name}Value"))?
            }
            _ => TsType::any(),
        };
        Ok(TsType::Record {
            key: Box::new(TsType::Primitive(TsPrimitive::String)),
            value: Box::new(value),
        })
    }

    fn properties(&mut self, owner: &str, schema: &Value) -> Result<Vec<TsProp>, SynthesisError> {
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return Ok(Vec::new());
        };
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut props = Vec::with_capacity(properties.len());
        for (key, property) in properties {
            let child = format!("{owner}{}", to_pascal_case(key));
            let ty = self.convert(property, &child)?;
            let prop = if required.contains(&key.as_str()) {
                TsProp::required(key.as_str(), ty)
            } else {
                TsProp::optional(key.as_str(), ty)
            };
            props.push(TsProp {
                doc: property
                    .get("description")
                    .and_then(Value::as_str)
                    .map(String::from),
                ..prop
            });
        }
        Ok(props)
    }

    /// Declares the target of a local reference and returns its type name.
    fn reference(&mut self, reference: &str) -> Result<String, SynthesisError> {
        if let Some(name) = self.refs.get(reference) {
            return Ok(name.clone());
        }

        let pointer = reference
            .strip_prefix('#')
            .ok_or_else(|| SynthesisError::UnresolvedReference(reference.to_string()))?;
        let target = self
            .document
            .pointer(pointer)
            .ok_or_else(|| SynthesisError::UnresolvedReference(reference.to_string()))?;

        let base = pointer
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(to_pascal_case)
            .unwrap_or_else(|| "Root".to_string());

        let slot = self.registry.reserve();
        let type_name = self.registry.unique_name(&base);
        self.refs.insert(reference.to_string(), type_name.clone());

        match object_properties(target) {
            Some(_) if !is_composite(target) => {
                let properties = self.properties(&type_name, target)?;
                self.registry.declare_root(slot, &type_name, properties);
            }
            _ => {
                let ty = self.convert(target, &type_name)?;
                self.registry.declare_alias(slot, &type_name, ty);
            }
        }
        Ok(type_name)
    }
}

fn literal_type(value: &Value) -> TsType {
    match value {
        Value::Null => TsType::Literal(TsLiteral::Null),
        Value::Bool(b) => TsType::Literal(TsLiteral::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => TsType::Literal(TsLiteral::Int(i)),
            None => TsType::Literal(TsLiteral::Number(n.as_f64().unwrap_or(0.0))),
        },
        Value::String(s) => TsType::Literal(TsLiteral::String(s.clone())),
        _ => TsType::Primitive(TsPrimitive::Unknown),
    }
}

fn union_of(mut members: Vec<TsType>) -> TsType {
    let mut unique: Vec<TsType> = Vec::with_capacity(members.len());
    for member in members.drain(..) {
        if !unique.contains(&member) {
            unique.push(member);
        }
    }
    match unique.len() {
        0 => TsType::Primitive(TsPrimitive::Unknown),
        1 => unique.remove(0),
        _ => TsType::Union(unique),
    }
}

fn with_null(ty: TsType) -> TsType {
    let null = TsType::Primitive(TsPrimitive::Null);
    match ty {
        TsType::Union(mut members) => {
            if !members.contains(&null) {
                members.push(null);
            }
            TsType::Union(members)
        }
        other if other == null => other,
        other => TsType::Union(vec![other, null]),
    }
}
