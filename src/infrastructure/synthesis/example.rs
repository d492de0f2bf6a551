//! Type inference from example JSON values

use serde_json::{Map, Value};

use super::registry::TypeRegistry;
use crate::generation::emitter::{TsPrimitive, TsProp, TsType};
use crate::generation::utils::to_pascal_case;

/// Declares `name` for an example value.
pub(crate) fn declare_example(registry: &mut TypeRegistry, name: &str, value: &Value) {
    registry.claim(name);
    let slot = registry.reserve();
    match value {
        Value::Object(map) => {
            let properties = ExampleInference { registry: &mut *registry }.properties(name, &[map]);
            registry.declare_root(slot, name, properties);
        }
        other => {
            let ty = ExampleInference { registry: &mut *registry }.infer(&[other], name);
            registry.declare_alias(slot, name, ty);
        }
    }
}

struct ExampleInference<'r> {
    registry: &'r mut TypeRegistry,
}

/// Kinds of value seen at one position, in first-seen order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Object,
    Array,
    Primitive(TsPrimitive),
}

fn kind_of(value: &Value) -> Kind {
    match value {
        Value::Object(_) => Kind::Object,
        Value::Array(_) => Kind::Array,
        Value::Null => Kind::Primitive(TsPrimitive::Null),
        Value::Bool(_) => Kind::Primitive(TsPrimitive::Boolean),
        Value::Number(_) => Kind::Primitive(TsPrimitive::Number),
        Value::String(_) => Kind::Primitive(TsPrimitive::String),
    }
}

impl ExampleInference<'_> {
    /// The type covering every sample; `name` names a nested interface.
    fn infer(&mut self, samples: &[&Value], name: &str) -> TsType {
        let mut kinds: Vec<Kind> = Vec::new();
        for sample in samples {
            let kind = kind_of(sample);
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        let mut members: Vec<TsType> = kinds
            .into_iter()
            .map(|kind| match kind {
                Kind::Object => {
                    let objects: Vec<&Map<String, Value>> =
                        samples.iter().filter_map(|s| s.as_object()).collect();
                    TsType::named(self.nested_interface(name, &objects))
                }
                Kind::Array => {
                    let items: Vec<&Value> = samples
                        .iter()
                        .filter_map(|s| s.as_array())
                        .flatten()
                        .collect();
                    if items.is_empty() {
                        TsType::Array(Box::new(TsType::any()))
                    } else {
                        TsType::Array(Box::new(self.infer(&items, &format!("{name}Item"))))
                    }
                }
                Kind::Primitive(primitive) => TsType::Primitive(primitive),
            })
            .collect();

        match members.len() {
            0 => TsType::any(),
            1 => members.remove(0),
            _ => TsType::Union(members),
        }
    }

    fn nested_interface(&mut self, name: &str, objects: &[&Map<String, Value>]) -> String {
        let slot = self.registry.reserve();
        let type_name = self.registry.unique_name(name);
        let properties = self.properties(&type_name, objects);
        self.registry.declare_nested(slot, type_name, properties)
    }

    /// Merged properties of `objects`; keys missing from some become optional.
    fn properties(&mut self, owner: &str, objects: &[&Map<String, Value>]) -> Vec<TsProp> {
        let mut keys: Vec<&String> = Vec::new();
        for object in objects {
            for key in object.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        keys.into_iter()
            .map(|key| {
                let values: Vec<&Value> = objects.iter().filter_map(|o| o.get(key)).collect();
                let child = format!("{owner}{}", to_pascal_case(key));
                let ty = self.infer(&values, &child);
                if values.len() < objects.len() {
                    TsProp::optional(key.as_str(), ty)
                } else {
                    TsProp::required(key.as_str(), ty)
                }
            })
            .collect()
    }
}
