//! Response envelope classification
//!
//! Decides which generic wrapper an example payload should be typed with.
//! Two envelope conventions are recognized: `{ success, data }` around a
//! single value, and the same envelope around a counted, paginated list.

use serde_json::{Map, Value};

use crate::config::CodegenConfig;

/// Pagination conventions of the backend the generated code talks to
pub trait PaginationPolicy: Send + Sync {
    /// Whether an envelope's `data` block describes a page of results.
    fn is_paginated(&self, data: &Map<String, Value>) -> bool;

    /// Key of the list inside a paginated block.
    fn array_key<'a>(&self, data: &'a Map<String, Value>) -> Option<&'a str>;

    /// Body or query parameter that should receive the page cursor.
    fn page_field<'a>(&self, body_params: &'a [String]) -> Option<&'a str>;

    /// Fields holding the total and the filtered record counts.
    fn count_fields(&self) -> (&str, &str);
}

/// Counts named by the config, the first array-valued key as the list
#[derive(Debug, Clone)]
pub struct ConventionalPagination {
    total_field: String,
    filtered_field: String,
    page_field: String,
}

impl ConventionalPagination {
    pub fn new(config: &CodegenConfig) -> Self {
        Self {
            total_field: config.total_count_field.clone(),
            filtered_field: config.filtered_count_field.clone(),
            page_field: config.page_field.clone(),
        }
    }
}

impl Default for ConventionalPagination {
    fn default() -> Self {
        Self::new(&CodegenConfig::default())
    }
}

impl PaginationPolicy for ConventionalPagination {
    fn is_paginated(&self, data: &Map<String, Value>) -> bool {
        data.contains_key(&self.total_field) && data.contains_key(&self.filtered_field)
    }

    fn array_key<'a>(&self, data: &'a Map<String, Value>) -> Option<&'a str> {
        data.iter()
            .find(|(_, value)| value.is_array())
            .map(|(key, _)| key.as_str())
    }

    fn page_field<'a>(&self, body_params: &'a [String]) -> Option<&'a str> {
        body_params
            .iter()
            .find(|param| **param == self.page_field)
            .map(String::as_str)
    }

    fn count_fields(&self) -> (&str, &str) {
        (&self.total_field, &self.filtered_field)
    }
}

/// How an example payload is enveloped
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShapeClassification {
    /// No envelope: the whole payload is the model
    PlainValue(Value),
    /// `{ success: true, data }`: `data` is the model.
    ///
    /// `empty_page` marks a paginated block whose list was absent or empty.
    WrappedValue { payload: Value, empty_page: bool },
    /// A paginated block listing `item`s under `array_key`
    PaginatedArray { array_key: String, item: Value },
}

impl ResponseShapeClassification {
    /// Key of the listed records for next-page counting, if known.
    pub fn array_key(&self) -> Option<&str> {
        match self {
            ResponseShapeClassification::PaginatedArray { array_key, .. } => Some(array_key),
            _ => None,
        }
    }
}

/// Classifies an example response payload.
pub fn classify(payload: &Value, policy: &dyn PaginationPolicy) -> ResponseShapeClassification {
    let Some(data) = enveloped_data(payload) else {
        return ResponseShapeClassification::PlainValue(payload.clone());
    };

    let Some(block) = data.as_object() else {
        return ResponseShapeClassification::WrappedValue {
            payload: data.clone(),
            empty_page: false,
        };
    };

    if !policy.is_paginated(block) {
        return ResponseShapeClassification::WrappedValue {
            payload: data.clone(),
            empty_page: false,
        };
    }

    let first_item = policy.array_key(block).and_then(|key| {
        block
            .get(key)
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .map(|item| (key, item))
    });

    match first_item {
        Some((key, item)) => ResponseShapeClassification::PaginatedArray {
            array_key: key.to_string(),
            item: item.clone(),
        },
        None => ResponseShapeClassification::WrappedValue {
            payload: data.clone(),
            empty_page: true,
        },
    }
}

/// `data` of a `{ success: true, data }` envelope, when `data` is truthy.
fn enveloped_data(payload: &Value) -> Option<&Value> {
    let object = payload.as_object()?;
    if object.get("success") != Some(&Value::Bool(true)) {
        return None;
    }
    object.get("data").filter(|data| is_truthy(data))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
