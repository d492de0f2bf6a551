//! String transformation utilities for code generation

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::generation::GenerationError;
use crate::generation::sanitizers::sanitize_identifier;

/// Upper-cases the first character, leaving the rest untouched.
///
/// # Examples
/// ```
/// use hookgen::generation::utils::upper_first;
///
/// assert_eq!(upper_first("getUser"), "GetUser");
/// assert_eq!(upper_first(""), "");
/// ```
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Lower-cases the first character, leaving the rest untouched.
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Converts a key to PascalCase by sanitizing it and upper-casing the first letter.
///
/// # Examples
/// ```
/// use hookgen::generation::utils::to_pascal_case;
///
/// assert_eq!(to_pascal_case("billing-address"), "BillingAddress");
/// assert_eq!(to_pascal_case("items"), "Items");
/// ```
pub fn to_pascal_case(key: &str) -> String {
    upper_first(sanitize_identifier(key).trim_start_matches('_'))
}

/// The names every fragment derives from one feature name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureNames {
    camel: String,
    pascal: String,
}

impl FeatureNames {
    pub fn new(feature_name: &str) -> Self {
        let base = sanitize_identifier(&lower_first(feature_name.trim()));
        let pascal = upper_first(base.trim_start_matches('_'));
        let camel = sanitize_identifier(&lower_first(&pascal));
        Self { camel, pascal }
    }

    /// Api function name and cache scope literal
    pub fn camel(&self) -> &str {
        &self.camel
    }

    pub fn pascal(&self) -> &str {
        &self.pascal
    }

    pub fn query_key(&self) -> String {
        format!("{}Key", self.camel)
    }

    pub fn hook(&self) -> String {
        format!("use{}", self.pascal)
    }

    pub fn response_type(&self) -> String {
        format!("{}Response", self.pascal)
    }

    pub fn variables_type(&self) -> String {
        format!("{}Variables", self.pascal)
    }

    /// Element type of a paginated list
    pub fn item_type(&self) -> String {
        format!("{}Item", self.pascal)
    }

    /// Payload type of a paginated envelope without items
    pub fn data_type(&self) -> String {
        format!("{}Data", self.pascal)
    }
}

/// Returns the regex stored in `cell`, compiling `pattern` on first use.
pub(crate) fn cached_regex(
    cell: &'static OnceCell<Regex>,
    pattern: &str,
) -> Result<&'static Regex, GenerationError> {
    Ok(cell.get_or_try_init(|| Regex::new(pattern))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_helpers() {
        assert_eq!(upper_first("abc"), "Abc");
        assert_eq!(lower_first("ABC"), "aBC");
        assert_eq!(lower_first(""), "");
        assert_eq!(to_pascal_case("post-id"), "PostId");
        assert_eq!(to_pascal_case("class"), "Class");
    }

    #[test]
    fn test_feature_names() {
        let names = FeatureNames::new("getUserById");
        assert_eq!(names.camel(), "getUserById");
        assert_eq!(names.pascal(), "GetUserById");
        assert_eq!(names.query_key(), "getUserByIdKey");
        assert_eq!(names.hook(), "useGetUserById");
        assert_eq!(names.response_type(), "GetUserByIdResponse");
        assert_eq!(names.variables_type(), "GetUserByIdVariables");
        assert_eq!(names.item_type(), "GetUserByIdItem");
        assert_eq!(names.data_type(), "GetUserByIdData");
    }

    #[test]
    fn test_feature_names_are_sanitized() {
        let names = FeatureNames::new("list-users");
        assert_eq!(names.camel(), "listUsers");
        assert_eq!(names.pascal(), "ListUsers");

        let names = FeatureNames::new("Delete");
        assert_eq!(names.camel(), "_delete");
        assert_eq!(names.pascal(), "Delete");
        assert_eq!(names.hook(), "useDelete");
    }

    #[test]
    fn test_cached_regex_compiles_once() {
        static CELL: OnceCell<Regex> = OnceCell::new();
        let first = cached_regex(&CELL, r"\d+").unwrap();
        let second = cached_regex(&CELL, r"\d+").unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(first.is_match("a1"));
    }
}
