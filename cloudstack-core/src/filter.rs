//! Filter - Select a remote entity for a data source
//!
//! A data source block carries `filter { name = "...", value = "<regex>" }`
//! entries. Each filter names a field of the remote entity and all filters
//! must match. Field lookup goes through a typed accessor table instead of
//! reflecting the entity, so an unknown field is a configuration error and
//! an absent optional field is simply a non-match.

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

use crate::resource::Value;

/// Errors raised while compiling or applying filters
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid regex for filter '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unknown filter field '{name}', expected one of: {}", expected.join(", "))]
    UnknownField { name: String, expected: Vec<String> },

    #[error("Malformed filter block: {0}")]
    Malformed(String),
}

/// A single `(field name, regex)` predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub name: String,
    pub value: String,
}

impl Filter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse one `{ name, value }` block
    pub fn from_value(value: &Value) -> Result<Self, FilterError> {
        let Value::Map(map) = value else {
            return Err(FilterError::Malformed("expected a map".to_string()));
        };
        let field = |key: &str| match map.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(FilterError::Malformed(format!("missing string '{}'", key))),
        };
        Ok(Self::new(field("name")?, field("value")?))
    }
}

/// Parse the `filter` attribute of a data source block
///
/// A missing attribute yields no filters, which matches every entity.
pub fn filters_from_attributes(
    attributes: &HashMap<String, Value>,
) -> Result<Vec<Filter>, FilterError> {
    match attributes.get("filter") {
        None => Ok(Vec::new()),
        Some(Value::List(items)) => items.iter().map(Filter::from_value).collect(),
        Some(single @ Value::Map(_)) => Ok(vec![Filter::from_value(single)?]),
        Some(_) => Err(FilterError::Malformed(
            "'filter' must be a list of blocks".to_string(),
        )),
    }
}

/// Typed getter returning the string form of one entity field
pub type FieldGetter<T> = fn(&T) -> Option<String>;

/// Mapping from filter field names to typed getters for `T`
///
/// Keys are stored without underscores, so `internal_dns1` and
/// `internaldns1` resolve to the same getter.
pub struct FieldTable<T> {
    getters: HashMap<String, FieldGetter<T>>,
}

impl<T> FieldTable<T> {
    pub fn new() -> Self {
        Self {
            getters: HashMap::new(),
        }
    }

    pub fn field(mut self, name: &str, getter: FieldGetter<T>) -> Self {
        self.getters.insert(normalize_field_name(name), getter);
        self
    }

    pub fn get(&self, name: &str) -> Option<FieldGetter<T>> {
        self.getters.get(&normalize_field_name(name)).copied()
    }

    fn known_fields(&self) -> Vec<String> {
        let mut names: Vec<String> = self.getters.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip underscores so snake_case filter names line up with the API's
/// concatenated field names
pub fn normalize_field_name(name: &str) -> String {
    name.replace('_', "")
}

/// A filter whose field has been resolved and whose regex has compiled
pub struct CompiledFilter<T> {
    name: String,
    getter: FieldGetter<T>,
    pattern: Regex,
}

impl<T> CompiledFilter<T> {
    pub fn is_match(&self, entity: &T) -> bool {
        (self.getter)(entity).is_some_and(|v| self.pattern.is_match(&v))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Resolve and compile every filter against `table`
pub fn compile<T>(
    filters: &[Filter],
    table: &FieldTable<T>,
) -> Result<Vec<CompiledFilter<T>>, FilterError> {
    filters
        .iter()
        .map(|f| {
            let pattern = Regex::new(&f.value).map_err(|source| FilterError::InvalidPattern {
                name: f.name.clone(),
                source,
            })?;
            let getter = table.get(&f.name).ok_or_else(|| FilterError::UnknownField {
                name: f.name.clone(),
                expected: table.known_fields(),
            })?;
            Ok(CompiledFilter {
                name: f.name.clone(),
                getter,
                pattern,
            })
        })
        .collect()
}

/// Whether `entity` satisfies every compiled filter
pub fn matches<T>(entity: &T, filters: &[CompiledFilter<T>]) -> bool {
    filters.iter().all(|f| f.is_match(entity))
}

/// Pick the entity matching all filters
///
/// When several entities match, the last one wins. That is kept for
/// compatibility with existing configurations and logged as a warning.
pub fn select<'a, T>(
    entities: &'a [T],
    filters: &[Filter],
    table: &FieldTable<T>,
) -> Result<Option<&'a T>, FilterError> {
    let compiled = compile(filters, table)?;

    let matched: Vec<&T> = entities.iter().filter(|e| matches(*e, &compiled)).collect();
    if matched.len() > 1 {
        let names: Vec<&str> = filters.iter().map(|f| f.name.as_str()).collect();
        log::warn!(
            "{} entities match filters on [{}], using the last one",
            matched.len(),
            names.join(", ")
        );
    }

    Ok(matched.last().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Entity {
        name: String,
        dns1: String,
        is_public: bool,
        description: Option<String>,
    }

    fn entity(name: &str, dns1: &str, is_public: bool) -> Entity {
        Entity {
            name: name.to_string(),
            dns1: dns1.to_string(),
            is_public,
            description: None,
        }
    }

    fn table() -> FieldTable<Entity> {
        FieldTable::<Entity>::new()
            .field("name", |e| Some(e.name.clone()))
            .field("dns1", |e| Some(e.dns1.clone()))
            .field("ispublic", |e| Some(e.is_public.to_string()))
            .field("description", |e| e.description.clone())
    }

    #[test]
    fn selects_unique_match() {
        let entities = vec![
            entity("zone-a", "8.8.8.8", true),
            entity("zone-b", "1.1.1.1", true),
        ];
        let filters = vec![Filter::new("name", "^zone-"), Filter::new("dns1", "^1\\.")];

        let selected = select(&entities, &filters, &table()).unwrap();
        assert_eq!(selected, Some(&entities[1]));
    }

    #[test]
    fn last_match_wins() {
        let entities = vec![
            entity("zone-a", "8.8.8.8", true),
            entity("zone-b", "8.8.8.8", true),
        ];
        let filters = vec![Filter::new("dns1", "8.8.8.8")];

        let selected = select(&entities, &filters, &table()).unwrap();
        assert_eq!(selected.map(|e| e.name.as_str()), Some("zone-b"));
    }

    #[test]
    fn no_match_returns_none() {
        let entities = vec![entity("zone-a", "8.8.8.8", true)];
        let filters = vec![Filter::new("name", "^other$")];

        assert!(select(&entities, &filters, &table()).unwrap().is_none());
    }

    #[test]
    fn underscores_are_stripped_from_field_names() {
        let entities = vec![entity("role", "", false)];
        let filters = vec![Filter::new("is_public", "false")];

        assert!(select(&entities, &filters, &table()).unwrap().is_some());
    }

    #[test]
    fn invalid_regex_is_reported() {
        let entities = vec![entity("zone-a", "8.8.8.8", true)];
        let filters = vec![Filter::new("name", "zone-(")];

        let err = select(&entities, &filters, &table()).unwrap_err();
        assert!(matches!(err, FilterError::InvalidPattern { ref name, .. } if name == "name"));
    }

    #[test]
    fn unknown_field_is_reported() {
        let err = select::<Entity>(&[], &[Filter::new("zone_token", ".*")], &table()).unwrap_err();
        match err {
            FilterError::UnknownField { name, expected } => {
                assert_eq!(name, "zone_token");
                assert!(expected.contains(&"dns1".to_string()));
            }
            other => panic!("Expected UnknownField, got {:?}", other),
        }
    }

    #[test]
    fn absent_optional_field_does_not_match() {
        let entities = vec![entity("zone-a", "8.8.8.8", true)];
        let filters = vec![Filter::new("description", ".*")];

        assert!(select(&entities, &filters, &table()).unwrap().is_none());
    }

    #[test]
    fn parses_filter_blocks() {
        let mut attrs = HashMap::new();
        attrs.insert(
            "filter".to_string(),
            Value::List(vec![
                Value::string_map([("name", "name"), ("value", "TestZone")]),
                Value::string_map([("name", "dns1"), ("value", "8.8.8.8")]),
            ]),
        );

        let filters = filters_from_attributes(&attrs).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0], Filter::new("name", "TestZone"));

        assert!(filters_from_attributes(&HashMap::new()).unwrap().is_empty());
    }

    #[test]
    fn malformed_filter_block() {
        let mut attrs = HashMap::new();
        attrs.insert(
            "filter".to_string(),
            Value::List(vec![Value::string_map([("value", "x")])]),
        );

        assert!(matches!(
            filters_from_attributes(&attrs),
            Err(FilterError::Malformed(_))
        ));
    }
}
