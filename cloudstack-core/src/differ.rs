//! Differ - Compare desired state with current state
//!
//! Field-level comparison drives in-place updates: only attributes whose
//! desired value differs from the last-read value are sent to the remote
//! side. Tag sets are diffed separately into keys to remove and keys to
//! create.

use std::collections::HashMap;

use crate::resource::{Resource, ResourceId, State, Value};
use crate::schema::ResourceSchema;

/// Result of a diff operation
#[derive(Debug, Clone, PartialEq)]
pub enum Diff {
    /// Resource does not exist -> needs creation
    Create(Resource),
    /// Resource exists with differences -> update in place
    Update {
        id: ResourceId,
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
    },
    /// A force-new attribute changed -> destroy and recreate
    Replace {
        id: ResourceId,
        from: State,
        to: Resource,
        changed_attributes: Vec<String>,
    },
    /// Resource exists with no differences -> no action needed
    NoChange(ResourceId),
}

impl Diff {
    /// Returns whether this Diff involves a change
    pub fn is_change(&self) -> bool {
        !matches!(self, Diff::NoChange(_))
    }
}

/// Compare desired state with current state to compute a Diff
///
/// When a schema is given, a change to any of its force-new attributes turns
/// the update into a replacement.
pub fn diff(desired: &Resource, current: &State, schema: Option<&ResourceSchema>) -> Diff {
    if !current.exists {
        return Diff::Create(desired.clone());
    }

    let mut changed = find_changed_attributes(&desired.attributes, &current.attributes);
    if let Some(schema) = schema {
        changed.extend(find_removed_attributes(
            &desired.attributes,
            &current.attributes,
            schema,
        ));
        changed.sort();
    }

    if changed.is_empty() {
        return Diff::NoChange(desired.id.clone());
    }

    let replace = schema.is_some_and(|s| changed.iter().any(|name| s.is_force_new(name)));
    if replace {
        Diff::Replace {
            id: desired.id.clone(),
            from: current.clone(),
            to: desired.clone(),
            changed_attributes: changed,
        }
    } else {
        Diff::Update {
            id: desired.id.clone(),
            from: current.clone(),
            to: desired.clone(),
            changed_attributes: changed,
        }
    }
}

/// Find changed attributes between desired and current state
pub fn find_changed_attributes(
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
) -> Vec<String> {
    let mut changed = Vec::new();

    for (key, desired_value) in desired {
        // Skip internal attributes (starting with _)
        if key.starts_with('_') {
            continue;
        }

        match current.get(key) {
            Some(current_value) if current_value == desired_value => {}
            None if is_blank(desired_value) => {}
            _ => changed.push(key.clone()),
        }
    }

    changed.sort();
    changed
}

/// Find schema attributes set in current state but dropped from desired
///
/// Computed attributes are owned by the remote side and never count as
/// removed. An attribute with a default is compared against that default.
pub fn find_removed_attributes(
    desired: &HashMap<String, Value>,
    current: &HashMap<String, Value>,
    schema: &ResourceSchema,
) -> Vec<String> {
    let mut removed: Vec<String> = current
        .iter()
        .filter(|(key, _)| !key.starts_with('_') && !desired.contains_key(*key))
        .filter(|(key, value)| match schema.attributes.get(key.as_str()) {
            Some(attr) if !attr.computed => match &attr.default {
                Some(default) => *value != default,
                None => !is_blank(value),
            },
            _ => false,
        })
        .map(|(key, _)| key.clone())
        .collect();

    removed.sort();
    removed
}

/// Whether `key` differs between the last-read and the desired attributes
///
/// An absent attribute equals its zero value (empty string, `false`, empty
/// list or map).
pub fn attribute_changed(
    from: &HashMap<String, Value>,
    to: &HashMap<String, Value>,
    key: &str,
) -> bool {
    let normalize = |v: Option<&Value>| v.filter(|v| !is_blank(v)).cloned();
    normalize(from.get(key)) != normalize(to.get(key))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        Value::Int(_) => false,
    }
}

/// Tag changes between two key/value mappings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    /// Keys present in old but absent or changed in new, with their old values
    pub remove: HashMap<String, String>,
    /// Keys present in new but absent or changed in old, with their new values
    pub create: HashMap<String, String>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.create.is_empty()
    }
}

/// Compute which tags to remove and which to create to go from `old` to `new`
///
/// A key whose value changed appears in both outputs: removed with its old
/// value, created with its new one. Unchanged keys appear in neither.
pub fn diff_tags(old: &HashMap<String, String>, new: &HashMap<String, String>) -> TagDiff {
    let remove = old
        .iter()
        .filter(|(k, v)| new.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let create = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    TagDiff { remove, create }
}
