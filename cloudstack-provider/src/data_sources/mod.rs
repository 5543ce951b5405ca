//! Data source readers
//!
//! Each reader lists every entity of its type, selects one through the
//! filter matcher and projects it into read-only attributes.

pub mod role;
pub mod zone;

use cloudstack_core::filter::{FieldTable, FilterError, filters_from_attributes, select};
use cloudstack_core::provider::{ProviderError, ProviderResult};
use cloudstack_core::resource::Resource;

fn filter_error(resource: &Resource, err: FilterError) -> ProviderError {
    let message = err.to_string();
    let base = match &err {
        FilterError::InvalidPattern { .. } => ProviderError::invalid_pattern(message),
        FilterError::UnknownField { .. } | FilterError::Malformed(_) => {
            ProviderError::invalid_attribute(message)
        }
    };
    base.with_cause(err).for_resource(resource.id.clone())
}

/// Select the entity matching every filter of `resource`
pub(crate) fn select_one<'a, T>(
    resource: &Resource,
    entities: &'a [T],
    table: &FieldTable<T>,
    entity: &str,
) -> ProviderResult<&'a T> {
    let filters =
        filters_from_attributes(&resource.attributes).map_err(|e| filter_error(resource, e))?;

    select(entities, &filters, table)
        .map_err(|e| filter_error(resource, e))?
        .ok_or_else(|| {
            ProviderError::no_match(format!(
                "No {} is matching with the specified regex",
                entity
            ))
            .for_resource(resource.id.clone())
        })
}
