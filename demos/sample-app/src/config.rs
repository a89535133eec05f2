//! Search descriptors of the sample application.

use searchy_core::SearchyResult;
use searchy_db::descriptor::{
    DescriptorOption, DescriptorRegistry, SearchConfigurer, SearchDescriptor,
};

use crate::handlers::FetchElementSets;
use crate::models::{Person, Vehicle};

/// Registers the `person` and `vehicle` searches.
pub struct SampleAppConfiguration;

impl SearchConfigurer for SampleAppConfiguration {
    fn add_search_descriptors(&self, registry: &mut DescriptorRegistry) -> SearchyResult<()> {
        registry.add(person_search_descriptor())?;
        registry.add(vehicle_search_descriptor())?;
        Ok(())
    }
}

fn person_search_descriptor() -> SearchDescriptor {
    SearchDescriptor::for_entity::<Person>([DescriptorOption::join_handler(
        FetchElementSets,
    )])
}

fn vehicle_search_descriptor() -> SearchDescriptor {
    SearchDescriptor::for_entity::<Vehicle>([])
}
