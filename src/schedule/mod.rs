//! Schedule resources and the resource filter.

mod filter;
mod repository;
mod resource;

pub use filter::ScheduleResourceFilter;
pub use repository::{AttributeService, ResourceRepository, SqlAttributeService, SqlResourceRepository};
pub use resource::{
    AttributeList, AttributeValue, BookableResource, CustomAttributeCategory, NewResource,
    ResourceGroup, ResourceGroupAssignment, ResourceGroupTree,
};
