//! Multi-criteria filtering of schedule resources.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::repository::{AttributeService, ResourceRepository};
use super::resource::{AttributeList, AttributeValue, BookableResource, CustomAttributeCategory};
use crate::{Result, SchedAuthError};

/// Optional criteria a resource must all satisfy to be shown.
///
/// Absent criteria are skipped. Attribute lists match only when every
/// wanted `(attribute_id, value)` pair equals the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleResourceFilter {
    /// Schedule whose group assignments are used.
    pub schedule_id: Option<i64>,
    /// Only this resource.
    pub resource_id: Option<i64>,
    /// Only resources in this group or its subgroups.
    pub group_id: Option<i64>,
    /// Only resources of this type.
    pub resource_type_id: Option<i64>,
    /// Minimum number of participants. Zero means no minimum.
    pub min_capacity: Option<u32>,
    /// Wanted resource attribute values.
    pub resource_attributes: Vec<AttributeValue>,
    /// Wanted resource type attribute values.
    pub resource_type_attributes: Vec<AttributeValue>,
}

/// Persisted part of a filter.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FilterCookie {
    #[serde(default)]
    schedule_id: Option<i64>,
    #[serde(default)]
    resource_type_id: Option<i64>,
    #[serde(default)]
    min_capacity: Option<u32>,
}

impl ScheduleResourceFilter {
    /// Create a filter. A `min_capacity` of zero is dropped.
    pub fn new(
        schedule_id: Option<i64>,
        resource_type_id: Option<i64>,
        min_capacity: Option<u32>,
        resource_attributes: Vec<AttributeValue>,
        resource_type_attributes: Vec<AttributeValue>,
    ) -> Self {
        Self {
            schedule_id,
            resource_id: None,
            group_id: None,
            resource_type_id,
            min_capacity: min_capacity.filter(|c| *c > 0),
            resource_attributes,
            resource_type_attributes,
        }
    }

    /// Limit to one resource.
    pub fn with_resource(mut self, resource_id: i64) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    /// Limit to a group and its subgroups.
    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Restore a filter from a cookie value. Unreadable values give `None`.
    pub fn from_cookie(value: &str) -> Option<Self> {
        let cookie: FilterCookie = serde_json::from_str(value).ok()?;
        Some(Self::new(
            cookie.schedule_id,
            cookie.resource_type_id,
            cookie.min_capacity,
            Vec::new(),
            Vec::new(),
        ))
    }

    /// Cookie value holding schedule, resource type and capacity.
    pub fn to_cookie(&self) -> Result<String> {
        let cookie = FilterCookie {
            schedule_id: self.schedule_id,
            resource_type_id: self.resource_type_id,
            min_capacity: self.min_capacity(),
        };
        serde_json::to_string(&cookie).map_err(|e| SchedAuthError::Validation(e.to_string()))
    }

    fn min_capacity(&self) -> Option<u32> {
        self.min_capacity.filter(|c| *c > 0)
    }

    /// Whether any criterion is set.
    pub fn has_filter(&self) -> bool {
        self.resource_id.is_some()
            || self.group_id.is_some()
            || self.resource_type_id.is_some()
            || self.min_capacity().is_some()
            || !self.resource_attributes.is_empty()
            || !self.resource_type_attributes.is_empty()
    }

    /// IDs of the resources matching every criterion, in input order.
    pub async fn filter_resources<R, A>(
        &self,
        resources: &[BookableResource],
        repository: &R,
        attributes: &A,
    ) -> Result<Vec<i64>>
    where
        R: ResourceRepository,
        A: AttributeService,
    {
        if !self.has_filter() {
            return Ok(resources.iter().map(|r| r.id).collect());
        }

        let group_resources = match self.group_id {
            Some(group_id) => Some(
                repository
                    .get_resource_groups(self.schedule_id)
                    .await?
                    .resource_ids(group_id),
            ),
            None => None,
        };

        let resource_values = if self.resource_attributes.is_empty() {
            AttributeList::new()
        } else {
            let ids: Vec<i64> = resources.iter().map(|r| r.id).collect();
            attributes
                .get_attributes(CustomAttributeCategory::Resource, Some(ids.as_slice()))
                .await?
        };

        let type_values = if self.resource_type_attributes.is_empty() {
            AttributeList::new()
        } else {
            let mut type_ids: Vec<i64> =
                resources.iter().filter_map(|r| r.resource_type_id).collect();
            type_ids.sort_unstable();
            type_ids.dedup();
            attributes
                .get_attributes(CustomAttributeCategory::ResourceType, Some(type_ids.as_slice()))
                .await?
        };

        let min_capacity = self.min_capacity().map(i64::from);

        let ids: Vec<i64> = resources
            .iter()
            .filter(|resource| {
                if self.resource_id.is_some_and(|id| id != resource.id) {
                    return false;
                }
                if let Some(members) = &group_resources {
                    if !members.contains(&resource.id) {
                        return false;
                    }
                }
                if let Some(min) = min_capacity {
                    if resource.max_participants.unwrap_or(0) < min {
                        return false;
                    }
                }
                if let Some(type_id) = self.resource_type_id {
                    if resource.resource_type_id != Some(type_id) {
                        return false;
                    }
                }
                if !all_match(&self.resource_attributes, &resource_values, Some(resource.id)) {
                    return false;
                }
                all_match(
                    &self.resource_type_attributes,
                    &type_values,
                    resource.resource_type_id,
                )
            })
            .map(|r| r.id)
            .collect();

        debug!(
            schedule_id = ?self.schedule_id,
            total = resources.len(),
            matched = ids.len(),
            "Filtered schedule resources"
        );
        Ok(ids)
    }
}

/// Every wanted pair equals the entity's stored value. An entity that
/// doesn't exist matches only an empty list.
fn all_match(wanted: &[AttributeValue], values: &AttributeList, entity_id: Option<i64>) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let Some(entity_id) = entity_id else {
        return false;
    };
    wanted
        .iter()
        .all(|w| values.value(entity_id, w.attribute_id) == Some(w.value.as_str()))
}
