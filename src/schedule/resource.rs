//! Resource, group and custom attribute models.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

/// A bookable resource on a schedule.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookableResource {
    /// Resource ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Schedule the resource belongs to.
    pub schedule_id: i64,
    /// Resource type, if any.
    pub resource_type_id: Option<i64>,
    /// Maximum number of participants; `None` if not set.
    pub max_participants: Option<i64>,
}

impl BookableResource {
    /// Create a resource with no type and no capacity.
    pub fn new(id: i64, name: impl Into<String>, schedule_id: i64) -> Self {
        Self {
            id,
            name: name.into(),
            schedule_id,
            resource_type_id: None,
            max_participants: None,
        }
    }

    /// Set the resource type.
    pub fn with_type(mut self, resource_type_id: i64) -> Self {
        self.resource_type_id = Some(resource_type_id);
        self
    }

    /// Set the capacity.
    pub fn with_max_participants(mut self, max: i64) -> Self {
        self.max_participants = Some(max);
        self
    }
}

/// Data for creating a new resource.
#[derive(Debug, Clone)]
pub struct NewResource {
    /// Display name.
    pub name: String,
    /// Schedule the resource belongs to.
    pub schedule_id: i64,
    /// Resource type (optional).
    pub resource_type_id: Option<i64>,
    /// Capacity (optional).
    pub max_participants: Option<i64>,
    /// Position in schedule listings.
    pub sort_order: i64,
}

impl NewResource {
    /// Create a new resource with minimal required fields.
    pub fn new(name: impl Into<String>, schedule_id: i64) -> Self {
        Self {
            name: name.into(),
            schedule_id,
            resource_type_id: None,
            max_participants: None,
            sort_order: 0,
        }
    }

    /// Set the resource type.
    pub fn with_type(mut self, resource_type_id: i64) -> Self {
        self.resource_type_id = Some(resource_type_id);
        self
    }

    /// Set the capacity.
    pub fn with_max_participants(mut self, max: i64) -> Self {
        self.max_participants = Some(max);
        self
    }

    /// Set the listing position.
    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// A node in the resource group hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ResourceGroup {
    /// Group ID.
    pub id: i64,
    /// Group name.
    pub name: String,
    /// Parent group (None for top-level groups).
    pub parent_id: Option<i64>,
}

/// Membership of a resource in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ResourceGroupAssignment {
    /// Group ID.
    pub group_id: i64,
    /// Resource ID.
    pub resource_id: i64,
}

/// Resource groups with their resource assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGroupTree {
    groups: Vec<ResourceGroup>,
    assignments: Vec<ResourceGroupAssignment>,
}

impl ResourceGroupTree {
    /// Build a tree from groups and assignments.
    pub fn new(groups: Vec<ResourceGroup>, assignments: Vec<ResourceGroupAssignment>) -> Self {
        Self {
            groups,
            assignments,
        }
    }

    /// All groups.
    pub fn groups(&self) -> &[ResourceGroup] {
        &self.groups
    }

    /// IDs of resources in `group_id` or any of its descendant groups.
    pub fn resource_ids(&self, group_id: i64) -> Vec<i64> {
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for group in &self.groups {
            if let Some(parent) = group.parent_id {
                children.entry(parent).or_default().push(group.id);
            }
        }

        let mut in_scope = HashSet::new();
        let mut queue = VecDeque::from([group_id]);
        while let Some(id) = queue.pop_front() {
            if in_scope.insert(id) {
                if let Some(kids) = children.get(&id) {
                    queue.extend(kids.iter().copied());
                }
            }
        }

        let mut seen = HashSet::new();
        self.assignments
            .iter()
            .filter(|a| in_scope.contains(&a.group_id))
            .map(|a| a.resource_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

/// Category a custom attribute belongs to.
///
/// Discriminants are the values stored in `attribute_category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomAttributeCategory {
    /// Attributes of a resource.
    Resource = 4,
    /// Attributes of a resource type.
    ResourceType = 5,
}

impl CustomAttributeCategory {
    /// Database value.
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }
}

/// A custom attribute value, or a wanted value when filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// Custom attribute ID.
    pub attribute_id: i64,
    /// Attribute value.
    pub value: String,
}

impl AttributeValue {
    /// Create an attribute value.
    pub fn new(attribute_id: i64, value: impl Into<String>) -> Self {
        Self {
            attribute_id,
            value: value.into(),
        }
    }
}

/// Attribute values of many entities, keyed by entity ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    values: HashMap<i64, Vec<AttributeValue>>,
}

impl AttributeList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value for an entity.
    pub fn add(&mut self, entity_id: i64, value: AttributeValue) {
        self.values.entry(entity_id).or_default().push(value);
    }

    /// All values of an entity.
    pub fn attributes(&self, entity_id: i64) -> &[AttributeValue] {
        self.values.get(&entity_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Value of one attribute of an entity.
    pub fn value(&self, entity_id: i64, attribute_id: i64) -> Option<&str> {
        self.attributes(entity_id)
            .iter()
            .find(|a| a.attribute_id == attribute_id)
            .map(|a| a.value.as_str())
    }
}
