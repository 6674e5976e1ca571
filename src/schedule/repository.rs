//! Resource and attribute lookups used by the resource filter.

use sqlx::{QueryBuilder, Sqlite};

use super::resource::{
    AttributeList, AttributeValue, BookableResource, CustomAttributeCategory, NewResource,
    ResourceGroup, ResourceGroupAssignment, ResourceGroupTree,
};
use crate::db::DbPool;
use crate::Result;

/// Resource group lookups.
#[allow(async_fn_in_trait)]
pub trait ResourceRepository {
    /// Group hierarchy with assignments, limited to resources on
    /// `schedule_id` when given.
    async fn get_resource_groups(&self, schedule_id: Option<i64>) -> Result<ResourceGroupTree>;
}

/// Custom attribute lookups.
#[allow(async_fn_in_trait)]
pub trait AttributeService {
    /// Attribute values of `category`, for the given entities or for all
    /// entities when `entity_ids` is `None`.
    async fn get_attributes(
        &self,
        category: CustomAttributeCategory,
        entity_ids: Option<&[i64]>,
    ) -> Result<AttributeList>;
}

/// SQLite resource repository.
pub struct SqlResourceRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SqlResourceRepository<'a> {
    /// Create a new repository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a resource.
    pub async fn create(&self, new: &NewResource) -> Result<BookableResource> {
        let resource = sqlx::query_as::<_, BookableResource>(
            "INSERT INTO resources (name, schedule_id, resource_type_id, max_participants, sort_order)
             VALUES (?, ?, ?, ?, ?)
             RETURNING resource_id AS id, name, schedule_id, resource_type_id, max_participants",
        )
        .bind(&new.name)
        .bind(new.schedule_id)
        .bind(new.resource_type_id)
        .bind(new.max_participants)
        .bind(new.sort_order)
        .fetch_one(self.pool)
        .await?;
        Ok(resource)
    }

    /// Resources of a schedule in display order.
    pub async fn get_schedule_resources(&self, schedule_id: i64) -> Result<Vec<BookableResource>> {
        let resources = sqlx::query_as::<_, BookableResource>(
            "SELECT resource_id AS id, name, schedule_id, resource_type_id, max_participants
             FROM resources WHERE schedule_id = ?
             ORDER BY sort_order, name, resource_id",
        )
        .bind(schedule_id)
        .fetch_all(self.pool)
        .await?;
        Ok(resources)
    }

    /// Create a resource group.
    pub async fn create_group(&self, name: &str, parent_id: Option<i64>) -> Result<ResourceGroup> {
        let group = sqlx::query_as::<_, ResourceGroup>(
            "INSERT INTO resource_groups (name, parent_id) VALUES (?, ?)
             RETURNING resource_group_id AS id, name, parent_id",
        )
        .bind(name)
        .bind(parent_id)
        .fetch_one(self.pool)
        .await?;
        Ok(group)
    }

    /// Put a resource into a group.
    pub async fn add_to_group(&self, group_id: i64, resource_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO resource_group_assignment (resource_group_id, resource_id)
             VALUES (?, ?)",
        )
        .bind(group_id)
        .bind(resource_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

impl ResourceRepository for SqlResourceRepository<'_> {
    async fn get_resource_groups(&self, schedule_id: Option<i64>) -> Result<ResourceGroupTree> {
        let groups = sqlx::query_as::<_, ResourceGroup>(
            "SELECT resource_group_id AS id, name, parent_id
             FROM resource_groups ORDER BY resource_group_id",
        )
        .fetch_all(self.pool)
        .await?;

        let assignments = sqlx::query_as::<_, ResourceGroupAssignment>(
            "SELECT rga.resource_group_id AS group_id, rga.resource_id
             FROM resource_group_assignment rga
             JOIN resources r ON r.resource_id = rga.resource_id
             WHERE ? IS NULL OR r.schedule_id = ?
             ORDER BY rga.resource_group_id, r.sort_order, r.resource_id",
        )
        .bind(schedule_id)
        .bind(schedule_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ResourceGroupTree::new(groups, assignments))
    }
}

/// SQLite custom attribute store.
pub struct SqlAttributeService<'a> {
    pool: &'a DbPool,
}

#[derive(sqlx::FromRow)]
struct AttributeRow {
    entity_id: i64,
    custom_attribute_id: i64,
    attribute_value: String,
}

impl<'a> SqlAttributeService<'a> {
    /// Create a new service with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Set (insert or replace) an attribute value.
    pub async fn set_value(
        &self,
        category: CustomAttributeCategory,
        entity_id: i64,
        value: &AttributeValue,
    ) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO custom_attribute_values
                 (custom_attribute_id, attribute_category, entity_id, attribute_value)
             VALUES (?, ?, ?, ?)",
        )
        .bind(value.attribute_id)
        .bind(category.as_i64())
        .bind(entity_id)
        .bind(&value.value)
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

impl AttributeService for SqlAttributeService<'_> {
    async fn get_attributes(
        &self,
        category: CustomAttributeCategory,
        entity_ids: Option<&[i64]>,
    ) -> Result<AttributeList> {
        if matches!(entity_ids, Some(ids) if ids.is_empty()) {
            return Ok(AttributeList::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT entity_id, custom_attribute_id, attribute_value
             FROM custom_attribute_values WHERE attribute_category = ",
        );
        query.push_bind(category.as_i64());

        if let Some(ids) = entity_ids {
            query.push(" AND entity_id IN (");
            let mut separated = query.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        query.push(" ORDER BY entity_id, custom_attribute_id");

        let rows = query
            .build_query_as::<AttributeRow>()
            .fetch_all(self.pool)
            .await?;

        let mut list = AttributeList::new();
        for row in rows {
            list.add(
                row.entity_id,
                AttributeValue::new(row.custom_attribute_id, row.attribute_value),
            );
        }
        Ok(list)
    }
}
