use async_trait::async_trait;
use models::disease::{self, Entity as DiseaseEntity};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::errors::ServiceError;
use crate::pagination::{Direction, PageRequest};

/// Persistence seam for diseases.
#[async_trait]
pub trait DiseaseRepository: Send + Sync {
    async fn insert(&self, name: &str, description: Option<&str>) -> Result<disease::Model, ServiceError>;
    /// Returns `None` when no row has `disease.id`.
    async fn update(&self, disease: disease::Model) -> Result<Option<disease::Model>, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<disease::Model>, ServiceError>;
    /// Rows for the given ids, in no particular order; missing ids are skipped.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<disease::Model>, ServiceError>;
    /// One page plus the total row count.
    async fn find_page(&self, page: &PageRequest) -> Result<(Vec<disease::Model>, u64), ServiceError>;
    async fn find_all(&self) -> Result<Vec<disease::Model>, ServiceError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmDiseaseRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmDiseaseRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn sort_column(property: &str) -> Result<disease::Column, ServiceError> {
    match property {
        "id" => Ok(disease::Column::Id),
        "name" => Ok(disease::Column::Name),
        "description" => Ok(disease::Column::Description),
        other => Err(ServiceError::Validation(format!("cannot sort by '{other}'"))),
    }
}

#[async_trait]
impl DiseaseRepository for SeaOrmDiseaseRepository {
    async fn insert(&self, name: &str, description: Option<&str>) -> Result<disease::Model, ServiceError> {
        let am = disease::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
        };
        am.insert(&self.db).await.map_err(ServiceError::db)
    }

    async fn update(&self, disease: disease::Model) -> Result<Option<disease::Model>, ServiceError> {
        let current = DiseaseEntity::find_by_id(disease.id).one(&self.db).await.map_err(ServiceError::db)?;
        let Some(existing) = current else { return Ok(None) };
        let mut am: disease::ActiveModel = existing.into();
        am.name = Set(disease.name);
        am.description = Set(disease.description);
        let updated = am.update(&self.db).await.map_err(ServiceError::db)?;
        Ok(Some(updated))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<disease::Model>, ServiceError> {
        DiseaseEntity::find_by_id(id).one(&self.db).await.map_err(ServiceError::db)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<disease::Model>, ServiceError> {
        if ids.is_empty() { return Ok(Vec::new()); }
        DiseaseEntity::find()
            .filter(disease::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(ServiceError::db)
    }

    async fn find_page(&self, page: &PageRequest) -> Result<(Vec<disease::Model>, u64), ServiceError> {
        let mut select = DiseaseEntity::find();
        for order in &page.sort {
            let direction = match order.direction { Direction::Asc => Order::Asc, Direction::Desc => Order::Desc };
            select = select.order_by(sort_column(&order.property)?, direction);
        }
        // stable paging needs a total order
        if !page.sort.iter().any(|o| o.property == "id") {
            select = select.order_by_asc(disease::Column::Id);
        }
        page.ensure_addressable()?;
        let total = DiseaseEntity::find().count(&self.db).await.map_err(ServiceError::db)?;
        if page.offset() >= total {
            return Ok((Vec::new(), total));
        }
        let rows = select
            .offset(page.offset())
            .limit(page.size)
            .all(&self.db)
            .await
            .map_err(ServiceError::db)?;
        Ok((rows, total))
    }

    async fn find_all(&self) -> Result<Vec<disease::Model>, ServiceError> {
        DiseaseEntity::find()
            .order_by_asc(disease::Column::Id)
            .all(&self.db)
            .await
            .map_err(ServiceError::db)
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let res = DiseaseEntity::delete_by_id(id).exec(&self.db).await.map_err(ServiceError::db)?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_maps_known_properties() {
        assert!(matches!(sort_column("id"), Ok(disease::Column::Id)));
        assert!(matches!(sort_column("name"), Ok(disease::Column::Name)));
        assert!(matches!(sort_column("description"), Ok(disease::Column::Description)));
        assert!(matches!(sort_column("secret"), Err(ServiceError::Validation(_))));
    }
}
