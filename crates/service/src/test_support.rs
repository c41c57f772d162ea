//! In-memory doubles for exercising the service and HTTP layers without a
//! database. Enabled for this crate's tests and via the `test-support` feature.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use models::disease;
use tokio::sync::RwLock;

use crate::disease::dto::SORTABLE_PROPERTIES;
use crate::disease::repository::DiseaseRepository;
use crate::errors::ServiceError;
use crate::pagination::{Direction, PageRequest, SortOrder};

/// `DiseaseRepository` over a `BTreeMap`, with ids handed out from 1 like a
/// fresh database sequence.
#[derive(Debug)]
pub struct MemoryDiseaseRepository {
    rows: RwLock<BTreeMap<i64, disease::Model>>,
    next_id: AtomicI64,
    writes: AtomicUsize,
}

impl Default for MemoryDiseaseRepository {
    fn default() -> Self {
        Self { rows: RwLock::new(BTreeMap::new()), next_id: AtomicI64::new(1), writes: AtomicUsize::new(0) }
    }
}

impl MemoryDiseaseRepository {
    /// Number of insert/update calls that reached the repository.
    pub fn write_count(&self) -> usize {
        self.writes.load(AtomicOrdering::SeqCst)
    }
}

/// Unknown properties compare equal; callers check them with `ensure_sortable`.
fn compare(a: &disease::Model, b: &disease::Model, order: &SortOrder) -> Ordering {
    let ord = match order.property.as_str() {
        "id" => a.id.cmp(&b.id),
        "name" => a.name.cmp(&b.name),
        "description" => a.description.cmp(&b.description),
        _ => Ordering::Equal,
    };
    match order.direction {
        Direction::Asc => ord,
        Direction::Desc => ord.reverse(),
    }
}

#[async_trait]
impl DiseaseRepository for MemoryDiseaseRepository {
    async fn insert(&self, name: &str, description: Option<&str>) -> Result<disease::Model, ServiceError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        let row = disease::Model { id, name: name.to_string(), description: description.map(str::to_string) };
        self.rows.write().await.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, disease: disease::Model) -> Result<Option<disease::Model>, ServiceError> {
        self.writes.fetch_add(1, AtomicOrdering::SeqCst);
        let mut rows = self.rows.write().await;
        match rows.get_mut(&disease.id) {
            Some(existing) => {
                *existing = disease.clone();
                Ok(Some(disease))
            }
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<disease::Model>, ServiceError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<disease::Model>, ServiceError> {
        let rows = self.rows.read().await;
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn find_page(&self, page: &PageRequest) -> Result<(Vec<disease::Model>, u64), ServiceError> {
        let mut all: Vec<disease::Model> = self.rows.read().await.values().cloned().collect();
        page.ensure_sortable(SORTABLE_PROPERTIES)?;
        page.ensure_addressable()?;
        // BTreeMap iteration is already id-ascending, and the sort is stable
        all.sort_by(|a, b| {
            page.sort
                .iter()
                .map(|o| compare(a, b, o))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        let total = all.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(page.size).unwrap_or(usize::MAX);
        let content = all.into_iter().skip(offset).take(size).collect();
        Ok((content, total))
    }

    async fn find_all(&self) -> Result<Vec<disease::Model>, ServiceError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}
