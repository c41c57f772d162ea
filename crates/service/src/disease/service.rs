use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use models::disease;
use tracing::{error, info, instrument, warn};

use crate::disease::dto::DiseaseDto;
use crate::disease::repository::DiseaseRepository;
use crate::disease::search::DiseaseSearchIndex;
use crate::errors::ServiceError;
use crate::pagination::{Page, PageRequest};

/// Application service for diseases. Keeps the search index in step with
/// the repository on every write.
///
/// A write whose row change committed but whose index update failed still
/// succeeds; the index is marked stale and rebuilt before the next search.
pub struct DiseaseService {
    repo: Arc<dyn DiseaseRepository>,
    index: Arc<dyn DiseaseSearchIndex>,
    index_stale: AtomicBool,
}

impl DiseaseService {
    pub fn new(repo: Arc<dyn DiseaseRepository>, index: Arc<dyn DiseaseSearchIndex>) -> Self {
        Self { repo, index, index_stale: AtomicBool::new(false) }
    }

    fn mark_index_stale(&self, id: i64, err: ServiceError) {
        error!(id, error = %err, "search index update failed; rebuilding before next search");
        self.index_stale.store(true, Ordering::SeqCst);
    }

    async fn refresh_stale_index(&self) -> Result<(), ServiceError> {
        if self.index_stale.swap(false, Ordering::SeqCst) {
            if let Err(e) = self.reindex_all().await {
                self.index_stale.store(true, Ordering::SeqCst);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Insert when `dto.id` is absent, otherwise update the existing row.
    /// Updating an unknown id is `NotFound`.
    #[instrument(skip(self, dto), fields(id = ?dto.id))]
    pub async fn save(&self, dto: DiseaseDto) -> Result<DiseaseDto, ServiceError> {
        dto.validate()?;
        let saved = match dto.id {
            None => self.repo.insert(&dto.name, dto.description.as_deref()).await?,
            Some(id) => {
                let changed = disease::Model { id, name: dto.name, description: dto.description };
                self.repo.update(changed).await?.ok_or_else(|| ServiceError::not_found("disease"))?
            }
        };
        if let Err(e) = self.index.index(&saved).await {
            self.mark_index_stale(saved.id, e);
        }
        Ok(saved.into())
    }

    pub async fn find_all(&self, page: &PageRequest) -> Result<Page<DiseaseDto>, ServiceError> {
        page.ensure_addressable()?;
        let (rows, total) = self.repo.find_page(page).await?;
        Ok(Page::new(rows, page, total).map(DiseaseDto::from))
    }

    pub async fn find_one(&self, id: i64) -> Result<Option<DiseaseDto>, ServiceError> {
        Ok(self.repo.find_by_id(id).await?.map(DiseaseDto::from))
    }

    /// Remove the row and its index document. Unknown ids are not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let removed = self.repo.delete(id).await?;
        if let Err(e) = self.index.remove(id).await {
            self.mark_index_stale(id, e);
        }
        if !removed {
            info!(id, "delete of absent disease acknowledged");
        }
        Ok(())
    }

    /// Rank by the index, then load rows in rank order. Hits whose rows
    /// disappeared in between are dropped from the page.
    pub async fn search(&self, query: &str, page: &PageRequest) -> Result<Page<DiseaseDto>, ServiceError> {
        page.ensure_addressable()?;
        self.refresh_stale_index().await?;
        let hits = self.index.search(query, page.offset(), page.size).await?;
        let mut by_id: HashMap<i64, disease::Model> = self
            .repo
            .find_by_ids(&hits.ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let content: Vec<DiseaseDto> = hits.ids.iter().filter_map(|id| by_id.remove(id)).map(DiseaseDto::from).collect();
        if content.len() < hits.ids.len() {
            warn!(query, stale = hits.ids.len() - content.len(), "search index references missing diseases");
        }
        Ok(Page::new(content, page, hits.total))
    }

    /// Drop every index document and re-add all rows. Returns the row count.
    pub async fn reindex_all(&self) -> Result<usize, ServiceError> {
        self.index.clear().await?;
        let rows = self.repo.find_all().await?;
        for row in &rows {
            self.index.index(row).await?;
        }
        info!(count = rows.len(), "rebuilt disease search index");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::search::TantivyDiseaseIndex;
    use crate::pagination::SortOrder;
    use crate::test_support::MemoryDiseaseRepository;

    fn dto(id: Option<i64>, name: &str) -> DiseaseDto {
        DiseaseDto { id, name: name.into(), description: None }
    }

    fn fixture() -> (DiseaseService, Arc<MemoryDiseaseRepository>) {
        let repo = Arc::new(MemoryDiseaseRepository::default());
        let index = Arc::new(TantivyDiseaseIndex::in_ram(15_000_000).unwrap());
        (DiseaseService::new(repo.clone(), index), repo)
    }

    #[tokio::test]
    async fn save_assigns_ids_and_updates_in_place() -> Result<(), anyhow::Error> {
        let (svc, _repo) = fixture();
        let flu = svc.save(dto(None, "flu")).await?;
        assert_eq!(flu.id, Some(1));
        let measles = svc.save(dto(None, "measles")).await?;
        assert_eq!(measles.id, Some(2));

        let renamed = svc.save(dto(Some(1), "influenza")).await?;
        assert_eq!(renamed, dto(Some(1), "influenza"));
        assert_eq!(svc.find_one(1).await?, Some(renamed));
        Ok(())
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found_and_not_indexed() -> Result<(), anyhow::Error> {
        let (svc, _repo) = fixture();
        let err = svc.save(dto(Some(42), "ghost")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(svc.search("ghost", &PageRequest::default()).await?.total_elements, 0);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_repository() {
        let (svc, repo) = fixture();
        assert!(svc.save(dto(None, "")).await.is_err());
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_unindexes() -> Result<(), anyhow::Error> {
        let (svc, _repo) = fixture();
        let saved = svc.save(dto(None, "cholera")).await?;
        let id = saved.id.unwrap();
        svc.delete(id).await?;
        svc.delete(id).await?;
        assert_eq!(svc.find_one(id).await?, None);
        assert_eq!(svc.search("cholera", &PageRequest::default()).await?.total_elements, 0);
        Ok(())
    }

    #[tokio::test]
    async fn find_all_pages_and_sorts() -> Result<(), anyhow::Error> {
        let (svc, _repo) = fixture();
        for name in ["mumps", "flu", "rubella"] {
            svc.save(dto(None, name)).await?;
        }
        let by_name = PageRequest::new(Some(0), Some(2), vec![SortOrder::parse("name,asc")?]);
        let page = svc.find_all(&by_name).await?;
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages(), 2);
        let names: Vec<_> = page.content.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["flu", "mumps"]);

        let last = svc.find_all(&PageRequest::new(Some(1), Some(2), Vec::new())).await?;
        assert_eq!(last.content.len(), 1);
        assert_eq!(last.content[0].name, "rubella");
        Ok(())
    }

    #[tokio::test]
    async fn search_skips_rows_missing_from_repository() -> Result<(), anyhow::Error> {
        let (svc, repo) = fixture();
        svc.save(dto(None, "yellow fever")).await?;
        svc.save(dto(None, "dengue fever")).await?;
        // row vanishes behind the service's back
        repo.delete(1).await?;
        let page = svc.search("fever", &PageRequest::default()).await?;
        assert_eq!(page.content, vec![dto(Some(2), "dengue fever")]);
        assert_eq!(page.total_elements, 2);
        Ok(())
    }

    /// Index that fails writes while `failing` is set.
    struct FlakyIndex {
        inner: TantivyDiseaseIndex,
        failing: AtomicBool,
    }

    #[async_trait::async_trait]
    impl DiseaseSearchIndex for FlakyIndex {
        async fn index(&self, disease: &disease::Model) -> Result<(), ServiceError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ServiceError::Search("commit failed".into()));
            }
            self.inner.index(disease).await
        }

        async fn remove(&self, id: i64) -> Result<(), ServiceError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ServiceError::Search("commit failed".into()));
            }
            self.inner.remove(id).await
        }

        async fn search(&self, query: &str, offset: u64, limit: u64) -> Result<crate::disease::SearchHits, ServiceError> {
            self.inner.search(query, offset, limit).await
        }

        async fn clear(&self) -> Result<(), ServiceError> {
            self.inner.clear().await
        }
    }

    #[tokio::test]
    async fn failed_index_write_keeps_result_and_rebuilds_before_search() -> Result<(), anyhow::Error> {
        let repo = Arc::new(MemoryDiseaseRepository::default());
        let index = Arc::new(FlakyIndex { inner: TantivyDiseaseIndex::in_ram(15_000_000)?, failing: AtomicBool::new(false) });
        let svc = DiseaseService::new(repo, index.clone());
        svc.save(dto(None, "flu")).await?;
        svc.save(dto(None, "cholera")).await?;

        index.failing.store(true, Ordering::SeqCst);
        let renamed = svc.save(dto(Some(1), "measles")).await?;
        assert_eq!(renamed, dto(Some(1), "measles"));
        svc.delete(2).await?;
        index.failing.store(false, Ordering::SeqCst);

        assert_eq!(svc.search("flu", &PageRequest::default()).await?.total_elements, 0);
        assert_eq!(svc.search("cholera", &PageRequest::default()).await?.total_elements, 0);
        let page = svc.search("measles", &PageRequest::default()).await?;
        assert_eq!(page.content, vec![dto(Some(1), "measles")]);
        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_page_is_rejected() {
        let (svc, _repo) = fixture();
        let far = PageRequest::new(Some(u64::MAX), Some(20), Vec::new());
        assert!(matches!(svc.find_all(&far).await, Err(ServiceError::Validation(_))));
        assert!(matches!(svc.search("flu", &far).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn reindex_all_restores_a_fresh_index() -> Result<(), anyhow::Error> {
        let repo = Arc::new(MemoryDiseaseRepository::default());
        repo.insert("tetanus", None).await?;
        repo.insert("typhoid", Some("salmonella typhi")).await?;
        let svc = DiseaseService::new(repo, Arc::new(TantivyDiseaseIndex::in_ram(15_000_000)?));

        assert_eq!(svc.search("typhoid", &PageRequest::default()).await?.total_elements, 0);
        assert_eq!(svc.reindex_all().await?, 2);
        let page = svc.search("salmonella", &PageRequest::default()).await?;
        assert_eq!(page.content[0].name, "typhoid");
        Ok(())
    }
}
