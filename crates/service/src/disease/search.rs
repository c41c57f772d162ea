//! Full-text index over diseases, backed by Tantivy.
//!
//! Only the id is stored; `name` and `description` are indexed for BM25
//! ranking and the rows themselves are loaded from the repository.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use models::disease;
use tantivy::collector::{Count, TopDocs};
use tantivy::directory::MmapDirectory;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, INDEXED, STORED, TEXT};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

use crate::errors::ServiceError;

/// Ranked ids for one page of hits plus the total number of matches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchHits {
    pub ids: Vec<i64>,
    pub total: u64,
}

/// Search seam. Implementations must make writes visible to the next search.
#[async_trait]
pub trait DiseaseSearchIndex: Send + Sync {
    /// Add or replace the document for `disease.id`.
    async fn index(&self, disease: &disease::Model) -> Result<(), ServiceError>;
    async fn remove(&self, id: i64) -> Result<(), ServiceError>;
    async fn search(&self, query: &str, offset: u64, limit: u64) -> Result<SearchHits, ServiceError>;
    async fn clear(&self) -> Result<(), ServiceError>;
}

#[derive(Clone, Copy)]
struct DiseaseFields {
    id: Field,
    name: Field,
    description: Field,
}

fn create_schema() -> (Schema, DiseaseFields) {
    let mut builder = Schema::builder();
    let id = builder.add_i64_field("id", INDEXED | STORED);
    let name = builder.add_text_field("name", TEXT);
    let description = builder.add_text_field("description", TEXT);
    (builder.build(), DiseaseFields { id, name, description })
}

pub struct TantivyDiseaseIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: DiseaseFields,
}

impl std::fmt::Debug for TantivyDiseaseIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyDiseaseIndex").field("schema", &"<schema>").finish()
    }
}

impl TantivyDiseaseIndex {
    /// Index held entirely in memory; empty until populated.
    pub fn in_ram(writer_heap_bytes: usize) -> Result<Self, ServiceError> {
        let (schema, fields) = create_schema();
        Self::from_index(Index::create_in_ram(schema), fields, writer_heap_bytes)
    }

    /// Open the index in `dir`, creating it (and the directory) if missing.
    pub fn open_or_create(dir: &Path, writer_heap_bytes: usize) -> Result<Self, ServiceError> {
        let (schema, fields) = create_schema();
        std::fs::create_dir_all(dir)
            .map_err(|e| ServiceError::Search(format!("cannot create {}: {e}", dir.display())))?;
        let directory = MmapDirectory::open(dir).map_err(ServiceError::search)?;
        let index = Index::open_or_create(directory, schema).map_err(ServiceError::search)?;
        info!(dir = %dir.display(), "opened disease search index");
        Self::from_index(index, fields, writer_heap_bytes)
    }

    fn from_index(index: Index, fields: DiseaseFields, writer_heap_bytes: usize) -> Result<Self, ServiceError> {
        let writer = index.writer_with_num_threads(1, writer_heap_bytes).map_err(ServiceError::search)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(ServiceError::search)?;
        Ok(Self { index, reader, writer: Mutex::new(writer), fields })
    }

    fn lock_writer(&self) -> Result<MutexGuard<'_, IndexWriter>, ServiceError> {
        self.writer.lock().map_err(|_| ServiceError::Search("index writer lock poisoned".into()))
    }

    /// Commit pending operations and make them visible to searchers.
    fn commit(&self, writer: &mut IndexWriter) -> Result<(), ServiceError> {
        writer.commit().map_err(ServiceError::search)?;
        self.reader.reload().map_err(ServiceError::search)
    }
}

#[async_trait]
impl DiseaseSearchIndex for TantivyDiseaseIndex {
    async fn index(&self, disease: &disease::Model) -> Result<(), ServiceError> {
        let mut writer = self.lock_writer()?;
        writer.delete_term(Term::from_field_i64(self.fields.id, disease.id));
        let mut document = doc!(
            self.fields.id => disease.id,
            self.fields.name => disease.name.as_str()
        );
        if let Some(description) = &disease.description {
            document.add_text(self.fields.description, description);
        }
        writer.add_document(document).map_err(ServiceError::search)?;
        self.commit(&mut writer)?;
        debug!(id = disease.id, "indexed disease");
        Ok(())
    }

    async fn remove(&self, id: i64) -> Result<(), ServiceError> {
        let mut writer = self.lock_writer()?;
        writer.delete_term(Term::from_field_i64(self.fields.id, id));
        self.commit(&mut writer)?;
        debug!(id, "removed disease from index");
        Ok(())
    }

    async fn search(&self, query: &str, offset: u64, limit: u64) -> Result<SearchHits, ServiceError> {
        let parser = QueryParser::for_index(&self.index, vec![self.fields.name, self.fields.description]);
        let (parsed, errors) = parser.parse_query_lenient(query);
        if !errors.is_empty() {
            debug!(query, errors = errors.len(), "query parsed leniently");
        }

        let searcher = self.reader.searcher();
        let total = searcher.search(&parsed, &Count).map_err(ServiceError::search)? as u64;
        // TopDocs reserves offset + limit slots, so only collect inside the hit range
        if offset >= total {
            return Ok(SearchHits { ids: Vec::new(), total });
        }
        let offset = offset as usize;
        let limit = limit.clamp(1, total - offset as u64) as usize;
        let top_docs = searcher
            .search(&parsed, &TopDocs::with_limit(limit).and_offset(offset))
            .map_err(ServiceError::search)?;

        let mut ids = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let stored: TantivyDocument = searcher.doc(address).map_err(ServiceError::search)?;
            if let Some(id) = stored.get_first(self.fields.id).and_then(|v| v.as_i64()) {
                ids.push(id);
            }
        }
        Ok(SearchHits { ids, total })
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        let mut writer = self.lock_writer()?;
        writer.delete_all_documents().map_err(ServiceError::search)?;
        self.commit(&mut writer)
    }
}
