//! Disease aggregate: transfer object, persistence and search seams, and the
//! service that coordinates them.

pub mod dto;
pub mod repository;
pub mod search;
pub mod service;

pub use dto::{DiseaseDto, SORTABLE_PROPERTIES};
pub use repository::{DiseaseRepository, SeaOrmDiseaseRepository};
pub use search::{DiseaseSearchIndex, SearchHits, TantivyDiseaseIndex};
pub use service::DiseaseService;
