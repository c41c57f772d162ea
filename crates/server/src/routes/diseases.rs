//! REST endpoints for managing diseases.

use axum::{
    async_trait,
    extract::{FromRequest, Path, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use axum_extra::extract::Query;
use service::disease::{DiseaseDto, SORTABLE_PROPERTIES};
use service::errors::ServiceError;
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::pagination::{self, InvalidPageParam, PageParams, SearchParams};
use crate::{headers, metrics, state::ServerState};

const ENTITY_NAME: &str = "disease";
pub const API_BASE: &str = "/api/diseases";
pub const SEARCH_BASE: &str = "/api/_search/diseases";

fn failure(state: &ServerState, err: ServiceError) -> ApiError {
    ApiError::from_service(&state.app_name, ENTITY_NAME, err)
}

fn invalid_param(state: &ServerState, err: InvalidPageParam) -> ApiError {
    ApiError::bad_request(&state.app_name, err.message, ENTITY_NAME, err.error_key)
}

/// JSON disease body; unreadable bodies become a `validation` problem.
pub struct DiseaseBody(pub DiseaseDto);

#[async_trait]
impl FromRequest<ServerState> for DiseaseBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &ServerState) -> Result<Self, Self::Rejection> {
        match Json::<DiseaseDto>::from_request(req, state).await {
            Ok(Json(dto)) => Ok(Self(dto)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "rejected disease body");
                Err(ApiError::bad_request(&state.app_name, rejection.body_text(), ENTITY_NAME, "validation"))
            }
        }
    }
}

/// POST /api/diseases : create a new disease.
#[utoipa::path(
    post, path = "/api/diseases", tag = "disease",
    request_body = crate::openapi::DiseaseDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::DiseaseDoc),
        (status = 400, description = "Disease already has an ID, or is invalid")
    )
)]
pub async fn create_disease(
    State(state): State<ServerState>,
    DiseaseBody(disease): DiseaseBody,
) -> Result<(StatusCode, HeaderMap, Json<DiseaseDto>), ApiError> {
    let _timer = metrics::time("create_disease");
    debug!(?disease, "REST request to save Disease");
    if disease.id.is_some() {
        return Err(ApiError::bad_request(
            &state.app_name,
            "A new disease cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }
    disease.validate().map_err(|e| failure(&state, e))?;

    let result = state.diseases.save(disease).await.map_err(|e| failure(&state, e))?;
    let id = result.id.ok_or_else(|| ApiError::Internal("saved disease has no id".into()))?;
    let location = format!("{API_BASE}/{id}");

    let mut out = headers::entity_creation_alert(&state.app_name, ENTITY_NAME, &id.to_string());
    let location = HeaderValue::from_str(&location).map_err(|e| ApiError::Internal(e.to_string()))?;
    out.insert(header::LOCATION, location);
    info!(id, "created disease");
    Ok((StatusCode::CREATED, out, Json(result)))
}

/// PUT /api/diseases : update an existing disease.
#[utoipa::path(
    put, path = "/api/diseases", tag = "disease",
    request_body = crate::openapi::DiseaseDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::DiseaseDoc),
        (status = 400, description = "Missing ID, or invalid disease"),
        (status = 404, description = "No disease with that ID")
    )
)]
pub async fn update_disease(
    State(state): State<ServerState>,
    DiseaseBody(disease): DiseaseBody,
) -> Result<(HeaderMap, Json<DiseaseDto>), ApiError> {
    let _timer = metrics::time("update_disease");
    debug!(?disease, "REST request to update Disease");
    let Some(id) = disease.id else {
        return Err(ApiError::bad_request(&state.app_name, "Invalid id", ENTITY_NAME, "idnull"));
    };
    disease.validate().map_err(|e| failure(&state, e))?;

    let result = state.diseases.save(disease).await.map_err(|e| failure(&state, e))?;
    info!(id, "updated disease");
    Ok((headers::entity_update_alert(&state.app_name, ENTITY_NAME, &id.to_string()), Json(result)))
}

/// GET /api/diseases : one page of diseases.
#[utoipa::path(
    get, path = "/api/diseases", tag = "disease",
    params(
        ("page" = Option<u64>, Query, description = "0-based page index"),
        ("size" = Option<u64>, Query, description = "Page size"),
        ("sort" = Option<String>, Query, description = "property,(asc|desc); repeatable")
    ),
    responses(
        (status = 200, description = "Page of diseases with X-Total-Count and Link headers"),
        (status = 400, description = "Unsupported sort, or page out of range")
    )
)]
pub async fn get_all_diseases(
    State(state): State<ServerState>,
    Query(params): Query<PageParams>,
) -> Result<(HeaderMap, Json<Vec<DiseaseDto>>), ApiError> {
    let _timer = metrics::time("get_all_diseases");
    debug!("REST request to get a page of Diseases");
    let request = params.into_request().map_err(|e| invalid_param(&state, e))?;
    request
        .ensure_sortable(SORTABLE_PROPERTIES)
        .map_err(|e| invalid_param(&state, InvalidPageParam::new("sortinvalid", e)))?;

    let page = state.diseases.find_all(&request).await.map_err(|e| failure(&state, e))?;
    let headers = pagination::pagination_headers(&page, API_BASE);
    Ok((headers, Json(page.content)))
}

/// GET /api/diseases/{id} : the disease, or 404.
#[utoipa::path(
    get, path = "/api/diseases/{id}", tag = "disease",
    params(("id" = i64, Path, description = "Disease ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::DiseaseDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_disease(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<DiseaseDto>, ApiError> {
    let _timer = metrics::time("get_disease");
    debug!(id, "REST request to get Disease");
    match state.diseases.find_one(id).await.map_err(|e| failure(&state, e))? {
        Some(d) => Ok(Json(d)),
        None => Err(ApiError::NotFound),
    }
}

/// DELETE /api/diseases/{id} : always 200, whether or not the row existed.
#[utoipa::path(
    delete, path = "/api/diseases/{id}", tag = "disease",
    params(("id" = i64, Path, description = "Disease ID")),
    responses((status = 200, description = "Deleted"))
)]
pub async fn delete_disease(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    let _timer = metrics::time("delete_disease");
    debug!(id, "REST request to delete Disease");
    state.diseases.delete(id).await.map_err(|e| failure(&state, e))?;
    info!(id, "deleted disease");
    Ok((StatusCode::OK, headers::entity_deletion_alert(&state.app_name, ENTITY_NAME, &id.to_string())))
}

/// GET /api/_search/diseases?query= : ranked page of matches.
#[utoipa::path(
    get, path = "/api/_search/diseases", tag = "disease",
    params(
        ("query" = String, Query, description = "Free-text query"),
        ("page" = Option<u64>, Query, description = "0-based page index"),
        ("size" = Option<u64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Ranked page of diseases with X-Total-Count and Link headers"),
        (status = 400, description = "Missing query, or page out of range")
    )
)]
pub async fn search_diseases(
    State(state): State<ServerState>,
    Query(params): Query<SearchParams>,
) -> Result<(HeaderMap, Json<Vec<DiseaseDto>>), ApiError> {
    let _timer = metrics::time("search_diseases");
    let (query, request) = params.into_parts().map_err(|e| invalid_param(&state, e))?;
    debug!(%query, "REST request to search for a page of Diseases");

    let page = state.diseases.search(&query, &request).await.map_err(|e| failure(&state, e))?;
    let headers = pagination::search_pagination_headers(&query, &page, SEARCH_BASE);
    Ok((headers, Json(page.content)))
}
