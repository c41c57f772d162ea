use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Disease as exchanged over HTTP. `id` must be absent on create and present on update.
#[derive(ToSchema)]
pub struct DiseaseDoc {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::diseases::create_disease,
        crate::routes::diseases::update_disease,
        crate::routes::diseases::get_all_diseases,
        crate::routes::diseases::get_disease,
        crate::routes::diseases::delete_disease,
        crate::routes::diseases::search_diseases,
    ),
    components(schemas(HealthResponse, DiseaseDoc)),
    tags(
        (name = "health"),
        (name = "disease")
    )
)]
pub struct ApiDoc;
