pub mod errors;
pub mod headers;
pub mod metrics;
pub mod openapi;
pub mod pagination;
pub mod routes;
pub mod startup;
pub mod state;

