//! Catalog handler

use crate::api::state::AppState;
use axum::{extract::State, Json};
use broker_types::Service;
use serde::Serialize;

/// Catalog response, services in declaration order with nested plans
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub services: Vec<Service>,
}

/// List the catalog
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        services: state.control.catalog().services().to_vec(),
    })
}
