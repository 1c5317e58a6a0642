//! Demo Resource Handlers
//!
//! A small static catalog behind the protected routes. The handlers exist
//! to give the filters and the access policy something real to guard; they
//! hold no state and read nothing but their path parameters.

use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use kernel::error::app_error::{AppResult, OptionExt};
use serde_json::{Value, json};

use crate::presentation::dto::{BeerDto, CustomerDto};

fn catalog() -> Vec<BeerDto> {
    vec![
        BeerDto {
            id: 1,
            beer_name: "Mango Bobs".to_string(),
            beer_style: "IPA".to_string(),
            upc: "0631234200036".to_string(),
        },
        BeerDto {
            id: 2,
            beer_name: "Galaxy Cat".to_string(),
            beer_style: "Pale Ale".to_string(),
            upc: "0631234300019".to_string(),
        },
        BeerDto {
            id: 3,
            beer_name: "Pinball Porter".to_string(),
            beer_style: "Porter".to_string(),
            upc: "0083783375213".to_string(),
        },
    ]
}

/// GET / (public)
pub async fn index() -> Json<Value> {
    Json(json!({ "application": "brewery-api" }))
}

/// GET /api/v1/beer
pub async fn list_beers() -> Json<Vec<BeerDto>> {
    Json(catalog())
}

/// GET /api/v1/beer/{beer_id}
pub async fn get_beer(Path(beer_id): Path<u32>) -> AppResult<Json<BeerDto>> {
    catalog()
        .into_iter()
        .find(|b| b.id == beer_id)
        .map(Json)
        .ok_or_not_found("Beer not found")
}

/// DELETE /api/v1/beer/{beer_id}
pub async fn delete_beer(Path(beer_id): Path<u32>) -> AppResult<StatusCode> {
    catalog()
        .iter()
        .find(|b| b.id == beer_id)
        .ok_or_not_found("Beer not found")?;
    tracing::info!(beer_id, "Beer deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/beerUpc/{upc}
pub async fn get_beer_by_upc(Path(upc): Path<String>) -> AppResult<Json<BeerDto>> {
    catalog()
        .into_iter()
        .find(|b| b.upc == upc)
        .map(Json)
        .ok_or_not_found("Beer not found")
}

/// GET /customers
pub async fn list_customers() -> Json<Vec<CustomerDto>> {
    Json(vec![
        CustomerDto {
            id: 1,
            customer_name: "Flying Dutchman".to_string(),
        },
        CustomerDto {
            id: 2,
            customer_name: "St. Petersburg Sunrise".to_string(),
        },
    ])
}
