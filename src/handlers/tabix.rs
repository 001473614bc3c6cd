use super::AppState;
use crate::{
    Error, Result,
    lookup::TabixRequest,
    processor,
    types::{OutputFormat, TabixParams},
};
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};

/// Look up a region with tabix and return the raw records (`BED`) or the
/// nearest-interval envelope (`JSON`).
pub async fn get_tabix(
    State(state): State<AppState>,
    params: std::result::Result<Query<TabixParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|e| Error::InvalidInput(e.body_text()))?;
    let format: OutputFormat = params.output_format.parse()?;

    let request = TabixRequest::from_params(&params, &state.work_dir)?;
    let query = request.region_query(&params)?;
    tracing::debug!("{} lookup of {} in {}", format.as_str(), request.region, request.path);

    let raw = state.lookup.query(&request).await?;
    let processed = processor::process(&raw, &query, format)?;

    Ok(([(header::CONTENT_TYPE, processed.content_type)], processed.body).into_response())
}
