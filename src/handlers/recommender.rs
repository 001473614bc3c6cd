use super::AppState;
use crate::{
    Error, Result,
    lookup::RecommenderRequest,
    types::{OutputFormat, RecommenderParams},
};
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};

/// Run the recommender for a region and relay its output as-is
pub async fn get_recommendations(
    State(state): State<AppState>,
    params: std::result::Result<Query<RecommenderParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = params.map_err(|e| Error::InvalidInput(e.body_text()))?;
    let format: OutputFormat = params.output_format.parse()?;

    let request = RecommenderRequest::from_params(&params, &state.work_dir)?;
    let body = state.recommender.recommend(&request).await?;

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}
