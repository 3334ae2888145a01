use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use nb_core::{Article, BriefingConfig, BriefingHistory, NewsSearch, ParsedSummary};
use nb_fetch::GeneratedBriefing;
use serde::{Deserialize, Serialize};

use crate::error::{ApiResult, UserId};
use crate::AppState;

pub async fn list_configs(
    State(state): State<AppState>,
    UserId(user): UserId,
) -> ApiResult<Json<Vec<BriefingConfig>>> {
    Ok(Json(state.manager.list_configs(&user).await?))
}

/// A new config without topics is created inactive; anything else goes
/// through the full save rules. Configs owned by another user are not found.
pub async fn save_config(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(mut config): Json<BriefingConfig>,
) -> ApiResult<Json<BriefingConfig>> {
    config.user_id = user;
    let saved = if config.id.is_none() && config.topics.is_empty() {
        state
            .manager
            .create_config(&config.user_id, &config.name, config.description.as_deref())
            .await?
    } else {
        state.manager.save_config(&config).await?
    };
    Ok(Json(saved))
}

pub async fn delete_config(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.manager.delete_config(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn generate_briefing(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
) -> ApiResult<Json<GeneratedBriefing>> {
    Ok(Json(state.manager.generate_by_id(&user, &id).await?))
}

pub async fn list_briefings(
    State(state): State<AppState>,
    UserId(user): UserId,
) -> ApiResult<Json<Vec<BriefingHistory>>> {
    Ok(Json(state.manager.briefing_history(&user).await?))
}

#[derive(Debug, Deserialize)]
pub struct LatestParams {
    pub config_id: Option<String>,
}

pub async fn latest_briefing(
    State(state): State<AppState>,
    UserId(user): UserId,
    Query(params): Query<LatestParams>,
) -> ApiResult<Json<Option<BriefingHistory>>> {
    let latest = state.manager.latest_briefing(&user, params.config_id.as_deref()).await?;
    Ok(Json(latest))
}

pub async fn delete_briefing(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.manager.delete_briefing(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub topic: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn search(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<NewsSearch>> {
    let search = state
        .manager
        .search(&user, &request.topic, request.start_date, request.end_date)
        .await?;
    Ok(Json(search))
}

pub async fn list_searches(
    State(state): State<AppState>,
    UserId(user): UserId,
) -> ApiResult<Json<Vec<NewsSearch>>> {
    Ok(Json(state.manager.search_history(&user).await?))
}

pub async fn delete_search(
    State(state): State<AppState>,
    UserId(user): UserId,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.manager.delete_search(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SummarizeSearchRequest {
    pub articles: Vec<Article>,
}

pub async fn summarize_search(
    State(state): State<AppState>,
    UserId(user): UserId,
    Json(request): Json<SummarizeSearchRequest>,
) -> ApiResult<Json<ParsedSummary>> {
    Ok(Json(state.manager.summarize_search(&user, &request.articles).await?))
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

pub async fn summarize_article(
    State(state): State<AppState>,
    UserId(_user): UserId,
    Json(request): Json<SummarizeRequest>,
) -> Json<SummaryResponse> {
    let summary = state.manager.summarize_article(&request.url).await;
    Json(SummaryResponse { summary })
}
