//! 排名查询处理器

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use tracing::{error, instrument};

use super::ApiResponse;
use crate::error::Result;
use crate::models::Ranking;
use crate::render::render_rankings_page;
use crate::state::AppState;

/// 排名页面
///
/// GET /
///
/// 读取失败时记录日志并渲染空表，页面本身总能返回
#[instrument(skip(state))]
pub async fn rankings_page(State(state): State<AppState>) -> impl IntoResponse {
    let rankings = match state.store.get_rankings(&state.leaderboard.id).await {
        Ok(rankings) => rankings,
        Err(e) => {
            error!(error = %e, "Failed to load rankings");
            Vec::new()
        }
    };

    (
        [(header::CACHE_CONTROL, "no-cache")],
        Html(render_rankings_page(&state.leaderboard.name, &rankings)),
    )
}

/// 排名 JSON 接口
///
/// GET /api/rankings
#[instrument(skip(state))]
pub async fn list_rankings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Ranking>>>> {
    let rankings = state.store.get_rankings(&state.leaderboard.id).await?;
    Ok(Json(ApiResponse::success(rankings)))
}
