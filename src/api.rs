//! HTTP surface: plan a quest path for a player, and read/write the
//! persisted run configuration.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::dto::PathDto;
use crate::path::{PathError, PathFinder, PlanContext};
use crate::player::service::PlayerService;
use crate::quest::catalogue::QuestCatalogue;
use crate::settings::Settings;
use crate::skill::Skill;

#[derive(Clone)]
pub struct AppState {
    pub catalogue: Arc<QuestCatalogue>,
    pub players: Arc<PlayerService>,
    pub settings_path: Arc<PathBuf>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/quests/path", get(quest_path))
        .route("/api/settings", get(get_settings).put(put_settings))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PathParams {
    name: Option<String>,
    ironman: Option<bool>,
    recommended: Option<bool>,
    /// Comma-separated skill names.
    lamp_skills: Option<String>,
}

async fn quest_path(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> Result<Json<PathDto>, (StatusCode, String)> {
    // Request parameters override the saved settings.
    let defaults = Settings::load(&state.settings_path).unwrap_or_default();

    let name = params.name.or(defaults.name);
    let ironman = params.ironman.unwrap_or(defaults.ironman);
    let recommended = params.recommended.unwrap_or(defaults.recommended);
    let lamp_skills = match params.lamp_skills {
        Some(raw) => {
            parse_lamp_skills(&raw).map_err(|message| (StatusCode::BAD_REQUEST, message))?
        }
        None => defaults.lamp_skills,
    };

    info!(
        name = name.as_deref().unwrap_or("<anonymous>"),
        ironman, recommended, "planning quest path"
    );

    let player = state.players.load(name.as_deref(), &state.catalogue).await;

    let mut context = PlanContext::new(&state.catalogue);
    context.ironman = ironman;
    context.recommended = recommended;
    context.lamp_skills = lamp_skills;

    match PathFinder::new(&context).find(player) {
        Ok(path) => Ok(Json(PathDto::from_path(&path))),
        Err(e @ PathError::QuestNotFound { .. }) => Err((StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => {
            error!("planning failed: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, (StatusCode, String)> {
    Settings::load(&state.settings_path)
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Result<StatusCode, (StatusCode, String)> {
    settings
        .save(&state.settings_path)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

fn parse_lamp_skills(raw: &str) -> Result<BTreeSet<Skill>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            name.to_uppercase()
                .parse::<Skill>()
                .map_err(|_| format!("unknown skill: {name}"))
        })
        .collect()
}
