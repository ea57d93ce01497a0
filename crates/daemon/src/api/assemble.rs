use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use engine::merger::RandomTieResolver;
use engine::render::generate_render_command;
use engine::{assemble, validate_source_count, Assembly, AssemblyRequest, EmotionLabel, SourceId, SourceTimeline};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ApiError;
use crate::config::DaemonConfig;
use crate::media::FFmpegWrapper;

#[derive(Deserialize)]
pub struct SourceInput {
    path: String,
    /// Probed with ffprobe when absent.
    #[serde(default)]
    duration_seconds: Option<f64>,
    /// Frame timestamps from extraction, index-aligned with `labels`.
    timestamps: Vec<f64>,
    labels: Vec<String>,
}

#[derive(Deserialize)]
pub struct AssembleRequest {
    emotion: String,
    sources: Vec<SourceInput>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    output_path: Option<String>,
}

#[derive(Serialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    assembly: Assembly,
    ffmpeg_args: Vec<String>,
}

#[derive(Serialize)]
pub struct RenderResponse {
    output_path: String,
    #[serde(flatten)]
    assembly: Assembly,
}

pub fn router(config: Arc<DaemonConfig>) -> Router {
    Router::new()
        .route("/emotions", get(list_emotions))
        .route("/assemble/plan", post(plan))
        .route("/assemble/render", post(render))
        .with_state(config)
}

async fn list_emotions() -> Json<Vec<EmotionLabel>> {
    Json(EmotionLabel::ALL.to_vec())
}

/// Validates the payload in the order the caller should hear about problems:
/// label first, then source count, then each source's streams.
async fn build_request(
    config: &DaemonConfig,
    req: &AssembleRequest,
) -> Result<AssemblyRequest, ApiError> {
    let emotion: EmotionLabel = req.emotion.parse()?;
    validate_source_count(req.sources.len())?;

    let ffmpeg = FFmpegWrapper::new(&config.ffmpeg, &config.ffprobe);
    let mut sources = Vec::with_capacity(req.sources.len());
    for (idx, input) in req.sources.iter().enumerate() {
        let duration = match input.duration_seconds {
            Some(duration) => duration,
            None => ffmpeg
                .probe_duration(Path::new(&input.path))
                .await
                .map_err(ApiError::Media)?,
        };
        let labels = input
            .labels
            .iter()
            .map(|label| label.parse::<EmotionLabel>())
            .collect::<Result<Vec<_>, _>>()?;

        sources.push(SourceTimeline::from_streams(
            SourceId(idx),
            &input.path,
            duration,
            &input.timestamps,
            &labels,
        )?);
    }

    Ok(AssemblyRequest { emotion, sources })
}

fn run_assembly(request: &AssemblyRequest, seed: Option<u64>) -> Result<Assembly, ApiError> {
    let mut resolver = match seed {
        Some(seed) => RandomTieResolver::seeded(seed),
        None => RandomTieResolver::from_entropy(),
    };
    Ok(assemble(request, &mut resolver)?)
}

/// Resolves the render target inside `config.output_dir`. Caller-supplied
/// paths must be relative and may not climb out with `..`.
fn output_path(config: &DaemonConfig, req: &AssembleRequest) -> Result<PathBuf, ApiError> {
    let Some(requested) = &req.output_path else {
        return Ok(config
            .output_dir
            .join(format!("merged_{}.mp4", Uuid::new_v4())));
    };

    let relative = Path::new(requested);
    let confined = relative.components().next().is_some()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !confined {
        return Err(ApiError::InvalidOutputPath(requested.clone()));
    }
    Ok(config.output_dir.join(relative))
}

async fn plan(
    State(config): State<Arc<DaemonConfig>>,
    Json(req): Json<AssembleRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let target = output_path(&config, &req)?;
    let request = build_request(&config, &req).await?;
    let assembly = run_assembly(&request, req.seed)?;
    let command = generate_render_command(&assembly.plan, target, &config.render);

    Ok(Json(PlanResponse {
        assembly,
        ffmpeg_args: command.ffmpeg_args,
    }))
}

async fn render(
    State(config): State<Arc<DaemonConfig>>,
    Json(req): Json<AssembleRequest>,
) -> Result<Json<RenderResponse>, ApiError> {
    let target = output_path(&config, &req)?;
    let request = build_request(&config, &req).await?;
    let assembly = run_assembly(&request, req.seed)?;
    let command = generate_render_command(&assembly.plan, target, &config.render);

    FFmpegWrapper::new(&config.ffmpeg, &config.ffprobe)
        .render(&command)
        .await
        .map_err(ApiError::Media)?;
    info!(
        "Wrote {} ({} segments, {})",
        command.output_path.display(),
        assembly.plan.len(),
        assembly.emotion
    );

    Ok(Json(RenderResponse {
        output_path: command.output_path.to_string_lossy().to_string(),
        assembly,
    }))
}
