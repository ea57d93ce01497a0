use anyhow::{Context, Result};
use engine::render::RenderCommand;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
struct ProbeOutput {
    format: Option<FormatInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

/// Wraps the ffprobe/ffmpeg binaries named in the daemon config.
#[derive(Debug, Clone)]
pub struct FFmpegWrapper {
    ffmpeg: String,
    ffprobe: String,
}

impl FFmpegWrapper {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        FFmpegWrapper {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Container duration in seconds.
    pub async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(media_path)
            .output()
            .await
            .context("Failed to execute ffprobe. Make sure FFmpeg is installed.")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffprobe failed on {}: {}", media_path.display(), stderr.trim());
        }

        let duration = parse_probe_duration(&output.stdout)?;
        debug!("Probed {} at {:.3}s", media_path.display(), duration);
        Ok(duration)
    }

    pub async fn render(&self, command: &RenderCommand) -> Result<()> {
        if let Some(parent) = command.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        info!("Rendering {}", command.output_path.display());
        let output = Command::new(&self.ffmpeg)
            .args(&command.ffmpeg_args)
            .output()
            .await
            .context("Failed to execute ffmpeg. Make sure FFmpeg is installed.")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg failed: {}", stderr.trim());
        }

        Ok(())
    }
}

fn parse_probe_duration(stdout: &[u8]) -> Result<f64> {
    let probe_output: ProbeOutput =
        serde_json::from_slice(stdout).context("Failed to parse ffprobe JSON output")?;

    probe_output
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .context("ffprobe reported no usable duration")
}
