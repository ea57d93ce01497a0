use anyhow::{Context, Result};
use engine::render::RenderOptions;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime settings, read from `EMOCUT_*` environment variables.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub bind: SocketAddr,
    pub output_dir: PathBuf,
    pub ffmpeg: String,
    pub ffprobe: String,
    pub log_level: String,
    pub render: RenderOptions,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 7777)),
            output_dir: PathBuf::from(".cache/output"),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            log_level: "info".to_string(),
            render: RenderOptions::default(),
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DaemonConfig::default();

        if let Some(bind) = lookup("EMOCUT_BIND") {
            config.bind = bind
                .parse()
                .with_context(|| format!("EMOCUT_BIND is not a socket address: {}", bind))?;
        }
        if let Some(dir) = lookup("EMOCUT_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(ffmpeg) = lookup("EMOCUT_FFMPEG") {
            config.ffmpeg = ffmpeg;
        }
        if let Some(ffprobe) = lookup("EMOCUT_FFPROBE") {
            config.ffprobe = ffprobe;
        }
        if let Some(level) = lookup("EMOCUT_LOG") {
            config.log_level = level;
        }
        if let Some(fps) = lookup("EMOCUT_FPS") {
            config.render.fps = fps
                .parse::<u32>()
                .ok()
                .filter(|fps| *fps > 0)
                .with_context(|| format!("EMOCUT_FPS must be a positive integer, got {}", fps))?;
        }
        if let Some(audio) = lookup("EMOCUT_AUDIO") {
            config.render.include_audio = match audio.as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => anyhow::bail!("EMOCUT_AUDIO must be true or false, got {}", other),
            };
        }

        Ok(config)
    }
}
