pub mod ffmpeg;

pub use ffmpeg::FFmpegWrapper;
