use crate::plan::{ClipPlan, Segment};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    pub fps: u32,
    pub include_audio: bool,
    pub preset: String,
    pub crf: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            fps: 24,
            include_audio: true,
            preset: "medium".to_string(),
            crf: 23,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderCommand {
    pub ffmpeg_args: Vec<String>,
    pub output_path: PathBuf,
}

/// Distinct source paths in first-use order; segment `i` reads input
/// `input_index[i]`.
fn collect_inputs(segments: &[Segment]) -> (Vec<&Path>, Vec<usize>) {
    let mut inputs: Vec<&Path> = Vec::new();
    let mut input_index = Vec::with_capacity(segments.len());
    for segment in segments {
        let idx = match inputs.iter().position(|p| *p == segment.path.as_path()) {
            Some(idx) => idx,
            None => {
                inputs.push(segment.path.as_path());
                inputs.len() - 1
            }
        };
        input_index.push(idx);
    }
    (inputs, input_index)
}

/// Generate the FFmpeg command that cuts every planned segment out of its
/// source and concatenates them in order. Hard cuts only.
pub fn generate_render_command(
    plan: &ClipPlan,
    output_path: PathBuf,
    options: &RenderOptions,
) -> RenderCommand {
    let segments = plan.segments();
    let (inputs, input_index) = collect_inputs(segments);

    let mut args = vec!["-hide_banner".to_string(), "-loglevel".to_string(), "error".to_string()];
    for path in &inputs {
        args.push("-i".to_string());
        args.push(path.to_string_lossy().to_string());
    }

    // [0:v]trim=start=0:end=5,setpts=PTS-STARTPTS[v0]
    let mut filter_parts = Vec::new();
    for (idx, segment) in segments.iter().enumerate() {
        let input = input_index[idx];
        filter_parts.push(format!(
            "[{}:v]trim=start={}:end={},setpts=PTS-STARTPTS,fps={}[v{}]",
            input, segment.start, segment.end, options.fps, idx
        ));
        if options.include_audio {
            filter_parts.push(format!(
                "[{}:a]atrim=start={}:end={},asetpts=PTS-STARTPTS[a{}]",
                input, segment.start, segment.end, idx
            ));
        }
    }

    let mut concat_inputs = String::new();
    for idx in 0..segments.len() {
        concat_inputs.push_str(&format!("[v{}]", idx));
        if options.include_audio {
            concat_inputs.push_str(&format!("[a{}]", idx));
        }
    }
    if options.include_audio {
        filter_parts.push(format!("{}concat=n={}:v=1:a=1[outv][outa]", concat_inputs, segments.len()));
    } else {
        filter_parts.push(format!("{}concat=n={}:v=1:a=0[outv]", concat_inputs, segments.len()));
    }

    args.push("-filter_complex".to_string());
    args.push(filter_parts.join(";"));
    args.push("-map".to_string());
    args.push("[outv]".to_string());
    if options.include_audio {
        args.push("-map".to_string());
        args.push("[outa]".to_string());
    }
    args.extend([
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        options.preset.clone(),
        "-crf".to_string(),
        options.crf.to_string(),
        "-r".to_string(),
        options.fps.to_string(),
    ]);
    if options.include_audio {
        args.extend([
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            "128k".to_string(),
        ]);
    }
    args.push("-y".to_string());
    args.push(output_path.to_string_lossy().to_string());

    RenderCommand {
        ffmpeg_args: args,
        output_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilteredStamps;
    use crate::merger::{merge_cut_points, LowestSourceId};
    use crate::plan::build_clip_plan;
    use crate::timeline::{SourceId, SourceTimeline};

    fn two_source_plan() -> ClipPlan {
        let sources = vec![
            SourceTimeline::new(SourceId(0), "/media/a.mp4", 10.0, Vec::new()).unwrap(),
            SourceTimeline::new(SourceId(1), "/media/b.mp4", 8.0, Vec::new()).unwrap(),
        ];
        let filtered = vec![
            FilteredStamps { source: SourceId(0), stamps: vec![3.0] },
            FilteredStamps { source: SourceId(1), stamps: vec![1.5, 6.0] },
        ];
        let cuts = merge_cut_points(&filtered, &mut LowestSourceId).unwrap();
        build_clip_plan(&cuts, &sources).unwrap()
    }

    #[test]
    fn each_source_is_opened_once() {
        let cmd = generate_render_command(
            &two_source_plan(),
            PathBuf::from("/tmp/out.mp4"),
            &RenderOptions::default(),
        );
        let inputs: Vec<&String> = cmd
            .ffmpeg_args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| &w[1])
            .collect();
        assert_eq!(inputs, vec!["/media/b.mp4", "/media/a.mp4"]);
        assert_eq!(cmd.ffmpeg_args.last().unwrap(), "/tmp/out.mp4");
    }

    #[test]
    fn filter_graph_trims_and_concats_in_plan_order() {
        let cmd = generate_render_command(
            &two_source_plan(),
            PathBuf::from("/tmp/out.mp4"),
            &RenderOptions::default(),
        );
        let pos = cmd
            .ffmpeg_args
            .iter()
            .position(|a| a == "-filter_complex")
            .unwrap();
        let graph = &cmd.ffmpeg_args[pos + 1];

        // Plan: b 0..1.5, b 1.5..3, a 3..6, b 6..8
        assert!(graph.contains("[0:v]trim=start=0:end=1.5,setpts=PTS-STARTPTS,fps=24[v0]"));
        assert!(graph.contains("[1:v]trim=start=3:end=6,setpts=PTS-STARTPTS,fps=24[v2]"));
        assert!(graph.contains("[0:a]atrim=start=6:end=8,asetpts=PTS-STARTPTS[a3]"));
        assert!(graph.ends_with("[v0][a0][v1][a1][v2][a2][v3][a3]concat=n=4:v=1:a=1[outv][outa]"));
    }

    #[test]
    fn video_only_render_skips_audio_streams() {
        let options = RenderOptions {
            include_audio: false,
            ..RenderOptions::default()
        };
        let cmd = generate_render_command(&two_source_plan(), PathBuf::from("out.mp4"), &options);
        assert!(!cmd.ffmpeg_args.iter().any(|a| a == "[outa]" || a == "aac"));
        assert!(cmd.ffmpeg_args.iter().any(|a| a.ends_with("concat=n=4:v=1:a=0[outv]")));
    }
}
