// scenescribe-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Scenescribe: video-to-scene-document pipeline",
    long_about = "Turns long-form video into time-bounded contextual scene documents \
                  via the scenescribe-core library."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Processes video files into contextual scene documents
    Process(ProcessArgs),
    /// Probes a video file and prints its stream metadata
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Input file or directory containing .mp4 files
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Directory where per-video work directories and scene documents are written
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Optional: Directory for log files (defaults to OUTPUT_DIR/logs)
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    // --- Collaborator Endpoints ---
    /// Transcription service endpoint URL
    #[arg(long, value_name = "URL", env = "SCENESCRIBE_TRANSCRIBE_URL")]
    pub transcribe_url: String,

    /// Frame-embedding service endpoint URL
    #[arg(long, value_name = "URL", env = "SCENESCRIBE_EMBED_URL")]
    pub embed_url: String,

    /// Scene-description (vision-language) service endpoint URL
    #[arg(long, value_name = "URL", env = "SCENESCRIBE_DESCRIBE_URL")]
    pub describe_url: String,

    /// Optional: bearer token sent with every collaborator request
    #[arg(long, value_name = "KEY", env = "SCENESCRIBE_API_KEY")]
    pub api_key: Option<String>,

    /// Per-call timeout for collaborator requests, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub call_timeout: Option<u64>,

    /// Cap on simultaneous outstanding collaborator calls per video
    #[arg(long, value_name = "COUNT")]
    pub concurrency: Option<usize>,

    // --- Segmentation Overrides ---
    /// Interval between sampled frames, in milliseconds
    #[arg(long, value_name = "MS")]
    pub frame_interval: Option<u64>,

    /// Cosine-distance threshold for shot boundaries
    #[arg(long, value_name = "DIST")]
    pub shot_threshold: Option<f32>,

    /// Cosine-distance threshold for scene boundaries
    #[arg(long, value_name = "DIST")]
    pub scene_threshold: Option<f32>,

    /// Inter-turn silence gap that starts a new chapter, in milliseconds
    #[arg(long, value_name = "MS")]
    pub pause_threshold: Option<u64>,

    /// Do not start a new chapter on speaker changes
    #[arg(long, default_value_t = false)]
    pub no_speaker_breaks: bool,

    /// Upper bound on representative frames sent per scene
    #[arg(long, value_name = "COUNT")]
    pub max_frames: Option<usize>,

    // --- Notifications ---
    /// Optional: ntfy.sh topic URL for the run-completion notification
    /// (e.g., https://ntfy.sh/your_topic)
    #[arg(long, value_name = "TOPIC_URL", env = "SCENESCRIBE_NTFY_TOPIC")]
    pub ntfy: Option<String>,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Video file to probe
    #[arg(required = true, value_name = "INPUT_FILE")]
    pub input_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_process_basic_args() {
        let cli = Cli::parse_from([
            "scenescribe",
            "process",
            "--input",
            "videos",
            "--output",
            "out",
            "--transcribe-url",
            "http://localhost:9000/transcribe",
            "--embed-url",
            "http://localhost:9001/embed",
            "--describe-url",
            "http://localhost:9002/describe",
        ]);

        match cli.command {
            Commands::Process(args) => {
                assert_eq!(args.input_path, PathBuf::from("videos"));
                assert_eq!(args.output_dir, PathBuf::from("out"));
                assert_eq!(args.transcribe_url, "http://localhost:9000/transcribe");
                assert!(args.api_key.is_none());
                assert!(args.ntfy.is_none());
                assert!(!args.no_speaker_breaks);
                assert!(args.shot_threshold.is_none());
            }
            Commands::Info(_) => panic!("expected process command"),
        }
    }

    #[test]
    fn parse_process_with_overrides() {
        let cli = Cli::parse_from([
            "scenescribe",
            "process",
            "-i",
            "clip.mp4",
            "-o",
            "out",
            "--transcribe-url",
            "http://t",
            "--embed-url",
            "http://e",
            "--describe-url",
            "http://d",
            "--shot-threshold",
            "0.6",
            "--pause-threshold",
            "1500",
            "--no-speaker-breaks",
            "--concurrency",
            "8",
            "--ntfy",
            "https://ntfy.sh/scenescribe_runs",
        ]);

        match cli.command {
            Commands::Process(args) => {
                assert_eq!(args.shot_threshold, Some(0.6));
                assert_eq!(args.pause_threshold, Some(1_500));
                assert!(args.no_speaker_breaks);
                assert_eq!(args.concurrency, Some(8));
                assert_eq!(
                    args.ntfy.as_deref(),
                    Some("https://ntfy.sh/scenescribe_runs")
                );
            }
            Commands::Info(_) => panic!("expected process command"),
        }
    }

    #[test]
    fn parse_info_args() {
        let cli = Cli::parse_from(["scenescribe", "info", "clip.mp4"]);
        match cli.command {
            Commands::Info(args) => assert_eq!(args.input_path, PathBuf::from("clip.mp4")),
            Commands::Process(_) => panic!("expected info command"),
        }
    }
}
