//! Implementation of the 'info' subcommand: probes one video file and prints
//! its stream metadata plus the frame-sampling plan at current defaults.

use crate::cli::InfoArgs;
use crate::error::CliResult;
use crate::terminal;

use scenescribe_core::config::DEFAULT_FRAME_INTERVAL_MS;
use scenescribe_core::external::{CrateFfprobeExecutor, StreamProber};
use scenescribe_core::format_timestamp_ms;

pub fn run_info(args: InfoArgs) -> CliResult<()> {
    let prober = CrateFfprobeExecutor::new();
    let info = prober.probe(&args.input_path)?;

    terminal::print_section("STREAM INFO");
    terminal::print_status("File", &args.input_path.display().to_string(), false);
    terminal::print_status("Duration", &format_timestamp_ms(info.duration_ms), true);
    terminal::print_status("Frame rate", &format!("{:.3} fps", info.frame_rate), false);
    terminal::print_status(
        "Resolution",
        &format!("{}x{}", info.width, info.height),
        false,
    );

    let sampled = info.duration_ms.div_ceil(DEFAULT_FRAME_INTERVAL_MS);
    terminal::print_status(
        "Sampling",
        &format!("{sampled} frames at {DEFAULT_FRAME_INTERVAL_MS} ms intervals"),
        false,
    );

    Ok(())
}
