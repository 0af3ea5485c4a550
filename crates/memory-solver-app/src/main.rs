//! Command-line shell: scans an image-sequence upload and prints the board.

use std::path::PathBuf;
use std::process::ExitCode;

use memory_solver_app::{
    AppError, Scanner, app_version, controller_config_from_env, describe_config, init_logging,
    load_frame_sequence, project_status, render_revealed_map, scan_config_from_env,
};
use memory_solver_capture::{
    CapturePlatform, ScreenCapturePlatform, UnavailablePlatform, UploadHandle,
};

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("memory-solver: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let scan_config = scan_config_from_env();
    let controller_config = controller_config_from_env();

    let Some(dir) = std::env::args_os().nth(1).map(PathBuf::from) else {
        println!("memory-solver v{}", app_version());
        println!("{}", describe_config(&scan_config, &controller_config)?);
        println!("usage: memory-solver <frame-directory>");
        return Ok(());
    };

    let frames = load_frame_sequence(&dir)?;
    let upload = UploadHandle::from_frames(
        dir.display().to_string(),
        frames,
        controller_config.replay_fps,
    )?;
    let limit_ms = upload.duration_ms().saturating_mul(2).saturating_add(1_000);

    let mut scanner = Scanner::new(scan_config, controller_config, display_platform());
    scanner.attach_upload(upload);
    scanner.toggle_scan();

    let step_ms = controller_config.refresh.interval_ms();
    let mut now_ms = 0;
    while !scanner.source_ended() && now_ms <= limit_ms {
        scanner.on_refresh(now_ms);
        now_ms += step_ms;
    }

    let status = project_status(scanner.view());
    println!("{}", status.status);
    print!("{}", render_revealed_map(scanner.evidence()));
    for group in scanner.evidence().matched_groups() {
        let cells = group
            .iter()
            .map(|cell| cell.index().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("match: {cells}");
    }
    Ok(())
}

fn display_platform() -> Box<dyn CapturePlatform> {
    match ScreenCapturePlatform::discover() {
        Ok(platform) => Box::new(platform),
        Err(error) => {
            tracing::info!(%error, "screen capture unavailable");
            Box::new(UnavailablePlatform::new(error.to_string()))
        }
    }
}
