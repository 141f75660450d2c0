use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use ycm2clangd::{
    Command, FlagSelector, FlagsResponse, GenerateOutcome, ProjectConfig, ToolchainConfig,
    compute_absolute_path, create_compile_commands_if_none, find_nearest_upward, flags_for_file,
    init_logging, parse_args, settings_for_file,
};

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(args.debug);

    let file = compute_absolute_path(args.command.file())
        .with_context(|| format!("Cannot resolve {}", args.command.file().display()))?;
    debug!("Edited file: {}", file.display());

    let project = ProjectConfig::from(args.project);
    let toolchain = ToolchainConfig::from_env();

    // 项目根目录：最近的标记文件所在目录，找不到时退回文件所在目录
    let file_dir = file.parent().unwrap_or(Path::new("/"));
    let project_dir = find_nearest_upward(file_dir, &project.marker)
        .and_then(|marker| marker.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| file_dir.to_path_buf());
    debug!("Project dir: {}", project_dir.display());

    let selector = FlagSelector::from_config(&project, &toolchain, &project_dir)
        .context("Failed to build compiler flags")?;

    match &args.command {
        Command::Flags { .. } => {
            print_response(&flags_for_file(&file, &selector))?;
        }
        Command::Settings { .. } => {
            let (response, outcome) = settings_for_file(&file, &selector, &project)
                .context("Failed to create compilation database")?;
            report(&outcome);
            print_response(&response)?;
        }
        Command::Generate { .. } => {
            let outcome = create_compile_commands_if_none(&file, &selector, &project)
                .context("Failed to create compilation database")?;
            report(&outcome);
        }
    }

    Ok(())
}

fn print_response(response: &FlagsResponse) -> Result<()> {
    println!("{}", serde_json::to_string(response)?);
    Ok(())
}

/// 状态信息写到 stderr，stdout 只留给标志 JSON
fn report(outcome: &GenerateOutcome) {
    match outcome {
        GenerateOutcome::Skipped(reason) => {
            debug!("Generation skipped: {:?}", reason);
        }
        GenerateOutcome::Created { path, .. } => {
            eprintln!("Created: {}", path.display());
        }
        GenerateOutcome::Truncated { path, count } => {
            eprintln!("Created: {}", path.display());
            eprintln!(
                "*** {}: Too many source files, only the first {} were chosen!!!",
                path.display(),
                count
            );
        }
    }
}
