use crate::config::{DEFAULT_MARKER, MAX_SRC_FILES, ProjectConfig, Profile};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ycm2clangd - 为 YouCompleteMe / clangd 提供编译标志并生成 compile_commands.json
#[derive(Parser, Debug)]
#[command(name = "ycm2clangd")]
#[command(version)]
#[command(about = "Compiler flags and compile_commands.json for YouCompleteMe / clangd")]
#[command(after_help = "\
ENVIRONMENT:
    CC            C compiler used for kernel-module records (default: gcc)
    CXX           C++ compiler used for application records (default: g++)
    KERNEL_ROOT   Kernel build tree (default: /lib/modules/$(uname -r)/build)
    ARCH          Kernel architecture (default: uname -m, x86_64 -> x86)

EXAMPLES:
    ycm2clangd flags src/main.cpp
    ycm2clangd settings src/main.cpp -D TEST
    ycm2clangd --profile mixed --driver klogging settings drivers/klogging.c")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub project: ProjectArgs,

    /// 输出调试日志
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the flags for a file (libclang mode, cacheable)
    Flags {
        /// File being edited
        file: PathBuf,
    },
    /// Create compile_commands.json if absent, then print the flags (clangd mode)
    Settings {
        /// File being edited
        file: PathBuf,
    },
    /// Only create compile_commands.json if absent
    Generate {
        /// File being edited
        file: PathBuf,
    },
}

impl Command {
    pub fn file(&self) -> &PathBuf {
        match self {
            Command::Flags { file } | Command::Settings { file } | Command::Generate { file } => file,
        }
    }
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Which flag set(s) to use
    #[arg(long, value_enum, default_value_t = Profile::Userspace, global = true)]
    pub profile: Profile,

    /// Marker file identifying the project root
    #[arg(long, default_value = DEFAULT_MARKER, global = true)]
    pub marker: String,

    /// Maximum number of source files recorded in the database
    #[arg(long, default_value_t = MAX_SRC_FILES, value_parser = parse_max_files, global = true)]
    pub max_files: usize,

    /// Extra macro definition (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME", global = true)]
    pub defines: Vec<String>,

    /// Extra include directory (repeatable)
    #[arg(short = 'I', long = "include-dir", value_name = "DIR", global = true)]
    pub include_dirs: Vec<String>,

    /// Source basename (without extension) compiled as a kernel module in mixed profile
    #[arg(long = "driver", value_name = "BASENAME", global = true)]
    pub driver_basenames: Vec<String>,
}

fn parse_max_files(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl From<ProjectArgs> for ProjectConfig {
    fn from(args: ProjectArgs) -> Self {
        ProjectConfig {
            profile: args.profile,
            marker: args.marker,
            max_files: args.max_files,
            defines: args.defines,
            include_dirs: args.include_dirs,
            driver_basenames: args.driver_basenames,
        }
    }
}

/// 解析命令行参数
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_with_options() {
        let args = CliArgs::try_parse_from([
            "ycm2clangd",
            "--profile",
            "mixed",
            "settings",
            "src/klogging.c",
            "-D",
            "TEST",
            "--driver",
            "klogging",
            "--max-files",
            "10",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::Settings { .. }));
        assert_eq!(args.command.file(), &PathBuf::from("src/klogging.c"));

        let config = ProjectConfig::from(args.project);
        assert_eq!(config.profile, Profile::Mixed);
        assert_eq!(config.defines, vec!["TEST"]);
        assert_eq!(config.driver_basenames, vec!["klogging"]);
        assert_eq!(config.max_files, 10);
        assert_eq!(config.marker, DEFAULT_MARKER);
    }

    #[test]
    fn test_zero_max_files_rejected() {
        let result = CliArgs::try_parse_from(["ycm2clangd", "generate", "a.c", "--max-files", "0"]);
        assert!(result.is_err());
    }
}
