// 公共API暴露
mod cli;
mod config;
mod error;
mod flags;
mod generator;
mod models;
mod probe;
mod utils;

pub use cli::{CliArgs, Command, ProjectArgs, parse_args};
pub use config::{
    COMPILE_COMMANDS_FILE, DEFAULT_MARKER, KERNEL_SOURCE_EXTENSIONS, MAX_SRC_FILES, Profile,
    ProjectConfig, SOURCE_EXTENSIONS, ToolchainConfig,
};
pub use error::CdbError;
pub use flags::{
    APPLICATION_BASE_FLAGS, ExtraFlags, FlagSelector, KERNEL_BASE_FLAGS, KERNEL_MACROS,
    application_flags, kernel_flags, project_include_dirs,
};
pub use generator::{
    collect_compile_commands, create_compile_commands_if_none, find_nearest_upward,
    flags_for_file, make_compile_command, object_file_name, settings_for_file,
    write_compile_commands,
};
pub use models::{CompileCommand, FlagKind, FlagSet, FlagsResponse, GenerateOutcome, SkipReason};
pub use probe::{normalize_arch, parse_include_search_dirs, probe_system_include_dirs};
pub use utils::{base_name, compute_absolute_path, has_source_extension, init_logging};
