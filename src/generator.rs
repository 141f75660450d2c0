use crate::config::{COMPILE_COMMANDS_FILE, ProjectConfig, Profile};
use crate::error::CdbError;
use crate::flags::FlagSelector;
use crate::models::{CompileCommand, FlagSet, FlagsResponse, GenerateOutcome, SkipReason};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// 从 start_dir 开始逐级向上查找名为 filename 的文件
///
/// 到达根目录或空路径时停止（根目录本身不检查），找到则返回该文件的路径。
pub fn find_nearest_upward(start_dir: &Path, filename: &str) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        // 空路径和根目录都没有 parent
        let parent = dir.parent()?;
        let candidate = dir.join(filename);
        if candidate.exists() {
            debug!("Found {} at {}", filename, dir.display());
            return Some(candidate);
        }
        dir = parent;
    }
}

/// 目标文件名：把源文件扩展名替换为 .o
pub fn object_file_name(file: &Path) -> PathBuf {
    file.with_extension("o")
}

/// 为单个源文件构造一条编译命令
pub fn make_compile_command(directory: &Path, filename: &str, flag_set: &FlagSet) -> CompileCommand {
    let file = directory.join(filename);
    let file_str = file.to_string_lossy().into_owned();

    let mut arguments = Vec::with_capacity(flag_set.flags.len() + 5);
    arguments.push(flag_set.compiler.clone());
    arguments.extend(flag_set.flags.iter().cloned());
    arguments.push("-c".to_string());
    arguments.push("-o".to_string());
    arguments.push(object_file_name(&file).to_string_lossy().into_owned());
    arguments.push(file_str.clone());

    CompileCommand {
        directory: directory.to_string_lossy().into_owned(),
        file: file_str,
        arguments,
    }
}

/// 读取目标失败的符号链接（悬空或指向自身），返回链接本身的路径
fn broken_symlink(err: &walkdir::Error) -> Option<PathBuf> {
    let path = err.path()?;
    let meta = fs::symlink_metadata(path).ok()?;
    meta.file_type().is_symlink().then(|| path.to_path_buf())
}

/// 遍历 root（跟随符号链接），为每个可识别的源文件生成一条命令
///
/// 返回的布尔值表示是否因达到 max_files 而提前停止。
/// 无法解析的符号链接按普通文件处理，指回祖先目录的链接不再深入。
pub fn collect_compile_commands(
    root: &Path,
    selector: &FlagSelector,
    max_files: usize,
) -> Result<(Vec<CompileCommand>, bool), CdbError> {
    if max_files == 0 {
        return Err(CdbError::ZeroFileLimit);
    }
    let mut commands = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let path = match entry {
            Ok(entry) if entry.file_type().is_dir() => continue,
            Ok(entry) => entry.into_path(),
            Err(e) if e.loop_ancestor().is_some() => {
                debug!("Skipping symlink loop: {}", e);
                continue;
            }
            Err(e) => match broken_symlink(&e) {
                Some(path) => {
                    debug!("Treating unresolvable symlink as a file: {}", e);
                    path
                }
                None => return Err(e.into()),
            },
        };

        if !selector.is_source_file(&path) {
            continue;
        }

        let directory = path.parent().unwrap_or(root);
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        commands.push(make_compile_command(directory, &filename, selector.select(&path)));

        if commands.len() >= max_files {
            debug!("Reached the limit of {} source files", max_files);
            return Ok((commands, true));
        }
    }

    Ok((commands, false))
}

/// 以指定缩进写出 compile_commands.json
pub fn write_compile_commands(
    path: &Path,
    commands: &[CompileCommand],
    indent: &[u8],
) -> Result<(), CdbError> {
    let file = fs::File::create(path).map_err(|e| CdbError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut serializer = Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(indent));
    commands.serialize(&mut serializer)?;
    writer.flush().map_err(|e| CdbError::io(path, e))?;
    Ok(())
}

/// 若编辑中的文件所在项目还没有 compile_commands.json，则生成一个
pub fn create_compile_commands_if_none(
    current_file: &Path,
    selector: &FlagSelector,
    project: &ProjectConfig,
) -> Result<GenerateOutcome, CdbError> {
    if !selector.is_source_file(current_file) {
        debug!("Not a source file: {}", current_file.display());
        return Ok(GenerateOutcome::Skipped(SkipReason::UnsupportedExtension));
    }

    let this_dir = current_file.parent().unwrap_or(Path::new(""));
    let Some(marker) = find_nearest_upward(this_dir, &project.marker) else {
        debug!("No {} above {}", project.marker, this_dir.display());
        return Ok(GenerateOutcome::Skipped(SkipReason::NoMarker));
    };
    if let Some(existing) = find_nearest_upward(this_dir, COMPILE_COMMANDS_FILE) {
        debug!("Compilation database already exists: {}", existing.display());
        return Ok(GenerateOutcome::Skipped(SkipReason::AlreadyExists(existing)));
    }

    let json_dir = marker.parent().unwrap_or(Path::new(""));
    let json_file = json_dir.join(COMPILE_COMMANDS_FILE);
    debug!("Collecting source files under {}", json_dir.display());

    let (commands, truncated) = collect_compile_commands(json_dir, selector, project.max_files)?;
    write_compile_commands(&json_file, &commands, selector.profile().json_indent())?;

    let count = commands.len();
    debug!("Wrote {} records to {}", count, json_file.display());
    Ok(if truncated {
        GenerateOutcome::Truncated {
            path: json_file,
            count,
        }
    } else {
        GenerateOutcome::Created {
            path: json_file,
            count,
        }
    })
}

/// 旧的 libclang 工作模式：只返回标志，允许插件缓存
pub fn flags_for_file(current_file: &Path, selector: &FlagSelector) -> FlagsResponse {
    FlagsResponse {
        flags: selector.select(current_file).flags.clone(),
        do_cache: Some(true),
    }
}

/// clangd 工作模式：先按需生成编译数据库，再返回标志
pub fn settings_for_file(
    current_file: &Path,
    selector: &FlagSelector,
    project: &ProjectConfig,
) -> Result<(FlagsResponse, GenerateOutcome), CdbError> {
    let outcome = create_compile_commands_if_none(current_file, selector, project)?;
    // 内核模块配置沿用 libclang 模式的返回值，保留 do_cache
    let do_cache = (selector.profile() == Profile::Kernel).then_some(true);
    let response = FlagsResponse {
        flags: selector.select(current_file).flags.clone(),
        do_cache,
    };
    Ok((response, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlagKind;

    fn sample_set() -> FlagSet {
        FlagSet {
            kind: FlagKind::Application,
            compiler: "g++".to_string(),
            flags: vec!["-Wall".to_string()],
        }
    }

    #[test]
    fn test_object_file_name() {
        assert_eq!(object_file_name(Path::new("a/b.cpp")), PathBuf::from("a/b.o"));
        assert_eq!(object_file_name(Path::new("x.c++")), PathBuf::from("x.o"));
        assert_eq!(object_file_name(Path::new("m.C")), PathBuf::from("m.o"));
    }

    #[test]
    fn test_make_compile_command() {
        let cmd = make_compile_command(Path::new("/proj/src"), "main.cc", &sample_set());
        assert_eq!(cmd.directory, "/proj/src");
        assert_eq!(cmd.file, "/proj/src/main.cc");
        assert_eq!(
            cmd.arguments,
            vec!["g++", "-Wall", "-c", "-o", "/proj/src/main.o", "/proj/src/main.cc"]
        );
    }

    #[test]
    fn test_find_nearest_upward_stops_on_empty_and_root() {
        assert_eq!(find_nearest_upward(Path::new(""), "anything"), None);
        assert_eq!(find_nearest_upward(Path::new("/"), "anything"), None);
    }
}
