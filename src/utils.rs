use std::path::{Component, Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// 初始化日志，输出到 stderr（stdout 留给返回给插件的 JSON）
///
/// 开启调试模式时默认级别为 debug，否则遵循 RUST_LOG，缺省为 warn。
pub fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = if debug {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    // 重复初始化（例如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 逻辑上计算绝对路径（不访问文件系统，不解析符号链接）
pub fn compute_absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    // 逻辑消除 ".." 和 "."
    let mut clean_path = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                clean_path.pop();
            }
            Component::CurDir => {}
            other => clean_path.push(other.as_os_str()),
        }
    }

    if clean_path.as_os_str().is_empty() {
        Ok(PathBuf::from("."))
    } else {
        Ok(clean_path)
    }
}

/// 扩展名是否在列表中（区分大小写，.C 与 .c 不同）
pub fn has_source_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext))
}

/// 去掉目录和扩展名后的文件名
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_absolute_path() {
        let p = Path::new("test/../src/main.rs");
        let abs = compute_absolute_path(p).unwrap();
        assert!(abs.is_absolute());
        // 验证逻辑消除是否生效 (字符串中不应包含 ..)
        let s = abs.to_string_lossy();
        assert!(!s.contains(".."));
        assert!(s.ends_with("src/main.rs"));
    }

    #[test]
    fn test_compute_absolute_path_keeps_absolute() {
        let abs = compute_absolute_path(Path::new("/a/./b/../c.cpp")).unwrap();
        assert_eq!(abs, PathBuf::from("/a/c.cpp"));
    }

    #[test]
    fn test_has_source_extension_is_case_sensitive() {
        assert!(has_source_extension(Path::new("a.C"), &["C"]));
        assert!(!has_source_extension(Path::new("a.C"), &["c"]));
        assert!(has_source_extension(Path::new("dir/a.c++"), &["cpp", "c++"]));
        assert!(!has_source_extension(Path::new("Makefile"), &["c"]));
        assert!(!has_source_extension(Path::new("a.h"), &["c"]));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/src/klogging.c")), "klogging");
        assert_eq!(base_name(Path::new("main.cpp")), "main");
    }
}
