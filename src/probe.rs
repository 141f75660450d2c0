use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// 运行一个外部命令并返回其标准输出（去掉首尾空白），失败时返回 None
fn run_capture(program: &str, args: &[&str]) -> Option<String> {
    debug!("Running: {} {}", program, args.join(" "));
    match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => Some(String::from_utf8_lossy(&output.stdout).trim().to_string()),
        Err(e) => {
            warn!("Failed to run {}: {}", program, e);
            None
        }
    }
}

/// 从 cc1plus -v 的输出中提取系统头文件搜索目录
///
/// 只保留 /usr/ 下含 include 的行，跳过 "ignoring ..." 提示，去掉行首空格。
pub fn parse_include_search_dirs(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.starts_with("ignoring"))
        .filter(|line| {
            line.find("/usr/")
                .is_some_and(|pos| line[pos..].contains("include"))
        })
        .map(|line| line.trim_start_matches(' ').to_string())
        .filter(|dir| !dir.is_empty())
        .collect()
}

/// 询问 C++ 编译器前端的默认头文件搜索目录
pub fn probe_system_include_dirs(cxx: &str) -> Vec<String> {
    let cc1plus = match run_capture(cxx, &["--print-prog-name=cc1plus"]) {
        Some(p) if !p.is_empty() => p,
        _ => {
            warn!("Could not locate cc1plus through {}, no system include dirs", cxx);
            return Vec::new();
        }
    };

    // 搜索目录打印在 stderr 上
    let output = match Command::new(&cc1plus)
        .arg("-v")
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run {}: {}", cc1plus, e);
            return Vec::new();
        }
    };
    let mut text = String::from_utf8_lossy(&output.stderr).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stdout));

    let dirs = parse_include_search_dirs(&text);
    debug!("System include dirs: {:?}", dirs);
    dirs
}

/// uname -r
pub fn probe_kernel_release() -> Option<String> {
    run_capture("uname", &["-r"]).filter(|s| !s.is_empty())
}

/// uname -m
pub fn probe_machine() -> Option<String> {
    run_capture("uname", &["-m"]).filter(|s| !s.is_empty())
}

/// 把 x86_64、x86-32 这类机器名归一为内核源码树里的 x86
pub fn normalize_arch(machine: &str) -> String {
    ["x86_64", "x86-64", "x86_32", "x86-32"]
        .iter()
        .fold(machine.to_string(), |acc, pat| acc.replace(pat, "x86"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_arch() {
        assert_eq!(normalize_arch("x86_64"), "x86");
        assert_eq!(normalize_arch("x86-32"), "x86");
        assert_eq!(normalize_arch("aarch64"), "aarch64");
        assert_eq!(normalize_arch("riscv64"), "riscv64");
        assert_eq!(normalize_arch(""), "");
    }
}
