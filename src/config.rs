use crate::probe::{normalize_arch, probe_kernel_release, probe_machine};
use std::path::PathBuf;
use tracing::debug;

/// 标识项目根目录的标记文件
pub const DEFAULT_MARKER: &str = ".ycm_extra_conf.py";
/// 生成的编译数据库文件名
pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";
/// 单个编译数据库最多收录的源文件数
pub const MAX_SRC_FILES: usize = 50000;

pub const SOURCE_EXTENSIONS: &[&str] = &["c", "C", "cc", "cpp", "cxx", "c++"];
pub const KERNEL_SOURCE_EXTENSIONS: &[&str] = &["c"];

pub const DEFAULT_CC: &str = "gcc";
pub const DEFAULT_CXX: &str = "g++";

/// 标志集合的选择方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Profile {
    /// 所有文件都按用户态 C/C++ 处理
    #[default]
    Userspace,
    /// 所有文件都按内核模块处理，只识别 .c
    Kernel,
    /// 按文件名查驱动列表，命中的用内核标志，其余用用户态标志
    Mixed,
}

impl Profile {
    pub fn source_extensions(self) -> &'static [&'static str] {
        match self {
            Profile::Kernel => KERNEL_SOURCE_EXTENSIONS,
            Profile::Userspace | Profile::Mixed => SOURCE_EXTENSIONS,
        }
    }

    /// compile_commands.json 的缩进
    pub fn json_indent(self) -> &'static [u8] {
        match self {
            Profile::Kernel => b"  ",
            Profile::Userspace | Profile::Mixed => b"    ",
        }
    }
}

/// 工具链配置：编译器名称与内核构建目标，来自环境变量，缺省时探测系统
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub cc: String,
    pub cxx: String,
    kernel_root: Option<PathBuf>,
    arch: Option<String>,
}

impl ToolchainConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过查找函数构造，空值视为未设置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = ToolchainConfig {
            cc: get("CC").unwrap_or_else(|| DEFAULT_CC.to_string()),
            cxx: get("CXX").unwrap_or_else(|| DEFAULT_CXX.to_string()),
            kernel_root: get("KERNEL_ROOT").map(PathBuf::from),
            arch: get("ARCH"),
        };
        debug!(?config, "toolchain config resolved from environment");
        config
    }

    /// 内核源码（构建）目录，默认 /lib/modules/$(uname -r)/build
    pub fn kernel_root(&self) -> PathBuf {
        if let Some(root) = &self.kernel_root {
            return root.clone();
        }
        let release = probe_kernel_release().unwrap_or_default();
        let root = PathBuf::from("/lib/modules").join(release).join("build");
        debug!("Using default kernel root: {}", root.display());
        root
    }

    /// 目标架构，默认取 uname -m 并把 x86_64 之类归一为 x86
    pub fn arch(&self) -> String {
        if let Some(arch) = &self.arch {
            return arch.clone();
        }
        let arch = normalize_arch(&probe_machine().unwrap_or_default());
        debug!("Using default arch: {}", arch);
        arch
    }
}

/// 项目级配置
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub profile: Profile,
    pub marker: String,
    pub max_files: usize,
    /// 额外的宏定义，以 "-D", NAME 的形式追加
    pub defines: Vec<String>,
    pub include_dirs: Vec<String>,
    /// mixed 模式下按内核模块处理的源文件基名（不含扩展名）
    pub driver_basenames: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            profile: Profile::default(),
            marker: DEFAULT_MARKER.to_string(),
            max_files: MAX_SRC_FILES,
            defines: Vec::new(),
            include_dirs: Vec::new(),
            driver_basenames: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ToolchainConfig::from_lookup(|_| None);
        assert_eq!(config.cc, "gcc");
        assert_eq!(config.cxx, "g++");
    }

    #[test]
    fn test_env_overrides() {
        let config = ToolchainConfig::from_lookup(lookup_from(&[
            ("CC", "clang"),
            ("CXX", "clang++"),
            ("KERNEL_ROOT", "/opt/linux"),
            ("ARCH", "arm64"),
        ]));
        assert_eq!(config.cc, "clang");
        assert_eq!(config.cxx, "clang++");
        assert_eq!(config.kernel_root(), PathBuf::from("/opt/linux"));
        assert_eq!(config.arch(), "arm64");
    }

    #[test]
    fn test_empty_env_value_falls_back() {
        let config = ToolchainConfig::from_lookup(lookup_from(&[("CC", ""), ("CXX", "  ")]));
        assert_eq!(config.cc, "gcc");
        assert_eq!(config.cxx, "g++");
    }

    #[test]
    fn test_profile_extensions() {
        assert_eq!(Profile::Kernel.source_extensions(), &["c"]);
        assert!(Profile::Userspace.source_extensions().contains(&"c++"));
        assert!(Profile::Mixed.source_extensions().contains(&"C"));
    }
}
