use serde::Serialize;
use std::path::PathBuf;

/// 编译命令结构，用于生成compile_commands.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileCommand {
    pub directory: String,
    pub file: String,
    pub arguments: Vec<String>,
}

/// 标志集合的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// 用户态 C/C++ 程序
    Application,
    /// Linux 内核模块（驱动）
    KernelModule,
}

/// 一组编译标志，以及配套的编译器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSet {
    pub kind: FlagKind,
    pub compiler: String,
    pub flags: Vec<String>,
}

/// 返回给编辑器插件的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagsResponse {
    pub flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_cache: Option<bool>,
}

/// 跳过生成的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedExtension,
    NoMarker,
    AlreadyExists(PathBuf),
}

/// 一次生成的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Skipped(SkipReason),
    Created { path: PathBuf, count: usize },
    /// 达到文件数上限，只写入了前 count 个
    Truncated { path: PathBuf, count: usize },
}
