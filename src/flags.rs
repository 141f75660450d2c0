use crate::config::{ProjectConfig, Profile, ToolchainConfig};
use crate::error::CdbError;
use crate::models::{FlagKind, FlagSet};
use crate::probe::probe_system_include_dirs;
use crate::utils::{base_name, has_source_extension};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const APPLICATION_BASE_FLAGS: &[&str] = &["-Wall", "-std=c++11", "-x", "c++"];
pub const KERNEL_BASE_FLAGS: &[&str] = &["-Wall", "-std=gnu11", "-x", "c", "-nostdinc"];
pub const KERNEL_MACROS: &[&str] = &[
    "-D__KERNEL__",
    "-DCC_USING_FENTRY",
    "-DMODULE",
    "-DKBUILD_MODNAME=\"<auto_generated_during_compilation>\"",
];

/// 追加到两套标志末尾的项目专属宏和头文件目录
#[derive(Debug, Clone, Default)]
pub struct ExtraFlags {
    pub defines: Vec<String>,
    pub include_dirs: Vec<String>,
}

impl ExtraFlags {
    fn append_to(&self, flags: &mut Vec<String>) {
        for define in &self.defines {
            flags.push("-D".to_string());
            flags.push(define.clone());
        }
        for dir in &self.include_dirs {
            flags.push(format!("-I{}", dir));
        }
    }
}

/// 项目根目录下约定的头文件目录：
/// c_and_cpp/native，以及 .paths/ 下每个条目的 c_and_cpp/native
pub fn project_include_dirs(project_dir: &Path) -> Result<Vec<String>, CdbError> {
    let mut dirs = Vec::new();

    if project_dir.join("c_and_cpp").exists() {
        dirs.push(
            project_dir
                .join("c_and_cpp")
                .join("native")
                .to_string_lossy()
                .into_owned(),
        );
    }

    let paths_dir = project_dir.join(".paths");
    if paths_dir.exists() {
        let mut names = Vec::new();
        for entry in fs::read_dir(&paths_dir).map_err(|e| CdbError::io(&paths_dir, e))? {
            let entry = entry.map_err(|e| CdbError::io(&paths_dir, e))?;
            names.push(entry.file_name());
        }
        names.sort();
        for name in names {
            dirs.push(
                paths_dir
                    .join(name)
                    .join("c_and_cpp")
                    .join("native")
                    .to_string_lossy()
                    .into_owned(),
            );
        }
    }

    debug!("Project include dirs under {}: {:?}", project_dir.display(), dirs);
    Ok(dirs)
}

/// 用户态 C/C++ 的标志：基础选项 + 系统头文件目录 + 项目附加项
pub fn application_flags(compiler: &str, system_include_dirs: &[String], extra: &ExtraFlags) -> FlagSet {
    let mut flags: Vec<String> = APPLICATION_BASE_FLAGS.iter().map(|s| s.to_string()).collect();
    for dir in system_include_dirs {
        flags.push("-I".to_string());
        flags.push(dir.clone());
    }
    extra.append_to(&mut flags);

    FlagSet {
        kind: FlagKind::Application,
        compiler: compiler.to_string(),
        flags,
    }
}

/// 内核模块的标志：不搜索标准头文件，只用内核源码树里的目录和宏
pub fn kernel_flags(
    compiler: &str,
    project_dir: &Path,
    kernel_root: &Path,
    arch: &str,
    extra: &ExtraFlags,
) -> FlagSet {
    let arch_include = kernel_root.join("arch").join(arch).join("include");
    let include_dirs = [
        project_dir.to_path_buf(),
        arch_include.clone(),
        arch_include.join("generated").join("uapi"),
        arch_include.join("generated"),
        kernel_root.join("include"),
        arch_include.join("uapi"),
        kernel_root.join("include").join("uapi"),
        kernel_root.join("include").join("generated").join("uapi"),
    ];

    let mut flags: Vec<String> = KERNEL_BASE_FLAGS.iter().map(|s| s.to_string()).collect();
    flags.extend(include_dirs.iter().map(|d| format!("-I{}", d.display())));
    flags.push("-include".to_string());
    flags.push(
        kernel_root
            .join("include")
            .join("linux")
            .join("kconfig.h")
            .to_string_lossy()
            .into_owned(),
    );
    flags.extend(KERNEL_MACROS.iter().map(|s| s.to_string()));
    extra.append_to(&mut flags);

    FlagSet {
        kind: FlagKind::KernelModule,
        compiler: compiler.to_string(),
        flags,
    }
}

/// 按源文件选择标志集合
#[derive(Debug, Clone)]
pub enum FlagSelector {
    Userspace(FlagSet),
    Kernel(FlagSet),
    Mixed {
        application: FlagSet,
        kernel: FlagSet,
        driver_basenames: HashSet<String>,
    },
}

impl FlagSelector {
    /// 根据配置构造选择器；只为用得到的那套标志做系统探测
    pub fn from_config(
        project: &ProjectConfig,
        toolchain: &ToolchainConfig,
        project_dir: &Path,
    ) -> Result<Self, CdbError> {
        let mut include_dirs = project_include_dirs(project_dir)?;
        include_dirs.extend(project.include_dirs.iter().cloned());
        let extra = ExtraFlags {
            defines: project.defines.clone(),
            include_dirs,
        };

        let application = || {
            let system_dirs = probe_system_include_dirs(&toolchain.cxx);
            application_flags(&toolchain.cxx, &system_dirs, &extra)
        };
        let kernel = || {
            kernel_flags(
                &toolchain.cc,
                project_dir,
                &toolchain.kernel_root(),
                &toolchain.arch(),
                &extra,
            )
        };

        Ok(match project.profile {
            Profile::Userspace => FlagSelector::Userspace(application()),
            Profile::Kernel => FlagSelector::Kernel(kernel()),
            Profile::Mixed => FlagSelector::Mixed {
                application: application(),
                kernel: kernel(),
                driver_basenames: project.driver_basenames.iter().cloned().collect(),
            },
        })
    }

    pub fn profile(&self) -> Profile {
        match self {
            FlagSelector::Userspace(_) => Profile::Userspace,
            FlagSelector::Kernel(_) => Profile::Kernel,
            FlagSelector::Mixed { .. } => Profile::Mixed,
        }
    }

    pub fn source_extensions(&self) -> &'static [&'static str] {
        self.profile().source_extensions()
    }

    pub fn is_source_file(&self, path: &Path) -> bool {
        has_source_extension(path, self.source_extensions())
    }

    /// base_name 为不含扩展名的文件名
    pub fn select_for_basename(&self, base_name: &str) -> &FlagSet {
        match self {
            FlagSelector::Userspace(set) | FlagSelector::Kernel(set) => set,
            FlagSelector::Mixed {
                application,
                kernel,
                driver_basenames,
            } => {
                if driver_basenames.contains(base_name) {
                    kernel
                } else {
                    application
                }
            }
        }
    }

    pub fn select(&self, file: &Path) -> &FlagSet {
        self.select_for_basename(&base_name(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extra_flags_order() {
        let extra = ExtraFlags {
            defines: vec!["TEST".to_string()],
            include_dirs: vec!["/opt/inc".to_string()],
        };
        let mut flags = Vec::new();
        extra.append_to(&mut flags);
        assert_eq!(flags, vec!["-D", "TEST", "-I/opt/inc"]);
    }

    #[test]
    fn test_application_flags_pairs_include_dirs() {
        let set = application_flags("g++", &["/usr/include".to_string()], &ExtraFlags::default());
        assert_eq!(set.kind, FlagKind::Application);
        assert_eq!(
            set.flags,
            vec!["-Wall", "-std=c++11", "-x", "c++", "-I", "/usr/include"]
        );
    }

    #[test]
    fn test_kernel_flags_layout() {
        let set = kernel_flags(
            "gcc",
            Path::new("/work/drv"),
            &PathBuf::from("/ksrc"),
            "x86",
            &ExtraFlags::default(),
        );
        assert_eq!(set.compiler, "gcc");
        assert_eq!(&set.flags[..5], KERNEL_BASE_FLAGS);
        assert!(set.flags.contains(&"-I/work/drv".to_string()));
        assert!(set.flags.contains(&"-I/ksrc/arch/x86/include/generated/uapi".to_string()));
        assert!(set.flags.contains(&"-I/ksrc/include/generated/uapi".to_string()));
        let pos = set.flags.iter().position(|f| f == "-include").unwrap();
        assert_eq!(set.flags[pos + 1], "/ksrc/include/linux/kconfig.h");
        assert!(set.flags.ends_with(&KERNEL_MACROS.iter().map(|s| s.to_string()).collect::<Vec<_>>()));
    }
}
