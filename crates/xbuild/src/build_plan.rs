//! Module resolution: turns link-unit specifications into concrete
//! compilation units and link units for one target, per spec.md's
//! "Module resolution" and "Per-target setup" build-driver steps.

use crate::modules::{module_name, module_table, LinkUnitSpecification};
use std::collections::HashSet;
use std::path::PathBuf;
use substrate::Target;

/// One source file + its object path + the flags it was compiled with.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub source_path: PathBuf,
    pub object_path: PathBuf,
    pub optimize: bool,
    pub has_debug_information: bool,
    pub fuzz: bool,
    pub use_io_ring: bool,
}

/// One named artifact produced by linking its compilation units' objects.
#[derive(Debug, Clone)]
pub struct LinkUnitPlan {
    pub name: String,
    pub artifact_path: PathBuf,
    pub object_paths: Vec<PathBuf>,
    pub is_builder: bool,
    pub optimize: bool,
    pub has_debug_information: bool,
    pub fuzz: bool,
    pub use_io_ring: bool,
    pub sanitize: bool,
}

/// `<target_dir>/<relative-source-path>.{o,obj}` object extension for `os`.
fn object_extension(os: substrate::OperatingSystem) -> &'static str {
    if os == substrate::OperatingSystem::Windows {
        "obj"
    } else {
        "o"
    }
}

fn artifact_extension(os: substrate::OperatingSystem) -> &'static str {
    if os == substrate::OperatingSystem::Windows {
        "exe"
    } else {
        ""
    }
}

/// Resolves `specs` into compilation units (deduplicated by `(module,
/// target)`, matching "if a `{module, target}` pair has not been seen") and
/// one link unit per spec, all rooted under `build/<triple>`.
pub struct BuildPlan {
    pub target_directory: PathBuf,
    pub compilation_units: Vec<CompilationUnit>,
    pub link_units: Vec<LinkUnitPlan>,
}

#[must_use]
pub fn resolve(
    specs: &[LinkUnitSpecification],
    target: &Target,
    optimize: bool,
    has_debug_information: bool,
    fuzz: bool,
    use_io_ring: bool,
    sanitize: bool,
) -> BuildPlan {
    let triple = target.triple();
    let target_directory = PathBuf::from("build").join(&triple);
    let obj_ext = object_extension(target.os);
    let artifact_ext = artifact_extension(target.os);

    let mut seen_modules = HashSet::new();
    let mut compilation_units = Vec::new();
    let mut link_units = Vec::new();

    for spec in specs {
        let mut object_paths = Vec::new();
        for link_module in &spec.modules {
            let module = module_table(link_module.id);
            if module.no_source {
                continue;
            }
            let module_key = (format!("{:?}", link_module.id), triple.clone());
            let source_path = PathBuf::from(module.directory.path()).join(format!("{}.c", module_name(link_module.id)));
            let relative_object = source_path.with_extension(obj_ext);
            let object_path = target_directory.join(&relative_object);

            if seen_modules.insert(module_key) {
                compilation_units.push(CompilationUnit {
                    source_path: source_path.clone(),
                    object_path: object_path.clone(),
                    optimize,
                    has_debug_information,
                    fuzz,
                    use_io_ring,
                });
            }
            object_paths.push(object_path);
        }

        let artifact_name = if artifact_ext.is_empty() {
            spec.name.to_string()
        } else {
            format!("{}.{artifact_ext}", spec.name)
        };

        link_units.push(LinkUnitPlan {
            name: spec.name.to_string(),
            artifact_path: target_directory.join(artifact_name),
            object_paths,
            is_builder: spec.is_builder,
            optimize,
            has_debug_information,
            fuzz,
            use_io_ring,
            sanitize,
        });
    }

    BuildPlan {
        target_directory,
        compilation_units,
        link_units,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::modules::link_unit_specifications;
    use substrate::{CpuArch, CpuModel, OperatingSystem};

    fn target() -> Target {
        Target {
            cpu_arch: CpuArch::X86_64,
            cpu_model: CpuModel::Baseline,
            os: OperatingSystem::Linux,
        }
    }

    #[test]
    fn shared_modules_are_compiled_once_across_link_units() {
        let specs = link_unit_specifications();
        let plan = resolve(&specs, &target(), false, true, false, false, false);

        // `Lib` appears in all three link units but must only be compiled once.
        let lib_units: Vec<_> = plan
            .compilation_units
            .iter()
            .filter(|u| u.source_path.to_string_lossy().contains("lib"))
            .collect();
        assert_eq!(lib_units.len(), 1);
    }

    #[test]
    fn builder_link_unit_is_first_and_flagged() {
        let specs = link_unit_specifications();
        let plan = resolve(&specs, &target(), false, true, false, false, false);
        assert!(plan.link_units[0].is_builder);
        assert_eq!(plan.link_units[0].name, "builder");
    }

    #[test]
    fn system_headers_module_contributes_no_compilation_unit() {
        let specs = link_unit_specifications();
        let plan = resolve(&specs, &target(), false, true, false, false, false);
        assert!(!plan
            .compilation_units
            .iter()
            .any(|u| u.source_path.to_string_lossy().contains("system_headers")));
    }
}
