//! Static module / directory / link-unit tables.
//!
//! Grounded verbatim in the original's `ModuleId`/`DirectoryId`/`modules[]`/
//! `LinkModule[]`/`LINK_UNIT` tables (`build.c`): a closed module list, a
//! directory-id to path table, and three sibling link units (`builder`,
//! `cc`, `asm`) where the builder's own link unit is always index 0.

/// One entry in the closed module table: which directory its source/header
/// pair lives in, and whether it is header-only or source-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleId {
    Lib,
    SystemHeaders,
    EntryPoint,
    Target,
    NativeCpu,
    Builder,
    CcMain,
    AsmMain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryId {
    SrcSubstrate,
    Root,
    Cc,
    Asm,
}

impl DirectoryId {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            DirectoryId::SrcSubstrate => "crates/substrate/src",
            DirectoryId::Root => ".",
            DirectoryId::Cc => "crates/xbuild/demos/cc",
            DirectoryId::Asm => "crates/xbuild/demos/asm",
        }
    }
}

/// A module's directory plus which of its source/header files exist.
#[derive(Debug, Clone, Copy)]
pub struct Module {
    pub directory: DirectoryId,
    pub no_header: bool,
    pub no_source: bool,
}

#[must_use]
pub fn module_table(id: ModuleId) -> Module {
    match id {
        ModuleId::Lib => Module {
            directory: DirectoryId::SrcSubstrate,
            no_header: false,
            no_source: false,
        },
        ModuleId::SystemHeaders => Module {
            directory: DirectoryId::SrcSubstrate,
            no_header: false,
            no_source: true,
        },
        ModuleId::EntryPoint | ModuleId::Target | ModuleId::NativeCpu => Module {
            directory: DirectoryId::SrcSubstrate,
            no_header: false,
            no_source: false,
        },
        ModuleId::Builder => Module {
            directory: DirectoryId::Root,
            no_header: true,
            no_source: false,
        },
        ModuleId::CcMain => Module {
            directory: DirectoryId::Cc,
            no_header: true,
            no_source: false,
        },
        ModuleId::AsmMain => Module {
            directory: DirectoryId::Asm,
            no_header: true,
            no_source: false,
        },
    }
}

/// The on-disk base name (without extension) for a module's source/header
/// pair, grounded verbatim on the original's `module_names[]` table
/// (`build.c`), except `Builder` — renamed from the original's `"build"` to
/// `"builder"` to avoid colliding with the `build/` output directory this
/// driver writes artifacts into.
#[must_use]
pub fn module_name(id: ModuleId) -> &'static str {
    match id {
        ModuleId::Lib => "lib",
        ModuleId::SystemHeaders => "system_headers",
        ModuleId::EntryPoint => "entry_point",
        ModuleId::Target => "target",
        ModuleId::NativeCpu => "native_cpu",
        ModuleId::Builder => "builder",
        ModuleId::CcMain => "cc_main",
        ModuleId::AsmMain => "asm_main",
    }
}

/// One member of a link unit's module list.
#[derive(Debug, Clone, Copy)]
pub struct LinkModule {
    pub id: ModuleId,
}

/// A named group of modules producing one artifact.
#[derive(Debug, Clone)]
pub struct LinkUnitSpecification {
    pub name: &'static str,
    pub modules: Vec<LinkModule>,
    pub is_builder: bool,
}

/// The three sibling link units this build driver knows how to produce.
/// `builder` is always index 0, matching "the builder's own link unit is
/// always index 0 and is skipped in the link fan-out."
#[must_use]
pub fn link_unit_specifications() -> Vec<LinkUnitSpecification> {
    let native = ModuleId::NativeCpu;
    vec![
        LinkUnitSpecification {
            name: "builder",
            modules: vec![
                LinkModule { id: ModuleId::Builder },
                LinkModule { id: ModuleId::Lib },
                LinkModule { id: ModuleId::SystemHeaders },
                LinkModule { id: ModuleId::EntryPoint },
                LinkModule { id: native },
                LinkModule { id: ModuleId::Target },
            ],
            is_builder: true,
        },
        LinkUnitSpecification {
            name: "cc",
            modules: vec![
                LinkModule { id: ModuleId::CcMain },
                LinkModule { id: ModuleId::Lib },
                LinkModule { id: ModuleId::SystemHeaders },
                LinkModule { id: ModuleId::EntryPoint },
                LinkModule { id: native },
                LinkModule { id: ModuleId::Target },
            ],
            is_builder: false,
        },
        LinkUnitSpecification {
            name: "asm",
            modules: vec![
                LinkModule { id: ModuleId::AsmMain },
                LinkModule { id: ModuleId::Lib },
                LinkModule { id: ModuleId::SystemHeaders },
                LinkModule { id: ModuleId::EntryPoint },
                LinkModule { id: native },
                LinkModule { id: ModuleId::Target },
            ],
            is_builder: false,
        },
    ]
}

/// Restricts each link unit's module list to its first module, matching
/// `unity-build`'s "or only the first if unity-build" module-resolution rule.
pub fn apply_unity_build(specs: &mut [LinkUnitSpecification]) {
    for spec in specs {
        spec.modules.truncate(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn builder_link_unit_is_always_first() {
        let specs = link_unit_specifications();
        assert_eq!(specs[0].name, "builder");
        assert!(specs[0].is_builder);
        assert!(!specs[1].is_builder);
        assert!(!specs[2].is_builder);
    }

    #[test]
    fn unity_build_truncates_every_unit_to_its_first_module() {
        let mut specs = link_unit_specifications();
        apply_unity_build(&mut specs);
        for spec in &specs {
            assert_eq!(spec.modules.len(), 1);
        }
    }

    #[test]
    fn module_name_is_snake_case_and_skips_no_source_modules() {
        assert_eq!(module_name(ModuleId::EntryPoint), "entry_point");
        assert_eq!(module_name(ModuleId::CcMain), "cc_main");
        assert!(module_table(ModuleId::SystemHeaders).no_source);
    }
}
