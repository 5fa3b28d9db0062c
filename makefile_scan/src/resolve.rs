use crate::classify::{Patterns, ValueKind};
use crate::model::{BuildSystem, OverrideSet, ScanError, ScanReport, WrapperCommands};
use tracing::{debug, info};

const QMAKE_BANNER: &str = "Generated by qmake";
const AUTOMAKE_BANNER: &str = "generated by automake";

const C_COMPILERS: &[&str] = &["clang", "gcc", "cc"];
const CXX_COMPILERS: &[&str] = &["clang++", "g++", "c++"];
const LINKERS: &[&str] = &["ld", "lld", "gold"];

/// Whether the scan continues after a logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    Continue,
    Stop,
}

/// Working set of variable overrides, folded over the logical lines of a
/// Makefile. Entries are inserted or replaced, never removed; a later
/// assignment for the same variable wins.
pub struct OverrideResolver {
    wrappers: WrapperCommands,
    overrides: OverrideSet,
    build_system: BuildSystem,
}

impl OverrideResolver {
    /// CC and CXX are always valid, all others depend on the build system.
    pub fn new(wrappers: WrapperCommands) -> Self {
        let mut overrides = OverrideSet::new();
        overrides.set("CC", wrappers.cc.clone());
        overrides.set("CXX", wrappers.cxx.clone());
        overrides.set("AR", wrappers.ar.clone());
        // most build systems link with the compiler instead of calling ld directly
        overrides.set("LD", wrappers.cxx.clone());
        OverrideResolver {
            wrappers,
            overrides,
            build_system: BuildSystem::Generic,
        }
    }

    /// Process one logical line. `ScanStep::Stop` means no further line may
    /// influence the override set.
    pub fn observe(&mut self, line: &str, patterns: &Patterns) -> Result<ScanStep, ScanError> {
        // qmake invokes $(LINK) and expects the archive flags inside AR,
        // autoconf-style Makefiles call ar without them
        if line.contains(QMAKE_BANNER) {
            self.overrides.set("LINK", self.wrappers.cxx.clone());
            self.overrides.set("AR", format!("{} cqs", self.wrappers.ar));
            self.build_system = BuildSystem::Qmake;
            return Ok(ScanStep::Stop);
        }
        if line.contains(AUTOMAKE_BANNER) {
            self.build_system = BuildSystem::Automake;
        }

        let Some(assignment) = patterns.parse_assignment(line) else {
            return Ok(ScanStep::Continue);
        };

        match assignment.name {
            "LINK" => self.resolve_link(assignment.value, patterns)?,
            "LD" => self.resolve_ld(assignment.value, patterns)?,
            name => debug!("ignoring {name} assignment"),
        }
        Ok(ScanStep::Continue)
    }

    /// LINK only ever appears as an expansion in Makefiles we understand;
    /// anything else means the link step could escape interception.
    fn resolve_link(&mut self, value: &str, patterns: &Patterns) -> Result<(), ScanError> {
        info!("found LINK assignment: {value}");
        match patterns.classify_value(value) {
            ValueKind::Expansion(name) => {
                info!("not overriding LINK since it expands {name}");
                Ok(())
            }
            _ => Err(ScanError::UnhandledLink { value: value.to_string() }),
        }
    }

    fn resolve_ld(&mut self, value: &str, patterns: &Patterns) -> Result<(), ScanError> {
        info!("found LD assignment: {value}");
        match patterns.classify_value(value) {
            ValueKind::Expansion(name) => {
                info!("not overriding LD since it expands {name}");
                Ok(())
            }
            // relative/absolute path, we have to override it
            ValueKind::PathCommand { command, args } => {
                let wrapper = if is_command(command, C_COMPILERS) {
                    &self.wrappers.cc
                } else if is_command(command, CXX_COMPILERS) {
                    &self.wrappers.cxx
                } else if is_command(command, LINKERS) {
                    &self.wrappers.ld
                } else {
                    return Err(ScanError::UnhandledLd { value: value.to_string() });
                };
                // keep the original flags, only the program is substituted
                self.overrides.set("LD", format!("{wrapper}{args}"));
                Ok(())
            }
            ValueKind::Unclassified(_) => {
                Err(ScanError::UnhandledLd { value: value.to_string() })
            }
        }
    }

    pub fn build_system(&self) -> BuildSystem {
        self.build_system
    }

    pub fn overrides(&self) -> &OverrideSet {
        &self.overrides
    }

    pub fn finish(self) -> ScanReport {
        ScanReport {
            build_system: self.build_system,
            overrides: self.overrides,
        }
    }
}

/// A token names a command if it equals it or ends in `/<command>`.
fn is_command(token: &str, commands: &[&str]) -> bool {
    commands
        .iter()
        .any(|c| token == *c || token.ends_with(&format!("/{c}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn wrappers() -> WrapperCommands {
        WrapperCommands::from_install_dir(Path::new("/opt/soaap"))
    }

    #[test]
    fn command_names_match_exactly_or_by_final_segment() {
        assert!(is_command("gcc", C_COMPILERS));
        assert!(is_command("/usr/bin/gcc", C_COMPILERS));
        assert!(is_command("/opt/llvm/bin/clang++", CXX_COMPILERS));
        assert!(!is_command("xclang", C_COMPILERS));
        assert!(!is_command("/usr/bin/xclang", C_COMPILERS));
        assert!(!is_command("clang", CXX_COMPILERS));
    }

    #[test]
    fn defaults_cover_the_four_standard_variables() {
        let resolver = OverrideResolver::new(wrappers());
        let set = resolver.overrides();
        assert_eq!(set.get("CC"), Some(wrappers().cc.as_str()));
        assert_eq!(set.get("CXX"), Some(wrappers().cxx.as_str()));
        assert_eq!(set.get("AR"), Some(wrappers().ar.as_str()));
        // LD defaults to the C++ compiler wrapper
        assert_eq!(set.get("LD"), Some(wrappers().cxx.as_str()));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn non_assignment_lines_leave_state_unchanged() {
        let patterns = Patterns::new();
        let mut resolver = OverrideResolver::new(wrappers());
        let before: Vec<(String, String)> = resolver
            .overrides()
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();

        for line in ["", "# a comment", "all: main.o", "\tclang -c main.c", "obj = main.o"] {
            assert_eq!(resolver.observe(line, &patterns), Ok(ScanStep::Continue));
        }

        let after: Vec<(String, String)> = resolver
            .overrides()
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        assert_eq!(before, after);
        assert_eq!(resolver.build_system(), BuildSystem::Generic);
    }

    #[test]
    fn ld_expansion_is_a_true_noop() {
        let patterns = Patterns::new();
        let mut resolver = OverrideResolver::new(wrappers());
        let before = resolver.overrides().get("LD").unwrap().to_string();
        resolver.observe("LD := $(LINKER)", &patterns).unwrap();
        assert_eq!(resolver.overrides().get("LD"), Some(before.as_str()));
    }

    #[test]
    fn ld_compiler_path_keeps_flags_verbatim() {
        let patterns = Patterns::new();
        let mut resolver = OverrideResolver::new(wrappers());
        resolver.observe("LD = /usr/bin/clang -fuse-ld=lld", &patterns).unwrap();
        assert_eq!(
            resolver.overrides().get("LD"),
            Some(format!("{} -fuse-ld=lld", wrappers().cc).as_str())
        );
    }

    #[test]
    fn ld_families_map_to_their_wrappers() {
        let patterns = Patterns::new();

        let mut resolver = OverrideResolver::new(wrappers());
        resolver.observe("LD = g++ -static", &patterns).unwrap();
        assert_eq!(
            resolver.overrides().get("LD"),
            Some(format!("{} -static", wrappers().cxx).as_str())
        );

        let mut resolver = OverrideResolver::new(wrappers());
        resolver.observe("LD = /usr/bin/gold", &patterns).unwrap();
        assert_eq!(resolver.overrides().get("LD"), Some(wrappers().ld.as_str()));
    }

    #[test]
    fn unknown_ld_command_is_fatal() {
        let patterns = Patterns::new();
        let mut resolver = OverrideResolver::new(wrappers());
        assert_eq!(
            resolver.observe("LD = /opt/toolchain/bin/xlc", &patterns),
            Err(ScanError::UnhandledLd { value: "/opt/toolchain/bin/xlc".to_string() })
        );
    }

    #[test]
    fn link_expansion_skips_but_other_link_values_are_fatal() {
        let patterns = Patterns::new();
        let mut resolver = OverrideResolver::new(wrappers());
        assert_eq!(resolver.observe("LINK = $(CXX)", &patterns), Ok(ScanStep::Continue));
        assert_eq!(resolver.overrides().get("LINK"), None);

        assert_eq!(
            resolver.observe("LINK = g++", &patterns),
            Err(ScanError::UnhandledLink { value: "g++".to_string() })
        );
    }

    #[test]
    fn qmake_banner_rewrites_overrides_and_stops() {
        let patterns = Patterns::new();
        let mut resolver = OverrideResolver::new(wrappers());
        let step = resolver
            .observe("# Generated by qmake, really", &patterns)
            .unwrap();
        assert_eq!(step, ScanStep::Stop);
        assert_eq!(resolver.build_system(), BuildSystem::Qmake);
        assert_eq!(resolver.overrides().get("LINK"), Some(wrappers().cxx.as_str()));
        let ar = resolver.overrides().get("AR").unwrap();
        assert!(ar.ends_with(" cqs"));
        assert_eq!(ar, format!("{} cqs", wrappers().ar).as_str());
    }

    #[test]
    fn automake_banner_only_sets_the_tag() {
        let patterns = Patterns::new();
        let mut resolver = OverrideResolver::new(wrappers());
        let defaults: Vec<(String, String)> = resolver
            .overrides()
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();

        let step = resolver
            .observe("# Makefile.in generated by automake 1.16.5 from Makefile.am.", &patterns)
            .unwrap();
        assert_eq!(step, ScanStep::Continue);
        assert_eq!(resolver.build_system(), BuildSystem::Automake);

        let after: Vec<(String, String)> = resolver
            .overrides()
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        assert_eq!(defaults, after);
    }
}
