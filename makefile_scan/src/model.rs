use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// 生成 Makefile 的构建系统
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystem {
    Generic,
    Qmake,
    Automake,
}

impl fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildSystem::Generic => write!(f, "generic"),
            BuildSystem::Qmake => write!(f, "qmake"),
            BuildSystem::Automake => write!(f, "automake"),
        }
    }
}

/// The wrapper commands that stand in for the real tools. Each value is a
/// complete command string, quoted so a wrapper directory containing spaces
/// survives make's shell expansion.
#[derive(Debug, Clone, Serialize)]
pub struct WrapperCommands {
    pub cc: String,
    pub cxx: String,
    pub ar: String,
    pub ld: String,
}

impl WrapperCommands {
    /// Wrapper executables live next to this tool, named `<tool>-and-emit-llvm-ir`.
    pub fn from_install_dir(dir: &Path) -> Self {
        let cmd = |tool: &str| {
            format!("\"{}\"", dir.join(format!("{tool}-and-emit-llvm-ir")).display())
        };
        WrapperCommands {
            cc: cmd("clang"),
            cxx: cmd("clang++"),
            ar: cmd("ar"),
            ld: cmd("ld"),
        }
    }
}

/// `VAR=value` overrides for the make command line. Keys unique, insertion
/// order preserved, replacement keeps the original position.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct OverrideSet {
    entries: Vec<(String, String)>,
}

impl OverrideSet {
    pub fn new() -> Self {
        OverrideSet::default()
    }

    pub fn set(&mut self, name: &str, value: String) {
        match self.entries.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of scanning a Makefile.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub build_system: BuildSystem,
    pub overrides: OverrideSet,
}

/// Fatal scan conditions. Proceeding past any of these could leave the real
/// link step uninstrumented, so there is no recoverable class.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("could not handle LINK assignment: {value}")]
    UnhandledLink { value: String },
    #[error("could not handle LD assignment: {value}")]
    UnhandledLd { value: String },
}
