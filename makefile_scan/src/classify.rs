use regex::Regex;
use tracing::debug;

/// A recognized uppercase variable assignment, value already trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Classification of an assignment's right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind<'a> {
    /// `${NAME}` or `$(NAME)`, carrying the referenced variable name.
    Expansion(&'a str),
    /// A path or bare command followed by its arguments.
    PathCommand { command: &'a str, args: &'a str },
    Unclassified(&'a str),
}

/// 扫描用的正则，编译一次后整个扫描共用
pub struct Patterns {
    assignment: Regex,
    expansion: Regex,
    path: Regex,
}

impl Patterns {
    pub fn new() -> Self {
        Patterns {
            // only upper case variables are interesting
            assignment: Regex::new(r"^([A-Z_]+)\s*[?:]?=(.*)$").unwrap(),
            expansion: Regex::new(r"^\$[\{\(](\w+)[\}\)]").unwrap(),
            // dash must not be the first char otherwise it's an option
            path: Regex::new(r"^([/\w][/\w.+-]*)(.*)$").unwrap(),
        }
    }

    /// Match a logical line against the assignment pattern. Lines that are
    /// not assignments yield `None` and must be skipped, never failed.
    pub fn parse_assignment<'a>(&self, line: &'a str) -> Option<Assignment<'a>> {
        let caps = self.assignment.captures(line)?;
        Some(Assignment {
            name: caps.get(1).unwrap().as_str(),
            value: caps.get(2).unwrap().as_str().trim(),
        })
    }

    pub fn classify_value<'a>(&self, value: &'a str) -> ValueKind<'a> {
        if let Some(caps) = self.expansion.captures(value) {
            let name = caps.get(1).unwrap().as_str();
            debug!("variable expansion of {name}");
            return ValueKind::Expansion(name);
        }
        if let Some(caps) = self.path.captures(value) {
            let command = caps.get(1).unwrap().as_str();
            debug!("path/cmd assignment {command}");
            return ValueKind::PathCommand {
                command,
                args: caps.get(2).unwrap().as_str(),
            };
        }
        debug!("other var assign: {value}");
        ValueKind::Unclassified(value)
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Patterns::new()
    }
}
