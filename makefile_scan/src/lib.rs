mod classify;
mod model;
mod resolve;

pub use classify::{Assignment, Patterns, ValueKind};
pub use model::{BuildSystem, OverrideSet, ScanError, ScanReport, WrapperCommands};
pub use resolve::{OverrideResolver, ScanStep};

// TODO: fall back to plain `make` where gmake does not exist
pub const MAKE_TOOL: &str = "gmake";
pub const DEFAULT_MAKEFILE: &str = "./Makefile";

/// 合并反斜杠续行，惰性逐条产出逻辑行
pub fn logical_lines(content: &str) -> LogicalLines<'_> {
    LogicalLines { lines: content.lines() }
}

pub struct LogicalLines<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Iterator for LogicalLines<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut buffer = String::new();
        let mut buffered = false;
        for line in self.lines.by_ref() {
            buffered = true;
            buffer.push_str(line.trim());
            if buffer.ends_with('\\') {
                buffer.pop();
            } else {
                return Some(buffer);
            }
        }
        // a file ending mid-continuation still yields what was gathered
        if buffered { Some(buffer) } else { None }
    }
}

/// 解析 Makefile，算出传给 make 的变量覆盖
///
/// Folds the logical lines into an [`OverrideResolver`]; the fold stops early
/// when a line proves no later line may matter (qmake banner).
pub fn scan_makefile(content: &str, wrappers: &WrapperCommands) -> Result<ScanReport, ScanError> {
    let patterns = Patterns::new();
    let mut resolver = OverrideResolver::new(wrappers.clone());
    for line in logical_lines(content) {
        match resolver.observe(&line, &patterns)? {
            ScanStep::Continue => {}
            ScanStep::Stop => break,
        }
    }
    Ok(resolver.finish())
}

/// The final subprocess argument vector, tool name first. Override order is
/// not significant to make, each entry is an independent `VAR=value` token.
pub fn make_command_line(report: &ScanReport, makefile: &str, options: &[String]) -> Vec<String> {
    let mut command_line = vec![MAKE_TOOL.to_string()];
    if makefile != DEFAULT_MAKEFILE {
        command_line.push("-f".to_string());
        command_line.push(makefile.to_string());
    }
    for (name, value) in report.overrides.iter() {
        command_line.push(format!("{name}={value}"));
    }
    command_line.extend(options.iter().cloned());
    command_line
}
