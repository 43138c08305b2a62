//! Line-oriented command script driving a picker session.
//!
//! One command per line. Blank lines and `#` comments are skipped.
//!
//! ```text
//! load https://images.example.com/cat.png
//! await
//! pick
//! move 120 80
//! frame
//! click 120 80
//! ```

use std::path::PathBuf;

use picker::error::ErrorCode;
use picker::viewport::Point;

/// One parsed script command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Submit an image URL. An empty URL is accepted and ignored by the session.
    Load(String),
    /// Wait for in-flight loads to settle.
    Await,
    /// Toggle pick mode.
    Pick,
    Move(Point),
    Leave,
    Click(Point),
    /// Animation frame boundary.
    Frame,
    /// Write the magnifier frame as PNG.
    Snapshot(PathBuf),
    /// Write the image surface as PNG.
    SaveSurface(PathBuf),
}

/// A script line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason}")]
pub struct ScriptError {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

impl ErrorCode for ScriptError {
    fn error_code(&self) -> &'static str {
        "E_SCRIPT_PARSE"
    }
}

/// Parse a whole script.
///
/// # Errors
///
/// Returns the first [`ScriptError`] encountered.
pub fn parse_script(text: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let parsed = parse_line(raw).map_err(|reason| ScriptError { line: index + 1, reason })?;
        commands.extend(parsed);
    }
    Ok(commands)
}

/// Parse one line. `Ok(None)` for blank lines and comments.
///
/// # Errors
///
/// Returns a human-readable reason when the line is malformed.
pub fn parse_line(raw: &str) -> Result<Option<Command>, String> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let command = match verb {
        "load" => Command::Load(rest.to_string()),
        "await" => no_args(verb, rest, Command::Await)?,
        "pick" => no_args(verb, rest, Command::Pick)?,
        "leave" => no_args(verb, rest, Command::Leave)?,
        "frame" => no_args(verb, rest, Command::Frame)?,
        "move" => Command::Move(parse_point(verb, rest)?),
        "click" => Command::Click(parse_point(verb, rest)?),
        "snapshot" => Command::Snapshot(parse_path(verb, rest)?),
        "save-surface" => Command::SaveSurface(parse_path(verb, rest)?),
        other => return Err(format!("unknown command `{other}`")),
    };
    Ok(Some(command))
}

fn no_args(verb: &str, rest: &str, command: Command) -> Result<Command, String> {
    if rest.is_empty() { Ok(command) } else { Err(format!("`{verb}` takes no arguments")) }
}

fn parse_point(verb: &str, rest: &str) -> Result<Point, String> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [x, y] = parts.as_slice() else {
        return Err(format!("`{verb}` expects two coordinates"));
    };
    Ok(Point::new(parse_coord(x)?, parse_coord(y)?))
}

fn parse_coord(raw: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("`{raw}` is not a number")),
    }
}

fn parse_path(verb: &str, rest: &str) -> Result<PathBuf, String> {
    if rest.is_empty() {
        return Err(format!("`{verb}` expects a file path"));
    }
    Ok(PathBuf::from(rest))
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
