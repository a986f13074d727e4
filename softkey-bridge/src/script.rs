//! Line-oriented command script.
//!
//! One command per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! show 300     # keyboard opens, viewport shrinks by 300px
//! hide         # keyboard closes
//! resize 800   # viewport is back at full height
//! render
//! ```

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Keyboard will show, optionally shrinking the viewport by this height.
    Show(Option<u32>),
    Hide,
    /// Set the resize container's height.
    Resize(u32),
    /// Block keyboard controller acquisitions.
    Hold,
    Release,
    Mount,
    Unmount,
    /// Focus elements by document index.
    Focus(Vec<usize>),
    Render,
    /// Sleep for this many milliseconds.
    Wait(u64),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
}

fn number<T: std::str::FromStr>(raw: &str) -> Result<T, ScriptError> {
    raw.parse()
        .map_err(|_| ScriptError::InvalidNumber(raw.to_string()))
}

/// Parse one script line. `Ok(None)` for lines with nothing to do.
pub fn parse_line(line: &str) -> Result<Option<Command>, ScriptError> {
    let line = match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    };
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };

    let command = match word.to_lowercase().as_str() {
        "show" => Command::Show(parts.next().map(number::<u32>).transpose()?),
        "hide" => Command::Hide,
        "resize" => {
            let raw = parts.next().ok_or(ScriptError::MissingArgument("resize"))?;
            Command::Resize(number(raw)?)
        }
        "hold" => Command::Hold,
        "release" => Command::Release,
        "mount" => Command::Mount,
        "unmount" => Command::Unmount,
        "focus" => {
            let ids = parts.map(number::<usize>).collect::<Result<Vec<usize>, _>>()?;
            Command::Focus(ids)
        }
        "render" => Command::Render,
        "wait" => {
            let raw = parts.next().ok_or(ScriptError::MissingArgument("wait"))?;
            Command::Wait(number(raw)?)
        }
        "quit" | "exit" => Command::Quit,
        other => return Err(ScriptError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}
