//! Command-line argument parsing for the formula editor
//!
//! Supports:
//! - Seeding the editor with a serialized formula
//! - Replaying a keystroke script against the editor
//! - Alternate config and catalog files

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

use indicator_formula::runtime::Key;
use indicator_formula::toolbar::ToolbarKey;

/// Replay keystrokes against an indicator formula and print the result
#[derive(Parser, Debug)]
#[command(name = "indicator-formula", version, about = "Indicator formula editor")]
pub struct CliArgs {
    /// Initial serialized formula
    #[arg(long, value_name = "SERIALIZED")]
    pub value: Option<String>,

    /// Keystrokes to replay, e.g. `total $ener{enter}`
    #[arg(long, value_name = "SCRIPT", default_value = "")]
    pub keys: String,

    /// YAML catalog of positions and impacts
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the node list as JSON
    #[arg(long)]
    pub json: bool,
}

/// One replayed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Key(Key),
    Toolbar(ToolbarKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// `{` without a matching `}`
    Unclosed(usize),
    UnknownKey(String),
    UnknownButton(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Unclosed(at) => write!(f, "unclosed '{{' at character {}", at),
            ScriptError::UnknownKey(name) => write!(f, "unknown key '{{{}}}'", name),
            ScriptError::UnknownButton(sym) => write!(f, "unknown toolbar button '{}'", sym),
        }
    }
}

impl std::error::Error for ScriptError {}

/// Parse a keystroke script
///
/// Plain characters are typed as-is; `{name}` names a special key and
/// `{{` types a literal brace.
pub fn parse_script(script: &str) -> Result<Vec<Step>, ScriptError> {
    let chars: Vec<char> = script.chars().collect();
    let mut steps = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch != '{' {
            steps.push(Step::Key(Key::Char(ch)));
            i += 1;
            continue;
        }
        if chars.get(i + 1) == Some(&'{') {
            steps.push(Step::Key(Key::Char('{')));
            i += 2;
            continue;
        }

        let close = chars[i + 1..]
            .iter()
            .position(|&c| c == '}')
            .ok_or(ScriptError::Unclosed(i))?;
        let name: String = chars[i + 1..i + 1 + close].iter().collect();
        steps.push(named_step(&name)?);
        i += close + 2;
    }

    Ok(steps)
}

fn named_step(name: &str) -> Result<Step, ScriptError> {
    if let Some(sym) = name.strip_prefix("tool:") {
        return sym
            .parse::<ToolbarKey>()
            .map(Step::Toolbar)
            .map_err(|_| ScriptError::UnknownButton(sym.to_string()));
    }

    let key = match name {
        "enter" => Key::Enter,
        "esc" => Key::Escape,
        "up" => Key::Up,
        "down" => Key::Down,
        "left" => Key::Left,
        "right" => Key::Right,
        "home" => Key::Home,
        "end" => Key::End,
        "bs" => Key::Backspace,
        "del" => Key::Delete,
        "nl" => Key::Char('\n'),
        _ => return Err(ScriptError::UnknownKey(name.to_string())),
    };
    Ok(Step::Key(key))
}
