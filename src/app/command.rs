//! Parsing of interactive session commands

use std::path::PathBuf;

use crate::app::Quality;
use crate::error::{AppError, Result};

/// Which results to save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadTarget {
    /// 0-based result index
    One(usize),
    All,
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Vec<PathBuf>),
    /// 0-based upload index
    Remove(usize),
    Character(String),
    Background(String),
    /// `None` toggles
    RemoveBackground(Option<bool>),
    Quality(Quality),
    Generate,
    Download(DownloadTarget),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  add <path>...            add reference images (PNG, JPEG, WebP)
  remove <n>               remove upload number n
  character <text>         set the character description (empty to clear)
  background <text>        set the background and setting (empty to clear)
  remove-bg [on|off]       set or toggle background removal
  quality <Standard|2K|4K> choose output quality
  generate                 generate four variants
  download <n>|all         save one or all results
  show                     redraw the panel
  help                     show this help
  quit                     leave";

impl Command {
    /// Parse a line; blank lines yield `Ok(None)`
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "add" => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if paths.is_empty() {
                    return Err(invalid("add needs at least one path"));
                }
                Command::Add(paths)
            }
            "remove" | "rm" => Command::Remove(parse_position(rest)?),
            "character" | "char" => Command::Character(rest.to_string()),
            "background" | "bg" => Command::Background(rest.to_string()),
            "remove-bg" => Command::RemoveBackground(match rest.to_lowercase().as_str() {
                "" => None,
                "on" | "true" | "yes" => Some(true),
                "off" | "false" | "no" => Some(false),
                other => return Err(invalid(&format!("expected on or off, got '{}'", other))),
            }),
            "quality" => Command::Quality(rest.parse::<Quality>().map_err(|e| invalid(&e))?),
            "generate" | "gen" => Command::Generate,
            "download" | "dl" => Command::Download(if rest.eq_ignore_ascii_case("all") {
                DownloadTarget::All
            } else {
                DownloadTarget::One(parse_position(rest)?)
            }),
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(invalid(&format!("unknown command '{}'. Type 'help'", other))),
        };

        Ok(Some(command))
    }
}

/// Parse a 1-based position into a 0-based index
fn parse_position(text: &str) -> Result<usize> {
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(invalid(&format!("expected a number from 1, got '{}'", text))),
    }
}

fn invalid(message: &str) -> AppError {
    AppError::InvalidRequest(message.to_string())
}
