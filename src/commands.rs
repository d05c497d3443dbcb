//! Editor command system
//!
//! Commands refer to fields by their 1-based position in the outline most
//! recently printed by `ls`. Handles are resolved to field ids by the app.

use std::path::PathBuf;

use thiserror::Error;

use schema_forge::{FieldType, UnknownFieldType};

/// A field's position in the outline
pub type Handle = usize;

/// Available editor commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add,
    AddProperty(Handle),
    AddItem(Handle),
    Rename(Handle, String),
    Retype(Handle, FieldType),
    Describe(Handle, String),
    Require(Handle, Option<bool>),
    Remove(Handle),
    List,
    Schema,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("Not a field number: {0}")]
    BadHandle(String),
    #[error(transparent)]
    BadType(#[from] UnknownFieldType),
    #[error("Expected on or off, got: {0}")]
    BadToggle(String),
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_command(input: &str) -> Result<Option<Command>, CommandError> {
    let input = input.trim();
    if input.is_empty() || input.starts_with('#') {
        return Ok(None);
    }

    let (name, rest) = split_word(input);

    let command = match name {
        "add" => Command::Add,
        "prop" => Command::AddProperty(parse_handle("prop", rest)?.0),
        "item" => Command::AddItem(parse_handle("item", rest)?.0),
        "name" => {
            let (handle, text) = parse_handle("name", rest)?;
            Command::Rename(handle, text.to_string())
        }
        "type" => {
            let (handle, text) = parse_handle("type", rest)?;
            if text.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "type",
                    what: "a type",
                });
            }
            Command::Retype(handle, text.parse()?)
        }
        "desc" => {
            let (handle, text) = parse_handle("desc", rest)?;
            Command::Describe(handle, text.to_string())
        }
        "req" => {
            let (handle, text) = parse_handle("req", rest)?;
            let toggle = match text {
                "" => None,
                "on" | "yes" | "true" => Some(true),
                "off" | "no" | "false" => Some(false),
                other => return Err(CommandError::BadToggle(other.to_string())),
            };
            Command::Require(handle, toggle)
        }
        "rm" => Command::Remove(parse_handle("rm", rest)?.0),
        "ls" => Command::List,
        "schema" => Command::Schema,
        "export" => Command::Export(Some(rest).filter(|p| !p.is_empty()).map(PathBuf::from)),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        unknown => return Err(CommandError::Unknown(unknown.to_string())),
    };

    Ok(Some(command))
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

/// Parse a leading field number, returning it with the remaining text
fn parse_handle<'a>(command: &'static str, input: &'a str) -> Result<(Handle, &'a str), CommandError> {
    let (word, rest) = split_word(input);
    if word.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            what: "a field number",
        });
    }
    match word.parse::<Handle>() {
        Ok(n) if n > 0 => Ok((n, rest)),
        _ => Err(CommandError::BadHandle(word.to_string())),
    }
}

pub const HELP: &str = "\
Commands:
  add                  add a root field
  prop <n>             add a property to object field n
  item <n>             add the item type of array field n
  name <n> [text]      rename field n (unnamed fields stay out of the schema)
  type <n> <type>      change the type of field n
                       (string, number, boolean, object, array, null)
  desc <n> [text]      set or clear the description of field n
  req <n> [on|off]     mark field n required (toggles without argument)
  rm <n>               delete field n and everything under it
  ls                   show the field outline
  schema               generate the JSON Schema
  export [path]        write the last generated schema to a file
  help                 show this help
  quit                 leave the editor";
