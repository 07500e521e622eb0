//! Module `commands`
//!
//! Parses command-line arguments into the `Command` enum.

use crate::storage::CreationCollisionOption;

/// A single CLI invocation.
///
/// `None` for a collision option means "use the configured default".
#[derive(Debug, PartialEq)]
pub enum Command {
    List(Option<String>),
    Files(Option<String>),
    Folders(Option<String>),
    Stat(String),
    Touch(String, Option<CreationCollisionOption>),
    Mkdir(String, Option<CreationCollisionOption>),
    Cat(String),
    Write(String, String),
    Remove(String),
    Move(String, String, Option<CreationCollisionOption>),
    Help,
    Unknown(String),
}

pub const USAGE: &str = "\
usage: folder <command> [args]

  ls [path]                       list files and folders
  files [path]                    list files only
  folders [path]                  list folders only
  stat <path>                     show item properties
  touch <path> [policy]           create a file
  mkdir <path> [policy]           create a folder
  cat <path>                      print a file
  write <path> <text>             replace a file's content
  rm <path>                       delete a file or folder
  mv <path> <new-name> [policy]   rename within the same folder

policy: fail | replace | unique | open";

/// Parses the arguments following the program name.
///
/// Returns `Unknown` when a known command is misused.
pub fn parse_command(args: &[String]) -> Command {
    let raw = args.join(" ");
    let Some((cmd, rest)) = args.split_first() else {
        return Command::Help;
    };
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

    let optional_policy = |arg: Option<&&str>| -> Result<Option<CreationCollisionOption>, ()> {
        match arg {
            None => Ok(None),
            Some(s) => s.parse().map(Some).map_err(|_| ()),
        }
    };

    match (cmd.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("help" | "-h" | "--help", []) => Command::Help,
        ("ls", []) => Command::List(None),
        ("ls", [path]) => Command::List(Some(path.to_string())),
        ("files", []) => Command::Files(None),
        ("files", [path]) => Command::Files(Some(path.to_string())),
        ("folders", []) => Command::Folders(None),
        ("folders", [path]) => Command::Folders(Some(path.to_string())),
        ("stat", [path]) => Command::Stat(path.to_string()),
        ("cat", [path]) => Command::Cat(path.to_string()),
        ("rm", [path]) => Command::Remove(path.to_string()),
        ("write", [path, text @ ..]) if !text.is_empty() => {
            Command::Write(path.to_string(), text.join(" "))
        }
        ("touch", [path, policy @ ..]) if policy.len() <= 1 => {
            match optional_policy(policy.first()) {
                Ok(option) => Command::Touch(path.to_string(), option),
                Err(()) => Command::Unknown(raw),
            }
        }
        ("mkdir", [path, policy @ ..]) if policy.len() <= 1 => {
            match optional_policy(policy.first()) {
                Ok(option) => Command::Mkdir(path.to_string(), option),
                Err(()) => Command::Unknown(raw),
            }
        }
        ("mv", [path, name, policy @ ..]) if policy.len() <= 1 => {
            match optional_policy(policy.first()) {
                Ok(option) => Command::Move(path.to_string(), name.to_string(), option),
                Err(()) => Command::Unknown(raw),
            }
        }
        _ => Command::Unknown(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_listing_commands() {
        assert_eq!(parse_command(&args("ls")), Command::List(None));
        assert_eq!(
            parse_command(&args("LS docs")),
            Command::List(Some("docs".to_string()))
        );
        assert_eq!(parse_command(&args("files")), Command::Files(None));
        assert_eq!(
            parse_command(&args("folders a/b")),
            Command::Folders(Some("a/b".to_string()))
        );
    }

    #[test]
    fn test_parse_commands_with_policy() {
        assert_eq!(
            parse_command(&args("touch a.txt")),
            Command::Touch("a.txt".to_string(), None)
        );
        assert_eq!(
            parse_command(&args("touch a.txt replace")),
            Command::Touch(
                "a.txt".to_string(),
                Some(CreationCollisionOption::ReplaceExisting)
            )
        );
        assert_eq!(
            parse_command(&args("mkdir docs open")),
            Command::Mkdir("docs".to_string(), Some(CreationCollisionOption::OpenIfExists))
        );
        assert_eq!(
            parse_command(&args("mv a.txt b.txt unique")),
            Command::Move(
                "a.txt".to_string(),
                "b.txt".to_string(),
                Some(CreationCollisionOption::GenerateUniqueName)
            )
        );
    }

    #[test]
    fn test_parse_write_joins_text() {
        assert_eq!(
            parse_command(&args("write notes.txt hello there")),
            Command::Write("notes.txt".to_string(), "hello there".to_string())
        );
    }

    #[test]
    fn test_help_and_unknown() {
        assert_eq!(parse_command(&[]), Command::Help);
        assert_eq!(parse_command(&args("--help")), Command::Help);
        assert_eq!(
            parse_command(&args("touch a.txt sometimes")),
            Command::Unknown("touch a.txt sometimes".to_string())
        );
        assert_eq!(
            parse_command(&args("stat")),
            Command::Unknown("stat".to_string())
        );
        assert_eq!(
            parse_command(&args("FOO bar")),
            Command::Unknown("FOO bar".to_string())
        );
    }
}
