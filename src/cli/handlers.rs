use log::info;
use std::time::UNIX_EPOCH;

use crate::cli::commands::{Command, USAGE};
use crate::error::CliError;
use crate::storage::validation::split_parent;
use crate::storage::{
    CreationCollisionOption, FolderItem, Item, StorageFile, StorageFolder, StorageItem,
};

// Handle a single command against `root`, returning the lines to print
pub async fn handle_command<D: StorageFolder>(
    root: &D,
    command: Command,
    default_option: CreationCollisionOption,
) -> Result<Vec<String>, CliError> {
    match command {
        Command::Help => Ok(USAGE.lines().map(str::to_string).collect()),
        Command::List(path) => handle_cmd_list(root, path.as_deref()).await,
        Command::Files(path) => {
            let folder = open_folder(root, path.as_deref()).await?;
            let files = folder.get_files().await?;
            Ok(files.iter().map(|f| f.name().to_string()).collect())
        }
        Command::Folders(path) => {
            let folder = open_folder(root, path.as_deref()).await?;
            let folders = folder.get_folders().await?;
            Ok(folders.iter().map(|d| format!("{}/", d.name())).collect())
        }
        Command::Stat(path) => handle_cmd_stat(root, &path).await,
        Command::Touch(path, option) => {
            let (parent, name) = open_parent(root, &path).await?;
            let file = parent
                .create_file_with(&name, option.unwrap_or(default_option))
                .await?;
            info!("Created file {}", file.path());
            Ok(vec![file.path().to_string()])
        }
        Command::Mkdir(path, option) => {
            let (parent, name) = open_parent(root, &path).await?;
            let folder = parent
                .create_folder_with(&name, option.unwrap_or(default_option))
                .await?;
            info!("Created folder {}", folder.path());
            Ok(vec![folder.path().to_string()])
        }
        Command::Cat(path) => {
            let text = root.get_file(&path).await?.read_text().await?;
            Ok(text.lines().map(str::to_string).collect())
        }
        Command::Write(path, text) => {
            let file = root.get_file(&path).await?;
            file.write_text(&text).await?;
            Ok(vec![format!("{} bytes written to {}", text.len(), file.path())])
        }
        Command::Remove(path) => {
            let item = root.get_item(&path).await?;
            item.delete().await?;
            Ok(vec![format!("removed {}", item.path())])
        }
        Command::Move(path, new_name, option) => {
            let item = root.get_item(&path).await?;
            let renamed = item
                .rename(&new_name, option.unwrap_or(default_option))
                .await?;
            Ok(vec![format!("{} -> {}", item.path(), renamed.path())])
        }
        Command::Unknown(raw) => Err(CliError::Usage(format!(
            "unrecognized command: {}\n{}",
            raw, USAGE
        ))),
    }
}

async fn open_folder<D: StorageFolder>(root: &D, path: Option<&str>) -> Result<D, CliError> {
    match path {
        None => Ok(root.clone()),
        Some(path) => Ok(root.get_folder(path).await?),
    }
}

async fn open_parent<D: StorageFolder>(root: &D, path: &str) -> Result<(D, String), CliError> {
    let (parent, name) = split_parent(path)?;
    let folder = open_folder(root, parent.as_deref()).await?;
    Ok((folder, name))
}

fn describe<D: StorageFolder>(item: &FolderItem<D>) -> String {
    match item {
        Item::File(file) => file.name().to_string(),
        Item::Folder(folder) => format!("{}/", folder.name()),
    }
}

// Command handler for ls
async fn handle_cmd_list<D: StorageFolder>(
    root: &D,
    path: Option<&str>,
) -> Result<Vec<String>, CliError> {
    let folder = open_folder(root, path).await?;
    let items = folder.get_items().await?;
    Ok(items.iter().map(describe::<D>).collect())
}

// Command handler for stat
async fn handle_cmd_stat<D: StorageFolder>(root: &D, path: &str) -> Result<Vec<String>, CliError> {
    let item = root.get_item(path).await?;
    let properties = item.properties().await?;
    let modified = properties
        .modified
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|dur| dur.as_secs().to_string())
        .unwrap_or_else(|| "-".to_string());

    Ok(vec![
        format!("name: {}", item.name()),
        format!("path: {}", item.path()),
        format!("kind: {}", properties.kind),
        format!("size: {}", properties.size),
        format!("modified: {}", modified),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFolder;

    async fn run(root: &MemoryFolder, line: &str) -> Result<Vec<String>, CliError> {
        let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        handle_command(
            root,
            crate::cli::commands::parse_command(&args),
            CreationCollisionOption::FailIfExists,
        )
        .await
    }

    #[tokio::test]
    async fn test_touch_write_cat() {
        let root = MemoryFolder::new_root("test");
        run(&root, "mkdir docs").await.unwrap();
        assert_eq!(run(&root, "touch docs/a.txt").await.unwrap(), vec!["/docs/a.txt"]);
        run(&root, "write docs/a.txt hello world").await.unwrap();
        assert_eq!(run(&root, "cat docs/a.txt").await.unwrap(), vec!["hello world"]);
    }

    #[tokio::test]
    async fn test_list_marks_folders() {
        let root = MemoryFolder::new_root("test");
        run(&root, "mkdir docs").await.unwrap();
        run(&root, "touch a.txt").await.unwrap();

        assert_eq!(run(&root, "ls").await.unwrap(), vec!["a.txt", "docs/"]);
        assert_eq!(run(&root, "files").await.unwrap(), vec!["a.txt"]);
        assert_eq!(run(&root, "folders").await.unwrap(), vec!["docs/"]);
    }

    #[tokio::test]
    async fn test_collision_uses_default_then_override() {
        let root = MemoryFolder::new_root("test");
        run(&root, "touch a.txt").await.unwrap();

        assert!(matches!(
            run(&root, "touch a.txt").await,
            Err(CliError::Storage(_))
        ));
        assert_eq!(
            run(&root, "touch a.txt unique").await.unwrap(),
            vec!["/a (2).txt"]
        );
    }

    #[tokio::test]
    async fn test_move_and_remove() {
        let root = MemoryFolder::new_root("test");
        run(&root, "touch a.txt").await.unwrap();

        assert_eq!(
            run(&root, "mv a.txt b.txt").await.unwrap(),
            vec!["/a.txt -> /b.txt"]
        );
        run(&root, "rm b.txt").await.unwrap();
        assert!(run(&root, "ls").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stat_reports_kind_and_size() {
        let root = MemoryFolder::new_root("test");
        run(&root, "touch a.txt").await.unwrap();
        run(&root, "write a.txt abc").await.unwrap();

        let lines = run(&root, "stat a.txt").await.unwrap();
        assert!(lines.contains(&"kind: file".to_string()));
        assert!(lines.contains(&"size: 3".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_is_usage_error() {
        let root = MemoryFolder::new_root("test");
        assert!(matches!(
            run(&root, "frobnicate").await,
            Err(CliError::Usage(_))
        ));
    }
}
