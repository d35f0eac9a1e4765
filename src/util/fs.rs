use async_recursion::async_recursion;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

#[async_recursion]
pub async fn get_all_files(dir_path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dir = fs::read_dir(dir_path).await?;
    let mut files = Vec::new();

    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();

        if path.is_dir() {
            files.append(&mut get_all_files(&path).await?);
        } else {
            files.push(path);
        }
    }

    Ok(files)
}

/// Recursively collects files whose extension matches `extension`
/// (case-insensitive).
pub async fn find_files_with_extension(
    dir_path: &Path,
    extension: &str,
) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<_> = get_all_files(dir_path)
        .await?
        .into_iter()
        .filter(|file| {
            file.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();

    files.sort();

    Ok(files)
}
