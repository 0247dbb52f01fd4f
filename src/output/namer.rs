// Output file naming

use std::path::{Path, PathBuf};

/// Strip characters that are unsafe in file names from a display name
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '(' | ')'))
        .map(|c| match c {
            ',' | ' ' => '_',
            other => other,
        })
        .collect()
}

/// File name of the page documenting `name`
pub fn file_name(name: &str) -> String {
    format!("{}.html", sanitize(name))
}

/// Location of the page documenting `name` inside `dir`
pub fn artifact_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(file_name(name))
}
