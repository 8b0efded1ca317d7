// src/file.rs

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Create `dir` (and parents) unless it already exists as a directory.
pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Make sure the directory a file will be written into exists.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory(parent),
        _ => Ok(()),
    }
}

pub fn normalize_separators(p: &str) -> String {
    let sep = std::path::MAIN_SEPARATOR;
    p.chars().map(|c| if c == '/' || c == '\\' { sep } else { c }).collect()
}

/// User-supplied path from the command line, with either separator style.
pub fn normalize_user_path(p: &str) -> PathBuf {
    PathBuf::from(normalize_separators(p.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_separator_styles_normalize() {
        let sep = std::path::MAIN_SEPARATOR;
        assert_eq!(normalize_separators("out/a\\b"), format!("out{sep}a{sep}b"));
    }

    #[test]
    fn creates_nested_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a").join("b").join("file.csv");
        ensure_parent(&target).unwrap();
        assert!(tmp.path().join("a").join("b").is_dir());
    }

    #[test]
    fn refuses_file_in_the_way() {
        let tmp = tempfile::tempdir().unwrap();
        let f = tmp.path().join("taken");
        fs::write(&f, "x").unwrap();
        assert!(ensure_directory(&f).is_err());
    }
}
