//! Shared file collection utilities for CLI commands.

use std::path::{Path, PathBuf};

/// Extension of Vela source files.
pub const SOURCE_EXTENSION: &str = "vela";

/// Collect all .vela source files from the given paths (files or directories).
///
/// Files named explicitly are kept whatever their extension. The result is
/// sorted so output order does not depend on the file system.
pub fn collect_vela_files(paths: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            collect_vela_in_dir(path, &mut files)?;
        } else {
            anyhow::bail!("no such file or directory: {}", path_str);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Recursively collect .vela files in a directory.
fn collect_vela_in_dir(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        // Skip hidden and build output directories
        if path.is_dir() {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if name_str.starts_with('.') || name_str == "target" {
                continue;
            }
            collect_vela_in_dir(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vela-files-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_collects_nested_sources() {
        let dir = scratch_dir("nested");
        std::fs::create_dir_all(dir.join("lib/util")).unwrap();
        std::fs::create_dir_all(dir.join(".hidden")).unwrap();
        std::fs::create_dir_all(dir.join("target")).unwrap();
        for file in [
            "main.vela",
            "notes.txt",
            "lib/util/strings.vela",
            ".hidden/skip.vela",
            "target/skip.vela",
        ] {
            std::fs::write(dir.join(file), "pass\n").unwrap();
        }

        let files = collect_vela_files(&[dir.display().to_string()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(&dir).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from("lib/util/strings.vela"), PathBuf::from("main.vela")]
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_explicit_file_is_kept() {
        let dir = scratch_dir("explicit");
        let file = dir.join("script.txt");
        std::fs::write(&file, "pass\n").unwrap();

        let files = collect_vela_files(&[file.display().to_string()]).unwrap();
        assert_eq!(files, vec![file]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        assert!(collect_vela_files(&["/nonexistent/src".to_string()]).is_err());
    }
}
