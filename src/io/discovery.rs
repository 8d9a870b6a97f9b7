//! Finding input images on disk.

use crate::core::config::UpscaleConfig;
use crate::core::error::{PixupError, PixupResult};
use std::path::{Path, PathBuf};

/// List the files under `config.input_dir` that the upscaler should pick up.
///
/// A file qualifies when its extension is one of `config.extensions` and its
/// name matches `config.pattern`. Subfolders are only searched when
/// `config.recursive` is set. The result is sorted.
pub fn discover(config: &UpscaleConfig) -> PixupResult<Vec<PathBuf>> {
    let root = &config.input_dir;
    if !root.is_dir() {
        return Err(PixupError::Scan {
            path: root.clone(),
            error: "not a directory".to_string(),
        });
    }

    let pattern = glob::Pattern::new(&config.pattern).map_err(|e| PixupError::Pattern {
        pattern: config.pattern.clone(),
        error: e.to_string(),
    })?;

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(root).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if is_candidate(entry.path(), config, &pattern) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    log::debug!("Discovered {} candidate(s) in {}", files.len(), root.display());
    Ok(files)
}

fn is_candidate(path: &Path, config: &UpscaleConfig, pattern: &glob::Pattern) -> bool {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !config.accepts_extension(extension) {
        return false;
    }
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    pattern.matches(filename)
}

/// Where the upscaled copy of `input` goes.
///
/// The file keeps its name; its position relative to `input_dir` is
/// mirrored under `output_dir`.
pub fn output_path_for(input: &Path, config: &UpscaleConfig) -> PathBuf {
    match input.strip_prefix(&config.input_dir) {
        Ok(relative) => config.output_dir.join(relative),
        Err(_) => config
            .output_dir
            .join(input.file_name().unwrap_or(input.as_os_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discover_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.JPG"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("nested/c.gif"));

        let config = UpscaleConfig::new().with_input_dir(dir.path());
        let files = discover(&config).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png"]);
    }

    #[test]
    fn test_discover_recursive_and_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("sprite_1.png"));
        touch(&dir.path().join("tile.png"));
        touch(&dir.path().join("deep/sprite_2.gif"));

        let mut config = UpscaleConfig::new()
            .with_input_dir(dir.path())
            .with_pattern("sprite_*");
        config.recursive = true;

        let files = discover(&config).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("sprite_")));
    }

    #[test]
    fn test_discover_missing_dir() {
        let config = UpscaleConfig::new().with_input_dir("/no/such/folder");
        assert!(matches!(discover(&config), Err(PixupError::Scan { .. })));
    }

    #[test]
    fn test_output_path_mirrors_layout() {
        let config = UpscaleConfig::new()
            .with_input_dir("in")
            .with_output_dir("out");
        assert_eq!(
            output_path_for(Path::new("in/sub/a.png"), &config),
            PathBuf::from("out/sub/a.png")
        );
        assert_eq!(
            output_path_for(Path::new("elsewhere/b.gif"), &config),
            PathBuf::from("out/b.gif")
        );
    }
}
