use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub struct Config {
    /// Root holding `data/` and `backups/`.
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolve the data directory from `--data-dir` / `STRIDE_DATA_DIR`, falling back to
    /// the platform data directory, and make sure it exists.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "stride")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config { data_dir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_with_override_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("stride");
        let config = Config::load(Some(dir.clone())).unwrap();
        assert_eq!(config.data_dir, dir);
        assert!(dir.is_dir());
    }
}
