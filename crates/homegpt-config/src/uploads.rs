use std::path::PathBuf;

use serde::Deserialize;

/// Default upload size ceiling (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Audio upload storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadConfig {
    /// Directory uploaded files are written to, created on demand
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Largest accepted file, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Model recorded on the upload when the form omits one
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            max_file_size: default_max_file_size(),
            default_model: default_model(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("temp")
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_file_size() -> usize {
    DEFAULT_MAX_FILE_SIZE
}

fn default_model() -> String {
    "mistral".to_owned()
}
