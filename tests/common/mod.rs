use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use chatline::config::{Config, ProviderConfig};

/// Provider settings pointing at a mock server, with no API key
#[allow(dead_code)]
pub fn provider_config(api_base: &str) -> ProviderConfig {
    ProviderConfig {
        api_base: api_base.to_string(),
        api_key_env: "CHATLINE_TEST_UNSET_API_KEY".to_string(),
        ..Default::default()
    }
}

/// Full configuration using the mock server and a conversations directory
#[allow(dead_code)]
pub fn chat_config(api_base: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.provider = provider_config(api_base);
    config.chat.conversations_dir = dir.to_path_buf();
    config
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
