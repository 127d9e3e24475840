use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            api_base_url: env::var("MOODLYPULSE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            data_dir: env::var("MOODLYPULSE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("moodlypulse"))
        .unwrap_or_else(|| PathBuf::from(".moodlypulse"))
}
