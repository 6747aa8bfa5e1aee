use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use scoring::ScoreWeights;
use serde::Deserialize;

use crate::orchestrator::DEFAULT_POSTER_BASE;

/// Directories probed, in order, when `MOVIE_DATA_DIR` is not set
const DATA_DIR_CANDIDATES: [&str; 2] = ["service/data", "data"];

/// Server configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Directory holding movie_features.csv and user_features.csv
    #[serde(default)]
    pub movie_data_dir: Option<PathBuf>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix for poster paths in ranked results
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    #[serde(default = "default_weight_vote_avg")]
    pub weight_vote_avg: f64,

    #[serde(default = "default_weight_popularity")]
    pub weight_popularity: f64,

    #[serde(default = "default_weight_count_log")]
    pub weight_count_log: f64,

    #[serde(default = "default_weight_user_bias")]
    pub weight_user_bias: f64,

    #[serde(default = "default_weight_mean_bias")]
    pub weight_mean_bias: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_poster_base_url() -> String {
    DEFAULT_POSTER_BASE.to_string()
}

fn default_weight_vote_avg() -> f64 {
    ScoreWeights::default().vote_avg
}

fn default_weight_popularity() -> f64 {
    ScoreWeights::default().popularity
}

fn default_weight_count_log() -> f64 {
    ScoreWeights::default().count_log
}

fn default_weight_user_bias() -> f64 {
    ScoreWeights::default().user_bias
}

fn default_weight_mean_bias() -> f64 {
    ScoreWeights::default().mean_bias
}

impl Default for Config {
    fn default() -> Self {
        Self {
            movie_data_dir: None,
            host: default_host(),
            port: default_port(),
            poster_base_url: default_poster_base_url(),
            weight_vote_avg: default_weight_vote_avg(),
            weight_popularity: default_weight_popularity(),
            weight_count_log: default_weight_count_log(),
            weight_user_bias: default_weight_user_bias(),
            weight_mean_bias: default_weight_mean_bias(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if any)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Feature directory: `MOVIE_DATA_DIR` if set, else the first candidate
    /// directory that exists, else `service/data`
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.movie_data_dir {
            return dir.clone();
        }
        resolve_data_dir(Path::new("."))
    }

    pub fn weights(&self) -> ScoreWeights {
        ScoreWeights {
            vote_avg: self.weight_vote_avg,
            popularity: self.weight_popularity,
            count_log: self.weight_count_log,
            user_bias: self.weight_user_bias,
            mean_bias: self.weight_mean_bias,
        }
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}: {}", addr, e))
    }
}

/// Probe the default data directories relative to `root`
pub fn resolve_data_dir(root: &Path) -> PathBuf {
    DATA_DIR_CANDIDATES
        .iter()
        .find(|candidate| root.join(candidate).is_dir())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_CANDIDATES[0]))
}
