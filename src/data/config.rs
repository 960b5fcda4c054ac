use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    data::domain::{Network, TamJoinMode},
    error::{ConfigError, LvrLabResult},
};

// ================================================================================================
// Analysis Configuration
// ================================================================================================

const DEFAULT_TOP_POOL_COUNT: usize = 10;

/// Tuning knobs for the derived analysis tables.
///
/// Carried by the ledger so every report derived from it sees the same
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// How many longest-active pools the leaderboard keeps.
    ///
    /// Must be strictly positive (> 0). If fewer pools exist, all of them
    /// are reported.
    top_pool_count: usize,

    /// How the TAM join treats dates present in only one input.
    ///
    /// Defaults to [`TamJoinMode::Inner`], the reference behavior.
    tam_join: TamJoinMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_pool_count: DEFAULT_TOP_POOL_COUNT,
            tam_join: TamJoinMode::default(),
        }
    }
}

impl AnalysisConfig {
    /// Creates a new config with the mandatory leaderboard size.
    ///
    /// # Validation
    /// Returns an error if `top_pool_count` is 0.
    pub fn new(top_pool_count: usize) -> LvrLabResult<Self> {
        if top_pool_count == 0 {
            return Err(ConfigError::InvalidAnalysisConfig(
                "Top pool count must be positive (> 0)".to_string(),
            )
            .into());
        }

        Ok(Self {
            top_pool_count,
            ..Default::default()
        })
    }

    pub fn with_tam_join(self, tam_join: TamJoinMode) -> Self {
        Self { tam_join, ..self }
    }

    pub fn top_pool_count(&self) -> usize {
        self.top_pool_count
    }

    pub fn tam_join(&self) -> TamJoinMode {
        self.tam_join
    }
}

// ================================================================================================
// Dataset Configuration
// ================================================================================================

/// Locates the per-network dataset files inside one data directory.
///
/// # Layout
/// For a directory `D` and network `n` the expected files are:
/// - price ranges: `D/{n}.csv`
/// - daily volume: `D/{n}_volume.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    data_dir: PathBuf,
}

impl DatasetConfig {
    /// Creates a config rooted at `data_dir`.
    ///
    /// # Validation
    /// Returns an error if `data_dir` does not exist or is not a directory.
    /// Individual dataset files are checked later, by the loaders.
    pub fn new(data_dir: impl Into<PathBuf>) -> LvrLabResult<Self> {
        let data_dir = data_dir.into();
        if !data_dir.is_dir() {
            return Err(ConfigError::DataDirNotFound(data_dir.display().to_string()).into());
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the price-range CSV for `network`.
    pub fn price_range_path(&self, network: Network) -> PathBuf {
        self.data_dir.join(format!("{network}.csv"))
    }

    /// Path to the daily-volume CSV for `network`.
    pub fn volume_path(&self, network: Network) -> PathBuf {
        self.data_dir.join(format!("{network}_volume.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LvrLabError;

    // ============================================================================================
    // AnalysisConfig
    // ============================================================================================

    #[test]
    fn test_analysis_config_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.top_pool_count(), 10);
        assert!(config.tam_join().is_inner());
    }

    #[test]
    fn test_analysis_config_rejects_zero_pool_count() {
        let result = AnalysisConfig::new(0);
        assert!(matches!(
            result,
            Err(LvrLabError::Config(ConfigError::InvalidAnalysisConfig(_)))
        ));
    }

    #[test]
    fn test_analysis_config_builders() {
        let config = AnalysisConfig::new(3)
            .expect("3 is a valid pool count")
            .with_tam_join(TamJoinMode::Outer);

        assert_eq!(config.top_pool_count(), 3);
        assert!(config.tam_join().is_outer());
    }

    // ============================================================================================
    // DatasetConfig
    // ============================================================================================

    #[test]
    fn test_dataset_config_derives_network_paths() {
        let config = DatasetConfig::new(env!("CARGO_MANIFEST_DIR"))
            .expect("manifest dir always exists");

        let price = config.price_range_path(Network::Base);
        let volume = config.volume_path(Network::Base);

        assert!(price.ends_with("base.csv"), "got {}", price.display());
        assert!(
            volume.ends_with("base_volume.csv"),
            "got {}",
            volume.display()
        );
    }

    #[test]
    fn test_dataset_config_rejects_missing_dir() {
        let result = DatasetConfig::new("/definitely/not/a/real/dir");
        assert!(matches!(
            result,
            Err(LvrLabError::Config(ConfigError::DataDirNotFound(_)))
        ));
    }
}
