use strum::IntoEnumIterator;

use crate::{
    data::{
        config::{AnalysisConfig, DatasetConfig},
        domain::Network,
    },
    error::LvrLabResult,
    report::{
        daily::DailyLvr,
        io::Report,
        ledger::RangeLedger,
        tam::{TamSeries, TamSummary},
        volume::VolumeBook,
    },
};

/// Runs the analysis over every network of one dataset directory.
///
/// The pipeline owns no data. Each [`AnalysisPipeline::run`] call loads the
/// dataset pair of every network, derives its reports and hands everything
/// back in a [`PipelineRun`].
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    dataset: DatasetConfig,
    analysis: AnalysisConfig,
}

/// Everything derived for a single network.
#[derive(Debug, Clone)]
pub struct NetworkRun {
    pub network: Network,
    pub ledger: RangeLedger,
    pub volume: VolumeBook,
    pub daily_lvr: DailyLvr,
    pub tam: TamSeries,
}

/// The result of a full pipeline run, in processing order.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub networks: Vec<NetworkRun>,
    pub tam_summary: TamSummary,
}

impl AnalysisPipeline {
    pub fn new(dataset: DatasetConfig) -> Self {
        Self {
            dataset,
            analysis: AnalysisConfig::default(),
        }
    }

    pub fn with_analysis(self, analysis: AnalysisConfig) -> Self {
        Self { analysis, ..self }
    }

    pub fn analysis(&self) -> AnalysisConfig {
        self.analysis
    }

    pub fn dataset(&self) -> &DatasetConfig {
        &self.dataset
    }

    /// Processes every network in the fixed [`Network::iter`] order.
    ///
    /// A failure on any network aborts the run. Missing dataset files are
    /// a configuration problem, not a condition to paper over.
    #[tracing::instrument(skip_all, fields(data_dir = %self.dataset.data_dir().display()))]
    pub fn run(&self) -> LvrLabResult<PipelineRun> {
        tracing::info!("Starting dataset analysis");

        let mut networks = Vec::with_capacity(Network::iter().count());
        for network in Network::iter() {
            networks.push(self.run_network(network)?);
        }

        let per_network: Vec<(Network, TamSeries)> = networks
            .iter()
            .map(|run| (run.network, run.tam.clone()))
            .collect();
        let tam_summary = TamSummary::new(&per_network)?;

        tracing::info!("Dataset analysis complete");

        Ok(PipelineRun {
            networks,
            tam_summary,
        })
    }

    /// Loads the dataset pair of `network` and derives its TAM series.
    #[tracing::instrument(skip_all, fields(network = %network))]
    pub fn run_network(&self, network: Network) -> LvrLabResult<NetworkRun> {
        tracing::info!("Loading dataset pair");

        let ledger =
            RangeLedger::from_csv(self.dataset.price_range_path(network), self.analysis)?;
        let volume = VolumeBook::from_csv(self.dataset.volume_path(network))?;

        let daily_lvr = ledger.daily_lvr()?;
        let tam = TamSeries::new(&daily_lvr, &volume, self.analysis.tam_join())?;

        tracing::info!(
            ledger_rows = ledger.as_df().height(),
            volume_rows = volume.as_df().height(),
            tam_days = tam.as_df().height(),
            "Network analysis complete"
        );

        Ok(NetworkRun {
            network,
            ledger,
            volume,
            daily_lvr,
            tam,
        })
    }
}
