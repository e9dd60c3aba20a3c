//! Main entry point: fetches the hourly snapshots, loads the reference
//! stations and runs the coverage analysis over both.

use crate::analysis::config::CoverageConfig;
use crate::analysis::report::{build_report, CoverageReport};
use crate::error::CoverageError;
use crate::samples::hourly_fetcher::{FetcherConfig, HourlyFetcher, HourlySnapshots};
use crate::stations::station_loader::{StationLoader, StationSource};
use crate::types::station::ReferenceStation;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

/// Runs coverage analyses against the live hourly snapshots.
///
/// Create an instance with [`BalloonCoverage::new()`] (default cache directory),
/// [`BalloonCoverage::with_cache_folder()`], or [`BalloonCoverage::configured()`]
/// to also override the analysis and retrieval settings.
///
/// # Examples
///
/// ```no_run
/// # use balloon_coverage::{BalloonCoverage, CoverageError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), CoverageError> {
/// let coverage = BalloonCoverage::new().await?;
/// let report = coverage.analyze().call().await?;
/// println!(
///     "{:.1}% of positions are in observation gaps",
///     report.statistics.unique_coverage_percentage
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BalloonCoverage {
    fetcher: HourlyFetcher,
    station_loader: StationLoader,
    config: CoverageConfig,
}

#[bon]
impl BalloonCoverage {
    /// Creates a client with custom settings. Anything left out uses its default.
    ///
    /// # Errors
    ///
    /// Returns [`CoverageError::InvalidConfig`] if `config` does not validate,
    /// [`CoverageError::CacheDirResolution`] if no cache folder was given and the
    /// system one cannot be found, and [`CoverageError::CacheDirCreation`] if the
    /// cache folder cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use balloon_coverage::{BalloonCoverage, CoverageConfig, CoverageError, FetcherConfig};
    /// # use std::time::Duration;
    /// # async fn run() -> Result<(), CoverageError> {
    /// let coverage = BalloonCoverage::configured()
    ///     .config(CoverageConfig::builder().gap_threshold_km(150.0).build())
    ///     .fetcher_config(
    ///         FetcherConfig::builder()
    ///             .request_timeout(Duration::from_secs(5))
    ///             .build(),
    ///     )
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn configured(
        cache_folder: Option<PathBuf>,
        config: Option<CoverageConfig>,
        fetcher_config: Option<FetcherConfig>,
    ) -> Result<Self, CoverageError> {
        let config = config.unwrap_or_default();
        config.validate()?;

        let cache_folder = match cache_folder {
            Some(folder) => folder,
            None => get_cache_dir().map_err(CoverageError::CacheDirResolution)?,
        };
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| CoverageError::CacheDirCreation(cache_folder.clone(), e))?;

        Ok(Self {
            fetcher: HourlyFetcher::new(fetcher_config.unwrap_or_default()),
            station_loader: StationLoader::new(&cache_folder),
            config,
        })
    }

    /// Creates a client with default settings that caches into `cache_folder`.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, CoverageError> {
        Self::configured().cache_folder(cache_folder).call().await
    }

    /// Creates a client with default settings, caching under the system cache
    /// directory (e.g. `~/.cache/balloon_coverage_cache` on Linux).
    pub async fn new() -> Result<Self, CoverageError> {
        Self::configured().call().await
    }

    pub fn config(&self) -> &CoverageConfig {
        &self.config
    }

    /// Fetches every hourly snapshot. Never fails; per-hour failures are in the result.
    pub async fn fetch_snapshots(&self) -> HourlySnapshots {
        self.fetcher.fetch_all_hours().await
    }

    pub async fn load_stations(
        &self,
        source: &StationSource,
    ) -> Result<Vec<ReferenceStation>, CoverageError> {
        Ok(self.station_loader.load(source).await?)
    }

    /// Drops the cached station list so the next load re-reads the source.
    pub async fn clear_station_cache(&self, source: &StationSource) -> Result<(), CoverageError> {
        Ok(self.station_loader.clear_cache(source).await?)
    }

    /// Fetches the snapshots and the station list concurrently, then reconstructs
    /// paths and computes coverage statistics on a blocking thread.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.stations(StationSource)`: Optional. Where the station list comes from.
    ///   Defaults to the public IGRA2 station list.
    /// * `.deadline(Duration)`: Optional. Upper bound on the whole run.
    ///
    /// # Errors
    ///
    /// Returns [`CoverageError::StationLoad`] if the station list cannot be read,
    /// and [`CoverageError::DeadlineExceeded`] if the run takes longer than `deadline`.
    /// Failing hourly snapshots are not errors; they are listed in the report's
    /// data quality.
    #[builder]
    pub async fn analyze(
        &self,
        stations: Option<StationSource>,
        deadline: Option<Duration>,
    ) -> Result<CoverageReport, CoverageError> {
        let source = stations.unwrap_or_default();
        let config = self.config;

        let run = async {
            let (snapshots, stations) =
                tokio::join!(self.fetch_snapshots(), self.station_loader.load(&source));
            let stations = stations?;
            let report =
                tokio::task::spawn_blocking(move || build_report(&config, &snapshots, stations))
                    .await?;
            Ok::<_, CoverageError>(report)
        };

        let report = match deadline {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| CoverageError::DeadlineExceeded(limit))??,
            None => run.await?,
        };
        info!(
            "Coverage analysis: {} positions, {:.1}% ocean, {:.1}% in gaps",
            report.statistics.total_balloon_positions,
            report.statistics.ocean_percentage,
            report.statistics.unique_coverage_percentage
        );
        Ok(report)
    }
}
