//! Loads the reference station list from a file or URL and caches the parsed
//! result as bincode, so the fixed-width text is parsed once per source.

use crate::stations::error::StationLoadError;
use crate::stations::station_list::parse_station_list;
use crate::types::station::ReferenceStation;
use async_compression::tokio::bufread::GzipDecoder;
use bincode::config::{Configuration, Fixint, LittleEndian};
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::Client;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

pub const DEFAULT_STATION_LIST_URL: &str =
    "https://www.ncei.noaa.gov/data/integrated-global-radiosonde-archive/doc/igra2-station-list.txt";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Where the fixed-width station list comes from. URLs ending in `.gz` are
/// decompressed while downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationSource {
    File(PathBuf),
    Url(String),
}

impl Default for StationSource {
    fn default() -> Self {
        StationSource::Url(DEFAULT_STATION_LIST_URL.to_string())
    }
}

impl StationSource {
    /// File name of the bincode cache for this source, derived from the full
    /// path or URL so that same-named lists from different places do not
    /// share a cache.
    fn cache_file_name(&self) -> String {
        let raw = match self {
            StationSource::File(path) => path.to_string_lossy().into_owned(),
            StationSource::Url(url) => url.clone(),
        };
        let key: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("stations_{}.bin", key)
    }
}

#[derive(Debug, Clone)]
pub struct StationLoader {
    cache_dir: PathBuf,
    client: Client,
}

impl StationLoader {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            client: Client::new(),
        }
    }

    pub fn cache_file(&self, source: &StationSource) -> PathBuf {
        self.cache_dir.join(source.cache_file_name())
    }

    /// Returns the parsed stations for `source`, from the cache when present.
    pub async fn load(&self, source: &StationSource) -> Result<Vec<ReferenceStation>, StationLoadError> {
        let cache_file = self.cache_file(source);

        if tokio::fs::try_exists(&cache_file).await.unwrap_or(false) {
            info!("Station cache hit at {}", cache_file.display());
            let path_clone = cache_file.clone();
            return tokio::task::spawn_blocking(move || Self::get_cached_stations(&path_clone))
                .await?;
        }

        warn!(
            "Station cache miss for {:?}. Reading and parsing the station list.",
            source
        );
        let raw = match source {
            StationSource::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| StationLoadError::SourceRead(path.clone(), e))?,
            StationSource::Url(url) => self.download(url).await?,
        };

        let parse_start = std::time::Instant::now();
        let stations = tokio::task::spawn_blocking(move || {
            parse_station_list(&String::from_utf8_lossy(&raw))
        })
        .await?;
        info!(
            "Parsed {} stations in {:?}",
            stations.len(),
            parse_start.elapsed()
        );

        Self::cache_stations(stations.clone(), &cache_file).await?;
        Ok(stations)
    }

    /// Removes the cached list for `source`, if any.
    pub async fn clear_cache(&self, source: &StationSource) -> Result<(), StationLoadError> {
        let cache_file = self.cache_file(source);
        match tokio::fs::remove_file(&cache_file).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StationLoadError::CacheDelete(cache_file, e)),
        }
    }

    fn get_cached_stations(cache_path: &Path) -> Result<Vec<ReferenceStation>, StationLoadError> {
        let bytes = std::fs::read(cache_path)
            .map_err(|e| StationLoadError::CacheRead(cache_path.to_path_buf(), e))?;
        let (decoded_stations, _) =
            bincode::serde::decode_from_slice::<Vec<ReferenceStation>, _>(&bytes, BINCODE_CONFIG)
                .map_err(|e| {
                    StationLoadError::CacheDecode(cache_path.to_path_buf(), Box::from(e))
                })?;
        Ok(decoded_stations)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, StationLoadError> {
        info!("Downloading station list from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StationLoadError::NetworkRequest(url.to_string(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    StationLoadError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    StationLoadError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let stream = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        let mut stream_reader = BufReader::new(StreamReader::new(stream));
        let mut raw = Vec::new();
        if url.ends_with(".gz") {
            GzipDecoder::new(stream_reader).read_to_end(&mut raw).await?;
        } else {
            stream_reader.read_to_end(&mut raw).await?;
        }
        info!("Downloaded station list ({} bytes)", raw.len());
        Ok(raw)
    }

    async fn cache_stations(
        stations: Vec<ReferenceStation>,
        cache_path: &Path,
    ) -> Result<(), StationLoadError> {
        let bincode_data = tokio::task::spawn_blocking(move || {
            bincode::serde::encode_to_vec(stations, BINCODE_CONFIG)
                .map_err(|e| StationLoadError::CacheEncode(Box::new(e)))
        })
        .await??;
        if let Some(parent) = cache_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StationLoadError::CacheWrite(cache_path.to_path_buf(), e))?;
        }
        tokio::fs::write(cache_path, &bincode_data)
            .await
            .map_err(|e| StationLoadError::CacheWrite(cache_path.to_path_buf(), e))?;
        info!(
            "Wrote station cache ({} bytes) to {}",
            bincode_data.len(),
            cache_path.display()
        );
        Ok(())
    }
}
