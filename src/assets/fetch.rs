use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::Context;
use base64::Engine;
use percent_encoding::percent_decode_str;
use url::{Position, Url};

use crate::foundation::error::{StageError, StageResult};

/// Future returned by [`AssetFetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = StageResult<Vec<u8>>> + Send + 'a>>;

/// Resolves an asset url to its encoded bytes.
///
/// Implementations must be shareable across load tasks.
pub trait AssetFetcher: Send + Sync {
    /// Fetch the bytes behind `url`.
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

/// Options for [`DefaultFetcher`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FetchOpts {
    /// Base directory for relative asset paths.
    pub assets_root: PathBuf,
    /// Permit `http://` and `https://` urls (requires the `http` cargo feature).
    pub allow_http: bool,
}

impl Default for FetchOpts {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("."),
            allow_http: false,
        }
    }
}

impl FetchOpts {
    /// Return options with a different base directory.
    pub fn with_assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = root.into();
        self
    }

    /// Return options with http fetching toggled.
    pub fn with_allow_http(mut self, allow: bool) -> Self {
        self.allow_http = allow;
        self
    }
}

#[derive(Debug, PartialEq, Eq)]
enum AssetSource {
    /// Everything after `data:`.
    Data(String),
    File(PathBuf),
    Http(Url),
}

fn classify(url: &str, root: &Path) -> StageResult<AssetSource> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(StageError::validation("asset url must be non-empty"));
    }
    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            return Ok(AssetSource::File(root.join(trimmed)));
        }
        Err(e) => {
            return Err(StageError::validation(format!(
                "invalid asset url '{trimmed}': {e}"
            )));
        }
    };
    let scheme = parsed.scheme().to_ascii_lowercase();
    match scheme.as_str() {
        "data" => Ok(AssetSource::Data(
            parsed[Position::BeforePath..Position::AfterQuery].to_owned(),
        )),
        "file" => parsed
            .to_file_path()
            .map(AssetSource::File)
            .map_err(|()| StageError::validation(format!("file url '{trimmed}' has no local path"))),
        "http" | "https" => Ok(AssetSource::Http(parsed)),
        scheme => Err(StageError::validation(format!(
            "unsupported asset url scheme '{scheme}'"
        ))),
    }
}

/// Decode the part of a `data:` URI after the scheme.
pub(crate) fn decode_data_uri(rest: &str) -> StageResult<Vec<u8>> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StageError::validation("data uri is missing ','"))?;
    let payload: Vec<u8> = percent_decode_str(payload).collect();
    if header.to_ascii_lowercase().ends_with(";base64") {
        let compact: Vec<u8> = payload
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        return base64::engine::general_purpose::STANDARD
            .decode(compact)
            .context("decode base64 data uri payload")
            .map_err(StageError::from);
    }
    Ok(payload)
}

/// Fetcher for `data:` URIs, local files, and (with the `http` feature) remote urls.
#[derive(Clone, Debug)]
pub struct DefaultFetcher {
    opts: FetchOpts,
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl DefaultFetcher {
    /// Create a fetcher.
    pub fn new(opts: FetchOpts) -> Self {
        Self {
            opts,
            #[cfg(feature = "http")]
            client: reqwest::Client::new(),
        }
    }

    /// Options this fetcher was created with.
    pub fn opts(&self) -> &FetchOpts {
        &self.opts
    }

    async fn fetch_inner(&self, url: &str) -> StageResult<Vec<u8>> {
        match classify(url, &self.opts.assets_root)? {
            AssetSource::Data(rest) => decode_data_uri(&rest),
            AssetSource::File(path) => tokio::fs::read(&path)
                .await
                .with_context(|| format!("read asset bytes from '{}'", path.display()))
                .map_err(StageError::from),
            AssetSource::Http(url) => self.fetch_http(&url).await,
        }
    }

    #[cfg(feature = "http")]
    async fn fetch_http(&self, url: &Url) -> StageResult<Vec<u8>> {
        if !self.opts.allow_http {
            return Err(StageError::validation(format!(
                "http asset fetching is disabled: '{url}'"
            )));
        }
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request '{url}'"))?
            .error_for_status()
            .with_context(|| format!("request '{url}'"))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("read response body of '{url}'"))?;
        Ok(body.to_vec())
    }

    #[cfg(not(feature = "http"))]
    async fn fetch_http(&self, url: &Url) -> StageResult<Vec<u8>> {
        Err(StageError::validation(format!(
            "cannot fetch '{url}': built without the `http` feature"
        )))
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new(FetchOpts::default())
    }
}

impl AssetFetcher for DefaultFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(self.fetch_inner(url))
    }
}

/// Serves bytes from an in-memory map keyed by url.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    /// Empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an entry.
    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(url.into(), bytes.into());
    }

    /// Builder form of [`MemoryFetcher::insert`].
    pub fn with(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        let res = self
            .entries
            .get(url)
            .cloned()
            .ok_or_else(|| StageError::Other(anyhow::anyhow!("no asset registered for '{url}'")));
        Box::pin(std::future::ready(res))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
