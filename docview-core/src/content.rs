use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use ureq::Agent;

/// Characters escaped inside one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Which documentation set a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocSet {
    Public,
    Internal,
}

impl DocSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocSet::Public => "public",
            DocSet::Internal => "internal",
        }
    }
}

impl fmt::Display for DocSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(DocSet::Public),
            "internal" => Ok(DocSet::Internal),
            other => Err(format!("unknown document set '{other}', expected public or internal")),
        }
    }
}

/// A document asked for by the reader: the set plus the path inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocRequest {
    pub docset: DocSet,
    pub path: String,
}

impl DocRequest {
    pub fn new(docset: DocSet, path: impl Into<String>) -> Self {
        Self {
            docset,
            path: path.into(),
        }
    }

    /// Path inside the set without surrounding slashes.
    pub fn remainder(&self) -> &str {
        self.path.trim_matches('/')
    }

    /// `/<prefix>/<docset>/<remainder>`, the logical location of the document.
    ///
    /// Relative images resolve against this path.
    pub fn locator(&self, prefix: &str) -> String {
        let prefix = prefix.trim_matches('/');
        let mut locator = String::with_capacity(prefix.len() + self.path.len() + 16);
        if !prefix.is_empty() {
            locator.push('/');
            locator.push_str(prefix);
        }
        locator.push('/');
        locator.push_str(self.docset.as_str());
        locator.push('/');
        locator.push_str(self.remainder());
        locator
    }

    /// Locator of the source file: [`locator`](Self::locator) plus
    /// `.<extension>` unless the last segment already ends with it.
    pub fn source_locator(&self, prefix: &str, extension: Option<&str>) -> String {
        let mut locator = self.locator(prefix);
        if let Some(ext) = extension.map(|e| e.trim_start_matches('.')).filter(|e| !e.is_empty()) {
            let last = locator.rsplit('/').next().unwrap_or_default();
            let has_ext = Path::new(last)
                .extension()
                .is_some_and(|current| current.eq_ignore_ascii_case(ext));
            if !last.is_empty() && !has_ext {
                locator.push('.');
                locator.push_str(ext);
            }
        }
        locator
    }

    /// Route path as it appears in the browser, `/<docset>/<remainder>`.
    pub fn route(&self) -> String {
        format!("/{}/{}", self.docset, self.remainder())
    }
}

/// A document could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not load document {locator}: {reason}")]
pub struct FetchError {
    pub locator: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}

/// Read-only source of raw document text.
pub trait ContentStore {
    fn fetch(&self, locator: &str) -> Result<String, FetchError>;
}

impl<S: ContentStore + ?Sized> ContentStore for &S {
    fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        (**self).fetch(locator)
    }
}

impl<S: ContentStore + ?Sized> ContentStore for Box<S> {
    fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        (**self).fetch(locator)
    }
}

/// Documents stored under a local directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, locator: &str) -> Option<PathBuf> {
        let relative = Path::new(locator.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        safe.then(|| self.root.join(relative))
    }
}

impl ContentStore for FsStore {
    fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        let Some(path) = self.resolve(locator) else {
            return Err(FetchError::new(locator, "Forbidden"));
        };

        tracing::debug!(path = %path.display(), "reading document");
        std::fs::read_to_string(&path).map_err(|e| {
            let reason = match e.kind() {
                std::io::ErrorKind::NotFound => "Not Found".to_string(),
                std::io::ErrorKind::PermissionDenied => "Forbidden".to_string(),
                _ => e.to_string(),
            };
            FetchError::new(locator, reason)
        })
    }
}

/// Documents served over HTTP from a static host.
pub struct HttpStore {
    agent: Agent,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Full URL for a locator, each path segment percent-encoded.
    ///
    /// Segments are decoded first, so already encoded locators are not
    /// encoded twice.
    pub fn url_for(&self, locator: &str) -> String {
        let mut url = self.base_url.clone();
        for segment in locator.trim_start_matches('/').split('/') {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            url.push('/');
            url.extend(utf8_percent_encode(&decoded, PATH_SEGMENT));
        }
        url
    }
}

impl ContentStore for HttpStore {
    fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        let url = self.url_for(locator);
        tracing::debug!(%url, "requesting document");

        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| FetchError::new(locator, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(FetchError::new(locator, reason));
        }

        response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::new(locator, e.to_string()))
    }
}
