//! The URL builder and its options.

use crate::{error::Error, pct_enc, query, space::SpaceEncoding, uri::Uri};
use core::fmt;
use std::{
    collections::{HashMap, HashSet},
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options to create a [`Builder`] with.
///
/// | field                    | default  |
/// |--------------------------|----------|
/// | `url`                    | `""`     |
/// | `restrict_scheme`        | empty    |
/// | `default_space_encoding` | [`Plus`] |
/// | `escape_query`           | `false`  |
///
/// [`Plus`]: SpaceEncoding::Plus
///
/// # Examples
///
/// ```
/// use urikit::{Options, SpaceEncoding};
///
/// let options = Options::new("https://example.com/search?q=a b")
///     .with_restrict_scheme(["https"])
///     .with_default_space_encoding(SpaceEncoding::PercentTwenty)
///     .with_escape_query(true);
/// assert_eq!(options.restrict_scheme, ["https"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// The URL to start with. An empty string yields an empty URL.
    pub url: String,
    /// The schemes a URL may have, compared case-insensitively.
    ///
    /// When non-empty, every URL assigned to the builder must have one of
    /// these schemes, or the assignment fails with [`Error::InvalidScheme`].
    pub restrict_scheme: Vec<String>,
    /// The space encoding used when an operation is not given one.
    pub default_space_encoding: SpaceEncoding,
    /// Whether to re-escape the query of every URL assigned by
    /// [`Builder::with_options`] or [`Builder::set_url`].
    pub escape_query: bool,
}

impl Options {
    /// Creates options starting from the given URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the restricted schemes.
    #[must_use]
    pub fn with_restrict_scheme<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restrict_scheme = schemes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the default space encoding.
    #[must_use]
    pub fn with_default_space_encoding(mut self, space: SpaceEncoding) -> Self {
        self.default_space_encoding = space;
        self
    }

    /// Sets whether to re-escape the query of assigned URLs.
    #[must_use]
    pub fn with_escape_query(mut self, escape_query: bool) -> Self {
        self.escape_query = escape_query;
        self
    }
}

/// A mutable URL builder.
///
/// The URL lives behind a reader-writer lock: getters copy out of it under a
/// read lock and setters mutate it under a write lock, so a `Builder` can be
/// shared between threads. Setters return `&Self` for chaining.
///
/// Every fallible operation computes its result before touching the URL,
/// so a failure leaves the builder as it was.
///
/// # Examples
///
/// ```
/// use urikit::{Builder, Options, SpaceEncoding};
///
/// let builder = Builder::with_options(
///     Options::new("https://www.tokopedia.com/search?navsource=&q=macbook air m2")
///         .with_default_space_encoding(SpaceEncoding::PercentTwenty)
///         .with_escape_query(true),
/// )?;
/// assert_eq!(builder.raw_query(), "navsource=&q=macbook%20air%20m2");
///
/// builder
///     .add_query_param("st", "product")?
///     .delete_query_key("navsource")
///     .set_fragment_with("top 10", SpaceEncoding::Plus);
///
/// assert_eq!(
///     builder.url_string(),
///     "https://www.tokopedia.com/search?q=macbook%20air%20m2&st=product#top+10"
/// );
/// assert_eq!(builder.query_value("q").as_deref(), Some("macbook air m2"));
/// # Ok::<_, urikit::Error>(())
/// ```
pub struct Builder {
    uri: RwLock<Uri>,
    space: SpaceEncoding,
    restricted_schemes: HashSet<String>,
    escape_query: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("uri", &*self.read())
            .field("space", &self.space)
            .field("restricted_schemes", &self.restricted_schemes)
            .field("escape_query", &self.escape_query)
            .finish()
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.read(), f)
    }
}

impl Builder {
    /// Creates a builder holding an empty URL, with default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uri: RwLock::new(Uri::default()),
            space: SpaceEncoding::default(),
            restricted_schemes: HashSet::new(),
            escape_query: false,
        }
    }

    /// Creates a builder with the given options.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the URL fails to parse or its scheme is not
    /// in the restricted schemes. An empty URL is always accepted.
    pub fn with_options(options: Options) -> Result<Self, Error> {
        let mut builder = Self {
            uri: RwLock::new(Uri::default()),
            space: options.default_space_encoding,
            restricted_schemes: options
                .restrict_scheme
                .iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .collect(),
            escape_query: options.escape_query,
        };

        if !options.url.is_empty() {
            let uri = builder.prepare(&options.url)?;
            *builder.uri.get_mut().unwrap_or_else(PoisonError::into_inner) = uri;
        }
        Ok(builder)
    }

    fn read(&self) -> RwLockReadGuard<'_, Uri> {
        self.uri.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Uri> {
        self.uri.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the default space encoding.
    #[must_use]
    pub fn default_space_encoding(&self) -> SpaceEncoding {
        self.space
    }

    /// Parses a URL and checks its scheme against the restricted schemes.
    fn parse_restricted(&self, url: &str) -> Result<Uri, Error> {
        let uri = Uri::parse(url)?;
        if !self.restricted_schemes.is_empty() && !self.restricted_schemes.contains(uri.scheme()) {
            tracing::debug!(scheme = uri.scheme(), "rejecting url with restricted scheme");
            return Err(Error::InvalidScheme);
        }
        Ok(uri)
    }

    /// Parses a URL to replace the current one with.
    fn prepare(&self, url: &str) -> Result<Uri, Error> {
        let mut uri = self.parse_restricted(url)?;
        if self.escape_query {
            if let Some(q) = query::reescape(&uri.query, self.space) {
                uri.query = q;
            }
        }
        Ok(uri)
    }

    /// Replaces the whole URL.
    ///
    /// The query is re-escaped if the builder was created with
    /// [`Options::escape_query`] set.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the URL fails to parse or its scheme is not in the
    /// restricted schemes, in which case the current URL is kept.
    pub fn set_url(&self, url: &str) -> Result<&Self, Error> {
        let uri = self.prepare(url)?;
        tracing::trace!(url, "replacing url");
        *self.write() = uri;
        Ok(self)
    }

    /// Replaces the scheme and the host of the URL with those of `base_url`.
    ///
    /// The current userinfo is kept; any userinfo in `base_url` is ignored.
    ///
    /// When the new host is empty, the leading `'/'` of the current path is
    /// dropped, so that `tokopedia://` applied to `https://host/a/b`
    /// gives `tokopedia://a/b`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `base_url` fails to parse or its scheme is not in the
    /// restricted schemes, in which case the current URL is kept.
    pub fn set_base_url(&self, base_url: &str) -> Result<&Self, Error> {
        let base = self.parse_restricted(base_url)?;

        let mut uri = self.write();
        if base.host().map_or(true, str::is_empty) && uri.path.starts_with('/') {
            uri.path.remove(0);
        }
        uri.scheme = base.scheme;
        uri.host = base.host;
        Ok(self)
    }

    /// Replaces the path, escaping it.
    ///
    /// ```
    /// use urikit::{Builder, Options};
    ///
    /// let builder = Builder::with_options(Options::new("https://example.com/old?x=1"))?;
    /// builder.set_path("/new path/100%");
    /// assert_eq!(builder.url_string(), "https://example.com/new%20path/100%25?x=1");
    /// assert_eq!(builder.full_path(), "/new path/100%");
    /// # Ok::<_, urikit::Error>(())
    /// ```
    pub fn set_path(&self, path: &str) -> &Self {
        let path = pct_enc::encode_path(path);
        self.write().path = path;
        self
    }

    /// Decodes and re-escapes every query value with the default space encoding.
    ///
    /// Keys are kept as found, and so is a value that fails to decode.
    /// Nothing changes if the query has no entries.
    pub fn escape_query(&self) -> &Self {
        let mut uri = self.write();
        if let Some(q) = query::reescape(&uri.query, self.space) {
            uri.query = q;
        }
        self
    }

    /// Appends a query parameter, escaping the value with the default space encoding.
    ///
    /// The key is trimmed and escaped; duplicate keys are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyEmpty`] if the trimmed key is empty and
    /// [`Error::KeyContainsSpace`] if it contains a space.
    pub fn add_query_param(&self, key: &str, value: &str) -> Result<&Self, Error> {
        self.add_query_param_with(key, value, self.space)
    }

    /// Appends a query parameter, escaping the value with the given space encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyEmpty`] if the trimmed key is empty and
    /// [`Error::KeyContainsSpace`] if it contains a space.
    ///
    /// # Examples
    ///
    /// ```
    /// use urikit::{Builder, Options, SpaceEncoding};
    ///
    /// let builder = Builder::with_options(Options::new("https://tokopedia.com/search"))?;
    /// builder
    ///     .add_query_param_with("q", "produk p&g", SpaceEncoding::Plus)?
    ///     .add_query_param_with("navsource", "home campaign", SpaceEncoding::Unencoded)?;
    /// assert_eq!(
    ///     builder.url_string(),
    ///     "https://tokopedia.com/search?q=produk+p%26g&navsource=home campaign"
    /// );
    /// # Ok::<_, urikit::Error>(())
    /// ```
    pub fn add_query_param_with(
        &self,
        key: &str,
        value: &str,
        space: SpaceEncoding,
    ) -> Result<&Self, Error> {
        let key = query::validate_key(key)?;
        query::append(&mut self.write().query, key, value, space);
        Ok(self)
    }

    /// Removes every query entry whose decoded key equals `key`.
    ///
    /// The other entries are kept verbatim and in order. A key that fails to
    /// decode is compared as found. An empty `key` removes nothing.
    pub fn delete_query_key(&self, key: &str) -> &Self {
        let mut uri = self.write();
        uri.query = query::remove_key(&uri.query, key);
        self
    }

    /// Replaces the fragment, escaping it with the default space encoding.
    ///
    /// The fragment is given without the leading `'#'`.
    pub fn set_fragment(&self, fragment: &str) -> &Self {
        self.set_fragment_with(fragment, self.space)
    }

    /// Replaces the fragment, escaping it with the given space encoding.
    pub fn set_fragment_with(&self, fragment: &str, space: SpaceEncoding) -> &Self {
        let fragment = query::encode_fragment(fragment, space);
        self.write().fragment = fragment;
        self
    }

    /// Removes the fragment.
    pub fn delete_fragment(&self) -> &Self {
        self.write().fragment.clear();
        self
    }

    /// Returns the URL as a string.
    #[must_use]
    pub fn url_string(&self) -> String {
        self.read().to_string()
    }

    /// Returns the URL as a string with `'+'` and percent-encoded octets decoded.
    ///
    /// Falls back to the escaped string if it cannot be decoded.
    #[must_use]
    pub fn url_string_unescaped(&self) -> String {
        let url = self.url_string();
        match pct_enc::decode_query(&url) {
            Ok(bytes) => match String::from_utf8(bytes.into_owned()) {
                Ok(s) => s,
                Err(_) => url,
            },
            Err(_) => url,
        }
    }

    /// Returns a copy of the URL value.
    #[must_use]
    pub fn uri(&self) -> Uri {
        self.read().clone()
    }

    /// Returns the scheme, empty if absent.
    #[must_use]
    pub fn scheme(&self) -> String {
        self.read().scheme.clone()
    }

    /// Returns the host, port included, or `None` if there is no authority.
    #[must_use]
    pub fn host(&self) -> Option<String> {
        self.read().host.clone()
    }

    /// Returns the raw query, empty if absent.
    #[must_use]
    pub fn raw_query(&self) -> String {
        self.read().query.clone()
    }

    /// Returns the escaped fragment, empty if absent.
    #[must_use]
    pub fn fragment(&self) -> String {
        self.read().fragment.clone()
    }

    /// Returns the first decoded value of a query parameter.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<String> {
        query::value(&self.read().query, key)
    }

    /// Returns all decoded query parameters, values grouped by key in order.
    #[must_use]
    pub fn query_values(&self) -> HashMap<String, Vec<String>> {
        query::values(&self.read().query)
    }

    /// Returns the decoded path segments after the leading `'/'`.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.read().path_segments()
    }

    /// Returns the decoded path, without the authority, query or fragment.
    #[must_use]
    pub fn full_path(&self) -> String {
        self.read().decoded_path()
    }
}
