use crate::{
    error::ParseError,
    parser,
    pct_enc::{self, EStr},
};
use core::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// An owned URL value, split into its components.
///
/// The scheme is stored lowercase, the path and fragment in escaped form,
/// and the query exactly as given, so that a query holding literal spaces
/// survives until it is explicitly re-escaped.
///
/// # Examples
///
/// ```
/// use urikit::Uri;
///
/// let uri = Uri::parse("HTTPS://user@example.com:8443/a b?q=x y#top")?;
/// assert_eq!(uri.scheme(), "https");
/// assert_eq!(uri.userinfo(), Some("user"));
/// assert_eq!(uri.host(), Some("example.com:8443"));
/// assert_eq!(uri.path(), "/a%20b");
/// assert_eq!(uri.query(), "q=x y");
/// assert_eq!(uri.fragment(), "top");
/// assert_eq!(uri.to_string(), "https://user@example.com:8443/a%20b?q=x y#top");
/// # Ok::<_, urikit::ParseError>(())
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Uri {
    pub(crate) scheme: String,
    pub(crate) userinfo: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) fragment: String,
}

impl Uri {
    /// Parses a URL leniently.
    ///
    /// An empty string yields the empty `Uri`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string contains an ASCII control character, starts
    /// with a colon, or has a malformed percent-encoded octet in its path or
    /// fragment.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        parser::parse(s)
    }

    /// Returns the lowercase scheme, empty if absent.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the userinfo subcomponent of the authority.
    #[must_use]
    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    /// Returns the host, port included, or `None` if there is no authority.
    ///
    /// Note that the host can be empty while the authority is present,
    /// as in `tokopedia://`.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the escaped path.
    #[must_use]
    pub fn path(&self) -> &EStr {
        EStr::new(&self.path)
    }

    /// Returns the raw query, empty if absent.
    #[must_use]
    pub fn query(&self) -> &EStr {
        EStr::new(&self.query)
    }

    /// Returns the escaped fragment, empty if absent.
    #[must_use]
    pub fn fragment(&self) -> &EStr {
        EStr::new(&self.fragment)
    }

    /// Checks whether every component is empty or absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the path decoded, falling back to the escaped path when
    /// it cannot be decoded.
    #[must_use]
    pub fn decoded_path(&self) -> String {
        match pct_enc::decode(&self.path) {
            Ok(bytes) => pct_enc::into_string_lossy(bytes),
            Err(_) => self.path.clone(),
        }
    }

    /// Returns the decoded path segments that follow the first one.
    ///
    /// For an absolute path, these are all the segments after the leading
    /// `'/'`, empty segments included.
    ///
    /// # Examples
    ///
    /// ```
    /// use urikit::Uri;
    ///
    /// let uri = Uri::parse("https://example.com/a/b%2Fc//d")?;
    /// assert_eq!(uri.path_segments(), ["a", "b/c", "", "d"]);
    ///
    /// let uri = Uri::parse("https://example.com")?;
    /// assert!(uri.path_segments().is_empty());
    /// # Ok::<_, urikit::ParseError>(())
    /// ```
    #[must_use]
    pub fn path_segments(&self) -> Vec<String> {
        self.path()
            .split('/')
            .skip(1)
            .map(|seg| match seg.decode() {
                Ok(bytes) => pct_enc::into_string_lossy(bytes),
                Err(_) => seg.as_str().to_owned(),
            })
            .collect()
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.scheme.is_empty() {
            write!(f, "{}:", self.scheme)?;
        }
        if let Some(host) = &self.host {
            f.write_str("//")?;
            if let Some(userinfo) = &self.userinfo {
                write!(f, "{userinfo}@")?;
            }
            f.write_str(host)?;
            if !host.is_empty() && !self.path.is_empty() && !self.path.starts_with('/') {
                f.write_str("/")?;
            }
        } else if self.path.starts_with("//") {
            // Keeps the path from being read back as an authority.
            f.write_str("/.")?;
        }
        f.write_str(&self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        if !self.fragment.is_empty() {
            write!(f, "#{}", self.fragment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uri")
            .field("scheme", &self.scheme)
            .field("userinfo", &self.userinfo)
            .field("host", &self.host)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("fragment", &self.fragment)
            .finish()
    }
}

impl FromStr for Uri {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Uri::parse(&s)
            .map_err(|e| de::Error::custom(format_args!("failed to parse {s:?} as URL: {e}")))
    }
}
