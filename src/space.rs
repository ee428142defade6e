use core::{fmt, str::FromStr};
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The representation of the ASCII space character within an escaped query
/// value or fragment.
///
/// # Examples
///
/// ```
/// use urikit::SpaceEncoding;
///
/// let escaped = "macbook+air+m2";
/// assert_eq!(
///     SpaceEncoding::Plus.transcode(escaped, SpaceEncoding::PercentTwenty),
///     "macbook%20air%20m2"
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SpaceEncoding {
    /// Keeps a space as is.
    Unencoded,
    /// Writes a space as `"%20"`.
    PercentTwenty,
    /// Writes a space as `'+'`.
    #[default]
    Plus,
}

impl SpaceEncoding {
    /// Returns the string a space is written as.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unencoded => " ",
            Self::PercentTwenty => "%20",
            Self::Plus => "+",
        }
    }

    /// Rewrites every space written the `self` way in `escaped` into the `to` way.
    ///
    /// The input must come from an escaper that writes spaces the `self` way,
    /// so that every occurrence of the representation stands for a space.
    #[must_use]
    pub fn transcode(self, escaped: &str, to: SpaceEncoding) -> Cow<'_, str> {
        if self == to || !escaped.contains(self.as_str()) {
            Cow::Borrowed(escaped)
        } else {
            Cow::Owned(escaped.replace(self.as_str(), to.as_str()))
        }
    }
}

impl fmt::Display for SpaceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unencoded => "unencoded",
            Self::PercentTwenty => "percent-twenty",
            Self::Plus => "plus",
        };
        f.write_str(name)
    }
}

/// An error returned when parsing a [`SpaceEncoding`] from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownSpaceEncoding;

impl fmt::Display for UnknownSpaceEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected one of \"unencoded\", \"percent-twenty\" or \"plus\"")
    }
}

impl std::error::Error for UnknownSpaceEncoding {}

impl FromStr for SpaceEncoding {
    type Err = UnknownSpaceEncoding;

    /// Parses a policy from its name or from the representation itself.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unencoded" | " " => Ok(Self::Unencoded),
            "percent-twenty" | "%20" => Ok(Self::PercentTwenty),
            "plus" | "+" => Ok(Self::Plus),
            _ => Err(UnknownSpaceEncoding),
        }
    }
}
