use core::fmt;

/// Detailed cause of a [`ParseError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Invalid percent-encoded octet that is either non-hexadecimal or incomplete.
    ///
    /// The error index points to the percent character "%" of the octet.
    InvalidOctet,
    /// ASCII control character, which is not allowed anywhere in a URL.
    ///
    /// The error index points to the character.
    ControlChar,
    /// Colon found at the start of the input, where a scheme should precede it.
    ///
    /// The error index is always zero.
    MissingScheme,
}

/// An error occurred when parsing a URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub(crate) index: usize,
    pub(crate) kind: ParseErrorKind,
}

impl ParseError {
    /// Returns the index where the error occurred in the input string.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ParseErrorKind::InvalidOctet => "invalid percent-encoded octet at index ",
            ParseErrorKind::ControlChar => "control character at index ",
            ParseErrorKind::MissingScheme => "missing scheme before colon at index ",
        };
        write!(f, "{}{}", msg, self.index)
    }
}

impl std::error::Error for ParseError {}

/// An error returned by the fallible operations of a [`Builder`].
///
/// A failed operation leaves the builder untouched.
///
/// [`Builder`]: crate::Builder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The scheme of the URL is not in the restricted schemes.
    InvalidScheme,
    /// The query key is empty after trimming.
    KeyEmpty,
    /// The query key contains a space after trimming.
    KeyContainsSpace,
    /// The URL could not be parsed.
    Parse(ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidScheme => "invalid scheme url not in restricted schemes",
            Self::KeyEmpty => "key query parameter cannot be empty",
            Self::KeyContainsSpace => "key query parameter cannot contain space",
            Self::Parse(e) => return write!(f, "failed to parse url: {e}"),
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    #[inline]
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}
