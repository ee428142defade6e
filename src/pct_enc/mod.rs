//! Percent-encoding utilities.
//!
//! The escapers here always produce uppercase hexadecimal digits and never fail.
//! The decoders fail with a [`DecodeError`] on an octet that is either
//! non-hexadecimal or incomplete.

pub mod table;

pub use table::Table;

use crate::space::SpaceEncoding;
use core::{fmt, iter::FusedIterator, str};
use ref_cast::{ref_cast_custom, RefCastCustom};
use std::borrow::Cow;

/// A string slice in the escaped form it takes inside a URI.
///
/// No validation is performed on construction: a raw query may well hold
/// literal spaces or a malformed escape, and the builder keeps such text as
/// found until it is asked to re-escape it.
///
/// # Examples
///
/// Walk the entries of a raw query:
///
/// ```
/// use urikit::pct_enc::EStr;
///
/// let query = EStr::new("q=beras%20p%26g&navsource=&&flag");
/// let pairs: Vec<_> = query.pairs().map(|(k, v)| (k.as_str(), v.as_str())).collect();
/// assert_eq!(pairs, [("q", "beras%20p%26g"), ("navsource", ""), ("flag", "")]);
///
/// let (_, v) = query.pairs().next().unwrap();
/// assert_eq!(v.decode_query().unwrap(), "beras p&g".as_bytes());
/// ```
#[derive(RefCastCustom, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EStr {
    inner: str,
}

impl EStr {
    #[ref_cast_custom]
    const fn new_unchecked(s: &str) -> &Self;

    /// An empty `EStr` slice.
    pub const EMPTY: &'static Self = Self::new_unchecked("");

    /// Converts a string slice to an `EStr` slice.
    #[must_use]
    pub const fn new(s: &str) -> &Self {
        Self::new_unchecked(s)
    }

    /// Yields the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the length of the `EStr` slice in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks whether the `EStr` slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Percent-decodes the slice, keeping `+` as is.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the slice contains a malformed percent-encoded octet.
    pub fn decode(&self) -> Result<Cow<'_, [u8]>, DecodeError> {
        decode(&self.inner)
    }

    /// Percent-decodes the slice, decoding `+` as a space.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the slice contains a malformed percent-encoded octet.
    pub fn decode_query(&self) -> Result<Cow<'_, [u8]>, DecodeError> {
        decode_query(&self.inner)
    }

    /// Returns an iterator over subslices separated by the given delimiter.
    ///
    /// # Examples
    ///
    /// ```
    /// use urikit::pct_enc::EStr;
    ///
    /// assert!(EStr::new("a,b,c").split(',').eq(["a", "b", "c"].map(EStr::new)));
    /// assert!(EStr::EMPTY.split(',').eq([EStr::EMPTY]));
    /// ```
    pub fn split(&self, delim: char) -> Split<'_> {
        Split {
            inner: self.inner.split(delim),
        }
    }

    /// Splits the slice on the first occurrence of the given delimiter.
    ///
    /// Returns `None` if the delimiter is not found.
    #[must_use]
    pub fn split_once(&self, delim: char) -> Option<(&Self, &Self)> {
        self.inner
            .split_once(delim)
            .map(|(a, b)| (Self::new(a), Self::new(b)))
    }

    /// Returns an iterator over the key-value entries of a raw query.
    ///
    /// The query is split on `'&'`, skipping empty segments, and each segment
    /// is split on its first `'='`. A segment without `'='` has an empty value.
    pub fn pairs(&self) -> Pairs<'_> {
        Pairs {
            inner: self.inner.split('&'),
        }
    }
}

impl AsRef<str> for EStr {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl PartialEq<str> for EStr {
    fn eq(&self, other: &str) -> bool {
        &self.inner == other
    }
}

impl PartialEq<EStr> for str {
    fn eq(&self, other: &EStr) -> bool {
        self == &other.inner
    }
}

impl Default for &EStr {
    /// Creates an empty `EStr` slice.
    fn default() -> Self {
        EStr::EMPTY
    }
}

impl fmt::Debug for EStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for EStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// An iterator over subslices of an [`EStr`] slice separated by a delimiter.
///
/// This struct is created by [`EStr::split`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Split<'a> {
    inner: str::Split<'a, char>,
}

impl<'a> Iterator for Split<'a> {
    type Item = &'a EStr;

    fn next(&mut self) -> Option<&'a EStr> {
        self.inner.next().map(EStr::new)
    }
}

impl<'a> DoubleEndedIterator for Split<'a> {
    fn next_back(&mut self) -> Option<&'a EStr> {
        self.inner.next_back().map(EStr::new)
    }
}

impl FusedIterator for Split<'_> {}

/// An iterator over the key-value entries of a raw query.
///
/// This struct is created by [`EStr::pairs`].
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Pairs<'a> {
    inner: str::Split<'a, char>,
}

impl<'a> Iterator for Pairs<'a> {
    type Item = (&'a EStr, &'a EStr);

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.inner.find(|s| !s.is_empty())?;
        Some(match segment.split_once('=') {
            Some((k, v)) => (EStr::new(k), EStr::new(v)),
            None => (EStr::new(segment), EStr::EMPTY),
        })
    }
}

impl FusedIterator for Pairs<'_> {}

/// An error occurred when decoding a percent-encoded string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeError {
    index: usize,
}

impl DecodeError {
    /// Returns the index of the percent character `'%'` starting the malformed octet.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid percent-encoded octet at index {}", self.index)
    }
}

impl std::error::Error for DecodeError {}

const fn gen_octet_table(hi: bool) -> [u8; 256] {
    let mut out = [0xff; 256];
    let shift = if hi { 4 } else { 0 };

    let mut i = 0;
    while i < 10 {
        out[(i + b'0') as usize] = i << shift;
        i += 1;
    }
    while i < 16 {
        out[(i - 10 + b'A') as usize] = i << shift;
        out[(i - 10 + b'a') as usize] = i << shift;
        i += 1;
    }
    out
}

const OCTET_TABLE_HI: &[u8; 256] = &gen_octet_table(true);
const OCTET_TABLE_LO: &[u8; 256] = &gen_octet_table(false);

/// Checks whether both bytes are hexadecimal digits.
pub(crate) fn is_hexdig_pair(hi: u8, lo: u8) -> bool {
    table::HEXDIG.allows_byte(hi) && table::HEXDIG.allows_byte(lo)
}

/// Decodes a percent-encoded octet, assuming that the bytes are hexadecimal.
fn decode_octet(hi: u8, lo: u8) -> u8 {
    debug_assert!(hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit());
    OCTET_TABLE_HI[hi as usize] | OCTET_TABLE_LO[lo as usize]
}

pub(crate) fn encode_byte(x: u8) -> &'static str {
    const TABLE: &[u8; 256 * 3] = &{
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut i = 0;
        let mut table = [0; 256 * 3];
        while i < 256 {
            table[i * 3] = b'%';
            table[i * 3 + 1] = HEX_DIGITS[i >> 4];
            table[i * 3 + 2] = HEX_DIGITS[i & 0b1111];
            i += 1;
        }
        table
    };

    const TABLE_STR: &str = match str::from_utf8(TABLE) {
        Ok(s) => s,
        Err(_) => unreachable!(),
    };

    &TABLE_STR[x as usize * 3..x as usize * 3 + 3]
}

/// Percent-encodes the bytes not allowed by `table`, writing a space as `space`.
fn encode_to(bytes: &[u8], table: Table, space: SpaceEncoding, buf: &mut String) {
    buf.reserve(bytes.len());
    for &x in bytes {
        if table.allows_byte(x) {
            buf.push(x as char);
        } else if x == b' ' {
            buf.push_str(space.as_str());
        } else {
            buf.push_str(encode_byte(x));
        }
    }
}

pub(crate) fn encode_bytes(bytes: &[u8], table: Table, space: SpaceEncoding) -> String {
    let mut buf = String::new();
    encode_to(bytes, table, space, &mut buf);
    buf
}

/// Escapes a query key or value the generic way.
///
/// Unreserved characters are kept, a space is written as `'+'`, and every
/// other byte is percent-encoded.
///
/// # Examples
///
/// ```
/// use urikit::pct_enc::encode_query;
///
/// assert_eq!(encode_query("produk p&g"), "produk+p%26g");
/// assert_eq!(encode_query("174,175"), "174%2C175");
/// assert_eq!(encode_query("1+1"), "1%2B1");
/// ```
#[must_use]
pub fn encode_query(s: &str) -> String {
    encode_bytes(s.as_bytes(), table::QUERY_DATA, SpaceEncoding::Plus)
}

/// Escapes a fragment.
///
/// Fragment characters other than `'+'` are kept, and every other byte,
/// the space included, is percent-encoded.
///
/// # Examples
///
/// ```
/// use urikit::pct_enc::encode_fragment;
///
/// assert_eq!(encode_fragment("top 10"), "top%2010");
/// assert_eq!(encode_fragment("a+b/c?d"), "a%2Bb/c?d");
/// ```
#[must_use]
pub fn encode_fragment(s: &str) -> String {
    encode_bytes(s.as_bytes(), table::FRAGMENT_DATA, SpaceEncoding::PercentTwenty)
}

/// Escapes a path.
///
/// Slashes are kept as segment delimiters; `'%'` is always encoded.
#[must_use]
pub fn encode_path(s: &str) -> String {
    encode_bytes(s.as_bytes(), table::PATH, SpaceEncoding::PercentTwenty)
}

/// Percent-encodes the bytes not allowed by `table` while keeping valid
/// percent-encoded octets as they are.
///
/// If `table` does not allow percent-encoded octets, every `'%'` is encoded
/// and the function never fails.
///
/// Returns the index of the first malformed octet on failure.
pub(crate) fn normalize(s: &str, table: Table) -> Result<Cow<'_, str>, usize> {
    let bytes = s.as_bytes();
    let pct_encoded = table.allows_pct_encoded();
    let mut i = 0;

    while i < bytes.len() {
        let x = bytes[i];
        if x == b'%' && pct_encoded {
            let &[hi, lo, ..] = &bytes[i + 1..] else {
                return Err(i);
            };
            if !is_hexdig_pair(hi, lo) {
                return Err(i);
            }
            i += 3;
        } else if table.allows_byte(x) {
            i += 1;
        } else {
            break;
        }
    }

    if i == bytes.len() {
        return Ok(Cow::Borrowed(s));
    }

    let mut buf = String::with_capacity(bytes.len() + 8);
    buf.push_str(&s[..i]);

    while i < bytes.len() {
        let x = bytes[i];
        if x == b'%' && pct_encoded {
            let &[hi, lo, ..] = &bytes[i + 1..] else {
                return Err(i);
            };
            if !is_hexdig_pair(hi, lo) {
                return Err(i);
            }
            buf.push_str(&s[i..i + 3]);
            i += 3;
        } else if table.allows_byte(x) {
            buf.push(x as char);
            i += 1;
        } else {
            buf.push_str(encode_byte(x));
            i += 1;
        }
    }
    Ok(Cow::Owned(buf))
}

fn decode_with(s: &str, plus_as_space: bool) -> Result<Cow<'_, [u8]>, DecodeError> {
    let bytes = s.as_bytes();
    let needs_decoding = |x: &u8| *x == b'%' || (plus_as_space && *x == b'+');

    let Some(start) = bytes.iter().position(needs_decoding) else {
        return Ok(Cow::Borrowed(bytes));
    };

    let mut buf = Vec::with_capacity(bytes.len());
    buf.extend_from_slice(&bytes[..start]);

    let mut i = start;
    while i < bytes.len() {
        let x = bytes[i];
        if x == b'%' {
            let &[hi, lo, ..] = &bytes[i + 1..] else {
                return Err(DecodeError { index: i });
            };
            if !is_hexdig_pair(hi, lo) {
                return Err(DecodeError { index: i });
            }
            buf.push(decode_octet(hi, lo));
            i += 3;
        } else if plus_as_space && x == b'+' {
            buf.push(b' ');
            i += 1;
        } else {
            buf.push(x);
            i += 1;
        }
    }
    Ok(Cow::Owned(buf))
}

/// Percent-decodes a string to bytes, keeping `'+'` as is.
///
/// This function allocates only when the string contains any percent-encoded octet.
///
/// # Errors
///
/// Returns `Err` if the string contains a malformed percent-encoded octet.
///
/// # Examples
///
/// ```
/// use urikit::pct_enc::decode;
///
/// assert_eq!(decode("a%2Fb+c").unwrap(), "a/b+c".as_bytes());
/// assert_eq!(decode("%2d%").unwrap_err().index(), 3);
/// ```
pub fn decode(s: &str) -> Result<Cow<'_, [u8]>, DecodeError> {
    decode_with(s, false)
}

/// Percent-decodes a query key or value to bytes, decoding `'+'` as a space.
///
/// # Errors
///
/// Returns `Err` if the string contains a malformed percent-encoded octet.
///
/// # Examples
///
/// ```
/// use urikit::pct_enc::decode_query;
///
/// assert_eq!(decode_query("beras+putih").unwrap(), "beras putih".as_bytes());
/// assert_eq!(decode_query("p%26g").unwrap(), "p&g".as_bytes());
/// assert!(decode_query("100%").is_err());
/// ```
pub fn decode_query(s: &str) -> Result<Cow<'_, [u8]>, DecodeError> {
    decode_with(s, true)
}

/// Decodes bytes to a string, replacing invalid UTF-8 sequences.
pub(crate) fn into_string_lossy(bytes: Cow<'_, [u8]>) -> String {
    match bytes {
        Cow::Borrowed(b) => String::from_utf8_lossy(b).into_owned(),
        Cow::Owned(b) => match String::from_utf8(b) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        },
    }
}
