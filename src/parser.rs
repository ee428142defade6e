use crate::{
    error::{ParseError, ParseErrorKind},
    pct_enc::{self, table::*},
    uri::Uri,
};
use core::ops::{Deref, DerefMut};

type Result<T> = core::result::Result<T, ParseError>;

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError {
            index: $index,
            kind: ParseErrorKind::$kind,
        })
    };
}

pub(crate) fn parse(s: &str) -> Result<Uri> {
    let mut parser = Parser {
        reader: Reader::new(s),
        out: Uri::default(),
    };
    parser.parse_from_scheme()?;
    Ok(parser.out)
}

/// Lenient URL splitter.
///
/// Components are split the way RFC 3986 Appendix B does it, without checking
/// their syntax. The path and the fragment are normalized by percent-encoding
/// the bytes they may not hold; the query is kept verbatim.
///
/// # Invariants
///
/// `pos <= len`, `pos` is non-decreasing and on a byte that is either ASCII
/// or the first byte of a UTF-8 code point.
struct Parser<'a> {
    reader: Reader<'a>,
    out: Uri,
}

struct Reader<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Deref for Parser<'a> {
    type Target = Reader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl<'a> DerefMut for Parser<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

impl<'a> Reader<'a> {
    fn new(s: &'a str) -> Self {
        Reader { s, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.s.as_bytes()
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes().get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    fn skip(&mut self, n: usize) {
        // INVARIANT: `pos` is non-decreasing.
        self.pos += n;
        debug_assert!(self.pos <= self.s.len());
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.bytes()[self.pos..].starts_with(s.as_bytes()) {
            // INVARIANT: The remaining bytes start with `s` so it's fine to skip `s.len()`.
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    /// Reads up to (not including) the first of the given ASCII delimiters.
    fn read_until(&mut self, delims: &[u8]) -> &'a str {
        let start = self.pos;
        let len = self.bytes()[start..]
            .iter()
            .position(|x| delims.contains(x))
            .unwrap_or(self.s.len() - start);
        // INVARIANT: Delimiters are ASCII, so we stop on a character boundary.
        self.skip(len);
        &self.s[start..self.pos]
    }
}

impl Parser<'_> {
    fn parse_from_scheme(&mut self) -> Result<()> {
        if let Some(i) = self.bytes().iter().position(u8::is_ascii_control) {
            err!(i, ControlChar);
        }

        match self.peek(0) {
            Some(b':') => err!(0, MissingScheme),
            Some(x) if ALPHA.allows_byte(x) => {
                let bytes = self.bytes();
                let len = bytes
                    .iter()
                    .position(|&x| !SCHEME.allows_byte(x))
                    .unwrap_or(bytes.len());
                if bytes.get(len) == Some(&b':') {
                    self.out.scheme = self.s[..len].to_ascii_lowercase();
                    // INVARIANT: Skipping the scheme and ":" is fine.
                    self.skip(len + 1);
                }
            }
            _ => {}
        }

        self.parse_from_authority()
    }

    fn parse_from_authority(&mut self) -> Result<()> {
        if self.read_str("//") {
            let authority = self.read_until(b"/?#");
            match authority.rsplit_once('@') {
                Some((userinfo, host)) => {
                    self.out.userinfo = Some(userinfo.to_owned());
                    self.out.host = Some(host.to_owned());
                }
                None => self.out.host = Some(authority.to_owned()),
            }
        }
        self.parse_from_path()
    }

    fn parse_from_path(&mut self) -> Result<()> {
        let start = self.pos;
        let path = self.read_until(b"?#");
        self.out.path = match pct_enc::normalize(path, PATH) {
            Ok(path) => path.into_owned(),
            Err(i) => err!(start + i, InvalidOctet),
        };

        if self.read_str("?") {
            self.out.query = self.read_until(b"#").to_owned();
        }

        if self.read_str("#") {
            let start = self.pos;
            let fragment = &self.s[start..];
            self.out.fragment = match pct_enc::normalize(fragment, FRAGMENT) {
                Ok(fragment) => fragment.into_owned(),
                Err(i) => err!(start + i, InvalidOctet),
            };
        }
        Ok(())
    }
}
