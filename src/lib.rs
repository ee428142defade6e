#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! A mutable, chainable URL builder with a configurable space encoding
//! for query values and fragments.
//!
//! The builder holds a single [`Uri`] value behind a reader-writer lock.
//! URLs are split leniently, so a query holding literal spaces, as typed by a
//! user, is accepted and kept as is until it is re-escaped.
//!
//! # Space encoding
//!
//! Query values and fragments are escaped with a [`SpaceEncoding`] policy,
//! either the one passed to an operation or the builder's default:
//!
//! ```
//! use urikit::{Builder, Options, SpaceEncoding};
//!
//! let builder = Builder::with_options(
//!     Options::new("https://tokopedia.com/search")
//!         .with_default_space_encoding(SpaceEncoding::PercentTwenty),
//! )?;
//!
//! builder
//!     .add_query_param("key", "space value")?
//!     .add_query_param_with("plus_key", "space value", SpaceEncoding::Plus)?;
//!
//! assert_eq!(
//!     builder.url_string(),
//!     "https://tokopedia.com/search?key=space%20value&plus_key=space+value"
//! );
//! # Ok::<_, urikit::Error>(())
//! ```
//!
//! # Scheme restriction
//!
//! ```
//! use urikit::{Builder, Error, Options};
//!
//! let builder = Builder::with_options(
//!     Options::new("https://www.tokopedia.com/now").with_restrict_scheme(["https", "tokopedia"]),
//! )?;
//!
//! assert_eq!(builder.set_url("http://www.tokopedia.com/now").unwrap_err(), Error::InvalidScheme);
//! assert_eq!(builder.url_string(), "https://www.tokopedia.com/now");
//! # Ok::<_, urikit::Error>(())
//! ```
//!
//! # Crate features
//!
//! - `serde`: Implements `Serialize` and `Deserialize` for [`Uri`], [`Options`]
//!   and [`SpaceEncoding`].

mod builder;
mod error;
mod parser;
pub mod pct_enc;
mod query;
mod space;
mod uri;

pub use builder::{Builder, Options};
pub use error::{Error, ParseError, ParseErrorKind};
pub use space::{SpaceEncoding, UnknownSpaceEncoding};
pub use uri::Uri;
