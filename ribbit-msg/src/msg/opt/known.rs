//! Option numbers registered by RFC7252 (and RFC7641 for Observe).
//!
//! Options with numbers not listed here are "unknown" to the parser.

use crate::OptNumber;

/// If-Match; make a request conditional on the current ETag of the resource
pub const IF_MATCH: OptNumber = OptNumber(1);
/// Uri-Host; the Internet host of the resource being requested
pub const URI_HOST: OptNumber = OptNumber(3);
/// ETag; an entity-tag identifying a representation
pub const ETAG: OptNumber = OptNumber(4);
/// If-None-Match; make a request conditional on the nonexistence of the resource
pub const IF_NONE_MATCH: OptNumber = OptNumber(5);
/// Observe; register interest in a resource
pub const OBSERVE: OptNumber = OptNumber(6);
/// Uri-Port; the transport-layer port number of the resource
pub const URI_PORT: OptNumber = OptNumber(7);
/// Location-Path; one segment of the relative URI of a created resource
pub const LOCATION_PATH: OptNumber = OptNumber(8);
/// Uri-Path; one segment of the absolute path to the resource
pub const URI_PATH: OptNumber = OptNumber(11);
/// Content-Format; see [`ContentFormat`]
pub const CONTENT_FORMAT: OptNumber = OptNumber(12);
/// Max-Age; maximum time a response may be cached before it is considered not fresh
pub const MAX_AGE: OptNumber = OptNumber(14);
/// Uri-Query; one argument parameterizing the resource
pub const URI_QUERY: OptNumber = OptNumber(15);
/// Accept; which Content-Format is acceptable to the client
pub const ACCEPT: OptNumber = OptNumber(17);
/// Location-Query; one argument parameterizing a created resource
pub const LOCATION_QUERY: OptNumber = OptNumber(20);
/// Proxy-Uri; absolute URI used to make a request to a forward-proxy
pub const PROXY_URI: OptNumber = OptNumber(35);
/// Proxy-Scheme; scheme used with Uri-Host / Uri-Port to construct an absolute URI
pub const PROXY_SCHEME: OptNumber = OptNumber(39);
/// Size1; size information about the resource representation in a request
pub const SIZE1: OptNumber = OptNumber(60);

const ALL: [OptNumber; 16] = [IF_MATCH,
                              URI_HOST,
                              ETAG,
                              IF_NONE_MATCH,
                              OBSERVE,
                              URI_PORT,
                              LOCATION_PATH,
                              URI_PATH,
                              CONTENT_FORMAT,
                              MAX_AGE,
                              URI_QUERY,
                              ACCEPT,
                              LOCATION_QUERY,
                              PROXY_URI,
                              PROXY_SCHEME,
                              SIZE1];

/// Whether the parser recognizes this option number
///
/// ```
/// use ribbit_msg::known;
/// use ribbit_msg::OptNumber;
///
/// assert!(known::is_known(known::URI_PATH));
/// assert!(!known::is_known(OptNumber(2049)));
/// ```
pub fn is_known(n: OptNumber) -> bool {
  ALL.binary_search(&n).is_ok()
}

/// Content-Format
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentFormat {
  /// `text/plain; charset=utf-8`
  Text,
  /// `application/link-format`
  LinkFormat,
  /// `application/xml`
  Xml,
  /// `application/octet-stream`
  OctetStream,
  /// `application/exi`
  Exi,
  /// `application/json`
  Json,
  /// Another content format
  Other(u16),
}

impl ContentFormat {
  /// Convert this content format to the CoAP byte value
  pub fn bytes(&self) -> [u8; 2] {
    u16::from(self).to_be_bytes()
  }
}

impl<'a> From<&'a ContentFormat> for u16 {
  fn from(f: &'a ContentFormat) -> Self {
    use ContentFormat::*;
    match *f {
      | Text => 0,
      | LinkFormat => 40,
      | Xml => 41,
      | OctetStream => 42,
      | Exi => 47,
      | Json => 50,
      | Other(n) => n,
    }
  }
}

impl From<u16> for ContentFormat {
  fn from(n: u16) -> Self {
    use ContentFormat::*;
    match n {
      | 0 => Text,
      | 40 => LinkFormat,
      | 41 => Xml,
      | 42 => OctetStream,
      | 47 => Exi,
      | 50 => Json,
      | n => Other(n),
    }
  }
}
