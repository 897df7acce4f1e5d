use ribbit_msg::known::ContentFormat;
use ribbit_msg::OptValue;
use std_alloc::string::String;
use std_alloc::vec::Vec;

/// Something that can be stored in a CoAP Option.
///
/// These include:
/// - strings (str and String)
/// - empty (`()`)
/// - unsigned integers (`u8`, `u16`, `u32`), encoded in as few bytes as possible
/// - bytes (`&[u8]`, `Vec<u8>`, `ArrayVec<[u8; N]>`)
/// - [`ContentFormat`]s
///
/// ```
/// use ribbit::ToCoapValue;
/// use ribbit_msg::known::ContentFormat;
///
/// assert_eq!("hi".to_coap_value(), b"hi".to_vec());
/// assert_eq!(5683u16.to_coap_value(), vec![0x16, 0x33]);
/// assert_eq!(0u32.to_coap_value(), Vec::<u8>::new());
/// assert_eq!(ContentFormat::Json.to_coap_value(), vec![50]);
/// ```
pub trait ToCoapValue {
  /// Convert the value
  fn to_coap_value(self) -> Vec<u8>;
}

impl ToCoapValue for ContentFormat {
  fn to_coap_value(self) -> Vec<u8> {
    u16::from(&self).to_coap_value()
  }
}

impl ToCoapValue for () {
  fn to_coap_value(self) -> Vec<u8> {
    Vec::new()
  }
}

impl<'a> ToCoapValue for &'a str {
  fn to_coap_value(self) -> Vec<u8> {
    self.as_bytes().to_vec()
  }
}

impl ToCoapValue for String {
  fn to_coap_value(self) -> Vec<u8> {
    self.into_bytes()
  }
}

impl ToCoapValue for &[u8] {
  fn to_coap_value(self) -> Vec<u8> {
    self.to_vec()
  }
}

impl ToCoapValue for Vec<u8> {
  fn to_coap_value(self) -> Vec<u8> {
    self
  }
}

impl<A: tinyvec::Array<Item = u8>> ToCoapValue for tinyvec::ArrayVec<A> {
  fn to_coap_value(self) -> Vec<u8> {
    self.into_iter().collect()
  }
}

impl ToCoapValue for u8 {
  fn to_coap_value(self) -> Vec<u8> {
    OptValue::uint(self.into()).0
  }
}

impl ToCoapValue for u16 {
  fn to_coap_value(self) -> Vec<u8> {
    OptValue::uint(self.into()).0
  }
}

impl ToCoapValue for u32 {
  fn to_coap_value(self) -> Vec<u8> {
    OptValue::uint(self).0
  }
}

macro_rules! builder_method {
  (
    #[doc = $doc:expr]
    #[option(repeatable, $nr:expr)]
    fn $name:ident(string);
  ) => {
    #[doc = $doc]
    pub fn $name<S: AsRef<str>>(self, value: S) -> Self {
      self.add_option($nr, value.as_ref())
    }
  };
  (
    #[doc = $doc:expr]
    #[option(repeatable, $nr:expr)]
    fn $name:ident($t:ty);
  ) => {
    #[doc = $doc]
    pub fn $name(self, value: $t) -> Self {
      self.add_option($nr, value)
    }
  };
  (
    #[doc = $doc:expr]
    #[option($nr:expr)]
    fn $name:ident(string);
  ) => {
    #[doc = $doc]
    pub fn $name<S: AsRef<str>>(self, value: S) -> Self {
      self.option($nr, value.as_ref())
    }
  };
  (
    #[doc = $doc:expr]
    #[option($nr:expr)]
    fn $name:ident(());
  ) => {
    #[doc = $doc]
    pub fn $name(self) -> Self {
      self.option($nr, ())
    }
  };
  (
    #[doc = $doc:expr]
    #[option($nr:expr)]
    fn $name:ident($t:ty);
  ) => {
    #[doc = $doc]
    pub fn $name(self, value: $t) -> Self {
      self.option($nr, value)
    }
  };
}

macro_rules! common_options {
  () => {
    crate::option::builder_method! {
      #[doc = "Uri-Host: the host of the resource being requested (RFC7252 5.10.1)"]
      #[option(ribbit_msg::known::URI_HOST)]
      fn host(string);
    }
    crate::option::builder_method! {
      #[doc = "Uri-Port: the port of the resource being requested (RFC7252 5.10.1)"]
      #[option(ribbit_msg::known::URI_PORT)]
      fn port(u16);
    }
    crate::option::builder_method! {
      #[doc = "Add a Uri-Query argument, like `\"a=b\"` (RFC7252 5.10.1)"]
      #[option(repeatable, ribbit_msg::known::URI_QUERY)]
      fn add_query(string);
    }
    crate::option::builder_method! {
      #[doc = "Size1: size of the request payload, in bytes (RFC7252 5.10.9)"]
      #[option(ribbit_msg::known::SIZE1)]
      fn size1(u32);
    }
    crate::option::builder_method! {
      #[doc = "If-Match: only apply the request if the resource has this ETag (RFC7252 5.10.8.1)"]
      #[option(repeatable, ribbit_msg::known::IF_MATCH)]
      fn if_match(tinyvec::ArrayVec<[u8; 8]>);
    }
    crate::option::builder_method! {
      #[doc = "If-None-Match: only apply the request if the resource does not exist (RFC7252 5.10.8.2)"]
      #[option(ribbit_msg::known::IF_NONE_MATCH)]
      fn if_none_match(());
    }
    crate::option::builder_method! {
      #[doc = "ETag: a representation we already have cached (RFC7252 5.10.6.2)"]
      #[option(repeatable, ribbit_msg::known::ETAG)]
      fn etag(tinyvec::ArrayVec<[u8; 8]>);
    }
    crate::option::builder_method! {
      #[doc = "Content-Format: the format of the payload (RFC7252 5.10.3)"]
      #[option(ribbit_msg::known::CONTENT_FORMAT)]
      fn content_format(ribbit_msg::known::ContentFormat);
    }
    crate::option::builder_method! {
      #[doc = "Accept: the format we would like the response payload in (RFC7252 5.10.4)"]
      #[option(ribbit_msg::known::ACCEPT)]
      fn accept(ribbit_msg::known::ContentFormat);
    }
  };
}

pub(crate) use {builder_method, common_options};
