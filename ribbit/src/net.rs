use no_std_net::SocketAddr;
use std_alloc::vec::Vec;

/// Data that came from (or is headed to) a network socket
#[derive(PartialEq, PartialOrd, Eq, Ord, Hash, Debug, Clone, Copy)]
pub struct Addrd<T>(pub T, pub SocketAddr);

impl<T> Addrd<T> {
  /// Borrow the contents of this Addressed
  pub fn as_ref(&self) -> Addrd<&T> {
    Addrd(self.data(), self.addr())
  }

  /// Discard the socket and get the data in this Addressed
  pub fn unwrap(self) -> T {
    self.0
  }

  /// Map the data contained in this Addressed
  pub fn map<R>(self, f: impl FnOnce(T) -> R) -> Addrd<R> {
    Addrd(f(self.0), self.1)
  }

  /// Borrow the contents of the addressed item
  pub fn data(&self) -> &T {
    &self.0
  }

  /// Mutably borrow the contents of the addressed item
  pub fn data_mut(&mut self) -> &mut T {
    &mut self.0
  }

  /// Copy the socket address for the data
  pub fn addr(&self) -> SocketAddr {
    self.1
  }

  /// Turn the entire structure into something else
  pub fn fold<R>(self, f: impl FnOnce(T, SocketAddr) -> R) -> R {
    f(self.0, self.1)
  }
}

impl<T> AsMut<T> for Addrd<T> {
  fn as_mut(&mut self) -> &mut T {
    &mut self.0
  }
}

/// Size of the buffer [`Transport::poll`] receives into.
///
/// Large enough for any CoAP datagram that fits in an IPv6 MTU.
pub const DGRAM_CAPACITY: usize = 1152;

/// A datagram transport the engine sends requests over and
/// the caller receives responses from.
///
/// This mirrors the Udp socket traits in embedded-nal, but allows us to
/// implement them for foreign types (like `std::net::UdpSocket`).
///
/// Implementors are expected to be non-blocking: "nothing to receive"
/// and "can't send right now" are [`nb::Error::WouldBlock`], not errors.
pub trait Transport {
  /// The error yielded by transport operations
  type Error: core::fmt::Debug;

  /// Send a datagram to a remote address
  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), Self::Error>;

  /// Pull a buffered datagram from the transport, along with the address of the sender.
  ///
  /// It is expected that (like [`std::net::UdpSocket`]) if the datagram is larger
  /// than the buffer, those bytes are dropped and not considered an error condition.
  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error>;

  /// Try to receive a datagram, yielding `Ok(None)` when there is nothing to receive.
  ///
  /// Datagrams longer than [`DGRAM_CAPACITY`] would arrive truncated,
  /// so they are logged and dropped.
  fn poll(&self) -> Result<Option<Addrd<Vec<u8>>>, Self::Error> {
    // one spare byte tells a full datagram apart from a truncated one
    let mut buf = [0u8; DGRAM_CAPACITY + 1];

    match self.recv(&mut buf) {
      | Ok(Addrd(n, addr)) if n > DGRAM_CAPACITY => {
        log::warn!("dropped datagram from {} larger than {}b", addr, DGRAM_CAPACITY);
        Ok(None)
      },
      | Ok(Addrd(n, addr)) => Ok(Some(Addrd(buf[..n].to_vec(), addr))),
      | Err(nb::Error::WouldBlock) => Ok(None),
      | Err(nb::Error::Other(e)) => Err(e),
    }
  }
}

impl<'a, T: Transport> Transport for &'a T {
  type Error = T::Error;

  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), Self::Error> {
    T::send(self, msg)
  }

  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error> {
    T::recv(self, buffer)
  }
}
