use std::io;
use std::net::UdpSocket;

use crate::net::{Addrd, Transport};

mod convert;

/// Bind a UDP socket to `0.0.0.0:port` in non-blocking mode
pub fn bind(port: u16) -> io::Result<UdpSocket> {
  let sock = UdpSocket::bind(("0.0.0.0", port))?;
  sock.set_nonblocking(true)?;
  Ok(sock)
}

impl Transport for UdpSocket {
  type Error = io::Error;

  fn send(&self, msg: Addrd<&[u8]>) -> nb::Result<(), Self::Error> {
    self.set_nonblocking(true)
        .and_then(|_| {
          UdpSocket::send_to(self, msg.data(), convert::to_std(msg.addr()))
        })
        .map(|_| ())
        .map_err(convert::io_to_nb)
  }

  fn recv(&self, buffer: &mut [u8]) -> nb::Result<Addrd<usize>, Self::Error> {
    self.set_nonblocking(true)
        .and_then(|_| self.recv_from(buffer))
        .map(|(n, addr)| Addrd(n, convert::to_no_std(addr)))
        .map_err(convert::io_to_nb)
  }
}

#[cfg(test)]
mod tests {
  use no_std_net::{Ipv4Addr, SocketAddr, SocketAddrV4};

  use super::*;

  #[test]
  fn loopback() {
    let a = bind(0).unwrap();
    let b = bind(0).unwrap();
    let b_port = b.local_addr().unwrap().port();
    let b_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, b_port));

    assert!(b.poll().unwrap().is_none());

    Transport::send(&a, Addrd(&[1u8, 2, 3][..], b_addr)).unwrap();

    let recvd = loop {
      if let Some(dgram) = b.poll().unwrap() {
        break dgram;
      }
    };

    assert_eq!(recvd.data(), &vec![1, 2, 3]);
    assert_eq!(recvd.addr().port(), a.local_addr().unwrap().port());
  }
}
