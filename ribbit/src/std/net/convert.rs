//! `std::net` and `no_std_net` are structurally identical
//! but unrelated types; these convert between them.

use ::std::{io, net as std_net};

pub(crate) fn io_to_nb(err: io::Error) -> nb::Error<io::Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(err),
  }
}

pub(crate) fn to_no_std(addr: std_net::SocketAddr) -> no_std_net::SocketAddr {
  match addr {
    | std_net::SocketAddr::V4(v4) => {
      let [a, b, c, d] = v4.ip().octets();
      let ip = no_std_net::Ipv4Addr::new(a, b, c, d);
      no_std_net::SocketAddr::V4(no_std_net::SocketAddrV4::new(ip, v4.port()))
    },
    | std_net::SocketAddr::V6(v6) => {
      let [a, b, c, d, e, f, g, h] = v6.ip().segments();
      let ip = no_std_net::Ipv6Addr::new(a, b, c, d, e, f, g, h);
      let v6 = no_std_net::SocketAddrV6::new(ip, v6.port(), v6.flowinfo(), v6.scope_id());
      no_std_net::SocketAddr::V6(v6)
    },
  }
}

pub(crate) fn to_std(addr: no_std_net::SocketAddr) -> std_net::SocketAddr {
  match addr {
    | no_std_net::SocketAddr::V4(v4) => {
      let [a, b, c, d] = v4.ip().octets();
      let ip = std_net::Ipv4Addr::new(a, b, c, d);
      std_net::SocketAddr::V4(std_net::SocketAddrV4::new(ip, v4.port()))
    },
    | no_std_net::SocketAddr::V6(v6) => {
      let [a, b, c, d, e, f, g, h] = v6.ip().segments();
      let ip = std_net::Ipv6Addr::new(a, b, c, d, e, f, g, h);
      let v6 = std_net::SocketAddrV6::new(ip, v6.port(), v6.flowinfo(), v6.scope_id());
      std_net::SocketAddr::V6(v6)
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trip() {
    for addr in ["[::1]:5683", "[fe80::1]:61616", "127.0.0.1:80"] {
      let std_addr: std_net::SocketAddr = addr.parse().unwrap();
      let no_std_addr = to_no_std(std_addr);

      assert_eq!(no_std_addr.port(), std_addr.port());
      assert_eq!(to_std(no_std_addr), std_addr);
    }
  }
}
