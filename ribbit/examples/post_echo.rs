use std::net::UdpSocket;
use std::thread;

use no_std_net::SocketAddr;
use ribbit::blocking::Client;
use ribbit::req::ReqBuilder;
use ribbit::resp::code;
use ribbit_msg::known::ContentFormat;
use ribbit_msg::{known, Message, TryFromBytes, TryIntoBytes};

const SERVER_PORT: u16 = 5683;

/// Answer every POST to `echo` with its own payload
fn spawn_echo_server() -> thread::JoinHandle<()> {
  let sock = UdpSocket::bind(("127.0.0.1", SERVER_PORT)).unwrap();

  thread::spawn(move || {
    let mut buf = [0u8; 1152];
    let (n, from) = sock.recv_from(&mut buf).unwrap();
    let req = Message::try_from_bytes(&buf[..n]).unwrap();

    let path = req.get_all(known::URI_PATH)
                  .filter_map(|v| v.as_str())
                  .collect::<Vec<_>>();
    log::info!("server: {} /{}", req.code.to_string(), path.join("/"));

    let mut rep = req.ack();
    rep.token = req.token;
    rep.code = match path.as_slice() {
      | ["echo"] => code::CONTENT,
      | _ => code::NOT_FOUND,
    };
    rep.payload = req.payload;

    sock.send_to(&rep.try_into_bytes().unwrap(), from).unwrap();
  })
}

fn main() {
  simple_logger::init_with_level(log::Level::Info).unwrap();

  let server = spawn_echo_server();

  let mut client = Client::new_std(0).unwrap();
  let req = ReqBuilder::post("echo").content_format(ContentFormat::Text)
                                    .payload("hello from CoAP")
                                    .build()
                                    .unwrap();

  let addr: SocketAddr = format!("127.0.0.1:{}", SERVER_PORT).parse().unwrap();

  match client.send(req, addr) {
    | Ok(rep) => log::info!("client: {} {} {:?}",
                            rep.data().code.to_string(),
                            code::reason(rep.data().code).unwrap_or("?"),
                            rep.data().payload_str()),
    | Err(e) => log::error!("client: {:?}", e),
  }

  server.join().unwrap();
}
