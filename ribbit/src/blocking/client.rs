use std::time::Duration;

use embedded_time::Clock as _;
use embedded_time::Instant;
use no_std_net::SocketAddr;
use ribbit_msg::Message;

use crate::completion::{self, Canceled, Receiver};
use crate::config::Config;
use crate::engine::{self, Engine};
use crate::interaction::Failure;
use crate::net::{Addrd, Transport};
use crate::registry::Handle;
use crate::time::Clock;

/// How long [`Client::send`] sleeps when there was nothing to receive
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Platform struct containing things needed to make a new Client.
///
/// This is used for bring-your-own platform use cases, like embedded.
#[derive(Clone, Debug)]
pub struct ClientConfig<Clock, Transport> {
  /// The clock that the ribbit runtime will use
  /// to keep track of time.
  ///
  /// For `std` platforms, this is [`crate::std::Clock`].
  pub clock: Clock,
  /// The network abstraction that the ribbit runtime
  /// will use to interact with the network.
  ///
  /// For `std` platforms, this is [`std::net::UdpSocket`].
  pub transport: Transport,
}

/// Errors encounterable by [`Client::send`]
#[derive(Debug)]
pub enum Error<E> {
  /// The engine refused the request
  Engine(engine::Error),
  /// The request timed out or was reset
  Failed(Failure),
  /// Receiving from the transport failed
  Transport(E),
  /// The clock could not be read
  Clock,
  /// The interaction was dropped before it completed
  Canceled,
}

/// A blocking CoAP request client
#[derive(Debug)]
pub struct Client<C: Clock, T: Transport> {
  clock: C,
  engine: Engine<C, T>,
}

impl Client<crate::std::Clock, std::net::UdpSocket> {
  /// Create a new Client for a platform supporting Rust's standard library.
  ///
  /// ```no_run
  /// use ribbit::blocking::Client;
  /// use ribbit::req::ReqBuilder;
  /// use ribbit_msg::known::ContentFormat;
  ///
  /// let mut client = Client::new_std(1111).unwrap();
  /// let req = ReqBuilder::get("hello").accept(ContentFormat::Text)
  ///                                   .build()
  ///                                   .unwrap();
  ///
  /// let rep = client.send(req, "127.0.0.1:5683".parse().unwrap()).unwrap();
  ///
  /// println!("Hello, {}!", rep.data().payload_str().unwrap());
  /// ```
  pub fn new_std(port: u16) -> std::io::Result<Self> {
    Self::new_std_config(port, Config::default())
  }

  /// Create a new std client with a specific runtime config
  pub fn new_std_config(port: u16, config: Config) -> std::io::Result<Self> {
    let clock = crate::std::Clock::new();
    let transport = crate::std::bind(port)?;
    Ok(Self::new_config(config, ClientConfig { clock, transport }))
  }
}

impl<C: Clock, T: Transport> Client<C, T> {
  /// Create a new request client
  pub fn new(client: ClientConfig<C, T>) -> Self {
    Self::new_config(Config::default(), client)
  }

  /// Create a new request client with a specific runtime config
  pub fn new_config(config: Config, ClientConfig { clock, transport }: ClientConfig<C, T>) -> Self {
    Self { clock,
           engine: Engine::new_config(config, transport) }
  }

  /// The engine driving this client's requests
  pub fn engine(&self) -> &Engine<C, T> {
    &self.engine
  }

  /// Send a request to `addr`, blocking until it yields a response,
  /// times out, or is reset.
  ///
  /// If the transport or clock fails while waiting, the request is canceled.
  pub fn send(&mut self, req: Message, addr: SocketAddr) -> Result<Addrd<Message>, Error<T::Error>> {
    let (tx, rx) = completion::channel();
    let now = self.now()?;
    let handle = self.engine
                     .submit(now, req, addr, tx)
                     .map_err(Error::Engine)?;

    self.wait(handle, &rx).map_err(|e| {
                              self.engine.cancel(handle);
                              e
                            })
  }

  fn wait(&mut self, handle: Handle, rx: &Receiver) -> Result<Addrd<Message>, Error<T::Error>> {
    loop {
      match rx.poll() {
        | Ok(outcome) => {
          self.engine.state_of(handle);
          break outcome.map_err(Error::Failed);
        },
        | Err(nb::Error::Other(Canceled)) => break Err(Error::Canceled),
        | Err(nb::Error::WouldBlock) => (),
      }

      let now = self.now()?;
      self.engine.tick(now);

      match self.engine.transport().poll().map_err(Error::Transport)? {
        | Some(Addrd(bytes, sender)) => {
          if let Err(e) = self.engine.deliver(&bytes, sender) {
            log::debug!("dropped datagram from {}: {:?}", sender, e.what);
          }
        },
        | None => std::thread::sleep(IDLE_SLEEP),
      }
    }
  }

  fn now<E>(&self) -> Result<Instant<C>, Error<E>> {
    self.clock.try_now().map_err(|_| Error::Clock)
  }
}
