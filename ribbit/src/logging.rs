use core::fmt;

use ribbit_msg::Message;

/// One-line rendering of a message for log records
pub(crate) struct Summary<'a>(&'a Message);

impl<'a> fmt::Display for Summary<'a> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let msg = self.0;
    let [a, b, c, d] = msg.code.to_human();

    write!(f,
           "{:?}: {:?} {}{}{}{} id={} token={:02x?} with {} byte payload",
           msg.code.kind(),
           msg.ty,
           a,
           b,
           c,
           d,
           msg.id.0,
           msg.token.as_bytes(),
           msg.payload.0.len())
  }
}

pub(crate) fn msg_summary(msg: &Message) -> Summary<'_> {
  Summary(msg)
}
