//! Latest-Value Mailbox
//!
//! Capacity-one buffer for pending preview frames. A new write replaces any unread
//! value, so a slow consumer always sees the freshest frame and never a backlog.

mod mailbox;

pub use mailbox::{Mailbox, MailboxStats};
