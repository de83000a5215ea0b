//! # CLI Display Module
//!
//! User-facing terminal messages: an action word plus details, tagged with a
//! message type. Everything the user sees outside of the rendered diff goes
//! through `show_message!`.

/// The types of messages that can be displayed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Highlight,
    Error,
}

/// A message to display: a short action word and the details.
#[derive(Debug, Clone)]
pub struct Message {
    pub action: String,
    pub details: String,
}

impl Message {
    pub fn new(action: String, details: String) -> Self {
        Self { action, details }
    }
}

impl MessageType {
    /// Highlight and error messages go to stderr, keeping stdout reserved for
    /// the rendered statements so plan output stays pipeable.
    fn to_stderr(self) -> bool {
        matches!(self, MessageType::Highlight | MessageType::Error)
    }
}

pub fn show_message_wrapper(message_type: MessageType, message: Message) {
    if message_type.to_stderr() {
        eprintln!("{:>12} {}", message.action, message.details);
    } else {
        println!("{:>12} {}", message.action, message.details);
    }
}

#[macro_export]
macro_rules! show_message {
    ($message_type:expr, $message:expr) => {
        $crate::cli::display::show_message_wrapper($message_type, $message)
    };
}
