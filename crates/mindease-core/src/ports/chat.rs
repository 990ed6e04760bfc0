//! Chat collaborator port.

/// The chat surface the controller feeds transcripts into.
///
/// The controller never sends transcript payloads directly: it mirrors the
/// transcript into the chat input and then asks the chat to send whatever
/// the input holds.
pub trait ChatPort: Send + Sync {
    /// Mirror a transcript into the input box. Interim text is rendered as
    /// provisional (`is_final == false`).
    fn fill_input(&self, text: &str, is_final: bool);

    /// Send the current input contents as a user message.
    fn request_send(&self);
}
