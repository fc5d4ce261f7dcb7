//! Chat generation.
//!
//! [`Message`] models the two roles a grounded-answering pipeline actually
//! sends: a system instruction and a user turn. A user turn carries the
//! prompt text and, optionally, one [`ImageAttachment`] as a separate
//! multimodal part. The image is never folded into the text body.

use core::future::Future;

use crate::attachment::ImageAttachment;

/// A message in a generation request.
#[derive(Debug, Clone)]
pub enum Message {
    /// System message with instructions/context for the model.
    System {
        /// Text content of the message.
        content: String,
    },
    /// User message with content and an optional image part.
    User {
        /// Text content of the message.
        content: String,
        /// Image attached alongside the text, if any.
        image: Option<ImageAttachment>,
    },
}

impl Message {
    /// Creates a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Creates a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            image: None,
        }
    }

    /// Attaches an image to the message (only meaningful for user messages).
    #[must_use]
    pub fn with_image(mut self, attachment: ImageAttachment) -> Self {
        if let Self::User { image, .. } = &mut self {
            *image = Some(attachment);
        }
        self
    }

    /// Returns the text content of the message.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::System { content } | Self::User { content, .. } => content,
        }
    }

    /// Returns the attached image, if any.
    #[must_use]
    pub const fn image(&self) -> Option<&ImageAttachment> {
        match self {
            Self::User { image, .. } => image.as_ref(),
            Self::System { .. } => None,
        }
    }
}

/// Generates a textual reply to a sequence of messages.
///
/// Implementations wrap an external service; calls may fail or time out, and
/// both surface through the error channel. The trait does not retry; if the
/// transport wants retries it owns them.
pub trait ChatModel: Send + Sync {
    /// Generates a reply grounded in the given messages.
    fn generate(&self, messages: &[Message]) -> impl Future<Output = crate::Result> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_creation() {
        let system = Message::system("Be helpful");
        assert_eq!(system.content(), "Be helpful");
        assert!(system.image().is_none());

        let user = Message::user("What is a monad?");
        assert_eq!(user.content(), "What is a monad?");
        assert!(user.image().is_none());
    }

    #[test]
    fn image_only_attaches_to_user_messages() {
        // 1x1 transparent GIF header is enough for sniffing.
        let attachment = ImageAttachment::from_bytes(b"GIF89a\x01\x00\x01\x00".to_vec());

        let user = Message::user("describe this").with_image(attachment.clone());
        assert!(user.image().is_some());

        let system = Message::system("instructions").with_image(attachment);
        assert!(system.image().is_none());
    }
}
