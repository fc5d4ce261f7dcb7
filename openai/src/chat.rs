//! [`ChatModel`] implementation.

use lectern_core::{ChatModel, Message, Result as CoreResult};
use serde::{Deserialize, Serialize};

use crate::client::OpenAi;
use crate::error::OpenAiError;

impl ChatModel for OpenAi {
    async fn generate(&self, messages: &[Message]) -> CoreResult {
        let reply = self.generate_once(messages).await?;
        Ok(reply)
    }
}

impl OpenAi {
    async fn generate_once(&self, messages: &[Message]) -> Result<String, OpenAiError> {
        let request = ChatRequest {
            model: &self.config().chat_model,
            messages: messages.iter().map(to_wire).collect(),
            max_tokens: self.config().max_tokens,
            temperature: self.config().temperature,
        };

        tracing::debug!(model = %request.model, messages = request.messages.len(), "chat request");
        let response: ChatResponse = self
            .http()
            .post(self.endpoint("/chat/completions"))
            .bearer_auth(&self.config().api_key)
            .timeout(self.config().chat_timeout)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| OpenAiError::Api("chat response missing choices".into()))
    }
}

/// Converts a capability-layer message into the OpenAI wire shape. A user
/// message with an image becomes a two-part content array: the text part and
/// an `image_url` part carrying the payload as a data URL.
fn to_wire(message: &Message) -> WireMessage {
    match message {
        Message::System { content } => WireMessage {
            role: "system",
            content: WireContent::Text(content.clone()),
        },
        Message::User { content, image } => {
            let content = match image {
                None => WireContent::Text(content.clone()),
                Some(attachment) => WireContent::Parts(vec![
                    Part::Text {
                        text: content.clone(),
                    },
                    Part::ImageUrl {
                        image_url: ImageUrl {
                            url: attachment.data_url(),
                        },
                    },
                ]),
            };
            WireMessage {
                role: "user",
                content,
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: WireContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<Part>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Part {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}
