//! Classification of text messages sent by the server after an upload.
//!
//! The server streams zero or more `Transcription:` updates and then exactly
//! one terminal message. Terminal messages that start with one of the
//! server's failure texts (speech-to-text unavailable, transcription failed,
//! generation failed) are server-side errors; anything else, including model
//! output that happens to begin with the word "Error", is the final response.

pub const TRANSCRIPTION_PREFIX: &str = "Transcription:";

const SERVER_ERROR_PREFIXES: [&str; 3] = [
    "Error:",
    "Error transcribing audio:",
    "Error processing message:",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Intermediate update; the exchange continues.
    Transcription(String),
    /// Terminal message reporting a server-side failure.
    ServerError(String),
    /// Terminal response.
    Final(String),
}

impl Reply {
    #[must_use]
    pub fn classify(text: String) -> Self {
        if text.starts_with(TRANSCRIPTION_PREFIX) {
            return Self::Transcription(text);
        }
        if SERVER_ERROR_PREFIXES
            .iter()
            .any(|prefix| text.starts_with(prefix))
        {
            return Self::ServerError(text);
        }
        Self::Final(text)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Transcription(_))
    }

    /// The message exactly as the server sent it.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Transcription(text) | Self::ServerError(text) | Self::Final(text) => text,
        }
    }
}

#[cfg(test)]
#[path = "reply_test.rs"]
mod tests;
