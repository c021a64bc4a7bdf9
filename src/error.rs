use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssistError>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    InvalidBody(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("could not build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(
        "could not find a JSON object containing `{expected}` in model output: {}",
        one_line(.raw)
    )]
    Extraction { expected: String, raw: String },
    #[error("unexpected model output: {0}")]
    Domain(String),
}

const PREVIEW_CHARS: usize = 200;

/// Collapses whitespace runs to single spaces and truncates long text.
fn one_line(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > PREVIEW_CHARS {
        let head: String = collapsed.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        collapsed
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_converts() {
        let err: AssistError = TransportError::Status {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, AssistError::Transport(_)));
        assert_eq!(err.to_string(), "server returned HTTP 500: boom");
    }

    #[test]
    fn test_extraction_error_keeps_raw_text() {
        let err = AssistError::Extraction {
            expected: "suggestions".to_string(),
            raw: "sorry, I cannot help".to_string(),
        };
        assert!(err.to_string().contains("sorry, I cannot help"));
        assert!(err.to_string().contains("`suggestions`"));
    }

    #[test]
    fn test_extraction_message_is_single_line() {
        let raw = format!("line one\n\n  line two\r\n{}", "x".repeat(500));
        let err = AssistError::Extraction {
            expected: "explanation".to_string(),
            raw: raw.clone(),
        };
        let message = err.to_string();
        assert!(!message.contains('\n'));
        assert!(!message.contains('\r'));
        assert!(message.contains("line one line two"));
        assert!(message.ends_with("..."));
        match err {
            AssistError::Extraction { raw: kept, .. } => assert_eq!(kept, raw),
            _ => unreachable!(),
        }
    }
}
