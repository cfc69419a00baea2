use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "request cancelled")
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == FailureKind::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Aborted by the pipeline's own cancellation.
    Cancelled,
    Timeout,
    Network,
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}

/// Every way an enrichment attempt can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ValidationRejected,
    Cancelled,
    TransportError(String),
    ServerError(Option<String>),
    EmptyResult,
    NoOpMerge,
    PartialMerge(usize),
}

impl Outcome {
    pub fn from_fetch_error(err: &FetchError) -> Self {
        if err.is_cancelled() {
            Outcome::Cancelled
        } else {
            Outcome::TransportError(err.to_string())
        }
    }

    /// The single notice this outcome produces, if any.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Outcome::ValidationRejected | Outcome::Cancelled => None,
            Outcome::TransportError(_) => Some(Notice::error(
                "Could not reach the enrichment service. Please fill in the details manually.",
            )),
            Outcome::ServerError(message) => Some(Notice::error(
                message
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .unwrap_or("Failed to fetch details from the link."),
            )),
            Outcome::EmptyResult => Some(Notice::info("No details found for this link.")),
            Outcome::NoOpMerge => Some(Notice::info(
                "All fields are already filled in; nothing was changed.",
            )),
            Outcome::PartialMerge(count) => Some(Notice::success(format!(
                "Filled in {count} field{} from the link.",
                if *count == 1 { "" } else { "s" }
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeKind::Success => write!(f, "success"),
            NoticeKind::Info => write!(f, "info"),
            NoticeKind::Warning => write!(f, "warning"),
            NoticeKind::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, text)
    }
}
