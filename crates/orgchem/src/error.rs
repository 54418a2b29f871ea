//! Error types for the site client

use thiserror::Error;

/// Failure of a single GET
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The resource answered with a non-2xx status
    #[error("`{url}` answered with status {status}")]
    Status { url: String, status: u16 },

    /// The request never produced a response
    #[error("request for `{url}` failed: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. } | FetchError::Network { url, .. } => url,
        }
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Network { .. } => None,
        }
    }
}

/// Failure while handling one navigation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A node the route needs never appeared
    #[error("element `{selector}` not found after {attempts} attempts")]
    NodeMissing { selector: String, attempts: u32 },

    /// The lesson layout has no place to put lesson content
    #[error("no content container for lesson `{topic}`")]
    NoLessonContainer { topic: String },

    /// A newer navigation took over; nothing was rendered
    #[error("navigation superseded by a newer one")]
    Superseded,
}

impl RouteError {
    pub fn is_superseded(&self) -> bool {
        matches!(self, RouteError::Superseded)
    }
}

/// Failure to bring the application up
#[derive(Debug, Error)]
pub enum AppError {
    #[error("`#app` container not found")]
    AppContainerMissing,

    #[error("could not create region `#{0}`")]
    Region(&'static str),

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Invalid value in `orgchem.toml`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base_path `{0}` must start with `/` and must not end with `/`")]
    BasePath(String),

    #[error("sidebar_poll_max_attempts must be at least 1")]
    PollAttempts,

    #[error("topic `{0}` is listed more than once")]
    DuplicateTopic(String),

    #[error("topic id `{0}` must be a single non-empty path segment")]
    TopicId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_accessors() {
        let err = FetchError::Status {
            url: "/content/pages/faq.html".into(),
            status: 404,
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.url(), "/content/pages/faq.html");
        assert_eq!(err.to_string(), "`/content/pages/faq.html` answered with status 404");
    }

    #[test]
    fn test_route_error_from_fetch() {
        let err: RouteError = FetchError::Network {
            url: "/templates/footer.html".into(),
            message: "offline".into(),
        }
        .into();
        assert!(!err.is_superseded());
        assert!(err.to_string().contains("offline"));
        assert!(RouteError::Superseded.is_superseded());
    }
}
