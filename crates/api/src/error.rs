//! Account loader error types.

use std::sync::Arc;

/// A clonable trait-object inner error.
#[derive(Clone, Default)]
pub struct DynInnerError(
    pub Option<Arc<dyn std::error::Error + 'static + Send + Sync>>,
);

impl std::fmt::Debug for DynInnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for DynInnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.as_ref() {
            None => f.write_str("None"),
            Some(s) => s.fmt(f),
        }
    }
}

impl std::error::Error for DynInnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.as_ref().map(|s| {
            let out: &(dyn std::error::Error + 'static) = &**s;
            out
        })
    }
}

impl DynInnerError {
    /// Construct a new DynInnerError from a source error.
    pub fn new<E: std::error::Error + 'static + Send + Sync>(e: E) -> Self {
        Self(Some(Arc::new(e)))
    }
}

/// The account loader error type.
///
/// This type is required to implement `Clone`: a single failed gateway
/// call settles every caller that contributed to it with the same error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoaderError {
    /// Generic internal error.
    #[error("{ctx} (src: {src})")]
    Other {
        /// Any context associated with this error.
        ctx: Arc<str>,

        /// The inner error (if any).
        #[source]
        src: DynInnerError,
    },

    /// The remote fetch gateway failed to serve a call.
    #[error("gateway error: {ctx} (src: {src})")]
    Gateway {
        /// Any context associated with this error.
        ctx: Arc<str>,

        /// The inner error (if any).
        #[source]
        src: DynInnerError,
    },

    /// A caller submitted a request that can never be served.
    #[error("malformed request: {ctx}")]
    MalformedRequest {
        /// What was wrong with the request.
        ctx: Arc<str>,
    },

    /// A multi-key call returned a result list that does not line up
    /// with the requested addresses.
    #[error("response mismatch: requested {expected} accounts, received {actual}")]
    ResponseMismatch {
        /// Number of addresses requested.
        expected: usize,

        /// Number of results received.
        actual: usize,
    },

    /// Account data could not be decoded or re-encoded.
    #[error("codec error: {ctx} (src: {src})")]
    Codec {
        /// Any context associated with this error.
        ctx: Arc<str>,

        /// The inner error (if any).
        #[source]
        src: DynInnerError,
    },
}

fn to_ctx<C: std::fmt::Display>(ctx: C) -> Arc<str> {
    ctx.to_string().into_boxed_str().into()
}

impl LoaderError {
    /// Construct an "other" error with an inner source error.
    pub fn other_src<
        C: std::fmt::Display,
        S: std::error::Error + 'static + Send + Sync,
    >(
        ctx: C,
        src: S,
    ) -> Self {
        Self::Other {
            ctx: to_ctx(ctx),
            src: DynInnerError::new(src),
        }
    }

    /// Construct an "other" error.
    pub fn other<C: std::fmt::Display>(ctx: C) -> Self {
        Self::Other {
            ctx: to_ctx(ctx),
            src: DynInnerError::default(),
        }
    }

    /// Construct a gateway error with an inner source error.
    pub fn gateway_src<
        C: std::fmt::Display,
        S: std::error::Error + 'static + Send + Sync,
    >(
        ctx: C,
        src: S,
    ) -> Self {
        Self::Gateway {
            ctx: to_ctx(ctx),
            src: DynInnerError::new(src),
        }
    }

    /// Construct a gateway error.
    pub fn gateway<C: std::fmt::Display>(ctx: C) -> Self {
        Self::Gateway {
            ctx: to_ctx(ctx),
            src: DynInnerError::default(),
        }
    }

    /// Construct a malformed request error.
    pub fn malformed<C: std::fmt::Display>(ctx: C) -> Self {
        Self::MalformedRequest {
            ctx: to_ctx(ctx),
        }
    }

    /// Construct a codec error with an inner source error.
    pub fn codec_src<
        C: std::fmt::Display,
        S: std::error::Error + 'static + Send + Sync,
    >(
        ctx: C,
        src: S,
    ) -> Self {
        Self::Codec {
            ctx: to_ctx(ctx),
            src: DynInnerError::new(src),
        }
    }
}

/// The account loader result type.
pub type LoaderResult<T> = Result<T, LoaderError>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            "bla (src: None)",
            LoaderError::other("bla").to_string().as_str(),
        );
        assert_eq!(
            "foo (src: bar)",
            LoaderError::other_src("foo", std::io::Error::other("bar"))
                .to_string()
                .as_str(),
        );
        assert_eq!(
            "gateway error: timeout (src: None)",
            LoaderError::gateway("timeout").to_string().as_str(),
        );
        assert_eq!(
            "malformed request: no encoding",
            LoaderError::malformed("no encoding").to_string().as_str(),
        );
        assert_eq!(
            "response mismatch: requested 3 accounts, received 2",
            LoaderError::ResponseMismatch {
                expected: 3,
                actual: 2
            }
            .to_string()
            .as_str(),
        );
    }

    #[test]
    fn error_debug() {
        assert_eq!(
            "Other { ctx: \"bla\", src: None }",
            format!("{:?}", LoaderError::other("bla")).as_str(),
        );
        assert_eq!(
            "Gateway { ctx: \"foo\", src: Some(Custom { kind: Other, error: \"bar\" }) }",
            format!(
                "{:?}",
                LoaderError::gateway_src("foo", std::io::Error::other("bar"))
            )
            .as_str(),
        );
    }

    #[test]
    fn cloned_error_shares_source() {
        let err =
            LoaderError::gateway_src("down", std::io::Error::other("503"));
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert!(std::error::Error::source(&cloned).is_some());
    }

    #[test]
    fn ensure_loader_error_type_is_send_and_sync() {
        fn ensure<T: std::fmt::Display + Send + Sync>(_t: T) {}
        ensure(LoaderError::other("bla"));
    }
}
