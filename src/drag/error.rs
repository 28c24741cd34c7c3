use crate::document::DocumentError;

#[derive(Debug, thiserror::Error)]
pub enum DragError {
    #[error("`{hook}` callback failed: {source}")]
    Callback {
        hook: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl DragError {
    pub(super) fn callback(hook: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Callback { hook, source }
    }

    /// Name of the failing hook, if this is a callback failure.
    pub fn hook(&self) -> Option<&'static str> {
        match self {
            Self::Callback { hook, .. } => Some(*hook),
            Self::Document(_) => None,
        }
    }
}

/// Keeps the first error, logs the rest.
pub(super) fn first_error(
    results: impl IntoIterator<Item = Result<(), DragError>>,
) -> Result<(), DragError> {
    let mut first = None;
    for result in results {
        if let Err(err) = result {
            if first.is_none() {
                first = Some(err);
            } else {
                log::warn!("additional drag callback failure: {err}");
            }
        }
    }
    first.map_or(Ok(()), Err)
}
