use serde::Serialize;

/// Category of failure that put the dashboard into the blocking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The pool manager handle could not be created.
    ManagerUnavailable,
    /// The wallet could not tell us which account is active.
    AddressResolution,
    /// A query or action against the pool manager failed.
    RemoteCall,
}

/// Blocking notification shown to the user until dismissed.
///
/// `Clear -> Blocking` on failure; `Blocking -> Clear` only through
/// `dismiss`. The first failure's message is kept while blocking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ErrorState {
    #[default]
    Clear,
    Blocking {
        kind: FailureKind,
        message: String,
    },
}

impl ErrorState {
    pub fn is_blocking(&self) -> bool {
        matches!(self, ErrorState::Blocking { .. })
    }

    /// Returns true if this call moved the state to blocking.
    pub fn raise(&mut self, kind: FailureKind, message: impl Into<String>) -> bool {
        if self.is_blocking() {
            return false;
        }
        *self = ErrorState::Blocking {
            kind,
            message: message.into(),
        };
        true
    }

    /// Returns true if there was something to dismiss.
    pub fn dismiss(&mut self) -> bool {
        std::mem::take(self).is_blocking()
    }
}
