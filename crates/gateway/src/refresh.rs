//! The two-state refresh machine shared by every caller of a gateway.

/// Whether a credential refresh is in flight, and who is waiting for it.
#[derive(Debug)]
pub(crate) enum RefreshState<P> {
    Idle,
    Refreshing { parked: Vec<P> },
}

/// What an unauthorized caller has to do next.
#[derive(Debug)]
pub(crate) enum Admission<P> {
    /// No refresh was running. The caller must run one; its entry is handed back.
    Lead(P),
    /// A refresh is running and the entry has been parked behind it.
    Parked,
}

impl<P> Default for RefreshState<P> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<P> RefreshState<P> {
    /// Admits a caller whose request was rejected as unauthorized.
    pub(crate) fn admit(&mut self, entry: P) -> Admission<P> {
        match self {
            Self::Idle => {
                *self = Self::Refreshing { parked: Vec::new() };
                Admission::Lead(entry)
            }
            Self::Refreshing { parked } => {
                parked.push(entry);
                Admission::Parked
            }
        }
    }

    /// Ends the refresh and hands over every parked entry, each exactly once.
    pub(crate) fn settle(&mut self) -> Vec<P> {
        match std::mem::take(self) {
            Self::Idle => Vec::new(),
            Self::Refreshing { parked } => parked,
        }
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        matches!(self, Self::Refreshing { .. })
    }
}
