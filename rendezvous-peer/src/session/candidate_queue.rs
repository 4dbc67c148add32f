use rendezvous_core::IceCandidate;

/// Remote candidates that arrived before the remote description.
///
/// Drained exactly once; after that every push is refused and the caller
/// applies candidates directly.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    pending: Vec<IceCandidate>,
    drained: bool,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` once the queue has been drained or discarded.
    pub fn push(&mut self, candidate: IceCandidate) -> bool {
        if self.drained {
            return false;
        }
        self.pending.push(candidate);
        true
    }

    /// Everything queued, in receipt order. Empty on every call after the first.
    pub fn drain(&mut self) -> Vec<IceCandidate> {
        if self.drained {
            return Vec::new();
        }
        self.drained = true;
        std::mem::take(&mut self.pending)
    }

    pub fn discard(&mut self) {
        self.drained = true;
        self.pending.clear();
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
