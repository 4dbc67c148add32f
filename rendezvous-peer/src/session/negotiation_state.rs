use std::fmt;

/// Where one side of a two-party negotiation stands.
///
/// `Closed` is terminal and reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NegotiationState {
    #[default]
    Idle,
    /// Local offer sent, waiting for the answer.
    OfferPending,
    /// Answer sent, waiting for the transport to come up.
    AnswerPending,
    Established,
    Closed,
}

impl NegotiationState {
    pub fn is_closed(self) -> bool {
        self == NegotiationState::Closed
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::Idle => "idle",
            NegotiationState::OfferPending => "offer-pending",
            NegotiationState::AnswerPending => "answer-pending",
            NegotiationState::Established => "established",
            NegotiationState::Closed => "closed",
        };
        f.write_str(name)
    }
}
