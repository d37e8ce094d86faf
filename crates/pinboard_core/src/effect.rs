#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Trigger incremental page growth.
    Scroll,
    /// Stop harvesting.
    Finish { reason: FinishReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// No growth for the configured number of consecutive rounds.
    Stalled,
    Cancelled,
    QueryFailed(String),
}
