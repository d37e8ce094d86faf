#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Hrefs of the item links visible after this round's query, in page order.
    /// A timed-out query arrives as an empty batch.
    BatchQueried(Vec<String>),
    /// The query hit a stale element; the round is retried.
    BatchStale,
    /// The query failed for a reason other than staleness.
    QueryFailed(String),
    /// User interrupt observed between rounds.
    CancelRequested,
}
