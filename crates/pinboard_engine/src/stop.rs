use tokio_util::sync::CancellationToken;

/// The two ways a run can be told to stop early.
///
/// Stopping the harvest ends link discovery; the links found so far are
/// still resolved. Cancelling the run stops before the next item and also
/// stops a harvest in progress.
#[derive(Debug, Clone)]
pub struct StopSignals {
    run: CancellationToken,
    harvest: CancellationToken,
}

impl Default for StopSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignals {
    pub fn new() -> Self {
        let run = CancellationToken::new();
        let harvest = run.child_token();
        Self { run, harvest }
    }

    pub fn stop_harvest(&self) {
        self.harvest.cancel();
    }

    pub fn cancel(&self) {
        self.run.cancel();
    }

    /// Stops the harvest on the first call and cancels the run on the next.
    /// Once the harvest is over, the first call cancels the run.
    pub fn interrupt(&self) {
        if self.harvest.is_cancelled() {
            self.cancel();
        } else {
            self.stop_harvest();
        }
    }

    pub fn harvest_stopped(&self) -> bool {
        self.harvest.is_cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.run.is_cancelled()
    }

    pub fn harvest_token(&self) -> &CancellationToken {
        &self.harvest
    }

    pub fn run_token(&self) -> &CancellationToken {
        &self.run
    }
}
