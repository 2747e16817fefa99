use super::HandlerApi;
use anyhow::Result;
use slog::{Logger, debug, warn};

pub struct Procedure<'a, A: HandlerApi> {
    pub api: &'a A,
    pub logger: &'a Logger,
}

impl<'a, A: HandlerApi> Procedure<'a, A> {
    pub fn new(api: &'a A, logger: &'a Logger) -> Self {
        Procedure { api, logger }
    }
    pub fn log_message(&self, s: &str) {
        debug!(self.logger, "{}", s)
    }
    /// Log, but otherwise ignore, the failure of a best effort call.
    pub fn best_effort(&self, result: Result<()>, what: &str) {
        if let Err(e) = result {
            warn!(self.logger, "{what} failed - {e}");
        }
    }
}

impl<A: HandlerApi> std::ops::Deref for Procedure<'_, A> {
    type Target = A;

    fn deref(&self) -> &Self::Target {
        self.api
    }
}
