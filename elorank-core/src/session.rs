/// Per-session context: how many comparisons have been made, and whether the
/// session has been asked to stop.
///
/// Created when a session starts and dropped when it ends. The stop signal is
/// one-way: once raised it stays raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Session {
    comparisons: usize,
    stopped: bool,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Continue counting from a previous session's total.
    pub fn resume(comparisons: usize) -> Self {
        Session {
            comparisons,
            stopped: false,
        }
    }

    /// Cumulative number of applied comparisons. Also serves as the identifier
    /// of the snapshot written at the end of the session.
    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Raise the stop signal. The matchmaker exits before presenting its next pair.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub(crate) fn record_comparison(&mut self) {
        self.comparisons += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_sticky() {
        let mut session = Session::resume(41);
        assert!(!session.is_stopped());
        session.stop();
        session.record_comparison();
        assert!(session.is_stopped());
        assert_eq!(session.comparisons(), 42);
    }
}
