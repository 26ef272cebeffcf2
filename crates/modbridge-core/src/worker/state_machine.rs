//! Worker session state machine (§4.1): a small graph validator. The actual
//! transitions happen in the worker binary (they require I/O); this module
//! only answers "is this edge legal" so the driver can assert invariants
//! instead of silently skipping states.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    Init,
    FetchingCreds,
    Connecting,
    Online,
    Draining,
    Offline,
    Backoff,
    TerminalExit,
}

impl WorkerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkerState::TerminalExit)
    }

    /// `true` if transitioning from `self` to `to` is one of the edges in
    /// the §4.1 state diagram.
    pub fn can_transition(self, to: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, to),
            (Init, FetchingCreds)
                | (FetchingCreds, Connecting)
                | (FetchingCreds, Backoff)
                | (Connecting, Online)
                | (Connecting, Offline)
                | (Online, Online)
                | (Online, Offline)
                | (Offline, Backoff)
                | (Backoff, Connecting)
                | (Backoff, TerminalExit)
                | (_, Draining)
                | (Draining, TerminalExit)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkerState::*;

    #[test]
    fn happy_path_is_legal() {
        assert!(Init.can_transition(FetchingCreds));
        assert!(FetchingCreds.can_transition(Connecting));
        assert!(Connecting.can_transition(Online));
        assert!(Online.can_transition(Offline));
        assert!(Offline.can_transition(Backoff));
        assert!(Backoff.can_transition(Connecting));
    }

    #[test]
    fn draining_reachable_from_any_state() {
        for s in [Init, FetchingCreds, Connecting, Online, Offline, Backoff] {
            assert!(s.can_transition(Draining), "{s:?} -> Draining should be legal");
        }
        assert!(Draining.can_transition(TerminalExit));
    }

    #[test]
    fn circuit_breaker_exit_is_legal() {
        assert!(Backoff.can_transition(TerminalExit));
    }

    #[test]
    fn illegal_edges_are_rejected() {
        assert!(!Init.can_transition(Online));
        assert!(!Offline.can_transition(Online));
        assert!(!TerminalExit.can_transition(Connecting));
    }

    #[test]
    fn terminal_exit_is_terminal() {
        assert!(TerminalExit.is_terminal());
        assert!(!Online.is_terminal());
    }
}
