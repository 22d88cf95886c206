//! Minimal diagnostics sink.
//!
//! Non-fatal conditions (a destroy hook panicking, a tick callback erroring)
//! go through a narrow trait rather than a bare `eprintln!`, so tests can
//! install a capturing sink instead of asserting on stderr.

/// Receives a one-line diagnostic message for a non-fatal condition (a
/// `Destroyable::destroy` panic, a tick-callback error). Never receives
/// fatal errors — those propagate as `DiError` instead.
pub trait DiagnosticsSink {
    fn log(&self, message: &str);
}

/// Default sink: writes to stderr with the crate's `[forge-di]` prefix.
pub struct StderrSink;

impl DiagnosticsSink for StderrSink {
    fn log(&self, message: &str) {
        eprintln!("[forge-di] {message}");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DiagnosticsSink;
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct CapturingSink {
        pub messages: RefCell<Vec<String>>,
    }

    impl DiagnosticsSink for CapturingSink {
        fn log(&self, message: &str) {
            self.messages.borrow_mut().push(message.to_string());
        }
    }
}
