use std::fmt;

/// Progress notifications emitted by the workflow drivers.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A named pipeline phase began.
    PhaseStarted { name: &'static str },
    /// One input molecule finished its pass through the state machine.
    MoleculeProcessed { ordinal: usize },
    /// Free-form status text for the user.
    Message(String),
    /// The current phase completed.
    PhaseFinished,
}

pub type ProgressCallback<'a> = Box<dyn Fn(ProgressEvent) + Send + Sync + 'a>;

/// Forwards progress events to an optional consumer-supplied callback.
///
/// Library code reports unconditionally; whether anything listens is the
/// caller's choice (the CLI attaches an indicatif handler, tests attach
/// collecting closures, batch embedders attach nothing).
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("attached", &self.callback.is_some())
            .finish()
    }
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: ProgressEvent) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(ProgressEvent::PhaseFinished);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(format!("{:?}", event));
        }));

        reporter.report(ProgressEvent::PhaseStarted { name: "Test" });
        reporter.report(ProgressEvent::MoleculeProcessed { ordinal: 0 });
        reporter.report(ProgressEvent::PhaseFinished);

        let seen = events.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("PhaseStarted"));
        assert!(seen[2].contains("PhaseFinished"));
    }
}
