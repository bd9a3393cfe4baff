//! Recording doubles shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use errortools::{Backend, Console, Reporter, Severity};

/// One captured event, with the annotations in effect when it was captured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedEvent {
    pub message: String,
    pub is_exception: bool,
    pub error_source: Option<String>,
    pub level: Option<Severity>,
    pub tags: BTreeMap<String, String>,
    pub extras: BTreeMap<String, String>,
    pub fingerprint: Option<Vec<String>>,
}

#[derive(Debug, Default)]
struct BackendState {
    level: Option<Severity>,
    tags: BTreeMap<String, String>,
    extras: BTreeMap<String, String>,
    fingerprint: Option<Vec<String>>,
    events: Vec<CapturedEvent>,
    flushes: usize,
}

/// How a [`RecordingBackend`] misbehaves on capture.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    Panic,
    Stall(Duration),
}

/// A backend keeping its scope and captured events in memory.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    state: Mutex<BackendState>,
    fault: Fault,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn faulty(fault: Fault) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::default(),
            fault,
        })
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn last_event(&self) -> CapturedEvent {
        self.events().pop().expect("no event captured")
    }

    pub fn extras(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().extras.clone()
    }

    pub fn tags(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().tags.clone()
    }

    pub fn level(&self) -> Option<Severity> {
        self.state.lock().unwrap().level
    }

    pub fn flushes(&self) -> usize {
        self.state.lock().unwrap().flushes
    }

    fn record(&self, message: &str, is_exception: bool, error_source: Option<String>) {
        match self.fault {
            Fault::None => {}
            Fault::Panic => panic!("backend unavailable"),
            Fault::Stall(duration) => thread::sleep(duration),
        }

        let mut state = self.state.lock().unwrap();
        let event = CapturedEvent {
            message: message.to_string(),
            is_exception,
            error_source,
            level: state.level,
            tags: state.tags.clone(),
            extras: state.extras.clone(),
            fingerprint: state.fingerprint.clone(),
        };
        state.events.push(event);
    }
}

impl Backend for RecordingBackend {
    fn set_tag(&self, key: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .tags
            .insert(key.to_string(), value.to_string());
    }

    fn remove_tag(&self, key: &str) {
        self.state.lock().unwrap().tags.remove(key);
    }

    fn set_extra(&self, key: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .extras
            .insert(key.to_string(), value.to_string());
    }

    fn remove_extra(&self, key: &str) {
        self.state.lock().unwrap().extras.remove(key);
    }

    fn set_fingerprint(&self, fingerprint: Option<&[String]>) {
        self.state.lock().unwrap().fingerprint = fingerprint.map(<[String]>::to_vec);
    }

    fn set_level(&self, level: Option<Severity>) {
        self.state.lock().unwrap().level = level;
    }

    fn capture_exception(&self, error: &(dyn std::error::Error + 'static), _level: Severity) {
        let source = error.source().map(ToString::to_string);
        self.record(&error.to_string(), true, source);
    }

    fn capture_message(&self, message: &str, _level: Severity) {
        self.record(message, false, None);
    }

    fn flush(&self, _timeout: Duration) -> bool {
        self.state.lock().unwrap().flushes += 1;
        true
    }
}

/// Message passed to [`RecordingConsole::terminate`], carried by its panic.
#[derive(Debug, PartialEq, Eq)]
pub struct Terminated(pub String);

/// A console collecting printed lines. Terminating panics with [`Terminated`].
#[derive(Debug, Default)]
pub struct RecordingConsole {
    lines: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Console for RecordingConsole {
    fn print(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }

    fn terminate(&self, message: &str) -> ! {
        std::panic::panic_any(Terminated(message.to_string()))
    }
}

/// A reporter wired to fresh recording doubles.
pub fn recording_reporter() -> (Reporter, Arc<RecordingBackend>, Arc<RecordingConsole>) {
    reporter_with(RecordingBackend::new())
}

pub fn reporter_with(
    backend: Arc<RecordingBackend>,
) -> (Reporter, Arc<RecordingBackend>, Arc<RecordingConsole>) {
    let console = RecordingConsole::new();
    let reporter = Reporter::builder()
        .backend(backend.clone())
        .console(console.clone())
        .flush_timeout(Duration::from_millis(50))
        .build();
    (reporter, backend, console)
}

/// Runs `f`, expecting it to terminate through a [`RecordingConsole`], and
/// returns the fatal message.
pub fn expect_termination(f: impl FnOnce()) -> String {
    let payload = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .expect_err("expected the reporter to terminate");
    match payload.downcast::<Terminated>() {
        Ok(terminated) => terminated.0,
        Err(_) => panic!("reporter panicked without terminating"),
    }
}
