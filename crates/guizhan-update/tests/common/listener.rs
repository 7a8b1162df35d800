//! Listener that records callbacks for assertions

use guizhan_update::{BuildInfo, ErrorKind, StagedArtifact, UpdateListener};
use std::sync::Mutex;

/// One recorded callback
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    UpdateAvailable(BuildInfo),
    Staged(StagedArtifact),
    Failed(ErrorKind, String),
}

#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<Event>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<(ErrorKind, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Failed(kind, detail) => Some((kind, detail)),
                _ => None,
            })
            .collect()
    }

    pub fn staged(&self) -> Vec<StagedArtifact> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Staged(staged) => Some(staged),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl UpdateListener for RecordingListener {
    fn on_update_available(&self, build: &BuildInfo) {
        self.push(Event::UpdateAvailable(build.clone()));
    }

    fn on_staged(&self, staged: &StagedArtifact) {
        self.push(Event::Staged(staged.clone()));
    }

    fn on_failed(&self, kind: ErrorKind, detail: &str) {
        self.push(Event::Failed(kind, detail.to_string()));
    }
}
