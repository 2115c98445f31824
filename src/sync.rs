//! View synchronizer: drives highlight, diagnostic and status presentation
//! state for a set of observed editor views.
//!
//! The engine consumes one `Event` at a time and returns `Effect`s, plain
//! data the host applies to its UI surface. It never calls a UI and never
//! reads the disk except through the injected `Filesystem`, so the whole
//! state machine is testable in memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::report::{Filesystem, ReportStore};
use crate::stats::{self, format_percent};

/// Host-assigned identifier for an open view.
pub type ViewId = u64;

/// Everything the engine needs to know about a view's document. Refreshed on
/// every focus event; the engine never reads documents itself.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub id: ViewId,
    pub path: PathBuf,
    /// Host language id, e.g. "cpp".
    pub language: String,
    pub line_count: u32,
}

/// Per-view annotation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationState {
    /// No data applied yet (or the document does not resolve).
    Unknown,
    /// Hit/miss highlights currently applied and visible.
    Annotated,
    /// Data known but hidden: the document was edited since the last
    /// annotation, or the global toggle is off.
    Suppressed,
}

#[derive(Debug, Clone)]
struct ViewState {
    snapshot: ViewSnapshot,
    annotation: AnnotationState,
}

/// Kind of a file-watch notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Created,
    Changed,
    Deleted,
}

/// External triggers, consumed one at a time.
#[derive(Debug, Clone)]
pub enum Event {
    FocusChanged(ViewSnapshot),
    DocumentChanged(ViewId),
    ReportChanged { path: PathBuf, kind: FileEventKind },
    ToggleChanged(bool),
    ViewClosed(ViewId),
}

/// Presentation instructions for the host. Highlight lines are zero-based
/// document lines; diagnostics are document-level warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Effect {
    SetHighlights {
        view: ViewId,
        hits: Vec<u32>,
        misses: Vec<u32>,
    },
    ClearHighlights {
        view: ViewId,
    },
    SetDiagnostic {
        view: ViewId,
        message: String,
    },
    ClearDiagnostic {
        view: ViewId,
    },
    SetStatus {
        text: String,
        ok: bool,
    },
    ClearStatus,
    /// A reload failed; the prior report (if any) is still active.
    ReportError {
        message: String,
    },
}

/// One row of the resolved-files overview (sidebar/tree listing).
#[derive(Debug, Clone, Serialize)]
pub struct OverviewRow {
    pub path: PathBuf,
    pub percent: Option<f64>,
    pub minimum: f64,
}

/// The synchronization state machine. Single-threaded; every call runs to
/// completion before the next event is processed.
pub struct Engine {
    store: ReportStore,
    config: Config,
    highlighting_enabled: bool,
    views: BTreeMap<ViewId, ViewState>,
    focused: Option<ViewId>,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            store: ReportStore::new(),
            config,
            highlighting_enabled: true,
            views: BTreeMap::new(),
            focused: None,
        }
    }

    #[must_use]
    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    #[must_use]
    pub fn highlighting_enabled(&self) -> bool {
        self.highlighting_enabled
    }

    #[must_use]
    pub fn annotation(&self, id: ViewId) -> Option<AnnotationState> {
        self.views.get(&id).map(|s| s.annotation)
    }

    /// Dispatch a single external event.
    pub fn handle(&mut self, event: Event, fs: &dyn Filesystem) -> Vec<Effect> {
        match event {
            Event::FocusChanged(snapshot) => self.on_focus(snapshot),
            Event::DocumentChanged(id) => self.on_document_changed(id),
            Event::ReportChanged { path, kind } => self.on_report_changed(&path, kind, fs),
            Event::ToggleChanged(true) => self.show(),
            Event::ToggleChanged(false) => self.hide(),
            Event::ViewClosed(id) => self.on_view_closed(id),
        }
    }

    /// Load a report and show coverage for all tracked views. Also serves
    /// the show-for-specific-report command; on failure the prior report
    /// stays active and the error is returned to the triggering caller.
    pub fn select_report(&mut self, path: &Path, fs: &dyn Filesystem) -> Result<Vec<Effect>> {
        self.store.load(path, fs)?;
        Ok(self.show())
    }

    /// Turn highlighting on and re-annotate every tracked view from the
    /// in-memory report; no re-parse happens here.
    pub fn show(&mut self) -> Vec<Effect> {
        self.highlighting_enabled = true;
        self.annotate_all()
    }

    /// Turn highlighting off: clear highlights and diagnostics for every
    /// gated view and hide the status summary. The active report is kept so
    /// toggling back on needs no re-parse.
    pub fn hide(&mut self) -> Vec<Effect> {
        self.highlighting_enabled = false;
        self.suppress_all(AnnotationState::Suppressed)
    }

    pub fn toggle(&mut self) -> Vec<Effect> {
        if self.highlighting_enabled {
            self.hide()
        } else {
            self.show()
        }
    }

    /// Per-file percentages for all resolved files, sorted by path.
    #[must_use]
    pub fn overview(&self) -> Vec<OverviewRow> {
        let Some(report) = self.store.active() else {
            return Vec::new();
        };
        let mut rows: Vec<OverviewRow> = report
            .resolved
            .values()
            .map(|r| OverviewRow {
                path: r.path.clone(),
                percent: stats::class_percent(&r.class),
                minimum: self.config.minimum_coverage.value(),
            })
            .collect();
        rows.sort_by(|a, b| a.path.cmp(&b.path));
        rows
    }

    fn on_focus(&mut self, snapshot: ViewSnapshot) -> Vec<Effect> {
        self.focused = Some(snapshot.id);
        let (annotation, effects) = self.annotation_for(&snapshot, true);
        self.views.insert(
            snapshot.id,
            ViewState {
                snapshot,
                annotation,
            },
        );
        effects
    }

    /// Line numbers in the report no longer correspond to the edited text;
    /// suppress immediately. Re-annotation requires an explicit show or a
    /// report reload.
    fn on_document_changed(&mut self, id: ViewId) -> Vec<Effect> {
        let focused = self.focused == Some(id);
        match self.views.get_mut(&id) {
            Some(state) if state.annotation == AnnotationState::Annotated => {
                state.annotation = AnnotationState::Suppressed;
                clear_view_effects(id, focused)
            }
            _ => Vec::new(),
        }
    }

    fn on_report_changed(
        &mut self,
        path: &Path,
        kind: FileEventKind,
        fs: &dyn Filesystem,
    ) -> Vec<Effect> {
        // Changes to other files matching the report glob are unrelated to
        // the active report.
        if !self.store.wants_reload(path) {
            return Vec::new();
        }

        match kind {
            FileEventKind::Deleted => {
                self.store.invalidate();
                self.suppress_all(AnnotationState::Unknown)
            }
            FileEventKind::Created | FileEventKind::Changed => {
                // Hide, reload, then restore visibility only if highlighting
                // was on before the change arrived.
                let restore = self.highlighting_enabled;
                let mut effects = self.hide();
                if let Err(e) = self.store.load(path, fs) {
                    tracing::warn!(error = %e, report = %path.display(), "report reload failed");
                    effects.push(Effect::ReportError {
                        message: e.to_string(),
                    });
                }
                if restore {
                    effects.extend(self.show());
                }
                effects
            }
        }
    }

    fn on_view_closed(&mut self, id: ViewId) -> Vec<Effect> {
        if self.views.remove(&id).is_none() {
            return Vec::new();
        }
        let mut effects = vec![Effect::ClearDiagnostic { view: id }];
        if self.focused == Some(id) {
            self.focused = None;
            effects.push(Effect::ClearStatus);
        }
        effects
    }

    /// Compute the annotation outcome for one view without mutating any
    /// state. Views whose language is not in the allow-list are never
    /// touched, regardless of toggle state.
    fn annotation_for(&self, snapshot: &ViewSnapshot, focused: bool) -> (AnnotationState, Vec<Effect>) {
        if !self.language_allowed(&snapshot.language) {
            return (AnnotationState::Unknown, Vec::new());
        }

        let Some(resolved) = self.store.lookup(&snapshot.path) else {
            return (
                AnnotationState::Unknown,
                clear_view_effects(snapshot.id, focused),
            );
        };

        if !self.highlighting_enabled {
            return (
                AnnotationState::Suppressed,
                clear_view_effects(snapshot.id, focused),
            );
        }

        let hit_numbers = resolved.class.hit_lines();
        let miss_numbers = resolved.class.miss_lines();

        let mut effects = vec![Effect::SetHighlights {
            view: snapshot.id,
            hits: document_lines(&hit_numbers, snapshot.line_count),
            misses: document_lines(&miss_numbers, snapshot.line_count),
        }];

        let minimum = self.config.minimum_coverage;
        let percent = stats::percent(hit_numbers.len(), miss_numbers.len());

        match percent {
            Some(p) if !minimum.meets(p) => effects.push(Effect::SetDiagnostic {
                view: snapshot.id,
                message: format!(
                    "File is not covered sufficiently ({}/{}%)",
                    format_percent(p),
                    format_percent(minimum.value())
                ),
            }),
            _ => effects.push(Effect::ClearDiagnostic { view: snapshot.id }),
        }

        if focused {
            match percent {
                Some(p) => effects.push(Effect::SetStatus {
                    text: format!("Coverage: {}%", format_percent(p)),
                    ok: minimum.meets(p),
                }),
                // No data for the focused view: hide the summary entirely.
                None => effects.push(Effect::ClearStatus),
            }
        }

        (AnnotationState::Annotated, effects)
    }

    /// Re-annotate every tracked view from the active report.
    fn annotate_all(&mut self) -> Vec<Effect> {
        let snapshots: Vec<ViewSnapshot> =
            self.views.values().map(|s| s.snapshot.clone()).collect();

        let mut effects = Vec::new();
        for snapshot in snapshots {
            let focused = self.focused == Some(snapshot.id);
            let (annotation, view_effects) = self.annotation_for(&snapshot, focused);
            if let Some(state) = self.views.get_mut(&snapshot.id) {
                state.annotation = annotation;
            }
            effects.extend(view_effects);
        }
        effects
    }

    /// Clear every gated view's presentation and hide the status summary.
    fn suppress_all(&mut self, annotation: AnnotationState) -> Vec<Effect> {
        let languages = self.config.languages.clone();
        let mut effects = Vec::new();
        for state in self.views.values_mut() {
            if !languages.contains(&state.snapshot.language) {
                continue;
            }
            effects.push(Effect::ClearHighlights {
                view: state.snapshot.id,
            });
            effects.push(Effect::ClearDiagnostic {
                view: state.snapshot.id,
            });
            state.annotation = annotation;
        }
        effects.push(Effect::ClearStatus);
        effects
    }

    fn language_allowed(&self, language: &str) -> bool {
        self.config.languages.iter().any(|l| l == language)
    }
}

/// Clear the three presentation channels for one view; the status summary
/// only belongs to the focused view.
fn clear_view_effects(view: ViewId, focused: bool) -> Vec<Effect> {
    let mut effects = vec![
        Effect::ClearHighlights { view },
        Effect::ClearDiagnostic { view },
    ];
    if focused {
        effects.push(Effect::ClearStatus);
    }
    effects
}

/// Report line numbers are 1-based; documents are zero-based. Numbers that
/// fall outside the document after conversion are silently dropped — the
/// report may reference lines beyond a truncated document.
fn document_lines(numbers: &[u32], line_count: u32) -> Vec<u32> {
    numbers
        .iter()
        .filter_map(|n| n.checked_sub(1))
        .filter(|&n| n < line_count)
        .collect()
}
