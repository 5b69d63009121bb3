//! In-memory draft of the signed-in user's working hours
//!
//! The store keeps the edited document next to the last persisted snapshot
//! and reports `dirty` by comparing the two structurally, so reverting an
//! edit by hand brings it back to clean.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use chrono::Weekday;
use serde::Serialize;
use tokio::sync::watch;

use super::ScheduleApi;
use crate::{
    config::ScheduleConfig,
    error::ScheduleError,
    models::{
        availability::DayAvailability,
        time::CalendarDate,
        working_hours::{
            DayRulePatch, OverrideSet, ScheduleDocument, ValidationIssue, DEFAULT_TIMEZONE,
        },
    },
    services::resolution,
};

const UNSAVED_CHANGES: &str = "You have unsaved changes. Leave without saving?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    Loading,
    Clean,
    Dirty,
}

/// What happened to a `load()` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched document is now the draft and snapshot
    Loaded,
    /// The first fetch failed; the default schedule is editable instead
    FellBack,
    /// A reload failed; the draft and snapshot are kept as they were
    Failed,
    /// The store was closed, reloaded or saved before the fetch finished
    Discarded,
}

/// Draft after an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftView {
    pub document: ScheduleDocument,
    pub dirty: bool,
}

/// What the editing surface shows around the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftStatus {
    pub phase: DraftPhase,
    pub saving: bool,
    /// Top-level banner for load/save failures
    pub error: Option<String>,
    /// Transient confirmation, e.g. after a save
    pub notice: Option<String>,
    /// Parts of the loaded document that had to be repaired
    pub warnings: Vec<String>,
}

/// Navigation guard decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitGuard {
    Proceed,
    Confirm { message: String },
}

struct DraftState {
    loaded: bool,
    draft: ScheduleDocument,
    snapshot: ScheduleDocument,
    error: Option<String>,
    notice: Option<String>,
    warnings: Vec<String>,
}

impl DraftState {
    fn dirty(&self) -> bool {
        self.loaded && self.draft != self.snapshot
    }

    fn view(&self) -> DraftView {
        DraftView {
            document: self.draft.clone(),
            dirty: self.dirty(),
        }
    }
}

/// Clears the in-flight save flag however `save()` returns
struct SavingFlag<'a>(&'a AtomicBool);

impl Drop for SavingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ScheduleDraftStore {
    api: Arc<dyn ScheduleApi>,
    default_timezone: String,
    reject_invalid_ranges: bool,
    state: Mutex<DraftState>,
    save_gate: tokio::sync::Mutex<()>,
    saving: AtomicBool,
    save_generation: AtomicU64,
    load_generation: AtomicU64,
    closed: AtomicBool,
    dirty_tx: watch::Sender<bool>,
}

impl ScheduleDraftStore {
    pub fn new(api: Arc<dyn ScheduleApi>) -> Self {
        let initial = ScheduleDocument::with_timezone(DEFAULT_TIMEZONE);
        let (dirty_tx, _) = watch::channel(false);
        Self {
            api,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            reject_invalid_ranges: false,
            state: Mutex::new(DraftState {
                loaded: false,
                draft: initial.clone(),
                snapshot: initial,
                error: None,
                notice: None,
                warnings: Vec::new(),
            }),
            save_gate: tokio::sync::Mutex::new(()),
            saving: AtomicBool::new(false),
            save_generation: AtomicU64::new(0),
            load_generation: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            dirty_tx,
        }
    }

    pub fn from_config(api: Arc<dyn ScheduleApi>, config: &ScheduleConfig) -> Self {
        Self::new(api)
            .with_default_timezone(&config.default_timezone)
            .with_reject_invalid_ranges(config.reject_invalid_ranges)
    }

    pub fn with_default_timezone(mut self, timezone: &str) -> Self {
        self.default_timezone = timezone.to_string();
        let initial = ScheduleDocument::with_timezone(timezone);
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.draft = initial.clone();
        state.snapshot = initial;
        self
    }

    pub fn with_reject_invalid_ranges(mut self, reject: bool) -> Self {
        self.reject_invalid_ranges = reject;
        self
    }

    fn state(&self) -> MutexGuard<'_, DraftState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &DraftState) {
        self.dirty_tx.send_replace(state.dirty());
    }

    // ---- Lifecycle ----

    /// Fetch the stored document and make it both draft and snapshot.
    ///
    /// A failed first fetch leaves the default schedule editable with the
    /// error recorded; a failed reload only records the error. The result is
    /// dropped if the store was closed, another load started, or a save ran
    /// while the fetch was in flight, since the fetched document may predate
    /// what was saved.
    pub async fn load(&self) -> LoadOutcome {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let saves_before = self.save_generation.load(Ordering::SeqCst);
        let result = self.api.fetch_schedule().await;

        let mut state = self.state();
        if self.closed.load(Ordering::SeqCst)
            || self.load_generation.load(Ordering::SeqCst) != generation
            || self.saving.load(Ordering::SeqCst)
            || self.save_generation.load(Ordering::SeqCst) != saves_before
        {
            tracing::debug!("Discarding stale working hours load");
            return LoadOutcome::Discarded;
        }

        let (document, outcome) = match result {
            Ok(raw) => {
                let normalized =
                    ScheduleDocument::normalize_with_default_timezone(&raw, &self.default_timezone);
                for warning in &normalized.warnings {
                    tracing::warn!("Loaded working hours normalized: {}", warning);
                }
                state.warnings = normalized.warnings.iter().map(ToString::to_string).collect();
                state.error = None;
                (normalized.document, LoadOutcome::Loaded)
            }
            Err(e) if state.loaded => {
                tracing::warn!("Failed to reload working hours, keeping draft: {}", e);
                state.error = Some(e.to_string());
                return LoadOutcome::Failed;
            }
            Err(e) => {
                tracing::warn!("Failed to load working hours, using defaults: {}", e);
                state.warnings.clear();
                state.error = Some(e.to_string());
                (
                    ScheduleDocument::with_timezone(&self.default_timezone),
                    LoadOutcome::FellBack,
                )
            }
        };

        state.draft = document.clone();
        state.snapshot = document;
        state.notice = None;
        state.loaded = true;
        self.publish(&state);
        outcome
    }

    /// Mark the owning view as gone; in-flight loads are discarded
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    // ---- Edits ----

    fn edit<F>(&self, apply: F) -> Result<DraftView, ScheduleError>
    where
        F: FnOnce(&mut ScheduleDocument),
    {
        let mut state = self.state();
        if !state.loaded {
            return Err(ScheduleError::StillLoading);
        }
        apply(&mut state.draft);
        state.notice = None;
        self.publish(&state);
        Ok(state.view())
    }

    pub fn set_weekly_day(&self, weekday: Weekday, patch: DayRulePatch) -> Result<DraftView, ScheduleError> {
        self.edit(|doc| {
            let weekly = std::mem::take(&mut doc.weekly);
            doc.weekly = weekly.set_day(weekday, &patch);
        })
    }

    pub fn add_override(&self, date: CalendarDate) -> Result<DraftView, ScheduleError> {
        self.edit(|doc| {
            let overrides = std::mem::take(&mut doc.overrides);
            doc.overrides = overrides.add(date);
        })
    }

    pub fn update_override(&self, date: CalendarDate, patch: DayRulePatch) -> Result<DraftView, ScheduleError> {
        self.edit(|doc| {
            let overrides = std::mem::take(&mut doc.overrides);
            doc.overrides = overrides.update(date, &patch);
        })
    }

    pub fn remove_override(&self, date: CalendarDate) -> Result<DraftView, ScheduleError> {
        self.edit(|doc| {
            let overrides: OverrideSet = std::mem::take(&mut doc.overrides);
            doc.overrides = overrides.remove(date);
        })
    }

    pub fn set_timezone(&self, timezone: impl Into<String>) -> Result<DraftView, ScheduleError> {
        let timezone = timezone.into();
        self.edit(|doc| doc.timezone = timezone)
    }

    // ---- Save / discard ----

    /// Persist the draft. Only one save runs at a time; a second call while
    /// one is in flight fails with `SaveInProgress`. On failure the draft is
    /// left untouched and stays dirty.
    pub async fn save(&self) -> Result<(), ScheduleError> {
        let _in_flight = self
            .save_gate
            .try_lock()
            .map_err(|_| ScheduleError::SaveInProgress)?;
        self.saving.store(true, Ordering::SeqCst);
        let _saving = SavingFlag(&self.saving);

        let pending = {
            let mut state = self.state();
            if !state.loaded {
                return Err(ScheduleError::StillLoading);
            }
            if !state.dirty() {
                return Ok(());
            }
            if self.reject_invalid_ranges {
                if let Some(e) = state.draft.range_errors().into_iter().next() {
                    state.error = Some(e.to_string());
                    return Err(e);
                }
            }
            state.notice = None;
            state.draft.clone()
        };

        let result = self.api.put_schedule(&pending).await;

        let mut state = self.state();
        match result {
            Ok(()) => {
                tracing::info!(overrides = pending.overrides.len(), "Working hours saved");
                state.snapshot = pending;
                self.save_generation.fetch_add(1, Ordering::SeqCst);
                state.error = None;
                state.notice = Some("Saved.".to_string());
                self.publish(&state);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to save working hours: {}", e);
                state.error = Some(e.to_string());
                self.publish(&state);
                Err(e)
            }
        }
    }

    /// Revert the draft to the last persisted snapshot
    pub fn discard(&self) -> DraftView {
        let mut state = self.state();
        state.draft = state.snapshot.clone();
        state.error = None;
        state.notice = None;
        self.publish(&state);
        state.view()
    }

    // ---- Queries ----

    pub fn is_dirty(&self) -> bool {
        self.state().dirty()
    }

    pub fn phase(&self) -> DraftPhase {
        let state = self.state();
        if !state.loaded {
            DraftPhase::Loading
        } else if state.dirty() {
            DraftPhase::Dirty
        } else {
            DraftPhase::Clean
        }
    }

    pub fn view(&self) -> DraftView {
        self.state().view()
    }

    pub fn status(&self) -> DraftStatus {
        let saving = self.saving.load(Ordering::SeqCst);
        let phase = self.phase();
        let state = self.state();
        DraftStatus {
            phase,
            saving,
            error: state.error.clone(),
            notice: state.notice.clone(),
            warnings: state.warnings.clone(),
        }
    }

    /// Inline issues of the current draft
    pub fn validation_issues(&self) -> Vec<ValidationIssue> {
        self.state().draft.validate()
    }

    /// Effective availability of `date` under the current draft. Before the
    /// first load completes the schedule counts as not configured.
    pub fn resolve(&self, date: CalendarDate) -> DayAvailability {
        let state = self.state();
        if state.loaded {
            resolution::resolve_with(
                Some(&state.draft.weekly),
                &state.draft.overrides,
                date,
                CalendarDate::weekday,
            )
        } else {
            resolution::resolve_with(None, &OverrideSet::new(), date, CalendarDate::weekday)
        }
    }

    /// Dirty flag updates, for navigation guards
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.dirty_tx.subscribe()
    }

    /// Whether leaving the editor needs confirmation
    pub fn exit_guard(&self) -> ExitGuard {
        if self.is_dirty() {
            ExitGuard::Confirm {
                message: UNSAVED_CHANGES.to_string(),
            }
        } else {
            ExitGuard::Proceed
        }
    }
}
