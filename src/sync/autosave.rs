//! Debounced autosave
//!
//! Bursts of edits coalesce into one persistence call: every `schedule_save`
//! pushes the deadline back and replaces the payload, so only the last
//! request inside a settled window is ever persisted.
//!
//! Persistence is two-phase because the network call belongs to the host.
//! `poll` hands out a `DueSave` with a ticket; the host persists it and
//! reports back through `complete`. Tickets let late completions (superseded
//! or arriving after `dispose`) be recognised and ignored.

use crate::error::{PersistError, SyncError};
use crate::models::{AuxiliarySnapshot, DueSave, SavePayload, SaveRequest, SaveTicket};
use crate::utils::scheduler::{Millis, ScheduledTask};

/// The persistence side of a save, for hosts that can persist synchronously
pub trait PersistenceSink {
    /// Persist content and auxiliary entities as one atomic unit
    fn persist(&mut self, payload: SavePayload<'_>) -> Result<(), PersistError>;
}

/// Result of reporting a persistence call back to the scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Persisted and the document is clean
    Saved,
    /// Persisted, but newer edits arrived meanwhile; still dirty
    Superseded,
    /// Persistence failed; still dirty, no automatic retry
    Failed(SyncError),
    /// Unknown ticket or scheduler disposed; nothing changed
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    ticket: SaveTicket,
    /// Edit generation captured when the request was handed out
    generation: u64,
}

#[derive(Debug)]
pub struct AutoSaveScheduler {
    debounce: Millis,
    pending: ScheduledTask<SaveRequest>,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    generation: u64,
    dirty: bool,
    lifecycle: Lifecycle,
}

impl AutoSaveScheduler {
    pub fn new(debounce: Millis) -> Self {
        Self {
            debounce,
            pending: ScheduledTask::new(),
            in_flight: None,
            next_ticket: 1,
            generation: 0,
            dirty: false,
            lifecycle: Lifecycle::Active,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    pub fn in_flight(&self) -> Option<SaveTicket> {
        self.in_flight.map(|f| f.ticket)
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.due_at()
    }

    /// Queue a save, restarting the debounce window
    pub fn schedule_save(
        &mut self,
        content: impl Into<String>,
        dirty: bool,
        auxiliary: AuxiliarySnapshot,
        timestamp: u64,
        now: Millis,
    ) {
        if self.is_disposed() {
            log::debug!("schedule_save after dispose ignored");
            return;
        }

        self.generation += 1;
        self.dirty |= dirty;
        self.pending.schedule(
            now,
            self.debounce,
            SaveRequest {
                content: content.into(),
                dirty: self.dirty,
                auxiliary,
                timestamp,
            },
        );
    }

    /// Hand out the pending request once its debounce window has settled
    pub fn poll(&mut self, now: Millis) -> Option<DueSave> {
        if self.is_disposed() {
            return None;
        }
        let request = self.pending.poll(now)?;
        Some(self.issue(request, now))
    }

    /// Skip the debounce and hand out `request` right away (manual save)
    pub fn save_now(&mut self, request: SaveRequest, now: Millis) -> Option<DueSave> {
        if self.is_disposed() {
            return None;
        }
        self.pending.cancel();
        self.dirty |= request.dirty;
        Some(self.issue(request, now))
    }

    fn issue(&mut self, request: SaveRequest, now: Millis) -> DueSave {
        let ticket = SaveTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(InFlight {
            ticket,
            generation: self.generation,
        });
        log::info!(
            "autosave {:?}: {} bytes, {} auxiliary kinds",
            ticket,
            request.content.len(),
            request.auxiliary.len()
        );
        DueSave {
            ticket,
            request,
            fired_at: now,
        }
    }

    /// Report how the persistence call for `ticket` went
    pub fn complete(&mut self, ticket: SaveTicket, result: Result<(), PersistError>) -> SaveOutcome {
        if self.is_disposed() {
            log::debug!("save {:?} completed after dispose; ignoring", ticket);
            return SaveOutcome::Ignored;
        }

        let Some(in_flight) = self.in_flight.filter(|f| f.ticket == ticket) else {
            log::debug!("stale save completion {:?}; ignoring", ticket);
            return SaveOutcome::Ignored;
        };
        self.in_flight = None;

        match result {
            Ok(()) if in_flight.generation == self.generation => {
                self.dirty = false;
                SaveOutcome::Saved
            }
            Ok(()) => SaveOutcome::Superseded,
            Err(e) => {
                log::error!("autosave {:?} failed: {}", ticket, e);
                SaveOutcome::Failed(SyncError::SaveFailed(e))
            }
        }
    }

    /// Poll and, if a save is due, persist it through `sink` immediately
    pub fn flush_due(&mut self, now: Millis, sink: &mut dyn PersistenceSink) -> Option<SaveOutcome> {
        let due = self.poll(now)?;
        let result = sink.persist(due.request.payload());
        Some(self.complete(due.ticket, result))
    }

    /// Cancel any pending save; later completions are ignored
    pub fn dispose(&mut self) {
        if self.pending.cancel().is_some() {
            log::debug!("discarding pending autosave on dispose");
        }
        self.in_flight = None;
        self.lifecycle = Lifecycle::Disposed;
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        self.dispose();
    }
}
