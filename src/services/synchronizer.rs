use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::gateway::GradeGateway;
use crate::models::{
    Assignment, AssignmentEdit, Course, CourseSummary, NewAssignmentRequest, UpdateAssignmentInput,
    UpdateCourseInput,
};
use crate::services::pending::{ChangePayload, EntityKind, PendingChange, PendingChanges};
use crate::services::scheduler::DebounceScheduler;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Outcome of one flush cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub pushed: usize,
    pub failed: usize,
    pub still_pending: usize,
    pub refetched: bool,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    pub pending: usize,
    pub flush_scheduled: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Local mirror of the remote course list with optimistic edits.
///
/// Edits and deletes apply to local state immediately and queue one pending
/// change per entity. The queue is flushed after a quiet period (or on
/// demand), failed entries are queued again, and the local state is then
/// replaced by a fresh snapshot from the gateway with the still-pending
/// changes replayed on top. Creation is never optimistic: the entity appears
/// locally only once the gateway returns its id.
///
/// Cloning yields another handle to the same state. Handlers called outside
/// a tokio runtime still apply and queue their change, but no flush is armed
/// until the next `handle_sync_now`.
#[derive(Clone)]
pub struct CourseSynchronizer {
    inner: Arc<Inner>,
}

struct Inner {
    gateway: Arc<dyn GradeGateway>,
    state: Mutex<LocalState>,
    scheduler: DebounceScheduler,
}

#[derive(Default)]
struct LocalState {
    courses: Vec<Course>,
    pending: PendingChanges,
    /// Assignments the server drops on its own (course deleted, what-if
    /// ledger replaced) while it still lists them.
    orphaned: HashSet<String>,
    /// Locally deleted assignments, kept while the server still lists them.
    removed: HashMap<String, RemovedAssignment>,
    last_synced_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

struct RemovedAssignment {
    course_id: String,
    is_theoretical: bool,
}

impl LocalState {
    fn rename_course(&mut self, course_id: &str, name: &str) -> bool {
        let Some(course) = self.courses.iter_mut().find(|c| c.id == course_id) else {
            return false;
        };
        course.name = name.to_string();
        self.pending.set(
            course_id,
            PendingChange::update_course(UpdateCourseInput {
                id: course_id.to_string(),
                name: Some(name.to_string()),
            }),
        );
        true
    }

    fn delete_course(&mut self, course_id: &str) -> bool {
        let Some(pos) = self.courses.iter().position(|c| c.id == course_id) else {
            return false;
        };
        let course = self.courses.remove(pos);

        // The server drops a course's assignments with it.
        let mut orphaned: Vec<String> = course.assignment_ids().map(str::to_string).collect();
        orphaned.extend(
            self.removed
                .iter()
                .filter(|(_, r)| r.course_id == course_id)
                .map(|(id, _)| id.clone()),
        );
        self.forget_assignments(orphaned);

        self.pending.set(course_id, PendingChange::delete_course(course_id));
        true
    }

    fn edit_assignment(&mut self, assignment_id: &str, edit: &AssignmentEdit) -> bool {
        let Some(assignment) = self
            .courses
            .iter_mut()
            .find_map(|c| c.assignment_mut(assignment_id))
        else {
            return false;
        };
        edit.apply(assignment);
        let input = UpdateAssignmentInput::from_assignment(assignment);
        self.pending.set(assignment_id, PendingChange::update_assignment(input));
        true
    }

    fn delete_assignment(&mut self, assignment_id: &str) -> bool {
        let Some((course_id, assignment)) = self.courses.iter_mut().find_map(|c| {
            let assignment = c.remove_assignment(assignment_id)?;
            Some((c.id.clone(), assignment))
        }) else {
            return false;
        };
        self.removed.insert(
            assignment_id.to_string(),
            RemovedAssignment {
                course_id,
                is_theoretical: assignment.is_theoretical,
            },
        );
        self.pending
            .set(assignment_id, PendingChange::delete_assignment(assignment_id));
        true
    }

    fn insert_assignment(&mut self, course_id: &str, assignment: Assignment) -> bool {
        match self.courses.iter_mut().find(|c| c.id == course_id) {
            Some(course) => {
                course.push_assignment(assignment);
                true
            }
            None => false,
        }
    }

    fn replace_theoretical(&mut self, course_id: &str, ledger: Vec<Assignment>) -> bool {
        let Some(course) = self.courses.iter_mut().find(|c| c.id == course_id) else {
            return false;
        };
        let replaced = std::mem::replace(&mut course.theoretical_assignments, ledger);

        // Queued changes of replaced what-if entries would target ids the
        // server no longer has.
        let mut stale: Vec<String> = replaced
            .into_iter()
            .map(|a| a.id)
            .filter(|id| !course.contains_assignment(id))
            .collect();
        stale.extend(
            self.removed
                .iter()
                .filter(|(_, r)| r.course_id == course_id && r.is_theoretical)
                .map(|(id, _)| id.clone()),
        );
        self.forget_assignments(stale);
        true
    }

    /// Drops queued changes of assignments the server removes by itself, and
    /// remembers them so a failed push already in flight is not queued again.
    fn forget_assignments(&mut self, ids: Vec<String>) {
        self.pending.retain(|id, change| {
            !(change.kind == EntityKind::Assignment && ids.iter().any(|i| i == id))
        });
        self.orphaned.extend(ids);
    }

    /// Adopts a server snapshot as the new baseline and replays every change
    /// still waiting in the queue over it.
    fn replace_courses(&mut self, mut snapshot: Vec<Course>) {
        for course in &mut snapshot {
            course.normalize_ledgers();
        }
        let listed = |id: &str| snapshot.iter().any(|c| c.contains_assignment(id));
        self.orphaned.retain(|id| listed(id.as_str()));
        self.removed.retain(|id, _| listed(id.as_str()));

        for (_, change) in self.pending.iter() {
            match &change.payload {
                ChangePayload::Course(input) => {
                    if let (Some(course), Some(name)) = (
                        snapshot.iter_mut().find(|c| c.id == input.id),
                        input.name.as_ref(),
                    ) {
                        course.name = name.clone();
                    }
                }
                ChangePayload::Assignment(input) => {
                    if let Some(assignment) = snapshot
                        .iter_mut()
                        .find_map(|c| c.assignment_mut(&input.id))
                    {
                        input.apply_to(assignment);
                    }
                }
                ChangePayload::Delete { id } => match change.kind {
                    EntityKind::Course => snapshot.retain(|c| c.id != *id),
                    EntityKind::Assignment => {
                        for course in snapshot.iter_mut() {
                            course.remove_assignment(id);
                        }
                    }
                },
            }
        }

        self.courses = snapshot;
    }

    /// Queues a change whose push failed again, unless it no longer applies:
    /// a newer change for the id is queued, the entity is gone locally, or
    /// the server drops it along with its course.
    fn restore_failed(&mut self, id: String, change: PendingChange) -> bool {
        if change.kind == EntityKind::Assignment && self.orphaned.contains(&id) {
            return false;
        }
        let still_known = match &change.payload {
            ChangePayload::Course(input) => self.courses.iter().any(|c| c.id == input.id),
            ChangePayload::Assignment(input) => {
                self.courses.iter().any(|c| c.contains_assignment(&input.id))
            }
            ChangePayload::Delete { .. } => true,
        };
        still_known && self.pending.reinsert(id, change)
    }
}

impl CourseSynchronizer {
    pub fn new(gateway: Arc<dyn GradeGateway>, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                state: Mutex::new(LocalState::default()),
                scheduler: DebounceScheduler::new(debounce),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LocalState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn courses(&self) -> Vec<Course> {
        self.lock().courses.clone()
    }

    pub fn course(&self, course_id: &str) -> Option<Course> {
        self.lock().courses.iter().find(|c| c.id == course_id).cloned()
    }

    pub fn course_summaries(&self) -> Vec<CourseSummary> {
        self.courses().into_iter().map(CourseSummary::from).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn pending_change(&self, id: &str) -> Option<PendingChange> {
        self.lock().pending.get(id).cloned()
    }

    pub fn status(&self) -> SyncStatus {
        let state = self.lock();
        SyncStatus {
            pending: state.pending.len(),
            flush_scheduled: self.inner.scheduler.is_scheduled(),
            last_synced_at: state.last_synced_at,
            last_error: state.last_error.clone(),
        }
    }

    /// Loads the authoritative course list. Pending changes survive the
    /// reload.
    pub async fn refresh(&self) -> Result<usize, AppError> {
        match self.inner.gateway.get_courses().await {
            Ok(snapshot) => {
                let mut state = self.lock();
                state.replace_courses(snapshot);
                state.last_error = None;
                Ok(state.courses.len())
            }
            Err(e) => {
                self.lock().last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn handle_create_course(&self, name: &str) -> Option<Course> {
        let name = name.trim();
        if name.is_empty() {
            warn!("Ignoring course creation without a name");
            return None;
        }

        match self.inner.gateway.create_course(name).await {
            Ok(mut course) => {
                course.normalize_ledgers();
                self.lock().courses.push(course.clone());
                info!("Created course {} ({})", course.name, course.id);
                Some(course)
            }
            Err(e) => {
                error!("Error creating course {}: {}", name, e);
                None
            }
        }
    }

    /// Returns `false` when the course is not in local state.
    pub fn handle_course_name_change(&self, course_id: &str, name: &str) -> bool {
        let applied = self.lock().rename_course(course_id, name);
        if applied {
            self.schedule_flush();
        } else {
            debug!("Ignoring rename of unknown course {}", course_id);
        }
        applied
    }

    pub fn handle_delete_course(&self, course_id: &str) -> bool {
        let applied = self.lock().delete_course(course_id);
        if applied {
            self.schedule_flush();
        } else {
            debug!("Ignoring delete of unknown course {}", course_id);
        }
        applied
    }

    pub async fn handle_add_assignment(
        &self,
        course_id: &str,
        req: NewAssignmentRequest,
    ) -> Option<Assignment> {
        if req.name.trim().is_empty() {
            warn!("Ignoring assignment without a name for course {}", course_id);
            return None;
        }

        match self.inner.gateway.create_assignment(course_id, &req).await {
            Ok(assignment) => {
                if !self.lock().insert_assignment(course_id, assignment.clone()) {
                    warn!(
                        "Course {} is gone locally, assignment {} not shown",
                        course_id, assignment.id
                    );
                }
                Some(assignment)
            }
            Err(e) => {
                error!("Error creating assignment for course {}: {}", course_id, e);
                None
            }
        }
    }

    pub fn handle_assignment_change(&self, assignment_id: &str, edit: AssignmentEdit) -> bool {
        let applied = self.lock().edit_assignment(assignment_id, &edit);
        if applied {
            self.schedule_flush();
        } else {
            debug!("Ignoring edit of unknown assignment {}", assignment_id);
        }
        applied
    }

    pub fn handle_delete_assignment(&self, assignment_id: &str) -> bool {
        let applied = self.lock().delete_assignment(assignment_id);
        if applied {
            self.schedule_flush();
        } else {
            debug!("Ignoring delete of unknown assignment {}", assignment_id);
        }
        applied
    }

    /// Replaces one course's what-if ledger with the one the gateway returns.
    /// Bypasses the pending queue.
    pub async fn handle_sync_theoretical_assignments(&self, course_id: &str) -> Option<Vec<Assignment>> {
        match self.inner.gateway.sync_theoretical_assignments(course_id).await {
            Ok(mut ledger) => {
                for assignment in &mut ledger {
                    assignment.is_theoretical = true;
                }
                if !self.lock().replace_theoretical(course_id, ledger.clone()) {
                    warn!("Course {} is gone locally, theoretical ledger dropped", course_id);
                }
                Some(ledger)
            }
            Err(e) => {
                error!("Error syncing theoretical assignments for course {}: {}", course_id, e);
                None
            }
        }
    }

    /// Flushes immediately, dropping the debounce timer.
    pub async fn handle_sync_now(&self) -> SyncReport {
        self.cancel_scheduled_flush();
        self.flush_now().await
    }

    /// Focus left an input: flush now if anything is waiting.
    pub async fn handle_blur(&self) -> Option<SyncReport> {
        if self.pending_count() == 0 {
            return None;
        }
        Some(self.handle_sync_now().await)
    }

    /// (Re)arms the debounce timer; the flush runs once no further edit
    /// arrives within the debounce delay.
    pub fn schedule_flush(&self) {
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.schedule(move || async move {
            if let Some(inner) = weak.upgrade() {
                CourseSynchronizer { inner }.flush_now().await;
            }
        });
    }

    pub fn cancel_scheduled_flush(&self) -> bool {
        self.inner.scheduler.cancel()
    }

    /// Submits every queued change, one at a time in queue order. A failing
    /// entry goes back into the queue and the batch carries on; local state
    /// is not rolled back. Afterwards the course list is refetched.
    ///
    /// An empty queue makes this a no-op, so a flush started while another
    /// is in flight does nothing.
    pub async fn flush_now(&self) -> SyncReport {
        let batch = self.lock().pending.take_all();
        if batch.is_empty() {
            return SyncReport::default();
        }

        info!("Flushing {} pending changes", batch.len());
        let mut report = SyncReport::default();

        for (id, change) in batch {
            let outcome = self.submit(&id, &change).await;
            match outcome {
                Ok(()) => report.pushed += 1,
                Err(e) => {
                    warn!(
                        "Error processing {:?} of {:?} {}: {}",
                        change.action, change.kind, id, e
                    );
                    report.failed += 1;
                    if !self.lock().restore_failed(id.clone(), change) {
                        debug!("Dropping failed change for {}, superseded during flush", id);
                    }
                }
            }
        }

        let refetched = self.inner.gateway.get_courses().await;
        match refetched {
            Ok(snapshot) => {
                let mut state = self.lock();
                state.replace_courses(snapshot);
                state.last_error = None;
                report.refetched = true;
            }
            Err(e) => {
                warn!("Refetch after flush failed: {}", e);
                self.lock().last_error = Some(e.to_string());
            }
        }

        let finished_at = Utc::now();
        report.still_pending = {
            let mut state = self.lock();
            state.last_synced_at = Some(finished_at);
            state.pending.len()
        };
        report.finished_at = Some(finished_at);

        info!(
            "Flush completed - pushed: {}, failed: {}, still pending: {}",
            report.pushed, report.failed, report.still_pending
        );

        if report.still_pending > 0 {
            self.schedule_flush();
        }
        report
    }

    async fn submit(&self, id: &str, change: &PendingChange) -> Result<(), AppError> {
        let gateway = &self.inner.gateway;
        let confirmed = match (&change.payload, change.kind) {
            (ChangePayload::Course(input), _) => {
                gateway.update_course(input).await?;
                true
            }
            (ChangePayload::Assignment(input), _) => {
                gateway.update_assignment(input).await?;
                true
            }
            (ChangePayload::Delete { id }, EntityKind::Course) => gateway.delete_course(id).await?,
            (ChangePayload::Delete { id }, EntityKind::Assignment) => {
                gateway.delete_assignment(id).await?
            }
        };

        if confirmed {
            Ok(())
        } else {
            Err(AppError::Upstream(format!("Deletion of {} was not confirmed", id)))
        }
    }
}
