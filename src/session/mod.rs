//! Editing sessions and auto-save
//!
//! An [`EditorSession`] owns one open document: edits mutate an in-memory
//! copy and mark it dirty; a background auto-save task debounces dirty
//! marks and flushes to the store. Export and enhancement always force a
//! flush first, so what leaves the app is what the user last typed.
//!
//! Save status moves Clean -> Dirty -> Saving -> Clean. A failed save
//! surfaces Error and leaves the document dirty, so the next debounce
//! cycle retries; at most one save runs at a time, and edits made while
//! a save is in flight re-dirty the document so a follow-up save picks
//! them up.

use crate::enhance::{
    parser, prompt, reconcile, AcceptedChanges, AiClient, PrdAcceptedChanges,
};
use crate::export;
use crate::file_storage::DocumentStore;
use crate::import;
use crate::models::{
    CodeReviewForm, DocumentPayload, EnhancementResult, PrdEnhancementResult, PrdForm,
    PrdRequirementItem, RequirementItem, SavedDocument,
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep, Instant};

/// How long a document stays dirty before the auto-save fires
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Where the open document stands relative to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Clean,
    Dirty,
    Saving,
    Error(String),
}

enum Msg {
    MarkDirty,
    SaveNow(oneshot::Sender<Result<(), String>>),
}

/// Handle to a running auto-save task
#[derive(Clone)]
pub struct AutosaveHandle {
    tx: mpsc::UnboundedSender<Msg>,
    status: watch::Receiver<SaveStatus>,
}

impl AutosaveHandle {
    /// Record an edit. The save fires once the debounce window passes
    /// without further marks.
    pub fn mark_dirty(&self) {
        let _ = self.tx.send(Msg::MarkDirty);
    }

    /// Flush now, skipping the debounce. Resolves once every mark made
    /// before this call has been persisted (or the save failed).
    pub async fn save_now(&self) -> Result<(), String> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(Msg::SaveNow(tx))
            .map_err(|_| "Auto-save task has shut down".to_string())?;
        rx.await.map_err(|_| "Auto-save task has shut down".to_string())?
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Watch for status transitions (e.g. to drive a status indicator)
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }
}

/// Spawn the auto-save task around a save callback. The callback is
/// invoked at most once at a time.
pub fn spawn_autosave<F, Fut>(mut save: F, debounce: Duration) -> AutosaveHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), String>> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Msg>();
    let (status_tx, status_rx) = watch::channel(SaveStatus::Clean);

    tokio::spawn(async move {
        let mut dirty = false;
        let mut closed = false;

        while !closed {
            // Idle until something needs saving
            if !dirty {
                match rx.recv().await {
                    Some(Msg::MarkDirty) => {
                        dirty = true;
                        let _ = status_tx.send(SaveStatus::Dirty);
                    }
                    Some(Msg::SaveNow(reply)) => {
                        // Nothing pending; already persisted
                        let _ = reply.send(Ok(()));
                        continue;
                    }
                    None => return,
                }
            }

            // Debounce: restart the window on every new mark, flush
            // immediately on an explicit save request
            let mut flush_waiters: Vec<oneshot::Sender<Result<(), String>>> = Vec::new();
            let deadline = sleep(debounce);
            tokio::pin!(deadline);
            loop {
                tokio::select! {
                    _ = &mut deadline => break,
                    msg = rx.recv() => match msg {
                        Some(Msg::MarkDirty) => {
                            let _ = status_tx.send(SaveStatus::Dirty);
                            deadline.as_mut().reset(Instant::now() + debounce);
                        }
                        Some(Msg::SaveNow(reply)) => {
                            flush_waiters.push(reply);
                            break;
                        }
                        None => {
                            // Final flush before shutdown
                            closed = true;
                            break;
                        }
                    },
                }
            }

            // Save, re-running if edits land while a save is in flight
            let result = loop {
                let _ = status_tx.send(SaveStatus::Saving);
                dirty = false;

                let fut = save();
                tokio::pin!(fut);
                let result = loop {
                    tokio::select! {
                        result = &mut fut => break result,
                        msg = rx.recv(), if !closed => match msg {
                            Some(Msg::MarkDirty) => dirty = true,
                            Some(Msg::SaveNow(reply)) => flush_waiters.push(reply),
                            None => closed = true,
                        },
                    }
                };

                match result {
                    Ok(()) if dirty => continue,
                    other => break other,
                }
            };

            match result {
                Ok(()) => {
                    let _ = status_tx.send(SaveStatus::Clean);
                    for reply in flush_waiters {
                        let _ = reply.send(Ok(()));
                    }
                }
                Err(e) => {
                    log::error!("[autosave] Save failed: {}", e);
                    let _ = status_tx.send(SaveStatus::Error(e.clone()));
                    // The document stays dirty; the next debounce cycle
                    // retries, and a forced save cannot report stale
                    // state as persisted
                    dirty = true;
                    for reply in flush_waiters {
                        let _ = reply.send(Err(e.clone()));
                    }
                }
            }
        }
    });

    AutosaveHandle {
        tx,
        status: status_rx,
    }
}

/// Lock the working copy. A poisoned lock only means an edit closure
/// panicked mid-write; the document is still a coherent value, so the
/// session keeps working instead of propagating the panic.
fn lock_document(doc: &Mutex<SavedDocument>) -> MutexGuard<'_, SavedDocument> {
    doc.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One open document: in-memory working copy, store, auto-save, and the
/// enhancement pipeline wired together
pub struct EditorSession {
    store: DocumentStore,
    client: AiClient,
    document: Arc<Mutex<SavedDocument>>,
    autosave: AutosaveHandle,
}

impl EditorSession {
    /// Open an existing document for editing
    pub fn open(
        store: DocumentStore,
        client: AiClient,
        id: &str,
        debounce: Duration,
    ) -> Result<Self, String> {
        let document = store
            .get(id)?
            .ok_or_else(|| format!("Document not found: {}", id))?;
        Ok(Self::attach(store, client, document, debounce))
    }

    /// Create a new document and open it. The shell is persisted before
    /// any edit can mark it dirty, so auto-saves always have a row to
    /// update.
    pub fn create(
        store: DocumentStore,
        client: AiClient,
        title: impl Into<String>,
        payload: DocumentPayload,
        debounce: Duration,
    ) -> Result<Self, String> {
        let document = store.create(title, payload)?;
        Ok(Self::attach(store, client, document, debounce))
    }

    fn attach(
        store: DocumentStore,
        client: AiClient,
        document: SavedDocument,
        debounce: Duration,
    ) -> Self {
        let document = Arc::new(Mutex::new(document));

        let save_store = store.clone();
        let save_doc = Arc::clone(&document);
        let autosave = spawn_autosave(
            move || {
                let store = save_store.clone();
                let doc = Arc::clone(&save_doc);
                async move {
                    let snapshot = lock_document(&doc).clone();
                    let saved = store
                        .update(snapshot)?
                        .ok_or_else(|| "Document disappeared from store".to_string())?;
                    lock_document(&doc).modified_at = saved.modified_at;
                    Ok(())
                }
            },
            debounce,
        );

        EditorSession {
            store,
            client,
            document,
            autosave,
        }
    }

    /// Snapshot of the working copy
    pub fn document(&self) -> SavedDocument {
        lock_document(&self.document).clone()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosave.status()
    }

    pub fn subscribe_save_status(&self) -> watch::Receiver<SaveStatus> {
        self.autosave.subscribe()
    }

    /// Flush pending edits to the store immediately
    pub async fn save_now(&self) -> Result<(), String> {
        self.autosave.save_now().await
    }

    pub fn set_title(&self, title: impl Into<String>) {
        lock_document(&self.document).title = title.into();
        self.autosave.mark_dirty();
    }

    /// Edit the code review form in place. Errors if the open document is
    /// not a code review.
    pub fn update_review(&self, edit: impl FnOnce(&mut CodeReviewForm)) -> Result<(), String> {
        {
            let mut doc = lock_document(&self.document);
            let DocumentPayload::CodeReview(form) = &mut doc.payload else {
                return Err("Open document is not a code review".to_string());
            };
            edit(form);
        }
        self.autosave.mark_dirty();
        Ok(())
    }

    /// Edit the PRD form in place. Errors if the open document is not a PRD.
    pub fn update_prd(&self, edit: impl FnOnce(&mut PrdForm)) -> Result<(), String> {
        {
            let mut doc = lock_document(&self.document);
            let DocumentPayload::Prd(form) = &mut doc.payload else {
                return Err("Open document is not a PRD".to_string());
            };
            edit(form);
        }
        self.autosave.mark_dirty();
        Ok(())
    }

    /// Append requirements imported from a saved PRD. Imported items get
    /// fresh ids and start INCOMPLETE.
    pub fn import_requirements_from_prd<'a>(
        &self,
        selected: impl IntoIterator<Item = &'a PrdRequirementItem>,
    ) -> Result<(), String> {
        let items = import::review_items_from_prd(selected);
        self.update_review(|form| form.requirements.extend(items))
    }

    /// Append requirements imported from a saved code review, recording the
    /// source review's id on each item.
    pub fn import_requirements_from_review<'a>(
        &self,
        selected: impl IntoIterator<Item = &'a RequirementItem>,
        source_review_id: &str,
    ) -> Result<(), String> {
        let items = import::prd_items_from_review(selected, source_review_id);
        self.update_prd(|form| form.requirements.extend(items))
    }

    /// Render the document as Markdown. Pending edits are flushed first so
    /// the export matches what is on screen.
    pub async fn export_markdown(&self) -> Result<String, String> {
        self.save_now().await?;
        let doc = self.document();
        Ok(match &doc.payload {
            DocumentPayload::CodeReview(form) => {
                export::review_markdown(form, Some(doc.created_at))
            }
            DocumentPayload::Prd(form) => {
                export::prd_markdown(form, Some(doc.created_at), Some(doc.modified_at))
            }
        })
    }

    /// The full prompt (instructions + document) for the manual
    /// copy-into-a-chat path
    pub async fn full_prompt(&self) -> Result<String, String> {
        self.save_now().await?;
        let doc = self.document();
        Ok(match &doc.payload {
            DocumentPayload::CodeReview(form) => prompt::build_full_review_prompt(form),
            DocumentPayload::Prd(form) => prompt::build_full_prd_prompt(form),
        })
    }

    /// Run one enhancement round-trip for a code review
    pub async fn enhance_review(&self) -> Result<EnhancementResult, String> {
        self.save_now().await?;
        let doc = self.document();
        let DocumentPayload::CodeReview(form) = &doc.payload else {
            return Err("Open document is not a code review".to_string());
        };

        let text = self
            .client
            .complete(
                &prompt::build_review_prompt(form),
                prompt::REVIEW_SYSTEM_PROMPT,
            )
            .await
            .map_err(|e| e.to_string())?;
        parser::parse_review_response(&text).map_err(|e| e.to_string())
    }

    /// Run one enhancement round-trip for a PRD
    pub async fn enhance_prd(&self) -> Result<PrdEnhancementResult, String> {
        self.save_now().await?;
        let doc = self.document();
        let DocumentPayload::Prd(form) = &doc.payload else {
            return Err("Open document is not a PRD".to_string());
        };

        let text = self
            .client
            .complete(&prompt::build_prd_prompt(form), prompt::PRD_SYSTEM_PROMPT)
            .await
            .map_err(|e| e.to_string())?;
        parser::parse_prd_response(&text).map_err(|e| e.to_string())
    }

    /// Parse a model reply the user pasted in by hand. Pasted replies went
    /// through a chat UI, so decorative flag markers are stripped.
    pub fn paste_review_response(&self, text: &str) -> Result<EnhancementResult, String> {
        let mut result = parser::parse_review_response(text).map_err(|e| e.to_string())?;
        parser::strip_flag_markers(&mut result);
        Ok(result)
    }

    pub fn paste_prd_response(&self, text: &str) -> Result<PrdEnhancementResult, String> {
        let mut result = parser::parse_prd_response(text).map_err(|e| e.to_string())?;
        parser::strip_prd_flag_markers(&mut result);
        Ok(result)
    }

    /// Merge accepted review suggestions into the working copy
    pub fn apply_review_changes(&self, accepted: &AcceptedChanges) -> Result<(), String> {
        self.update_review(|form| {
            *form = reconcile::apply_review_changes(form, accepted);
        })
    }

    /// Merge accepted PRD suggestions into the working copy
    pub fn apply_prd_changes(&self, accepted: &PrdAcceptedChanges) -> Result<(), String> {
        self.update_prd(|form| {
            *form = reconcile::apply_prd_changes(form, accepted);
        })
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const FAST: Duration = Duration::from_millis(50);

    fn counting_autosave(fail: bool) -> (AutosaveHandle, Arc<AtomicUsize>) {
        let saves = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&saves);
        let handle = spawn_autosave(
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if fail {
                        Err("disk full".to_string())
                    } else {
                        Ok(())
                    }
                }
            },
            FAST,
        );
        (handle, saves)
    }

    #[tokio::test]
    async fn test_rapid_marks_coalesce_into_one_save() {
        let (handle, saves) = counting_autosave(false);
        for _ in 0..5 {
            handle.mark_dirty();
            sleep(Duration::from_millis(5)).await;
        }
        sleep(FAST * 4).await;
        assert_eq!(saves.load(Ordering::SeqCst), 1);
        assert_eq!(handle.status(), SaveStatus::Clean);
    }

    #[tokio::test]
    async fn test_save_now_flushes_without_waiting() {
        let (handle, saves) = counting_autosave(false);
        handle.mark_dirty();
        handle.save_now().await.unwrap();
        assert_eq!(saves.load(Ordering::SeqCst), 1);
        assert_eq!(handle.status(), SaveStatus::Clean);
    }

    #[tokio::test]
    async fn test_save_now_on_clean_document_is_a_no_op() {
        let (handle, saves) = counting_autosave(false);
        handle.save_now().await.unwrap();
        assert_eq!(saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_save_reports_error_and_recovers_on_edit() {
        let (handle, _saves) = counting_autosave(true);
        handle.mark_dirty();
        let err = handle.save_now().await.unwrap_err();
        assert_eq!(err, "disk full");
        assert_eq!(handle.status(), SaveStatus::Error("disk full".to_string()));

        handle.mark_dirty();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.status(), SaveStatus::Dirty);
    }

    fn session(temp: &TempDir) -> EditorSession {
        let store = DocumentStore::new(temp.path(), DocumentKind::CodeReview);
        EditorSession::create(
            store,
            AiClient::new(None),
            "Session test",
            DocumentPayload::CodeReview(CodeReviewForm::default()),
            FAST,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_edits_persist_after_save_now() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        let id = session.document().id;

        session
            .update_review(|form| {
                form.requirements
                    .push(crate::models::RequirementItem::new("Login works"));
            })
            .unwrap();
        session.save_now().await.unwrap();

        let stored = session.store().get(&id).unwrap().unwrap();
        let DocumentPayload::CodeReview(form) = stored.payload else {
            panic!("expected code review payload");
        };
        assert_eq!(form.requirements[0].description, "Login works");
    }

    #[tokio::test]
    async fn test_export_includes_pending_edits() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        let id = session.document().id;

        session.set_title("Renamed");
        let md = session.export_markdown().await.unwrap();
        assert!(md.contains("# PM Review ["));

        // The export forced the flush
        let stored = session.store().get(&id).unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
    }

    #[tokio::test]
    async fn test_enhance_without_credential_saves_then_fails() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        let id = session.document().id;
        session.set_title("Saved anyway");

        let err = session.enhance_review().await.unwrap_err();
        assert!(err.contains("missing API key"));

        let stored = session.store().get(&id).unwrap().unwrap();
        assert_eq!(stored.title, "Saved anyway");
    }

    #[tokio::test]
    async fn test_kind_mismatch_edits_rejected() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        assert!(session.update_prd(|_| {}).is_err());
        assert!(session.update_review(|_| {}).is_ok());
    }

    #[tokio::test]
    async fn test_import_from_prd_appends_incomplete_items() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);

        let prd_items = vec![
            PrdRequirementItem {
                id: "p1".to_string(),
                description: "Search must be case-insensitive".to_string(),
                source_review_id: None,
            },
            PrdRequirementItem {
                id: "p2".to_string(),
                description: "Results paginate at 20".to_string(),
                source_review_id: None,
            },
        ];
        // The user unticked the second item
        session
            .import_requirements_from_prd(&prd_items[..1])
            .unwrap();

        let DocumentPayload::CodeReview(form) = session.document().payload else {
            panic!("expected code review payload");
        };
        assert_eq!(form.requirements.len(), 1);
        assert_eq!(
            form.requirements[0].description,
            "Search must be case-insensitive"
        );
        assert_eq!(
            form.requirements[0].status,
            crate::models::RequirementStatus::Incomplete
        );
        assert_ne!(form.requirements[0].id, "p1");

        // Imported items autosave like any other edit
        session.save_now().await.unwrap();
        let stored = session.store().get(&session.document().id).unwrap().unwrap();
        let DocumentPayload::CodeReview(form) = stored.payload else {
            panic!("expected code review payload");
        };
        assert_eq!(form.requirements.len(), 1);
    }

    #[tokio::test]
    async fn test_import_into_wrong_document_kind_is_rejected() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        let review_items = vec![RequirementItem::new("Login works")];
        assert!(session
            .import_requirements_from_review(&review_items, "rev-1")
            .is_err());
    }

    #[tokio::test]
    async fn test_session_survives_panicking_edit_closure() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = session.update_review(|_| panic!("editor bug"));
        }));
        assert!(result.is_err());

        session.set_title("Still editable");
        assert_eq!(session.document().title, "Still editable");
    }

    #[tokio::test]
    async fn test_paste_path_strips_markers() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        let result = session
            .paste_review_response(
                r#"{"gaps":[{"id":"g1","improved":"X","flags":["⚑ No empty state"]}]}"#,
            )
            .unwrap();
        assert_eq!(result.gaps[0].flags, vec!["No empty state"]);
    }
}
