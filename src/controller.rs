//! Venue creation form controller.
//!
//! The controller owns the draft, the chosen location and the venue type
//! options. Everything that happens to the form arrives as a [`FormEvent`]:
//! user edits, the lookup answer, the location picker closing, the upload
//! widget finishing. [`VenueFormController::handle`] is the only place those
//! events change state, so a UI only has to forward them and render
//! [`VenueFormController::view`].

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::backend::{self, BackendError, VenueBackend, VENUE_TYPES};
use crate::config::ToastOptions;
use crate::models::{
    FileUploadResponse, LookUp, Location, ResolvedLocation, VenueAddRequest, VenueDraft,
    VenueTypeOption,
};
use crate::notify::{NotificationKind, Notifier};
use crate::schema::{self, ValidationReport};

pub const MSG_LOOKUP_FAILED: &str = "Venue lookup error";
pub const MSG_FILE_FAILED: &str = "Error on file upload.";
pub const MSG_LOCATION_REQUIRED: &str = "Must add location first.";
pub const MSG_VENUE_ADDED: &str = "New venue added";
pub const MSG_CANCELED: &str = "Operation canceled";

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormPhase {
    Empty,
    LocationPending,
    LocationResolved,
    Validating,
    Submitting,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Home,
}

impl Navigation {
    pub fn route(self) -> &'static str {
        match self {
            Navigation::Home => "/",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a location must be added before submitting")]
    LocationRequired,
    #[error("an image must be uploaded before submitting")]
    FileRequired,
    #[error("venue form is invalid: {0}")]
    Invalid(ValidationReport),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FileResolveError {
    #[error("upload response carried no file id")]
    MissingId,
    #[error("upload response carried invalid file id {0}")]
    InvalidId(i64),
    #[error("image upload is not available before a location is chosen")]
    NotEnabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Name(String),
    Description(String),
    VenueType(Option<String>),
    Url(String),
}

#[derive(Debug, Clone)]
pub enum FormEvent {
    LookupResolved(Result<Vec<LookUp>, BackendError>),
    FileResolved(FileUploadResponse),
    OpenLocationModal,
    LocationResolved { location: Location, location_id: i64 },
    LocationCancelled,
    FieldChanged(FieldChange),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Updated,
    Ignored,
    Submitted(Result<i64, SubmitError>),
    Navigate(Navigation),
}

/// What a renderer needs to draw the form.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub phase: FormPhase,
    pub draft: VenueDraft,
    pub location_line: Option<String>,
    pub location_modal_open: bool,
    pub venue_type_options: Vec<VenueTypeOption>,
    pub details_enabled: bool,
    pub venue_type_enabled: bool,
    pub can_submit: bool,
    pub toast: ToastOptions,
}

pub struct VenueFormController {
    backend: Arc<dyn VenueBackend>,
    notifier: Arc<dyn Notifier>,
    draft: VenueDraft,
    location: Option<ResolvedLocation>,
    venue_type_options: Vec<VenueTypeOption>,
    lookup_failed: bool,
    location_modal_open: bool,
    phase: FormPhase,
    toast: ToastOptions,
}

impl VenueFormController {
    pub fn new(backend: Arc<dyn VenueBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            draft: VenueDraft::default(),
            location: None,
            venue_type_options: Vec::new(),
            lookup_failed: false,
            location_modal_open: false,
            phase: FormPhase::Empty,
            toast: ToastOptions::default(),
        }
    }

    /// Display settings handed to whoever renders notifications.
    pub fn with_toast_options(mut self, toast: ToastOptions) -> Self {
        self.toast = toast;
        self
    }

    pub fn toast_options(&self) -> &ToastOptions {
        &self.toast
    }

    pub fn draft(&self) -> &VenueDraft {
        &self.draft
    }

    pub fn location(&self) -> Option<&ResolvedLocation> {
        self.location.as_ref()
    }

    pub fn venue_type_options(&self) -> &[VenueTypeOption] {
        &self.venue_type_options
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn lookup_failed(&self) -> bool {
        self.lookup_failed
    }

    pub fn location_modal_open(&self) -> bool {
        self.location_modal_open
    }

    /// Type, image and url fields only show once a location is chosen.
    pub fn details_enabled(&self) -> bool {
        self.location.is_some()
    }

    pub fn venue_type_enabled(&self) -> bool {
        self.details_enabled() && !self.venue_type_options.is_empty()
    }

    pub fn can_submit(&self) -> bool {
        self.details_enabled() && self.draft.has_file()
    }

    pub fn view(&self) -> FormView {
        FormView {
            phase: self.phase,
            draft: self.draft.clone(),
            location_line: self.location.as_ref().map(ResolvedLocation::display_line),
            location_modal_open: self.location_modal_open,
            venue_type_options: self.venue_type_options.clone(),
            details_enabled: self.details_enabled(),
            venue_type_enabled: self.venue_type_enabled(),
            can_submit: self.can_submit(),
            toast: self.toast.clone(),
        }
    }

    /// Fetches venue types. Called once when the form is shown.
    pub async fn mount(&mut self) {
        let result = self
            .backend
            .lookup(&[VENUE_TYPES])
            .await
            .map(|table| backend::venue_types(&table));
        self.on_lookup_resolved(result);
    }

    pub fn on_lookup_resolved(&mut self, result: Result<Vec<LookUp>, BackendError>) {
        match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "venue types loaded");
                self.venue_type_options = items.iter().map(VenueTypeOption::from).collect();
                self.lookup_failed = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "venue type lookup failed");
                self.venue_type_options.clear();
                self.lookup_failed = true;
                self.notifier
                    .notify(NotificationKind::Error, MSG_LOOKUP_FAILED);
            }
        }
    }

    /// The upload widget only exists once a location is set; a completion that
    /// arrives earlier is dropped without touching the draft.
    pub fn on_file_resolved(&mut self, response: &FileUploadResponse) -> Result<i64, FileResolveError> {
        if !self.details_enabled() {
            tracing::debug!("image upload ignored, no location yet");
            return Err(FileResolveError::NotEnabled);
        }
        let resolved = match response.first_id() {
            None => Err(FileResolveError::MissingId),
            Some(id) if id <= 0 => Err(FileResolveError::InvalidId(id)),
            Some(id) => Ok(id),
        };
        match resolved {
            Ok(id) => {
                tracing::debug!(file_id = id, "image uploaded");
                self.draft.file_id = id;
            }
            Err(err) => {
                tracing::warn!(error = %err, "image upload did not resolve");
                self.notifier.notify(NotificationKind::Error, MSG_FILE_FAILED);
            }
        }
        resolved
    }

    /// Shows the location picker, either to add a location or to edit the
    /// current one.
    pub fn open_location_modal(&mut self) {
        self.location_modal_open = true;
        if self.location.is_none() {
            self.phase = FormPhase::LocationPending;
        }
    }

    pub fn on_location_resolved(&mut self, location: Location, location_id: i64) {
        let resolved = ResolvedLocation::new(location, location_id);
        tracing::debug!(location_id, line = %resolved.display_line(), "location resolved");
        self.location = Some(resolved);
        self.location_modal_open = false;
        self.phase = FormPhase::LocationResolved;
    }

    /// The picker closed without a result; an earlier location stays.
    pub fn on_location_cancelled(&mut self) {
        self.location_modal_open = false;
        if self.location.is_none() {
            self.phase = FormPhase::Empty;
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    /// Returns false when the select is not enabled yet.
    pub fn set_venue_type(&mut self, value: Option<String>) -> bool {
        if !self.venue_type_enabled() {
            return false;
        }
        self.draft.venue_type_id = value;
        true
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> bool {
        if !self.details_enabled() {
            return false;
        }
        self.draft.url = url.into();
        true
    }

    pub fn validate(&self) -> ValidationReport {
        schema::validate(&self.draft)
    }

    pub async fn submit(&mut self) -> Result<i64, SubmitError> {
        let location_id = match self.location.as_ref().filter(|l| l.is_resolved()) {
            Some(location) => location.id,
            None => {
                self.notifier
                    .notify(NotificationKind::Error, MSG_LOCATION_REQUIRED);
                return Err(SubmitError::LocationRequired);
            }
        };
        if !self.draft.has_file() {
            tracing::debug!("submit refused, no image uploaded");
            return Err(SubmitError::FileRequired);
        }

        self.phase = FormPhase::Validating;
        let request = match creation_request(&self.draft, location_id) {
            Ok(request) => request,
            Err(report) => {
                tracing::debug!(errors = %report, "venue form invalid");
                self.phase = FormPhase::LocationResolved;
                return Err(SubmitError::Invalid(report));
            }
        };

        self.phase = FormPhase::Submitting;
        match self.backend.add_venue(&request).await {
            Ok(id) => {
                tracing::debug!(venue_id = id, "venue added");
                self.notifier.notify(NotificationKind::Success, MSG_VENUE_ADDED);
                self.reset();
                Ok(id)
            }
            Err(err) => {
                tracing::warn!(error = %err, "venue add failed");
                self.notifier
                    .notify(NotificationKind::Error, &err.user_message());
                self.phase = FormPhase::LocationResolved;
                Err(SubmitError::Backend(err))
            }
        }
    }

    pub fn cancel(&mut self) -> Navigation {
        self.notifier.notify(NotificationKind::Error, MSG_CANCELED);
        self.reset();
        Navigation::Home
    }

    pub async fn handle(&mut self, event: FormEvent) -> EventOutcome {
        match event {
            FormEvent::LookupResolved(result) => {
                self.on_lookup_resolved(result);
                EventOutcome::Updated
            }
            FormEvent::FileResolved(response) => match self.on_file_resolved(&response) {
                Ok(_) => EventOutcome::Updated,
                Err(_) => EventOutcome::Ignored,
            },
            FormEvent::OpenLocationModal => {
                self.open_location_modal();
                EventOutcome::Updated
            }
            FormEvent::LocationResolved {
                location,
                location_id,
            } => {
                self.on_location_resolved(location, location_id);
                EventOutcome::Updated
            }
            FormEvent::LocationCancelled => {
                self.on_location_cancelled();
                EventOutcome::Updated
            }
            FormEvent::FieldChanged(change) => {
                let applied = match change {
                    FieldChange::Name(value) => {
                        self.set_name(value);
                        true
                    }
                    FieldChange::Description(value) => {
                        self.set_description(value);
                        true
                    }
                    FieldChange::VenueType(value) => self.set_venue_type(value),
                    FieldChange::Url(value) => self.set_url(value),
                };
                if applied {
                    EventOutcome::Updated
                } else {
                    EventOutcome::Ignored
                }
            }
            FormEvent::Submit => EventOutcome::Submitted(self.submit().await),
            FormEvent::Cancel => EventOutcome::Navigate(self.cancel()),
        }
    }

    /// Handles events until the sender side closes or the form navigates away.
    pub async fn run(&mut self, mut events: UnboundedReceiver<FormEvent>) -> Option<Navigation> {
        while let Some(event) = events.recv().await {
            if let EventOutcome::Navigate(target) = self.handle(event).await {
                return Some(target);
            }
        }
        None
    }

    fn reset(&mut self) {
        self.draft = VenueDraft::default();
        self.location = None;
        self.location_modal_open = false;
        self.phase = FormPhase::Empty;
    }
}

fn creation_request(draft: &VenueDraft, location_id: i64) -> Result<VenueAddRequest, ValidationReport> {
    let report = schema::validate(draft);
    if !report.is_valid() {
        return Err(report);
    }
    let venue_type_id = match draft
        .venue_type_id
        .as_deref()
        .map(schema::parse_venue_type_id)
    {
        Some(Ok(id)) => id,
        _ => return Err(report),
    };
    Ok(VenueAddRequest {
        name: draft.name.clone(),
        description: draft.description.clone(),
        location_id,
        venue_type_id,
        file_id: draft.file_id,
        url: draft.url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::backend::LookupTable;
    use crate::notify::{ChannelNotifier, Notification};
    use crate::schema::Field;

    struct RecordingBackend {
        lookup: Result<LookupTable, BackendError>,
        add_result: Mutex<Result<i64, BackendError>>,
        requests: Mutex<Vec<VenueAddRequest>>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            let mut table = LookupTable::new();
            table.insert(
                "venueTypes".to_string(),
                vec![
                    LookUp {
                        id: 1,
                        name: "Club".to_string(),
                    },
                    LookUp {
                        id: 2,
                        name: "Concert Hall".to_string(),
                    },
                ],
            );
            Self {
                lookup: Ok(table),
                add_result: Mutex::new(Ok(77)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing_lookup() -> Self {
            Self {
                lookup: Err(BackendError::Http("connection refused".to_string())),
                ..Self::new()
            }
        }

        fn fail_next_add(&self, err: BackendError) {
            *self.add_result.lock().unwrap() = Err(err);
        }

        fn requests(&self) -> Vec<VenueAddRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VenueBackend for RecordingBackend {
        async fn lookup(&self, categories: &[&str]) -> Result<LookupTable, BackendError> {
            assert_eq!(categories, &[VENUE_TYPES]);
            self.lookup.clone()
        }

        async fn add_venue(&self, request: &VenueAddRequest) -> Result<i64, BackendError> {
            self.requests.lock().unwrap().push(request.clone());
            self.add_result.lock().unwrap().clone()
        }
    }

    struct Harness {
        controller: VenueFormController,
        backend: Arc<RecordingBackend>,
        notes: mpsc::UnboundedReceiver<Notification>,
    }

    impl Harness {
        async fn mounted(backend: RecordingBackend) -> Self {
            let backend = Arc::new(backend);
            let (notifier, notes) = ChannelNotifier::new();
            let mut controller = VenueFormController::new(backend.clone(), Arc::new(notifier));
            controller.mount().await;
            Self {
                controller,
                backend,
                notes,
            }
        }

        fn drain(&mut self) -> Vec<Notification> {
            let mut out = Vec::new();
            while let Ok(note) = self.notes.try_recv() {
                out.push(note);
            }
            out
        }
    }

    fn springfield() -> Location {
        Location {
            line_one: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            ..Location::default()
        }
    }

    fn upload(id: Option<i64>) -> FileUploadResponse {
        serde_json::from_value(json!({ "items": [{ "id": id }] })).unwrap()
    }

    /// Fills in the "Hall A" form with a resolved location and image.
    fn fill_hall_a(controller: &mut VenueFormController) {
        controller.set_name("Hall A");
        controller.set_description("Big room");
        controller.open_location_modal();
        controller.on_location_resolved(springfield(), 5);
        assert!(controller.set_venue_type(Some("2".to_string())));
        assert!(controller.set_url("http://example.com"));
        controller.on_file_resolved(&upload(Some(31))).unwrap();
    }

    #[tokio::test]
    async fn mount_loads_venue_type_options() {
        let h = Harness::mounted(RecordingBackend::new()).await;
        let labels: Vec<_> = h
            .controller
            .venue_type_options()
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Club", "Concert Hall"]);
        assert!(!h.controller.lookup_failed());
    }

    #[tokio::test]
    async fn lookup_failure_notifies_and_disables_type() {
        let mut h = Harness::mounted(RecordingBackend::failing_lookup()).await;
        assert!(h.controller.lookup_failed());
        assert_eq!(
            h.drain(),
            vec![Notification {
                kind: NotificationKind::Error,
                message: MSG_LOOKUP_FAILED.to_string()
            }]
        );

        h.controller.on_location_resolved(springfield(), 5);
        assert!(h.controller.details_enabled());
        assert!(!h.controller.venue_type_enabled());
        assert!(!h.controller.set_venue_type(Some("2".to_string())));
        assert_eq!(h.controller.draft().venue_type_id, None);
    }

    #[tokio::test]
    async fn hall_a_scenario_sends_one_request() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        fill_hall_a(&mut h.controller);

        let id = h.controller.submit().await.unwrap();
        assert_eq!(id, 77);
        assert_eq!(
            h.backend.requests(),
            vec![VenueAddRequest {
                name: "Hall A".to_string(),
                description: "Big room".to_string(),
                location_id: 5,
                venue_type_id: 2,
                file_id: 31,
                url: "http://example.com".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn success_resets_draft_and_location() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        fill_hall_a(&mut h.controller);
        h.drain();

        h.controller.submit().await.unwrap();
        assert_eq!(h.controller.draft(), &VenueDraft::default());
        assert!(h.controller.location().is_none());
        assert_eq!(h.controller.phase(), FormPhase::Empty);
        assert!(!h.controller.can_submit());
        assert_eq!(h.controller.venue_type_options().len(), 2);
        assert_eq!(
            h.drain(),
            vec![Notification {
                kind: NotificationKind::Success,
                message: MSG_VENUE_ADDED.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn failure_keeps_draft_and_location_for_retry() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        fill_hall_a(&mut h.controller);
        h.drain();
        h.backend.fail_next_add(BackendError::Api {
            status: 400,
            message: "Name is taken".to_string(),
        });

        let before_draft = h.controller.draft().clone();
        let before_location = h.controller.location().cloned();
        let err = h.controller.submit().await.unwrap_err();

        assert!(matches!(err, SubmitError::Backend(BackendError::Api { .. })));
        assert_eq!(h.controller.draft(), &before_draft);
        assert_eq!(h.controller.location().cloned(), before_location);
        assert_eq!(h.controller.phase(), FormPhase::LocationResolved);
        assert_eq!(
            h.drain(),
            vec![Notification {
                kind: NotificationKind::Error,
                message: "Name is taken".to_string()
            }]
        );

        *h.backend.add_result.lock().unwrap() = Ok(78);
        h.controller.set_name("Hall B");
        assert_eq!(h.controller.submit().await, Ok(78));
        let requests = h.backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].name, "Hall B");
    }

    #[tokio::test]
    async fn submit_without_location_makes_no_call() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        h.controller.set_name("Hall A");
        h.controller.set_description("Big room");

        assert_eq!(h.controller.submit().await, Err(SubmitError::LocationRequired));
        assert!(h.backend.requests().is_empty());
        assert_eq!(
            h.drain(),
            vec![Notification {
                kind: NotificationKind::Error,
                message: MSG_LOCATION_REQUIRED.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn location_with_zero_id_is_not_resolved() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        fill_hall_a(&mut h.controller);
        h.controller.on_location_resolved(springfield(), 0);

        assert_eq!(h.controller.submit().await, Err(SubmitError::LocationRequired));
        assert!(h.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn file_resolution_gates_submit() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        h.controller.on_location_resolved(springfield(), 5);
        assert!(!h.controller.can_submit());

        for bad in [upload(None), upload(Some(0)), FileUploadResponse::default()] {
            assert!(h.controller.on_file_resolved(&bad).is_err());
            assert_eq!(h.controller.draft().file_id, 0);
            assert!(!h.controller.can_submit());
        }
        let notes = h.drain();
        assert_eq!(notes.len(), 3);
        assert!(notes.iter().all(|n| n.message == MSG_FILE_FAILED));

        assert_eq!(h.controller.on_file_resolved(&upload(Some(31))), Ok(31));
        assert!(h.controller.can_submit());
    }

    #[tokio::test]
    async fn upload_before_location_is_ignored() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        assert_eq!(
            h.controller.on_file_resolved(&upload(Some(31))),
            Err(FileResolveError::NotEnabled)
        );
        assert_eq!(h.controller.draft().file_id, 0);
        assert!(h.drain().is_empty());

        h.controller.on_location_resolved(springfield(), 5);
        assert!(!h.controller.can_submit());
        let outcome = h
            .controller
            .handle(FormEvent::FileResolved(upload(Some(31))))
            .await;
        assert_eq!(outcome, EventOutcome::Updated);
        assert!(h.controller.can_submit());
    }

    #[tokio::test]
    async fn view_carries_toast_options() {
        let backend: Arc<dyn VenueBackend> = Arc::new(RecordingBackend::new());
        let (notifier, _notes) = ChannelNotifier::new();
        let toast = ToastOptions {
            position_class: "toast-bottom-left".to_string(),
            time_out_ms: 1500,
            ..ToastOptions::default()
        };
        let controller = VenueFormController::new(backend, Arc::new(notifier))
            .with_toast_options(toast.clone());
        assert_eq!(controller.toast_options(), &toast);
        assert_eq!(controller.view().toast, toast);
    }

    #[tokio::test]
    async fn submit_without_image_is_refused() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        fill_hall_a(&mut h.controller);
        h.controller.on_file_resolved(&upload(None)).unwrap_err();
        // a failed upload leaves the earlier id in place
        assert_eq!(h.controller.draft().file_id, 31);

        let mut fresh = Harness::mounted(RecordingBackend::new()).await;
        fresh.controller.set_name("Hall A");
        fresh.controller.set_description("Big room");
        fresh.controller.on_location_resolved(springfield(), 5);
        fresh.controller.set_venue_type(Some("2".to_string()));
        fresh.controller.set_url("http://example.com");
        assert_eq!(fresh.controller.submit().await, Err(SubmitError::FileRequired));
        assert!(fresh.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn oversized_description_blocks_submit() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        fill_hall_a(&mut h.controller);
        h.controller.set_description("x".repeat(4001));

        match h.controller.submit().await {
            Err(SubmitError::Invalid(report)) => {
                assert_eq!(report.fields(), vec![Field::Description]);
            }
            other => panic!("expected invalid form, got {other:?}"),
        }
        assert!(h.backend.requests().is_empty());
        assert_eq!(h.controller.phase(), FormPhase::LocationResolved);
    }

    #[tokio::test]
    async fn unselected_type_blocks_submit() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        fill_hall_a(&mut h.controller);
        h.controller.set_venue_type(None);

        let report = h.controller.validate();
        assert_eq!(report.fields(), vec![Field::VenueTypeId]);
        assert!(matches!(h.controller.submit().await, Err(SubmitError::Invalid(_))));
        assert!(h.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn details_are_gated_on_location() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        assert!(!h.controller.details_enabled());
        assert!(!h.controller.set_url("http://example.com"));
        assert!(!h.controller.set_venue_type(Some("1".to_string())));
        assert_eq!(h.controller.draft().url, "");

        h.controller.open_location_modal();
        assert_eq!(h.controller.phase(), FormPhase::LocationPending);
        h.controller.on_location_resolved(springfield(), 5);
        assert!(h.controller.set_url("http://example.com"));
        assert_eq!(
            h.controller.view().location_line.as_deref(),
            Some("1 Main St, Springfield")
        );
    }

    #[tokio::test]
    async fn cancelled_location_edit_keeps_previous() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        h.controller.open_location_modal();
        h.controller.on_location_cancelled();
        assert_eq!(h.controller.phase(), FormPhase::Empty);
        assert!(h.controller.location().is_none());

        h.controller.open_location_modal();
        h.controller.on_location_resolved(springfield(), 5);
        h.controller.open_location_modal();
        assert!(h.controller.location_modal_open());
        h.controller.on_location_cancelled();

        assert!(!h.controller.location_modal_open());
        assert_eq!(h.controller.location().map(|l| l.id), Some(5));
        assert_eq!(h.controller.phase(), FormPhase::LocationResolved);
    }

    #[tokio::test]
    async fn cancel_discards_and_navigates_home() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        fill_hall_a(&mut h.controller);
        h.drain();

        let target = h.controller.cancel();
        assert_eq!(target.route(), "/");
        assert_eq!(h.controller.draft(), &VenueDraft::default());
        assert!(h.controller.location().is_none());
        assert_eq!(h.drain()[0].message, MSG_CANCELED);
    }

    #[tokio::test]
    async fn run_processes_events_from_channel() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        let (tx, rx) = mpsc::unbounded_channel();
        let events = vec![
            FormEvent::FieldChanged(FieldChange::Name("Hall A".to_string())),
            FormEvent::FieldChanged(FieldChange::Description("Big room".to_string())),
            FormEvent::OpenLocationModal,
            FormEvent::LocationResolved {
                location: springfield(),
                location_id: 5,
            },
            FormEvent::FieldChanged(FieldChange::VenueType(Some("2".to_string()))),
            FormEvent::FieldChanged(FieldChange::Url("http://example.com".to_string())),
            FormEvent::FileResolved(upload(Some(31))),
            FormEvent::Submit,
        ];
        for event in events {
            tx.send(event).unwrap();
        }
        drop(tx);

        assert_eq!(h.controller.run(rx).await, None);
        assert_eq!(h.backend.requests().len(), 1);
        assert_eq!(h.backend.requests()[0].venue_type_id, 2);
        assert!(h.controller.location().is_none());
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(FormEvent::FieldChanged(FieldChange::Name("Hall A".to_string())))
            .unwrap();
        tx.send(FormEvent::Cancel).unwrap();
        tx.send(FormEvent::Submit).unwrap();

        assert_eq!(h.controller.run(rx).await, Some(Navigation::Home));
        assert!(h.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn handle_reports_ignored_edits() {
        let mut h = Harness::mounted(RecordingBackend::new()).await;
        let outcome = h
            .controller
            .handle(FormEvent::FieldChanged(FieldChange::Url("x".to_string())))
            .await;
        assert_eq!(outcome, EventOutcome::Ignored);

        let outcome = h
            .controller
            .handle(FormEvent::LookupResolved(Err(BackendError::Http(
                "timeout".to_string(),
            ))))
            .await;
        assert_eq!(outcome, EventOutcome::Updated);
        assert!(h.controller.venue_type_options().is_empty());
    }
}
