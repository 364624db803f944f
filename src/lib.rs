pub mod backend;
pub mod config;
pub mod controller;
pub mod models;
pub mod notify;
pub mod schema;
mod utils;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

pub use backend::{BackendError, HttpVenueBackend, LookupTable, VenueBackend};
pub use config::{ClientConfig, ConfigStore, ToastOptions};
pub use controller::{
    EventOutcome, FieldChange, FileResolveError, FormEvent, FormPhase, FormView, Navigation,
    SubmitError, VenueFormController,
};
pub use models::{
    BaseLocation, BaseUser, FileUploadResponse, Location, LookUp, ResolvedLocation, Venue,
    VenueAddRequest, VenueDraft, VenueTypeOption,
};
pub use notify::{ChannelNotifier, LogNotifier, Notification, NotificationKind, Notifier};
pub use schema::{validate, Field, ValidationReport};

/// Builds a controller wired to the HTTP backend described by `config`.
pub fn form_for(
    config: &ClientConfig,
    notifier: Arc<dyn Notifier>,
) -> Result<VenueFormController, BackendError> {
    let backend = HttpVenueBackend::from_config(config)?;
    let form = VenueFormController::new(Arc::new(backend), notifier)
        .with_toast_options(config.toast.clone());
    Ok(form)
}

/// Loads the stored config, mounts the form and drives it from `events` until
/// the sender closes or the user cancels.
pub async fn run(events: UnboundedReceiver<FormEvent>) -> Result<Option<Navigation>, BackendError> {
    let store = ConfigStore::load();
    let config = store.read();
    tracing::debug!(config = %store.path().display(), api = %config.api_base_url, "starting venue form");

    let mut form = form_for(&config, Arc::new(LogNotifier))?;
    form.mount().await;
    Ok(form.run(events).await)
}
