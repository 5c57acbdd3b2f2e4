//! The registration URL builder controller.
//!
//! Owns the filter state and wires the loader, composer and actions
//! together for one record.

use std::sync::Arc;

use regurl_model::{FilterField, FilterInput, FilterState, ModelError, ReferenceOption};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::actions::{ActionDispatcher, ActionError, Clipboard, CopyOutcome, UrlOpener};
use crate::aggregate::{self, FilterControl, LoadingSummary};
use crate::backend::RegistrationBackend;
use crate::compose::{UrlInputs, compose_url, construct_base_url};
use crate::config::BuilderConfig;
use crate::loader::{ChannelKind, RecordContext, ReferenceDataLoader};
use crate::notify::Notifier;

/// Host-provided collaborators.
pub struct Services {
    pub backend: Arc<dyn RegistrationBackend>,
    pub notifier: Arc<dyn Notifier>,
    pub clipboard: Arc<dyn Clipboard>,
    pub opener: Arc<dyn UrlOpener>,
}

#[derive(Debug)]
pub struct RegistrationUrlBuilder {
    config: BuilderConfig,
    loader: ReferenceDataLoader,
    filters: FilterState,
    revision: u64,
    actions: ActionDispatcher,
}

impl RegistrationUrlBuilder {
    pub fn new(context: RecordContext, config: BuilderConfig, services: Services) -> Self {
        let loader = ReferenceDataLoader::new(
            services.backend,
            Arc::clone(&services.notifier),
            context,
            config.facets,
        );
        let actions =
            ActionDispatcher::new(services.clipboard, services.opener, services.notifier)
                .with_acknowledgment(config.copy_acknowledgment())
                .with_access(config.can_get_public_url);
        Self {
            config,
            loader,
            filters: FilterState::empty(),
            revision: 0,
            actions,
        }
    }

    /// Issue every initial fetch.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn mount(&mut self) {
        info!(
            record_id = %self.loader.context().record_id,
            object = %self.loader.context().object_api_name,
            "mounting registration URL builder"
        );
        self.loader
            .start(self.filters.show_unavailable_course_options);
    }

    pub fn context(&self) -> &RecordContext {
        self.loader.context()
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn loader(&self) -> &ReferenceDataLoader {
        &self.loader
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Bumped on every filter mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply one control edit.
    ///
    /// Toggling unavailable course options may issue a course-option refetch.
    pub fn set_filter(&mut self, field: FilterField, input: FilterInput) -> Result<(), ModelError> {
        self.filters.set_with(&self.config.facets, field, input)?;
        self.revision += 1;
        debug!(field = %field, revision = self.revision, "filter updated");
        if field == FilterField::ShowUnavailableCourseOptions {
            self.loader
                .update_course_option_params(self.filters.show_unavailable_course_options);
        }
        Ok(())
    }

    /// Apply an edit addressed by control name.
    pub fn set_control(&mut self, name: &str, input: FilterInput) -> Result<(), ModelError> {
        self.set_filter(name.parse()?, input)
    }

    /// The URL for the current record and filters.
    pub fn url(&self) -> String {
        let context = self.loader.context();
        let object = context.config();
        let base_url = construct_base_url(
            self.loader.community_url(),
            self.config.registration_url_path.as_deref(),
        );
        compose_url(&UrlInputs {
            base_url: &base_url,
            record_id: &context.record_id,
            is_course_session: context.is_course_session(),
            filter_param_name: &object.filter_name,
            display_name: self.loader.record_name(),
            filters: &self.filters,
            facets: &self.config.facets,
        })
    }

    pub fn is_busy(&self) -> bool {
        aggregate::is_busy(&self.loader)
    }

    pub fn is_disabled(&self, control: FilterControl) -> bool {
        aggregate::is_disabled(&self.loader, control)
    }

    pub fn summary(&self) -> LoadingSummary {
        LoadingSummary::from_loader(&self.loader)
    }

    pub fn options(&self, kind: ChannelKind) -> Option<&[ReferenceOption]> {
        self.loader.options(kind)
    }

    /// Clear every filter and refetch all reference data.
    pub fn refresh_all(&mut self) {
        self.filters.reset();
        self.revision += 1;
        info!(revision = self.revision, "refreshing reference data");
        self.loader
            .refresh_all(self.filters.show_unavailable_course_options);
    }

    pub async fn next_update(&mut self) -> Option<ChannelKind> {
        self.loader.next_update().await
    }

    pub async fn settle(&mut self) {
        self.loader.settle().await;
    }

    pub async fn copy_url(&mut self) -> Result<CopyOutcome, ActionError> {
        let url = self.url();
        self.actions.copy_to_clipboard(&url).await
    }

    pub fn open_url(&self) -> Result<bool, ActionError> {
        self.actions.open_in_new_tab(&self.url())
    }

    pub fn is_copied(&self) -> bool {
        self.actions.is_copied()
    }

    pub fn subscribe_copied(&self) -> watch::Receiver<bool> {
        self.actions.subscribe_copied()
    }
}
