//! Policy lifecycle controller.
//!
//! `PolicyEditor` owns one policy for the duration of an edit session. It
//! gates saves on the validation engine, talks to the store, and turns
//! results into notifications and navigation.

use bastion_core::error::{LifecycleError, PersistenceError, PolicyError};
use bastion_core::id::PolicyId;
use bastion_core::log_event;
use bastion_core::{EditorConfig, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::collaborators::{EditorCollaborators, FieldError, Notifier};
use super::state::EditorState;
use crate::engine::{PolicyValidationAggregator, RuleSetValidator};
use crate::messages::MessageKey;
use crate::model::{Policy, RuleListKind, ServiceRef};
use crate::store::{PolicyStore, SaveOptions};

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SaveOutcome {
    /// The form reported field errors; nothing was validated or sent.
    FieldErrors(Vec<FieldError>),

    /// Validation refused the save.
    Blocked {
        /// List that failed, or `None` for the audit gate.
        list: Option<RuleListKind>,

        /// Message shown to the user.
        message: MessageKey,
    },

    /// The store confirmed the save.
    Persisted {
        /// Identity of the stored policy.
        id: PolicyId,

        /// Whether the policy was new.
        created: bool,
    },

    /// The store refused or failed the save.
    Failed {
        /// Text shown to the user.
        message: String,
    },
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeleteOutcome {
    /// The user declined the confirmation.
    Declined,

    /// The store confirmed the delete.
    Deleted(PolicyId),

    /// The store refused or failed the delete.
    Failed {
        /// Text shown to the user.
        message: String,
    },
}

#[derive(Debug)]
struct Session {
    policy: Policy,
    state: EditorState,
    guarded: bool,
}

impl Session {
    fn transition(&mut self, next: EditorState, operation: &'static str) -> std::result::Result<(), LifecycleError> {
        if !self.state.can_transition_to(next) {
            return Err(LifecycleError::InvalidState {
                operation,
                state: self.state.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Marks a request as outstanding until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> std::result::Result<Self, LifecycleError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| LifecycleError::RequestInFlight)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Armed while the store call of a save or delete is outstanding.
///
/// If the request future is dropped before the store answers, the session
/// goes back to `Editing` and the blocking indicator is released.
struct PendingRequest<'a> {
    session: &'a Mutex<Session>,
    notifier: &'a dyn Notifier,
    operation: &'static str,
    armed: bool,
}

impl<'a> PendingRequest<'a> {
    fn arm(session: &'a Mutex<Session>, notifier: &'a dyn Notifier, operation: &'static str) -> Self {
        notifier.block_ui();
        Self {
            session,
            notifier,
            operation,
            armed: true,
        }
    }

    /// The store answered; the caller handles the outcome.
    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        {
            let mut session = self.session.lock();
            if session.transition(EditorState::Failed, self.operation).is_ok() {
                let _ = session.transition(EditorState::Editing, self.operation);
            }
        }

        log_event!(LogLevel::Warning, "Request abandoned before the store answered",
            operation => self.operation,
        );
        self.notifier.unblock_ui();
    }
}

/// Edit session for one policy.
pub struct PolicyEditor<S: PolicyStore> {
    store: Arc<S>,
    service: ServiceRef,
    config: EditorConfig,
    ui: EditorCollaborators,
    validator: RuleSetValidator,
    aggregator: PolicyValidationAggregator,
    session: Mutex<Session>,
    in_flight: AtomicBool,
}

impl<S: PolicyStore> PolicyEditor<S> {
    /// Open an editor on an existing or new policy.
    ///
    /// A policy naming no service is bound to `service`; one naming another
    /// service is refused. Opening installs the navigation guard.
    ///
    /// # Arguments
    ///
    /// * `store` - The store the policy is saved to and deleted from.
    /// * `service` - The service owning the policy.
    /// * `config` - Editor configuration, used for the policy list route.
    /// * `ui` - Form, notifier, navigator and message catalog.
    /// * `policy` - The policy to edit.
    ///
    /// # Returns
    ///
    /// * `Ok(PolicyEditor)` - An editor in the `Editing` state.
    /// * `Err(Error::Policy)` - If the policy belongs to another service.
    pub fn open(
        store: Arc<S>,
        service: ServiceRef,
        config: EditorConfig,
        ui: EditorCollaborators,
        mut policy: Policy,
    ) -> Result<Self> {
        if policy.service.is_empty() {
            policy.service = service.name.clone();
        } else if policy.service != service.name {
            return Err(PolicyError::ServiceMismatch {
                editor: service.name.clone(),
                policy: policy.service.clone(),
            }
            .into());
        }

        if !policy.is_enabled {
            ui.notifier.show_inline_alert(&ui.catalog.text(MessageKey::PolicyDisabled));
        }
        ui.navigator
            .prevent_navigation(&ui.catalog.text(MessageKey::PreventNavigation));

        log_event!(LogLevel::Info, "Policy editor opened",
            service => service.name,
            policy => policy,
        );

        Ok(Self {
            store,
            service,
            config,
            ui,
            validator: RuleSetValidator::new(),
            aggregator: PolicyValidationAggregator::new(),
            session: Mutex::new(Session {
                policy,
                state: EditorState::Editing,
                guarded: true,
            }),
            in_flight: AtomicBool::new(false),
        })
    }

    /// Open an editor on a blank policy for `service`.
    pub fn open_new(
        store: Arc<S>,
        service: ServiceRef,
        config: EditorConfig,
        ui: EditorCollaborators,
    ) -> Result<Self> {
        let policy = Policy::new(service.name.clone(), "").with_audit_logging(config.default_audit_logging);
        Self::open(store, service, config, ui, policy)
    }

    /// Current state.
    pub fn state(&self) -> EditorState {
        self.session.lock().state
    }

    /// Copy of the policy being edited.
    pub fn policy(&self) -> Policy {
        self.session.lock().policy.clone()
    }

    /// Service the editor is bound to.
    pub fn service(&self) -> &ServiceRef {
        &self.service
    }

    /// Whether the editor was opened on a stored policy.
    pub fn is_edit_mode(&self) -> bool {
        !self.session.lock().policy.is_new()
    }

    /// Whether the navigation guard is installed.
    pub fn is_guarded(&self) -> bool {
        self.session.lock().guarded
    }

    /// Whether a save or delete is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Apply an edit to the policy.
    ///
    /// Only allowed while editing and with no request outstanding.
    pub fn edit<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Policy) -> R,
    {
        let _flight = InFlight::acquire(&self.in_flight)?;
        let mut session = self.session.lock();
        if session.state != EditorState::Editing {
            return Err(LifecycleError::InvalidState {
                operation: "edit",
                state: session.state.to_string(),
            }
            .into());
        }
        Ok(f(&mut session.policy))
    }

    /// Commit, validate and persist the policy.
    ///
    /// Field errors and validation failures never reach the store. A store
    /// failure leaves the editor in `Editing` with the navigation guard in
    /// place. Dropping the returned future while the store call is
    /// outstanding also returns the editor to `Editing`.
    ///
    /// # Returns
    ///
    /// * `Ok(SaveOutcome)` - What happened to the save request.
    /// * `Err(Error::Lifecycle)` - If a request is already in flight or the
    ///   editor is not in `Editing`.
    pub async fn save(&self) -> Result<SaveOutcome> {
        let _flight = InFlight::acquire(&self.in_flight)?;

        let mut working = {
            let mut session = self.session.lock();
            session.transition(EditorState::Validating, "save")?;
            session.policy.clone()
        };

        let field_errors = self.ui.form.commit(&mut working);
        if !field_errors.is_empty() {
            log_event!(LogLevel::Debug, "Form commit failed", fields => field_errors.len());
            let mut session = self.session.lock();
            session.policy = working;
            session.transition(EditorState::Editing, "save")?;
            return Ok(SaveOutcome::FieldErrors(field_errors));
        }

        let verdicts = self.validator.validate_policy(&working);
        let outcome = self.aggregator.aggregate(&verdicts);

        if let (false, Some(message)) = (outcome.proceed, outcome.message) {
            {
                let mut session = self.session.lock();
                session.policy = working;
                session.transition(EditorState::Blocked, "save")?;
                session.transition(EditorState::Editing, "save")?;
            }

            log_event!(LogLevel::Info, "Save blocked by validation",
                list => outcome.failed_list.map(|l| l.as_str()).unwrap_or("all"),
                message => message,
            );
            self.ui.notifier.alert_popup(&self.ui.catalog.text(message));

            return Ok(SaveOutcome::Blocked {
                list: outcome.failed_list,
                message,
            });
        }

        self.ui.form.before_save(&mut working);
        let created = working.is_new();
        {
            let mut session = self.session.lock();
            session.policy = working.clone();
            session.transition(EditorState::Saving, "save")?;
        }

        let pending = PendingRequest::arm(&self.session, self.ui.notifier.as_ref(), "save");
        let result = self.store.save(&working, SaveOptions { wait: true }).await;
        pending.complete();

        let result = result.and_then(|stored| match stored.id {
            Some(id) => Ok((id, stored)),
            None => Err(PersistenceError::Storage(
                "store returned a policy without an id".to_string(),
            )),
        });

        match result {
            Ok((id, stored)) => {
                {
                    let mut session = self.session.lock();
                    session.policy = stored;
                    session.transition(EditorState::Persisted, "save")?;
                    session.guarded = false;
                }

                log_event!(LogLevel::Info, "Policy saved", id => id, created => created);

                let message = if created {
                    MessageKey::PolicyCreated
                } else {
                    MessageKey::PolicyUpdated
                };
                self.ui.notifier.unblock_ui();
                self.ui.notifier.notify_success(
                    &self.ui.catalog.text(MessageKey::SuccessTitle),
                    &self.ui.catalog.text(message),
                );
                self.ui.navigator.allow_navigation();
                self.ui
                    .navigator
                    .navigate_to(&self.config.policy_list_path(self.service.id), true);

                Ok(SaveOutcome::Persisted { id, created })
            }
            Err(err) => {
                {
                    let mut session = self.session.lock();
                    session.transition(EditorState::Failed, "save")?;
                    session.transition(EditorState::Editing, "save")?;
                }

                log_event!(LogLevel::Warning, "Policy save failed", error => err);

                self.ui.notifier.unblock_ui();
                let message = match err.description() {
                    Some(description) => {
                        self.ui.notifier.show_error_msg(&description);
                        description
                    }
                    None => {
                        let fallback = if created {
                            MessageKey::CreateFailed
                        } else {
                            MessageKey::UpdateFailed
                        };
                        let text = self.ui.catalog.text(fallback);
                        self.ui
                            .notifier
                            .notify_error(&self.ui.catalog.text(MessageKey::ErrorTitle), &text);
                        text
                    }
                };

                Ok(SaveOutcome::Failed { message })
            }
        }
    }

    /// Delete the stored policy after confirmation.
    ///
    /// # Returns
    ///
    /// * `Ok(DeleteOutcome)` - Whether the user declined, or how the store
    ///   answered.
    /// * `Err(Error::Lifecycle)` - If a request is already in flight, the
    ///   editor is not in `Editing`, or the policy was never stored.
    pub async fn delete(&self) -> Result<DeleteOutcome> {
        let _flight = InFlight::acquire(&self.in_flight)?;

        let id = {
            let session = self.session.lock();
            if !session.state.can_transition_to(EditorState::Deleting) {
                return Err(LifecycleError::InvalidState {
                    operation: "delete",
                    state: session.state.to_string(),
                }
                .into());
            }
            session.policy.id.ok_or(LifecycleError::NotPersisted)?
        };

        if !self
            .ui
            .notifier
            .confirm_popup(&self.ui.catalog.text(MessageKey::ConfirmDelete))
        {
            log_event!(LogLevel::Debug, "Delete declined", id => id);
            return Ok(DeleteOutcome::Declined);
        }

        self.session.lock().transition(EditorState::Deleting, "delete")?;

        let pending = PendingRequest::arm(&self.session, self.ui.notifier.as_ref(), "delete");
        let result = self.store.destroy(id).await;
        pending.complete();

        match result {
            Ok(()) => {
                {
                    let mut session = self.session.lock();
                    session.transition(EditorState::Deleted, "delete")?;
                    session.guarded = false;
                }

                log_event!(LogLevel::Info, "Policy deleted", id => id);

                self.ui.notifier.unblock_ui();
                self.ui.navigator.allow_navigation();
                self.ui.notifier.notify_success(
                    &self.ui.catalog.text(MessageKey::SuccessTitle),
                    &self.ui.catalog.text(MessageKey::PolicyDeleted),
                );
                self.ui
                    .navigator
                    .navigate_to(&self.config.policy_list_path(self.service.id), true);

                Ok(DeleteOutcome::Deleted(id))
            }
            Err(err) => {
                {
                    let mut session = self.session.lock();
                    session.transition(EditorState::Failed, "delete")?;
                    session.transition(EditorState::Editing, "delete")?;
                }

                log_event!(LogLevel::Warning, "Policy delete failed", id => id, error => err);

                self.ui.notifier.unblock_ui();
                let message = err
                    .description()
                    .unwrap_or_else(|| self.ui.catalog.text(MessageKey::DeleteFailed));
                self.ui
                    .notifier
                    .notify_error(&self.ui.catalog.text(MessageKey::ErrorTitle), &message);

                Ok(DeleteOutcome::Failed { message })
            }
        }
    }

    /// Leave the editor without saving.
    pub fn cancel(&self) -> Result<()> {
        let _flight = InFlight::acquire(&self.in_flight)?;

        {
            let mut session = self.session.lock();
            session.transition(EditorState::Closed, "cancel")?;
            session.guarded = false;
        }

        log_event!(LogLevel::Debug, "Policy edit cancelled");

        self.ui.navigator.allow_navigation();
        self.ui
            .navigator
            .navigate_to(&self.config.policy_list_path(self.service.id), true);

        Ok(())
    }

    /// Tear down the editor view. Releases the navigation guard.
    ///
    /// Refused while a request is outstanding.
    pub fn close(&self) -> Result<()> {
        let _flight = InFlight::acquire(&self.in_flight)?;

        {
            let mut session = self.session.lock();
            if session.state.is_final() {
                return Ok(());
            }
            session.transition(EditorState::Closed, "close")?;
            session.guarded = false;
        }

        self.ui.navigator.allow_navigation();
        Ok(())
    }
}
