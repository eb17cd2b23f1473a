use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use tracing::{debug, info, warn};

use super::model::{FieldLens, FormModel};
use super::values::{FieldKey, FieldValues};
use crate::auth::{AccountModel, AuthError, Authentication};
use crate::navigation::{Navigator, Route};
use crate::storage::SetStorage;
use crate::validation::{Validation, ValidationError};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormPhase {
    Idle,
    Editing,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RevalidateMode {
    /// Every field is checked against the new values on each edit.
    AllFields,
    /// Only the edited field and the fields registered as its dependents.
    ChangedWithDependents,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub revalidate_mode: RevalidateMode,
    pub access_token_key: &'static str,
    pub success_route: Route,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            revalidate_mode: RevalidateMode::AllFields,
            access_token_key: "accessToken",
            success_route: Route::Home,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldMeta {
    pub dirty: bool,
    pub error: Option<ValidationError>,
}

#[derive(Clone, Debug)]
pub struct FormSnapshot {
    pub id: FormId,
    pub values: FieldValues,
    pub field_meta: BTreeMap<FieldKey, FieldMeta>,
    pub main_error: Option<String>,
    pub phase: FormPhase,
    pub is_loading: bool,
    pub is_valid: bool,
    pub is_dirty: bool,
    pub submit_count: u32,
}

impl FormSnapshot {
    pub fn value(&self, field: FieldKey) -> &str {
        self.values.get(field)
    }

    pub fn error(&self, field: FieldKey) -> Option<&ValidationError> {
        self.field_meta
            .get(&field)
            .and_then(|meta| meta.error.as_ref())
    }

    /// Whether a submit button bound to this snapshot should be enabled.
    pub fn can_submit(&self) -> bool {
        self.is_valid && !self.is_loading && self.phase != FormPhase::Succeeded
    }

    pub fn model<M: FormModel>(&self) -> M {
        M::from_values(&self.values)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitGuard {
    AlreadySubmitting,
    AlreadySucceeded,
    InvalidFields,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    /// The request was absorbed without touching the form or calling authentication.
    Ignored(SubmitGuard),
    Succeeded(AccountModel),
    Failed(String),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FormError {
    StatePoisoned(&'static str),
    InvalidStateTransition { from: FormPhase, to: FormPhase },
    UnknownField(FieldKey),
    AlreadySubmitting,
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::StatePoisoned(context) => {
                write!(f, "form state lock poisoned while {context}")
            }
            FormError::InvalidStateTransition { from, to } => {
                write!(f, "invalid form state transition: {from:?} -> {to:?}")
            }
            FormError::UnknownField(field) => write!(f, "form has no field named `{field}`"),
            FormError::AlreadySubmitting => f.write_str("form submit is already in progress"),
        }
    }
}

impl std::error::Error for FormError {}

pub type FormResult<T> = Result<T, FormError>;

type Subscriber = Arc<dyn Fn(&FormSnapshot) + Send + Sync>;

struct FormState {
    id: FormId,
    initial: FieldValues,
    values: FieldValues,
    field_meta: BTreeMap<FieldKey, FieldMeta>,
    main_error: Option<String>,
    phase: FormPhase,
    is_loading: bool,
    submit_count: u32,
    revision: u64,
    // Revision of the latest edit that revalidates each field.
    validated_at: BTreeMap<FieldKey, u64>,
}

impl FormState {
    fn ensure_meta(&mut self, key: FieldKey) -> &mut FieldMeta {
        self.field_meta.entry(key).or_default()
    }

    fn is_valid(&self) -> bool {
        self.field_meta.values().all(|meta| meta.error.is_none())
    }

    fn submit_guard(&self) -> Option<SubmitGuard> {
        if self.is_loading {
            Some(SubmitGuard::AlreadySubmitting)
        } else if self.phase == FormPhase::Succeeded {
            Some(SubmitGuard::AlreadySucceeded)
        } else if !self.is_valid() {
            Some(SubmitGuard::InvalidFields)
        } else {
            None
        }
    }

    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            id: self.id,
            values: self.values.clone(),
            field_meta: self.field_meta.clone(),
            main_error: self.main_error.clone(),
            phase: self.phase,
            is_loading: self.is_loading,
            is_valid: self.is_valid(),
            is_dirty: self.field_meta.values().any(|meta| meta.dirty),
            submit_count: self.submit_count,
        }
    }
}

/// Controlled login form: field values, their errors and the submission
/// lifecycle of one form instance.
///
/// Clones share the same state. No lock is held while validation,
/// authentication, collaborators or subscribers run.
pub struct FormController<M, V, A> {
    options: FormOptions,
    state: Arc<RwLock<FormState>>,
    validation: Arc<V>,
    authentication: Arc<A>,
    storage: Arc<dyn SetStorage>,
    navigator: Arc<dyn Navigator>,
    dependencies: Arc<RwLock<BTreeMap<FieldKey, BTreeSet<FieldKey>>>>,
    subscribers: Arc<RwLock<Vec<(SubscriptionId, Subscriber)>>>,
    next_subscription: Arc<AtomicU64>,
    model: PhantomData<fn() -> M>,
}

impl<M, V, A> Clone for FormController<M, V, A> {
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            state: self.state.clone(),
            validation: self.validation.clone(),
            authentication: self.authentication.clone(),
            storage: self.storage.clone(),
            navigator: self.navigator.clone(),
            dependencies: self.dependencies.clone(),
            subscribers: self.subscribers.clone(),
            next_subscription: self.next_subscription.clone(),
            model: PhantomData,
        }
    }
}

impl<M, V, A> FormController<M, V, A>
where
    M: FormModel,
    V: Validation,
    A: Authentication<M>,
{
    pub fn new(
        options: FormOptions,
        validation: V,
        authentication: A,
        storage: impl SetStorage,
        navigator: impl Navigator,
    ) -> Self {
        let initial = FieldValues::empty_for(M::field_keys());
        let field_meta = validate_fields(&validation, initial.keys(), &initial)
            .into_iter()
            .map(|(key, error)| {
                (
                    key,
                    FieldMeta {
                        dirty: false,
                        error,
                    },
                )
            })
            .collect();

        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                id: FormId::next(),
                initial: initial.clone(),
                values: initial,
                field_meta,
                main_error: None,
                phase: FormPhase::Idle,
                is_loading: false,
                submit_count: 0,
                revision: 0,
                validated_at: BTreeMap::new(),
            })),
            validation: Arc::new(validation),
            authentication: Arc::new(authentication),
            storage: Arc::new(storage),
            navigator: Arc::new(navigator),
            dependencies: Arc::new(RwLock::new(BTreeMap::new())),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_subscription: Arc::new(AtomicU64::new(1)),
            model: PhantomData,
        }
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn form_id(&self) -> FormResult<FormId> {
        Ok(read_lock(&self.state, "reading form id")?.id)
    }

    pub fn register_dependency(&self, source: FieldKey, dependent: FieldKey) -> FormResult<()> {
        let mut dependencies = write_lock(&self.dependencies, "registering dependency")?;
        dependencies.entry(source).or_default().insert(dependent);
        Ok(())
    }

    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<M>,
        L::Value: AsRef<str>,
    {
        self.on_field_change(lens.key(), value.as_ref())
    }

    pub fn on_field_change(&self, field: FieldKey, value: impl Into<String>) -> FormResult<()> {
        let value = value.into();
        let targets = self.revalidation_targets(field)?;
        let (id, values, revision) = {
            let mut state = write_lock(&self.state, "applying field change")?;
            if !state.values.contains(field) {
                return Err(FormError::UnknownField(field));
            }
            if state.phase != FormPhase::Submitting {
                transition_phase(&mut state, FormPhase::Editing)?;
            }
            let dirty = value != state.initial.get(field);
            state.values = state.values.with(field, value);
            state.ensure_meta(field).dirty = dirty;
            state.revision += 1;
            let revision = state.revision;
            for key in &targets {
                state.validated_at.insert(*key, revision);
            }
            (state.id, state.values.clone(), revision)
        };

        let errors = validate_fields(self.validation.as_ref(), targets, &values);

        {
            let mut state = write_lock(&self.state, "writing field validation result")?;
            for (key, error) in errors {
                if state.validated_at.get(&key) == Some(&revision) {
                    state.ensure_meta(key).error = error;
                } else {
                    debug!(form = id.0, field = %key, "discarding validation of superseded values");
                }
            }
        }

        debug!(form = id.0, %field, "field changed");
        self.notify()
    }

    pub async fn submit(&self) -> FormResult<SubmitOutcome> {
        let (id, params) = {
            let mut state = write_lock(&self.state, "preparing submit")?;
            if let Some(guard) = state.submit_guard() {
                debug!(form = state.id.0, ?guard, "submit ignored");
                return Ok(SubmitOutcome::Ignored(guard));
            }
            transition_phase(&mut state, FormPhase::Submitting)?;
            state.is_loading = true;
            state.main_error = None;
            state.submit_count = state.submit_count.saturating_add(1);
            (state.id, M::from_values(&state.values))
        };
        let in_flight = SubmitInFlight {
            state: &self.state,
            form: id,
            armed: true,
        };
        self.notify()?;

        info!(form = id.0, "submitting credentials");
        let attempt = AssertUnwindSafe(async { self.authentication.auth(&params).await })
            .catch_unwind()
            .await;
        let result = match attempt {
            Ok(result) => result.map_err(|error| error.to_string()),
            Err(_) => {
                warn!(form = id.0, "authentication panicked");
                Err(AuthError::Unexpected.to_string())
            }
        }
        .and_then(|account| {
            self.storage
                .set(self.options.access_token_key, &account.access_token)
                .map(|()| account)
                .map_err(|error| error.to_string())
        });

        match result {
            Ok(account) => {
                {
                    let mut state = write_lock(&self.state, "completing submit")?;
                    state.is_loading = false;
                    transition_phase(&mut state, FormPhase::Succeeded)?;
                }
                in_flight.disarm();
                info!(form = id.0, route = %self.options.success_route, "authenticated");
                self.navigator.replace(self.options.success_route);
                self.notify()?;
                Ok(SubmitOutcome::Succeeded(account))
            }
            Err(message) => {
                {
                    let mut state = write_lock(&self.state, "failing submit")?;
                    state.is_loading = false;
                    state.main_error = Some(message.clone());
                    transition_phase(&mut state, FormPhase::Failed)?;
                }
                in_flight.disarm();
                warn!(form = id.0, error = %message, "authentication failed");
                self.notify()?;
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }

    pub fn navigate_to_signup(&self) {
        self.navigator.push(Route::SignUp);
    }

    pub fn reset_to_initial(&self) -> FormResult<()> {
        let initial = read_lock(&self.state, "reading initial values")?
            .initial
            .clone();
        let errors = validate_fields(self.validation.as_ref(), initial.keys(), &initial);
        {
            let mut state = write_lock(&self.state, "resetting form")?;
            if state.is_loading {
                return Err(FormError::AlreadySubmitting);
            }
            transition_phase(&mut state, FormPhase::Idle)?;
            state.values = initial;
            state.main_error = None;
            state.revision += 1;
            let revision = state.revision;
            for (key, error) in errors {
                state.validated_at.insert(key, revision);
                let meta = state.ensure_meta(key);
                meta.dirty = false;
                meta.error = error;
            }
        }
        self.notify()
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        Ok(read_lock(&self.state, "creating form snapshot")?.snapshot())
    }

    pub fn subscribe(
        &self,
        subscriber: impl Fn(&FormSnapshot) + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        let subscriber: Subscriber = Arc::new(subscriber);
        write_lock(&self.subscribers, "registering subscriber")?.push((id, subscriber));
        Ok(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> FormResult<bool> {
        let mut subscribers = write_lock(&self.subscribers, "removing subscriber")?;
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        Ok(subscribers.len() != before)
    }

    fn revalidation_targets(&self, field: FieldKey) -> FormResult<BTreeSet<FieldKey>> {
        match self.options.revalidate_mode {
            RevalidateMode::AllFields => Ok(M::field_keys().iter().copied().collect()),
            RevalidateMode::ChangedWithDependents => {
                let mut targets = read_lock(&self.dependencies, "reading field dependencies")?
                    .get(&field)
                    .cloned()
                    .unwrap_or_default();
                targets.insert(field);
                Ok(targets)
            }
        }
    }

    fn notify(&self) -> FormResult<()> {
        let subscribers = read_lock(&self.subscribers, "reading subscribers")?
            .iter()
            .map(|(_, subscriber)| subscriber.clone())
            .collect::<Vec<_>>();
        if subscribers.is_empty() {
            return Ok(());
        }
        let snapshot = self.snapshot()?;
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
        Ok(())
    }
}

/// Fails a submit that stops before it settles, either because its future
/// was dropped or because something on the way unwound, so the form does not
/// stay loading.
struct SubmitInFlight<'a> {
    state: &'a RwLock<FormState>,
    form: FormId,
    armed: bool,
}

impl SubmitInFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SubmitInFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !state.is_loading {
            return;
        }
        state.is_loading = false;
        state.main_error = Some(AuthError::Unexpected.to_string());
        if let Err(error) = transition_phase(&mut state, FormPhase::Failed) {
            warn!(form = self.form.0, %error, "abandoned submit left an unexpected phase");
        }
        warn!(form = self.form.0, "submit abandoned before it settled");
    }
}

fn validate_fields<V>(
    validation: &V,
    keys: impl IntoIterator<Item = FieldKey>,
    values: &FieldValues,
) -> Vec<(FieldKey, Option<ValidationError>)>
where
    V: Validation + ?Sized,
{
    keys.into_iter()
        .map(|key| (key, validation.validate(key, values).err()))
        .collect()
}

fn transition_phase(state: &mut FormState, next: FormPhase) -> FormResult<()> {
    let current = state.phase;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (FormPhase::Idle, FormPhase::Editing)
            | (FormPhase::Failed, FormPhase::Editing)
            | (FormPhase::Idle, FormPhase::Submitting)
            | (FormPhase::Editing, FormPhase::Submitting)
            | (FormPhase::Failed, FormPhase::Submitting)
            | (FormPhase::Submitting, FormPhase::Succeeded)
            | (FormPhase::Submitting, FormPhase::Failed)
            | (FormPhase::Editing, FormPhase::Idle)
            | (FormPhase::Failed, FormPhase::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.phase = next;
    Ok(())
}

fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
