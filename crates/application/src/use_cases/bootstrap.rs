use super::{
    AuthenticationPolicy, AuthenticationResult, ConfirmNsUseCase, EnumerateDelegationsUseCase,
    KeyStateOutcome, NsConfirmation, SynthesizeDsUseCase, ValidateAuthenticationUseCase,
    ValidateKeyStateUseCase,
};
use crate::ports::{DnsResolver, DnssecVerifier, NameserverQuery, ParentalNsSource};
use dsboot_domain::config::BootstrapConfig;
use dsboot_domain::{
    Delegation, DelegationOutcome, DelegationState, Directive, DnsQuery, DomainError, DomainName,
    DsRecord, RecordType, SkipReason, Stage,
};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Terminal skip produced by one pipeline stage.
struct Skip {
    state: DelegationState,
    reason: SkipReason,
}

impl Skip {
    fn new(state: DelegationState, reason: SkipReason) -> Self {
        Self { state, reason }
    }

    /// Maps a resolution error to the skip state allowed at `stage`.
    fn failed(stage: Stage, error: DomainError) -> Self {
        if !error.is_bogus() {
            return Self::new(
                DelegationState::ResolutionFailedSkipped,
                SkipReason::ResolutionFailed { stage, error },
            );
        }
        let state = match stage {
            Stage::ExistingDs | Stage::NsConfirmation => DelegationState::ResolutionFailedSkipped,
            Stage::Authentication => DelegationState::AuthFailedSkipped,
            Stage::KeyState => DelegationState::UnauthenticatedSkipped,
        };
        Self::new(state, SkipReason::Bogus { stage, error })
    }
}

/// Use case: drive every delegation through
/// NS confirmation -> authentication -> key state -> DS synthesis
///
/// Ancestor directives are expanded by zone walks; each discovered child
/// enters the same pipeline as an explicit delegation. A failing
/// delegation never aborts the run, it ends in a skip state with a reason.
pub struct BootstrapDelegationsUseCase {
    resolver: Arc<dyn DnsResolver>,
    enumerate: EnumerateDelegationsUseCase,
    confirm_ns: ConfirmNsUseCase,
    authenticate: ValidateAuthenticationUseCase,
    key_state: ValidateKeyStateUseCase,
    synthesize: SynthesizeDsUseCase,
    workers: usize,
    walk_concurrency: usize,
    check_existing_ds: bool,
}

impl BootstrapDelegationsUseCase {
    pub fn new(
        resolver: Arc<dyn DnsResolver>,
        nameservers: Arc<dyn NameserverQuery>,
        verifier: Arc<dyn DnssecVerifier>,
        parental_ns: Arc<dyn ParentalNsSource>,
        config: &BootstrapConfig,
    ) -> Self {
        let policy = AuthenticationPolicy {
            scheme: config.signaling_scheme,
            quorum: config.auth_quorum,
        };
        Self {
            enumerate: EnumerateDelegationsUseCase::new(
                Arc::clone(&resolver),
                config.signaling_scheme,
                config.walk_step_limit,
            ),
            confirm_ns: ConfirmNsUseCase::new(parental_ns),
            authenticate: ValidateAuthenticationUseCase::new(Arc::clone(&resolver), policy),
            key_state: ValidateKeyStateUseCase::new(Arc::clone(&resolver), nameservers, verifier),
            synthesize: SynthesizeDsUseCase::new(),
            resolver,
            workers: config.workers.max(1),
            walk_concurrency: config.walk_concurrency.max(1),
            check_existing_ds: config.check_existing_ds,
        }
    }

    /// Lazily turns directives into terminal outcomes, with at most
    /// `workers` delegation pipelines and `walk_concurrency` directive
    /// expansions in flight. Outcomes arrive in completion order.
    pub fn run<S>(self: Arc<Self>, directives: S) -> BoxStream<'static, DelegationOutcome>
    where
        S: Stream<Item = Directive> + Send + 'static,
    {
        let expander = Arc::clone(&self);
        let workers = self.workers;
        let walk_concurrency = self.walk_concurrency;

        directives
            .map(move |directive| expander.delegations_for(directive))
            .flatten_unordered(walk_concurrency)
            .map(move |delegation| {
                let this = Arc::clone(&self);
                async move { this.bootstrap(delegation).await }
            })
            .buffer_unordered(workers)
            .boxed()
    }

    fn delegations_for(&self, directive: Directive) -> BoxStream<'static, Delegation> {
        match directive {
            Directive::Explicit { zone, nameservers } => {
                stream::iter(Some(Delegation::new(zone, nameservers))).boxed()
            }
            Directive::AncestorScan(request) => {
                let nameservers = request.nameservers.clone();
                self.enumerate
                    .execute(&request)
                    .map(move |zone| Delegation::new(zone, nameservers.clone()))
                    .boxed()
            }
        }
    }

    /// Runs one delegation to a terminal state.
    pub async fn bootstrap(&self, mut delegation: Delegation) -> DelegationOutcome {
        let zone = delegation.zone.clone();
        debug!(zone = %zone, "Processing delegation");

        match self.pipeline(&mut delegation).await {
            Ok(records) => {
                info!(zone = %zone, records = records.len(), "Delegation bootstrapped");
                DelegationOutcome::Bootstrapped { zone, records }
            }
            Err(Skip { state, reason }) => {
                if let Err(e) = delegation.skip(state, reason.clone()) {
                    error!(zone = %zone, error = %e, "Pipeline ended in an unexpected state");
                }
                match state {
                    DelegationState::ResolutionFailedSkipped => {
                        warn!(zone = %zone, state = %state, reason = %reason, "Delegation skipped")
                    }
                    _ => info!(zone = %zone, state = %state, reason = %reason, "Delegation skipped"),
                }
                DelegationOutcome::Skipped {
                    zone,
                    state,
                    reason,
                }
            }
        }
    }

    async fn pipeline(&self, delegation: &mut Delegation) -> Result<Vec<DsRecord>, Skip> {
        let zone = delegation.zone.clone();

        if self.check_existing_ds {
            self.ensure_unsecured(&zone).await?;
        }

        match self
            .confirm_ns
            .execute(&zone, &delegation.nameservers)
            .await
        {
            Ok(NsConfirmation::Confirmed) => {}
            Ok(NsConfirmation::Mismatch { actual }) => {
                return Err(Skip::new(
                    DelegationState::NsMismatchSkipped,
                    SkipReason::DelegatedElsewhere { actual },
                ))
            }
            Ok(NsConfirmation::NotFound) => {
                return Err(Skip::new(
                    DelegationState::NotFoundSkipped,
                    SkipReason::NotDelegated,
                ))
            }
            Err(e) => return Err(Skip::failed(Stage::NsConfirmation, e)),
        }
        transition(delegation, DelegationState::AuthPending, Stage::NsConfirmation)?;

        let evidence = match self
            .authenticate
            .execute(&zone, &delegation.nameservers)
            .await
        {
            Ok(AuthenticationResult::Authenticated(evidence)) => evidence,
            Ok(AuthenticationResult::Unauthenticated(reason)) => {
                return Err(Skip::new(DelegationState::AuthFailedSkipped, reason))
            }
            Err(e) => return Err(Skip::failed(Stage::Authentication, e)),
        };
        debug!(zone = %zone, signals = evidence.signals.len(), "Bootstrap signal authenticated");
        transition(delegation, DelegationState::AuthOk, Stage::Authentication)?;
        transition(delegation, DelegationState::KeyPending, Stage::Authentication)?;

        let key_state = match self
            .key_state
            .execute(&zone, &delegation.nameservers)
            .await
        {
            Ok(KeyStateOutcome::Valid(key_state)) => key_state,
            Ok(KeyStateOutcome::NoData(reason)) => {
                return Err(Skip::new(DelegationState::NoDataSkipped, reason))
            }
            Ok(KeyStateOutcome::Unauthenticated(reason)) => {
                return Err(Skip::new(DelegationState::UnauthenticatedSkipped, reason))
            }
            Err(e) => return Err(Skip::failed(Stage::KeyState, e)),
        };

        if key_state.published_cds != evidence.cds {
            return Err(Skip::new(
                DelegationState::UnauthenticatedSkipped,
                SkipReason::SignalMismatch,
            ));
        }

        let records = self.synthesize.execute(&zone, &key_state);
        if records.is_empty() {
            return Err(Skip::new(
                DelegationState::UnauthenticatedSkipped,
                SkipReason::NoValidatedAlgorithm {
                    dropped: key_state.dropped_algorithms.iter().copied().collect(),
                },
            ));
        }
        transition(delegation, DelegationState::Bootstrapped, Stage::KeyState)?;
        Ok(records)
    }

    async fn ensure_unsecured(&self, zone: &DomainName) -> Result<(), Skip> {
        let answer = self
            .resolver
            .resolve(&DnsQuery::new(zone.clone(), RecordType::DS))
            .await
            .map_err(|e| Skip::failed(Stage::ExistingDs, e))?;

        if answer.authenticated && !answer.ds_set(zone).is_empty() {
            return Err(Skip::new(
                DelegationState::AlreadySecuredSkipped,
                SkipReason::AlreadySecured,
            ));
        }
        Ok(())
    }
}

fn transition(
    delegation: &mut Delegation,
    next: DelegationState,
    stage: Stage,
) -> Result<(), Skip> {
    delegation
        .advance(next)
        .map_err(|error| Skip::failed(stage, error))
}
