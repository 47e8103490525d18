pub mod bootstrap;
pub mod confirm_ns;
pub mod enumerate_delegations;
pub mod synthesize_ds;
pub mod validate_authentication;
pub mod validate_key_state;

pub use bootstrap::BootstrapDelegationsUseCase;
pub use confirm_ns::{ConfirmNsUseCase, NsConfirmation};
pub use enumerate_delegations::{EnumerateDelegationsUseCase, ZoneWalk};
pub use synthesize_ds::SynthesizeDsUseCase;
pub use validate_authentication::{
    AuthenticationEvidence, AuthenticationPolicy, AuthenticationResult,
    ValidateAuthenticationUseCase,
};
pub use validate_key_state::{KeyStateOutcome, ValidateKeyStateUseCase};
