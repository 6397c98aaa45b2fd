//! Usage: Identity-provider client abstraction and its Cognito implementation.
//!
//! The coordinator only talks to the `IdentityProvider` trait; `CognitoProvider`
//! speaks the Hosted UI token endpoint and the `cognito-idp` JSON API.

pub(crate) mod cognito;
pub(crate) mod provider;
pub(crate) mod ready;
