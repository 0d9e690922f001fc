//! An in-process identity and access management core: identity and
//! credential storage, RBAC/ABAC/PBAC authorization, token issuance,
//! sessions, federation (SAML/OIDC), risk scoring, governance (SoD and
//! access certification), privileged access management, cross-cutting
//! security controls, and metrics — wired together by the orchestrator.

pub mod adapters;
pub mod config;
pub mod core;
pub mod event;
pub mod orchestrator;
pub mod services;

pub use config::IamConfig;
pub use orchestrator::IamOrchestrator;
