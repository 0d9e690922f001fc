mod access_request;
mod campaign;
mod sod;

pub use access_request::{AccessApproval, AccessRequest, AccessRequestStatus};
pub use campaign::{CampaignStatus, CertificationCampaign, CertificationDecision};
pub use sod::{evaluate_all_sod, evaluate_sod, SodExemption, SodPolicy, SodViolation, SodViolationStatus};
