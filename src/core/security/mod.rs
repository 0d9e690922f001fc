mod access_control;
mod audit;
mod masking;

pub use access_control::{evaluate_access, IamAccessPolicy};
pub use audit::{AuditEntry, AuditFilter, AuditLogBuffer};
pub use masking::{mask_fields, MaskingRule, MaskingStrategy};
