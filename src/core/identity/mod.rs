//! Identity Store domain types: principals, organizations, groups.

mod group;
mod identity;
mod organization;

pub use group::Group;
pub use identity::{Identity, IdentityStatus, IdentityType};
pub use organization::Organization;
