//! Resource model: kinds, the type registry, materialization, and CRUD.

mod autofix;
mod entity;
mod kind;
mod materialize;
mod mutation;
mod registry;
mod specialized;
mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use autofix::{plan as plan_autofix, AutofixPlan, AutofixRule, PatchContext, RULES as AUTOFIX_RULES};
pub use entity::Resource;
pub use kind::{ApiRoot, ResourceId, ResourceKind};
pub use materialize::materialize;
pub use mutation::{DeleteRequest, UpdateRequest};
pub use registry::Registry;
pub use value::{AttributeHolder, Value};
