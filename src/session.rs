//! Session-backed storage of contextual instances.
//!
//! A [`SessionContext`] keeps one [`InstanceBag`] per contextual in the
//! store chosen for its session: the session's native attribute map when it
//! is exposed and configured, its generic accessors otherwise, or a private
//! map when there is no session at all.

pub mod bag;
pub mod context;
pub mod contextual;
pub mod detached;
pub mod direct;
pub mod generic;
pub mod provider;
pub mod store;

pub use bag::{AttributeValue, InstanceBag};
pub use context::{SessionContext, SessionContextConfig};
pub use contextual::{key_of, Contextual, KeyRef, ManagedBean, PASSIVATION_ID_PREFIX};
pub use detached::DetachedMap;
pub use direct::DirectSessionMap;
pub use generic::HttpSessionMap;
pub use provider::{HttpSession, NativeAttributes, SessionFacade, StandardSession};
pub use store::{ComponentInstanceMap, InstanceStore, StoreStrategy};
