//! beanctx: stateful-bean transaction synchronization and session-backed
//! contextual instance storage.
//!
//! [`sync`] resolves and fires the three synchronization callbacks around a
//! transaction boundary, [`container`] deploys beans with their interceptors,
//! [`verify`] checks callback ordering across the registration styles, and
//! [`session`] stores contextual instances in an HTTP-session-like backing
//! store.

pub mod cli;
pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod session;
pub mod sync;
pub mod verify;
