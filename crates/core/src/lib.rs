//! Teacher Assistant Core
//!
//! Domain logic of the assistant: credential checks, the per-session
//! command interpreter and the persistence seam it writes through. Storage
//! engines and front ends live in other crates.

pub mod assistant;
pub mod auth;
pub mod command;
pub mod error;
pub mod grade;
pub mod identity;
pub mod interpreter;
pub mod reply;
pub mod session;
pub mod store;

pub use assistant::{Assistant, Conversation, LoginOutcome};
pub use error::{AuthError, CommandError, StorageError, ValidationError};
pub use store::PersistenceStore;
