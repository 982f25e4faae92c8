pub mod action;
pub mod config;
pub mod dispatch;
pub mod effector;
pub mod error;
pub mod github;
pub mod score;
pub mod signature;

pub use action::{decode, ActionKind, ActionRecord};
pub use dispatch::{dispatch, DispatchOutcome, Effect, EffectFailure};
pub use effector::{RemoteEffector, RemoteError};
pub use error::{RemedyError, Result};
