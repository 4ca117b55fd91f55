//! # df-services
//!
//! Transaction scripts over the `ForumRepo` port: one method per mutation,
//! each doing get, then a pure ledger function, then sequential writes.
//! The store guarantees no atomicity across those writes; each request
//! is the only writer for its own mutation, nothing more.

pub mod answers;
pub mod communities;
pub mod questions;
pub mod users;
pub mod views;

pub use answers::AnswerService;
pub use communities::{CommunityPatch, CommunityService};
pub use questions::QuestionService;
pub use users::{UserProfile, UserService};
