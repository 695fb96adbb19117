//! Core types shared by the rest of the crate.
//!
//! - [`error`] - [`DueError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`never_fail`] - the policy that keeps citation bookkeeping from
//!   breaking the host program

pub mod error;
pub mod never_fail;

pub use error::{DueError, ErrorContext, user_friendly_error};
pub use never_fail::{allow_fail, never_fail};
