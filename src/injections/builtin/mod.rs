//! Registration modules shipped with the crate.
//!
//! Each file submits one or more [`InjectionModule`](super::InjectionModule)s
//! for a scientific package, listing the references its authors ask users
//! to cite.

mod matplotlib;
mod mdp;
mod neuro;
mod nipype;
mod numpy;
mod pandas;
mod scipy;
mod sklearn;
