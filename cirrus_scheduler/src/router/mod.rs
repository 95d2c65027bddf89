//! Restful API of the scheduler.

pub(crate) mod dag;
pub(crate) mod executor;
pub(crate) mod function;
