//! Typed client for the Person actions of a document repository.
//!
//! The editors, the picture search panel and the email discovery toggle all
//! talk to the server through [`action::ActionInvoker`] and write their
//! results to a [`page::Page`].

pub mod action;
pub mod config;
pub mod editors;
pub mod email;
pub mod ids;
pub mod page;
pub mod panel;
pub mod render;
pub mod transport;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testing;
