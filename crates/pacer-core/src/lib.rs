//! Core of the EPUB pacer: book extraction, the document model, the
//! sentence-aware pacing engine, autoplay timing and persistence.
//!
//! Nothing here touches the terminal; front ends drive a
//! [`session::ReaderSession`] with [`session::SessionCommand`]s and render
//! the [`session::ReaderSnapshot`] it returns.

pub mod boundary;
pub mod cancellation;
pub mod config;
pub mod document;
pub mod engine;
pub mod epub_loader;
pub mod error;
pub mod pagination;
pub mod preferences;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod text_utils;

pub use cancellation::CancellationToken;
pub use error::{LoadError, PersistenceError};
pub use session::{ReaderSession, ReaderSnapshot, SessionCommand, SessionEvent};
