//! Client-side guestbook controllers.
//!
//! The browser page holds one of two controllers, depending on the deployment:
//! a [`MessageBoard`] for the message-list guestbook or a [`Canvas`] for the
//! shared character grid. Both keep their state locally and push the whole
//! document to the store through a [`Transport`].

pub mod board;
pub mod canvas;
pub mod debounce;
pub mod error;
pub mod grid;
pub mod transport;

#[cfg(test)]
mod testing;

pub use board::{BoardView, Edit, MessageBoard};
pub use canvas::Canvas;
pub use debounce::Debouncer;
pub use error::ClientError;
pub use grid::{Cursor, Grid, GridEditor, Key, KeyPress};
pub use transport::{HttpTransport, Transport};
