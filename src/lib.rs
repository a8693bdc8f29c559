//! A library to query and change the refresh rate of the primary display.
//!
//! Modes are read through [`ModeSource`], narrowed down to the refresh rates available at the
//! current resolution and color depth, and applied through [`ModeChanger`] by first testing the
//! new mode and only then committing it. On Windows both traits are implemented by
//! [`PrimaryDisplay`], which wraps the relevant `winuser.h` calls.

mod applier;
mod display;
mod error;
pub mod messages;
pub mod mock;
mod selector;
mod session;
mod types;
#[cfg(windows)]
mod win32;

pub use applier::*;
pub use display::*;
pub use error::*;
pub use selector::*;
pub use session::*;
pub use types::*;
#[cfg(windows)]
pub use win32::PrimaryDisplay;
