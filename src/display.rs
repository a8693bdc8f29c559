use log::{debug, warn};

use crate::{DisplayMode, RefreshError, RefreshResult};

/// Selects which entry of the driver's mode table to read
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ModeIndex {
    /// The mode the display is running in right now
    Current,
    /// An entry of the enumerated mode table, starting at 0
    Enumerated(u32),
}

/// Read access to the modes of the default display device
pub trait ModeSource {
    /// Reads a single mode. `None` means the OS has no mode at this index.
    fn query_mode(&self, index: ModeIndex) -> Option<DisplayMode>;
}

/// Returns the mode the default display is currently running in.
pub fn current_mode<S: ModeSource + ?Sized>(source: &S) -> RefreshResult<DisplayMode> {
    match source.query_mode(ModeIndex::Current) {
        Some(mode) => {
            debug!("Current mode: {}", mode);
            Ok(mode)
        }
        None => {
            warn!("OS did not report the current display mode");
            Err(RefreshError::QueryFailure)
        }
    }
}

/// Walks the driver's mode table from index 0 until the first missing entry.
///
/// The iterator is lazy and every call starts over at index 0. Modes are passed through
/// as reported, including ones without a refresh rate.
pub fn enumerate_modes<S: ModeSource + ?Sized>(source: &S) -> Modes<'_, S> {
    Modes {
        source,
        next_index: Some(0),
    }
}

/// Iterator over the mode table, see [`enumerate_modes`]
pub struct Modes<'a, S: ?Sized> {
    source: &'a S,
    next_index: Option<u32>,
}

impl<S: ModeSource + ?Sized> Iterator for Modes<'_, S> {
    type Item = DisplayMode;

    fn next(&mut self) -> Option<DisplayMode> {
        let index = self.next_index?;
        match self.source.query_mode(ModeIndex::Enumerated(index)) {
            Some(mode) => {
                self.next_index = index.checked_add(1);
                Some(mode)
            }
            None => {
                debug!("Mode table ends after {} entries", index);
                self.next_index = None;
                None
            }
        }
    }
}

impl<S: ModeSource + ?Sized> std::iter::FusedIterator for Modes<'_, S> {}
