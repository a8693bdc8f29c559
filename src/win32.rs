//! `winuser.h` backend: reads and changes the modes of the default display device.

use std::{mem, ptr, slice};

use log::{trace, warn};
use winsafe::prelude::NativeBitflag;
use winsafe::{co, GmidxEnum, DEVMODE};

use crate::{
    ColorDepth, DispChange, DisplayMode, DriverFields, ModeChanger, ModeFields, ModeIndex, ModeSource, RefreshRate,
    Resolution,
};

const FIELD_FLAGS: [(ModeFields, co::DM); 7] = [
    (ModeFields::POSITION, co::DM::POSITION),
    (ModeFields::DISPLAY_ORIENTATION, co::DM::DISPLAYORIENTATION),
    (ModeFields::DISPLAY_FIXED_OUTPUT, co::DM::DISPLAYFIXEDOUTPUT),
    (ModeFields::BITS_PER_PEL, co::DM::BITSPERPEL),
    (ModeFields::PELS_WIDTH, co::DM::PELSWIDTH),
    (ModeFields::PELS_HEIGHT, co::DM::PELSHEIGHT),
    (ModeFields::DISPLAY_FREQUENCY, co::DM::DISPLAYFREQUENCY),
];

/// Converts between `winsafe::DEVMODE` and [`DisplayMode`]
trait DisplayModeConversion {
    fn to_display_mode(&self) -> DisplayMode;
    fn from_display_mode(mode: &DisplayMode) -> Self;
}

impl DisplayModeConversion for DEVMODE {
    fn to_display_mode(&self) -> DisplayMode {
        let fields = FIELD_FLAGS
            .iter()
            .filter(|(_, dm)| self.dmFields.has(*dm))
            .fold(ModeFields::empty(), |acc, (field, _)| acc | *field);

        // SAFETY: DEVMODE is a plain #[repr(C)] struct without pointers
        let bytes = unsafe { slice::from_raw_parts((self as *const DEVMODE).cast::<u8>(), mem::size_of::<DEVMODE>()) };

        DisplayMode {
            resolution: Resolution::new(self.dmPelsWidth, self.dmPelsHeight),
            color_depth: ColorDepth(self.dmBitsPerPel),
            refresh_rate: RefreshRate(self.dmDisplayFrequency),
            fields,
            driver: DriverFields::new(bytes.to_vec()),
        }
    }

    fn from_display_mode(mode: &DisplayMode) -> Self {
        let mut devmode = DEVMODE::default();

        let driver = mode.driver.as_bytes();
        if driver.len() == mem::size_of::<DEVMODE>() {
            // SAFETY: the bytes were taken from a DEVMODE of the same layout by `to_display_mode`
            unsafe {
                ptr::copy_nonoverlapping(driver.as_ptr(), (&mut devmode as *mut DEVMODE).cast::<u8>(), driver.len());
            }
        } else if !mode.driver.is_empty() {
            warn!("Ignoring {} bytes of driver data that do not fit a DEVMODE", driver.len());
        }

        devmode.dmPelsWidth = mode.resolution.width;
        devmode.dmPelsHeight = mode.resolution.height;
        devmode.dmBitsPerPel = mode.color_depth.0;
        devmode.dmDisplayFrequency = mode.refresh_rate.0;
        devmode.dmFields = co::DM::default();
        for (field, dm) in FIELD_FLAGS {
            if mode.fields.contains(field) {
                devmode.dmFields |= dm;
            }
        }
        devmode
    }
}

/// The default (primary) display device
#[derive(Debug, Default, Copy, Clone)]
pub struct PrimaryDisplay;

impl PrimaryDisplay {
    pub fn new() -> Self {
        Self
    }

    fn change(&self, mode: &DisplayMode, flags: co::CDS) -> DispChange {
        let mut devmode = DEVMODE::from_display_mode(mode);
        status_of(winsafe::ChangeDisplaySettingsEx(None, Some(&mut devmode), flags))
    }
}

/// winsafe splits the return code on its sign; the raw value decides the outcome either way.
fn status_of(result: Result<co::DISP_CHANGE, co::DISP_CHANGE>) -> DispChange {
    match result {
        Ok(status) | Err(status) => DispChange::from_raw(status.raw()),
    }
}

impl ModeSource for PrimaryDisplay {
    fn query_mode(&self, index: ModeIndex) -> Option<DisplayMode> {
        let mode_num = match index {
            ModeIndex::Current => GmidxEnum::Enum(co::ENUM_SETTINGS::CURRENT),
            ModeIndex::Enumerated(i) => GmidxEnum::Gmidx(i),
        };

        let mut devmode = DEVMODE::default();
        match winsafe::EnumDisplaySettings(None, mode_num, &mut devmode) {
            Ok(()) => Some(devmode.to_display_mode()),
            Err(err) => {
                trace!("EnumDisplaySettings({:?}) failed: {}", index, err);
                None
            }
        }
    }
}

impl ModeChanger for PrimaryDisplay {
    fn test(&mut self, mode: &DisplayMode) -> DispChange {
        self.change(mode, co::CDS::TEST)
    }

    fn commit(&mut self, mode: &DisplayMode) -> DispChange {
        self.change(mode, co::CDS::UPDATEREGISTRY)
    }
}

#[cfg(test)]
mod tests {
    use winsafe::POINT;

    use super::*;
    use crate::candidate_mode;

    fn active_devmode() -> DEVMODE {
        let mut devmode = DEVMODE::default();
        devmode.set_dmPosition(POINT { x: -1920, y: 0 });
        devmode.set_dmDisplayOrientation(co::DMDO::D90);
        devmode.dmPelsWidth = 1920;
        devmode.dmPelsHeight = 1080;
        devmode.dmBitsPerPel = 32;
        devmode.dmDisplayFrequency = 60;
        devmode.dmFields = co::DM::POSITION | co::DM::DISPLAYORIENTATION | co::DM::PELSWIDTH;
        devmode
    }

    #[test]
    fn reads_semantic_fields_and_flags() {
        let mode = active_devmode().to_display_mode();

        assert_eq!(mode.resolution, Resolution::new(1920, 1080));
        assert_eq!(mode.color_depth, ColorDepth(32));
        assert_eq!(mode.refresh_rate, RefreshRate(60));
        assert_eq!(
            mode.fields,
            ModeFields::POSITION | ModeFields::DISPLAY_ORIENTATION | ModeFields::PELS_WIDTH
        );
        assert_eq!(mode.driver.as_bytes().len(), mem::size_of::<DEVMODE>());
    }

    #[test]
    fn candidate_differs_from_active_mode_only_in_frequency_and_flags() {
        let active = active_devmode();
        let current = active.to_display_mode();
        let mut rebuilt = DEVMODE::from_display_mode(&candidate_mode(&current, RefreshRate(144)));

        assert_eq!(rebuilt.dmDisplayFrequency, 144);
        for flag in [co::DM::PELSWIDTH, co::DM::PELSHEIGHT, co::DM::BITSPERPEL, co::DM::DISPLAYFREQUENCY] {
            assert!(rebuilt.dmFields.has(flag));
        }
        assert!(!rebuilt.dmFields.has(co::DM::POSITION));
        assert!(rebuilt.dmPosition() == POINT { x: -1920, y: 0 });
        assert!(rebuilt.dmDisplayOrientation() == co::DMDO::D90);

        rebuilt.dmDisplayFrequency = active.dmDisplayFrequency;
        rebuilt.dmFields = active.dmFields;
        assert_eq!(rebuilt.to_display_mode().driver, current.driver);
    }

    #[test]
    fn status_keeps_raw_codes_from_both_sides() {
        assert_eq!(status_of(Ok(co::DISP_CHANGE::SUCCESSFUL)), DispChange::Successful);
        assert_eq!(status_of(Ok(co::DISP_CHANGE::RESTART)), DispChange::Restart);
        assert_eq!(status_of(Err(co::DISP_CHANGE::BADMODE)), DispChange::BadMode);
        assert_eq!(status_of(Err(co::DISP_CHANGE::FAILED)), DispChange::Other(DispChange::FAILED));
    }
}
