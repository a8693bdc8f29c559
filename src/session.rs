use log::info;

use crate::{
    applier, current_mode, enumerate_modes, resolve_target, select_candidate_frequencies, ApplyOutcome,
    CandidateSet, DisplayMode, ModeChanger, ModeSource, RefreshRate, RefreshResult, Target,
};

/// Result of a full query/select/apply run
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Outcome {
    /// Nothing was requested explicitly and there is no refresh rate to pick from
    NoAlternatives,
    Applied(ApplyOutcome),
}

/// Snapshot of the default display: its active mode and the refresh rates it could switch to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RefreshSession {
    pub current: DisplayMode,
    pub candidates: CandidateSet,
}

impl RefreshSession {
    /// Reads the active mode and collects the candidates for its resolution and color depth.
    pub fn open<S: ModeSource + ?Sized>(source: &S) -> RefreshResult<Self> {
        let current = current_mode(source)?;
        let candidates = select_candidate_frequencies(enumerate_modes(source), current.resolution, current.color_depth);
        info!("{} refresh rate(s) available at {}", candidates.len(), current);
        Ok(Self { current, candidates })
    }

    pub fn resolve(&self, target: &Target) -> RefreshResult<Option<RefreshRate>> {
        resolve_target(&self.candidates, target)
    }

    pub fn apply<C: ModeChanger + ?Sized>(&self, changer: &mut C, refresh_rate: RefreshRate) -> RefreshResult<ApplyOutcome> {
        applier::apply_refresh_rate(changer, &self.current, refresh_rate)
    }

    pub fn validate<C: ModeChanger + ?Sized>(&self, changer: &mut C, refresh_rate: RefreshRate) -> RefreshResult {
        applier::validate_refresh_rate(changer, &self.current, refresh_rate)
    }
}

/// Runs the whole pipeline against one display.
pub fn change_refresh_rate<D>(display: &mut D, target: &Target) -> RefreshResult<Outcome>
where
    D: ModeSource + ModeChanger + ?Sized,
{
    let session = RefreshSession::open(&*display)?;
    match session.resolve(target)? {
        Some(refresh_rate) => session.apply(display, refresh_rate).map(Outcome::Applied),
        None => {
            info!("No alternative refresh rates at {}", session.current);
            Ok(Outcome::NoAlternatives)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDisplay;
    use crate::{ColorDepth, DispChange, RefreshError, Resolution};

    fn mode(width: u32, height: u32, bpp: u32, hz: u32) -> DisplayMode {
        DisplayMode::new(Resolution::new(width, height), ColorDepth(bpp), RefreshRate(hz))
    }

    fn full_hd_display() -> MockDisplay {
        MockDisplay::new(
            Some(mode(1920, 1080, 32, 60)),
            vec![
                mode(1920, 1080, 32, 60),
                mode(1920, 1080, 32, 75),
                mode(1920, 1080, 32, 120),
                mode(1920, 1080, 24, 60),
                mode(1280, 720, 32, 144),
            ],
        )
    }

    #[test_log::test]
    fn session_lists_candidates_for_current_geometry() {
        let display = full_hd_display();
        let session = RefreshSession::open(&display).unwrap();

        assert_eq!(session.current, mode(1920, 1080, 32, 60));
        assert_eq!(
            session.candidates.as_slice(),
            &[RefreshRate(120), RefreshRate(75), RefreshRate(60)]
        );
    }

    #[test_log::test]
    fn query_failure_aborts_before_enumeration() {
        let mut display = MockDisplay::new(None, vec![mode(1920, 1080, 32, 60)]);

        assert_eq!(
            change_refresh_rate(&mut display, &Target::Highest),
            Err(RefreshError::QueryFailure)
        );
        assert_eq!(display.enumerated_queries(), 0);
        assert!(display.calls().is_empty());
    }

    #[test_log::test]
    fn explicit_frequency_is_applied() {
        let mut display = full_hd_display();
        let outcome = change_refresh_rate(&mut display, &Target::Frequency(RefreshRate(75)));

        assert_eq!(outcome, Ok(Outcome::Applied(ApplyOutcome::Applied(RefreshRate(75)))));
        assert_eq!(display.test_calls(), 1);
        assert_eq!(display.commit_calls(), 1);
    }

    #[test_log::test]
    fn unavailable_frequency_makes_no_change_call() {
        let mut display = full_hd_display();
        let outcome = change_refresh_rate(&mut display, &Target::Frequency(RefreshRate(144)));

        assert_eq!(outcome, Err(RefreshError::NotAvailable(RefreshRate(144))));
        assert!(display.calls().is_empty());
    }

    #[test_log::test]
    fn invalid_menu_choice_makes_no_change_call() {
        let mut display = full_hd_display();
        let outcome = change_refresh_rate(&mut display, &Target::MenuChoice("9".to_string()));

        assert_eq!(outcome, Err(RefreshError::InvalidSelection("9".to_string())));
        assert!(display.calls().is_empty());
    }

    #[test_log::test]
    fn empty_candidate_set_is_no_alternatives() {
        let mut display = MockDisplay::new(
            Some(mode(2560, 1440, 32, 165)),
            vec![mode(1920, 1080, 32, 60), mode(2560, 1440, 24, 144), mode(2560, 1440, 32, 0)],
        );

        assert_eq!(change_refresh_rate(&mut display, &Target::Highest), Ok(Outcome::NoAlternatives));
        assert_eq!(
            change_refresh_rate(&mut display, &Target::MenuChoice("1".to_string())),
            Ok(Outcome::NoAlternatives)
        );
        assert!(display.calls().is_empty());
    }

    #[test_log::test]
    fn bad_mode_is_reported_without_commit() {
        let mut display = full_hd_display();
        display.respond_with(DispChange::BadMode, DispChange::Successful);

        assert_eq!(
            change_refresh_rate(&mut display, &Target::Highest),
            Err(RefreshError::TestRejectedBadMode)
        );
        assert_eq!(display.test_calls(), 1);
        assert_eq!(display.commit_calls(), 0);
    }

    #[test_log::test]
    fn restart_required_is_success() {
        let mut display = full_hd_display();
        display.respond_with(DispChange::Successful, DispChange::Restart);

        assert_eq!(
            change_refresh_rate(&mut display, &Target::MenuChoice("2".to_string())),
            Ok(Outcome::Applied(ApplyOutcome::RestartRequired(RefreshRate(75))))
        );
    }

    #[test_log::test]
    fn session_validate_only_tests() {
        let mut display = full_hd_display();
        let session = RefreshSession::open(&display).unwrap();

        assert_eq!(session.validate(&mut display, RefreshRate(120)), Ok(()));
        assert_eq!(display.test_calls(), 1);
        assert_eq!(display.commit_calls(), 0);
    }
}
