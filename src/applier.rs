use core::fmt;

use log::{debug, info, warn};

use crate::{DisplayMode, ModeFields, RefreshError, RefreshRate, RefreshResult};

/// Status code returned by the OS for a single mode change call
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DispChange {
    Successful,
    Restart,
    BadMode,
    Other(i32),
}

impl DispChange {
    pub const SUCCESSFUL: i32 = 0;
    pub const RESTART: i32 = 1;
    pub const FAILED: i32 = -1;
    pub const BADMODE: i32 = -2;
    pub const NOTUPDATED: i32 = -3;
    pub const BADFLAGS: i32 = -4;
    pub const BADPARAM: i32 = -5;
    pub const BADDUALVIEW: i32 = -6;

    pub fn from_raw(code: i32) -> Self {
        match code {
            Self::SUCCESSFUL => DispChange::Successful,
            Self::RESTART => DispChange::Restart,
            Self::BADMODE => DispChange::BadMode,
            other => DispChange::Other(other),
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            DispChange::Successful => Self::SUCCESSFUL,
            DispChange::Restart => Self::RESTART,
            DispChange::BadMode => Self::BADMODE,
            DispChange::Other(code) => code,
        }
    }
}

impl fmt::Display for DispChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.raw() {
            Self::SUCCESSFUL => "SUCCESSFUL",
            Self::RESTART => "RESTART",
            Self::FAILED => "FAILED",
            Self::BADMODE => "BADMODE",
            Self::NOTUPDATED => "NOTUPDATED",
            Self::BADFLAGS => "BADFLAGS",
            Self::BADPARAM => "BADPARAM",
            Self::BADDUALVIEW => "BADDUALVIEW",
            code => return write!(f, "DISP_CHANGE({})", code),
        };
        write!(f, "DISP_CHANGE_{}", name)
    }
}

/// Write access to the display configuration, split into the two OS calls
pub trait ModeChanger {
    /// Asks the OS whether `mode` would be accepted. Must not change anything.
    fn test(&mut self, mode: &DisplayMode) -> DispChange;
    /// Switches to `mode` and saves it as the new configuration.
    fn commit(&mut self, mode: &DisplayMode) -> DispChange;
}

/// Derives the mode to submit from the active one: only the frequency and the field mask change.
pub fn candidate_mode(current: &DisplayMode, refresh_rate: RefreshRate) -> DisplayMode {
    let mut candidate = current.clone();
    candidate.refresh_rate = refresh_rate;
    candidate.fields = ModeFields::REFRESH_CHANGE;
    candidate
}

/// Successful result of applying a refresh rate
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ApplyOutcome {
    /// The new refresh rate is active
    Applied(RefreshRate),
    /// The new refresh rate was saved and takes effect after a restart
    RestartRequired(RefreshRate),
}

impl ApplyOutcome {
    pub fn refresh_rate(self) -> RefreshRate {
        match self {
            ApplyOutcome::Applied(refresh_rate) | ApplyOutcome::RestartRequired(refresh_rate) => refresh_rate,
        }
    }
}

/// Why the test phase refused a mode
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    BadMode,
    TestFailed(i32),
}

/// How a commit went through
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Commit {
    Immediate,
    Pending,
}

/// States of the test-then-commit protocol
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApplyState {
    Idle,
    Testing,
    Rejected(Rejection),
    Validated,
    Committing,
    Committed(Commit),
    CommitFailed(i32),
}

impl ApplyState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplyState::Rejected(_) | ApplyState::Committed(_) | ApplyState::CommitFailed(_)
        )
    }

    fn after_test(status: DispChange) -> ApplyState {
        match status {
            DispChange::Successful => ApplyState::Validated,
            DispChange::BadMode => ApplyState::Rejected(Rejection::BadMode),
            other => ApplyState::Rejected(Rejection::TestFailed(other.raw())),
        }
    }

    fn after_commit(status: DispChange) -> ApplyState {
        match status {
            DispChange::Successful => ApplyState::Committed(Commit::Immediate),
            DispChange::Restart => ApplyState::Committed(Commit::Pending),
            other => ApplyState::CommitFailed(other.raw()),
        }
    }
}

/// Drives one candidate mode through test and commit.
///
/// The candidate is built once and the very same value is handed to both OS calls.
pub struct TwoPhaseApply<'a, C: ?Sized> {
    changer: &'a mut C,
    candidate: DisplayMode,
    state: ApplyState,
}

impl<'a, C: ModeChanger + ?Sized> TwoPhaseApply<'a, C> {
    pub fn new(changer: &'a mut C, current: &DisplayMode, refresh_rate: RefreshRate) -> Self {
        Self {
            changer,
            candidate: candidate_mode(current, refresh_rate),
            state: ApplyState::Idle,
        }
    }

    pub fn state(&self) -> ApplyState {
        self.state
    }

    pub fn candidate(&self) -> &DisplayMode {
        &self.candidate
    }

    /// Performs one transition. Terminal states are left untouched.
    pub fn step(&mut self) -> ApplyState {
        self.state = match self.state {
            ApplyState::Idle => ApplyState::Testing,
            ApplyState::Testing => {
                let status = self.changer.test(&self.candidate);
                debug!("Test of {} returned {}", self.candidate, status);
                ApplyState::after_test(status)
            }
            ApplyState::Validated => ApplyState::Committing,
            ApplyState::Committing => {
                let status = self.changer.commit(&self.candidate);
                debug!("Commit of {} returned {}", self.candidate, status);
                ApplyState::after_commit(status)
            }
            terminal => terminal,
        };
        self.state
    }

    /// Steps through the test call. Stops at `Validated` when starting from `Idle`.
    fn test_phase(&mut self) -> Result<(), Rejection> {
        loop {
            match self.step() {
                ApplyState::Idle | ApplyState::Testing => {}
                ApplyState::Rejected(rejection) => return Err(rejection),
                _ => return Ok(()),
            }
        }
    }

    /// Steps through the commit call. Only reached once the test phase passed.
    fn commit_phase(&mut self) -> Result<Commit, i32> {
        loop {
            match self.step() {
                ApplyState::Committed(commit) => return Ok(commit),
                ApplyState::CommitFailed(code) => return Err(code),
                _ => {}
            }
        }
    }

    /// Runs test and, if it passes, commit.
    pub fn run(mut self) -> RefreshResult<ApplyOutcome> {
        let refresh_rate = self.candidate.refresh_rate;
        self.test_phase()?;
        match self.commit_phase() {
            Ok(Commit::Immediate) => {
                info!("Refresh rate changed to {}", refresh_rate);
                Ok(ApplyOutcome::Applied(refresh_rate))
            }
            Ok(Commit::Pending) => {
                info!("Refresh rate {} saved, restart required", refresh_rate);
                Ok(ApplyOutcome::RestartRequired(refresh_rate))
            }
            Err(code) => {
                warn!("Applying {} failed with {}", refresh_rate, DispChange::from_raw(code));
                Err(RefreshError::CommitFailed(code))
            }
        }
    }

    /// Runs the test phase only.
    pub fn validate(mut self) -> RefreshResult {
        self.test_phase()?;
        Ok(())
    }
}

impl From<Rejection> for RefreshError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::BadMode => {
                warn!("Driver rejected the mode");
                RefreshError::TestRejectedBadMode
            }
            Rejection::TestFailed(code) => {
                warn!("Test of mode failed with {}", DispChange::from_raw(code));
                RefreshError::TestFailed(code)
            }
        }
    }
}

/// Tests and commits `refresh_rate` on top of `current`.
pub fn apply_refresh_rate<C: ModeChanger + ?Sized>(
    changer: &mut C,
    current: &DisplayMode,
    refresh_rate: RefreshRate,
) -> RefreshResult<ApplyOutcome> {
    TwoPhaseApply::new(changer, current, refresh_rate).run()
}

/// Only asks the OS whether `refresh_rate` would be accepted.
pub fn validate_refresh_rate<C: ModeChanger + ?Sized>(
    changer: &mut C,
    current: &DisplayMode,
    refresh_rate: RefreshRate,
) -> RefreshResult {
    TwoPhaseApply::new(changer, current, refresh_rate).validate()
}
