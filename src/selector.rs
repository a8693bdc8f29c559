use std::cmp::Reverse;
use std::collections::HashSet;

use log::debug;

use crate::{ColorDepth, DisplayMode, RefreshError, RefreshRate, RefreshResult, Resolution};

/// Distinct refresh rates available at one resolution and color depth, highest first
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CandidateSet(Vec<RefreshRate>);

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, refresh_rate: RefreshRate) -> bool {
        self.0.contains(&refresh_rate)
    }

    /// The most desirable frequency
    pub fn highest(&self) -> Option<RefreshRate> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = RefreshRate> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[RefreshRate] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a RefreshRate;
    type IntoIter = std::slice::Iter<'a, RefreshRate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Collects the refresh rates of all modes matching `resolution` and `color_depth` exactly.
///
/// Modes without a refresh rate are skipped. The result is sorted descending.
pub fn select_candidate_frequencies<I>(modes: I, resolution: Resolution, color_depth: ColorDepth) -> CandidateSet
where
    I: IntoIterator<Item = DisplayMode>,
{
    let unique: HashSet<RefreshRate> = modes
        .into_iter()
        .filter(|mode| mode.same_geometry(resolution, color_depth))
        .map(|mode| mode.refresh_rate)
        .filter(|refresh_rate| refresh_rate.is_specified())
        .collect();

    let mut frequencies: Vec<RefreshRate> = unique.into_iter().collect();
    frequencies.sort_by_key(|refresh_rate| Reverse(refresh_rate.0));

    debug!("Candidates at {}, {}: {:?}", resolution, color_depth, frequencies);
    CandidateSet(frequencies)
}

/// What the caller wants to switch to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A specific frequency, e.g. from a command line flag
    Frequency(RefreshRate),
    /// Raw input for the 1-based menu of candidates
    MenuChoice(String),
    /// The first (highest) candidate
    Highest,
}

/// Resolves `target` against the candidate set.
///
/// Returns `Ok(None)` when nothing was requested explicitly and there is nothing to choose from.
pub fn resolve_target(candidates: &CandidateSet, target: &Target) -> RefreshResult<Option<RefreshRate>> {
    match target {
        Target::Frequency(requested) => {
            if candidates.contains(*requested) {
                Ok(Some(*requested))
            } else {
                Err(RefreshError::NotAvailable(*requested))
            }
        }
        Target::MenuChoice(_) | Target::Highest if candidates.is_empty() => Ok(None),
        Target::MenuChoice(input) => {
            let choice: usize = input
                .trim()
                .parse()
                .map_err(|_| RefreshError::InvalidSelection(input.clone()))?;
            choice
                .checked_sub(1)
                .and_then(|index| candidates.as_slice().get(index))
                .copied()
                .map(Some)
                .ok_or_else(|| RefreshError::InvalidSelection(input.clone()))
        }
        Target::Highest => Ok(candidates.highest()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(width: u32, height: u32, bpp: u32, hz: u32) -> DisplayMode {
        DisplayMode::new(Resolution::new(width, height), ColorDepth(bpp), RefreshRate(hz))
    }

    fn example_modes() -> Vec<DisplayMode> {
        vec![
            mode(1920, 1080, 32, 60),
            mode(1920, 1080, 32, 75),
            mode(1920, 1080, 32, 120),
            mode(1920, 1080, 24, 60),
            mode(1280, 720, 32, 144),
        ]
    }

    fn hz(values: &[u32]) -> Vec<RefreshRate> {
        values.iter().copied().map(RefreshRate).collect()
    }

    fn full_hd() -> CandidateSet {
        select_candidate_frequencies(example_modes(), Resolution::new(1920, 1080), ColorDepth(32))
    }

    #[test]
    fn selects_matching_frequencies_highest_first() {
        assert_eq!(full_hd().as_slice(), hz(&[120, 75, 60]).as_slice());
    }

    #[test]
    fn drops_duplicates_and_unspecified_frequencies() {
        let modes = vec![
            mode(1920, 1080, 32, 60),
            mode(1920, 1080, 32, 0),
            mode(1920, 1080, 32, 144),
            mode(1920, 1080, 32, 60),
            mode(1920, 1080, 32, 144),
            mode(1920, 1080, 32, 59),
        ];
        let candidates = select_candidate_frequencies(modes, Resolution::new(1920, 1080), ColorDepth(32));

        assert_eq!(candidates.as_slice(), hz(&[144, 60, 59]).as_slice());
        assert!(candidates.as_slice().windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn ordering_does_not_depend_on_enumeration_order() {
        let mut reversed = example_modes();
        reversed.reverse();
        let candidates = select_candidate_frequencies(reversed, Resolution::new(1920, 1080), ColorDepth(32));
        assert_eq!(candidates, full_hd());
    }

    #[test]
    fn no_matching_mode_gives_empty_set() {
        let candidates = select_candidate_frequencies(example_modes(), Resolution::new(2560, 1440), ColorDepth(32));
        assert!(candidates.is_empty());
        assert_eq!(candidates.highest(), None);
    }

    #[test]
    fn requested_frequency_resolves_to_itself() {
        let candidates = full_hd();
        for refresh_rate in candidates.iter() {
            assert_eq!(
                resolve_target(&candidates, &Target::Frequency(refresh_rate)),
                Ok(Some(refresh_rate))
            );
        }
    }

    #[test]
    fn absent_frequency_is_not_available() {
        assert_eq!(
            resolve_target(&full_hd(), &Target::Frequency(RefreshRate(144))),
            Err(RefreshError::NotAvailable(RefreshRate(144)))
        );
        assert_eq!(
            resolve_target(&CandidateSet::default(), &Target::Frequency(RefreshRate(60))),
            Err(RefreshError::NotAvailable(RefreshRate(60)))
        );
    }

    #[test]
    fn menu_choice_is_one_based() {
        let candidates = full_hd();
        let choose = |input: &str| resolve_target(&candidates, &Target::MenuChoice(input.to_string()));

        assert_eq!(choose("1"), Ok(Some(RefreshRate(120))));
        assert_eq!(choose(" 3\r\n"), Ok(Some(RefreshRate(60))));
    }

    #[test]
    fn menu_choice_out_of_range_or_garbage_is_invalid() {
        let candidates = full_hd();
        for input in ["0", "4", "-1", "abc", ""] {
            assert_eq!(
                resolve_target(&candidates, &Target::MenuChoice(input.to_string())),
                Err(RefreshError::InvalidSelection(input.to_string())),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn implicit_targets_on_empty_set_mean_no_alternatives() {
        let empty = CandidateSet::default();
        assert_eq!(resolve_target(&empty, &Target::Highest), Ok(None));
        assert_eq!(resolve_target(&empty, &Target::MenuChoice("1".to_string())), Ok(None));
    }

    #[test]
    fn highest_picks_first_candidate() {
        assert_eq!(resolve_target(&full_hd(), &Target::Highest), Ok(Some(RefreshRate(120))));
    }
}
