//! Random generation of codes that avoid an existing set.

use std::{collections::VecDeque, num::NonZeroUsize};

use rand::{Rng, rngs::ThreadRng};

use super::{
    code::{Code, GROUP_RANGE},
    corpus::ExistingCodes,
};

/// The default number of candidates drawn before giving up.
pub const DEFAULT_MAX_ATTEMPTS: NonZeroUsize = NonZeroUsize::new(1000).unwrap();

/// A source of code groups.
///
/// Every value returned must lie in [`GROUP_RANGE`]. Anything else is a bug
/// in the implementation.
pub trait RandomSource {
    /// Draws one group.
    fn draw_group(&mut self) -> u16;
}

/// Uniform draws from the thread-local generator.
#[derive(Debug, Default)]
pub struct ThreadRandom(ThreadRng);

impl ThreadRandom {
    /// Creates a source backed by [`rand::rng`].
    #[must_use]
    pub fn new() -> Self {
        Self(rand::rng())
    }
}

impl RandomSource for ThreadRandom {
    fn draw_group(&mut self) -> u16 {
        self.0.random_range(GROUP_RANGE)
    }
}

/// A source that replays a fixed script of groups, then cycles.
///
/// Mostly useful for reproducing a particular sequence of candidates.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    groups: VecDeque<u16>,
    draws: usize,
}

impl ScriptedRandom {
    /// Creates a source from a list of `(first, second)` candidates.
    ///
    /// # Panics
    ///
    /// Panics if the script is empty or a group lies outside
    /// [`GROUP_RANGE`].
    #[must_use]
    pub fn new(candidates: &[(u16, u16)]) -> Self {
        assert!(!candidates.is_empty(), "script must not be empty");
        let groups: VecDeque<u16> = candidates.iter().flat_map(|&(a, b)| [a, b]).collect();
        assert!(
            groups.iter().all(|g| GROUP_RANGE.contains(g)),
            "scripted groups must be between 100 and 999"
        );
        Self { groups, draws: 0 }
    }

    /// Returns the number of groups drawn so far.
    #[must_use]
    pub const fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for ScriptedRandom {
    fn draw_group(&mut self) -> u16 {
        self.draws += 1;
        let group = self.groups.pop_front().unwrap_or(*GROUP_RANGE.start());
        self.groups.push_back(group);
        group
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn draw_group(&mut self) -> u16 {
        (**self).draw_group()
    }
}

/// An endless stream of candidate codes.
#[derive(Debug)]
pub struct Candidates<R> {
    source: R,
}

impl<R: RandomSource> Candidates<R> {
    /// Creates a stream drawing from `source`.
    pub const fn new(source: R) -> Self {
        Self { source }
    }
}

impl<R: RandomSource> Iterator for Candidates<R> {
    type Item = Code;

    /// Draws the next candidate.
    ///
    /// A source that breaks the [`RandomSource`] contract ends the stream.
    fn next(&mut self) -> Option<Self::Item> {
        let first = self.source.draw_group();
        let second = self.source.draw_group();
        debug_assert!(
            GROUP_RANGE.contains(&first) && GROUP_RANGE.contains(&second),
            "random source produced an out-of-range group: {first}-{second}"
        );
        Code::from_groups(first, second).ok()
    }
}

/// No unused code was found within the attempt bound.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unable to generate unique code after {attempts} attempts")]
pub struct ExhaustionError {
    /// The number of candidates drawn and rejected.
    pub attempts: usize,
}

/// Draws candidates until one is not in `existing`.
///
/// At most `max_attempts` candidates are drawn.
///
/// # Errors
///
/// Returns an [`ExhaustionError`] if every one of the `max_attempts`
/// candidates was already in use.
pub fn generate<R: RandomSource>(
    existing: &ExistingCodes,
    source: R,
    max_attempts: NonZeroUsize,
) -> Result<Code, ExhaustionError> {
    let mut attempts = 0;
    for candidate in Candidates::new(source).take(max_attempts.get()) {
        attempts += 1;
        if !existing.contains(&candidate.to_string()) {
            tracing::debug!(%candidate, attempts, "generated code");
            return Ok(candidate);
        }
        tracing::trace!(%candidate, "candidate already in use");
    }
    Err(ExhaustionError { attempts })
}
