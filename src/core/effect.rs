// The unit of work a shave performs, plus stock effects.
use crate::core::error::{Error, ErrorKind};

/// What shaving one yak actually does.
///
/// `yak` is the 1-based index of the yak being attempted, i.e. the count the shaver
/// would report if this attempt succeeds. Returning `Err` leaves the shaver's count
/// untouched.
pub trait Effect {
    fn apply(&mut self, yak: u32) -> Result<(), Error>;
}

impl<F> Effect for F
where
    F: FnMut(u32) -> Result<(), Error>,
{
    fn apply(&mut self, yak: u32) -> Result<(), Error> {
        self(yak)
    }
}

/// Always succeeds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Trim;

impl Effect for Trim {
    fn apply(&mut self, _yak: u32) -> Result<(), Error> {
        Ok(())
    }
}

/// Fails every `period`-th attempt, counting failed attempts too.
///
/// A period of 0 never fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailEvery {
    period: u64,
    attempts: u64,
}

impl FailEvery {
    pub fn new(period: u64) -> Self {
        Self {
            period,
            attempts: 0,
        }
    }

    /// Attempts seen so far, failed ones included.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}

impl Effect for FailEvery {
    fn apply(&mut self, yak: u32) -> Result<(), Error> {
        self.attempts += 1;
        if self.period != 0 && self.attempts % self.period == 0 {
            return Err(Error::new(ErrorKind::OperationFailure)
                .with_message(format!("attempt {} hit the failure period", self.attempts))
                .with_yak(yak));
        }
        Ok(())
    }
}

/// Replays a fixed list of outcomes (`true` = success), cycling when exhausted.
///
/// An empty script always succeeds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Script {
    outcomes: Vec<bool>,
    next: usize,
}

impl Script {
    pub fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            next: 0,
        }
    }

    /// Parses `ok`/`fail` tokens separated by commas, e.g. `ok,ok,fail`.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let mut outcomes = Vec::new();
        for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token {
                "ok" | "1" => outcomes.push(true),
                "fail" | "0" => outcomes.push(false),
                other => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message(format!("unknown shave outcome `{other}`"))
                        .with_hint("Use a comma-separated list of `ok` and `fail`."));
                }
            }
        }
        Ok(Self::new(outcomes))
    }
}

impl Effect for Script {
    fn apply(&mut self, yak: u32) -> Result<(), Error> {
        if self.outcomes.is_empty() {
            return Ok(());
        }
        let outcome = self.outcomes[self.next];
        self.next = (self.next + 1) % self.outcomes.len();
        if outcome {
            Ok(())
        } else {
            Err(Error::new(ErrorKind::OperationFailure)
                .with_message("scripted failure")
                .with_yak(yak))
        }
    }
}
