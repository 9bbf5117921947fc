use std::str::FromStr;
use std::time::Duration;

use derive_setters::Setters;
use url::Url;

use crate::ConfigurationError;

pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "http://localhost:3000/api/graphql";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra pause applied after every `every`-th record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleTier {
    pub every: usize,
    pub pause: Duration,
}

impl ThrottleTier {
    pub fn new(every: usize, pause: Duration) -> Self {
        Self { every, pause }
    }
}

/// Parses `EVERY=MILLIS`, e.g. `100=3000`.
impl FromStr for ThrottleTier {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ConfigurationError::InvalidSchedule(format!(
                "expected EVERY=MILLIS, got '{value}'"
            ))
        };
        let (every, millis) = value.split_once('=').ok_or_else(invalid)?;
        let every = every.trim().parse::<usize>().map_err(|_| invalid())?;
        let millis = millis.trim().parse::<u64>().map_err(|_| invalid())?;
        Ok(Self::new(every, Duration::from_millis(millis)))
    }
}

/// Tiered pause schedule. The pause after record `n` is the longest tier
/// pause whose period divides `n`, or the base pause when none does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleSchedule {
    base: Duration,
    tiers: Vec<ThrottleTier>,
}

impl ThrottleSchedule {
    /// Tiers are sorted by period. Longer periods may not pause for less than
    /// shorter ones, and no tier may pause for less than the base.
    pub fn new(base: Duration, mut tiers: Vec<ThrottleTier>) -> Result<Self, ConfigurationError> {
        tiers.sort_by_key(|tier| tier.every);

        if let Some(tier) = tiers.iter().find(|tier| tier.every == 0) {
            return Err(ConfigurationError::InvalidSchedule(format!(
                "tier period must be positive, got {}",
                tier.every
            )));
        }

        let mut previous: Option<&ThrottleTier> = None;
        for tier in &tiers {
            let floor = previous.map_or(base, |previous| previous.pause);
            if tier.pause < floor {
                let shorter = match previous {
                    Some(previous) => format!("the pause every {} records", previous.every),
                    None => "the base pause".to_string(),
                };
                return Err(ConfigurationError::InvalidSchedule(format!(
                    "pause every {} records ({} ms) is shorter than {} ({} ms)",
                    tier.every,
                    tier.pause.as_millis(),
                    shorter,
                    floor.as_millis()
                )));
            }
            previous = Some(tier);
        }

        Ok(Self { base, tiers })
    }

    /// A schedule that never waits.
    pub fn disabled() -> Self {
        Self { base: Duration::ZERO, tiers: Vec::new() }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn tiers(&self) -> &[ThrottleTier] {
        &self.tiers
    }

    /// Pause owed once `completed` records have been handled.
    pub fn pause_after(&self, completed: usize) -> Duration {
        if completed == 0 {
            return Duration::ZERO;
        }
        self.tiers
            .iter()
            .filter(|tier| completed % tier.every == 0)
            .map(|tier| tier.pause)
            .max()
            .unwrap_or(self.base)
    }

    /// Pause before dispatching record `position` (1-based). The first record
    /// never waits.
    pub fn pause_before(&self, position: usize) -> Duration {
        self.pause_since(position.saturating_sub(1), position)
    }

    /// Pause before dispatching record `position` when the last dispatch was
    /// record `previous`, or 0 when nothing went out yet. Milestones crossed by
    /// skipped rows in between still owe their pause.
    pub fn pause_since(&self, previous: usize, position: usize) -> Duration {
        if previous == 0 {
            return Duration::ZERO;
        }
        (previous..position)
            .map(|completed| self.pause_after(completed))
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for ThrottleSchedule {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            tiers: vec![
                ThrottleTier::new(10, Duration::from_millis(500)),
                ThrottleTier::new(100, Duration::from_secs(3)),
            ],
        }
    }
}

/// Everything a transfer run needs to know about its target.
#[derive(Debug, Clone, Setters)]
#[setters(into)]
pub struct TransferConfig {
    /// GraphQL endpoint receiving one mutation per record.
    pub endpoint: Url,
    /// Upper bound for a single call.
    pub timeout: Duration,
    pub throttle: ThrottleSchedule,
    /// Expected project of created objects; a mismatch is only logged.
    #[setters(strip_option)]
    pub project_id: Option<String>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_GRAPHQL_ENDPOINT).expect("default endpoint is a valid URL"),
            timeout: DEFAULT_TIMEOUT,
            throttle: ThrottleSchedule::default(),
            project_id: None,
        }
    }
}

/// Parses an endpoint, mapping failures into configuration errors.
pub fn parse_endpoint(url: &str) -> Result<Url, ConfigurationError> {
    Url::parse(url).map_err(|e| ConfigurationError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
