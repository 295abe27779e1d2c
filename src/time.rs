//! Simulation time.
//!
//! The engine never reads a wall clock: every decision is a pure
//! function of the `SimTime` the host simulator passes in, which keeps
//! `Engine::do_random_access` deterministic for a fixed input trace
//! (see the crate-level determinism contract).
//!
//! [`SimTime`] is a point in simulated time, in whole milliseconds
//! since the start of the simulation. [`Duration`] is a span between
//! two such points. Both mirror the `Instant`/`Duration` pair used
//! elsewhere in this lineage for protocol timing, but count
//! milliseconds rather than microseconds: the engine's own timers
//! (`crdsaBackoffTime`, `slottedAlohaControlRandomizationInterval`)
//! are specified in milliseconds.

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Default)]
pub struct SimTime {
    ms: i64,
}

impl SimTime {
    pub const ZERO: Self = Self { ms: 0 };

    /// Create a new `SimTime` from milliseconds since the epoch.
    pub const fn from_ms(ms: i64) -> Self {
        Self { ms }
    }

    /// Create a new `SimTime` from whole seconds since the epoch.
    pub const fn from_secs(secs: i64) -> Self {
        Self::from_ms(secs * 1000)
    }

    /// Returns the point in time as milliseconds since the epoch.
    pub const fn as_ms(&self) -> i64 {
        self.ms
    }

    /// Returns the point in time as seconds since the epoch, as the
    /// original model (which tracked `Now().GetSeconds()`) did.
    pub const fn as_secs_f64(&self) -> f64 {
        self.ms as f64 / 1000.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Default)]
pub struct Duration(i64);

impl Duration {
    pub const ZERO: Self = Self(0);

    pub const fn from_ms(ms: i64) -> Self {
        Self(ms)
    }

    pub const fn as_ms(&self) -> i64 {
        self.0
    }
}

impl core::ops::Add<Duration> for SimTime {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::from_ms(self.ms + rhs.as_ms())
    }
}

impl core::ops::Sub for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Self::Output {
        Duration::from_ms(self.ms - rhs.ms)
    }
}

impl core::fmt::Display for SimTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

impl core::fmt::Display for Duration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
