//! Field selections for the individual exports.

use crate::{SowfaError, SowfaResult};

/// Columns written to the initial-condition profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcFields {
    pub xmom: String,
    pub ymom: String,
    pub temp: String,
}

impl Default for IcFields {
    fn default() -> Self {
        Self {
            xmom: "u".to_string(),
            ymom: "v".to_string(),
            temp: "theta".to_string(),
        }
    }
}

impl IcFields {
    pub fn names(&self) -> [&str; 3] {
        [&self.xmom, &self.ymom, &self.temp]
    }
}

/// The three momentum components, always given together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Momentum {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl Momentum {
    pub fn new(x: impl Into<String>, y: impl Into<String>, z: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    pub fn names(&self) -> [&str; 3] {
        [&self.x, &self.y, &self.z]
    }
}

/// Loosely specified time-height request, as read from a job file.
///
/// Momentum components are coupled in the solver's forcing term, so either
/// none or all three must be named. Temperature is independent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeHeightFields {
    pub xmom: Option<String>,
    pub ymom: Option<String>,
    pub zmom: Option<String>,
    pub temp: Option<String>,
}

impl TimeHeightFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_momentum(mut self, momentum: Momentum) -> Self {
        self.xmom = Some(momentum.x);
        self.ymom = Some(momentum.y);
        self.zmom = Some(momentum.z);
        self
    }

    pub fn with_temperature(mut self, temp: impl Into<String>) -> Self {
        self.temp = Some(temp.into());
        self
    }

    /// The momentum triple, `None` when no component is named.
    pub fn momentum(&self) -> SowfaResult<Option<Momentum>> {
        match (&self.xmom, &self.ymom, &self.zmom) {
            (None, None, None) => Ok(None),
            (Some(x), Some(y), Some(z)) => Ok(Some(Momentum::new(x, y, z))),
            (x, y, z) => {
                let missing: Vec<&str> = [("xmom", x), ("ymom", y), ("zmom", z)]
                    .into_iter()
                    .filter_map(|(label, name)| name.is_none().then_some(label))
                    .collect();
                Err(SowfaError::IncompleteMomentumSpec {
                    missing: missing.join(", "),
                })
            }
        }
    }

    pub fn temperature(&self) -> Option<&str> {
        self.temp.as_deref()
    }
}
