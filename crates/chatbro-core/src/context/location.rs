use crate::error::Result;
use crate::session::AgentSession;
use serde::{Deserialize, Serialize};

/// Coordinates of the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl UserLocation {
    /// Validated constructor
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        Self {
            latitude,
            longitude,
        }
        .validated()
    }

    /// `Some(self)` if the coordinates are in range and not exactly (0, 0)
    #[must_use]
    pub fn validated(self) -> Option<Self> {
        let in_range = self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude);
        let null_island = self.latitude == 0.0 && self.longitude == 0.0;
        (in_range && !null_island).then_some(self)
    }

    /// System fact injected into the agent's context
    #[must_use]
    pub fn as_fact(&self) -> String {
        format!(
            "The user's location is latitude {}, longitude {}. Use it whenever a location is needed.",
            self.latitude, self.longitude
        )
    }
}

/// Location slot kept in a session's auxiliary state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LocationSlot {
    /// No usable location yet
    #[default]
    Unset,
    /// Location provided by the user
    Set(UserLocation),
}

impl LocationSlot {
    /// Key in `AgentSession::state`
    pub const STATE_KEY: &'static str = "location";

    /// Read the slot; invalid stored values read as unset
    #[must_use]
    pub fn load(session: &AgentSession) -> Self {
        session
            .state_value::<UserLocation>(Self::STATE_KEY)
            .and_then(UserLocation::validated)
            .map_or(Self::Unset, Self::Set)
    }

    /// Write the slot into `session`
    ///
    /// # Errors
    /// Returns error if the location cannot be encoded
    pub fn store(self, session: &mut AgentSession) -> Result<()> {
        match self {
            Self::Set(location) => session.set_state_value(Self::STATE_KEY, &location),
            Self::Unset => {
                session.state.remove(Self::STATE_KEY);
                session.touch();
                Ok(())
            }
        }
    }
}
