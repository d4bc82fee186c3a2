use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter};

/// Ordered threat severity reported by the upstream threat assessment.
#[derive(
    Debug, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, EnumIter, Serialize, Deserialize,
)]
pub enum ThreatLevel {
    #[default]
    Green,
    Yellow,
    Orange,
    Red,
    Omega,
}

/// Behavioural program selected from the current threat level.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum MissionMode {
    #[strum(serialize = "PATROL")]
    Patrol,
    #[strum(serialize = "ENHANCED_WATCH")]
    EnhancedWatch,
    #[strum(serialize = "DEFENSIVE")]
    Defensive,
    #[strum(serialize = "ACTIVE_PROTECTION")]
    ActiveProtection,
    #[strum(serialize = "OMEGA_PROTOCOL")]
    OmegaProtocol,
}

/// Guard geometry and speed ceiling applied at a given threat level.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct ThreatProfile {
    /// Radius of the protective orbit around the guard centre in meters.
    pub orbit_radius_m: f64,
    /// Approach speed ceiling in m/s.
    pub max_speed_mps: f64,
    /// Guard altitude above ground in meters.
    pub guard_altitude_m: f64,
}

impl ThreatLevel {
    pub fn name(self) -> &'static str {
        match self {
            ThreatLevel::Green => "GREEN",
            ThreatLevel::Yellow => "YELLOW",
            ThreatLevel::Orange => "ORANGE",
            ThreatLevel::Red => "RED",
            ThreatLevel::Omega => "OMEGA",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ThreatLevel::Green => "All systems nominal. Guardian patrol active.",
            ThreatLevel::Yellow => "Anomaly detected. Heightened awareness engaged.",
            ThreatLevel::Orange => "Moderate threat identified. Defensive positioning.",
            ThreatLevel::Red => "High threat confirmed. Close protection engaged.",
            ThreatLevel::Omega => "Critical threat. Maximum protection authorized.",
        }
    }

    /// Position of the level on the GREEN..OMEGA scale, starting at 0.
    pub fn index(self) -> u8 {
        match self {
            ThreatLevel::Green => 0,
            ThreatLevel::Yellow => 1,
            ThreatLevel::Orange => 2,
            ThreatLevel::Red => 3,
            ThreatLevel::Omega => 4,
        }
    }

    pub fn profile(self) -> ThreatProfile { THREAT_PROFILE_LOOKUP[&self] }

    /// Parses the console vocabulary used by operators, e.g. `"omega"` or `"4"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "green" | "0" => Some(ThreatLevel::Green),
            "yellow" | "1" => Some(ThreatLevel::Yellow),
            "orange" | "2" => Some(ThreatLevel::Orange),
            "red" | "3" => Some(ThreatLevel::Red),
            "omega" | "4" => Some(ThreatLevel::Omega),
            _ => None,
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

impl From<ThreatLevel> for MissionMode {
    fn from(value: ThreatLevel) -> Self {
        match value {
            ThreatLevel::Green => MissionMode::Patrol,
            ThreatLevel::Yellow => MissionMode::EnhancedWatch,
            ThreatLevel::Orange => MissionMode::Defensive,
            ThreatLevel::Red => MissionMode::ActiveProtection,
            ThreatLevel::Omega => MissionMode::OmegaProtocol,
        }
    }
}

const GUARD_BASE_ALTITUDE: f64 = 10.0;
const GUARD_ALTITUDE_STEP: f64 = 5.0;

static THREAT_PROFILE_LOOKUP: LazyLock<HashMap<ThreatLevel, ThreatProfile>> =
    LazyLock::new(|| {
        let mut lookup = HashMap::new();
        let profiles = vec![
            (ThreatLevel::Green, 15.0, 10.0),
            (ThreatLevel::Yellow, 12.0, 12.0),
            (ThreatLevel::Orange, 8.0, 15.0),
            (ThreatLevel::Red, 5.0, 20.0),
            (ThreatLevel::Omega, 3.0, 25.0),
        ];

        for (level, radius, speed) in profiles {
            let guard_altitude_m =
                GUARD_BASE_ALTITUDE + f64::from(level.index()) * GUARD_ALTITUDE_STEP;
            lookup.insert(level, ThreatProfile {
                orbit_radius_m: radius,
                max_speed_mps: speed,
                guard_altitude_m,
            });
        }
        lookup
    });
