use serde::{Deserialize, Serialize};

use crate::csl::TeamRef;

/// What a chat user looked up last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub last_team: Option<TeamRef>,
    #[serde(default)]
    pub last_players: Option<Vec<u32>>,
}

impl SessionRecord {
    pub const LAST_TEAM: &'static str = "last_team";
    pub const LAST_PLAYERS: &'static str = "last_players";
}

/// Names a player has been seen under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Name on the roster site.
    #[serde(default)]
    pub site_name: Option<String>,
    /// Persona name on the stats platform.
    #[serde(default)]
    pub stats_name: Option<String>,
}

impl ProfileRecord {
    pub const SITE_NAME: &'static str = "site_name";
    pub const STATS_NAME: &'static str = "stats_name";

    /// Best known name, roster name first.
    pub fn display_name(&self) -> Option<&str> {
        self.site_name.as_deref().or(self.stats_name.as_deref())
    }
}
