//! Roster scraping of the Collegiate StarLeague team pages.

mod roster;
mod team_ref;

pub use roster::{Roster, RosterEntry, RosterScraper, RosterSelectors};
pub use team_ref::TeamRef;
