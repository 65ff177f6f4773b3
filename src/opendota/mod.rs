//! Client of the OpenDota stats API.

mod client;
pub mod heroes;
pub mod types;

pub use client::OpenDotaClient;
pub use heroes::HeroTable;
pub use types::{HeroFilter, HeroPlayRecord, PlayerDto};
