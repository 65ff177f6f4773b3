//! Conversions between the textual Steam ID (`STEAM_0:<instance>:<account>`)
//! and the numeric account identifiers used by the stats API.

use crate::error::AppError;

/// Individual account bits of a 64-bit Steam ID.
pub const INDIVIDUAL_CONSTANT: u64 = 0x0110_0001_0000_0000;

/// Offset between a 64-bit Steam ID and its 32-bit account id.
pub const CONVERSION_FACTOR: u64 = 76_561_197_960_265_728;

/// Length of the fixed `STEAM_` prefix.
const PREFIX_LEN: usize = 6;

/// Convert a legacy textual Steam ID into a 32-bit account id.
///
/// Only the universe field is ignored; the instance must be `0` or `1` and
/// the final value must fit in 32 bits.
pub fn convert_text_to_32id(steam_id: &str) -> Result<u32, AppError> {
    let malformed = || AppError::Format(steam_id.to_string());

    let body = steam_id.get(PREFIX_LEN..).ok_or_else(malformed)?;
    let mut fields = body.split(':').skip(1);

    let instance: u64 = fields
        .next()
        .and_then(|f| f.trim().parse().ok())
        .ok_or_else(malformed)?;
    let account: u64 = fields
        .next()
        .and_then(|f| f.trim().parse().ok())
        .ok_or_else(malformed)?;

    if instance > 1 {
        return Err(malformed());
    }

    account
        .checked_mul(2)
        .and_then(|v| v.checked_add(instance))
        .and_then(|v| v.checked_add(INDIVIDUAL_CONSTANT))
        .and_then(|v| v.checked_sub(CONVERSION_FACTOR))
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(malformed)
}

/// 64-bit Steam ID of a 32-bit account id.
pub fn convert_32id_to_64id(account_id: u32) -> u64 {
    u64::from(account_id) + CONVERSION_FACTOR
}
