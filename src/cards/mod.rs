pub mod card;
pub mod deck;
pub mod location;
pub mod rank;
pub mod suit;

/// wildcard sentinel for rule fields that accept "any rank" or "any suit".
/// concrete cards in play never carry this value.
pub const ANY: u8 = 255;
