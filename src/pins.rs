//! GPIO assignments for the sprayer relay board.
//!
//! Single source of truth for the default channel wiring.  The order here is
//! the Channel Registry order: index 0 is sprayer 1, and the sequential
//! rotation walks the lines in this order.

// ---------------------------------------------------------------------------
// Sprayer valves (relay coils, active HIGH)
// ---------------------------------------------------------------------------

/// Sprayer 1 relay.
pub const SPRAYER_1_GPIO: i32 = 13;
/// Sprayer 2 relay.
pub const SPRAYER_2_GPIO: i32 = 19;
/// Sprayer 3 relay.
pub const SPRAYER_3_GPIO: i32 = 16;

/// Default channel list, in rotation order.
pub const SPRAYER_GPIOS: [i32; 3] = [SPRAYER_1_GPIO, SPRAYER_2_GPIO, SPRAYER_3_GPIO];

/// Upper bound on the number of channels a board can carry.
pub const MAX_CHANNELS: usize = 8;
