/// Number of tick slots stored in a single on-chain tick window account.
pub const TICK_WINDOW_SIZE: usize = 88;

/// Smallest tick index representable in the Q64.64 sqrt price domain.
pub const MIN_TICK: i32 = -443636;

/// Largest tick index representable in the Q64.64 sqrt price domain.
pub const MAX_TICK: i32 = 443636;

/// Q64.64 sqrt price at `MIN_TICK`.
pub const MIN_SQRT_PRICE: u128 = 4295048016;

/// Q64.64 sqrt price at `MAX_TICK`.
pub const MAX_SQRT_PRICE: u128 = 79226673515401279992447579055;

/// Fee rates are expressed in hundredths of a basis point, so a rate of
/// 10_000 is 1% and `FEE_RATE_MUL_VALUE` is 100%.
pub const FEE_RATE_MUL_VALUE: u128 = 1_000_000;
