use thiserror::Error;

/// Errors surfaced by quote computation and account retrieval.
///
/// Math errors (`ArithmeticOverflow`, `AmountExceedsMax`) indicate the
/// requested swap cannot be represented in the fixed-point domain, not a bug
/// in the caller's inputs. Validation errors describe malformed inputs and
/// are always detected before any math runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("arithmetic overflow in fixed-point computation")]
    ArithmeticOverflow,

    #[error("token amount exceeds the representable maximum")]
    AmountExceedsMax,

    #[error("sqrt price out of bounds")]
    SqrtPriceOutOfBounds,

    #[error("tick index out of bounds")]
    TickIndexOutOfBounds,

    #[error("tick window start {start_tick_index} is not aligned to tick spacing {tick_spacing}")]
    InvalidTickSpacingAlignment {
        start_tick_index: i32,
        tick_spacing: u16,
    },

    #[error("tick windows do not form a contiguous ordered sequence")]
    InvalidTickWindowSequence,

    #[error("sqrt price limit is on the wrong side of the current price")]
    InvalidSqrtPriceLimit,

    #[error("pool tick index is inconsistent with pool sqrt price")]
    InconsistentPoolSnapshot,

    #[error("account fetch failed: {0}")]
    Fetch(String),
}

pub type SdkResult<T> = Result<T, QuoteError>;
