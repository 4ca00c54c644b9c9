use anchor_lang::prelude::*;

#[error_code]
pub enum RouterError {
    #[msg("fromToken should not be equal with toToken")]
    InvalidTokenPair,
    #[msg("Swap list is empty")]
    EmptySwapList,
    #[msg("Incorrect native value sent")]
    IncorrectNativeValueSent,
    #[msg("Unsupported dex flag")]
    UnsupportedDexFlag,
    #[msg("External router call reverted")]
    ExternalCallReverted,
    #[msg("amount out is 0")]
    AmountOutZero,
    #[msg("Minimum amount not met")]
    MinimumAmountNotMet,
    #[msg("Call template index is outside of its params")]
    SpliceIndexOutOfBounds,
    #[msg("Call template params are not a whole number of 32-byte words")]
    MalformedCallParams,
    #[msg("Hop input token does not match the previous hop output token")]
    HopTokenMismatch,
    #[msg("Route exceeds the maximum number of hops")]
    TooManyHops,
    #[msg("Swap already in progress")]
    ReentrantCall,
    #[msg("Unauthorized: admin signature required")]
    Unauthorized,
    #[msg("Fee percentage exceeds 100%")]
    InvalidFeePercentage,
    #[msg("Affiliate code 0 is reserved for the default fee")]
    ReservedAffiliateCode,
    #[msg("Dex registry is full")]
    RegistryFull,
    #[msg("Affiliate fee table is full")]
    AffiliateTableFull,
    #[msg("Protocol is paused")]
    Paused,
    #[msg("Function does not exist")]
    FunctionDoesNotExist,
    #[msg("Settlement account not provided")]
    SettlementAccountMissing,
    #[msg("Insufficient remaining accounts for router call")]
    RouterAccountsMismatch,
    #[msg("Overflow")]
    NumericalOverflow,
}
