use thiserror::Error;

/// Failure kinds raised by the farm.
///
/// This is a closed set of payload-free kinds: callers match on the variant,
/// never on message text. Every failure aborts the enclosing operation with
/// no observable partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FarmError {
    /// An emission query was made with `to < from`.
    #[error("Cannot calculate emissions: end precedes start")]
    CannotCalculateEmissions,

    /// An emission schedule must contain at least one point.
    #[error("Cannot have an empty emission schedule")]
    CannotHaveEmptyEmissionSchedule,

    /// Emission point timestamps must be strictly ascending.
    #[error("Emission schedule timestamps must be strictly ascending")]
    UnsortedEmissionSchedule,

    /// Pools cannot be configured until an emission schedule exists.
    #[error("Cannot add a pool without an emission schedule")]
    CannotAddPoolWithoutEmissionSchedule,

    /// A pool's collection cannot be replaced while items are staked in it.
    #[error("Cannot change the collateral of a pool with staked items")]
    CannotChangeStakedCollateral,

    /// Deposits into a pool with zero strength are rejected.
    #[error("Cannot deposit into an inactive pool")]
    CannotDepositInactivePool,

    /// The caller does not own one of the items it tried to deposit.
    #[error("Cannot deposit a token the caller does not own")]
    CannotDepositUnownedToken,

    /// The caller tried to withdraw an item its position does not hold.
    #[error("Cannot withdraw from an unheld position")]
    CannotWithdrawUnheldPosition,

    /// Paying out a pending reward failed.
    #[error("Reward transfer failed")]
    RewardTransferFailed,

    /// The administrative sweep transfer failed.
    #[error("Sweeping transfer failed")]
    SweepingTransferFailed,

    /// The collateral collection rejected a call or is unknown.
    #[error("Collateral call failed")]
    CollateralCallFailed,

    /// A mutating entry point was re-entered while another was in flight.
    #[error("Re-entrant call rejected")]
    ReentrantCall,

    /// An administrative operation was attempted by a non-administrator.
    #[error("Caller is not the administrator")]
    NotAdministrator,

    /// A checked arithmetic operation overflowed.
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

/// Coarse classification of a `FarmError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Invalid administrative configuration.
    Config,
    /// Invalid input to a query or user operation.
    Validation,
    /// A payout or sweep transfer failed.
    Transfer,
    /// The execution lock rejected the call.
    Guard,
    /// The caller lacks the required authority.
    Access,
    /// Fixed-width integer arithmetic overflowed.
    Arithmetic,
}

impl FarmError {
    /// The class this failure kind belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            FarmError::CannotHaveEmptyEmissionSchedule
            | FarmError::UnsortedEmissionSchedule
            | FarmError::CannotAddPoolWithoutEmissionSchedule
            | FarmError::CannotChangeStakedCollateral => ErrorClass::Config,
            FarmError::CannotCalculateEmissions
            | FarmError::CannotDepositInactivePool
            | FarmError::CannotDepositUnownedToken
            | FarmError::CannotWithdrawUnheldPosition
            | FarmError::CollateralCallFailed => ErrorClass::Validation,
            FarmError::RewardTransferFailed | FarmError::SweepingTransferFailed => {
                ErrorClass::Transfer
            }
            FarmError::ReentrantCall => ErrorClass::Guard,
            FarmError::NotAdministrator => ErrorClass::Access,
            FarmError::ArithmeticOverflow => ErrorClass::Arithmetic,
        }
    }
}

/// Failure reported by an external collaborator (collection, token, bank).
///
/// The farm never inspects the reason; it maps any collaborator failure onto
/// the matching `FarmError` kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Collaborator error: {0}")]
pub struct CollaboratorError(pub String);

impl CollaboratorError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
