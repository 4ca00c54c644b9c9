use anchor_lang::prelude::*;

/// Wire value standing for the chain's native currency (lamports).
///
/// Only instruction arguments and events carry it; inside the engine assets
/// are always an [`Asset`].
pub const NATIVE_SENTINEL: Pubkey = Pubkey::new_from_array([0xEE; 32]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Asset {
    /// Lamports held directly by the vault PDA.
    Native,
    /// SPL token identified by its mint.
    Token(Pubkey),
}

impl Asset {
    pub fn from_wire(address: Pubkey) -> Self {
        if address == NATIVE_SENTINEL {
            Asset::Native
        } else {
            Asset::Token(address)
        }
    }

    pub fn to_wire(self) -> Pubkey {
        match self {
            Asset::Native => NATIVE_SENTINEL,
            Asset::Token(mint) => mint,
        }
    }

    pub fn is_native(self) -> bool {
        matches!(self, Asset::Native)
    }
}
