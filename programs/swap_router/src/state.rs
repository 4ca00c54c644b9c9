use anchor_lang::prelude::*;

use crate::error::RouterError;
use crate::fee::validate_fee_percentage;

/// Upper bound on registered routers; sizes the `Config` account.
pub const MAX_DEXES: usize = 32;
/// Upper bound on affiliate fee overrides; sizes the `Config` account.
pub const MAX_AFFILIATES: usize = 64;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct DexEntry {
    pub flag: u32,
    pub router: Pubkey,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct AffiliateFee {
    pub code: u32,
    pub fee_percentage: u64,
}

/// Global protocol config: fee tables and the dex registry.
///
/// Swap instructions deserialize it once, so a single invocation always sees
/// one consistent snapshot.
#[account]
#[derive(Debug, InitSpace)]
pub struct Config {
    pub admin: Pubkey,
    pub fee_to: Pubkey,
    pub default_fee_percentage: u64,
    #[max_len(MAX_AFFILIATES)]
    pub affiliate_fees: Vec<AffiliateFee>,
    #[max_len(MAX_DEXES)]
    pub dexes: Vec<DexEntry>,
    pub paused: bool,
    pub bump: u8,
    pub vault_bump: u8,
}

impl Config {
    pub fn new(admin: Pubkey, fee_to: Pubkey, default_fee_percentage: u64) -> Result<Self> {
        validate_fee_percentage(default_fee_percentage)?;
        Ok(Self {
            admin,
            fee_to,
            default_fee_percentage,
            affiliate_fees: Vec::new(),
            dexes: Vec::new(),
            paused: false,
            bump: 0,
            vault_bump: 0,
        })
    }

    pub fn require_admin(&self, signer: &Pubkey) -> Result<()> {
        require_keys_eq!(*signer, self.admin, RouterError::Unauthorized);
        Ok(())
    }

    // -------------------- DexRegistry --------------------

    pub fn lookup_dex(&self, flag: u32) -> Result<Pubkey> {
        self.dexes
            .iter()
            .find(|entry| entry.flag == flag)
            .map(|entry| entry.router)
            .ok_or_else(|| error!(RouterError::UnsupportedDexFlag))
    }

    /// Inserts or overwrites the router behind `flag`.
    pub fn upsert_dex(&mut self, flag: u32, router: Pubkey) -> Result<()> {
        if let Some(entry) = self.dexes.iter_mut().find(|entry| entry.flag == flag) {
            entry.router = router;
            return Ok(());
        }
        require!(self.dexes.len() < MAX_DEXES, RouterError::RegistryFull);
        self.dexes.push(DexEntry { flag, router });
        Ok(())
    }

    // -------------------- Fee tables --------------------

    /// Raw affiliate table read; unknown codes map to 0.
    pub fn affiliate_fee_percentage(&self, code: u32) -> u64 {
        self.affiliate_fees
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.fee_percentage)
            .unwrap_or(0)
    }

    /// Percentage charged for a swap carrying `affiliate_code`.
    pub fn resolve_fee_percentage(&self, affiliate_code: u32) -> u64 {
        if affiliate_code == 0 {
            self.default_fee_percentage
        } else {
            self.affiliate_fee_percentage(affiliate_code)
        }
    }

    pub fn set_default_fee_percentage(&mut self, fee_percentage: u64) -> Result<()> {
        validate_fee_percentage(fee_percentage)?;
        self.default_fee_percentage = fee_percentage;
        Ok(())
    }

    pub fn set_affiliate_fee_percentage(&mut self, code: u32, fee_percentage: u64) -> Result<()> {
        require!(code != 0, RouterError::ReservedAffiliateCode);
        validate_fee_percentage(fee_percentage)?;
        if let Some(entry) = self.affiliate_fees.iter_mut().find(|entry| entry.code == code) {
            entry.fee_percentage = fee_percentage;
            return Ok(());
        }
        require!(
            self.affiliate_fees.len() < MAX_AFFILIATES,
            RouterError::AffiliateTableFull
        );
        self.affiliate_fees.push(AffiliateFee {
            code,
            fee_percentage,
        });
        Ok(())
    }
}

/// Reentrancy flag for the swap entrypoints.
///
/// Zero-copy so that writes land in account data immediately instead of at
/// instruction exit.
#[account(zero_copy)]
pub struct SwapLock {
    pub locked: u8,
    pub bump: u8,
}
