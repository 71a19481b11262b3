//! Well-known pump.fun addresses and deterministic account derivations.

use solana_sdk::{pubkey, pubkey::Pubkey};
use spl_associated_token_account::get_associated_token_address;

/// The pump.fun bonding-curve program.
pub const PUMP_FUN_PROGRAM_ID: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");

/// Global configuration PDA (`["global"]`).
pub const GLOBAL: Pubkey = pubkey!("4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf");

/// Protocol fee recipient.
pub const FEE_RECIPIENT: Pubkey = pubkey!("CebN5WGQ4jvEPvsVU4EoHEpgzq1VV7AbicfhtW4xC9iM");

/// Anchor event authority PDA (`["__event_authority"]`).
pub const EVENT_AUTHORITY: Pubkey = pubkey!("Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1");

/// Bonding curve PDA for a mint: seeds `["bonding-curve", mint]`.
pub fn bonding_curve_pda(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[b"bonding-curve", mint.as_ref()], &PUMP_FUN_PROGRAM_ID).0
}

/// The curve's own token vault (its associated token account).
pub fn associated_bonding_curve(mint: &Pubkey) -> Pubkey {
    get_associated_token_address(&bonding_curve_pda(mint), mint)
}

/// The user's associated token account for a mint.
pub fn user_token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, mint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonding_curve_pda_deterministic() {
        let mint = Pubkey::new_unique();
        assert_eq!(bonding_curve_pda(&mint), bonding_curve_pda(&mint));

        let other = Pubkey::new_unique();
        assert_ne!(bonding_curve_pda(&mint), bonding_curve_pda(&other));
    }

    #[test]
    fn test_associated_bonding_curve_differs_from_user_account() {
        let mint = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        assert_ne!(
            associated_bonding_curve(&mint),
            user_token_account(&user, &mint)
        );
    }
}
