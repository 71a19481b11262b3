//! Pump.fun Instruction Encoding
//!
//! Anchor-style instruction data (8-byte discriminator + little-endian
//! args) and the account lists the program expects, plus the fixed
//! compute-budget preamble attached ahead of every trade.

use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

use super::accounts::{
    associated_bonding_curve, bonding_curve_pda, user_token_account, EVENT_AUTHORITY,
    FEE_RECIPIENT, GLOBAL, PUMP_FUN_PROGRAM_ID,
};

/// Instruction discriminators (8 bytes, Anchor-style).
pub mod discriminators {
    pub const BUY: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
    pub const SELL: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];
}

fn encode_args(discriminator: [u8; 8], first: u64, second: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + 16);
    data.extend_from_slice(&discriminator);
    data.extend_from_slice(&first.to_le_bytes());
    data.extend_from_slice(&second.to_le_bytes());
    data
}

/// `buy(amount, max_sol_cost)`: receive `amount` token base units, paying
/// at most `max_sol_cost` lamports.
pub fn buy(user: &Pubkey, mint: &Pubkey, amount: u64, max_sol_cost: u64) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(GLOBAL, false),
        AccountMeta::new(FEE_RECIPIENT, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(bonding_curve_pda(mint), false),
        AccountMeta::new(associated_bonding_curve(mint), false),
        AccountMeta::new(user_token_account(user, mint), false),
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(system_program::ID, false),
        AccountMeta::new_readonly(spl_token::ID, false),
        AccountMeta::new_readonly(sysvar::rent::ID, false),
        AccountMeta::new_readonly(EVENT_AUTHORITY, false),
        AccountMeta::new_readonly(PUMP_FUN_PROGRAM_ID, false),
    ];

    Instruction {
        program_id: PUMP_FUN_PROGRAM_ID,
        accounts,
        data: encode_args(discriminators::BUY, amount, max_sol_cost),
    }
}

/// `sell(amount, min_sol_output)`: sell `amount` token base units for at
/// least `min_sol_output` lamports.
pub fn sell(user: &Pubkey, mint: &Pubkey, amount: u64, min_sol_output: u64) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(GLOBAL, false),
        AccountMeta::new(FEE_RECIPIENT, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new(bonding_curve_pda(mint), false),
        AccountMeta::new(associated_bonding_curve(mint), false),
        AccountMeta::new(user_token_account(user, mint), false),
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(system_program::ID, false),
        AccountMeta::new_readonly(spl_associated_token_account::ID, false),
        AccountMeta::new_readonly(spl_token::ID, false),
        AccountMeta::new_readonly(EVENT_AUTHORITY, false),
        AccountMeta::new_readonly(PUMP_FUN_PROGRAM_ID, false),
    ];

    Instruction {
        program_id: PUMP_FUN_PROGRAM_ID,
        accounts,
        data: encode_args(discriminators::SELL, amount, min_sol_output),
    }
}

/// Fixed compute-budget pair placed ahead of the trade instruction.
pub fn compute_budget(unit_limit: u32, unit_price_micro_lamports: u64) -> [Instruction; 2] {
    [
        ComputeBudgetInstruction::set_compute_unit_limit(unit_limit),
        ComputeBudgetInstruction::set_compute_unit_price(unit_price_micro_lamports),
    ]
}

/// Idempotent create of the user's associated token account. Buys include
/// this when the account does not exist yet; sells never create one.
pub fn create_user_token_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account_idempotent(payer, owner, mint, &spl_token::ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u64(data: &[u8], offset: usize) -> u64 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&data[offset..offset + 8]);
        u64::from_le_bytes(bytes)
    }

    #[test]
    fn test_buy_instruction_encoding() {
        let user = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = buy(&user, &mint, 34_612_903_225_806, 1_010_000_000);

        assert_eq!(ix.program_id, PUMP_FUN_PROGRAM_ID);
        assert_eq!(&ix.data[..8], &discriminators::BUY);
        assert_eq!(read_u64(&ix.data, 8), 34_612_903_225_806);
        assert_eq!(read_u64(&ix.data, 16), 1_010_000_000);
    }

    #[test]
    fn test_buy_accounts() {
        let user = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = buy(&user, &mint, 1, 1);

        assert_eq!(ix.accounts.len(), 12);
        assert_eq!(ix.accounts[0].pubkey, GLOBAL);
        assert_eq!(ix.accounts[1].pubkey, FEE_RECIPIENT);
        assert_eq!(ix.accounts[2].pubkey, mint);
        assert_eq!(ix.accounts[3].pubkey, bonding_curve_pda(&mint));
        assert_eq!(ix.accounts[5].pubkey, user_token_account(&user, &mint));
        assert_eq!(ix.accounts[6].pubkey, user);
        assert!(ix.accounts[6].is_signer);
        assert_eq!(ix.accounts[9].pubkey, sysvar::rent::ID);
    }

    #[test]
    fn test_sell_instruction_encoding() {
        let user = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = sell(&user, &mint, 17_500_000_000, 250_000_000);

        assert_eq!(&ix.data[..8], &discriminators::SELL);
        assert_eq!(read_u64(&ix.data, 8), 17_500_000_000);
        assert_eq!(read_u64(&ix.data, 16), 250_000_000);
        assert_eq!(ix.accounts.len(), 12);
        // Sell swaps the rent sysvar slot for the associated token program.
        assert_eq!(ix.accounts[8].pubkey, spl_associated_token_account::ID);
    }

    #[test]
    fn test_compute_budget_pair() {
        let [limit, price] = compute_budget(100_000, 100_000);
        assert_eq!(limit.program_id, solana_sdk::compute_budget::id());
        assert_eq!(price.program_id, solana_sdk::compute_budget::id());
        assert_ne!(limit.data, price.data);
    }

    #[test]
    fn test_create_user_token_account_program() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = create_user_token_account(&payer, &payer, &mint);
        assert_eq!(ix.program_id, spl_associated_token_account::ID);
    }
}
