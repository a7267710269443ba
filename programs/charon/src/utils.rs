//! Account helpers for records whose address is only known mid-instruction
//!
//! Anchor's `init` needs seeds that are fixed by instruction arguments. The
//! registry entries written while finalizing oracle deposits are keyed by
//! values read from the oracle, so those are created and (de)serialized here.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{program::invoke_signed, system_instruction};
use anchor_lang::{AccountDeserialize, AccountSerialize};

use crate::error::CharonError;

/// Check `info` sits at the PDA for `seeds` and return its bump.
pub fn expect_pda(info: &AccountInfo, seeds: &[&[u8]], program_id: &Pubkey) -> Result<u8> {
    let (expected, bump) = Pubkey::find_program_address(seeds, program_id);
    require_keys_eq!(info.key(), expected, CharonError::AccountMismatch);
    Ok(bump)
}

/// Create a program-owned PDA of `space` bytes, funded by `payer`.
///
/// Handles addresses that were pre-funded by a third party, where
/// `create_account` would fail.
pub fn create_pda<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    program_id: &Pubkey,
    signer_seeds: &[&[u8]],
    space: usize,
) -> Result<()> {
    let rent = Rent::get()?.minimum_balance(space);
    let current = target.lamports();

    if current == 0 {
        let ix = system_instruction::create_account(
            payer.key,
            target.key,
            rent,
            space as u64,
            program_id,
        );
        invoke_signed(
            &ix,
            &[payer.clone(), target.clone(), system_program.clone()],
            &[signer_seeds],
        )?;
        return Ok(());
    }

    if current < rent {
        let ix = system_instruction::transfer(payer.key, target.key, rent - current);
        invoke_signed(
            &ix,
            &[payer.clone(), target.clone(), system_program.clone()],
            &[],
        )?;
    }
    invoke_signed(
        &system_instruction::allocate(target.key, space as u64),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(target.key, program_id),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    Ok(())
}

/// True once the account has been created by this program.
pub fn is_initialized_by(info: &AccountInfo, program_id: &Pubkey) -> bool {
    info.owner == program_id && !info.data_is_empty()
}

/// Deserialize a program account, checking owner and discriminator.
pub fn load<T: AccountDeserialize>(
    info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<T> {
    require_keys_eq!(*info.owner, *program_id, CharonError::AccountMismatch);
    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..])
}

/// Load the account if it exists, else start from `T::default()`.
pub fn load_or_default<T: AccountDeserialize + Default>(
    info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<T> {
    if is_initialized_by(info, program_id) {
        load(info, program_id)
    } else {
        Ok(T::default())
    }
}

/// Serialize `value` (with discriminator) into the account.
pub fn store<T: AccountSerialize>(info: &AccountInfo, value: &T) -> Result<()> {
    let mut data = info.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data[..];
    value.try_serialize(&mut writer)
}

/// Create the PDA if it does not exist yet, then write `value` into it.
pub fn save_pda<'info, T: AccountSerialize>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    program_id: &Pubkey,
    signer_seeds: &[&[u8]],
    space: usize,
    value: &T,
) -> Result<()> {
    if !is_initialized_by(target, program_id) {
        create_pda(payer, target, system_program, program_id, signer_seeds, space)?;
    }
    store(target, value)
}
