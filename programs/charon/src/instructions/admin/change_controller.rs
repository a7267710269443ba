//! Change Controller Instruction
//!
//! Hands pool control to a new address. Only the current controller can
//! call it.

use anchor_lang::prelude::*;

use crate::error::CharonError;
use crate::events::ControllerChanged;
use crate::state::PoolConfig;

#[derive(Accounts)]
pub struct ChangeController<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool_config.base_mint.as_ref()],
        bump = pool_config.bump,
        has_one = controller @ CharonError::Unauthorized,
    )]
    pub pool_config: Box<Account<'info, PoolConfig>>,

    pub controller: Signer<'info>,
}

pub fn handler(ctx: Context<ChangeController>, new_controller: Pubkey) -> Result<()> {
    let pool_config = &mut ctx.accounts.pool_config;
    let old_controller = pool_config.controller;

    require!(
        new_controller != Pubkey::default(),
        CharonError::Unauthorized
    );

    pool_config.transfer_control(new_controller);

    emit!(ControllerChanged {
        pool: pool_config.key(),
        old_controller,
        new_controller,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Controller changed");
    msg!("Old controller: {}", old_controller);
    msg!("New controller: {}", new_controller);

    Ok(())
}
