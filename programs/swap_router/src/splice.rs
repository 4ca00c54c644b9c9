//! Call builder for chained hops.
//!
//! A [`CallInfo`] carries a router call already encoded off-chain: an opaque
//! selector followed by a block of 32-byte parameter words. The only value the
//! router cannot know ahead of time is the amount flowing out of the previous
//! hop, so when `is_replace` is set the word at `index` is overwritten with
//! that amount (big-endian, left-padded) before the call is issued. Call
//! shapes without an amount parameter (native input carried as forwarded
//! value) leave `is_replace` unset and are sent verbatim.

use anchor_lang::prelude::*;

use crate::{error::RouterError, CallInfo};

pub const WORD_SIZE: usize = 32;

pub type Word = [u8; WORD_SIZE];

/// Big-endian 32-byte encoding of `amount`.
pub fn amount_word(amount: u64) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 8..].copy_from_slice(&amount.to_be_bytes());
    word
}

/// Views `params` as parameter words.
pub fn param_words(params: &[u8]) -> Result<&[Word]> {
    bytemuck::try_cast_slice(params).map_err(|_| error!(RouterError::MalformedCallParams))
}

/// `selector ++ params`, with `params[index]` replaced by `amount` when the
/// template asks for it.
pub fn build_call(call: &CallInfo, amount: u64) -> Result<Vec<u8>> {
    let words = param_words(&call.params)?;
    let splice_at = if call.is_replace {
        let index = call.index as usize;
        require!(index < words.len(), RouterError::SpliceIndexOutOfBounds);
        Some(index)
    } else {
        None
    };

    let mut data = Vec::with_capacity(call.selector.len() + call.params.len());
    data.extend_from_slice(&call.selector);
    for (i, word) in words.iter().enumerate() {
        if splice_at == Some(i) {
            data.extend_from_slice(&amount_word(amount));
        } else {
            data.extend_from_slice(word);
        }
    }
    Ok(data)
}
