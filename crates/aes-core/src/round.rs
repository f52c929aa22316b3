//! Portable AES round transformations on a column-major state.

use crate::block::{xor_in_place, Block};
use crate::sbox::{inv_sbox, sbox};

/// `state[i]` after ShiftRows is `state[SHIFT_ROWS[i]]` before it.
const SHIFT_ROWS: [usize; 16] = [0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12, 1, 6, 11];
const INV_SHIFT_ROWS: [usize; 16] = [0, 13, 10, 7, 4, 1, 14, 11, 8, 5, 2, 15, 12, 9, 6, 3];

#[inline]
pub(crate) fn sub_bytes(state: &mut Block) {
    state.iter_mut().for_each(|b| *b = sbox(*b));
}

#[inline]
pub(crate) fn inv_sub_bytes(state: &mut Block) {
    state.iter_mut().for_each(|b| *b = inv_sbox(*b));
}

fn permute(state: &mut Block, table: &[usize; 16]) {
    let src = *state;
    for (dst, &from) in state.iter_mut().zip(table) {
        *dst = src[from];
    }
}

#[inline]
pub(crate) fn shift_rows(state: &mut Block) {
    permute(state, &SHIFT_ROWS);
}

#[inline]
pub(crate) fn inv_shift_rows(state: &mut Block) {
    permute(state, &INV_SHIFT_ROWS);
}

/// Multiplication by `x` in GF(2^8) modulo the AES polynomial.
fn xtime(byte: u8) -> u8 {
    (byte << 1) ^ (0x1b & 0u8.wrapping_sub(byte >> 7))
}

fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            product ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    product
}

#[inline]
pub(crate) fn mix_columns(state: &mut Block) {
    for col in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        let all = a0 ^ a1 ^ a2 ^ a3;
        col[0] = a0 ^ all ^ xtime(a0 ^ a1);
        col[1] = a1 ^ all ^ xtime(a1 ^ a2);
        col[2] = a2 ^ all ^ xtime(a2 ^ a3);
        col[3] = a3 ^ all ^ xtime(a3 ^ a0);
    }
}

/// InvMixColumns; also used to turn forward round keys into
/// equivalent-inverse round keys.
#[inline]
pub(crate) fn inv_mix_columns(state: &mut Block) {
    for col in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        col[0] = gmul(a0, 0x0e) ^ gmul(a1, 0x0b) ^ gmul(a2, 0x0d) ^ gmul(a3, 0x09);
        col[1] = gmul(a0, 0x09) ^ gmul(a1, 0x0e) ^ gmul(a2, 0x0b) ^ gmul(a3, 0x0d);
        col[2] = gmul(a0, 0x0d) ^ gmul(a1, 0x09) ^ gmul(a2, 0x0e) ^ gmul(a3, 0x0b);
        col[3] = gmul(a0, 0x0b) ^ gmul(a1, 0x0d) ^ gmul(a2, 0x09) ^ gmul(a3, 0x0e);
    }
}

#[inline]
pub(crate) fn add_round_key(state: &mut Block, round_key: &Block) {
    xor_in_place(state, round_key);
}
