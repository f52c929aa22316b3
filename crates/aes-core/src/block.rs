//! Block representation helpers.

/// Size of an AES block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES block of 16 bytes.
pub type Block = [u8; BLOCK_SIZE];

/// XORs two blocks, writing the result into `dst`.
#[inline]
pub fn xor_in_place(dst: &mut Block, rhs: &Block) {
    for (d, r) in dst.iter_mut().zip(rhs) {
        *d ^= *r;
    }
}

/// Returns `lhs ^ rhs`.
#[inline]
pub fn xor(lhs: &Block, rhs: &Block) -> Block {
    let mut out = *lhs;
    xor_in_place(&mut out, rhs);
    out
}
