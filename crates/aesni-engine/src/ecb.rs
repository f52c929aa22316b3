//! ECB: every block through the block core on its own.

use aes_core::{Block, RoundKeys};

use crate::block::{load, to_block, Rounds};
use crate::inout::InOut;

#[target_feature(enable = "aes")]
pub(crate) unsafe fn encrypt<const NR: usize>(schedule: &RoundKeys, mut buf: InOut<'_, Block>) {
    let rounds = Rounds::<NR>::new(schedule);
    for i in 0..buf.len() {
        let m = load(&buf.read(i));
        buf.write(i, to_block(rounds.encrypt(m)));
    }
}

#[target_feature(enable = "aes")]
pub(crate) unsafe fn decrypt<const NR: usize>(schedule: &RoundKeys, mut buf: InOut<'_, Block>) {
    let rounds = Rounds::<NR>::new(schedule);
    for i in 0..buf.len() {
        let c = load(&buf.read(i));
        buf.write(i, to_block(rounds.decrypt(c)));
    }
}
