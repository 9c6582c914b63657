//! Devil/player overlap test
//!
//! Not a true circle-rectangle intersection: the devil's size is used as a
//! half-extent on both axes and compared against the player's half
//! dimensions around the player centre, so hits register wider than the
//! drawn shapes.
// NOTE: candidate for review against a real circle/rect test; changing it
// alters difficulty.

use super::state::{Devil, Player};

/// True when the devil touches the player
pub fn devil_hits_player(devil: &Devil, player: &Player) -> bool {
    let center = player.center();
    let dx = (devil.pos.x - center.x).abs();
    let dy = (devil.pos.y - center.y).abs();
    dx < devil.size + player.width / 2.0 && dy < devil.size + player.height / 2.0
}
