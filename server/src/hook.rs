//! Hook targeting, hook intents and hook force.

use crate::arena::{HookState, Pillar, Player};
use hookball_shared::protocol::HookMsg;
use hookball_shared::vec2::{self, Vec2};

/// What a client asked the hook to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HookIntent {
    Release,
    /// Hook the pillar best aligned with the direction towards `aim`
    Engage { aim: Vec2 },
}

impl HookIntent {
    /// Interpret a wire hook message. `None` for payloads that are neither a
    /// release nor a complete, finite aim point.
    pub fn from_msg(msg: &HookMsg) -> Option<Self> {
        if msg.release {
            return Some(HookIntent::Release);
        }
        match (msg.mouse_x, msg.mouse_y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(HookIntent::Engage {
                aim: Vec2::new(x, y),
            }),
            _ => None,
        }
    }
}

/// Select the pillar most closely aligned with the aim direction among the
/// pillars within `max_range` of `player_pos`.
///
/// Alignment is the cosine between the aim direction and the direction to
/// the pillar; ties go to the earliest pillar in the list. Returns `None`
/// only when no pillar is in range.
pub fn find_nearest_pillar(
    pillars: &[Pillar],
    player_pos: Vec2,
    aim: Vec2,
    max_range: f64,
) -> Option<usize> {
    let aim_dir = vec2::normalize(vec2::sub(aim, player_pos));

    // Seeded below any cosine so a pillar directly behind still qualifies
    let mut best: Option<usize> = None;
    let mut best_score = f64::NEG_INFINITY;

    for (index, pillar) in pillars.iter().enumerate() {
        let to_pillar = vec2::sub(pillar.position, player_pos);
        if vec2::length(to_pillar) > max_range {
            continue;
        }
        let score = vec2::dot(vec2::normalize(to_pillar), aim_dir);
        if score > best_score {
            best_score = score;
            best = Some(index);
        }
    }

    best
}

/// Apply an intent to a player. Returns true if the hook state changed.
///
/// A release always unhooks. An engage only changes state when a pillar is
/// found; otherwise the previous state is kept.
pub fn apply_hook_intent(
    player: &mut Player,
    player_pos: Vec2,
    pillars: &[Pillar],
    intent: HookIntent,
    max_range: f64,
) -> bool {
    let next = match intent {
        HookIntent::Release => HookState::Unhooked,
        HookIntent::Engage { aim } => match find_nearest_pillar(pillars, player_pos, aim, max_range)
        {
            Some(pillar) => HookState::Hooked { pillar },
            None => return false,
        },
    };
    let changed = player.hook != next;
    player.hook = next;
    changed
}

/// Force pulling a player at `player_pos` towards `target`.
///
/// Magnitude is `min(dist * strength, max)`; a zero distance yields a zero force.
pub fn hook_force(player_pos: Vec2, target: Vec2, strength: f64, max: f64) -> Vec2 {
    let to_target = vec2::sub(target, player_pos);
    let magnitude = (vec2::length(to_target) * strength).min(max);
    vec2::scale(vec2::normalize(to_target), magnitude)
}
