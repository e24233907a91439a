/// Arena tuning. Fixed at process start and part of the implicit contract
/// with clients (world size and pillars are sent in `init`).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../public/generated/")]
#[serde(rename_all = "camelCase")]
pub struct ArenaConfig {
    pub world_width: f64,
    pub world_height: f64,
    pub pillar_count: u32,
    pub pillar_radius: f64,
    pub player_radius: f64,
    /// Pillars farther than this from the player are never hooked
    pub hook_range: f64,
    /// Hook force per unit of distance to the pillar
    pub hook_strength: f64,
    /// Upper bound on hook force magnitude
    pub hook_max: f64,
    /// Speed cap in units per tick
    pub max_speed: f64,
    /// A colliding player must be strictly faster than this multiple of the
    /// other player's speed to eliminate them
    pub elimination_ratio: f64,
    pub player_restitution: f64,
    pub player_friction: f64,
    pub player_air_friction: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            world_width: 2000.0,
            world_height: 2000.0,
            pillar_count: 30,
            pillar_radius: 15.0,
            player_radius: 20.0,
            hook_range: 300.0,
            hook_strength: 0.002,
            hook_max: 0.05,
            max_speed: 15.0,
            elimination_ratio: 1.5,
            player_restitution: 0.8,
            player_friction: 0.01,
            player_air_friction: 0.01,
        }
    }
}

fn positive(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("{} must be finite and > 0", name));
    }
    Ok(())
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), String> {
        positive(self.world_width, "world_width")?;
        positive(self.world_height, "world_height")?;
        positive(self.pillar_radius, "pillar_radius")?;
        positive(self.player_radius, "player_radius")?;
        positive(self.hook_range, "hook_range")?;
        positive(self.hook_strength, "hook_strength")?;
        positive(self.max_speed, "max_speed")?;
        if !self.hook_max.is_finite() || self.hook_max < 0.0 {
            return Err("hook_max must be finite and >= 0".to_string());
        }
        if !self.elimination_ratio.is_finite() || self.elimination_ratio < 1.0 {
            return Err("elimination_ratio must be finite and >= 1".to_string());
        }
        for (value, name) in [
            (self.player_restitution, "player_restitution"),
            (self.player_friction, "player_friction"),
            (self.player_air_friction, "player_air_friction"),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1]", name));
            }
        }
        Ok(())
    }
}
