use serde::{Deserialize, Serialize};
use ts_rs::TS;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../public/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    /// Sent once on connect
    #[serde(rename = "init")]
    Init(InitMsg),
    /// Broadcast every tick to every connection
    #[serde(rename = "state")]
    State(StateMsg),
    /// Sent once, only to the eliminated connection
    #[serde(rename = "eliminated")]
    Eliminated,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../public/generated/")]
#[serde(rename_all = "camelCase")]
pub struct InitMsg {
    pub id: u32,
    pub world_width: f64,
    pub world_height: f64,
    pub pillars: Vec<PillarWire>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../public/generated/")]
pub struct PillarWire {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../public/generated/")]
pub struct PointWire {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../public/generated/")]
pub struct StateMsg {
    pub players: Vec<PlayerStateWire>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../public/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PlayerStateWire {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub hooked: bool,
    /// Position of the hooked pillar, null when unhooked
    pub hook_target: Option<PointWire>,
    pub score: u32,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../public/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    #[serde(rename = "hook")]
    Hook(HookMsg),
}

/// Either `{release: true}` or a world-space aim point.
/// Fields are all optional on the wire; an aim without both coordinates is
/// treated as a no-op by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../public/generated/")]
#[serde(rename_all = "camelCase")]
pub struct HookMsg {
    #[serde(default)]
    pub release: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouse_y: Option<f64>,
}
