//! Domain types for the half-court game.

use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Court position id, 1..=11.
pub type PositionId = u8;

/// Where the offense token starts every possession.
pub const OFFENSE_START: PositionId = 3;
/// Where the defense token starts every possession.
pub const DEFENSE_START: PositionId = 8;
/// Dribbles allowed before the shot clock forces a shot.
pub const MAX_DRIBBLES: u32 = 3;

/// Offense-role profile. Each has a base make rate per court zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Midrange,
    Shooter,
    Defender,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::Midrange, Archetype::Shooter, Archetype::Defender];

    /// Uniform pick, used to give the computer opponent a profile.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Midrange => "midrange",
            Archetype::Shooter => "shooter",
            Archetype::Defender => "defender",
        }
    }
}

/// Court region. Decides base difficulty and point value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Three,
    Mid,
    Paint,
}

impl Zone {
    /// A make from beyond the arc is worth 2, everything else 1.
    pub fn points(self) -> u32 {
        match self {
            Zone::Three => 2,
            Zone::Mid | Zone::Paint => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Local,
    Ai,
    /// Placeholder: no network protocol backs this mode.
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl AiDifficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            AiDifficulty::Easy => "easy",
            AiDifficulty::Medium => "medium",
            AiDifficulty::Hard => "hard",
        }
    }
}

impl std::str::FromStr for AiDifficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "medium" => Ok(AiDifficulty::Medium),
            "hard" => Ok(AiDifficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

/// One of the two seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }
}

/// Whose decision is pending within an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Offense,
    Defense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Setup,
    Playing,
    Finished,
}

/// A choice made by the acting role. Offense may shoot from where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    ShootNow,
    Position(PositionId),
}

impl Selection {
    /// Concrete target: shoot-now maps to the current position.
    pub fn target(self, current: PositionId) -> PositionId {
        match self {
            Selection::ShootNow => current,
            Selection::Position(p) => p,
        }
    }
}

/// What the profile/settings layer hands over when a game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeed {
    pub uid: String,
    pub username: String,
    pub archetype: Archetype,
    #[serde(default)]
    pub character_id: Option<String>,
}

impl PlayerSeed {
    pub fn new(uid: impl Into<String>, username: impl Into<String>, archetype: Archetype) -> Self {
        Self {
            uid: uid.into(),
            username: username.into(),
            archetype,
            character_id: None,
        }
    }

    /// Seed for the computer opponent in `ai` mode.
    pub fn computer(archetype: Archetype) -> Self {
        Self::new("ai", "Computer", archetype)
    }

    pub fn with_character(mut self, character_id: impl Into<String>) -> Self {
        self.character_id = Some(character_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub uid: String,
    pub username: String,
    pub archetype: Archetype,
    #[serde(default)]
    pub character_id: Option<String>,
    pub score: u32,
    pub current_position: PositionId,
    pub shots_made: u32,
    pub shots_attempted: u32,
    pub threes_made: u32,
    pub threes_attempted: u32,
}

impl PlayerState {
    pub fn from_seed(seed: PlayerSeed, position: PositionId) -> Self {
        Self {
            uid: seed.uid,
            username: seed.username,
            archetype: seed.archetype,
            character_id: seed.character_id,
            score: 0,
            current_position: position,
            shots_made: 0,
            shots_attempted: 0,
            threes_made: 0,
            threes_attempted: 0,
        }
    }

    pub fn seed(&self) -> PlayerSeed {
        PlayerSeed {
            uid: self.uid.clone(),
            username: self.username.clone(),
            archetype: self.archetype,
            character_id: self.character_id.clone(),
        }
    }
}

/// Authoritative game state. Replaced wholesale on every resolved exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub player1: PlayerState,
    pub player2: PlayerState,
    pub possession: Side,
    /// Dribbles this possession, block penalties included.
    pub move_count: u32,
    /// Dribbles this possession, block penalties excluded.
    pub actual_dribbles: u32,
    pub current_turn: Role,
    pub offense_selection: Option<PositionId>,
    pub status: GameStatus,
    pub winner: Option<Side>,
    #[serde(default)]
    pub ai_difficulty: Option<AiDifficulty>,
}

impl GameState {
    pub fn player(&self, side: Side) -> &PlayerState {
        match side {
            Side::Player1 => &self.player1,
            Side::Player2 => &self.player2,
        }
    }

    pub fn player_mut(&mut self, side: Side) -> &mut PlayerState {
        match side {
            Side::Player1 => &mut self.player1,
            Side::Player2 => &mut self.player2,
        }
    }

    /// Seat that plays `role` in the current possession.
    pub fn side_for(&self, role: Role) -> Side {
        match role {
            Role::Offense => self.possession,
            Role::Defense => self.possession.other(),
        }
    }

    pub fn offense(&self) -> &PlayerState {
        self.player(self.possession)
    }

    pub fn defense(&self) -> &PlayerState {
        self.player(self.possession.other())
    }

    pub fn position_of(&self, role: Role) -> PositionId {
        self.player(self.side_for(role)).current_position
    }

    pub fn difficulty(&self) -> AiDifficulty {
        self.ai_difficulty.unwrap_or_default()
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }
}

/// Outcome of one shot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotResult {
    pub made: bool,
    pub points: u32,
    /// Post-contest make probability.
    pub probability: f64,
    /// Make probability before the contest modifier.
    pub base_probability: f64,
    /// Distance between the offense and defense tokens at release.
    pub distance: f64,
}

/// Append-only record of one resolved exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveHistory {
    pub turn_number: u32,
    pub offense_from: PositionId,
    pub defense_from: PositionId,
    pub offense_position: PositionId,
    pub defense_position: PositionId,
    pub player1_position: PositionId,
    pub player2_position: PositionId,
    pub player1_score: u32,
    pub player2_score: u32,
    pub possession: Side,
    pub move_count: u32,
    pub forced_shot: bool,
    pub blocked: bool,
    pub shot_result: Option<ShotResult>,
}
