//! Named bot profiles: tier tuning overrides loaded from TOML at runtime
//! for the CLIs and any embedding session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::engine::bot_strategy::{
    AiPolicy, BotStrategy, EvStrategy, MixedStrategy, OffensePick, PolicyParams, RandomStrategy,
};
use crate::games::halfcourt::types::AiDifficulty;

/// Environment variable naming an explicit profile file.
pub const PROFILES_ENV: &str = "HALFCOURT_BOT_PROFILES";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A named bot profile. Every tuning field is optional and falls back to
/// the constants of `base_tier`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfile {
    pub description: Option<String>,
    /// "ev", "mixed" or "random". Defaults to the base tier's own kind.
    pub strategy_type: Option<String>,
    /// Tier whose constants fill unset fields. Defaults to medium.
    pub base_tier: Option<AiDifficulty>,

    pub optimal_rate: Option<f64>,
    /// Offense exploration; mutually exclusive with `offense_temperature`.
    pub epsilon: Option<f64>,
    pub offense_temperature: Option<f64>,
    pub zone_bias_scale: Option<f64>,
    pub repetition_scale: Option<f64>,
    pub defense_temperature: Option<f64>,
    pub contest_bonus: Option<f64>,
    pub cutoff_bonus: Option<f64>,
    pub mirror_scale: Option<f64>,
    pub deny_scale: Option<f64>,
    pub defense_repetition_scale: Option<f64>,
}

/// Maps difficulty tiers to profile names.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProductionConfig {
    pub easy: Option<String>,
    pub medium: Option<String>,
    pub hard: Option<String>,
}

impl ProductionConfig {
    pub fn resolve(&self, difficulty: AiDifficulty) -> Option<&str> {
        match difficulty {
            AiDifficulty::Easy => self.easy.as_deref(),
            AiDifficulty::Medium => self.medium.as_deref(),
            AiDifficulty::Hard => self.hard.as_deref(),
        }
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, BotProfile>,
    #[serde(default)]
    pub production: ProductionConfig,
}

impl BotProfile {
    fn base(&self) -> AiDifficulty {
        self.base_tier.unwrap_or_default()
    }

    pub fn to_params(&self) -> PolicyParams {
        let d = match self.base() {
            AiDifficulty::Hard => PolicyParams::hard(),
            _ => PolicyParams::medium(),
        };
        let offense_pick = match (self.epsilon, self.offense_temperature) {
            (Some(epsilon), _) => OffensePick::EpsilonGreedy { epsilon },
            (None, Some(temperature)) => OffensePick::Softmax { temperature },
            (None, None) => d.offense_pick,
        };
        PolicyParams {
            offense_pick,
            zone_bias_scale: self.zone_bias_scale.unwrap_or(d.zone_bias_scale),
            repetition_scale: self.repetition_scale.unwrap_or(d.repetition_scale),
            defense_temperature: self.defense_temperature.unwrap_or(d.defense_temperature),
            contest_bonus: self.contest_bonus.unwrap_or(d.contest_bonus),
            cutoff_bonus: self.cutoff_bonus.unwrap_or(d.cutoff_bonus),
            mirror_scale: self.mirror_scale.unwrap_or(d.mirror_scale),
            deny_scale: self.deny_scale.unwrap_or(d.deny_scale),
            defense_repetition_scale: self
                .defense_repetition_scale
                .unwrap_or(d.defense_repetition_scale),
        }
    }

    pub fn effective_strategy_type(&self) -> &str {
        match self.strategy_type.as_deref() {
            Some(t) => t,
            None if self.base() == AiDifficulty::Easy => "mixed",
            None => "ev",
        }
    }

    pub fn build_strategy(&self) -> Arc<dyn BotStrategy> {
        match self.effective_strategy_type() {
            "random" => Arc::new(RandomStrategy),
            "mixed" => {
                let d = MixedStrategy::easy();
                Arc::new(MixedStrategy {
                    optimal_rate: self.optimal_rate.unwrap_or(d.optimal_rate),
                    optimal: EvStrategy::new(self.to_params()),
                })
            }
            other => {
                if other != "ev" {
                    tracing::warn!(strategy_type = other, "unknown strategy type, using ev");
                }
                Arc::new(EvStrategy::new(self.to_params()))
            }
        }
    }
}

impl BotProfilesFile {
    /// Strategy for `difficulty`: the production profile when one is mapped,
    /// the built-in tier otherwise.
    pub fn strategy_for(&self, difficulty: AiDifficulty) -> Arc<dyn BotStrategy> {
        let builtin = AiPolicy::default();
        match self.production.resolve(difficulty) {
            Some(name) => match self.profiles.get(name) {
                Some(profile) => profile.build_strategy(),
                None => {
                    tracing::warn!(profile = name, tier = difficulty.as_str(), "production profile not defined");
                    builtin.strategy(difficulty)
                }
            },
            None => builtin.strategy(difficulty),
        }
    }

    pub fn policy(&self) -> AiPolicy {
        AiPolicy {
            easy: self.strategy_for(AiDifficulty::Easy),
            medium: self.strategy_for(AiDifficulty::Medium),
            hard: self.strategy_for(AiDifficulty::Hard),
        }
    }

    /// Strategy by profile name, or by tier name when no profile matches.
    pub fn named_strategy(&self, name: &str) -> Option<Arc<dyn BotStrategy>> {
        if let Some(profile) = self.profiles.get(name) {
            return Some(profile.build_strategy());
        }
        name.parse::<AiDifficulty>().ok().map(|d| self.strategy_for(d))
    }
}

/// Load profiles from a TOML file at the given path.
pub fn load_profiles(path: &Path) -> Result<BotProfilesFile, ProfileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ProfileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load from `explicit`, then from `HALFCOURT_BOT_PROFILES`, then from
/// well-known paths. Falls back to built-in tiers; never fails.
pub fn load_default_profiles(explicit: Option<&Path>) -> BotProfilesFile {
    let from_env = std::env::var_os(PROFILES_ENV).map(PathBuf::from);
    let mut candidates: Vec<PathBuf> = explicit.map(Path::to_path_buf).into_iter().chain(from_env).collect();
    candidates.extend(
        ["bot_profiles.toml", "../bot_profiles.toml", "/etc/halfcourt/bot_profiles.toml"]
            .iter()
            .map(PathBuf::from),
    );

    for p in &candidates {
        if p.exists() {
            match load_profiles(p) {
                Ok(profiles) => {
                    tracing::info!(path = %p.display(), count = profiles.profiles.len(), "loaded bot profiles");
                    return profiles;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load bot profiles");
                }
            }
        }
    }
    tracing::info!("no bot_profiles.toml found, using built-in tiers");
    BotProfilesFile::default()
}
