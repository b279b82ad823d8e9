//! Core types for the matching game engine.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Which face of a pair a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSide {
    Word,
    Picture,
}

/// Deck-unique card identifier, derived deterministically from
/// (level, pair id, side) so re-deriving for the same level is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u64);

impl CardId {
    /// Pack level, pair id and side into one id. Levels and pair ids are
    /// 32-bit, so the packing cannot collide across levels or sides.
    pub fn derive(level: u32, pair_id: u32, side: CardSide) -> Self {
        let side_bit = match side {
            CardSide::Word => 0,
            CardSide::Picture => 1,
        };
        Self(((level as u64) << 33) | ((pair_id as u64) << 1) | side_bit)
    }
}

/// An authored word/image association, unique by `id` within its level.
/// Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pair {
    pub id: u32,
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Secondary label (e.g. a translation) shown on the picture-side card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Pair {
    /// Content of the picture-side card: the secondary label when present,
    /// otherwise the word itself.
    pub fn picture_content(&self) -> &str {
        self.translation.as_deref().unwrap_or(&self.word)
    }
}

/// One playable face derived from a [`Pair`]. Two cards exist per pair;
/// they match iff their `pair_id`s are equal, regardless of side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub pair_id: u32,
    pub side: CardSide,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub face_up: bool,
    pub matched: bool,
}

/// An ordered stage of the game with its own pair set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// 1-based level number; templates must number levels 1..=n with no gaps.
    pub level: u32,
    pub title: String,
    pub pairs: Vec<Pair>,
}

/// The immutable game definition a host supplies once per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameTemplate {
    pub activity_name: String,
    pub max_score: u32,
    pub max_exp: i32,
    pub levels: Vec<Level>,
}

impl GameTemplate {
    /// Check the template is playable: at least one level, each level
    /// numbered sequentially from 1, non-empty, with unique pair ids.
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyGame);
        }
        for (idx, level) in self.levels.iter().enumerate() {
            let expected = idx as u32 + 1;
            if level.level != expected {
                return Err(ConfigError::NonSequentialLevel {
                    expected,
                    found: level.level,
                });
            }
            if level.pairs.is_empty() {
                return Err(ConfigError::EmptyLevel { level: level.level });
            }
            let mut seen = std::collections::HashSet::new();
            for pair in &level.pairs {
                if !seen.insert(pair.id) {
                    return Err(ConfigError::DuplicatePairId {
                        level: level.level,
                        id: pair.id,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Look up a level by its 1-based number.
    pub fn level(&self, number: u32) -> Option<&Level> {
        self.levels.get(number.checked_sub(1)? as usize)
    }
}

/// What happens after the final level is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Practice flow: the player may restart and replay.
    Replayable,
    /// Assigned flow: completion is terminal, the host navigates away.
    Terminal,
}

/// Host-supplied scoring configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Points awarded per matched pair.
    pub match_reward: u32,
    /// Points deducted per mismatch; the running score saturates at 0.
    pub mismatch_penalty: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            match_reward: 10,
            mismatch_penalty: 5,
        }
    }
}

/// The one-time outcome message sent to the host at game completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub final_score: u32,
    pub elapsed_seconds: u64,
    pub exp_reward: i32,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pair(id: u32) -> Pair {
        Pair {
            id,
            word: format!("word-{id}"),
            image: None,
            translation: None,
        }
    }

    fn level(number: u32, pair_ids: &[u32]) -> Level {
        Level {
            level: number,
            title: format!("Level {number}"),
            pairs: pair_ids.iter().copied().map(pair).collect(),
        }
    }

    fn template(levels: Vec<Level>) -> GameTemplate {
        GameTemplate {
            activity_name: "Animals".to_string(),
            max_score: 100,
            max_exp: 50,
            levels,
        }
    }

    #[test]
    fn card_ids_distinct_across_sides_and_levels() {
        let word = CardId::derive(1, 7, CardSide::Word);
        let picture = CardId::derive(1, 7, CardSide::Picture);
        assert_ne!(word, picture);
        assert_ne!(word, CardId::derive(2, 7, CardSide::Word));
        // Same inputs always re-derive the same id.
        assert_eq!(word, CardId::derive(1, 7, CardSide::Word));
    }

    #[test]
    fn picture_content_prefers_translation() {
        let mut p = pair(1);
        assert_eq!(p.picture_content(), "word-1");
        p.translation = Some("cat".to_string());
        assert_eq!(p.picture_content(), "cat");
    }

    #[test]
    fn validate_accepts_sequential_levels() {
        let t = template(vec![level(1, &[1, 2]), level(2, &[1])]);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_game() {
        let t = template(vec![]);
        assert!(matches!(t.validate(), Err(ConfigError::EmptyGame)));
    }

    #[test]
    fn validate_rejects_empty_level() {
        let t = template(vec![level(1, &[])]);
        assert!(matches!(
            t.validate(),
            Err(ConfigError::EmptyLevel { level: 1 })
        ));
    }

    #[test]
    fn validate_rejects_gap_in_level_numbers() {
        let t = template(vec![level(1, &[1]), level(3, &[1])]);
        assert!(matches!(
            t.validate(),
            Err(ConfigError::NonSequentialLevel {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_pair_ids() {
        let t = template(vec![level(1, &[1, 1])]);
        assert!(matches!(
            t.validate(),
            Err(ConfigError::DuplicatePairId { level: 1, id: 1 })
        ));
    }

    #[test]
    fn template_deserializes_from_host_json() {
        let json = r#"{
            "activityName": "Animals",
            "maxScore": 100,
            "maxExp": 50,
            "levels": [
                {
                    "level": 1,
                    "title": "Pets",
                    "pairs": [
                        { "id": 1, "word": "gato", "image": "cat.png", "translation": "cat" },
                        { "id": 2, "word": "perro" }
                    ]
                }
            ]
        }"#;
        let t: GameTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(t.activity_name, "Animals");
        assert_eq!(t.levels[0].pairs.len(), 2);
        assert_eq!(t.levels[0].pairs[0].picture_content(), "cat");
        assert!(t.validate().is_ok());
    }
}
