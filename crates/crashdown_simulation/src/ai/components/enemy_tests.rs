//! Tests for enemy components.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::ai::{AiState, AiType, EnemyBrain, EnemyConfig};
    use crate::combat::WeaponDefinition;

    fn two_weapon_config() -> EnemyConfig {
        EnemyConfig {
            weapons_cycle: vec![
                Arc::new(WeaponDefinition::blaster()),
                Arc::new(WeaponDefinition::scatter()),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_attack_cycle_wraps() {
        let config = two_weapon_config();
        let mut brain = EnemyBrain::default();

        assert_eq!(brain.current_weapon(&config).map(|w| w.name.as_str()), Some("Blaster"));
        brain.advance_to_next_attack(config.weapons_cycle.len());
        assert_eq!(brain.current_weapon(&config).map(|w| w.name.as_str()), Some("Scatter"));
        brain.advance_to_next_attack(config.weapons_cycle.len());
        assert_eq!(brain.current_attack, 0);
    }

    #[test]
    fn test_empty_cycle_has_no_weapon() {
        let config = EnemyConfig::default();
        let mut brain = EnemyBrain::default();
        assert!(brain.current_weapon(&config).is_none());

        // Пустой цикл не паникует
        brain.advance_to_next_attack(0);
        assert_eq!(brain.current_attack, 0);
    }

    #[test]
    fn test_new_brain_state() {
        let brain = EnemyBrain::default();
        assert_eq!(brain.state, AiState::JustSpawned);
        assert!(brain.can_attack());
        assert!(!brain.is_enraged());
    }

    #[test]
    fn test_unknown_ai_type_deserializes_as_unrecognized() {
        let ai_type: AiType = serde_json::from_str("\"Teleporter\"").unwrap();
        assert_eq!(ai_type, AiType::Unrecognized);

        let ai_type: AiType = serde_json::from_str("\"OneTimeEnemySpawner\"").unwrap();
        assert_eq!(ai_type, AiType::OneTimeEnemySpawner);
    }
}
