//! Turns master-data characters and enemies into engine seeds.
//!
//! Preparation runs the whole leaves-first pipeline for one actor: resolve
//! race, job and items, take the pre-skill attribute snapshot, compile every
//! granted skill against it, run the stat calculator, and package the result
//! as a [`BattleActorSeed`].

use crate::effect::DecodeError;
use crate::engine::{BattleActorSeed, BattleError, SetupError};
use crate::env::{BattleEnv, ItemDefinition, JobDefinition, RaceDefinition};
use crate::skills::{CompiledSkills, ScalingContext, SkillCompiler};
use crate::stats::{StatInputs, base_attributes, calculate};
use crate::types::{ActorIndex, EnemyId, ItemId, JobId, RaceId, Row, Side, SkillId, SpellId};

/// A party member as stored by the game.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerCharacter {
    pub character_id: u16,
    pub race: RaceId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub job: Option<JobId>,
    pub level: u16,
    /// Learned skills, on top of what race, job and equipment grant.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub equipment: Vec<ItemId>,
    /// Spells in preference order; the spellbook decides which are usable.
    #[cfg_attr(feature = "serde", serde(default))]
    pub spells: Vec<SpellId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub row: Row,
}

/// A seed plus what compiling its skills left behind.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedActor {
    pub seed: BattleActorSeed,
    pub compiled: CompiledSkills,
}

impl PreparedActor {
    /// Skill rows that failed to decode and were skipped.
    pub fn rejected(&self) -> &[DecodeError] {
        &self.compiled.rejected
    }
}

struct Loadout {
    race: RaceDefinition,
    job: Option<JobDefinition>,
    items: Vec<ItemDefinition>,
}

impl Loadout {
    fn resolve(
        env: &BattleEnv<'_>,
        race: RaceId,
        job: Option<JobId>,
        items: &[ItemId],
    ) -> Result<Self, BattleError> {
        Ok(Self {
            race: env.race(race)?,
            job: job.map(|id| env.job(id)).transpose()?,
            items: items
                .iter()
                .map(|id| env.item(*id))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Race skills, then job skills, then item skills, then `extra`.
    fn skills(&self, extra: &[SkillId]) -> Vec<SkillId> {
        let mut skills = self.race.skills.clone();
        if let Some(job) = &self.job {
            skills.extend(&job.skills);
        }
        for item in &self.items {
            skills.extend(&item.skills);
        }
        skills.extend(extra);
        skills
    }

    /// Unarmed, or armed with a martial weapon.
    fn martial(&self) -> bool {
        let mut weapons = self
            .items
            .iter()
            .filter(|item| item.category.is_weapon())
            .peekable();
        weapons.peek().is_none() || weapons.any(|item| item.category.is_martial())
    }

    fn build(
        &self,
        env: &BattleEnv<'_>,
        level: u16,
        skills: &[SkillId],
        index: ActorIndex,
        side: Side,
    ) -> Result<(BattleActorSeed, CompiledSkills), BattleError> {
        let scaling = ScalingContext::new(level)
            .with_attributes(base_attributes(&self.race, &self.items));
        let compiled = SkillCompiler::new(*env).compile(&self.skills(skills), &scaling)?;
        let snapshot = calculate(&StatInputs {
            level,
            race: &self.race,
            job: self.job.as_ref(),
            items: &self.items,
            modifiers: &compiled.stats,
        });
        let seed = BattleActorSeed::new(index, side, snapshot)
            .with_level(level)
            .with_effects(compiled.battle.clone())
            .with_martial(self.martial());
        Ok((seed, compiled))
    }
}

/// Prepares a party member.
///
/// Spells the compiled spellbook does not permit are dropped.
pub fn prepare_player(
    env: &BattleEnv<'_>,
    character: &PlayerCharacter,
) -> Result<PreparedActor, BattleError> {
    let loadout = Loadout::resolve(env, character.race, character.job, &character.equipment)?;
    let (seed, compiled) = loadout.build(
        env,
        character.level,
        &character.skills,
        ActorIndex::player(character.character_id),
        Side::Player,
    )?;

    let mut spells = Vec::with_capacity(character.spells.len());
    for id in &character.spells {
        if compiled.spellbook.permits(&env.spell(*id)?) {
            spells.push(*id);
        }
    }

    Ok(PreparedActor {
        seed: seed
            .with_master_id(character.character_id)
            .with_row(character.row)
            .with_spells(spells),
        compiled,
    })
}

/// Prepares the enemy in roster slot `slot`.
pub fn prepare_enemy(
    env: &BattleEnv<'_>,
    slot: u16,
    enemy: EnemyId,
) -> Result<PreparedActor, BattleError> {
    let definition = env.enemy(enemy)?;
    let index = ActorIndex::enemy(slot, enemy)
        .ok_or(SetupError::EnemyIndexOutOfRange { slot, enemy })?;
    let loadout = Loadout::resolve(env, definition.race, definition.job, &[])?;
    let (mut seed, compiled) =
        loadout.build(env, definition.level, &definition.skills, index, Side::Enemy)?;
    seed.action_rates = definition.action_rates;

    Ok(PreparedActor {
        seed: seed
            .with_master_id(enemy.0)
            .with_row(definition.row)
            .with_spells(definition.spells),
        compiled,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::effect::{EffectType, ParamKey, RawEffect, ValueKey};
    use crate::env::{
        EnemyDefinition, MasterData, OracleError, SkillDefinition, SpellDefinition, SpellKind,
        SpellTarget,
    };
    use crate::types::{ActionChoice, Attribute, DamageType, EquipmentCategory};

    fn spell(id: u8, tier: u8) -> SpellDefinition {
        SpellDefinition {
            id: SpellId(id),
            kind: SpellKind::Damage,
            target: SpellTarget::SingleEnemy,
            power: 1.0,
            charges: 2,
            status: None,
            tier,
        }
    }

    fn master() -> MasterData {
        MasterData::new()
            .with_race(RaceDefinition {
                id: RaceId(1),
                attributes: BTreeMap::from([(Attribute::Agility, 12), (Attribute::Strength, 15)]),
                skills: vec![SkillId(10)],
            })
            .with_item(ItemDefinition {
                id: ItemId(1),
                category: EquipmentCategory::Sword,
                stats: BTreeMap::new(),
                attributes: BTreeMap::new(),
                skills: Vec::new(),
            })
            .with_item(ItemDefinition {
                id: ItemId(2),
                category: EquipmentCategory::Gauntlet,
                stats: BTreeMap::new(),
                attributes: BTreeMap::new(),
                skills: Vec::new(),
            })
            .with_skill(SkillDefinition::new(
                SkillId(10),
                vec![
                    RawEffect::new(EffectType::DamageDealtPercent)
                        .with_param(ParamKey::DamageType, 0)
                        .with_value(ValueKey::Percent, 20.0),
                ],
            ))
            .with_skill(SkillDefinition::new(
                SkillId(11),
                vec![RawEffect::new(EffectType::SpellbookTierUnlock).with_param(ParamKey::Tier, 1)],
            ))
            .with_spell(spell(1, 1))
            .with_spell(spell(2, 3))
            .with_enemy(EnemyDefinition {
                id: EnemyId(7),
                level: 12,
                race: RaceId(1),
                job: None,
                skills: Vec::new(),
                spells: vec![SpellId(2)],
                action_rates: BTreeMap::from([(ActionChoice::Spell, 2.0)]),
                row: Row::Back,
            })
    }

    fn character() -> PlayerCharacter {
        PlayerCharacter {
            character_id: 4,
            race: RaceId(1),
            job: None,
            level: 8,
            skills: vec![SkillId(11)],
            equipment: vec![ItemId(1)],
            spells: vec![SpellId(1), SpellId(2)],
            row: Row::Front,
        }
    }

    #[test]
    fn player_seed_carries_race_skills_and_permitted_spells() {
        let master = master();
        let prepared = prepare_player(&BattleEnv::with_all(&master), &character()).unwrap();
        let seed = &prepared.seed;

        assert_eq!(seed.index, ActorIndex(4));
        assert_eq!(seed.master_id, 4);
        assert_eq!(seed.level, 8);
        assert_eq!(seed.spells, vec![SpellId(1)]);
        assert!(!seed.martial);
        assert!((seed.effects.damage.dealt[DamageType::Physical].value() - 1.2).abs() < 1e-12);
        assert!(prepared.rejected().is_empty());
    }

    #[test]
    fn unarmed_or_gauntlets_count_as_martial() {
        let master = master();
        let env = BattleEnv::with_all(&master);
        let unarmed = PlayerCharacter {
            equipment: Vec::new(),
            ..character()
        };
        let gauntlets = PlayerCharacter {
            equipment: vec![ItemId(2)],
            ..character()
        };
        assert!(prepare_player(&env, &unarmed).unwrap().seed.martial);
        assert!(prepare_player(&env, &gauntlets).unwrap().seed.martial);
    }

    #[test]
    fn enemy_seed_uses_the_slot_index_and_master_rates() {
        let master = master();
        let prepared = prepare_enemy(&BattleEnv::with_all(&master), 2, EnemyId(7)).unwrap();
        let seed = prepared.seed;

        assert_eq!(seed.index, ActorIndex(3007));
        assert_eq!(seed.side, Side::Enemy);
        assert_eq!(seed.master_id, 7);
        assert_eq!(seed.level, 12);
        assert_eq!(seed.row, Row::Back);
        assert_eq!(seed.spells, vec![SpellId(2)]);
        assert_eq!(seed.action_rates.get(&ActionChoice::Spell), Some(&2.0));
    }

    #[test]
    fn unknown_references_fail_preparation() {
        let master = master();
        let env = BattleEnv::with_all(&master);
        let err = prepare_enemy(&env, 0, EnemyId(99)).unwrap_err();
        assert_eq!(err, BattleError::Oracle(OracleError::EnemyNotFound(EnemyId(99))));

        let err = prepare_enemy(&env, 70, EnemyId(7)).unwrap_err();
        assert_eq!(
            err,
            BattleError::Setup(SetupError::EnemyIndexOutOfRange {
                slot: 70,
                enemy: EnemyId(7)
            })
        );
    }
}
