use bevy_ecs::entity::Entity;
use bevy_ecs::message::Message;

/// Reactive events emitted by the hazard systems for observers
/// (effect playback, client notification, logging).
#[derive(Message, Clone, Debug, PartialEq)]
pub enum HazardEvent {
    CoughTriggered { entity: Entity },
    SneezeTriggered { entity: Entity },
    BleedingWound { entity: Entity },
    WoundInfected { entity: Entity },
    BioInfectionLatched { entity: Entity },
    NervePermanentLatched { entity: Entity },
    SicknessStageChanged { entity: Entity, stage: u8 },
    GasStatusChanged { entity: Entity },
}
