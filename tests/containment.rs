mod common;

use common::{app_with_zones, spawn_actor, test_zone, tick};
use gaszone_sim::ecs::{GasStatus, OutboundStatus, Position};
use gaszone_sim::model::{HazardType, Vec3};

fn drain_pushes(app: &mut bevy_app::App) -> Vec<gaszone_sim::ecs::StatusPush> {
    app.world_mut()
        .resource_mut::<OutboundStatus>()
        .0
        .drain(..)
        .collect()
}

#[test]
fn actor_inside_zone_resolves_status() {
    let mut app = app_with_zones(vec![test_zone("a", 0.0, 0.0, 3, HazardType::Nerve)]);
    let actor = spawn_actor(&mut app, Vec3::new(10.0, 0.0, 10.0));
    tick(&mut app, 1);

    let status = app.world().get::<GasStatus>(actor).unwrap();
    assert!(status.in_zone);
    assert_eq!(status.zone_id, "a");
    assert_eq!(status.tier, 3);
    assert_eq!(status.hazard, HazardType::Nerve);
}

#[test]
fn actor_outside_zone_is_clear() {
    let mut app = app_with_zones(vec![test_zone("a", 0.0, 0.0, 3, HazardType::Toxic)]);
    let actor = spawn_actor(&mut app, Vec3::new(500.0, 0.0, 0.0));
    tick(&mut app, 1);

    let status = app.world().get::<GasStatus>(actor).unwrap();
    assert!(!status.in_zone);
    assert!(status.zone_id.is_empty());
    assert_eq!(status.tier, 0);
}

#[test]
fn vertical_band_excludes_high_positions() {
    // Band on flat terrain at 0: base -5, top -5 + 30 + 2 = 27.
    let mut app = app_with_zones(vec![test_zone("a", 0.0, 0.0, 2, HazardType::Toxic)]);
    let inside = spawn_actor(&mut app, Vec3::new(0.0, 27.0, 0.0));
    let above = spawn_actor(&mut app, Vec3::new(0.0, 27.1, 0.0));
    tick(&mut app, 1);

    assert!(app.world().get::<GasStatus>(inside).unwrap().in_zone);
    assert!(!app.world().get::<GasStatus>(above).unwrap().in_zone);
}

#[test]
fn overlapping_zones_resolve_to_highest_tier() {
    let mut app = app_with_zones(vec![
        test_zone("weak", 0.0, 0.0, 1, HazardType::Toxic),
        test_zone("strong", 20.0, 0.0, 4, HazardType::Bio),
        test_zone("mid", -20.0, 0.0, 2, HazardType::Nerve),
    ]);
    let actor = spawn_actor(&mut app, Vec3::new(0.0, 0.0, 0.0));
    tick(&mut app, 1);

    let status = app.world().get::<GasStatus>(actor).unwrap();
    assert_eq!(status.zone_id, "strong");
    assert_eq!(status.tier, 4);
    assert_eq!(status.hazard, HazardType::Bio);
}

#[test]
fn status_pushed_on_change_and_keepalive_only() {
    let mut app = app_with_zones(vec![test_zone("a", 0.0, 0.0, 2, HazardType::Toxic)]);
    let actor = spawn_actor(&mut app, Vec3::new(0.0, 0.0, 0.0));

    // First tick: nothing synced yet, so one push.
    tick(&mut app, 1);
    let pushes = drain_pushes(&mut app);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].entity, actor);
    assert!(pushes[0].in_gas);
    assert_eq!(pushes[0].tier, 2);

    // Next four ticks (1s..4s): unchanged, inside keepalive window.
    tick(&mut app, 4);
    assert!(drain_pushes(&mut app).is_empty());

    // Fifth second hits the keepalive.
    tick(&mut app, 1);
    let pushes = drain_pushes(&mut app);
    assert_eq!(pushes.len(), 1);
    assert!(pushes[0].in_gas);
}

#[test]
fn leaving_zone_pushes_clear_status() {
    let mut app = app_with_zones(vec![test_zone("a", 0.0, 0.0, 2, HazardType::Toxic)]);
    let actor = spawn_actor(&mut app, Vec3::new(0.0, 0.0, 0.0));
    tick(&mut app, 1);
    drain_pushes(&mut app);

    app.world_mut().get_mut::<Position>(actor).unwrap().0 = Vec3::new(1000.0, 0.0, 0.0);
    tick(&mut app, 1);

    let pushes = drain_pushes(&mut app);
    assert_eq!(pushes.len(), 1);
    assert!(!pushes[0].in_gas);
    assert_eq!(pushes[0].tier, 0);
}

#[test]
fn leaving_zone_clears_hazard_with_the_rest() {
    let mut app = app_with_zones(vec![test_zone("a", 0.0, 0.0, 3, HazardType::Nerve)]);
    let actor = spawn_actor(&mut app, Vec3::new(0.0, 0.0, 0.0));
    tick(&mut app, 1);
    drain_pushes(&mut app);

    app.world_mut().get_mut::<Position>(actor).unwrap().0 = Vec3::new(1000.0, 0.0, 0.0);
    tick(&mut app, 1);

    // The clear push must not carry the stale nerve hazard.
    let pushes = drain_pushes(&mut app);
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].hazard, HazardType::default());

    let status = app.world().get::<GasStatus>(actor).unwrap();
    assert_eq!(status.hazard, HazardType::default());
}
