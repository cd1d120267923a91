//! End-to-end timelines driven through the manager: triggers in, ticked
//! worlds out, checked against the classic timings.

use std::sync::mpsc::channel;

use glam::Vec2;
use specials::env::delay::DelayedSpawn;
use specials::env::lights::LightChange;
use specials::{
    ActivationContext, FreeMove, Level, LineDef, PlaneKind, Random, Sector, SideDef, Special,
    SpecialManager, SpeedCode, TeleportZ, Thing, Trigger, TriggerKind, LIFTWAIT, VDOORWAIT,
};

/// A small hub: room 0 with the trigger lines, a door sector (1, tag 1), a
/// lift sector (2, tag 2) over a pit (3), and a teleport pad room (4, tag 4).
fn hub_level() -> Level {
    let mut room = Sector::new(0, 0, 0.0, 128.0, 200);
    let mut door = Sector::new(1, 1, 0.0, 0.0, 120);
    let mut lift = Sector::new(2, 2, 64.0, 128.0, 160);
    let mut pit = Sector::new(3, 0, 0.0, 128.0, 120);
    let pad = Sector::new(4, 4, 16.0, 128.0, 160);

    room.lines.extend([0, 1, 2]);
    door.lines.push(0);
    lift.lines.extend([1, 3]);
    pit.lines.push(3);

    let mut l0 = LineDef::new(0, 1, 0, 0);
    l0.back_sector = Some(1);
    l0.back_sidedef = Some(1);
    let mut l1 = LineDef::new(1, 2, 0, 2);
    l1.back_sector = Some(2);
    l1.back_sidedef = Some(3);
    // Walk-over teleport line, no sector behind needed for the test.
    let l2 = LineDef::new(2, 0, 0, 4);
    let mut l3 = LineDef::new(3, 0, 2, 5);
    l3.back_sector = Some(3);
    l3.back_sidedef = Some(6);

    let sides = vec![
        SideDef::new(0),
        SideDef::new(1),
        SideDef::new(0),
        SideDef::new(2),
        SideDef::new(0),
        SideDef::new(2),
        SideDef::new(3),
    ];

    let mut traveller = Thing::new(0, Vec2::new(32.0, 32.0), 0.0, 0);
    traveller.player = true;
    let mut spot = Thing::new(1, Vec2::new(500.0, 500.0), 16.0, 4);
    spot.teleport_spot = true;
    spot.shootable = false;

    let (tx, _rx) = channel();
    let mut level = Level::new(
        vec![room, door, lift, pit, pad],
        vec![l0, l1, l2, l3],
        sides,
        vec![traveller, spot],
        Random::new(),
        tx,
    );
    level.sectors[0].things.push(0);
    level.sectors[4].things.push(1);
    level
}

fn tick_n(manager: &mut SpecialManager, level: &mut Level, n: u32) {
    let mut resolver = FreeMove;
    for _ in 0..n {
        manager.ticker(level, &mut resolver);
    }
}

#[test]
fn slow_door_timeline() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let trigger = Trigger {
        line: 0,
        kind: TriggerKind::DoorOpenClose {
            speed: SpeedCode::SLOW,
            delay: VDOORWAIT,
        },
        context: ActivationContext::Use,
        repeatable: true,
    };
    assert!(manager.try_activate(&mut level, &trigger, Some(0)));

    // Opens at 2/tick toward 124 (lowest neighbouring ceiling 128, minus 4).
    tick_n(&mut manager, &mut level, 62);
    assert_eq!(level.sectors[1].ceiling.z, 124.0);
    // Holding: still open for the full wait.
    tick_n(&mut manager, &mut level, VDOORWAIT);
    assert_eq!(level.sectors[1].ceiling.z, 124.0);
    // Closing leg.
    tick_n(&mut manager, &mut level, 62);
    assert_eq!(level.sectors[1].ceiling.z, 0.0);
    assert_eq!(manager.active_count(), 0);
    assert!(level.sectors[1].owner(PlaneKind::Ceiling).is_none());
}

#[test]
fn lift_timeline_and_reactivation() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let trigger = Trigger {
        line: 1,
        kind: TriggerKind::Lift {
            speed: SpeedCode::NORMAL,
            delay: LIFTWAIT,
        },
        context: ActivationContext::Use,
        repeatable: true,
    };
    assert!(manager.try_activate(&mut level, &trigger, Some(0)));

    // Down 64 units at 4/tick = 16 ticks to the pit floor.
    tick_n(&mut manager, &mut level, 16);
    assert_eq!(level.sectors[2].floor.z, 0.0);
    // Waits, rises, and unregisters.
    tick_n(&mut manager, &mut level, LIFTWAIT + 17);
    assert_eq!(level.sectors[2].floor.z, 64.0);
    assert_eq!(manager.active_count(), 0);
    // The repeatable line works again afterwards.
    assert!(manager.try_activate(&mut level, &trigger, Some(0)));
}

#[test]
fn busy_plane_rejects_second_mover_but_allows_other_plane() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let door = Trigger {
        line: 0,
        kind: TriggerKind::DoorOpenClose {
            speed: SpeedCode::SLOW,
            delay: VDOORWAIT,
        },
        context: ActivationContext::Use,
        repeatable: true,
    };
    assert!(manager.try_activate(&mut level, &door, Some(0)));
    tick_n(&mut manager, &mut level, 5);

    // A second ceiling mover on the same sector is refused outright.
    let close = Trigger {
        line: 0,
        kind: TriggerKind::DoorClose {
            speed: SpeedCode::SLOW,
        },
        context: ActivationContext::Cross,
        repeatable: true,
    };
    assert!(!manager.try_activate(&mut level, &close, Some(0)));
    assert_eq!(manager.active_count(), 1);

    // The floor plane of the same sector is free.
    let floor = Trigger {
        line: 0,
        kind: TriggerKind::FloorRaiseBy {
            speed: SpeedCode::SLOW,
            amount: 8.0,
        },
        context: ActivationContext::Use,
        repeatable: true,
    };
    assert!(manager.try_activate(&mut level, &floor, Some(0)));
    assert_eq!(manager.active_count(), 2);
}

#[test]
fn teleport_resolves_one_tick_after_activation() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let trigger = Trigger {
        line: 2,
        kind: TriggerKind::Teleport {
            tid: 0,
            tag: 4,
            z: TeleportZ::DestFloor,
            reverse_angle: false,
        },
        context: ActivationContext::Cross,
        repeatable: true,
    };
    assert!(manager.try_activate(&mut level, &trigger, Some(0)));
    // Registered, not yet resolved.
    assert_eq!(level.things[0].sector, 0);
    tick_n(&mut manager, &mut level, 1);
    assert_eq!(level.things[0].sector, 4);
    assert_eq!(level.things[0].pos, Vec2::new(500.0, 500.0));
    assert_eq!(level.things[0].z, 16.0);
    assert_eq!(manager.active_count(), 0);
}

#[test]
fn unaddressed_teleport_line_fails() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let trigger = Trigger {
        line: 2,
        kind: TriggerKind::Teleport {
            tid: 0,
            tag: 0,
            z: TeleportZ::DestFloor,
            reverse_angle: false,
        },
        context: ActivationContext::Cross,
        repeatable: false,
    };
    assert!(!manager.try_activate(&mut level, &trigger, Some(0)));
    // Failure leaves even a one-shot line armed.
    assert!(!level.lines[2].activated);
}

#[test]
fn perpetual_platform_runs_until_stopped() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let start = Trigger {
        line: 1,
        kind: TriggerKind::PlatPerpetual {
            speed: SpeedCode::NORMAL,
            delay: 35,
            lip: 0.0,
        },
        context: ActivationContext::Cross,
        repeatable: true,
    };
    assert!(manager.try_activate(&mut level, &start, Some(0)));
    tick_n(&mut manager, &mut level, 400);
    assert_eq!(manager.active_count(), 1);

    let stop = Trigger {
        line: 1,
        kind: TriggerKind::PlatStop,
        context: ActivationContext::Cross,
        repeatable: true,
    };
    assert!(manager.try_activate(&mut level, &stop, Some(0)));
    assert_eq!(manager.active_count(), 0);
    assert!(level.sectors[2].owner(PlaneKind::Floor).is_none());
    let frozen = level.sectors[2].floor.z;
    tick_n(&mut manager, &mut level, 50);
    assert_eq!(level.sectors[2].floor.z, frozen);
}

#[test]
fn delayed_special_fires_on_schedule() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let fade = Special::LightChange(LightChange::new(0, 0, 0));
    manager.add_special(&mut level, Special::Delayed(DelayedSpawn::new(5, fade)));

    // Five held ticks plus the releasing tick; the payload itself first
    // runs on the following pass.
    tick_n(&mut manager, &mut level, 6);
    assert_eq!(level.sectors[0].lightlevel, 200);
    tick_n(&mut manager, &mut level, 1);
    assert_eq!(level.sectors[0].lightlevel, 0);
    assert_eq!(manager.active_count(), 0);
}

#[test]
fn exit_trigger_latches_exit_action() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let trigger = Trigger {
        line: 2,
        kind: TriggerKind::DelayedExit {
            tics: 3,
            secret: false,
        },
        context: ActivationContext::Use,
        repeatable: false,
    };
    assert!(manager.try_activate(&mut level, &trigger, Some(0)));
    tick_n(&mut manager, &mut level, 3);
    assert!(level.exit.is_none());
    tick_n(&mut manager, &mut level, 2);
    assert_eq!(level.exit, Some(specials::ExitAction::Normal));
}

#[test]
fn identical_input_sequences_produce_identical_worlds() {
    let run = || {
        let mut level = hub_level();
        let mut manager = SpecialManager::new();
        manager.spawn_level_specials(&mut level);
        let door = Trigger {
            line: 0,
            kind: TriggerKind::DoorOpenClose {
                speed: SpeedCode::SLOW,
                delay: VDOORWAIT,
            },
            context: ActivationContext::Use,
            repeatable: true,
        };
        let plat = Trigger {
            line: 1,
            kind: TriggerKind::PlatPerpetual {
                speed: SpeedCode::NORMAL,
                delay: 35,
                lip: 0.0,
            },
            context: ActivationContext::Cross,
            repeatable: true,
        };
        manager.try_activate(&mut level, &door, Some(0));
        tick_n(&mut manager, &mut level, 17);
        manager.try_activate(&mut level, &plat, Some(0));
        tick_n(&mut manager, &mut level, 500);
        (
            level.sectors.iter().map(|s| s.floor.z).collect::<Vec<_>>(),
            level.sectors.iter().map(|s| s.ceiling.z).collect::<Vec<_>>(),
            level
                .sectors
                .iter()
                .map(|s| s.lightlevel)
                .collect::<Vec<_>>(),
            level.rng.index(),
        )
    };
    assert_eq!(run(), run());
}

#[test]
fn snapshot_mid_scene_resumes_identically() {
    let mut level = hub_level();
    let mut manager = SpecialManager::new();
    let door = Trigger {
        line: 0,
        kind: TriggerKind::DoorOpenClose {
            speed: SpeedCode::SLOW,
            delay: VDOORWAIT,
        },
        context: ActivationContext::Use,
        repeatable: true,
    };
    let lift = Trigger {
        line: 1,
        kind: TriggerKind::Lift {
            speed: SpeedCode::NORMAL,
            delay: LIFTWAIT,
        },
        context: ActivationContext::Use,
        repeatable: true,
    };
    manager.try_activate(&mut level, &door, Some(0));
    manager.try_activate(&mut level, &lift, Some(0));
    tick_n(&mut manager, &mut level, 20);

    let bytes = specials::save::encode(&manager.snapshot(&level)).unwrap();

    // Clone the geometry state, restore the specials, and race the two
    // worlds forward.
    let mut level2 = hub_level();
    for (a, b) in level2.sectors.iter_mut().zip(level.sectors.iter()) {
        a.floor.z = b.floor.z;
        a.floor.prev_z = b.floor.prev_z;
        a.ceiling.z = b.ceiling.z;
        a.ceiling.prev_z = b.ceiling.prev_z;
    }
    let mut manager2 = SpecialManager::new();
    let snapshot = specials::save::decode(&bytes).unwrap();
    assert_eq!(manager2.restore(&mut level2, &snapshot), 2);

    for _ in 0..400 {
        tick_n(&mut manager, &mut level, 1);
        tick_n(&mut manager2, &mut level2, 1);
        assert_eq!(level.sectors[1].ceiling.z, level2.sectors[1].ceiling.z);
        assert_eq!(level.sectors[2].floor.z, level2.sectors[2].floor.z);
    }
    assert_eq!(manager.active_count(), manager2.active_count());
}
