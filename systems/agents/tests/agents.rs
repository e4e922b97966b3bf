use glam::Vec3;
use horde_defence_core::{
    AgentId, AgentKind, KindTuning, Locomotion, Obstacle, ObstacleKind, Zone, ZoneTable,
    ZoneTuning,
};
use horde_defence_system_agents::{Agent, Death, Lifecycle, AVOIDANCE_DURATION};
use horde_defence_system_obstacles::ObstacleField;

fn tuning(speed: f32, locomotion: Locomotion) -> KindTuning {
    KindTuning {
        health: 60.0,
        speed,
        reward: 25,
        hit_radius: 1.0,
        scale: 1.0,
        spawn_weight: 1.0,
        locomotion,
        ground_locked: true,
    }
}

fn steering_agent(position: Vec3) -> Agent {
    Agent::new(
        AgentKind::Grunt,
        &tuning(3.0, Locomotion::Steering),
        3.0,
        position,
    )
}

fn zones() -> ZoneTable {
    ZoneTable {
        core: Some(ZoneTuning::NEUTRAL),
        head: Some(ZoneTuning {
            damage_multiplier: 2.0,
            score_multiplier: 1.5,
        }),
    }
}

fn field_with(position: Vec3, radius: f32) -> ObstacleField {
    let mut field = ObstacleField::new();
    field.register(Obstacle::new(position, radius, ObstacleKind::Rock).expect("valid obstacle"));
    field
}

#[test]
fn head_shot_kills_and_scales_reward() {
    let mut agent = steering_agent(Vec3::new(10.0, 0.0, 0.0));

    assert!(agent.take_damage(50.0, Zone::Head, &zones()));

    assert_eq!(agent.lifecycle(), Lifecycle::Dead);
    assert!((agent.health() + 40.0).abs() < f32::EPSILON);
    assert_eq!(
        agent.take_death(),
        Some(Death {
            reward: 37,
            zone: Zone::Head,
        })
    );
    assert_eq!(agent.take_death(), None, "death is reported once");
}

#[test]
fn body_shot_below_health_does_not_kill() {
    let mut agent = steering_agent(Vec3::ZERO);

    assert!(!agent.take_damage(50.0, Zone::Core, &zones()));

    assert_eq!(agent.lifecycle(), Lifecycle::Active);
    assert!((agent.health() - 10.0).abs() < f32::EPSILON);
    assert_eq!(agent.take_death(), None);
}

#[test]
fn exact_lethal_damage_kills() {
    let mut agent = steering_agent(Vec3::ZERO);

    assert!(agent.take_damage(60.0, Zone::Core, &zones()));
    assert_eq!(agent.take_death().map(|death| death.reward), Some(25));
}

#[test]
fn zone_missing_from_table_uses_neutral_multipliers() {
    let table = ZoneTable {
        core: None,
        head: None,
    };
    let mut agent = steering_agent(Vec3::ZERO);

    assert!(!agent.take_damage(50.0, Zone::Head, &table));
    assert!((agent.health() - 10.0).abs() < f32::EPSILON);
    assert!(agent.take_damage(10.0, Zone::Head, &table));
    assert_eq!(
        agent.take_death(),
        Some(Death {
            reward: 25,
            zone: Zone::Head,
        })
    );
}

#[test]
fn damage_after_death_is_ignored() {
    let mut agent = steering_agent(Vec3::ZERO);
    assert!(agent.take_damage(100.0, Zone::Core, &zones()));
    let health = agent.health();

    assert!(!agent.take_damage(100.0, Zone::Head, &zones()));
    assert_eq!(agent.health(), health);
    assert!(agent.take_death().is_some());
    assert!(!agent.take_damage(100.0, Zone::Head, &zones()));
    assert_eq!(agent.take_death(), None);
}

#[test]
fn degenerate_damage_is_ignored() {
    let mut agent = steering_agent(Vec3::ZERO);

    assert!(!agent.take_damage(-5.0, Zone::Core, &zones()));
    assert!(!agent.take_damage(f32::NAN, Zone::Core, &zones()));
    assert!((agent.health() - 60.0).abs() < f32::EPSILON);
}

#[test]
fn dispose_is_idempotent() {
    let mut agent = steering_agent(Vec3::ZERO);

    assert!(agent.dispose());
    assert!(!agent.dispose());
    assert_eq!(agent.lifecycle(), Lifecycle::Disposed);
    assert!(!agent.take_damage(500.0, Zone::Head, &zones()));
    assert_eq!(agent.take_death(), None);
}

#[test]
fn dispose_keeps_death_of_killed_agent() {
    let mut agent = steering_agent(Vec3::ZERO);
    assert!(agent.take_damage(100.0, Zone::Core, &zones()));

    assert!(!agent.dispose());
    assert_eq!(agent.lifecycle(), Lifecycle::Dead);
    assert!(agent.take_death().is_some());
}

#[test]
fn moves_straight_toward_objective() {
    let mut agent = steering_agent(Vec3::new(10.0, 0.0, 0.0));

    agent.update(1.0, Vec3::ZERO, None);

    assert_eq!(agent.position(), Vec3::new(7.0, 0.0, 0.0));
    assert!((agent.yaw() + std::f32::consts::FRAC_PI_2).abs() < 1.0e-6);
}

#[test]
fn ground_locked_agent_keeps_height() {
    let mut agent = steering_agent(Vec3::new(0.0, 5.0, 10.0));

    agent.update(1.0, Vec3::new(0.0, -20.0, 0.0), None);

    assert_eq!(agent.position(), Vec3::new(0.0, 5.0, 7.0));
}

#[test]
fn agent_on_objective_stays_put() {
    let mut agent = steering_agent(Vec3::new(1.0, 0.0, 1.0));

    agent.update(0.5, Vec3::new(1.0, 0.0, 1.0), None);

    assert_eq!(agent.position(), Vec3::new(1.0, 0.0, 1.0));
}

#[test]
fn zero_dt_is_a_no_op() {
    let mut agent = steering_agent(Vec3::new(10.0, 0.0, 0.0));

    agent.update(0.0, Vec3::ZERO, None);

    assert_eq!(agent.position(), Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn terminal_agent_does_not_move() {
    let mut agent = steering_agent(Vec3::new(10.0, 0.0, 0.0));
    assert!(agent.dispose());

    agent.update(1.0, Vec3::ZERO, None);

    assert_eq!(agent.position(), Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn obstacle_ahead_triggers_perpendicular_avoidance() {
    let mut agent = steering_agent(Vec3::new(0.0, 0.0, -30.0));
    let field = field_with(Vec3::new(0.0, 0.0, -25.0), 1.0);

    agent.update(0.25, Vec3::ZERO, Some(&field));

    let direction = agent.avoidance_direction().expect("avoidance active");
    assert!(direction.dot(Vec3::Z).abs() < 1.0e-6);
    assert!((agent.avoidance_timer() - (AVOIDANCE_DURATION - 0.25)).abs() < f32::EPSILON);
    // Full weight right after the trigger: the first step is pure sidestep.
    let moved = agent.position() - Vec3::new(0.0, 0.0, -30.0);
    assert!(moved.z.abs() < 1.0e-6);
    assert!((moved.length() - 0.75).abs() < 1.0e-5);
}

#[test]
fn avoidance_bias_decays_then_reverts_to_goal() {
    let mut agent = steering_agent(Vec3::new(0.0, 0.0, -30.0));
    let field = field_with(Vec3::new(0.0, 0.0, -25.0), 1.0);
    let dt = 0.25;

    agent.update(dt, Vec3::ZERO, Some(&field));
    let mut previous = agent.avoidance_timer();
    assert!(previous > 0.0);

    while agent.avoidance_timer() > 0.0 {
        agent.update(dt, Vec3::ZERO, None);
        assert!((previous - agent.avoidance_timer() - dt).abs() < f32::EPSILON);
        previous = agent.avoidance_timer();
    }
    assert_eq!(agent.avoidance_timer(), 0.0);
    assert_eq!(agent.avoidance_direction(), None);

    let before = agent.position();
    let expected = (Vec3::ZERO - before).normalize();
    agent.update(dt, Vec3::ZERO, None);
    let step = (agent.position() - before).normalize();
    assert!(step.dot(expected) > 1.0 - 1.0e-5);
}

#[test]
fn avoidance_window_lasts_one_second() {
    let mut agent = steering_agent(Vec3::new(0.0, 0.0, -30.0));
    let field = field_with(Vec3::new(0.0, 0.0, -25.0), 1.0);

    agent.update(0.25, Vec3::ZERO, Some(&field));
    for _ in 0..3 {
        agent.update(0.25, Vec3::ZERO, None);
    }

    assert_eq!(agent.avoidance_timer(), 0.0);
    assert!(!agent.snapshot(AgentId::new(0, 0)).avoiding);
}

#[test]
fn clear_path_never_triggers_avoidance() {
    let mut agent = steering_agent(Vec3::new(0.0, 0.0, -30.0));
    let field = field_with(Vec3::new(20.0, 0.0, -20.0), 2.0);

    for _ in 0..20 {
        agent.update(0.1, Vec3::ZERO, Some(&field));
        assert_eq!(agent.avoidance_direction(), None);
    }
    assert!((agent.position().z + 24.0).abs() < 1.0e-3);
}

#[test]
fn steering_agent_routes_around_obstacle() {
    let obstacle = Vec3::new(0.0, 0.0, -20.0);
    let field = field_with(obstacle, 3.0);
    let mut agent = steering_agent(Vec3::new(0.5, 0.0, -40.0));

    for _ in 0..400 {
        agent.update(0.05, Vec3::ZERO, Some(&field));
        let gap = (agent.position() - obstacle).length();
        assert!(gap > 3.0, "agent entered the obstacle at {}", agent.position());
    }

    assert!(agent.position().z > -10.0, "agent stalled at {}", agent.position());
}

#[test]
fn walker_ignores_obstacles_and_stops_in_range() {
    let walker_tuning = tuning(2.0, Locomotion::Walker);
    let mut walker = Agent::new(AgentKind::Heavy, &walker_tuning, 3.0, Vec3::new(10.0, 0.0, 0.0));
    let field = field_with(Vec3::new(6.0, 0.0, 0.0), 1.0);

    for _ in 0..4 {
        walker.update(1.0, Vec3::ZERO, Some(&field));
        assert_eq!(walker.lifecycle(), Lifecycle::Active);
        assert_eq!(walker.avoidance_direction(), None);
    }
    assert_eq!(walker.position(), Vec3::new(2.0, 0.0, 0.0));

    walker.update(1.0, Vec3::ZERO, Some(&field));

    assert_eq!(walker.lifecycle(), Lifecycle::ReachedObjective);
    assert_eq!(walker.position(), Vec3::new(2.0, 0.0, 0.0));
}

#[test]
fn hit_volumes_resolve_zones() {
    let agent = steering_agent(Vec3::new(4.0, 0.0, 4.0));
    let [core, head] = agent.hit_volumes();

    assert_eq!(core.zone, Zone::Core);
    assert_eq!(head.zone, Zone::Head);
    assert!(head.center.y > core.center.y);
    assert_eq!(agent.zone_at(core.center), Some(Zone::Core));
    assert_eq!(agent.zone_at(head.center), Some(Zone::Head));
    assert_eq!(agent.zone_at(Vec3::new(40.0, 0.0, 40.0)), None);
}

#[test]
fn snapshot_reflects_state() {
    let mut agent = steering_agent(Vec3::new(0.0, 0.0, 8.0));
    agent.update(1.0, Vec3::ZERO, None);
    let id = AgentId::new(3, 1);

    let snapshot = agent.snapshot(id);

    assert_eq!(snapshot.id, id);
    assert_eq!(snapshot.kind, AgentKind::Grunt);
    assert_eq!(snapshot.position, Vec3::new(0.0, 0.0, 5.0));
    assert!((snapshot.yaw.abs() - std::f32::consts::PI).abs() < 1.0e-6);
    assert!((snapshot.health - 60.0).abs() < f32::EPSILON);
    assert!(!snapshot.avoiding);
}
