//! Unit tests for orbiting projectile instances
//!
//! These tests verify that:
//! - Cohort angle offsets divide the circle evenly
//! - Positions are derived analytically and never drift out of phase
//! - Instances stay on the orbit radius at all times
//! - The per-instance-per-target hit cooldown debounces repeated overlap

use bevy::prelude::{Entity, Vec3};
use survsim::combat::components::{OrbitingProjectile, ORBIT_HIT_COOLDOWN_SECS};

const RADIUS: f32 = 2.0;
const ROTATION: f32 = 180.0;
const DURATION: f32 = 5.0;

fn create_cohort(count: u32) -> Vec<OrbitingProjectile> {
    let owner = Entity::from_raw(7);
    let step = 360.0 / count as f32;
    (0..count)
        .map(|i| OrbitingProjectile::new(owner, i as f32 * step, DURATION, 9, RADIUS, ROTATION))
        .collect()
}

// =============================================================================
// Cohort Geometry Tests
// =============================================================================

#[test]
fn test_cohort_of_four_has_quarter_turn_offsets() {
    let cohort = create_cohort(4);
    let offsets: Vec<f32> = cohort.iter().map(|o| o.angle_offset_deg).collect();
    assert_eq!(offsets, vec![0.0, 90.0, 180.0, 270.0]);
}

#[test]
fn test_instances_stay_mutually_perpendicular() {
    // Positions of a 4-cohort must be mutually 90 degrees apart at any
    // elapsed time, because position is derived from elapsed time rather
    // than integrated per instance
    let owner_pos = Vec3::new(3.0, -1.0, 0.0);

    for elapsed in [0.0, 0.37, 1.0, 2.71, 4.9] {
        let mut cohort = create_cohort(4);
        for instance in cohort.iter_mut() {
            instance.elapsed = elapsed;
        }
        let positions: Vec<Vec3> = cohort.iter().map(|o| o.position(owner_pos)).collect();

        for i in 0..4 {
            let a = positions[i] - owner_pos;
            let b = positions[(i + 1) % 4] - owner_pos;
            assert!(
                a.dot(b).abs() < 1e-3,
                "Adjacent instances should be perpendicular at elapsed {elapsed}"
            );
        }
    }
}

#[test]
fn test_position_stays_on_orbit_radius() {
    let owner_pos = Vec3::new(-2.0, 5.0, 0.0);
    let mut instance = create_cohort(1).remove(0);

    for elapsed in [0.0, 0.5, 1.25, 3.99] {
        instance.elapsed = elapsed;
        let distance = (instance.position(owner_pos) - owner_pos).length();
        assert!(
            (distance - RADIUS).abs() < 1e-4,
            "Instance must stay on the orbit radius, got {distance} at elapsed {elapsed}"
        );
    }
}

#[test]
fn test_rotation_rate_advances_angle() {
    // 180 deg/s for one second moves the instance to the opposite side
    let owner_pos = Vec3::ZERO;
    let mut instance = create_cohort(1).remove(0);

    instance.elapsed = 0.0;
    let start = instance.position(owner_pos);
    instance.elapsed = 1.0;
    let end = instance.position(owner_pos);

    assert!(
        (start + end).length() < 1e-4,
        "Half a turn should mirror the position through the owner"
    );
}

#[test]
fn test_position_follows_owner() {
    let mut instance = create_cohort(1).remove(0);
    instance.elapsed = 0.5;

    let at_origin = instance.position(Vec3::ZERO);
    let offset = Vec3::new(10.0, 4.0, 0.0);
    let moved = instance.position(offset);
    assert!(
        (moved - at_origin - offset).length() < 1e-4,
        "Orbit center must track the owner position"
    );
}

// =============================================================================
// Lifetime Tests
// =============================================================================

#[test]
fn test_expires_after_duration() {
    let mut instance = create_cohort(1).remove(0);
    instance.elapsed = DURATION;
    assert!(!instance.is_expired(), "Not expired at exactly the duration");
    instance.elapsed = DURATION + 0.01;
    assert!(instance.is_expired());
}

// =============================================================================
// Hit Debounce Tests
// =============================================================================

#[test]
fn test_first_hit_registers() {
    let mut instance = create_cohort(1).remove(0);
    let target = Entity::from_raw(42);
    assert!(instance.try_register_hit(target));
}

#[test]
fn test_repeated_overlap_within_window_is_dropped() {
    let mut instance = create_cohort(1).remove(0);
    let target = Entity::from_raw(42);

    assert!(instance.try_register_hit(target));
    assert!(
        !instance.try_register_hit(target),
        "Same-frame re-overlap must not multi-hit"
    );

    instance.elapsed += ORBIT_HIT_COOLDOWN_SECS / 2.0;
    assert!(
        !instance.try_register_hit(target),
        "Overlap inside the cooldown window must be dropped"
    );
}

#[test]
fn test_sustained_contact_damages_repeatedly() {
    let mut instance = create_cohort(1).remove(0);
    let target = Entity::from_raw(42);

    assert!(instance.try_register_hit(target));
    instance.elapsed += ORBIT_HIT_COOLDOWN_SECS;
    assert!(
        instance.try_register_hit(target),
        "Contact beyond the cooldown window hits again"
    );
}

#[test]
fn test_hit_windows_are_per_target() {
    let mut instance = create_cohort(1).remove(0);
    let first = Entity::from_raw(42);
    let second = Entity::from_raw(43);

    assert!(instance.try_register_hit(first));
    assert!(
        instance.try_register_hit(second),
        "A different target has its own hit window"
    );
}
