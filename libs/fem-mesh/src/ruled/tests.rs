use super::*;
use crate::curve::{LineCurve, Polyline, QuadraticCurve};
use crate::element::ElementType;
use approx::{assert_abs_diff_eq, assert_relative_eq};

fn lower() -> LineCurve {
    LineCurve::new(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0))
}

fn upper() -> LineCurve {
    LineCurve::new(DVec3::new(0.0, 1.0, 0.0), DVec3::new(2.0, 1.0, 0.0))
}

#[test]
fn test_two_by_two_grid() {
    let ruled = build_ruled_mesh(&lower(), &upper(), &RuledMeshParams::new(2, 2)).unwrap();
    let fragment = &ruled.fragment;

    assert_eq!(fragment.node_count(), 9);
    assert_eq!(fragment.element_count(), 4);
    assert_eq!(fragment.node(NodeId::new(1)), Some(DVec3::ZERO));
    assert_eq!(fragment.node(NodeId::new(9)), Some(DVec3::new(2.0, 1.0, 0.0)));
    assert_relative_eq!(fragment.node(NodeId::new(4)).unwrap().y, 0.5);
    assert!(!ruled.report.flipped);
    assert!(!ruled.report.conflict);
}

#[test]
fn test_connectivity_layout() {
    let ruled = build_ruled_mesh(&lower(), &upper(), &RuledMeshParams::new(2, 2)).unwrap();
    let nodes = |id: u32| ruled.fragment.element(ElementId::new(id)).unwrap().nodes.clone();

    assert_eq!(nodes(1), [1, 4, 5, 2].map(NodeId::new).to_vec());
    assert_eq!(nodes(2), [2, 5, 6, 3].map(NodeId::new).to_vec());
    assert_eq!(nodes(3), [4, 7, 8, 5].map(NodeId::new).to_vec());
    assert_eq!(nodes(4), [5, 8, 9, 6].map(NodeId::new).to_vec());
    assert!(ruled
        .fragment
        .elements()
        .values()
        .all(|e| e.kind == ElementType::Quad4 && e.property == PropertyId::new(1)));
    assert_eq!(
        ruled.fragment.material_of(PropertyId::new(1)),
        Some(MaterialId::new(1))
    );
}

#[test]
fn test_reversed_boundary_is_flipped_back() {
    let reversed = LineCurve::new(DVec3::new(2.0, 1.0, 0.0), DVec3::new(0.0, 1.0, 0.0));
    let ruled = build_ruled_mesh(&lower(), &reversed, &RuledMeshParams::new(2, 2)).unwrap();

    assert_eq!(ruled.report.distance_flip, Some(true));
    assert_eq!(ruled.report.warp_flip, Some(true));
    assert!(ruled.report.flipped);
    assert!(!ruled.report.conflict);
    assert_eq!(ruled.fragment.node(NodeId::new(7)), Some(DVec3::new(0.0, 1.0, 0.0)));
    assert_eq!(ruled.fragment.node(NodeId::new(9)), Some(DVec3::new(2.0, 1.0, 0.0)));
}

#[test]
fn test_as_given_keeps_reversed_boundary() {
    let reversed = LineCurve::new(DVec3::new(2.0, 1.0, 0.0), DVec3::new(0.0, 1.0, 0.0));
    let mut params = RuledMeshParams::new(2, 1);
    params.orientation = Orientation::AsGiven;
    let ruled = build_ruled_mesh(&lower(), &reversed, &params).unwrap();

    assert!(!ruled.report.flipped);
    assert_eq!(ruled.report.distance_flip, None);
    assert_eq!(ruled.fragment.node(NodeId::new(4)), Some(DVec3::new(2.0, 1.0, 0.0)));
}

#[test]
fn test_force_flip_inverts_decision() {
    let mut params = RuledMeshParams::new(2, 1);
    params.force_flip = true;
    let ruled = build_ruled_mesh(&lower(), &upper(), &params).unwrap();

    assert!(ruled.report.flipped);
    assert_eq!(ruled.fragment.node(NodeId::new(4)), Some(DVec3::new(2.0, 1.0, 0.0)));
}

#[test]
fn test_sample_mismatch() {
    let a = [DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)];
    let b = [DVec3::Y, DVec3::new(2.0, 1.0, 0.0)];
    let err = mesh_between(&a, &b, &RuledMeshParams::new(2, 1)).unwrap_err();
    assert!(matches!(err, MeshError::CurveSampleMismatch { first: 3, second: 2 }));
}

#[test]
fn test_zero_transverse_elements_rejected() {
    let err = build_ruled_mesh(&lower(), &upper(), &RuledMeshParams::new(2, 0)).unwrap_err();
    assert!(matches!(err, MeshError::InvalidParameter { name: "ny", .. }));
}

#[test]
fn test_warp_coefficient_of_twisted_quad() {
    let corners = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(1.0, 1.0, 1.0),
        DVec3::new(0.0, 1.0, 0.0),
    ];
    let expected = 0.125 * (3f64.sqrt() + 2f64.sqrt());
    assert_relative_eq!(warp_coefficient(corners), expected, epsilon = 1e-12);
}

#[test]
fn test_total_warp_zero_for_parallel_lines() {
    let a = lower().sample(4).unwrap();
    let b = upper().sample(4).unwrap();
    assert_abs_diff_eq!(total_warp(&a, &b, 3), 0.0, epsilon = 1e-12);
    let reversed: Vec<DVec3> = b.iter().rev().copied().collect();
    assert!(total_warp(&a, &reversed, 3) > 0.0);
}

#[test]
fn test_closed_boundaries_use_warp_only() {
    let ring = |radius: f64, z: f64| -> Vec<DVec3> {
        (0..=8)
            .map(|k| {
                let angle = std::f64::consts::TAU * (k % 8) as f64 / 8.0;
                DVec3::new(radius * angle.cos(), radius * angle.sin(), z)
            })
            .collect()
    };
    let inner = ring(1.0, 0.0);
    let outer: Vec<DVec3> = ring(2.0, 0.0).into_iter().rev().collect();
    let ruled = mesh_between(&inner, &outer, &RuledMeshParams::new(8, 1)).unwrap();

    assert_eq!(ruled.report.distance_flip, None);
    assert_eq!(ruled.report.warp_flip, Some(true));
    assert!(ruled.report.flipped);
    assert!(!ruled.report.conflict);
}

#[test]
fn test_disagreement_is_flagged_and_distance_wins() {
    let a = [DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)];
    let b = [
        DVec3::new(5.0, 4.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        DVec3::new(5.0, 1.0, 0.0),
    ];
    let report = choose_orientation(&a, &b, 1, Orientation::DistanceThenWarp, false);

    assert_eq!(report.distance_flip, Some(false));
    assert_eq!(report.warp_flip, Some(true));
    assert!(report.conflict);
    assert!(!report.flipped);
}

#[test]
fn test_quadratic_and_polyline_boundaries() {
    let arc = QuadraticCurve::fit(DVec3::ZERO, DVec3::new(1.0, -0.5, 0.0), DVec3::new(2.0, 0.0, 0.0));
    let top = Polyline::new(vec![
        DVec3::new(0.0, 2.0, 0.0),
        DVec3::new(1.0, 2.0, 0.0),
        DVec3::new(2.0, 2.0, 0.0),
    ]);
    let ruled = build_ruled_mesh(&arc, &top, &RuledMeshParams::new(2, 3)).unwrap();

    assert_eq!(ruled.fragment.node_count(), 12);
    assert_eq!(ruled.fragment.element_count(), 6);
    assert_abs_diff_eq!(ruled.fragment.node(NodeId::new(2)).unwrap().y, -0.5, epsilon = 1e-12);
}
