use super::*;
use crate::fragment::FragmentBuilder;

/// One-quad fragment with nodes 1..=4 at `corners`.
fn quad(corners: [DVec3; 4]) -> MeshFragment {
    quads(&[corners])
}

/// Fragment of unconnected quads numbered consecutively.
fn quads(list: &[[DVec3; 4]]) -> MeshFragment {
    let mut builder = FragmentBuilder::new();
    builder.property(PropertyId::new(1), MaterialId::new(1));
    for (e, corners) in list.iter().enumerate() {
        let base = 4 * e as u32;
        for (k, corner) in corners.iter().enumerate() {
            builder.node(NodeId::new(base + k as u32 + 1), *corner);
        }
        builder.element(
            ElementId::new(e as u32 + 1),
            Element::quad(
                [1, 2, 3, 4].map(|k| NodeId::new(base + k)),
                PropertyId::new(1),
            ),
        );
    }
    builder.build().unwrap()
}

fn square_at(x: f64, y: f64) -> [DVec3; 4] {
    [
        DVec3::new(x, y, 0.0),
        DVec3::new(x + 1.0, y, 0.0),
        DVec3::new(x + 1.0, y + 1.0, 0.0),
        DVec3::new(x, y + 1.0, 0.0),
    ]
}

#[test]
fn test_shared_edge_removes_coincident_pairs() {
    let gap = 1e-5;
    let left = quad(square_at(0.0, 0.0));
    let right = quad([
        DVec3::new(1.0 + gap, 0.0, 0.0),
        DVec3::new(2.0, 0.0, 0.0),
        DVec3::new(2.0, 1.0, 0.0),
        DVec3::new(1.0 + gap, 1.0, 0.0),
    ]);
    let result = equivalence(&[left, right], 1e-4).unwrap();

    assert_eq!(result.fragment.node_count(), 6);
    assert_eq!(result.removed_nodes, 2);
    assert_eq!(
        result.replaced,
        BTreeMap::from([
            (NodeId::new(5), NodeId::new(2)),
            (NodeId::new(8), NodeId::new(3)),
        ])
    );
    for element in result.fragment.elements().values() {
        assert!(!element.has_repeated_node());
    }
    assert_eq!(
        result.fragment.element(ElementId::new(2)).unwrap().nodes,
        [2, 6, 7, 3].map(NodeId::new).to_vec()
    );
}

#[test]
fn test_offsets_and_properties() {
    let result = equivalence(&[quad(square_at(0.0, 0.0)), quad(square_at(1.0, 0.0))], 1e-4).unwrap();

    assert_eq!(result.offsets[0], FragmentOffsets::default());
    assert_eq!(
        result.offsets[1],
        FragmentOffsets {
            node: 4,
            element: 1,
            property: 1,
            material: 1,
        }
    );
    assert_eq!(
        result.fragment.properties(),
        &BTreeMap::from([
            (PropertyId::new(1), MaterialId::new(1)),
            (PropertyId::new(2), MaterialId::new(2)),
        ])
    );
    assert_eq!(
        result.fragment.element(ElementId::new(2)).unwrap().property,
        PropertyId::new(2)
    );
}

#[test]
fn test_copy_of_same_fragment_is_rejected() {
    let square = quad(square_at(0.0, 0.0));
    let err = equivalence(&[square.clone(), square], 1e-4).unwrap_err();
    assert!(matches!(err, MeshError::ToleranceCollapse { fragment: 1, .. }));
}

#[test]
fn test_same_fragment_pair_is_rejected() {
    let mut builder = FragmentBuilder::new();
    let corners = square_at(0.0, 0.0);
    for (k, corner) in corners.iter().enumerate() {
        builder.node(NodeId::new(k as u32 + 1), *corner);
    }
    builder
        .node(NodeId::new(9), DVec3::new(1e-6, 0.0, 0.0))
        .property(PropertyId::new(1), MaterialId::new(1))
        .element(
            ElementId::new(1),
            Element::quad([1, 2, 3, 4].map(NodeId::new), PropertyId::new(1)),
        );
    let noisy = builder.build().unwrap();

    let err = equivalence(&[noisy, quad(square_at(5.0, 0.0))], 1e-4).unwrap_err();
    match err {
        MeshError::ToleranceCollapse { fragment, detail, .. } => {
            assert_eq!(fragment, 0);
            assert!(detail.contains("nodes 1 and 9"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_chain_inside_one_element_collapses_it() {
    // A and C belong to one quad; B sits between them within tolerance of both.
    let thin = quad([
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(0.16, 0.0, 0.0),
        DVec3::new(0.16, 1.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
    ]);
    let bridge = quad([
        DVec3::new(0.08, 0.0, 0.0),
        DVec3::new(0.08, -1.0, 0.0),
        DVec3::new(-0.9, -1.0, 0.0),
        DVec3::new(-0.9, -0.5, 0.0),
    ]);
    let err = equivalence(&[thin, bridge], 0.1).unwrap_err();
    assert!(matches!(
        err,
        MeshError::ElementCollapse { element, kept, replaced }
            if element == ElementId::new(1) && kept == NodeId::new(1) && replaced == NodeId::new(2)
    ));
}

#[test]
fn test_chain_across_elements_is_tolerance_collapse() {
    let pair = quads(&[
        [
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(-1.0, 1.0, 0.0),
        ],
        [
            DVec3::new(0.16, 0.0, 0.0),
            DVec3::new(1.16, 0.0, 0.0),
            DVec3::new(1.16, 1.0, 0.0),
            DVec3::new(0.16, 1.0, 0.0),
        ],
    ]);
    let bridge = quad([
        DVec3::new(0.08, 0.0, 0.0),
        DVec3::new(0.08, -1.0, 0.0),
        DVec3::new(-0.9, -1.0, 0.0),
        DVec3::new(-0.9, -0.5, 0.0),
    ]);
    let err = equivalence(&[pair, bridge], 0.1).unwrap_err();
    assert!(matches!(err, MeshError::ToleranceCollapse { fragment: 0, .. }));
}

#[test]
fn test_three_fragments_meeting_at_a_corner() {
    let fragments = [
        quad(square_at(0.0, 0.0)),
        quad(square_at(-1.0, 0.0)),
        quad(square_at(-1.0, -1.0)),
    ];
    let result = equivalence(&fragments, 1e-4).unwrap();

    assert_eq!(result.fragment.node_count(), 8);
    assert_eq!(result.fragment.element_count(), 3);
    // The origin is node 1 of the first fragment; both later copies fold onto it.
    let origin_refs = result
        .fragment
        .elements()
        .values()
        .filter(|e| e.nodes.contains(&NodeId::new(1)))
        .count();
    assert_eq!(origin_refs, 3);
}

#[test]
fn test_result_is_deterministic_and_idempotent() {
    let fragments = [quad(square_at(0.0, 0.0)), quad(square_at(1.0, 0.0))];
    let first = equivalence(&fragments, 1e-4).unwrap();
    let second = equivalence(&fragments, 1e-4).unwrap();
    assert_eq!(first, second);

    let again = equivalence(std::slice::from_ref(&first.fragment), 1e-4).unwrap();
    assert_eq!(again.fragment, first.fragment);
    assert!(again.replaced.is_empty());
}

#[test]
fn test_unreferenced_nodes_are_dropped() {
    let mut builder = FragmentBuilder::new();
    for (k, corner) in square_at(0.0, 0.0).iter().enumerate() {
        builder.node(NodeId::new(k as u32 + 1), *corner);
    }
    builder
        .node(NodeId::new(50), DVec3::splat(10.0))
        .property(PropertyId::new(1), MaterialId::new(1))
        .element(
            ElementId::new(1),
            Element::quad([1, 2, 3, 4].map(NodeId::new), PropertyId::new(1)),
        );
    let result = equivalence(&[builder.build().unwrap()], 1e-4).unwrap();
    assert_eq!(result.fragment.node_count(), 4);
    assert_eq!(result.removed_nodes, 1);
}

#[test]
fn test_invalid_tolerance_and_empty_input() {
    let square = quad(square_at(0.0, 0.0));
    assert!(matches!(
        equivalence(std::slice::from_ref(&square), -1.0),
        Err(MeshError::InvalidParameter { name: "tolerance", .. })
    ));
    assert!(matches!(
        equivalence(std::slice::from_ref(&square), f64::NAN),
        Err(MeshError::InvalidParameter { .. })
    ));
    assert!(matches!(equivalence(&[], 1e-4), Err(MeshError::EmptyInput { .. })));
}

#[test]
fn test_input_degenerate_element_is_kept() {
    let mut builder = FragmentBuilder::new();
    builder
        .property(PropertyId::new(1), MaterialId::new(1))
        .node(NodeId::new(1), DVec3::new(0.0, 0.0, 0.0))
        .node(NodeId::new(2), DVec3::new(1.0, 0.0, 0.0))
        .node(NodeId::new(3), DVec3::new(1.0, 1.0, 0.0))
        .element(
            ElementId::new(1),
            Element::quad([1, 2, 3, 3].map(NodeId::new), PropertyId::new(1)),
        );
    let wedge = builder.build().unwrap();

    let result = equivalence(&[wedge, quad(square_at(1.0, 0.0))], 1e-4).unwrap();
    assert_eq!(result.replaced.len(), 2);
    assert_eq!(
        result.fragment.element(ElementId::new(1)).unwrap().nodes,
        [1, 2, 3, 3].map(NodeId::new).to_vec()
    );
    assert!(!result.fragment.element(ElementId::new(2)).unwrap().has_repeated_node());
}
