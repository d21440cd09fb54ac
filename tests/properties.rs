//! Invariants that must hold whatever the construction looks like.

use konstrukt::{
    AttrValue, Board, BoardOptions, ElementId, ElementType, RecordingRenderer, parents,
};

/// Small deterministic generator so edit sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }

    fn coord(&mut self) -> f64 {
        (self.below(200) as f64 - 100.0) / 10.0
    }
}

fn assert_topological(board: &Board) {
    for &id in board.order() {
        let at = board.registry().position(id).expect("ordered element");
        for parent in board.parents(id) {
            let before = board.registry().position(*parent).expect("parent registered");
            assert!(before < at, "parent {parent:?} comes after child {id:?}");
        }
    }
}

fn pick(rng: &mut Lcg, ids: &[ElementId]) -> Option<ElementId> {
    (!ids.is_empty()).then(|| ids[rng.below(ids.len())])
}

#[test]
fn closures_survive_edit_sequences() {
    for seed in 1..=8u64 {
        let mut rng = Lcg(seed);
        let mut board = Board::new(BoardOptions::default().with_id(format!("p{seed}")));

        for _ in 0..60 {
            let points = board.filter(|el| el.element_type() == ElementType::Point);
            let all = board.order().to_vec();
            match rng.below(6) {
                0 | 1 => {
                    let at = (rng.coord(), rng.coord());
                    board
                        .create(ElementType::Point, parents![at], ())
                        .expect("free point");
                }
                2 if points.len() >= 2 => {
                    let a = points[rng.below(points.len())];
                    let b = points[rng.below(points.len())];
                    if a != b {
                        board
                            .create(ElementType::Segment, parents![a, b], ())
                            .expect("segment");
                    }
                }
                3 if points.len() >= 2 => {
                    let a = points[rng.below(points.len())];
                    let b = points[rng.below(points.len())];
                    board
                        .create(ElementType::Circle, parents![a, b], ())
                        .expect("circle");
                }
                4 => {
                    if let (Some(child), Some(parent)) = (pick(&mut rng, &all), pick(&mut rng, &all)) {
                        board.add_parents(child, &[parent]);
                    }
                }
                5 => {
                    if let Some(victim) = pick(&mut rng, &all) {
                        board.remove_object(victim);
                    }
                }
                _ => {}
            }

            assert!(board.graph().is_consistent(), "seed {seed}");
            assert_topological(&board);
        }
    }
}

#[test]
fn a_pass_without_changes_does_nothing() {
    let (renderer, log) = RecordingRenderer::new();
    let mut board = Board::with_renderer(BoardOptions::default().with_id("idem"), renderer);
    let a = board.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
    let b = board.create(ElementType::Point, parents![(3.0, 4.0)], ()).unwrap();
    board.create(ElementType::Circle, parents![a, b], ()).unwrap();
    board
        .create(ElementType::Polygon, parents![a, b, (0.0, 4.0)], ())
        .unwrap();

    assert!(board.move_point(b, (3.0, 5.0)));
    assert!(board.order().iter().all(|id| {
        board.element(*id).is_some_and(|el| !el.needs_update())
    }));

    let calls = log.borrow().len();
    let first = board.update();
    let second = board.update();
    assert!(first.updated.is_empty());
    assert_eq!(first, second);
    assert_eq!(log.borrow().len(), calls);
}

#[test]
fn labels_follow_their_anchor_visibility() {
    let mut board = Board::new(BoardOptions::default().with_id("vis"));
    let a = board.create(ElementType::Point, parents![(1.0, 1.0)], ()).unwrap();
    let label = board.element(a).and_then(|el| el.label()).expect("points are labelled");

    let shown = |board: &Board, id: ElementId| {
        board.element(id).expect("registered").vis_prop_calc().visible
    };
    assert!(shown(&board, a));
    assert_eq!(shown(&board, label), shown(&board, a));

    board.set_attribute(a, ("visible", false));
    assert!(!shown(&board, a));
    assert_eq!(shown(&board, label), shown(&board, a));

    board.set_attribute(a, ("visible", true));
    board.full_update();
    assert_eq!(shown(&board, label), shown(&board, a));

    // an explicit value on the label wins over the anchor
    board.set_attribute(label, ("visible", false));
    board.full_update();
    assert!(shown(&board, a));
    assert!(!shown(&board, label));
}

#[test]
fn scalar_attributes_round_trip() {
    let mut board = Board::new(BoardOptions::default().with_id("rt"));
    let a = board.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();

    let cases: Vec<(&str, AttrValue)> = vec![
        ("size", AttrValue::Number(5.0)),
        ("face", AttrValue::Text("x".into())),
        ("fixed", AttrValue::Bool(true)),
        ("draft", AttrValue::Bool(true)),
        ("dash", AttrValue::Number(2.0)),
        ("layer", AttrValue::Number(4.0)),
        ("strokeopacity", AttrValue::Number(0.5)),
        ("strokewidth", AttrValue::Number(3.0)),
        ("name", AttrValue::Text("Q".into())),
        ("mycustomkey", AttrValue::Text("anything".into())),
    ];
    for (key, value) in cases {
        board.set_attribute(a, (key, value.clone()));
        assert_eq!(board.get_attribute(a, key), Some(value), "{key}");
    }
}

#[test]
fn color_shortcut_sets_stroke_and_fill() {
    let mut board = Board::new(BoardOptions::default().with_id("col"));
    let a = board.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();

    board.set_attribute(a, ("color", "#00ff00"));
    let green = Some(AttrValue::Text("#00ff00".into()));
    assert_eq!(board.get_attribute(a, "strokecolor"), green);
    assert_eq!(board.get_attribute(a, "fillcolor"), green);
    assert_eq!(board.get_attribute(a, "color"), green);
}
