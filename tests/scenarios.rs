//! End-to-end constructions driven through the public board API.

use konstrukt::{
    AttrPatch, Board, BoardOptions, ElementId, ElementType, RecordingRenderer, RenderCall,
    UpdateError, parents, render::RenderLog,
};

fn recorded(id: &str) -> (Board, RenderLog) {
    let (renderer, log) = RecordingRenderer::new();
    let board = Board::with_renderer(BoardOptions::default().with_id(id), renderer);
    (board, log)
}

fn point(board: &mut Board, name: &str, at: (f64, f64)) -> ElementId {
    let attrs = AttrPatch::new().with("name", name).with("withlabel", false);
    board
        .create(ElementType::Point, parents![at], attrs)
        .expect("free point")
}

fn calls(log: &RenderLog) -> String {
    let calls: Vec<String> = log.borrow().iter().map(ToString::to_string).collect();
    calls.join("\n")
}

#[test]
fn circle_follows_its_radius_point() {
    let mut board = Board::new(BoardOptions::default().with_id("s1"));
    let a = point(&mut board, "A", (0.0, 0.0));
    let b = point(&mut board, "B", (1.0, 0.0));
    let c = board
        .create(ElementType::Circle, parents![a, b], ())
        .expect("circle");

    assert!(board.descendants(a).contains(&c));
    assert!(board.descendants(b).contains(&c));
    assert_eq!(board.radius(c), Some(1.0));

    assert!(board.move_point(b, (2.0, 0.0)));
    assert_eq!(board.radius(c), Some(2.0));
    assert!(board.last_report().updated.contains(&c));
}

#[test]
fn polygon_losing_a_vertex_degrades_quietly() {
    let (mut board, log) = recorded("s2");
    let a = point(&mut board, "A", (0.0, 0.0));
    let b = point(&mut board, "B", (1.0, 0.0));
    let poly = board
        .create(
            ElementType::Polygon,
            parents![a, b, (0.0, 1.0)],
            ("withlines", true),
        )
        .expect("polygon");
    let key = board.element(poly).expect("registered").key().to_string();
    assert!(board.element(poly).is_some_and(|el| el.is_real()));

    let removed = board.remove_object(a);
    assert_eq!(removed.len(), 1);
    assert!(board.last_report().failed.iter().any(|(id, e)| {
        *id == poly && matches!(e, UpdateError::MissingParent { parent } if *parent == a)
    }));

    let el = board.element(poly).expect("still registered");
    assert!(!el.is_real());
    assert!(!el.vis_prop_calc().visible);
    assert!(log.borrow().contains(&RenderCall::Display(key.clone(), false)));

    log.borrow_mut().clear();
    let report = board.full_update();
    assert!(report.updated.contains(&poly));
    assert!(!report.rendered.contains(&poly));
    assert!(!log.borrow().iter().any(|call| {
        matches!(call, RenderCall::Draw(_, k) | RenderCall::Update(_, k) if *k == key)
    }));
}

#[test]
fn hiding_a_circle_hides_its_label() {
    let (mut board, log) = recorded("s3");
    let a = point(&mut board, "A", (0.0, 0.0));
    let b = point(&mut board, "B", (1.0, 0.0));
    let c = board
        .create(ElementType::Circle, parents![a, b], ("withlabel", true))
        .expect("circle");
    let label = board.element(c).and_then(|el| el.label()).expect("label");
    assert!(board.element(label).is_some_and(|el| el.vis_prop_calc().visible));

    log.borrow_mut().clear();
    assert!(board.set_attribute(c, ("visible", false)));

    assert!(!board.element(label).expect("label").vis_prop_calc().visible);
    insta::assert_snapshot!(calls(&log), @r"
    display s3C2 false
    display s3C2Label false
    ");

    board.set_attribute(c, ("visible", true));
    assert!(board.element(label).expect("label").vis_prop_calc().visible);
}

#[test]
fn chain_recomputes_in_dependency_order() {
    let mut board = Board::new(BoardOptions::default().with_id("s4"));
    let a = point(&mut board, "A", (0.0, 0.0));
    let mut prev = "A".to_string();
    let mut chain = vec![a];
    for name in ["B", "C", "D"] {
        let attrs = AttrPatch::new().with("name", name).with("withlabel", false);
        let id = board
            .create(
                ElementType::Point,
                parents![format!("X({prev}) + 1"), format!("Y({prev})")],
                attrs,
            )
            .expect("chained point");
        chain.push(id);
        prev = name.to_string();
    }

    assert!(board.move_point(a, (1.0, 1.0)));
    let order: Vec<&str> = board
        .last_report()
        .updated
        .iter()
        .filter_map(|id| board.element(*id).map(|el| el.name()))
        .collect();
    insta::assert_snapshot!(order.join(" -> "), @"A -> B -> C -> D");

    let d = chain[3];
    let end = board.coords(d).expect("D has coordinates");
    assert_eq!((end.x(), end.y()), (4.0, 1.0));
}

#[test]
fn cycles_are_refused_and_passes_terminate() {
    let mut board = Board::new(BoardOptions::default().with_id("s5"));
    let a = point(&mut board, "A", (0.0, 0.0));
    let b = point(&mut board, "B", (4.0, 0.0));
    let m = point(&mut board, "M", (2.0, 1.0));
    let c1 = board
        .create(ElementType::Circle, parents![a, m], ())
        .expect("first circle");
    let c2 = board
        .create(ElementType::Circle, parents![b, m], ())
        .expect("second circle");

    assert!(board.descendants(m).contains(&c1));
    assert!(board.descendants(m).contains(&c2));
    assert!(!board.descendants(c1).contains(&c2));

    assert_eq!(board.add_parents(c1, &[c1]), 0);
    assert_eq!(board.add_parents(m, &[c1]), 0);
    assert_eq!(board.add_parents(m, &[c2]), 0);
    assert!(!board.ancestors(m).contains(&c1));
    assert!(board.graph().is_consistent());

    let report = board.full_update();
    assert_eq!(report.updated.len(), board.len());
    assert!(report.failed.is_empty());
}
