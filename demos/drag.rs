//! Drag a point around a small construction and print what the renderer
//! is asked to do.
//!
//! Run with `RUST_LOG=konstrukt=debug cargo run --example drag --features tracing`
//! to see the engine's own logging.

use konstrukt::{
    AttrPatch, Board, BoardEvent, BoardOptions, ElementType, RecordingRenderer, parents,
};

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (renderer, log) = RecordingRenderer::new();
    let mut board = Board::with_renderer(BoardOptions::default().with_id("demo"), renderer);
    board.on(|event| {
        if let BoardEvent::Update {
            updated,
            failed,
            rendered,
        } = event
        {
            tracing::info!(updated, failed, rendered, "pass finished");
        }
    });

    let a = board.create(ElementType::Point, parents![(0.0, 0.0)], ("name", "A"))?;
    let b = board.create(ElementType::Point, parents![(3.0, 0.0)], ("name", "B"))?;
    let circle = board.create(ElementType::Circle, parents![a, b], ())?;
    let text = board.create(
        ElementType::Text,
        parents![-4.0, 4.0, konstrukt::create_function("Dist(A, B)", board.registry())?],
        AttrPatch::new().with("digits", 3),
    )?;
    board.create(
        ElementType::Point,
        parents!["(X(A) + X(B)) / 2", "(Y(A) + Y(B)) / 2"],
        AttrPatch::new().with("name", "M").with("color", "#0000ff"),
    )?;

    for step in 1..=4 {
        let angle = step as f64 * std::f64::consts::FRAC_PI_4;
        log.borrow_mut().clear();
        board.move_point(b, (3.0 * angle.cos(), 3.0 * angle.sin()));

        println!("step {step}: radius {:?}", board.radius(circle));
        if let Some(el) = board.element(text) {
            println!("  text: {:?}", el.geom());
        }
        for call in log.borrow().iter() {
            println!("  {call}");
        }
    }

    board.remove_object(b);
    println!(
        "after removing B: circle real = {}",
        board.element(circle).is_some_and(|el| el.is_real())
    );
    Ok(())
}
