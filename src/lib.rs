//! konstrukt: the core of an interactive geometry construction engine.
//!
//! Elements (points, lines, circles, polygons, texts, ...) declare parents;
//! the engine keeps every derived element consistent when a free element
//! changes. A [`Board`] holds one construction:
//!
//! ```
//! use konstrukt::{Board, BoardOptions, ElementType, parents};
//!
//! let mut board = Board::new(BoardOptions::default());
//! let a = board.create(ElementType::Point, parents![(0.0, 0.0)], ()).unwrap();
//! let b = board.create(ElementType::Point, parents![(1.0, 0.0)], ()).unwrap();
//! let c = board.create(ElementType::Circle, parents![a, b], ()).unwrap();
//!
//! board.move_point(b, (2.0, 0.0));
//! assert_eq!(board.radius(c), Some(2.0));
//! ```
//!
//! Drawing is delegated to a [`Renderer`]; formulas go through
//! [`create_function`].

use pest_derive::Parser;

pub mod ast;
pub mod attr;
pub mod board;
pub mod element;
pub mod errors;
pub mod graph;
pub mod log;
pub mod options;
pub mod parse;
pub mod registry;
pub mod render;
pub mod term;
pub mod types;

pub use attr::{AttrKey, AttrPatch, AttrValue, Attributes};
pub use board::{Board, BoardEvent, HandlerId, ParentRef, PassReport, Selector};
pub use element::{Element, ElementClass, ElementType, Geom, Visibility};
pub use errors::{ConstructionError, TermError, UpdateError};
pub use graph::DependencyGraph;
pub use options::BoardOptions;
pub use registry::{ElementId, Registry};
pub use render::{Buffering, NullRenderer, RecordingRenderer, RenderCall, RenderKind, Renderer};
pub use term::{Lookup, Resolver, Term, TermSpec, create_function};
pub use types::{BBox, Coords};

#[derive(Parser)]
#[grammar = "term.pest"]
pub struct TermParser;
