//! Observer notifications

use crate::attr::AttrValue;
use crate::registry::ElementId;

use super::Board;

/// Something observers can react to
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// A patch changed at least one attribute
    Attribute {
        element: ElementId,
        keys: Vec<String>,
    },
    /// One attribute changed
    AttributeChanged {
        element: ElementId,
        key: String,
        old: Option<AttrValue>,
        new: AttrValue,
    },
    /// A pass finished
    Update {
        updated: usize,
        failed: usize,
        rendered: usize,
    },
    Removed {
        element: ElementId,
        key: String,
    },
}

/// Handle returned by [`Board::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&BoardEvent)>;

#[derive(Default)]
pub(crate) struct EventBus {
    next: u64,
    handlers: Vec<(HandlerId, Handler)>,
}

impl EventBus {
    fn on(&mut self, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next);
        self.next += 1;
        self.handlers.push((id, handler));
        id
    }

    fn off(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    pub(crate) fn emit(&mut self, event: BoardEvent) {
        for (_, handler) in &mut self.handlers {
            handler(&event);
        }
    }
}

impl Board {
    /// Subscribe to board events
    pub fn on(&mut self, handler: impl FnMut(&BoardEvent) + 'static) -> HandlerId {
        self.events.on(Box::new(handler))
    }

    pub fn off(&mut self, id: HandlerId) -> bool {
        self.events.off(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::element::ElementType;
    use crate::options::BoardOptions;
    use crate::parents;

    #[test]
    fn handlers_see_events_until_removed() {
        let mut board = Board::new(BoardOptions::default().with_id("ev"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let handler = board.on(move |e| sink.borrow_mut().push(e.clone()));

        let a = board
            .create(ElementType::Point, parents![(0.0, 0.0)], ("withlabel", false))
            .unwrap();
        board.set_attribute(a, ("size", 5));

        let events = seen.borrow().clone();
        assert!(events.contains(&BoardEvent::AttributeChanged {
            element: a,
            key: "size".into(),
            old: Some(AttrValue::Number(3.0)),
            new: AttrValue::Number(5.0),
        }));
        assert!(events.contains(&BoardEvent::Attribute {
            element: a,
            keys: vec!["size".into()],
        }));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, BoardEvent::Update { .. }))
        );

        assert!(board.off(handler));
        assert!(!board.off(handler));
        let count = seen.borrow().len();
        board.set_attribute(a, ("size", 6));
        assert_eq!(seen.borrow().len(), count);
    }
}
