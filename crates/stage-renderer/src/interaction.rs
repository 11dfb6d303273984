//! Pointer interaction on instance nodes.
//!
//! The 2D backend reports raw pointer events on display nodes; they are
//! translated into [`InstanceEvent`]s for the instance owning the node and
//! delivered to an [`InstanceEventListener`]. Gesture disambiguation
//! (double clicks, pinches) is done by the backend before events get here.

use glam::Vec2;
use uuid::Uuid;

use crate::view::ViewTransform;

/// Mouse button of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Raw pointer event kinds reported on a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEventKind {
    Click(PointerButton),
    DoubleClick,
    Over,
    Out,
    Down(PointerButton),
    RightClick,
    TouchStart,
    PanMove { delta: Vec2 },
    PanEnd,
}

/// Raw pointer event on a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Position in canvas coordinates
    pub global: Vec2,
    /// Position relative to the event target element
    pub offset: Vec2,
    /// Position in window coordinates
    pub client: Vec2,
    /// The event belongs to a pinch gesture
    pub pinch: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, global: Vec2) -> Self {
        Self {
            kind,
            global,
            offset: global,
            client: global,
            pinch: false,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_client(mut self, client: Vec2) -> Self {
        self.client = client;
        self
    }

    pub fn with_pinch(mut self, pinch: bool) -> Self {
        self.pinch = pinch;
        self
    }
}

/// Interaction with an instance, in scene terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InstanceEvent {
    Clicked(Uuid),
    DoubleClicked(Uuid),
    Over(Uuid),
    Out(Uuid),
    /// Primary press or touch at a scene position
    Down { id: Uuid, scene: Vec2 },
    /// Context menu request, sent after the `Down` selecting the instance
    RightClicked { offset: Vec2, client: Vec2 },
    /// Drag by `delta` canvas pixels
    Moved { id: Uuid, delta: Vec2 },
    MoveEnded,
}

/// Receives instance interaction events.
pub trait InstanceEventListener {
    fn on_instance_event(&mut self, event: InstanceEvent);
}

impl<F: FnMut(InstanceEvent)> InstanceEventListener for F {
    fn on_instance_event(&mut self, event: InstanceEvent) {
        self(event)
    }
}

/// Translates a raw pointer event on the node of `instance`.
pub fn translate(
    event: &PointerEvent,
    instance: Uuid,
    view: &dyn ViewTransform,
) -> Vec<InstanceEvent> {
    let down = || InstanceEvent::Down {
        id: instance,
        scene: view.to_scene_coordinates(event.global),
    };

    match event.kind {
        PointerEventKind::Click(PointerButton::Primary) => vec![InstanceEvent::Clicked(instance)],
        PointerEventKind::Click(_) => Vec::new(),
        PointerEventKind::DoubleClick => vec![InstanceEvent::DoubleClicked(instance)],
        PointerEventKind::Over => vec![InstanceEvent::Over(instance)],
        PointerEventKind::Out => vec![InstanceEvent::Out(instance)],
        PointerEventKind::Down(PointerButton::Primary) => vec![down()],
        PointerEventKind::Down(_) => Vec::new(),
        PointerEventKind::RightClick => vec![
            down(),
            InstanceEvent::RightClicked {
                offset: event.offset,
                client: event.client,
            },
        ],
        PointerEventKind::TouchStart if event.pinch => Vec::new(),
        PointerEventKind::TouchStart => vec![down()],
        PointerEventKind::PanMove { .. } if event.pinch => Vec::new(),
        PointerEventKind::PanMove { delta } => vec![InstanceEvent::Moved {
            id: instance,
            delta,
        }],
        PointerEventKind::PanEnd => vec![InstanceEvent::MoveEnded],
    }
}

/// Translates `event` and delivers the result to `listener`.
///
/// Returns the number of delivered events.
pub fn dispatch(
    event: &PointerEvent,
    instance: Uuid,
    view: &dyn ViewTransform,
    listener: &mut dyn InstanceEventListener,
) -> usize {
    let events = translate(event, instance, view);
    let count = events.len();
    for event in events {
        listener.on_instance_event(event);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewPosition;

    fn view() -> ViewPosition {
        ViewPosition::new(200.0, 100.0).with_center(Vec2::new(1000.0, 500.0))
    }

    #[test]
    fn test_click_only_with_primary_button() {
        let id = Uuid::new_v4();
        let primary =
            PointerEvent::new(PointerEventKind::Click(PointerButton::Primary), Vec2::ZERO);
        let middle = PointerEvent::new(PointerEventKind::Click(PointerButton::Middle), Vec2::ZERO);

        assert_eq!(translate(&primary, id, &view()), vec![InstanceEvent::Clicked(id)]);
        assert!(translate(&middle, id, &view()).is_empty());
    }

    #[test]
    fn test_down_uses_scene_coordinates() {
        let id = Uuid::new_v4();
        let event = PointerEvent::new(
            PointerEventKind::Down(PointerButton::Primary),
            Vec2::new(100.0, 50.0),
        );
        assert_eq!(
            translate(&event, id, &view()),
            vec![InstanceEvent::Down {
                id,
                scene: Vec2::new(1000.0, 500.0)
            }]
        );

        let secondary = PointerEvent::new(
            PointerEventKind::Down(PointerButton::Secondary),
            Vec2::ZERO,
        );
        assert!(translate(&secondary, id, &view()).is_empty());
    }

    #[test]
    fn test_right_click_selects_first() {
        let id = Uuid::new_v4();
        let event = PointerEvent::new(PointerEventKind::RightClick, Vec2::new(0.0, 0.0))
            .with_offset(Vec2::new(5.0, 6.0))
            .with_client(Vec2::new(105.0, 206.0));

        let events = translate(&event, id, &view());
        assert_eq!(
            events,
            vec![
                InstanceEvent::Down {
                    id,
                    scene: Vec2::new(900.0, 450.0)
                },
                InstanceEvent::RightClicked {
                    offset: Vec2::new(5.0, 6.0),
                    client: Vec2::new(105.0, 206.0)
                },
            ]
        );
    }

    #[test]
    fn test_pinch_gestures_are_ignored() {
        let id = Uuid::new_v4();
        let touch = PointerEvent::new(PointerEventKind::TouchStart, Vec2::ZERO);
        let pan = PointerEvent::new(
            PointerEventKind::PanMove {
                delta: Vec2::new(3.0, -2.0),
            },
            Vec2::ZERO,
        );

        assert_eq!(translate(&touch, id, &view()).len(), 1);
        assert!(translate(&touch.with_pinch(true), id, &view()).is_empty());
        assert_eq!(
            translate(&pan, id, &view()),
            vec![InstanceEvent::Moved {
                id,
                delta: Vec2::new(3.0, -2.0)
            }]
        );
        assert!(translate(&pan.with_pinch(true), id, &view()).is_empty());
    }

    #[test]
    fn test_dispatch_to_closure_listener() {
        let id = Uuid::new_v4();
        let mut received = Vec::new();
        let mut listener = |event: InstanceEvent| received.push(event);

        let over = PointerEvent::new(PointerEventKind::Over, Vec2::ZERO);
        let end = PointerEvent::new(PointerEventKind::PanEnd, Vec2::ZERO);
        assert_eq!(dispatch(&over, id, &view(), &mut listener), 1);
        assert_eq!(dispatch(&end, id, &view(), &mut listener), 1);

        assert_eq!(received, vec![InstanceEvent::Over(id), InstanceEvent::MoveEnded]);
    }
}
