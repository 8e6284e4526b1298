//! Input signals: scroll position and pointer offset
//!
//! The `EventTarget` is the page-level listener registry. Signals register on
//! `attach` and must `detach` on teardown; the registry's `listener_count` is what
//! leak checks compare against.

use crate::frame::OwnerId;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Identifies one registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// Kinds of input events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Page scrolled
    Scroll,
    /// Pointer entered, moved over or left an element
    Pointer,
    /// Element or viewport resized
    Resize,
}

impl EventKind {
    fn bit(self) -> u8 {
        match self {
            EventKind::Scroll => 1,
            EventKind::Pointer => 2,
            EventKind::Resize => 4,
        }
    }
}

/// Set of event kinds a listener subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventKinds(u8);

impl EventKinds {
    /// Empty set
    pub const NONE: EventKinds = EventKinds(0);

    /// Add a kind
    pub fn with(self, kind: EventKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Whether `kind` is in the set
    pub fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }
}

impl From<EventKind> for EventKinds {
    fn from(kind: EventKind) -> Self {
        EventKinds::NONE.with(kind)
    }
}

/// Scroll state of the page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top
    pub scroll_top: f32,
    /// Full document height
    pub scroll_height: f32,
    /// Visible height
    pub viewport_height: f32,
}

impl ScrollMetrics {
    /// Scrolled fraction in `[0, 1]`; 0 when the page cannot scroll
    pub fn fraction(&self) -> f32 {
        let range = self.scroll_height - self.viewport_height;
        if !range.is_finite() || range <= 0.0 || !self.scroll_top.is_finite() {
            return 0.0;
        }
        (self.scroll_top / range).clamp(0.0, 1.0)
    }
}

/// Element rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementBounds {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl ElementBounds {
    /// Bounds from position and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Centre point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the element has no area
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Pointer offset from the centre, each axis in `[-1, 1]`
    pub fn normalized_offset(&self, point: Vec2) -> Vec2 {
        if self.is_empty() || !point.is_finite() {
            return Vec2::ZERO;
        }
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        ((point - self.center()) / half).clamp(Vec2::splat(-1.0), Vec2::splat(1.0))
    }
}

/// Input events dispatched by the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// New scroll position
    Scroll(ScrollMetrics),
    /// Pointer entered the element at a page position
    PointerEnter(Vec2),
    /// Pointer moved to a page position
    PointerMove(Vec2),
    /// Pointer left the element
    PointerLeave,
    /// Element bounds changed
    Resize(ElementBounds),
}

impl InputEvent {
    /// Kind used for listener matching
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::Scroll(_) => EventKind::Scroll,
            InputEvent::PointerEnter(_) | InputEvent::PointerMove(_) | InputEvent::PointerLeave => {
                EventKind::Pointer
            }
            InputEvent::Resize(_) => EventKind::Resize,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    owner: OwnerId,
    kinds: EventKinds,
}

/// Listener registry
#[derive(Debug, Default)]
pub struct EventTarget {
    next_id: u64,
    listeners: BTreeMap<ListenerId, Listener>,
}

impl EventTarget {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `owner`
    pub fn add_listener(&mut self, owner: OwnerId, kinds: impl Into<EventKinds>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.insert(
            id,
            Listener {
                owner,
                kinds: kinds.into(),
            },
        );
        id
    }

    /// Remove a listener; false if it was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners registered by one owner
    pub fn listeners_for(&self, owner: OwnerId) -> usize {
        self.listeners.values().filter(|l| l.owner == owner).count()
    }

    /// Owners subscribed to `event`, each listed once, in registration order
    pub fn recipients(&self, event: &InputEvent) -> Vec<OwnerId> {
        let kind = event.kind();
        let mut owners: Vec<OwnerId> = Vec::new();
        for listener in self.listeners.values() {
            if listener.kinds.contains(kind) && !owners.contains(&listener.owner) {
                owners.push(listener.owner);
            }
        }
        owners
    }
}

/// A continuously changing input value
pub trait SignalSource {
    /// Raw value type
    type Value;

    /// Register listeners on `target`
    fn attach(&mut self, target: &mut EventTarget, owner: OwnerId);

    /// Remove listeners; idempotent
    fn detach(&mut self, target: &mut EventTarget);

    /// Feed one event; returns true if the raw value changed
    fn handle_event(&mut self, event: &InputEvent) -> bool;

    /// Latest raw value
    fn current(&self) -> Self::Value;
}

/// Vertical scroll fraction of the page
#[derive(Debug, Default)]
pub struct ScrollSignal {
    listener: Option<ListenerId>,
    fraction: f32,
}

impl ScrollSignal {
    /// Signal at the top of the page
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether listeners are registered
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }
}

impl SignalSource for ScrollSignal {
    type Value = f32;

    fn attach(&mut self, target: &mut EventTarget, owner: OwnerId) {
        if self.listener.is_none() {
            self.listener = Some(target.add_listener(owner, EventKind::Scroll));
        }
    }

    fn detach(&mut self, target: &mut EventTarget) {
        if let Some(id) = self.listener.take() {
            target.remove_listener(id);
        }
    }

    fn handle_event(&mut self, event: &InputEvent) -> bool {
        if self.listener.is_none() {
            return false;
        }
        match event {
            InputEvent::Scroll(metrics) => {
                let fraction = metrics.fraction();
                let changed = fraction != self.fraction;
                self.fraction = fraction;
                changed
            }
            _ => false,
        }
    }

    fn current(&self) -> f32 {
        self.fraction
    }
}

/// Pointer offset relative to an element's centre
#[derive(Debug)]
pub struct PointerSignal {
    listener: Option<ListenerId>,
    bounds: ElementBounds,
    last_point: Option<Vec2>,
    offset: Vec2,
}

impl PointerSignal {
    /// Signal for an element with the given bounds
    pub fn new(bounds: ElementBounds) -> Self {
        Self {
            listener: None,
            bounds,
            last_point: None,
            offset: Vec2::ZERO,
        }
    }

    /// Cached element bounds
    pub fn bounds(&self) -> ElementBounds {
        self.bounds
    }

    /// Whether listeners are registered
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    fn set_offset(&mut self, offset: Vec2) -> bool {
        let changed = offset != self.offset;
        self.offset = offset;
        changed
    }
}

impl SignalSource for PointerSignal {
    type Value = Vec2;

    fn attach(&mut self, target: &mut EventTarget, owner: OwnerId) {
        if self.listener.is_none() {
            let kinds = EventKinds::from(EventKind::Pointer).with(EventKind::Resize);
            self.listener = Some(target.add_listener(owner, kinds));
        }
    }

    fn detach(&mut self, target: &mut EventTarget) {
        if let Some(id) = self.listener.take() {
            target.remove_listener(id);
        }
    }

    fn handle_event(&mut self, event: &InputEvent) -> bool {
        if self.listener.is_none() {
            return false;
        }
        match *event {
            InputEvent::PointerEnter(point) | InputEvent::PointerMove(point) => {
                self.last_point = Some(point);
                let offset = self.bounds.normalized_offset(point);
                self.set_offset(offset)
            }
            InputEvent::PointerLeave => {
                self.last_point = None;
                self.set_offset(Vec2::ZERO)
            }
            InputEvent::Resize(bounds) => {
                debug!("PointerSignal bounds updated: {:?}", bounds);
                self.bounds = bounds;
                match self.last_point {
                    Some(point) => {
                        let offset = self.bounds.normalized_offset(point);
                        self.set_offset(offset)
                    }
                    None => false,
                }
            }
            InputEvent::Scroll(_) => false,
        }
    }

    fn current(&self) -> Vec2 {
        self.offset
    }
}
