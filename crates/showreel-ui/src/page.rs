//! Page - the host every widget is mounted into
//!
//! The page owns the platform pieces a widget talks to: the audio host, the event
//! target listeners register on, and the frame clock callbacks are scheduled on.
//! Widgets only see them through a `WidgetContext` for the duration of a call.

use showreel_core::{
    AudioHost, DueFrame, EventTarget, FrameClock, FrameScheduler, InputEvent, OwnerId,
};
use std::any::Any;
use std::collections::BTreeMap;
use tracing::{debug, info, trace};

/// Actions a user can trigger on a mounted widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Play if paused, pause if playing
    TogglePlayback,
}

/// Page services lent to a widget for one call
pub struct WidgetContext<'a> {
    /// Id the page assigned to this widget
    pub owner: OwnerId,
    /// Listener registry
    pub events: &'a mut EventTarget,
    /// Frame scheduler
    pub frames: &'a mut dyn FrameScheduler,
    /// Audio platform
    pub host: &'a dyn AudioHost,
}

/// A mountable visual component
pub trait Widget: Any {
    /// Called once after the page assigned an owner id
    fn on_mount(&mut self, ctx: &mut WidgetContext<'_>);

    /// An input event this widget listens for
    fn on_event(&mut self, event: &InputEvent, ctx: &mut WidgetContext<'_>);

    /// A frame this widget requested became due
    fn on_frame(&mut self, frame: &DueFrame, ctx: &mut WidgetContext<'_>);

    /// A user action addressed to this widget
    fn on_action(&mut self, _action: UiAction, _ctx: &mut WidgetContext<'_>) {}

    /// Release listeners and frames; must be idempotent
    fn dispose(&mut self, ctx: &mut WidgetContext<'_>);

    /// Upcast for typed access
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Owns mounted widgets and the services they share
pub struct Page {
    host: Box<dyn AudioHost>,
    events: EventTarget,
    clock: FrameClock,
    widgets: BTreeMap<OwnerId, Box<dyn Widget>>,
    next_owner: OwnerId,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("widgets", &self.widgets.len())
            .field("listeners", &self.events.listener_count())
            .field("pending_frames", &self.clock.pending_count())
            .finish()
    }
}

impl Page {
    /// Empty page on `host`
    pub fn new(host: impl AudioHost + 'static) -> Self {
        Self {
            host: Box::new(host),
            events: EventTarget::new(),
            clock: FrameClock::new(),
            widgets: BTreeMap::new(),
            next_owner: 0,
        }
    }

    /// Audio platform, for creating visualizers before mounting them
    pub fn host(&self) -> &dyn AudioHost {
        self.host.as_ref()
    }

    /// Listener registry
    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Mounted widget count
    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Mount `widget` and return its owner id
    pub fn mount<W: Widget>(&mut self, widget: W) -> OwnerId {
        self.next_owner += 1;
        let owner = self.next_owner;
        let mut widget: Box<dyn Widget> = Box::new(widget);

        let mut ctx = WidgetContext {
            owner,
            events: &mut self.events,
            frames: &mut self.clock,
            host: self.host.as_ref(),
        };
        widget.on_mount(&mut ctx);
        self.widgets.insert(owner, widget);

        debug!("Widget {} mounted", owner);
        owner
    }

    /// Dispose and remove a widget; unknown ids are ignored
    pub fn unmount(&mut self, owner: OwnerId) -> bool {
        let Some(mut widget) = self.widgets.remove(&owner) else {
            return false;
        };
        let mut ctx = WidgetContext {
            owner,
            events: &mut self.events,
            frames: &mut self.clock,
            host: self.host.as_ref(),
        };
        widget.dispose(&mut ctx);
        debug!("Widget {} unmounted", owner);
        true
    }

    /// Deliver `event` to every subscribed widget; returns how many received it
    pub fn dispatch(&mut self, event: InputEvent) -> usize {
        let recipients = self.events.recipients(&event);
        let mut delivered = 0;
        for owner in recipients {
            let Some(widget) = self.widgets.get_mut(&owner) else {
                continue;
            };
            let mut ctx = WidgetContext {
                owner,
                events: &mut self.events,
                frames: &mut self.clock,
                host: self.host.as_ref(),
            };
            widget.on_event(&event, &mut ctx);
            delivered += 1;
        }
        trace!("Event {:?} delivered to {} widget(s)", event.kind(), delivered);
        delivered
    }

    /// Send a user action to one widget
    pub fn send(&mut self, owner: OwnerId, action: UiAction) -> bool {
        let Some(widget) = self.widgets.get_mut(&owner) else {
            return false;
        };
        let mut ctx = WidgetContext {
            owner,
            events: &mut self.events,
            frames: &mut self.clock,
            host: self.host.as_ref(),
        };
        widget.on_action(action, &mut ctx);
        true
    }

    /// Advance the frame clock and run every due callback; returns callbacks run
    pub fn advance(&mut self, dt: f64) -> usize {
        let due = self.clock.advance(dt);
        let mut ran = 0;
        for frame in &due {
            // Frames for widgets unmounted in the meantime are dropped
            let Some(widget) = self.widgets.get_mut(&frame.owner) else {
                continue;
            };
            let mut ctx = WidgetContext {
                owner: frame.owner,
                events: &mut self.events,
                frames: &mut self.clock,
                host: self.host.as_ref(),
            };
            widget.on_frame(frame, &mut ctx);
            ran += 1;
        }
        ran
    }

    /// Typed access to a mounted widget
    pub fn widget<W: Widget>(&self, owner: OwnerId) -> Option<&W> {
        self.widgets.get(&owner)?.as_any().downcast_ref::<W>()
    }

    /// Typed mutable access to a mounted widget
    pub fn widget_mut<W: Widget>(&mut self, owner: OwnerId) -> Option<&mut W> {
        self.widgets
            .get_mut(&owner)?
            .as_any_mut()
            .downcast_mut::<W>()
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        let owners: Vec<OwnerId> = self.widgets.keys().copied().collect();
        if !owners.is_empty() {
            info!("Page dropped with {} widget(s) mounted", owners.len());
        }
        for owner in owners {
            self.unmount(owner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showreel_core::{EventKind, ListenerId, OfflineHost, ScrollMetrics};

    /// Counts calls and keeps one listener plus one frame request alive
    #[derive(Default)]
    struct Probe {
        listener: Option<ListenerId>,
        events: usize,
        frames: usize,
        disposed: usize,
    }

    impl Widget for Probe {
        fn on_mount(&mut self, ctx: &mut WidgetContext<'_>) {
            self.listener = Some(ctx.events.add_listener(ctx.owner, EventKind::Scroll));
            ctx.frames.request_frame(ctx.owner);
        }

        fn on_event(&mut self, _event: &InputEvent, _ctx: &mut WidgetContext<'_>) {
            self.events += 1;
        }

        fn on_frame(&mut self, _frame: &DueFrame, _ctx: &mut WidgetContext<'_>) {
            self.frames += 1;
        }

        fn dispose(&mut self, ctx: &mut WidgetContext<'_>) {
            self.disposed += 1;
            if let Some(id) = self.listener.take() {
                ctx.events.remove_listener(id);
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_mount_dispatch_advance() {
        let mut page = Page::new(OfflineHost::new());
        let id = page.mount(Probe::default());

        assert_eq!(page.dispatch(InputEvent::Scroll(ScrollMetrics::default())), 1);
        assert_eq!(page.dispatch(InputEvent::PointerLeave), 0);
        assert_eq!(page.advance(0.016), 1);

        let probe = page.widget::<Probe>(id).unwrap();
        assert_eq!((probe.events, probe.frames), (1, 1));
    }

    #[test]
    fn test_unmount_unknown_is_noop() {
        let mut page = Page::new(OfflineHost::new());
        let id = page.mount(Probe::default());
        assert!(page.unmount(id));
        assert!(!page.unmount(id));
        assert!(!page.unmount(999));
        assert_eq!(page.events().listener_count(), 0);
    }

    #[test]
    fn test_frames_for_unmounted_widgets_are_dropped() {
        let mut page = Page::new(OfflineHost::new());
        let id = page.mount(Probe::default());
        page.unmount(id);
        // Probe does not cancel its frame; the page must not call into a removed widget
        assert_eq!(page.advance(0.016), 0);
    }
}
