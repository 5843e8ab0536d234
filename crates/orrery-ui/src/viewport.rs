//! The component that hosts an engine and scene.
//!
//! A [`Viewport`] owns its props, the surface it is attached to, the
//! lifecycle controller and its descendants. Hosts drive it with
//! [`attach`](Viewport::attach), [`set_props`](Viewport::set_props),
//! [`reconcile`](Viewport::reconcile) and [`unmount`](Viewport::unmount).
//!
//! Descendant visibility follows `render_children_when_ready`: with the flag
//! off children are always mounted; with it on they are mounted once the
//! current scene reports ready and stay mounted for the rest of that cycle.

use anyhow::Result;

use orrery_engine::core::{RenderScene, SurfaceOf};
use orrery_engine::window::WindowEvents;

use crate::component::{Component, Element};
use crate::context::ViewportCtx;
use crate::controller::ViewportController;
use crate::props::ViewportProps;

pub struct Viewport<S: RenderScene> {
    props:      ViewportProps<S>,
    surface:    Option<SurfaceOf<S>>,
    controller: ViewportController<S>,
    children:   Vec<Element<S>>,
    /// Context revision the mounted children last saw.
    seen:       u64,
}

impl<S: RenderScene> Viewport<S> {
    pub fn new(props: ViewportProps<S>, window_events: &WindowEvents) -> Self {
        Self {
            props,
            surface:    None,
            controller: ViewportController::new(window_events),
            children:   Vec::new(),
            seen:       0,
        }
    }

    /// Add a descendant.
    pub fn child<C: Component<S>>(mut self, component: C) -> Self {
        self.children.push(Element::new(component));
        self
    }

    pub fn push_child(&mut self, component: Box<dyn Component<S>>) {
        self.children.push(Element::boxed(component));
    }

    pub fn props(&self) -> &ViewportProps<S> {
        &self.props
    }

    pub fn surface(&self) -> Option<&SurfaceOf<S>> {
        self.surface.as_ref()
    }

    pub fn context(&self) -> &ViewportCtx<S> {
        self.controller.context()
    }

    pub fn controller(&self) -> &ViewportController<S> {
        &self.controller
    }

    /// Whether descendants should currently be mounted.
    pub fn children_visible(&self) -> bool {
        !self.props.render_children_when_ready || self.context().scene_ready()
    }

    /// Binds the viewport to `surface` and starts a cycle on it.
    ///
    /// Children are reconciled even when setup fails, against the empty
    /// context.
    pub fn attach(&mut self, surface: SurfaceOf<S>) -> Result<()> {
        let surface = self.surface.insert(surface);
        let result = self.controller.setup(Some(surface), &self.props);
        self.reconcile();
        result
    }

    /// Tears the cycle down and forgets the surface. Children stay subject
    /// to the visibility policy.
    pub fn detach(&mut self) {
        self.controller.teardown();
        self.surface = None;
        self.reconcile();
    }

    /// Replaces the props, starting a new cycle only if a setup input changed.
    pub fn set_props(&mut self, props: ViewportProps<S>) -> Result<()> {
        let rebuild = !self.props.same_cycle_inputs(&props);
        self.props = props;

        let result = if rebuild {
            log::debug!("viewport props changed; rebuilding");
            self.controller.setup(self.surface.as_ref(), &self.props)
        } else {
            Ok(())
        };

        self.reconcile();
        result
    }

    /// Brings descendants in line with the visibility policy and the latest
    /// published context.
    pub fn reconcile(&mut self) {
        let ctx = self.controller.context().clone();
        let revision = ctx.revision();

        if self.children_visible() {
            let changed = revision != self.seen;
            for child in &mut self.children {
                if !child.is_mounted() {
                    child.mount(&ctx);
                } else if changed {
                    child.update(&ctx);
                }
            }
        } else {
            for child in self.children.iter_mut().rev() {
                child.unmount();
            }
        }

        self.seen = revision;
    }

    /// Removes the descendants, unmounting them first.
    pub fn take_children(&mut self) -> Vec<Element<S>> {
        for child in self.children.iter_mut().rev() {
            child.unmount();
        }
        std::mem::take(&mut self.children)
    }

    /// Unmounts descendants (last first), then tears the cycle down.
    pub fn unmount(&mut self) {
        for child in self.children.iter_mut().rev() {
            child.unmount();
        }
        self.controller.teardown();
        self.surface = None;
    }
}

impl<S: RenderScene> Drop for Viewport<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::testing::{FakeScene, FakeSceneOptions, FakeSurface, Journal, Tracer};

    fn lazy() -> FakeSceneOptions {
        FakeSceneOptions { start_ready: false, ..Default::default() }
    }

    fn child_entries(journal: &Journal) -> Vec<String> {
        journal.entries().into_iter().filter(|e| e.starts_with("child")).collect()
    }

    #[test]
    fn children_are_present_without_the_policy() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let mut vp = Viewport::new(ViewportProps::<FakeScene>::new(|_| {}).scene_options(lazy()), &events)
            .child(Tracer::new("child", &journal));

        vp.reconcile();
        assert_eq!(child_entries(&journal), vec!["child mount ready=false"]);

        vp.attach(FakeSurface::new(&journal)).unwrap();
        assert_eq!(child_entries(&journal), vec!["child mount ready=false", "child update ready=false"]);
    }

    #[test]
    fn children_wait_for_readiness() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let props = ViewportProps::<FakeScene>::new(|_| {})
            .scene_options(lazy())
            .render_children_when_ready(true);
        let mut vp = Viewport::new(props, &events).child(Tracer::new("child", &journal));

        vp.attach(FakeSurface::new(&journal)).unwrap();
        vp.reconcile();
        assert!(!vp.children_visible());
        assert!(child_entries(&journal).is_empty());

        vp.controller().scene().unwrap().mark_ready();
        vp.reconcile();
        assert_eq!(child_entries(&journal), vec!["child mount ready=true"]);

        vp.controller().engine().unwrap().tick();
        vp.reconcile();
        assert!(vp.children_visible());
        assert_eq!(child_entries(&journal), vec!["child mount ready=true"]);
    }

    #[test]
    fn ready_scene_shows_children_on_attach() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let props = ViewportProps::<FakeScene>::new(|_| {}).render_children_when_ready(true);
        let mut vp = Viewport::new(props, &events).child(Tracer::new("child", &journal));

        vp.attach(FakeSurface::new(&journal)).unwrap();

        assert_eq!(child_entries(&journal), vec!["child mount ready=true"]);
    }

    #[test]
    fn new_cycle_withholds_children_again() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let props = ViewportProps::<FakeScene>::new(|_| {})
            .scene_options(lazy())
            .render_children_when_ready(true);
        let mut vp = Viewport::new(props.clone(), &events).child(Tracer::new("child", &journal));
        vp.attach(FakeSurface::new(&journal)).unwrap();
        vp.controller().scene().unwrap().mark_ready();
        vp.reconcile();

        vp.set_props(props.antialias(true)).unwrap();

        assert_eq!(vp.controller().cycles(), 2);
        assert_eq!(child_entries(&journal), vec!["child mount ready=true", "child unmount"]);
    }

    #[test]
    fn visibility_flag_alone_does_not_rebuild() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let props = ViewportProps::<FakeScene>::new(|_| {}).scene_options(lazy());
        let mut vp = Viewport::new(props.clone(), &events).child(Tracer::new("child", &journal));
        vp.attach(FakeSurface::new(&journal)).unwrap();
        let engine = vp.controller().engine().unwrap();

        vp.set_props(props.render_children_when_ready(true)).unwrap();

        assert_eq!(vp.controller().cycles(), 1);
        assert!(vp.controller().engine() == Some(engine));
        assert_eq!(child_entries(&journal), vec!["child mount ready=false", "child unmount"]);
    }

    #[test]
    fn new_callback_identity_rebuilds() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let on_ready: Rc<dyn Fn(&FakeScene)> = Rc::new(|_| {});
        let mut vp = Viewport::new(ViewportProps::with_ready_callback(Rc::clone(&on_ready)), &events);
        vp.attach(FakeSurface::new(&journal)).unwrap();

        vp.set_props(ViewportProps::with_ready_callback(on_ready)).unwrap();
        assert_eq!(vp.controller().cycles(), 1);

        vp.set_props(ViewportProps::<FakeScene>::new(|_| {})).unwrap();
        assert_eq!(vp.controller().cycles(), 2);
        assert_eq!(journal.count("dispose"), 1);
    }

    #[test]
    fn children_move_to_a_new_viewport() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let props = ViewportProps::<FakeScene>::new(|_| {});
        let mut first = Viewport::new(props.clone(), &events).child(Tracer::new("child", &journal));
        first.attach(FakeSurface::new(&journal)).unwrap();
        first.unmount();

        let children = first.take_children();
        assert_eq!(children.len(), 1);
        drop(first);

        let mut second = Viewport::new(props, &events);
        for child in children {
            second.push_child(child.into_inner());
        }
        second.attach(FakeSurface::new(&journal)).unwrap();

        assert_eq!(
            child_entries(&journal),
            vec!["child mount ready=true", "child unmount", "child mount ready=true"]
        );
        assert_eq!(journal.live_engines(), 1);
    }

    #[test]
    fn set_props_before_attach_creates_nothing() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let mut vp = Viewport::new(ViewportProps::<FakeScene>::new(|_| {}), &events);

        vp.set_props(ViewportProps::<FakeScene>::new(|_| {}).antialias(true)).unwrap();

        assert!(!vp.controller().is_active());
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn children_see_ready_updates() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let props = ViewportProps::<FakeScene>::new(|_| {}).scene_options(lazy());
        let mut vp = Viewport::new(props, &events).child(Tracer::new("child", &journal));
        vp.attach(FakeSurface::new(&journal)).unwrap();

        vp.reconcile();
        vp.controller().scene().unwrap().mark_ready();
        vp.reconcile();

        assert_eq!(
            child_entries(&journal),
            vec!["child mount ready=false", "child update ready=true"]
        );
    }

    #[test]
    fn unmount_removes_children_before_disposing() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let mut vp = Viewport::new(ViewportProps::<FakeScene>::new(|_| {}), &events)
            .child(Tracer::new("child", &journal));
        vp.attach(FakeSurface::new(&journal)).unwrap();

        vp.unmount();
        vp.unmount();

        let unmounted = journal.position("child unmount").unwrap();
        let disposed = journal.position("engine#1 dispose").unwrap();
        assert!(unmounted < disposed);
        assert_eq!(journal.count("dispose"), 1);
        assert!(vp.surface().is_none());
    }

    #[test]
    fn failed_setup_still_reconciles() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let props = ViewportProps::<FakeScene>::new(|_| {})
            .scene_options(FakeSceneOptions { fail: true, ..Default::default() });
        let mut vp = Viewport::new(props, &events).child(Tracer::new("child", &journal));

        assert!(vp.attach(FakeSurface::new(&journal)).is_err());

        assert!(!vp.controller().is_active());
        assert_eq!(child_entries(&journal), vec!["child mount ready=false"]);
    }

    #[test]
    fn detach_keeps_children_but_drops_the_cycle() {
        let journal = Journal::default();
        let events = WindowEvents::new();
        let mut vp = Viewport::new(ViewportProps::<FakeScene>::new(|_| {}), &events)
            .child(Tracer::new("child", &journal));
        vp.attach(FakeSurface::new(&journal)).unwrap();

        vp.detach();

        assert!(vp.context().engine().is_none());
        assert_eq!(journal.count("dispose"), 1);
        assert_eq!(
            child_entries(&journal),
            vec!["child mount ready=true", "child update ready=false"]
        );
    }
}
