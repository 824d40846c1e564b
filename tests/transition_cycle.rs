use std::cell::Cell;
use std::rc::Rc;

use hero::paint::DrawCommand;
use hero::prelude::*;

const STEP: f32 = 1.0 / 60.0;
const SOURCE_COLOR: Color = Color::rgb(0.9, 0.3, 0.1);
const DESTINATION_COLOR: Color = Color::rgb(0.1, 0.3, 0.9);

fn small() -> Frame {
    Frame::new(0.0, 0.0, 100.0, 100.0)
}

fn large() -> Frame {
    Frame::new(0.0, 0.0, 400.0, 400.0)
}

/// Lays out its child only once opened.
struct Gate<V> {
    open: Rc<Cell<bool>>,
    child: V,
}

impl<V: View> View for Gate<V> {
    fn layout(&mut self, bounds: Frame) {
        if self.open.get() {
            self.child.layout(bounds);
        }
    }

    fn paint(&self, ctx: &mut PaintContext) {
        if self.open.get() {
            self.child.paint(ctx);
        }
    }
}

struct Harness {
    host: Rc<HeadlessHost>,
    flag: Signal<bool>,
    coordinator: PresentationCoordinator,
}

impl Harness {
    fn run(&self, secs: f32) {
        let steps = (secs / STEP).ceil() as usize;
        for _ in 0..steps {
            self.host.frame(STEP);
        }
    }

    fn state(&self) -> TransitionState {
        self.coordinator.state().expect("cycle in flight")
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn harness<F, V>(ids: &[&str], destination: F) -> Harness
where
    F: Fn(&TransitionState) -> V + 'static,
    V: View + 'static,
{
    init_logger();
    let registry = GeometryRegistry::new();
    let scheduler = Scheduler::new();

    let mut root = Stack::new().child(
        Frame::new(0.0, 0.0, 800.0, 600.0),
        Fill::new(Snapshot::solid(Color::WHITE)),
    );
    for (i, id) in ids.iter().enumerate() {
        root = root.child(
            small().offset(0.0, i as f32 * 120.0),
            SourceElement::new(*id, Snapshot::solid(SOURCE_COLOR), &registry),
        );
    }

    let host = HeadlessHost::new(
        Frame::new(0.0, 0.0, 800.0, 600.0),
        registry.clone(),
        scheduler.clone(),
        root,
    );
    let flag = create_signal(false);
    let coordinator = PresentationCoordinator::new(
        host.clone(),
        registry,
        scheduler,
        flag.clone(),
        destination,
        TransitionConfig::default(),
    );
    // Sources must be laid out before the flag flips
    host.frame(STEP);

    Harness {
        host,
        flag,
        coordinator,
    }
}

/// Frames and opacities of every solid fill in `color`.
fn fills(commands: &[DrawCommand], color: Color) -> Vec<(Frame, f32)> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Fill {
                frame,
                color: fill,
                opacity,
            } if *fill == color => Some((*frame, *opacity)),
            _ => None,
        })
        .collect()
}

fn image_harness() -> Harness {
    harness(&["image"], |state| {
        Stack::new().child(
            large(),
            DestinationElement::new("image", Snapshot::solid(DESTINATION_COLOR), state),
        )
    })
}

#[test]
fn test_present_morphs_image_from_small_to_large() {
    let h = image_harness();
    h.flag.set(true);

    assert_eq!(h.host.present_calls(), 1);
    let state = h.state();
    assert_eq!(state.tracked_ids(), vec![MatchId::from("image")]);
    assert_eq!(state.source_frames().get(&"image".into()), Some(&small()));
    assert_eq!(h.host.modal_opacity(), Some(0.0));

    // Destination reports, barrier opens, motion starts
    h.host.frame(STEP);
    assert_eq!(state.mode(), TransitionMode::Presenting);
    assert!(state.is_animating());
    assert_eq!(state.current_frame(&"image".into()), Some(large()));
    let overlay = h.host.overlay().expect("overlay mounted");
    assert_eq!(overlay.rendered_frame(&"image".into()), Some(small()));

    h.run(0.1);
    let midway = overlay.rendered_frame(&"image".into()).expect("layer");
    assert!(
        midway.width > 100.0 && midway.width < 400.0,
        "midway width {}",
        midway.width
    );

    h.run(1.0);
    assert!(!state.is_animating());
    assert_eq!(state.mode(), TransitionMode::Presenting);
    assert!(overlay.is_hidden());
    assert_eq!(h.host.modal_opacity(), Some(1.0));
    assert!(!h.host.is_transition_in_flight());

    // Real destination is back on screen and the proxy is gone
    let commands = h.host.paint().into_commands();
    assert_eq!(fills(&commands, DESTINATION_COLOR), vec![(large(), 1.0)]);
}

#[test]
fn test_overlay_draws_destination_over_hidden_content() {
    let h = image_harness();
    h.flag.set(true);
    h.run(0.25);

    let overlay = h.host.overlay().expect("overlay mounted");
    let rendered = overlay.rendered_frame(&"image".into()).expect("layer");
    let commands = h.host.paint().into_commands();

    let sources = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Fill { color, .. } if *color == SOURCE_COLOR))
        .count();
    let destinations: Vec<Frame> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Fill { frame, color, .. } if *color == DESTINATION_COLOR => Some(*frame),
            _ => None,
        })
        .collect();

    assert_eq!(sources, 0, "real source and overlay source are both hidden");
    assert_eq!(destinations, vec![rendered]);
}

#[test]
fn test_dismiss_morphs_back_and_closes_cycle() {
    let h = image_harness();
    h.flag.set(true);
    h.run(1.2);
    let state = h.state();

    h.flag.set(false);
    assert_eq!(h.host.dismiss_calls(), 1);
    assert_eq!(state.mode(), TransitionMode::Dismissing);
    assert_eq!(state.current_frame(&"image".into()), Some(large()));
    assert!(h.coordinator.is_dismissing());

    h.host.frame(STEP);
    assert!(state.is_animating());
    assert_eq!(state.current_frame(&"image".into()), Some(small()));

    h.run(1.2);
    assert!(!h.host.is_presenting());
    assert!(h.coordinator.state().is_none());
    assert!(!h.coordinator.did_present());
    assert!(!h.coordinator.is_dismissing());
    assert!(!state.is_animating());
    assert_eq!(state.mode(), TransitionMode::Idle);
    assert_eq!(state.observer_count(), 0);
    assert_eq!(h.host.root_opacity(), 1.0);

    let commands = h.host.paint().into_commands();
    assert_eq!(fills(&commands, SOURCE_COLOR), vec![(small(), 1.0)]);
    assert!(fills(&commands, DESTINATION_COLOR).is_empty());
}

#[test]
fn test_dismiss_requested_mid_present_keeps_overlay_visible() {
    let h = image_harness();
    h.flag.set(true);
    h.run(0.3);
    let state = h.state();
    let overlay = h.host.overlay().expect("overlay mounted");

    h.flag.set(false);
    assert_eq!(h.host.dismiss_calls(), 1);
    assert_eq!(state.mode(), TransitionMode::Presenting, "dismiss waits for present");

    // Present finishes and the queued dismiss takes over
    h.run(0.8);
    assert_eq!(state.mode(), TransitionMode::Dismissing);
    assert!(state.is_animating());
    assert!(!overlay.is_hidden());

    let rendered = overlay.rendered_frame(&"image".into()).expect("layer");
    let proxies = fills(&h.host.paint().into_commands(), DESTINATION_COLOR);
    assert_eq!(proxies.len(), 1);
    assert!(proxies[0].0.approx_eq(&rendered, 0.001));

    h.run(1.2);
    assert!(!h.host.is_presenting());
    assert_eq!(state.mode(), TransitionMode::Idle);
    let commands = h.host.paint().into_commands();
    assert_eq!(fills(&commands, SOURCE_COLOR), vec![(small(), 1.0)]);
}

#[test]
fn test_motion_waits_for_every_destination() {
    let gate = Rc::new(Cell::new(false));
    let open = gate.clone();
    let h = harness(&["a", "b"], move |state| {
        Stack::new()
            .child(
                large(),
                DestinationElement::new("a", Snapshot::solid(DESTINATION_COLOR), state),
            )
            .child(
                large().offset(0.0, 420.0),
                Gate {
                    open: open.clone(),
                    child: DestinationElement::new("b", Snapshot::solid(DESTINATION_COLOR), state),
                },
            )
    });
    h.flag.set(true);
    let state = h.state();

    h.run(0.5);
    assert!(!state.is_animating());
    assert_eq!(state.mode(), TransitionMode::Idle);
    assert_eq!(state.missing_destinations(), vec![MatchId::from("b")]);
    assert_eq!(h.host.modal_opacity(), Some(0.0));
    assert!(state.current_frames().is_empty());

    gate.set(true);
    h.host.frame(STEP);
    assert!(state.is_animating());
    assert_eq!(state.mode(), TransitionMode::Presenting);
    assert_eq!(state.current_frames().len(), 2);
}

#[test]
fn test_repeated_flag_writes_call_host_once() {
    let h = image_harness();
    h.flag.set(true);
    h.coordinator.sync();
    h.flag.set(true);
    h.coordinator.sync();
    assert_eq!(h.host.present_calls(), 1);

    h.run(1.2);
    h.flag.set(false);
    h.coordinator.sync();
    h.coordinator.sync();
    assert_eq!(h.host.dismiss_calls(), 1);
}

#[test]
fn test_user_dismiss_writes_flag_back() {
    let h = image_harness();
    h.flag.set(true);
    h.run(1.2);

    h.host.user_dismiss();
    assert!(!h.flag.get());
    assert!(h.coordinator.is_dismissing());
    assert_eq!(h.host.dismiss_calls(), 0, "host already dismissing on its own");

    h.run(1.2);
    assert!(!h.host.is_presenting());
    assert!(h.coordinator.state().is_none());
    assert_eq!(h.host.present_calls(), 1);
}

#[test]
fn test_flag_raised_during_dismissal_presents_again() {
    let h = image_harness();
    h.flag.set(true);
    h.run(1.2);
    let first = h.state();

    h.flag.set(false);
    h.run(0.3);
    h.flag.set(true);
    assert_eq!(h.host.present_calls(), 1, "waits for the dismissal");

    h.run(1.0);
    assert_eq!(h.host.present_calls(), 2);
    assert!(h.host.is_presenting());
    assert_eq!(first.mode(), TransitionMode::Idle);
    assert!(h.state().is_cycle_open());
}

#[test]
fn test_screen_without_matches_still_cross_fades() {
    let h = harness(&[], |_| Fill::new(Snapshot::solid(DESTINATION_COLOR)));
    h.flag.set(true);
    let state = h.state();
    assert!(state.is_ready());

    h.host.frame(STEP);
    assert!(state.is_animating());
    h.run(1.2);
    assert!(!state.is_animating());
    assert_eq!(h.host.modal_opacity(), Some(1.0));
}
