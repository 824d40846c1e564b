//! Presents and dismisses a modal on a calloop timer, logging the morphing
//! frame of the matched image.
//!
//! Run with `RUST_LOG=debug cargo run --example hero_demo`.

use std::rc::Rc;
use std::time::Duration;

use calloop::ping::make_ping;
use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use hero::prelude::*;

const FRAME: Duration = Duration::from_millis(16);

struct Demo {
    host: Rc<HeadlessHost>,
    flag: Signal<bool>,
    coordinator: PresentationCoordinator,
    elapsed: f32,
    logged_at: f32,
    done: bool,
}

impl Demo {
    fn tick(&mut self, dt: f32) {
        self.host.frame(dt);
        self.elapsed += dt;

        if self.elapsed >= 0.1 && !self.coordinator.did_present() && self.elapsed < 1.0 {
            log::info!("opening detail screen");
            self.flag.set(true);
        }
        if self.elapsed >= 1.6 && self.flag.get() {
            log::info!("closing detail screen");
            self.flag.set(false);
        }
        if self.elapsed >= 3.2 {
            self.done = true;
        }

        if self.elapsed - self.logged_at >= 0.1 {
            self.logged_at = self.elapsed;
            let id = MatchId::from("photo");
            let frame = self.host.overlay().and_then(|overlay| overlay.rendered_frame(&id));
            log::info!(
                "t={:.2}s overlay={:?} root_opacity={:.2} modal_opacity={:?}",
                self.elapsed,
                frame,
                self.host.root_opacity(),
                self.host.modal_opacity(),
            );
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let bounds = Frame::new(0.0, 0.0, 800.0, 600.0);
    let registry = GeometryRegistry::new();
    let scheduler = Scheduler::new();

    let root = Stack::new()
        .child(bounds, Fill::new(Snapshot::solid(Color::from_hex(0xf2f2f2))))
        .child(
            Frame::new(40.0, 40.0, 120.0, 80.0),
            SourceElement::new("photo", Snapshot::solid(Color::from_hex(0x3b82f6)), &registry),
        );
    let host = HeadlessHost::new(bounds, registry.clone(), scheduler.clone(), root);

    let flag = create_signal(false);
    let coordinator = PresentationCoordinator::new(
        host.clone(),
        registry,
        scheduler.clone(),
        flag.clone(),
        |state: &TransitionState| {
            Stack::new()
                .child(
                    Frame::new(0.0, 0.0, 800.0, 600.0),
                    Fill::new(Snapshot::solid(Color::WHITE)),
                )
                .child(
                    Frame::new(0.0, 0.0, 800.0, 450.0),
                    DestinationElement::new(
                        "photo",
                        Snapshot::solid(Color::from_hex(0x3b82f6)),
                        state,
                    ),
                )
        },
        TransitionConfig::default(),
    );

    let mut event_loop: EventLoop<Demo> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    let (ping, ping_source) = make_ping()?;
    scheduler.set_wakeup(ping);
    handle
        .insert_source(ping_source, |_, _, _| {})
        .map_err(|e| e.error)?;

    let dt = FRAME.as_secs_f32();
    handle
        .insert_source(Timer::from_duration(FRAME), move |_, _, demo| {
            demo.tick(dt);
            TimeoutAction::ToDuration(FRAME)
        })
        .map_err(|e| e.error)?;

    let mut demo = Demo {
        host,
        flag,
        coordinator,
        elapsed: 0.0,
        logged_at: 0.0,
        done: false,
    };

    let signal = event_loop.get_signal();
    event_loop.run(None, &mut demo, |demo| {
        if demo.done {
            signal.stop();
        }
    })?;

    log::info!(
        "finished: {} present(s), {} dismiss(es)",
        demo.host.present_calls(),
        demo.host.dismiss_calls()
    );
    Ok(())
}
