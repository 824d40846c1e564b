//! Run-on-next-tick continuations and per-frame animation callbacks.
//!
//! The host drives the scheduler once per frame with [`Scheduler::frame`].
//! Tasks posted during a frame run on the following one; this is how the
//! engine waits for a freshly mounted screen to finish a layout pass.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use calloop::ping::Ping;

/// Whether a frame callback wants to be called again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Finished,
}

type Task = Box<dyn FnOnce()>;
type FrameCallback = Box<dyn FnMut(f32) -> AnimationStatus>;

struct Animation {
    callback: FrameCallback,
    /// Registered since the last frame; the first call receives dt = 0.
    fresh: bool,
}

#[derive(Default)]
struct SchedulerInner {
    tasks: VecDeque<Task>,
    animations: Vec<Animation>,
    wakeup: Option<Ping>,
    frames: u64,
}

/// UI-thread task queue. Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the event loop whenever new work is queued.
    pub fn set_wakeup(&self, ping: Ping) {
        self.inner.borrow_mut().wakeup = Some(ping);
    }

    /// Queue `task` to run at the start of the next frame.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.tasks.push_back(Box::new(task));
        Self::wake(&inner);
    }

    /// Call `callback` with the frame delta every frame until it reports
    /// [`AnimationStatus::Finished`].
    pub fn add_animation<F>(&self, callback: F)
    where
        F: FnMut(f32) -> AnimationStatus + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner.animations.push(Animation {
            callback: Box::new(callback),
            fresh: true,
        });
        Self::wake(&inner);
    }

    fn wake(inner: &SchedulerInner) {
        if let Some(ping) = &inner.wakeup {
            ping.ping();
        }
    }

    /// Run one frame: drain tasks queued before this call, then advance
    /// animations by `dt` seconds. Returns the number of tasks run.
    pub fn frame(&self, dt: f32) -> usize {
        let tasks = {
            let mut inner = self.inner.borrow_mut();
            inner.frames += 1;
            std::mem::take(&mut inner.tasks)
        };
        let task_count = tasks.len();
        for task in tasks {
            task();
        }

        let animations = std::mem::take(&mut self.inner.borrow_mut().animations);
        let mut running = Vec::with_capacity(animations.len());
        for mut animation in animations {
            let step = if animation.fresh { 0.0 } else { dt };
            animation.fresh = false;
            if (animation.callback)(step) == AnimationStatus::Running {
                running.push(animation);
            }
        }

        let mut inner = self.inner.borrow_mut();
        running.append(&mut inner.animations);
        inner.animations = running;

        if task_count > 0 {
            log::trace!("frame {}: ran {} deferred task(s)", inner.frames, task_count);
        }
        task_count
    }

    pub fn has_pending_work(&self) -> bool {
        let inner = self.inner.borrow();
        !inner.tasks.is_empty() || !inner.animations.is_empty()
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn active_animations(&self) -> usize {
        self.inner.borrow().animations.len()
    }
}
