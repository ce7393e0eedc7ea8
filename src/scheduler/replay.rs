use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    time::Instant,
};

use tracing::trace;

use crate::{context::TestContext, suite::Suite, world::World};

/// Replay every step of `suite` on `t`, in order.
///
/// Failures do not stop the replay, every following step still runs and is
/// marked failed with its ordinal. Skipping `t` stops it.
pub(crate) fn replay(suite: &Suite<'_>, t: &TestContext, timed: bool) {
    let world = suite.uses_world().then(|| World::new(t.clone()));
    let mut failures = 0;

    for step in suite.steps() {
        step.state().reset();

        let Some(callback) = step.callback() else {
            step.state().lock().executed = true;
            continue;
        };

        trace!(suite = t.name(), step = step.title(), kind = ?step.kind(), "running step");
        if let Some(world) = &world {
            world.enter(step.state());
        }
        let now = Instant::now();
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback.call(t, world.as_ref()))) {
            t.record_panic(payload);
        }
        let elapsed = now.elapsed();

        let mut state = step.state().lock();
        state.executed = true;
        state.skipped = t.skipped();
        if timed {
            state.elapsed = Some(elapsed);
        }
        if t.failed() {
            failures += 1;
            state.failed = true;
            state.failed_at = failures;
        }
        drop(state);

        if t.skipped() {
            break;
        }
    }
}
