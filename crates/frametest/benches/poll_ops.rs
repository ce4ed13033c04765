//! Polling Benchmarks
//!
//! Cost of one condition check against hosts of growing size, and of a full
//! wait driven frame by frame.
//!
//! Run with: `cargo bench --bench poll_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use frametest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

fn populated(objects: usize) -> MockHost {
    let mut host = MockHost::new("Bench");
    for i in 0..objects {
        let handle = host.spawn(format!("Object{i}"));
        host.set_text(handle, "value");
    }
    let score = host.spawn("Score");
    host.set_text(score, "42");
    host
}

fn bench_condition_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition_check");

    for size in [10_usize, 100, 1_000] {
        let host = populated(size);
        let conditions = [
            ("object_appeared", Condition::object_appeared("Score")),
            ("label_text", Condition::label_text("Score", "42")),
            ("label_mismatch", Condition::label_text("Score", "43")),
        ];
        for (name, condition) in &conditions {
            group.bench_with_input(BenchmarkId::new(*name, size), &host, |bench, host| {
                bench.iter(|| black_box(condition.check(black_box(host))));
            });
        }
    }

    group.finish();
}

fn bench_full_wait(c: &mut Criterion) {
    c.bench_function("wait_for_late_object", |bench| {
        bench.iter(|| {
            let mock = Rc::new(RefCell::new(populated(50)));
            mock.borrow_mut().schedule(1.0, |h| {
                h.spawn("Late");
            });
            let ctx = TestContext::new(HostHandle::new(Rc::clone(&mock)), WaitOptions::default());
            let mut sched = FrameScheduler::new();
            sched
                .spawn(async move { ctx.wait_for_object("Late").await.map(|_| ()) })
                .unwrap();
            let out = sched.run_until_complete(1_000, |_| mock.borrow_mut().advance_frame());
            black_box(out)
        });
    });
}

criterion_group!(benches, bench_condition_check, bench_full_wait);
criterion_main!(benches);
