use swap_pool::{Config, ThreadPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swap_pool=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let now = Instant::now();
    let pool = ThreadPool::with_config(Config::cpu_bound());
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..1_000_000 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });
    }

    let metrics = pool.metrics();
    pool.shutdown();

    println!("executed: {}", counter.load(Ordering::Relaxed));
    println!("metrics before shutdown: {:?}", metrics);
    println!("elapsed: {:?}", now.elapsed());
}
