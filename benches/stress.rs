//! In-process contention stress: hammers `admit_single` on a handful of
//! courts and reports latency percentiles. Run with `cargo bench`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use courtd::{Actor, BookingPolicy, Engine, EngineError, Ms, Span};
use ulid::Ulid;

const HOUR: Ms = 3_600_000;
const DAY: Ms = 86_400_000;
const NOW: Ms = 12 * HOUR;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

fn bench_wal_path() -> PathBuf {
    let dir = std::env::temp_dir().join("courtd_bench");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("stress_{}.wal", Ulid::new()));
    let _ = std::fs::remove_file(&path);
    path
}

async fn setup(engine: &Engine, courts: usize) -> Vec<Ulid> {
    let mut ids = Vec::new();
    for i in 0..courts {
        let id = Ulid::new();
        engine.register_court(id, format!("Court {i}")).await.unwrap();
        ids.push(id);
    }
    println!("  created {} courts", ids.len());
    ids
}

/// Every task books a disjoint block of slots on its own court: pure
/// throughput, no conflicts expected.
async fn run_uncontended(engine: Arc<Engine>, courts: &[Ulid], slots_per_task: i64) {
    let started = Instant::now();
    let mut handles = Vec::new();
    for (t, &court) in courts.iter().enumerate() {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let actor = Actor::admin(Ulid::new());
            let mut latencies = Vec::with_capacity(slots_per_task as usize);
            let base = DAY + (t as Ms) * DAY;
            for s in 0..slots_per_task {
                let start = base + (s % 20) * HOUR + (s / 20) * DAY;
                let span = Span::new(start, start + HOUR);
                let req = Instant::now();
                engine
                    .admit_single(&actor, court, span, NOW)
                    .await
                    .expect("uncontended admit failed");
                latencies.push(req.elapsed());
            }
            latencies
        }));
    }
    let mut all = Vec::new();
    for h in handles {
        all.extend(h.await.unwrap());
    }
    let elapsed = started.elapsed();
    println!(
        "  admitted {} reservations in {:.2}s ({:.0}/s)",
        all.len(),
        elapsed.as_secs_f64(),
        all.len() as f64 / elapsed.as_secs_f64()
    );
    print_latency("admit (own court)", &mut all);
}

/// All tasks fight over the same court and the same day of slots: exactly one
/// winner per slot, everyone else sees SlotTaken.
async fn run_contended(engine: Arc<Engine>, court: Ulid, tasks: usize, slots: i64) {
    let started = Instant::now();
    let mut handles = Vec::new();
    for _ in 0..tasks {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let actor = Actor::admin(Ulid::new());
            let mut latencies = Vec::with_capacity(slots as usize);
            let mut won = 0u64;
            for s in 0..slots {
                let start = 400 * DAY + s * HOUR;
                let span = Span::new(start, start + HOUR);
                let req = Instant::now();
                match engine.admit_single(&actor, court, span, NOW).await {
                    Ok(_) => won += 1,
                    Err(EngineError::SlotTaken(_)) => {}
                    Err(e) => panic!("unexpected error: {e}"),
                }
                latencies.push(req.elapsed());
            }
            (latencies, won)
        }));
    }
    let mut all = Vec::new();
    let mut total_won = 0u64;
    for h in handles {
        let (latencies, won) = h.await.unwrap();
        all.extend(latencies);
        total_won += won;
    }
    let elapsed = started.elapsed();
    assert_eq!(total_won, slots as u64, "each slot must have exactly one winner");
    println!(
        "  {} attempts, {} won, in {:.2}s",
        all.len(),
        total_won,
        elapsed.as_secs_f64()
    );
    print_latency("admit (contended court)", &mut all);
}

fn main() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(8)
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let path = bench_wal_path();
        let engine =
            Arc::new(Engine::new(path.clone(), BookingPolicy::default()).unwrap());

        println!("uncontended (16 courts, 500 slots each):");
        let courts = setup(&engine, 16).await;
        run_uncontended(engine.clone(), &courts, 500).await;

        println!("contended (32 tasks racing for 200 slots on one court):");
        run_contended(engine.clone(), courts[0], 32, 200).await;

        let _ = std::fs::remove_file(&path);
    });
}
