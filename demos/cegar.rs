//! Abstraction refinement on a modulo counter.
//!
//! An n-bit counter counts from 0 up to `modulus - 1` and wraps around, so
//! the all-ones value is unreachable. Starting from the single predicate
//! "all bits set", the loop abstracts the counter, explores the abstract
//! system, and adds one bit predicate per spurious result until the property
//! is proven or no predicates are left.
//!
//! Run with:
//! ```bash
//! cargo run --example cegar -- --bits 3 --modulus 6 --partition 6 --showcubes
//! ```

use std::collections::{BTreeSet, VecDeque};

use clap::Parser;
use color_eyre::eyre::bail;
use log::info;

use predabs::abstractor::Abstractor;
use predabs::combine::AbstractTransitionSystem;
use predabs::concrete::ConcreteTrans;
use predabs::config::AbstractorConfig;
use predabs::cube::Valuation;
use predabs::expr::Expr;
use predabs::namespace::Namespace;
use predabs::network::NetworkInfo;
use predabs::oracle::BddOracle;
use predabs::predicate::{PredId, PredIdSet, Predicates};

#[derive(Debug, Parser)]
#[command(author, version, about = "Predicate abstraction of a modulo counter")]
struct Cli {
    /// Number of counter bits
    #[arg(long, default_value = "3")]
    bits: usize,

    /// Counter modulus, below 2^bits
    #[arg(long, default_value = "6")]
    modulus: u32,

    /// Partitioning strategy (1-8)
    #[arg(long, default_value = "6")]
    partition: u32,

    /// Print the cubes of every cluster relation
    #[arg(long)]
    showcubes: bool,

    /// Use refinement clusters
    #[arg(long)]
    gcr: bool,

    /// Relate initial states across clusters
    #[arg(long)]
    relate_init: bool,

    /// Disable all abstraction caches
    #[arg(long)]
    nocache: bool,

    /// Do not constrain abstract initial states
    #[arg(long)]
    noinit: bool,

    #[arg(long)]
    verbose: bool,
}

fn bit(j: usize) -> Expr {
    Expr::var(format!("x{}", j))
}

/// `x == value` over `bits` bits.
fn equals(bits: usize, value: u32) -> Expr {
    Expr::and_many((0..bits).map(|j| {
        if value >> j & 1 == 1 {
            bit(j)
        } else {
            !bit(j)
        }
    }))
}

fn counter(bits: usize, modulus: u32) -> (ConcreteTrans, Namespace) {
    let succ = |v: u32| if v + 1 >= modulus { 0 } else { v + 1 };
    let latches = (0..bits).map(|j| {
        let next = Expr::or_many(
            (0..1u32 << bits)
                .filter(|&v| succ(v) >> j & 1 == 1)
                .map(|v| equals(bits, v)),
        );
        (format!("x{}", j), Some(false), next)
    });
    let system = ConcreteTrans::from_latches(latches);
    let mut ns = Namespace::new();
    for j in 0..bits {
        ns.add_latch(format!("x{}", j));
    }
    (system, ns)
}

fn valuation(ids: &[PredId], bits: u32) -> Valuation {
    ids.iter()
        .enumerate()
        .map(|(i, &id)| (id, bits >> i & 1 == 1))
        .collect()
}

/// Breadth-first search for an abstract state where `bad` holds.
fn bad_reachable(ats: &AbstractTransitionSystem, bad: PredId) -> Option<usize> {
    let ids: Vec<PredId> = ats.variables().iter().map(|v| v.id).collect();
    let all: Vec<Valuation> = (0..1u32 << ids.len()).map(|b| valuation(&ids, b)).collect();

    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    for (i, v) in all.iter().enumerate() {
        if ats.is_initial(v) {
            visited.insert(i);
            queue.push_back((i, 0));
        }
    }
    while let Some((i, depth)) = queue.pop_front() {
        if all[i].get(&bad) == Some(&true) {
            return Some(depth);
        }
        for (j, next) in all.iter().enumerate() {
            if !visited.contains(&j) && ats.allows(&all[i], next) {
                visited.insert(j);
                queue.push_back((j, depth + 1));
            }
        }
    }
    None
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    if cli.bits == 0 || cli.bits > 8 {
        bail!("--bits must be in 1..=8 (got {})", cli.bits);
    }
    if cli.modulus == 0 || cli.modulus >= 1 << cli.bits {
        bail!("--modulus must be in 1..2^bits (got {})", cli.modulus);
    }

    let mut builder = AbstractorConfig::builder()
        .partition(cli.partition)
        .show_cubes(cli.showcubes)
        .use_refinement_clusters(cli.gcr)
        .relate_init_predicates(cli.relate_init)
        .verbose(cli.verbose);
    if cli.nocache {
        builder = builder.no_cache();
    }
    if cli.noinit {
        builder = builder.no_init();
    }
    let config = builder.build()?;

    let (system, ns) = counter(cli.bits, cli.modulus);
    let network = NetworkInfo::new();
    let mut predicates = Predicates::new();
    let bad = predicates.add(equals(cli.bits, (1 << cli.bits) - 1));

    let mut abstractor = Abstractor::new(config);
    let mut oracle = BddOracle::new();
    let mut new_clusters = Vec::new();
    let mut tracked = 0;

    let time_total = std::time::Instant::now();
    for iteration in 1.. {
        let ats = abstractor.calc_abstraction(
            &mut oracle,
            &predicates,
            &system,
            &ns,
            &network,
            new_clusters.drain(..),
        )?;
        info!(
            "Iteration {}: {} predicates, {} abstract initial states",
            iteration,
            predicates.len(),
            ats.count_initial_states()
        );

        match bad_reachable(ats, bad) {
            None => {
                println!("{}", ats);
                println!("Property holds: all-ones state unreachable ({} iterations)", iteration);
                break;
            }
            Some(depth) => {
                if tracked >= cli.bits {
                    println!("Abstract counterexample of length {} with all bits tracked", depth);
                    break;
                }
                info!("Spurious counterexample of length {}, tracking x{}", depth, tracked);
                let id = predicates.add(bit(tracked));
                tracked += 1;
                new_clusters.push(PredIdSet::from_iter([bad, id]));
            }
        }
    }

    println!("{}", "-".repeat(40));
    abstractor.out_stats(&mut std::io::stdout())?;
    println!("oracle queries: {}", oracle.queries());
    println!("Total time: {:.3} s", time_total.elapsed().as_secs_f64());

    Ok(())
}
