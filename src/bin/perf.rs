use arbitrary::{unstructured::Unstructured, Arbitrary};
use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};
use structopt::StructOpt;

use std::{collections::BTreeSet, ops::Bound, process, time};

use avljoin::{concatenation, concatenation_dummy, Arena, DictAvl};

/// Command line options.
#[derive(Clone, StructOpt)]
pub struct Opt {
    #[structopt(long = "seed")]
    seed: Option<u64>,

    #[structopt(long = "lesser", default_value = "1000")]
    lesser: usize,

    #[structopt(long = "greater", default_value = "1000000")] // default 1M
    greater: usize,

    #[structopt(long = "random")]
    random: bool,

    #[structopt(long = "max-key", default_value = "1000000000")]
    max_key: u64,
}

fn main() {
    let opts = Opt::from_args();
    let seed = opts.seed.unwrap_or_else(random);
    let mut rng = SmallRng::seed_from_u64(seed);
    println!("seed:{} random:{}", seed, opts.random);

    let (lesser, greater) = if opts.random {
        let dim = (opts.lesser.max(opts.greater) as u64).saturating_mul(2);
        let max_key = opts.max_key.max(dim);
        let limit = match max_key.checked_mul(2) {
            Some(limit) => limit,
            None => {
                println!("invalid --max-key {}, must be <= {}", max_key, u64::MAX / 2);
                process::exit(1);
            }
        };
        let l = rand_list(&mut rng, opts.lesser, 0, max_key);
        let g = rand_list(&mut rng, opts.greater, max_key, limit);
        (l, g)
    } else {
        (seq_list(opts.lesser, 0), seq_list(opts.greater, opts.lesser as u64))
    };

    let mut arena: Arena<u64, u64> = Arena::with_capacity((lesser.len() + greater.len()) * 2);

    let start = time::Instant::now();
    let mut l1 = DictAvl::build(&mut arena, lesser.clone()).unwrap();
    let mut g1 = DictAvl::build(&mut arena, greater.clone()).unwrap();
    let mut l2 = DictAvl::build(&mut arena, lesser).unwrap();
    let mut g2 = DictAvl::build(&mut arena, greater).unwrap();
    println!(
        "built lesser:{}/{} greater:{}/{} twice, took {:?}",
        l1.len(),
        l1.to_height(&arena).unwrap(),
        g1.len(),
        g1.to_height(&arena).unwrap(),
        start.elapsed()
    );

    let start = time::Instant::now();
    let dummy = concatenation_dummy(&mut arena, &mut l1, &mut g1).unwrap();
    println!(
        "concatenation_dummy len:{} height:{}, took {:?}",
        dummy.len(),
        dummy.to_height(&arena).unwrap(),
        start.elapsed()
    );

    let (hl, hg) = (l2.to_height(&arena).unwrap(), g2.to_height(&arena).unwrap());
    let structural = if hl <= 0 || hg <= 0 {
        println!("concatenation skipped, trivial tree");
        None
    } else {
        let start = time::Instant::now();
        let res = concatenation(&mut arena, &mut l2, &mut g2).unwrap();
        println!(
            "concatenation len:{} height:{}, took {:?}",
            res.len(),
            res.to_height(&arena).unwrap(),
            start.elapsed()
        );
        Some(res)
    };

    dummy.validate(&arena).unwrap();
    if let Some(res) = structural {
        res.validate(&arena).unwrap();
        assert!(dummy.iter(&arena).unwrap().eq(res.iter(&arena).unwrap()));

        let mut n = 0;
        for _i in 0..100 {
            let bytes = rng.gen::<[u8; 32]>();
            let mut uns = Unstructured::new(&bytes);
            let (low, high): (Limit<u64>, Limit<u64>) = uns.arbitrary().unwrap();
            let r = (Bound::from(low), Bound::from(high));
            if !asc_range(&r) {
                continue;
            }
            let (a, b) = (dummy.range(&arena, r).unwrap(), res.range(&arena, r).unwrap());
            assert!(a.eq(b));
            let (a, b) = (dummy.reverse(&arena, r).unwrap(), res.reverse(&arena, r).unwrap());
            assert!(a.eq(b));
            n += 1;
        }
        println!("verified content and {} range scans", n);
    }
}

fn seq_list(dim: usize, offset: u64) -> Vec<(u64, u64)> {
    (offset..offset + (dim as u64)).map(|k| (k, k)).collect()
}

// `dim` distinct keys picked from [min, max).
fn rand_list(rng: &mut SmallRng, dim: usize, min: u64, max: u64) -> Vec<(u64, u64)> {
    let mut keys = BTreeSet::new();
    let mut items = Vec::with_capacity(dim);
    while items.len() < dim {
        let key = rng.gen_range(min..max);
        if keys.insert(key) {
            items.push((key, key));
        }
    }
    items
}

fn asc_range(r: &(Bound<u64>, Bound<u64>)) -> bool {
    match r {
        (Bound::Included(a), Bound::Included(b)) => a <= b,
        (Bound::Included(a), Bound::Excluded(b)) => a <= b,
        (Bound::Excluded(a), Bound::Included(b)) => a <= b,
        (Bound::Excluded(a), Bound::Excluded(b)) => a < b,
        (_, _) => true,
    }
}

#[derive(Clone, Debug, Arbitrary, Eq, PartialEq)]
enum Limit<T> {
    Unbounded,
    Included(T),
    Excluded(T),
}

impl<T> From<Limit<T>> for Bound<T> {
    fn from(limit: Limit<T>) -> Self {
        match limit {
            Limit::Unbounded => Bound::Unbounded,
            Limit::Included(v) => Bound::Included(v),
            Limit::Excluded(v) => Bound::Excluded(v),
        }
    }
}
