//! Linking must be a pure function of its inputs.
//!
//! Random storms and claims from a fixed seed. Two linker runs over the
//! same inputs must agree exactly, and every link must match a
//! brute-force search over the whole catalog.

mod common;

use chrono::{Duration, NaiveDateTime};
use common::{claim, day, storm};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use stormlink_core::{
    claims::ClaimRecord,
    config::{InflationConfig, LinkConfig},
    inflation::InflationAdjuster,
    linker::{LinkedClaim, StormLinker},
    storm::{StormCatalog, StormEvent},
};

const SEED: u64 = 0x5707_D1A7_2005_0829;

fn random_catalog(rng: &mut Pcg64Mcg, n: usize) -> StormCatalog {
    let events = (0..n)
        .map(|i| {
            let start = day(rng.gen_range(2000..=2004), rng.gen_range(6..=11), rng.gen_range(1..=28));
            let end = start + Duration::days(rng.gen_range(4..=20));
            // Coarse values so that ties actually happen.
            let wind = f64::from(rng.gen_range(3..=8i32) * 20);
            let ace = f64::from(rng.gen_range(0..=4i32)) * 2.5;
            storm(&format!("S{i:03}_{}", start.format("%Y")), start, end, wind, ace)
        })
        .collect();
    StormCatalog::new(events)
}

fn random_claims(rng: &mut Pcg64Mcg, n: u64) -> Vec<ClaimRecord> {
    (0..n)
        .map(|id| {
            let date = rng
                .gen_bool(0.95)
                .then(|| day(rng.gen_range(2000..=2004), rng.gen_range(1..=12), rng.gen_range(1..=28)));
            let building = rng.gen_bool(0.8).then(|| f64::from(rng.gen_range(0..=50_000i32)));
            let contents = rng.gen_bool(0.5).then(|| f64::from(rng.gen_range(0..=10_000i32)));
            claim(id, date, building, contents)
        })
        .collect()
}

/// The best storm for a claim by exhaustive search, same rules as the linker.
fn oracle<'a>(catalog: &'a StormCatalog, at: NaiveDateTime, cross_year: bool) -> Option<&'a StormEvent> {
    use chrono::Datelike;
    let mut best: Option<&StormEvent> = None;
    for storm in catalog.events() {
        let year_ok = if cross_year {
            (storm.start_date.year()..=storm.end_date.year()).contains(&at.year())
        } else {
            storm.start_date.year() == at.year()
        };
        if !year_ok || !storm.covers(at) {
            continue;
        }
        best = match best {
            Some(b) if (b.max_wind, b.ace) >= (storm.max_wind, storm.ace) => Some(b),
            _ => Some(storm),
        };
    }
    best
}

fn run(catalog: &StormCatalog, claims: &[ClaimRecord], cross_year: bool) -> Vec<LinkedClaim> {
    let inflation = InflationAdjuster::for_catalog(catalog, &InflationConfig::default()).expect("non-empty");
    let linker = StormLinker::new(catalog, &LinkConfig { cross_year_windows: cross_year }, inflation);
    linker.link_all(claims)
}

#[test]
fn same_inputs_produce_identical_links() {
    let mut rng = Pcg64Mcg::seed_from_u64(SEED);
    let catalog = random_catalog(&mut rng, 120);
    let claims = random_claims(&mut rng, 5_000);

    let a = run(&catalog, &claims, false);
    let b = run(&catalog, &claims, false);

    assert!(!a.is_empty(), "fixture should link at least some claims");
    assert_eq!(a.len(), b.len(), "link counts differ: {} vs {}", a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert_eq!(x, y, "links diverged at entry {i}");
    }
}

#[test]
fn input_order_does_not_change_the_result() {
    let mut rng = Pcg64Mcg::seed_from_u64(SEED ^ 1);
    let catalog = random_catalog(&mut rng, 80);
    let claims = random_claims(&mut rng, 2_000);
    let mut reversed = claims.clone();
    reversed.reverse();

    assert_eq!(run(&catalog, &claims, false), run(&catalog, &reversed, false));
}

#[test]
fn every_link_matches_exhaustive_search() {
    for cross_year in [false, true] {
        let mut rng = Pcg64Mcg::seed_from_u64(SEED ^ 2);
        let catalog = random_catalog(&mut rng, 150);
        let claims = random_claims(&mut rng, 4_000);
        let linked = run(&catalog, &claims, cross_year);
        let mut by_id = linked.iter().peekable();

        for c in &claims {
            let expected = c
                .date_of_loss
                .filter(|_| c.total_loss() > 0.0)
                .and_then(|at| oracle(&catalog, at, cross_year));
            let actual = by_id.next_if(|l| l.claim_id == c.claim_id);
            match (expected, actual) {
                (None, None) => {}
                (Some(storm), Some(link)) => {
                    assert_eq!(
                        link.event_name, storm.event_name,
                        "claim {} linked to the wrong storm (cross_year={cross_year})",
                        c.claim_id
                    );
                    assert_eq!(link.max_wind, storm.max_wind);
                }
                (e, a) => panic!(
                    "claim {}: expected {:?}, linker gave {:?}",
                    c.claim_id,
                    e.map(|s| &s.event_name),
                    a.map(|l| &l.event_name)
                ),
            }
        }
        assert!(by_id.next().is_none(), "linker produced ids not in the input");
    }
}

#[test]
fn linked_storm_outranks_every_other_candidate() {
    let mut rng = Pcg64Mcg::seed_from_u64(SEED ^ 3);
    let catalog = random_catalog(&mut rng, 200);
    let claims = random_claims(&mut rng, 3_000);

    for link in run(&catalog, &claims, false) {
        let chosen = catalog.find(&link.event_name).expect("linked storm is cataloged");
        for other in catalog.events().iter().filter(|s| {
            use chrono::Datelike;
            s.start_date.year() == link.date_of_loss.year() && s.covers(link.date_of_loss)
        }) {
            assert!(
                chosen.max_wind > other.max_wind
                    || (chosen.max_wind == other.max_wind && chosen.ace >= other.ace),
                "claim {} linked to {} but {} ranks higher",
                link.claim_id,
                chosen.event_name,
                other.event_name
            );
        }
    }
}
