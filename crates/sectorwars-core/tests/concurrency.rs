//! Concurrent handlers against one player must never double-spend.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sectorwars_core::{
    Clock, ColonistAllocation, Economy, EconomyConfig, Error, FactionId, ManualClock, MemoryLedger,
    PlanetId, PlanetResourceState, PlanetType, PlayerId, Resource,
};

fn economy() -> Economy<MemoryLedger, Arc<ManualClock>> {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2102, 3, 1, 0, 0, 0).unwrap(),
    ));
    Economy::new(EconomyConfig::default(), MemoryLedger::new(), clock).unwrap()
}

#[test]
fn last_turns_are_spent_once() {
    let economy = economy();
    let player = PlayerId::new(7);
    economy.open_account(player).unwrap();
    assert_eq!(economy.spend_turns(player, 990).unwrap(), 10);

    let successes = AtomicU32::new(0);
    let refusals = AtomicU32::new(0);
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| match economy.spend_turns(player, 10) {
                Ok(remaining) => {
                    assert_eq!(remaining, 0);
                    successes.fetch_add(1, Ordering::SeqCst);
                }
                Err(Error::InsufficientTurns { requested: 10, available: 0 }) => {
                    refusals.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => panic!("unexpected error: {e}"),
            });
        }
    });

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    assert_eq!(refusals.load(Ordering::SeqCst), 7);
    assert_eq!(economy.get_current_turns(player).unwrap(), 0);
}

#[test]
fn parallel_spends_sum_exactly() {
    let economy = economy();
    let player = PlayerId::new(8);
    economy.open_account(player).unwrap();

    std::thread::scope(|s| {
        for _ in 0..10 {
            s.spawn(|| {
                for _ in 0..10 {
                    economy.spend_turns(player, 1).unwrap();
                }
            });
        }
    });

    assert_eq!(economy.get_current_turns(player).unwrap(), 900);
}

#[test]
fn concurrent_withdrawals_never_overdraw() {
    let economy = economy();
    let owner = PlayerId::new(9);
    let planet = PlanetResourceState::new(
        PlanetId::new(100),
        owner,
        55,
        PlanetType::Terran,
        ColonistAllocation::new(0, 0, 0),
        economy.clock().now(),
    );
    economy.colonize_planet(planet).unwrap();
    economy.deposit_resource(PlanetId::new(100), Resource::Ore, 50).unwrap();

    let taken = AtomicU32::new(0);
    std::thread::scope(|s| {
        for _ in 0..12 {
            s.spawn(|| {
                if economy.withdraw_resource(PlanetId::new(100), Resource::Ore, 10).is_ok() {
                    taken.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(taken.load(Ordering::SeqCst), 5);
    assert_eq!(economy.resource_stock(PlanetId::new(100)).unwrap()[Resource::Ore], 0);
}

#[test]
fn concurrent_reputation_adjustments_all_land() {
    let economy = economy();
    let player = PlayerId::new(10);
    let merchants = FactionId::new("merchants");

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..5 {
                    economy.adjust_reputation(player, &merchants, 4, "trade").unwrap();
                }
            });
        }
    });

    assert_eq!(economy.reputation(player, &merchants).unwrap().score, 160);
    // merchants ally independents: every +4 spills over as +1
    let independents = economy.reputation(player, &FactionId::new("independents")).unwrap();
    assert_eq!(independents.score, 40);
}
