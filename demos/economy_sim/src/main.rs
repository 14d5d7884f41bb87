//! Economy Simulation Demo
//!
//! Walks one trader through a simulated week: spending and regenerating
//! turns, trading with the Merchant Guild, raiding a pirate convoy, and
//! running a colony. Time is driven by a manual clock so the output is
//! reproducible.
//!
//! Set `RUST_LOG=debug` to see every regeneration and propagation step.

use chrono::{TimeZone, Utc};
use sectorwars_core::{
    Clock, ColonistAllocation, Economy, FactionId, ManualClock, PlanetId, PlanetResourceState,
    PlanetType, PlayerId, Resource, TurnCost,
};
use sectorwars_db::Store;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== SectorWars 2102 Economy Simulation ===\n");

    let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
    let config = sectorwars_script::load_config(&data_dir)?;
    info!(
        relations = config.reputation.relations.len(),
        base_max_turns = config.turns.base_max_turns,
        "balancing data loaded"
    );

    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2102, 1, 1, 8, 0, 0).unwrap()));
    let start = clock.now();
    let economy = Economy::new(config, Store::in_memory()?, clock.clone())?;

    let trader = PlayerId::new(1);
    let merchants = FactionId::new("merchants");
    let pirates = FactionId::new("pirates");

    // Turns
    let account = economy.open_account(trader)?;
    println!("Trader {} starts with {}/{} turns", trader, account.current_turns, account.max_turns);

    let remaining = economy.spend_turns(trader, 600)?;
    println!("Long haul through the warp lanes: 600 turns, {} left", remaining);

    economy.charge(trader, TurnCost::Free)?;
    match economy.spend_turns(trader, 500) {
        Ok(_) => println!("Unexpectedly afforded a second haul"),
        Err(e) => println!("Second haul refused: {}", e),
    }

    clock.advance_hours(6);
    println!("After 6 hours docked: {} turns", economy.get_current_turns(trader)?);

    let multiplier = economy.set_bonus_tier(trader, 2)?;
    clock.advance_hours(6);
    println!(
        "Companion bonus x{:.2} for another 6 hours: {} turns\n",
        multiplier,
        economy.get_current_turns(trader)?
    );

    // Reputation
    for run in 1..=5 {
        let update = economy.adjust_reputation(trader, &merchants, 35, "port trade")?;
        println!(
            "Trade run {}: merchants {} ({})",
            run,
            update.record.score,
            update.record.level()
        );
    }

    let raid = economy.adjust_reputation(trader, &pirates, -120, "destroyed pirate convoy")?;
    println!("Convoy raid: pirates {} ({})", raid.record.score, raid.record.level());
    for (faction, delta) in &raid.propagated {
        println!("  spill-over to {}: {:+}", faction, delta);
    }

    let standing = economy.standing(trader, &merchants)?;
    println!(
        "Merchant standing: price x{:.2}, port access {:?}, territory open: {}",
        standing.price_multiplier, standing.port_access, standing.territory_access
    );
    let pirate_standing = economy.standing(trader, &pirates)?;
    println!(
        "Pirate standing: NPCs {:?}, territory open: {}\n",
        pirate_standing.combat_response, pirate_standing.territory_access
    );

    // Planets
    let colony = PlanetId::new(501);
    economy.colonize_planet(PlanetResourceState::new(
        colony,
        trader,
        214,
        PlanetType::Mountainous,
        ColonistAllocation::new(400, 200, 100),
        clock.now(),
    ))?;
    println!("Colonized {} (Mountainous, sector 214)", colony);

    let rates = economy.production_rates(colony)?;
    println!(
        "Hourly output: {:.0} ore, {:.0} organics, {:.0} equipment",
        rates.ore, rates.organics, rates.equipment
    );

    clock.advance_hours(3);
    let stock = economy.resource_stock(colony)?;
    println!("After 3 hours: {} ore, {} organics, {} equipment", stock.ore, stock.organics, stock.equipment);

    economy.upgrade_production(colony, Resource::Ore, 2)?;
    economy.reallocate_colonists(colony, ColonistAllocation::new(500, 150, 50))?;
    clock.advance_hours(3);
    let stock = economy.resource_stock(colony)?;
    println!("Ore upgrade 2 + more miners, 3 hours later: {} ore", stock.ore);

    let left = economy.withdraw_resource(colony, Resource::Ore, 1000)?;
    println!("Loaded 1000 ore into the hold, {} left on the planet", left);

    clock.advance_days(2);
    let stock = economy.resource_stock(colony)?;
    println!(
        "Two days unattended: {} ore, {} organics, {} equipment (capacity {})",
        stock.ore,
        stock.organics,
        stock.equipment,
        economy.planet(colony)?.storage_capacity(&economy.config().production)
    );

    // A quiet month
    clock.advance_days(28);
    println!("\nFour weeks later:");
    for record in economy.reputations(trader)? {
        println!("  {:<13} {:>5} ({})", record.faction_id, record.score, record.level());
    }
    println!("  turns: {}", economy.get_current_turns(trader)?);

    info!(elapsed = %(clock.now() - start), "simulation finished");
    println!("\n=== Simulation complete ===");
    Ok(())
}
