use crate::error::{Error, Result};
use native_db::*;
use native_model::{native_model, Model};
use sectorwars_core::PlanetResourceState;
use serde::{Deserialize, Serialize};

/// Stored planet production state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredPlanet {
    #[primary_key]
    pub planet_id: u64,
    /// Owning player.
    #[secondary_key]
    pub owner: u64,
    pub sector_id: u32,
    /// Serialized `PlanetResourceState`.
    pub data: Vec<u8>,
}

impl StoredPlanet {
    pub fn from_planet(planet: &PlanetResourceState) -> Result<Self> {
        Ok(Self {
            planet_id: planet.planet_id.raw(),
            owner: planet.owner.raw(),
            sector_id: planet.sector_id,
            data: bincode::serialize(planet)?,
        })
    }

    pub fn to_planet(&self) -> Result<PlanetResourceState> {
        let planet: PlanetResourceState = bincode::deserialize(&self.data)?;
        if planet.planet_id.raw() != self.planet_id {
            return Err(Error::Corrupt {
                key: self.planet_id.to_string(),
                reason: format!("blob belongs to {}", planet.planet_id),
            });
        }
        Ok(planet)
    }
}
