//! Planetary resources and colonist roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A commodity produced and stored on planets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Ore,
    Organics,
    Equipment,
}

impl Resource {
    /// All resources in storage order
    pub const ALL: [Resource; 3] = [Resource::Ore, Resource::Organics, Resource::Equipment];

    /// The colonist role that produces this resource
    pub fn role(&self) -> ColonistRole {
        match self {
            Resource::Ore => ColonistRole::Fuel,
            Resource::Organics => ColonistRole::Organics,
            Resource::Equipment => ColonistRole::Equipment,
        }
    }

    /// Lowercase name used in logs and data files
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Ore => "ore",
            Resource::Organics => "organics",
            Resource::Equipment => "equipment",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A production assignment for colonists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColonistRole {
    /// Fuel crews work the mines and produce ore
    Fuel,
    Organics,
    Equipment,
}

/// One value per resource
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceTable<T> {
    pub ore: T,
    pub organics: T,
    pub equipment: T,
}

impl<T> ResourceTable<T> {
    /// Build a table from explicit values
    pub fn new(ore: T, organics: T, equipment: T) -> Self {
        Self {
            ore,
            organics,
            equipment,
        }
    }

    /// Build a table by evaluating `f` for every resource
    pub fn from_fn(mut f: impl FnMut(Resource) -> T) -> Self {
        Self {
            ore: f(Resource::Ore),
            organics: f(Resource::Organics),
            equipment: f(Resource::Equipment),
        }
    }

    /// Iterate `(resource, value)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, &T)> {
        Resource::ALL.into_iter().map(move |r| (r, &self[r]))
    }
}

impl<T: Copy> ResourceTable<T> {
    /// A table with the same value for every resource
    pub fn splat(value: T) -> Self {
        Self::new(value, value, value)
    }
}

impl<T> Index<Resource> for ResourceTable<T> {
    type Output = T;

    fn index(&self, resource: Resource) -> &T {
        match resource {
            Resource::Ore => &self.ore,
            Resource::Organics => &self.organics,
            Resource::Equipment => &self.equipment,
        }
    }
}

impl<T> IndexMut<Resource> for ResourceTable<T> {
    fn index_mut(&mut self, resource: Resource) -> &mut T {
        match resource {
            Resource::Ore => &mut self.ore,
            Resource::Organics => &mut self.organics,
            Resource::Equipment => &mut self.equipment,
        }
    }
}

/// How a planet's colonists are split across production roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColonistAllocation {
    pub fuel: u64,
    pub organics: u64,
    pub equipment: u64,
}

impl ColonistAllocation {
    /// Create an allocation
    pub fn new(fuel: u64, organics: u64, equipment: u64) -> Self {
        Self {
            fuel,
            organics,
            equipment,
        }
    }

    /// Colonists assigned to a role
    pub fn in_role(&self, role: ColonistRole) -> u64 {
        match role {
            ColonistRole::Fuel => self.fuel,
            ColonistRole::Organics => self.organics,
            ColonistRole::Equipment => self.equipment,
        }
    }

    /// Total colonists across all roles
    ///
    /// Widened so that the sum of three `u64` counts is always exact.
    pub fn total(&self) -> u128 {
        u128::from(self.fuel) + u128::from(self.organics) + u128::from(self.equipment)
    }
}
