use crate::types::{EntranceRecord, LandRoleRecord, Residence};

/// One building-side dwelling unit waiting for a cadastral counterpart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuildingUnit<'a> {
    Entrance(&'a EntranceRecord),
    /// Cadastral unit beyond its zone's quota. It still becomes a dwelling,
    /// placed at its own point.
    LandRole(&'a LandRoleRecord),
}

impl BuildingUnit<'_> {
    /// The dwelling for this unit, valued from `land_role` when there is one.
    pub fn residence(&self, land_role: Option<&LandRoleRecord>) -> Residence {
        match self {
            Self::Entrance(entrance) => Residence::at_entrance(entrance, land_role),
            Self::LandRole(unit) => Residence::at_land_role(unit, land_role),
        }
    }

    #[inline]
    pub fn is_entrance(&self) -> bool { matches!(self, Self::Entrance(_)) }
}

/// Residences produced by a stage, plus the units it could not pair.
///
/// Residues are repeated once per unmatched unit: an entrance serving three
/// unmatched dwellings appears three times in `extra_buildings`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a> {
    pub residences: Vec<Residence>,
    /// Building-side units without a cadastral counterpart.
    pub extra_buildings: Vec<BuildingUnit<'a>>,
    /// Cadastral units without an entrance counterpart.
    pub extra_land_role: Vec<&'a LandRoleRecord>,
}

impl Default for MatchResult<'_> {
    fn default() -> Self {
        Self { residences: Vec::new(), extra_buildings: Vec::new(), extra_land_role: Vec::new() }
    }
}

impl<'a> MatchResult<'a> {
    /// Append `other`'s lists to this one's. No deduplication.
    pub fn concat(&mut self, other: MatchResult<'a>) {
        self.residences.extend(other.residences);
        self.extra_buildings.extend(other.extra_buildings);
        self.extra_land_role.extend(other.extra_land_role);
    }

    /// True when some unit is left unpaired.
    #[inline]
    pub fn has_residue(&self) -> bool { !self.extra_buildings.is_empty() || !self.extra_land_role.is_empty() }
}
