use phf::{Map, phf_map};
use std::borrow::Cow;
use std::fmt;

/// A thermodynamic quantity averaged per simulation box.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Observable {
    Pressure,
    Molecules,
    Density,
    Volume,
    /// Edge length of the box if it were cubic, derived from the volume.
    BoxLength,
    HeatOfVaporization,
    Compressibility,
    MoleFraction(String),
}

/// Species-independent observables, in output column order.
pub const SCALAR_OBSERVABLES: [Observable; 7] = [
    Observable::Pressure,
    Observable::Molecules,
    Observable::Density,
    Observable::Volume,
    Observable::BoxLength,
    Observable::HeatOfVaporization,
    Observable::Compressibility,
];

pub const TEMPERATURE_TITLE: &str = "temp_K";
pub const TEMPERATURE_STD_TITLE: &str = "temp_std_K";
pub const MOLE_FRACTION_TITLE_PREFIX: &str = "mol_fract_";

static SCALAR_TITLES: Map<&'static str, Observable> = phf_map! {
    "P_bar" => Observable::Pressure,
    "No_mol" => Observable::Molecules,
    "Rho_kg_per_m_cubed" => Observable::Density,
    "V_ang_cubed" => Observable::Volume,
    "L_m_if_cubed" => Observable::BoxLength,
    "Hv_kJ_per_mol" => Observable::HeatOfVaporization,
    "Z" => Observable::Compressibility,
};

impl Observable {
    /// All observables for a system with the given species, in column order.
    pub fn all(species: &[String]) -> Vec<Observable> {
        SCALAR_OBSERVABLES
            .iter()
            .cloned()
            .chain(species.iter().cloned().map(Observable::MoleFraction))
            .collect()
    }

    /// Column of the block-average table holding this observable, if it is
    /// read rather than derived.
    pub fn block_column(&self) -> Option<Cow<'static, str>> {
        match self {
            Observable::Pressure => Some(Cow::Borrowed("PRESSURE")),
            Observable::Molecules => Some(Cow::Borrowed("TOT_MOL")),
            Observable::Density => Some(Cow::Borrowed("TOT_DENS")),
            Observable::Volume => Some(Cow::Borrowed("VOLUME")),
            Observable::BoxLength => None,
            Observable::HeatOfVaporization => Some(Cow::Borrowed("HEAT_VAP")),
            Observable::Compressibility => Some(Cow::Borrowed("COMPRESSIBILITY")),
            Observable::MoleFraction(species) => Some(Cow::Owned(format!("MOLFRACT_{species}"))),
        }
    }

    pub fn title(&self) -> Cow<'static, str> {
        match self {
            Observable::Pressure => Cow::Borrowed("P_bar"),
            Observable::Molecules => Cow::Borrowed("No_mol"),
            Observable::Density => Cow::Borrowed("Rho_kg_per_m_cubed"),
            Observable::Volume => Cow::Borrowed("V_ang_cubed"),
            Observable::BoxLength => Cow::Borrowed("L_m_if_cubed"),
            Observable::HeatOfVaporization => Cow::Borrowed("Hv_kJ_per_mol"),
            Observable::Compressibility => Cow::Borrowed("Z"),
            Observable::MoleFraction(species) => {
                Cow::Owned(format!("{MOLE_FRACTION_TITLE_PREFIX}{species}"))
            }
        }
    }

    pub fn std_title(&self) -> Cow<'static, str> {
        match self {
            Observable::Pressure => Cow::Borrowed("P_std_bar"),
            Observable::Molecules => Cow::Borrowed("No_mol_std"),
            Observable::Density => Cow::Borrowed("Rho_std_kg_per_m_cubed"),
            Observable::Volume => Cow::Borrowed("V_std_ang_cubed"),
            Observable::BoxLength => Cow::Borrowed("L_std_m_if_cubed"),
            Observable::HeatOfVaporization => Cow::Borrowed("Hv_std_kJ_per_mol"),
            Observable::Compressibility => Cow::Borrowed("Z_std"),
            Observable::MoleFraction(species) => {
                Cow::Owned(format!("{MOLE_FRACTION_TITLE_PREFIX}{species}_std"))
            }
        }
    }

    /// Inverse of [`Observable::title`].
    pub fn from_title(title: &str) -> Option<Self> {
        if let Some(obs) = SCALAR_TITLES.get(title) {
            return Some(obs.clone());
        }
        title
            .strip_prefix(MOLE_FRACTION_TITLE_PREFIX)
            .filter(|species| !species.is_empty())
            .map(|species| Observable::MoleFraction(species.to_string()))
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}
