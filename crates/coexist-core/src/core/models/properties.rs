use super::observable::Observable;

/// One value of type `T` for every observable of a simulation box.
///
/// `T` is `f64` for a single replicate's means and
/// [`SampleStats`](crate::core::stats::SampleStats) for cross-replicate
/// aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxProperties<T> {
    pub pressure: T,
    pub molecules: T,
    pub density: T,
    pub volume: T,
    pub box_length: T,
    pub heat_of_vaporization: T,
    pub compressibility: T,
    /// `(species, value)` pairs in column order.
    pub mole_fractions: Vec<(String, T)>,
}

impl<T> BoxProperties<T> {
    /// Builds the properties by evaluating `value_of` for every observable of
    /// a system containing `species`, in column order.
    pub fn try_from_fn<E>(
        species: &[String],
        mut value_of: impl FnMut(&Observable) -> Result<T, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            pressure: value_of(&Observable::Pressure)?,
            molecules: value_of(&Observable::Molecules)?,
            density: value_of(&Observable::Density)?,
            volume: value_of(&Observable::Volume)?,
            box_length: value_of(&Observable::BoxLength)?,
            heat_of_vaporization: value_of(&Observable::HeatOfVaporization)?,
            compressibility: value_of(&Observable::Compressibility)?,
            mole_fractions: species
                .iter()
                .map(|s| {
                    value_of(&Observable::MoleFraction(s.clone())).map(|v| (s.clone(), v))
                })
                .collect::<Result<_, E>>()?,
        })
    }

    pub fn get(&self, observable: &Observable) -> Option<&T> {
        match observable {
            Observable::Pressure => Some(&self.pressure),
            Observable::Molecules => Some(&self.molecules),
            Observable::Density => Some(&self.density),
            Observable::Volume => Some(&self.volume),
            Observable::BoxLength => Some(&self.box_length),
            Observable::HeatOfVaporization => Some(&self.heat_of_vaporization),
            Observable::Compressibility => Some(&self.compressibility),
            Observable::MoleFraction(species) => self
                .mole_fractions
                .iter()
                .find(|(s, _)| s == species)
                .map(|(_, v)| v),
        }
    }

    pub fn species(&self) -> Vec<String> {
        self.mole_fractions.iter().map(|(s, _)| s.clone()).collect()
    }

    /// `(observable, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Observable, &T)> {
        [
            (Observable::Pressure, &self.pressure),
            (Observable::Molecules, &self.molecules),
            (Observable::Density, &self.density),
            (Observable::Volume, &self.volume),
            (Observable::BoxLength, &self.box_length),
            (Observable::HeatOfVaporization, &self.heat_of_vaporization),
            (Observable::Compressibility, &self.compressibility),
        ]
        .into_iter()
        .chain(
            self.mole_fractions
                .iter()
                .map(|(s, v)| (Observable::MoleFraction(s.clone()), v)),
        )
    }
}
