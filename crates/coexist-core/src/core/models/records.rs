use super::observable::{
    MOLE_FRACTION_TITLE_PREFIX, Observable, TEMPERATURE_STD_TITLE, TEMPERATURE_TITLE,
};
use super::properties::BoxProperties;
use crate::core::io::table::{Cell, Table, TableError};
use crate::core::io::traits::TabularRecord;
use crate::core::stats::SampleStats;
use std::fmt;

pub const REPLICATES_TITLE: &str = "No_replicates";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Liquid,
    Vapor,
}

impl Phase {
    pub const BOTH: [Phase; 2] = [Phase::Liquid, Phase::Vapor];

    /// Short tag used in output file names.
    pub fn tag(self) -> &'static str {
        match self {
            Phase::Liquid => "liq",
            Phase::Vapor => "vap",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Liquid => f.write_str("liquid"),
            Phase::Vapor => f.write_str("vapor"),
        }
    }
}

/// Species named by `mol_fract_<species>` titles of a single-value table.
fn species_in_header(header: &[String]) -> Vec<String> {
    header
        .iter()
        .filter_map(|h| match Observable::from_title(h) {
            Some(Observable::MoleFraction(species)) => Some(species),
            _ => None,
        })
        .collect()
}

/// Window-averaged observables of one simulation box of one replicate.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxRecord {
    pub temperature: f64,
    pub properties: BoxProperties<f64>,
}

impl TabularRecord for BoxRecord {
    fn titles(&self) -> Vec<String> {
        std::iter::once(TEMPERATURE_TITLE.to_string())
            .chain(self.properties.iter().map(|(obs, _)| obs.title().into_owned()))
            .collect()
    }

    fn cells(&self) -> Vec<Cell> {
        std::iter::once(Cell::Float(self.temperature))
            .chain(self.properties.iter().map(|(_, v)| Cell::Float(*v)))
            .collect()
    }

    fn from_row(table: &Table, row: usize) -> Result<Self, TableError> {
        let species = species_in_header(table.header());
        let properties =
            BoxProperties::try_from_fn(&species, |obs| table.float(row, &obs.title()))?;
        Ok(Self {
            temperature: table.float(row, TEMPERATURE_TITLE)?,
            properties,
        })
    }
}

/// The liquid and vapor box records of one replicate.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateSummary {
    pub liquid: BoxRecord,
    pub vapor: BoxRecord,
}

impl ReplicateSummary {
    pub fn phase(&self, phase: Phase) -> &BoxRecord {
        match phase {
            Phase::Liquid => &self.liquid,
            Phase::Vapor => &self.vapor,
        }
    }
}

/// Cross-replicate mean and sample standard deviation of one box type for
/// one state point.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord {
    pub temperature: SampleStats,
    pub properties: BoxProperties<SampleStats>,
    pub replicates: usize,
}

impl TabularRecord for AggregateRecord {
    fn titles(&self) -> Vec<String> {
        let mut titles = vec![
            TEMPERATURE_TITLE.to_string(),
            TEMPERATURE_STD_TITLE.to_string(),
        ];
        for (obs, _) in self.properties.iter() {
            titles.push(obs.title().into_owned());
            titles.push(obs.std_title().into_owned());
        }
        titles.push(REPLICATES_TITLE.to_string());
        titles
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            Cell::Float(self.temperature.mean),
            Cell::Float(self.temperature.std_dev),
        ];
        for (_, stats) in self.properties.iter() {
            cells.push(Cell::Float(stats.mean));
            cells.push(Cell::Float(stats.std_dev));
        }
        cells.push(Cell::Count(self.replicates));
        cells
    }

    fn from_row(table: &Table, row: usize) -> Result<Self, TableError> {
        let replicates = table.count(row, REPLICATES_TITLE)?;
        // Mean titles of mole fractions, skipping their `_std` partners.
        let species: Vec<String> = table
            .header()
            .iter()
            .filter_map(|h| h.strip_prefix(MOLE_FRACTION_TITLE_PREFIX))
            .filter(|s| {
                table
                    .column_index(&format!("{MOLE_FRACTION_TITLE_PREFIX}{s}_std"))
                    .is_some()
            })
            .map(str::to_string)
            .collect();
        let stats = |mean: &str, std: &str| -> Result<SampleStats, TableError> {
            Ok(SampleStats {
                mean: table.float(row, mean)?,
                std_dev: table.float(row, std)?,
                count: replicates,
            })
        };
        let properties = BoxProperties::try_from_fn(&species, |obs| {
            stats(&obs.title(), &obs.std_title())
        })?;
        Ok(Self {
            temperature: stats(TEMPERATURE_TITLE, TEMPERATURE_STD_TITLE)?,
            properties,
            replicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn box_record(temperature: f64, density: f64) -> BoxRecord {
        let species = vec!["C2H6".to_string()];
        BoxRecord {
            temperature,
            properties: BoxProperties::try_from_fn(&species, |obs| {
                Ok::<_, ()>(match obs {
                    Observable::Density => density,
                    Observable::MoleFraction(_) => 1.0,
                    _ => 2.5,
                })
            })
            .unwrap(),
        }
    }

    fn aggregate(temperature: f64) -> AggregateRecord {
        let species = vec!["C2H6".to_string()];
        let stats = SampleStats::from_values(&[10.0, 12.0]);
        AggregateRecord {
            temperature: SampleStats::from_values(&[temperature, temperature]),
            properties: BoxProperties::try_from_fn(&species, |_| Ok::<_, ()>(stats)).unwrap(),
            replicates: 2,
        }
    }

    #[test]
    fn box_record_header_lists_every_observable() {
        let record = box_record(500.0, 700.0);
        assert_eq!(
            record.titles(),
            vec![
                "temp_K",
                "P_bar",
                "No_mol",
                "Rho_kg_per_m_cubed",
                "V_ang_cubed",
                "L_m_if_cubed",
                "Hv_kJ_per_mol",
                "Z",
                "mol_fract_C2H6",
            ]
        );
        assert_eq!(record.cells().len(), record.titles().len());
    }

    #[test]
    fn box_record_survives_a_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis_avg_data_box_liq.txt");
        let record = box_record(512.5, 701.25);
        record.write_to_path(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);

        let back = BoxRecord::read_first_from_path(&path).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn aggregate_header_pairs_means_with_std_and_counts_replicates() {
        let titles = aggregate(500.0).titles();
        assert_eq!(&titles[..4], &["temp_K", "temp_std_K", "P_bar", "P_std_bar"]);
        assert_eq!(titles[titles.len() - 3], "mol_fract_C2H6");
        assert_eq!(titles[titles.len() - 2], "mol_fract_C2H6_std");
        assert_eq!(titles[titles.len() - 1], "No_replicates");
    }

    #[test]
    fn append_writes_header_once_and_reads_back_every_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis_avg_std_of_replicates_box_liq.txt");
        AggregateRecord::append_all_to_path(&[aggregate(500.0)], &path).unwrap();
        AggregateRecord::append_all_to_path(&[aggregate(520.0), aggregate(540.0)], &path)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("temp_K").count(), 1);

        let rows = AggregateRecord::read_all_from_path(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], aggregate(540.0));
        assert_eq!(rows[0].properties.pressure.mean, 11.0);
        assert!((rows[0].properties.pressure.std_dev - 1.414213562).abs() < 1e-9);
    }

    #[test]
    fn append_with_stale_header_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.txt");
        std::fs::write(&path, "temp_K P_bar\n500 1\n").unwrap();
        let err = AggregateRecord::append_all_to_path(&[aggregate(500.0)], &path).unwrap_err();
        assert!(matches!(err, TableError::HeaderMismatch { .. }));
        // The file is left as it was.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "temp_K P_bar\n500 1\n");
    }

    #[test]
    fn box_record_without_temperature_column_is_rejected() {
        let table = Table::parse(Cursor::new("P_bar\n1.0\n")).unwrap();
        assert!(matches!(
            BoxRecord::from_row(&table, 0),
            Err(TableError::MissingColumn(_))
        ));
    }
}
