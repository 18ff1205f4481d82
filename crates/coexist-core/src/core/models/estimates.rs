use super::records::REPLICATES_TITLE;
use crate::core::io::table::{Cell, Table, TableError};
use crate::core::io::traits::TabularRecord;
use crate::core::stats::SampleStats;

const CRITICAL_TAG: &str = "Tc";
const BOILING_TAG: &str = "Tbp";

/// Temperatures that entered a regression, in absolute and reduced units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureWindow {
    pub lowest: f64,
    pub highest: f64,
    pub lowest_reduced: f64,
    pub highest_reduced: f64,
    pub count: usize,
}

impl TemperatureWindow {
    fn titles(tag: &str) -> [String; 5] {
        [
            format!("lowest_T_K_for_{tag}"),
            format!("highest_T_K_for_{tag}"),
            format!("lowest_Tr_K_for_{tag}"),
            format!("highest_Tr_K_for_{tag}"),
            format!("No_T_K_for_{tag}"),
        ]
    }

    fn cells(&self) -> [Cell; 5] {
        [
            Cell::Float(self.lowest),
            Cell::Float(self.highest),
            Cell::Float(self.lowest_reduced),
            Cell::Float(self.highest_reduced),
            Cell::Count(self.count),
        ]
    }

    fn from_row(table: &Table, row: usize, tag: &str) -> Result<Self, TableError> {
        let [lowest, highest, lowest_reduced, highest_reduced, count] = Self::titles(tag);
        Ok(Self {
            lowest: table.float(row, &lowest)?,
            highest: table.float(row, &highest)?,
            lowest_reduced: table.float(row, &lowest_reduced)?,
            highest_reduced: table.float(row, &highest_reduced)?,
            count: table.count(row, &count)?,
        })
    }
}

/// Critical point extrapolated from one temperature series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalPoint {
    pub temperature: f64,
    pub density: f64,
    pub pressure: f64,
    pub window: TemperatureWindow,
}

impl TabularRecord for CriticalPoint {
    fn titles(&self) -> Vec<String> {
        ["Tc_K", "Rho_c_kg_per_m_cubed", "Pc_bar"]
            .into_iter()
            .map(str::to_string)
            .chain(TemperatureWindow::titles(CRITICAL_TAG))
            .collect()
    }

    fn cells(&self) -> Vec<Cell> {
        [
            Cell::Float(self.temperature),
            Cell::Float(self.density),
            Cell::Float(self.pressure),
        ]
        .into_iter()
        .chain(self.window.cells())
        .collect()
    }

    fn from_row(table: &Table, row: usize) -> Result<Self, TableError> {
        Ok(Self {
            temperature: table.float(row, "Tc_K")?,
            density: table.float(row, "Rho_c_kg_per_m_cubed")?,
            pressure: table.float(row, "Pc_bar")?,
            window: TemperatureWindow::from_row(table, row, CRITICAL_TAG)?,
        })
    }
}

/// Normal boiling point from a Clausius-Clapeyron fit of one temperature series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoilingPoint {
    pub temperature: f64,
    /// Pressure the fit was solved for, in bar.
    pub pressure: f64,
    pub heat_of_vaporization: f64,
    pub window: TemperatureWindow,
}

impl TabularRecord for BoilingPoint {
    fn titles(&self) -> Vec<String> {
        ["Tbp_K", "Pbp_bar", "Hv_kJ_per_mol_Claus_Clap"]
            .into_iter()
            .map(str::to_string)
            .chain(TemperatureWindow::titles(BOILING_TAG))
            .collect()
    }

    fn cells(&self) -> Vec<Cell> {
        [
            Cell::Float(self.temperature),
            Cell::Float(self.pressure),
            Cell::Float(self.heat_of_vaporization),
        ]
        .into_iter()
        .chain(self.window.cells())
        .collect()
    }

    fn from_row(table: &Table, row: usize) -> Result<Self, TableError> {
        Ok(Self {
            temperature: table.float(row, "Tbp_K")?,
            pressure: table.float(row, "Pbp_bar")?,
            heat_of_vaporization: table.float(row, "Hv_kJ_per_mol_Claus_Clap")?,
            window: TemperatureWindow::from_row(table, row, BOILING_TAG)?,
        })
    }
}

fn stats_from_row(
    table: &Table,
    row: usize,
    mean: &str,
    std: &str,
    count: usize,
) -> Result<SampleStats, TableError> {
    Ok(SampleStats {
        mean: table.float(row, mean)?,
        std_dev: table.float(row, std)?,
        count,
    })
}

/// Critical point averaged over replicate groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalPointSummary {
    pub temperature: SampleStats,
    pub density: SampleStats,
    pub pressure: SampleStats,
    pub window: TemperatureWindow,
    pub replicates: usize,
}

impl TabularRecord for CriticalPointSummary {
    fn titles(&self) -> Vec<String> {
        [
            "Tc_K",
            "Tc_std_K",
            "Rho_c_kg_per_m_cubed",
            "Rho_c_std_kg_per_m_cubed",
            "Pc_bar",
            "Pc_std_bar",
        ]
        .into_iter()
        .map(str::to_string)
        .chain(TemperatureWindow::titles(CRITICAL_TAG))
        .chain(std::iter::once(REPLICATES_TITLE.to_string()))
        .collect()
    }

    fn cells(&self) -> Vec<Cell> {
        [
            Cell::Float(self.temperature.mean),
            Cell::Float(self.temperature.std_dev),
            Cell::Float(self.density.mean),
            Cell::Float(self.density.std_dev),
            Cell::Float(self.pressure.mean),
            Cell::Float(self.pressure.std_dev),
        ]
        .into_iter()
        .chain(self.window.cells())
        .chain(std::iter::once(Cell::Count(self.replicates)))
        .collect()
    }

    fn from_row(table: &Table, row: usize) -> Result<Self, TableError> {
        let replicates = table.count(row, REPLICATES_TITLE)?;
        Ok(Self {
            temperature: stats_from_row(table, row, "Tc_K", "Tc_std_K", replicates)?,
            density: stats_from_row(
                table,
                row,
                "Rho_c_kg_per_m_cubed",
                "Rho_c_std_kg_per_m_cubed",
                replicates,
            )?,
            pressure: stats_from_row(table, row, "Pc_bar", "Pc_std_bar", replicates)?,
            window: TemperatureWindow::from_row(table, row, CRITICAL_TAG)?,
            replicates,
        })
    }
}

/// Boiling point averaged over replicate groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoilingPointSummary {
    pub temperature: SampleStats,
    pub pressure: f64,
    pub heat_of_vaporization: SampleStats,
    pub window: TemperatureWindow,
    pub replicates: usize,
}

impl TabularRecord for BoilingPointSummary {
    fn titles(&self) -> Vec<String> {
        [
            "Tbp_K",
            "Tbp_std_K",
            "Pbp_bar",
            "Hv_kJ_per_mol_Claus_Clap",
            "Hv_std_kJ_per_mol_Claus_Clap",
        ]
        .into_iter()
        .map(str::to_string)
        .chain(TemperatureWindow::titles(BOILING_TAG))
        .chain(std::iter::once(REPLICATES_TITLE.to_string()))
        .collect()
    }

    fn cells(&self) -> Vec<Cell> {
        [
            Cell::Float(self.temperature.mean),
            Cell::Float(self.temperature.std_dev),
            Cell::Float(self.pressure),
            Cell::Float(self.heat_of_vaporization.mean),
            Cell::Float(self.heat_of_vaporization.std_dev),
        ]
        .into_iter()
        .chain(self.window.cells())
        .chain(std::iter::once(Cell::Count(self.replicates)))
        .collect()
    }

    fn from_row(table: &Table, row: usize) -> Result<Self, TableError> {
        let replicates = table.count(row, REPLICATES_TITLE)?;
        Ok(Self {
            temperature: stats_from_row(table, row, "Tbp_K", "Tbp_std_K", replicates)?,
            pressure: table.float(row, "Pbp_bar")?,
            heat_of_vaporization: stats_from_row(
                table,
                row,
                "Hv_kJ_per_mol_Claus_Clap",
                "Hv_std_kJ_per_mol_Claus_Clap",
                replicates,
            )?,
            window: TemperatureWindow::from_row(table, row, BOILING_TAG)?,
            replicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn window() -> TemperatureWindow {
        TemperatureWindow {
            lowest: 500.0,
            highest: 580.0,
            lowest_reduced: 0.8333,
            highest_reduced: 0.9667,
            count: 5,
        }
    }

    #[test]
    fn critical_point_titles_carry_the_window_tag() {
        let point = CriticalPoint {
            temperature: 600.0,
            density: 300.0,
            pressure: 40.0,
            window: window(),
        };
        let titles = point.titles();
        assert_eq!(titles[0], "Tc_K");
        assert_eq!(titles[3], "lowest_T_K_for_Tc");
        assert_eq!(titles[7], "No_T_K_for_Tc");
        assert_eq!(point.cells().len(), titles.len());
    }

    #[test]
    fn appended_critical_points_read_back_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis_critical_points_all_replicates.txt");
        let points: Vec<CriticalPoint> = [600.0, 602.0]
            .into_iter()
            .map(|tc| CriticalPoint {
                temperature: tc,
                density: 300.0,
                pressure: f64::NAN,
                window: window(),
            })
            .collect();
        CriticalPoint::append_all_to_path(&points, &path).unwrap();

        let back = CriticalPoint::read_all_from_path(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].temperature, 602.0);
        assert!(back[0].pressure.is_nan());
        assert_eq!(back[0].window, window());
    }

    #[test]
    fn boiling_summary_is_rewritten_not_appended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("analysis_boiling_point_avg_std_of_replicates.txt");
        let summary = |tbp: f64| BoilingPointSummary {
            temperature: SampleStats::from_values(&[tbp, tbp + 2.0]),
            pressure: 1.01325,
            heat_of_vaporization: SampleStats::from_values(&[15.0, 15.5]),
            window: window(),
            replicates: 2,
        };
        summary(300.0).write_to_path(&path).unwrap();
        summary(310.0).write_to_path(&path).unwrap();

        let rows = BoilingPointSummary::read_all_from_path(&path).unwrap();
        assert_eq!(rows, vec![summary(310.0)]);
    }

    #[test]
    fn critical_summary_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("critical.txt");
        let summary = CriticalPointSummary {
            temperature: SampleStats::from_values(&[600.0, 604.0]),
            density: SampleStats::from_values(&[300.0, 302.0]),
            pressure: SampleStats::from_values(&[40.0, 41.0]),
            window: window(),
            replicates: 2,
        };
        summary.write_to_path(&path).unwrap();
        let back = CriticalPointSummary::read_first_from_path(&path).unwrap();
        assert_eq!(back, summary);
    }
}
