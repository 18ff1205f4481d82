use super::config::AnalysisConfig;
use super::error::AnalysisError;
use crate::core::models::properties::BoxProperties;
use crate::core::models::records::{AggregateRecord, BoxRecord, Phase, ReplicateSummary};
use crate::core::stats::SampleStats;
use tracing::warn;

/// Cross-replicate statistics of both boxes of one state point.
#[derive(Debug, Clone, PartialEq)]
pub struct StatePointAggregate {
    pub liquid: AggregateRecord,
    pub vapor: AggregateRecord,
}

impl StatePointAggregate {
    pub fn phase(&self, phase: Phase) -> &AggregateRecord {
        match phase {
            Phase::Liquid => &self.liquid,
            Phase::Vapor => &self.vapor,
        }
    }

    pub fn replicates(&self) -> usize {
        self.liquid.replicates
    }

    /// True when standard deviations are undefined because only one
    /// replicate contributed.
    pub fn is_degenerate(&self) -> bool {
        self.liquid.temperature.is_degenerate()
    }
}

/// Computes the mean and sample standard deviation of every observable over
/// the replicates of one state point.
///
/// A single replicate yields NaN standard deviations and a warning, or an
/// error when `strict_replicates` is set.
pub fn aggregate_replicates(
    group: &str,
    summaries: &[ReplicateSummary],
    config: &AnalysisConfig,
) -> Result<StatePointAggregate, AnalysisError> {
    let first = summaries
        .first()
        .ok_or_else(|| AnalysisError::InsufficientReplicates {
            group: group.to_string(),
            found: 0,
        })?;

    if summaries.len() < 2 {
        if config.strict_replicates {
            return Err(AnalysisError::InsufficientReplicates {
                group: group.to_string(),
                found: summaries.len(),
            });
        }
        warn!(
            group,
            replicates = summaries.len(),
            "Only one replicate; standard deviations are undefined"
        );
    }

    let species = first.liquid.properties.species();
    let consistent = summaries.iter().all(|s| {
        s.liquid.properties.species() == species && s.vapor.properties.species() == species
    });
    if !consistent {
        return Err(AnalysisError::InconsistentSpecies {
            group: group.to_string(),
        });
    }

    let aggregate_phase = |phase: Phase| -> Result<AggregateRecord, AnalysisError> {
        let records: Vec<&BoxRecord> = summaries.iter().map(|s| s.phase(phase)).collect();
        let temperatures: Vec<f64> = records.iter().map(|r| r.temperature).collect();
        let properties = BoxProperties::try_from_fn(&species, |obs| {
            let values = records
                .iter()
                .map(|r| r.properties.get(obs).copied())
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| AnalysisError::InconsistentSpecies {
                    group: group.to_string(),
                })?;
            Ok::<_, AnalysisError>(SampleStats::from_values(&values))
        })?;
        Ok(AggregateRecord {
            temperature: SampleStats::from_values(&temperatures),
            properties,
            replicates: records.len(),
        })
    };

    Ok(StatePointAggregate {
        liquid: aggregate_phase(Phase::Liquid)?,
        vapor: aggregate_phase(Phase::Vapor)?,
    })
}
