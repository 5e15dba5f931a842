use jiff::Timestamp;

use super::{StepRecord, Utilization};

/// The records of one simulation run, one per forcing step.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    records: Vec<StepRecord>,
}

impl Output {
    pub(super) fn new(records: Vec<StepRecord>) -> Self {
        Self { records }
    }

    /// Returns the records in time order.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<StepRecord> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn times(&self) -> Vec<Timestamp> {
        self.records.iter().map(|r| r.time).collect()
    }

    #[must_use]
    pub fn stored_volumes(&self) -> Vec<f64> {
        self.column(|r| r.stored_volume)
    }

    #[must_use]
    pub fn canal_levels(&self) -> Vec<f64> {
        self.column(|r| r.canal_level)
    }

    #[must_use]
    pub fn inner_levels(&self) -> Vec<f64> {
        self.column(|r| r.inner_level)
    }

    #[must_use]
    pub fn pump_capacities(&self) -> Vec<f64> {
        self.column(|r| r.pump_capacity)
    }

    #[must_use]
    pub fn flows(&self) -> Vec<f64> {
        self.column(|r| r.flow)
    }

    #[must_use]
    pub fn utilizations(&self) -> Vec<Utilization> {
        self.records.iter().map(|r| r.pump_utilization).collect()
    }

    /// Highest canal level of the run and when it occurred.
    #[must_use]
    pub fn peak_canal_level(&self) -> Option<(Timestamp, f64)> {
        self.records
            .iter()
            .max_by(|a, b| a.canal_level.total_cmp(&b.canal_level))
            .map(|r| (r.time, r.canal_level))
    }

    /// Sum of the recorded flows [mm].
    #[must_use]
    pub fn total_flow(&self) -> f64 {
        self.records.iter().map(|r| r.flow).sum()
    }

    fn column(&self, field: impl Fn(&StepRecord) -> f64) -> Vec<f64> {
        self.records.iter().map(field).collect()
    }
}

impl<'a> IntoIterator for &'a Output {
    type Item = &'a StepRecord;
    type IntoIter = std::slice::Iter<'a, StepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
