// Access to the host's filter configuration.

use thiserror::Error;

use crate::filter::{BiquadParams, FilterSet};

/// A partial parameter update. `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamChange {
    pub frequency: Option<f64>,
    pub gain: Option<f64>,
    pub q: Option<f64>,
}

impl ParamChange {
    pub fn frequency_gain(frequency: f64, gain: f64) -> Self {
        Self {
            frequency: Some(frequency),
            gain: Some(gain),
            q: None,
        }
    }

    pub fn q(q: f64) -> Self {
        Self {
            q: Some(q),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_none() && self.gain.is_none() && self.q.is_none()
    }

    pub fn apply_to(&self, params: &mut BiquadParams) {
        if let Some(frequency) = self.frequency {
            params.frequency = frequency;
        }
        if let Some(gain) = self.gain {
            params.gain = gain;
        }
        if let Some(q) = self.q {
            params.q = q;
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("filter {0} not found")]
    UnknownFilter(String),
    #[error("filter {0} has no frequency/gain/Q parameters")]
    NotBiquad(String),
}

/// The config store the plot reads filters from and writes edits back to
pub trait FilterStore {
    /// Number of independent channels with their own filter chain
    fn channel_count(&self) -> usize {
        1
    }

    /// Filters of one channel, or every filter when `channel` is `None`
    fn filters(&self, channel: Option<usize>) -> FilterSet;

    /// Synchronous local mutation; the new value is authoritative for display
    fn set_filter_parameter(&mut self, name: &str, change: &ParamChange) -> Result<(), StoreError>;

    /// Flush local state to the persistent/remote side
    fn commit(&mut self) -> anyhow::Result<()>;
}

/// Filter store kept entirely in memory. Commits take a snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilterStore {
    filters: FilterSet,
    /// filter names per channel; empty means a single channel holding everything
    channels: Vec<Vec<String>>,
    committed: Vec<FilterSet>,
    fail_commits: bool,
}

impl MemoryFilterStore {
    pub fn new(filters: FilterSet) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Assign filter names to channels
    pub fn with_channels(mut self, channels: Vec<Vec<String>>) -> Self {
        self.channels = channels;
        self
    }

    /// Make every following commit fail
    pub fn set_fail_commits(&mut self, fail: bool) {
        self.fail_commits = fail;
    }

    pub fn filters_mut(&mut self) -> &mut FilterSet {
        &mut self.filters
    }

    /// Snapshots taken by successful commits, oldest first
    pub fn commits(&self) -> &[FilterSet] {
        &self.committed
    }

    pub fn last_commit(&self) -> Option<&FilterSet> {
        self.committed.last()
    }
}

impl FilterStore for MemoryFilterStore {
    fn channel_count(&self) -> usize {
        self.channels.len().max(1)
    }

    fn filters(&self, channel: Option<usize>) -> FilterSet {
        let names = match channel {
            Some(ch) => match self.channels.get(ch) {
                Some(names) => names,
                None if self.channels.is_empty() && ch == 0 => return self.filters.clone(),
                None => return FilterSet::new(),
            },
            None => return self.filters.clone(),
        };
        names
            .iter()
            .filter_map(|name| {
                self.filters
                    .get(name)
                    .map(|filter| (name.clone(), filter.clone()))
            })
            .collect()
    }

    fn set_filter_parameter(&mut self, name: &str, change: &ParamChange) -> Result<(), StoreError> {
        let filter = self
            .filters
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownFilter(name.to_string()))?;
        let params = filter
            .as_biquad_mut()
            .ok_or_else(|| StoreError::NotBiquad(name.to_string()))?;
        change.apply_to(params);
        Ok(())
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        if self.fail_commits {
            anyhow::bail!("commit rejected by store");
        }
        self.committed.push(self.filters.clone());
        Ok(())
    }
}
