use anyhow::Context;
use crossbeam_channel::Sender;
use eqplot_core::filter::{BiquadParams, BiquadSubtype, FilterDefinition, FilterSet};
use eqplot_core::{FilterStore, ParamChange, StoreError};

use crate::transport::ConfigCommand;

/// Filter config held by the TUI. Edits apply locally at once; commits send a
/// snapshot to the config transport.
#[derive(Debug)]
pub struct LocalFilterStore {
    filters: FilterSet,
    /// filter names per channel
    channels: Vec<Vec<String>>,
    cmd_tx: Sender<ConfigCommand>,
    next_id: usize,
}

impl LocalFilterStore {
    pub fn new(filters: FilterSet, channel_count: usize, cmd_tx: Sender<ConfigCommand>) -> Self {
        let names: Vec<String> = filters.names().map(str::to_string).collect();
        let next_id = names.len() + 1;
        Self {
            channels: vec![names; channel_count.max(1)],
            filters,
            cmd_tx,
            next_id,
        }
    }

    /// A small starting curve with a preamp and a system tone filter
    pub fn default_filters() -> FilterSet {
        FilterSet::new()
            .with("Preamp", FilterDefinition::Gain { gain: -3.0 })
            .with("Filter_1", FilterDefinition::biquad(BiquadSubtype::Lowshelf, 105.0, 3.0, 0.7))
            .with("Filter_2", FilterDefinition::biquad(BiquadSubtype::Peaking, 250.0, -2.0, 1.2))
            .with("Filter_3", FilterDefinition::biquad(BiquadSubtype::Peaking, 3000.0, 2.5, 2.0))
            .with("Filter_4", FilterDefinition::biquad(BiquadSubtype::Highshelf, 9000.0, -1.5, 0.7))
            .with("__treble", FilterDefinition::biquad(BiquadSubtype::Highshelf, 6000.0, 0.0, 0.7))
    }

    /// Add a flat peaking filter to every channel and return its name
    pub fn add_filter(&mut self, frequency: f64) -> String {
        let mut name = format!("Filter_{}", self.next_id);
        while self.filters.contains(&name) {
            self.next_id += 1;
            name = format!("Filter_{}", self.next_id);
        }
        self.next_id += 1;

        let params = BiquadParams {
            frequency,
            ..BiquadParams::default()
        };
        self.filters.insert(name.clone(), FilterDefinition::Biquad(params));
        for channel in &mut self.channels {
            channel.push(name.clone());
        }
        name
    }

    pub fn remove_filter(&mut self, name: &str) -> Result<(), StoreError> {
        self.filters
            .remove(name)
            .ok_or_else(|| StoreError::UnknownFilter(name.to_string()))?;
        for channel in &mut self.channels {
            channel.retain(|n| n != name);
        }
        Ok(())
    }

    /// Switch a biquad to the next plottable subtype
    pub fn cycle_subtype(&mut self, name: &str) -> Result<BiquadSubtype, StoreError> {
        let params = self
            .filters
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownFilter(name.to_string()))?
            .as_biquad_mut()
            .ok_or_else(|| StoreError::NotBiquad(name.to_string()))?;
        params.subtype = params.subtype.next_plottable();
        Ok(params.subtype)
    }
}

impl FilterStore for LocalFilterStore {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn filters(&self, channel: Option<usize>) -> FilterSet {
        match channel.and_then(|ch| self.channels.get(ch)) {
            Some(names) => names
                .iter()
                .filter_map(|n| self.filters.get(n).map(|f| (n.clone(), f.clone())))
                .collect(),
            None => self.filters.clone(),
        }
    }

    fn set_filter_parameter(&mut self, name: &str, change: &ParamChange) -> Result<(), StoreError> {
        let params = self
            .filters
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownFilter(name.to_string()))?
            .as_biquad_mut()
            .ok_or_else(|| StoreError::NotBiquad(name.to_string()))?;
        change.apply_to(params);
        Ok(())
    }

    fn commit(&mut self) -> anyhow::Result<()> {
        self.cmd_tx
            .send(ConfigCommand::Upload(self.filters.clone()))
            .context("config transport is gone")
    }
}
