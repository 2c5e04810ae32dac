// Filter definitions as read from the host's config store.

use strum::{EnumIter, IntoEnumIterator};

/// Lowest frequency shown on the plot (Hz)
pub const MIN_FREQ: f64 = 20.0;
/// Highest frequency shown on the plot (Hz)
pub const MAX_FREQ: f64 = 20000.0;

/// Prefix reserved for filters generated by the host itself (tone knobs, preamp, ...)
pub const SYSTEM_PREFIX: &str = "__";
/// Suffix marker used to disambiguate the same logical filter across channels
pub const CHANNEL_SUFFIX: &str = "__c";

/// Response shape of a biquad section
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, strum::Display)]
pub enum BiquadSubtype {
    #[default]
    Peaking,
    Lowshelf,
    Highshelf,
    Lowpass,
    Highpass,
    Bandpass,
    Notch,
    #[strum(serialize = "One-pole LP")]
    OnePoleLowpass,
    #[strum(serialize = "One-pole HP")]
    OnePoleHighpass,
}

impl BiquadSubtype {
    /// Subtypes that are drawn as response curves and get a draggable marker
    pub fn is_plottable(&self) -> bool {
        matches!(
            self,
            BiquadSubtype::Peaking | BiquadSubtype::Lowshelf | BiquadSubtype::Highshelf
        )
    }

    /// Next plottable subtype, wrapping around
    pub fn next_plottable(&self) -> BiquadSubtype {
        let plottable: Vec<BiquadSubtype> =
            BiquadSubtype::iter().filter(|s| s.is_plottable()).collect();
        match plottable.iter().position(|s| s == self) {
            Some(i) => plottable[(i + 1) % plottable.len()],
            None => BiquadSubtype::Peaking,
        }
    }
}

/// Parameters of one biquad section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadParams {
    pub subtype: BiquadSubtype,
    /// center/corner frequency (in Hz)
    pub frequency: f64,
    /// boost/cut in dB, left unclamped for computation
    pub gain: f64,
    /// quality factor
    pub q: f64,
}

impl BiquadParams {
    pub fn new(subtype: BiquadSubtype, frequency: f64, gain: f64, q: f64) -> Self {
        Self {
            subtype,
            frequency,
            gain,
            q,
        }
    }

    /// Whether the parameters can be evaluated at all. Anything else is skipped by
    /// the renderer and the marker index.
    pub fn is_well_formed(&self) -> bool {
        self.frequency.is_finite()
            && self.frequency > 0.0
            && self.gain.is_finite()
            && self.q.is_finite()
            && self.q > 0.0
    }

    /// Frequency clamped to the plotted range
    pub fn display_frequency(&self) -> f64 {
        self.frequency.clamp(MIN_FREQ, MAX_FREQ)
    }
}

impl Default for BiquadParams {
    fn default() -> Self {
        Self {
            subtype: BiquadSubtype::Peaking,
            frequency: 1000.0,
            gain: 0.0,
            q: 1.0,
        }
    }
}

/// Filter kinds the host config may contain. Only the `Biquad` variant carries
/// response parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDefinition {
    Biquad(BiquadParams),
    Gain { gain: f64 },
    Convolution { source: String },
    Other { kind: String },
}

impl FilterDefinition {
    pub fn biquad(subtype: BiquadSubtype, frequency: f64, gain: f64, q: f64) -> Self {
        FilterDefinition::Biquad(BiquadParams::new(subtype, frequency, gain, q))
    }

    pub fn as_biquad(&self) -> Option<&BiquadParams> {
        match self {
            FilterDefinition::Biquad(params) => Some(params),
            _ => None,
        }
    }

    pub fn as_biquad_mut(&mut self) -> Option<&mut BiquadParams> {
        match self {
            FilterDefinition::Biquad(params) => Some(params),
            _ => None,
        }
    }

    /// Biquad parameters if this filter is drawn on the plot
    pub fn plottable(&self) -> Option<&BiquadParams> {
        self.as_biquad()
            .filter(|p| p.subtype.is_plottable() && p.is_well_formed())
    }

    pub fn kind_name(&self) -> &str {
        match self {
            FilterDefinition::Biquad(_) => "Biquad",
            FilterDefinition::Gain { .. } => "Gain",
            FilterDefinition::Convolution { .. } => "Conv",
            FilterDefinition::Other { kind } => kind,
        }
    }
}

/// Ordered `name -> definition` mapping. Iteration order is insertion order,
/// which is also the drawing order of curves and markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    entries: Vec<(String, FilterDefinition)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a filter. A replaced filter keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, filter: FilterDefinition) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = filter,
            None => self.entries.push((name, filter)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, filter: FilterDefinition) -> Self {
        self.insert(name, filter);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<FilterDefinition> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&FilterDefinition> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FilterDefinition> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterDefinition)> {
        self.entries.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, FilterDefinition)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (String, FilterDefinition)>>(iter: T) -> Self {
        let mut set = FilterSet::new();
        for (name, filter) in iter {
            set.insert(name, filter);
        }
        set
    }
}

pub fn is_system_filter(name: &str) -> bool {
    name.starts_with(SYSTEM_PREFIX)
}

/// Strip a trailing `__c<digits>` channel suffix
pub fn base_name(name: &str) -> &str {
    if let Some(idx) = name.rfind(CHANNEL_SUFFIX) {
        let digits = &name[idx + CHANNEL_SUFFIX.len()..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return &name[..idx];
        }
    }
    name
}

/// Marker id for a filter, optionally disambiguated by channel
pub fn marker_id(name: &str, channel: Option<usize>) -> String {
    match channel {
        Some(ch) => format!("{}{}{}", name, CHANNEL_SUFFIX, ch),
        None => name.to_string(),
    }
}
