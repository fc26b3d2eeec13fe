use chrono::NaiveDateTime;

/// Column layouts produced by the different logger firmware revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// timestamp, voltage, PAR, CO2, temperature, logger, H2O
    WithVoltage,
    /// timestamp, CO2, PAR, temperature, logger, H2O
    WithoutVoltage,
}

impl ColumnLayout {
    pub fn from_column_count(count: usize) -> Option<Self> {
        match count {
            7 => Some(ColumnLayout::WithVoltage),
            6 => Some(ColumnLayout::WithoutVoltage),
            _ => None,
        }
    }

    pub fn column_count(self) -> usize {
        match self {
            ColumnLayout::WithVoltage => 7,
            ColumnLayout::WithoutVoltage => 6,
        }
    }
}

/// One logger row. Numeric channels are already normalised; see `utils` for
/// the sentinel rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub raw_timestamp: String,
    pub timestamp: Option<NaiveDateTime>,
    pub voltage: Option<f64>,
    pub par: f64,
    pub co2: f64,
    pub temperature: f64,
    pub marker: f64,
    pub h2o: f64,
}

/// A fully loaded recording. Index position is the time axis; timestamps are
/// carried through to the output only.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub samples: Vec<Sample>,
    pub layout: ColumnLayout,
}

impl Series {
    pub fn new(samples: Vec<Sample>, layout: ColumnLayout) -> Self {
        Self { samples, layout }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn markers(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.marker).collect()
    }

    pub fn co2(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.co2).collect()
    }
}

/// Chamber lid used for a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cover {
    Transparent,
    Dark,
}

impl Cover {
    /// Label written to the `chamber` column.
    pub fn code(self) -> &'static str {
        match self {
            Cover::Transparent => "t",
            Cover::Dark => "d",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    #[default]
    NotAnnotated,
    Nominal,
    /// Dark-cover window whose fitted trend is negative.
    Suspect,
}

impl Quality {
    pub fn code(self) -> u8 {
        match self {
            Quality::NotAnnotated => 0,
            Quality::Nominal => 1,
            Quality::Suspect => 2,
        }
    }
}

/// Per-sample output columns, aligned with `Series::samples`.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiAnnotations {
    pub aoi: Vec<bool>,
    pub cover: Vec<Option<Cover>>,
    pub quality: Vec<Quality>,
    /// Seconds since window start, `None` outside a window.
    pub window_seconds: Vec<Option<f64>>,
}

impl AoiAnnotations {
    pub fn empty(len: usize) -> Self {
        Self {
            aoi: vec![false; len],
            cover: vec![None; len],
            quality: vec![Quality::NotAnnotated; len],
            window_seconds: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.aoi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aoi.is_empty()
    }

    pub fn flagged_count(&self) -> usize {
        self.aoi.iter().filter(|&&flag| flag).count()
    }
}
