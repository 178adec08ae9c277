use serde::{Deserialize, Serialize};

/// 100-year Global Warming Potentials for the non-CO2 gases the
/// combustion calculators split out.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GwpValues {
    pub ch4: f64,
    pub n2o: f64,
}

/// IPCC assessment report the GWP table is taken from.
///
/// Moving to a newer table is a config change (`gwp_set = "ar6"`);
/// results record which set priced them.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GwpSet {
    #[default]
    Ar4,
    Ar5,
    Ar6,
}

impl GwpSet {
    pub const fn values(self) -> GwpValues {
        match self {
            GwpSet::Ar4 => GwpValues {
                ch4: 25.0,
                n2o: 298.0,
            },
            GwpSet::Ar5 => GwpValues {
                ch4: 28.0,
                n2o: 265.0,
            },
            GwpSet::Ar6 => GwpValues {
                ch4: 27.9,
                n2o: 273.0,
            },
        }
    }
}
