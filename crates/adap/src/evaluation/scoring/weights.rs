//! Fixed instrument weights.
//!
//! Every sub-factor is a weighted sum over question codes; factors and overall scores are
//! weighted sums over sub-factors. Terms are listed in summation order.

use serde::{Deserialize, Serialize};

/// One `(question code, weight)` pair of a weighted sum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub code: &'static str,
    pub weight: f64,
}

const fn term(code: &'static str, weight: f64) -> Term {
    Term { code, weight }
}

/// Sub-factors computed directly from question codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreComponent {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    D1,
    D2,
    D3,
    OrganizationalSupport,
}

impl ScoreComponent {
    pub const ALL: [ScoreComponent; 13] = [
        ScoreComponent::F1,
        ScoreComponent::F2,
        ScoreComponent::F3,
        ScoreComponent::F4,
        ScoreComponent::F5,
        ScoreComponent::F6,
        ScoreComponent::F7,
        ScoreComponent::F8,
        ScoreComponent::F9,
        ScoreComponent::D1,
        ScoreComponent::D2,
        ScoreComponent::D3,
        ScoreComponent::OrganizationalSupport,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ScoreComponent::F1 => "F1",
            ScoreComponent::F2 => "F2",
            ScoreComponent::F3 => "F3",
            ScoreComponent::F4 => "F4",
            ScoreComponent::F5 => "F5",
            ScoreComponent::F6 => "F6",
            ScoreComponent::F7 => "F7",
            ScoreComponent::F8 => "F8",
            ScoreComponent::F9 => "F9",
            ScoreComponent::D1 => "D1",
            ScoreComponent::D2 => "D2",
            ScoreComponent::D3 => "D3",
            ScoreComponent::OrganizationalSupport => "organizational_support",
        }
    }
}

/// Self-leadership factors (behavioural, reward, constructive thought strategies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SelfLeadershipFactor {
    E1,
    E2,
    E3,
}

impl SelfLeadershipFactor {
    pub const ALL: [SelfLeadershipFactor; 3] = [
        SelfLeadershipFactor::E1,
        SelfLeadershipFactor::E2,
        SelfLeadershipFactor::E3,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            SelfLeadershipFactor::E1 => "E1",
            SelfLeadershipFactor::E2 => "E2",
            SelfLeadershipFactor::E3 => "E3",
        }
    }
}

/// Versioned set of weights for one edition of the instrument.
#[derive(Debug, PartialEq)]
pub struct WeightTable {
    pub version: &'static str,
    pub sub_factors: &'static [(ScoreComponent, &'static [Term])],
    pub factors: &'static [(SelfLeadershipFactor, &'static [ScoreComponent])],
    pub self_leadership_overall: &'static [(SelfLeadershipFactor, f64)],
    pub performance_overall: &'static [(ScoreComponent, f64)],
}

impl WeightTable {
    pub fn standard() -> &'static WeightTable {
        &STANDARD_WEIGHTS
    }

    /// Terms of a sub-factor; empty when the table does not define it.
    pub fn terms(&self, component: ScoreComponent) -> &'static [Term] {
        self.sub_factors
            .iter()
            .find(|(candidate, _)| *candidate == component)
            .map(|(_, terms)| *terms)
            .unwrap_or(&[])
    }

    pub fn members(&self, factor: SelfLeadershipFactor) -> &'static [ScoreComponent] {
        self.factors
            .iter()
            .find(|(candidate, _)| *candidate == factor)
            .map(|(_, members)| *members)
            .unwrap_or(&[])
    }

    /// Every question code referenced by the table, in table order.
    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sub_factors
            .iter()
            .flat_map(|(_, terms)| terms.iter().map(|term| term.code))
    }
}

pub static STANDARD_WEIGHTS: WeightTable = WeightTable {
    version: "adap-2024.11",
    sub_factors: &[
        (ScoreComponent::F1, F1),
        (ScoreComponent::F2, F2),
        (ScoreComponent::F3, F3),
        (ScoreComponent::F4, F4),
        (ScoreComponent::F5, F5),
        (ScoreComponent::F6, F6),
        (ScoreComponent::F7, F7),
        (ScoreComponent::F8, F8),
        (ScoreComponent::F9, F9),
        (ScoreComponent::D1, D1),
        (ScoreComponent::D2, D2),
        (ScoreComponent::D3, D3),
        (ScoreComponent::OrganizationalSupport, ORGANIZATIONAL_SUPPORT),
    ],
    factors: &[
        (
            SelfLeadershipFactor::E1,
            &[
                ScoreComponent::F1,
                ScoreComponent::F2,
                ScoreComponent::F3,
                ScoreComponent::F4,
                ScoreComponent::F5,
            ],
        ),
        (SelfLeadershipFactor::E2, &[ScoreComponent::F6]),
        (
            SelfLeadershipFactor::E3,
            &[ScoreComponent::F7, ScoreComponent::F8, ScoreComponent::F9],
        ),
    ],
    self_leadership_overall: &[
        (SelfLeadershipFactor::E1, 0.3172),
        (SelfLeadershipFactor::E2, 0.3155),
        (SelfLeadershipFactor::E3, 0.3672),
    ],
    performance_overall: &[
        (ScoreComponent::D1, 0.4817),
        (ScoreComponent::D2, 0.3936),
        (ScoreComponent::D3, 0.1246),
    ],
};

const F1: &[Term] = &[
    term("Auto_10", 0.2003),
    term("Auto_6", 0.1918),
    term("Auto_5", 0.1306),
    term("Auto_3", 0.1240),
];
const F2: &[Term] = &[term("Auto_14", 0.0137)];
const F3: &[Term] = &[term("Auto_4", 0.0020)];
const F4: &[Term] = &[term("Auto_7", 0.1666)];
const F5: &[Term] = &[term("Auto_8", 0.0867), term("Auto_13", 0.1036)];
const F6: &[Term] = &[
    term("Auto_16", 0.3726),
    term("Auto_17", 0.3551),
    term("Auto_15", 0.2721),
];
const F7: &[Term] = &[
    term("Auto_1", 0.1846),
    term("Auto_11", 0.2267),
    term("Auto_12", 0.1903),
];
const F8: &[Term] = &[term("Auto_2", 0.0641)];
const F9: &[Term] = &[
    term("Auto_9", 0.1846),
    term("Auto_18", 0.2267),
    term("Auto_19", 0.0892),
];

const D1: &[Term] = &[
    term("Des_2", 0.327),
    term("Des_3", 0.271),
    term("Des_1", 0.238),
    term("Des_4", 0.162),
];
// Des_5 carries 0.834 in the published instrument; kept as-is for score parity.
const D2: &[Term] = &[
    term("Des_8", 0.1524),
    term("Des_9", 0.175),
    term("Des_7", 0.1301),
    term("Des_11", 0.1272),
    term("Des_10", 0.1223),
    term("Des_12", 0.1048),
    term("Des_6", 0.1045),
    term("Des_5", 0.834),
];
const D3: &[Term] = &[
    term("Des_13", 0.1882),
    term("Des_14", 0.2051),
    term("Des_15", 0.2252),
    term("Des_16", 0.2029),
    term("Des_17", 0.1774),
];

const ORGANIZATIONAL_SUPPORT: &[Term] = &[
    term("Apoyo_1", 0.1731),
    term("Apoyo_2", 0.1963),
    term("Apoyo_3", 0.1983),
    term("Apoyo_4", 0.1743),
    term("Apoyo_5", 0.167),
    term("Apoyo_6", 0.0908),
];
