use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A knowledge domain the assistant can answer from.
///
/// Each domain maps to its own knowledge base and carries its own display
/// strings, example prompts, and crossover keyword set. Adding a domain means
/// extending this enum and satisfying every match below — per-domain data is
/// never an open-ended map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// The official rulebook: rules of play, violations, officiating.
    Rulebook,
    /// The collective bargaining agreement: salaries, contracts, the cap.
    Compensation,
}

/// How many distinct crossover keywords an answer must contain before it is
/// flagged as touching the other domain.
pub const CROSS_DOMAIN_THRESHOLD: usize = 2;

impl Default for Domain {
    fn default() -> Self {
        Self::Rulebook
    }
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rulebook => "rulebook",
            Self::Compensation => "compensation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rulebook" => Some(Self::Rulebook),
            "compensation" => Some(Self::Compensation),
            _ => None,
        }
    }

    /// The other domain of the pair.
    pub fn other(&self) -> Self {
        match self {
            Self::Rulebook => Self::Compensation,
            Self::Compensation => Self::Rulebook,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Rulebook => "Official Rulebook",
            Self::Compensation => "Collective Bargaining Agreement",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            Self::Rulebook => "rules of play, violations, and officiating",
            Self::Compensation => "salaries, contracts, and the salary cap",
        }
    }

    /// Knowledge base used when the config carries no override.
    pub fn default_knowledge_base_id(&self) -> &'static str {
        match self {
            Self::Rulebook => "JFEGBVQF3O",
            Self::Compensation => "Q4XMR8TWHC",
        }
    }

    /// Inference profile used when the config carries no override.
    pub fn default_model_id(&self) -> &'static str {
        match self {
            Self::Rulebook | Self::Compensation => {
                "us.anthropic.claude-3-5-sonnet-20241022-v2:0"
            }
        }
    }

    /// Prompts shown on the welcome screen.
    pub fn example_prompts(&self) -> &'static [&'static str] {
        match self {
            Self::Rulebook => &[
                "What constitutes a traveling violation?",
                "How long is the shot clock?",
                "What are the rules for goaltending?",
                "What's the difference between a foul and a violation?",
            ],
            Self::Compensation => &[
                "How does the mid-level exception work?",
                "When does a contract become fully guaranteed?",
                "What triggers the luxury tax apron?",
                "How are rookie scale contracts structured?",
            ],
        }
    }

    /// Keywords that suggest an answer in this domain also touches the
    /// *other* domain's subject matter.
    pub fn crossover_keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Rulebook => &[
                "salary",
                "contract",
                "guaranteed",
                "luxury tax",
                "cap space",
                "free agen",
                "trade exception",
                "escrow",
                "waiver",
                "buyout",
                "rookie scale",
            ],
            Self::Compensation => &[
                "traveling",
                "shot clock",
                "goaltending",
                "personal foul",
                "technical foul",
                "violation",
                "out of bounds",
                "backcourt",
                "free throw",
                "jump ball",
                "ejection",
            ],
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Decide whether an answer likely touches the other domain.
///
/// Lower-cases the answer once and counts how many of the active domain's
/// crossover keywords occur as substrings. Returns the other domain iff at
/// least [`CROSS_DOMAIN_THRESHOLD`] distinct keywords match.
pub fn related_domain(answer: &str, active: Domain) -> Option<Domain> {
    let lowered = answer.to_lowercase();
    let matches = active
        .crossover_keywords()
        .iter()
        .filter(|keyword| lowered.contains(*keyword))
        .count();

    if matches >= CROSS_DOMAIN_THRESHOLD {
        Some(active.other())
    } else {
        None
    }
}
