//! The CliftonStrengths catalog: 34 named strengths grouped into 4 domains.

use serde::{Deserialize, Serialize};

/// One of the four CliftonStrengths domains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum StrengthDomain {
    Executing,
    Influencing,
    RelationshipBuilding,
    StrategicThinking,
}

impl StrengthDomain {
    pub const ALL: [StrengthDomain; 4] = [
        Self::Executing,
        Self::Influencing,
        Self::RelationshipBuilding,
        Self::StrategicThinking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executing => "executing",
            Self::Influencing => "influencing",
            Self::RelationshipBuilding => "relationship_building",
            Self::StrategicThinking => "strategic_thinking",
        }
    }

    /// Human-readable label used in prompts and emails.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Executing => "Executing",
            Self::Influencing => "Influencing",
            Self::RelationshipBuilding => "Relationship Building",
            Self::StrategicThinking => "Strategic Thinking",
        }
    }
}

impl std::fmt::Display for StrengthDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Every strength paired with its domain, in catalog order.
pub const ALL_STRENGTHS: [(&str, StrengthDomain); 34] = [
    ("Achiever", StrengthDomain::Executing),
    ("Arranger", StrengthDomain::Executing),
    ("Belief", StrengthDomain::Executing),
    ("Consistency", StrengthDomain::Executing),
    ("Deliberative", StrengthDomain::Executing),
    ("Discipline", StrengthDomain::Executing),
    ("Focus", StrengthDomain::Executing),
    ("Responsibility", StrengthDomain::Executing),
    ("Restorative", StrengthDomain::Executing),
    ("Activator", StrengthDomain::Influencing),
    ("Command", StrengthDomain::Influencing),
    ("Communication", StrengthDomain::Influencing),
    ("Competition", StrengthDomain::Influencing),
    ("Maximizer", StrengthDomain::Influencing),
    ("Self-Assurance", StrengthDomain::Influencing),
    ("Significance", StrengthDomain::Influencing),
    ("Woo", StrengthDomain::Influencing),
    ("Adaptability", StrengthDomain::RelationshipBuilding),
    ("Connectedness", StrengthDomain::RelationshipBuilding),
    ("Developer", StrengthDomain::RelationshipBuilding),
    ("Empathy", StrengthDomain::RelationshipBuilding),
    ("Harmony", StrengthDomain::RelationshipBuilding),
    ("Includer", StrengthDomain::RelationshipBuilding),
    ("Individualization", StrengthDomain::RelationshipBuilding),
    ("Positivity", StrengthDomain::RelationshipBuilding),
    ("Relator", StrengthDomain::RelationshipBuilding),
    ("Analytical", StrengthDomain::StrategicThinking),
    ("Context", StrengthDomain::StrategicThinking),
    ("Futuristic", StrengthDomain::StrategicThinking),
    ("Ideation", StrengthDomain::StrategicThinking),
    ("Input", StrengthDomain::StrategicThinking),
    ("Intellection", StrengthDomain::StrategicThinking),
    ("Learner", StrengthDomain::StrategicThinking),
    ("Strategic", StrengthDomain::StrategicThinking),
];

fn lookup(name: &str) -> Option<(&'static str, StrengthDomain)> {
    let name = name.trim();
    ALL_STRENGTHS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .copied()
}

/// Catalog spelling of a strength name (case-insensitive match).
pub fn canonical_name(name: &str) -> Option<&'static str> {
    lookup(name).map(|(known, _)| known)
}

/// Domain a strength belongs to (case-insensitive match).
pub fn domain_of(name: &str) -> Option<StrengthDomain> {
    lookup(name).map(|(_, domain)| domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_34_unique_strengths() {
        let mut names: Vec<&str> = ALL_STRENGTHS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 34);
    }

    #[test]
    fn every_domain_is_populated() {
        for domain in StrengthDomain::ALL {
            let count = ALL_STRENGTHS.iter().filter(|(_, d)| *d == domain).count();
            assert!(count >= 8, "{domain} has only {count} strengths");
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(canonical_name("  self-assurance "), Some("Self-Assurance"));
        assert_eq!(domain_of("WOO"), Some(StrengthDomain::Influencing));
        assert_eq!(domain_of("Telepathy"), None);
    }
}
