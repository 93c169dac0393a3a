//! Hierarchy of controls
//!
//! Catalog control categories are free-form strings; for presentation they
//! fold into the standard hierarchy-of-controls tiers, ordered from most
//! to least effective. Unknown categories keep their own name and sort
//! after the known tiers.

use std::cmp::Ordering;

/// A presentation tier in the hierarchy of controls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tier {
    Elimination,
    Substitution,
    Engineering,
    Administrative,
    Ppe,
    General,
    Other(String),
}

impl Tier {
    /// Fold a raw catalog category into its tier.
    pub fn for_category(category: &str) -> Tier {
        let folded = category.trim();
        match folded.to_lowercase().as_str() {
            "elimination" => Tier::Elimination,
            "substitution" => Tier::Substitution,
            "engineering controls" | "electrical isolation" | "handling equipment" => {
                Tier::Engineering
            }
            "administrative controls" | "communication" | "procedural" | "supervision"
            | "training" | "procedures" | "monitoring" => Tier::Administrative,
            "personal protective equipment" | "ppe" => Tier::Ppe,
            "general" => Tier::General,
            "" => Tier::Other("Other".to_string()),
            _ => Tier::Other(folded.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Tier::Elimination => "Elimination",
            Tier::Substitution => "Substitution",
            Tier::Engineering => "Engineering Controls",
            Tier::Administrative => "Administrative Controls",
            Tier::Ppe => "Personal Protective Equipment",
            Tier::General => "General",
            Tier::Other(name) => name,
        }
    }

    /// Caption shown next to the tier header.
    pub fn effectiveness_caption(&self) -> Option<&'static str> {
        match self {
            Tier::Elimination => Some("Most Effective"),
            Tier::Substitution => Some("Very Effective"),
            Tier::Engineering => Some("Moderately Effective"),
            Tier::Administrative => Some("Less Effective"),
            Tier::Ppe => Some("Least Effective"),
            Tier::General | Tier::Other(_) => None,
        }
    }

    fn rank(&self) -> usize {
        match self {
            Tier::Elimination => 0,
            Tier::Substitution => 1,
            Tier::Engineering => 2,
            Tier::Administrative => 3,
            Tier::Ppe => 4,
            Tier::General => 5,
            Tier::Other(_) => 6,
        }
    }
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Known tiers by hierarchy rank; unknown categories alphabetical.
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (Tier::Other(a), Tier::Other(b)) => a.cmp(b),
            _ => Ordering::Equal,
        })
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
