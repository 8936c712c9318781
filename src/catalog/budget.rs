use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::Serialize;

use crate::catalog::Destination;
use crate::error::PlannerError;

lazy_static! {
    static ref LUXURY_KEYWORDS: HashSet<&'static str> = HashSet::from([
        "luxury", "resort", "5-star", "exclusive", "premium", "overwater", "villa", "spa",
        "private", "concierge",
    ]);
    static ref BUDGET_KEYWORDS: HashSet<&'static str> =
        HashSet::from(["campground", "hostel", "budget", "affordable", "cheap", "camping"]);
}

/// Inferred price bracket. Not stored in the catalog; derived on demand
/// from the amenities list and description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetTier {
    Luxury,
    MidRange,
    BudgetFriendly,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Luxury => "Luxury",
            Self::MidRange => "Mid-Range",
            Self::BudgetFriendly => "Budget-Friendly",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetTier {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "luxury" => Ok(Self::Luxury),
            "mid-range" | "midrange" | "mid" => Ok(Self::MidRange),
            "budget-friendly" | "budget" => Ok(Self::BudgetFriendly),
            other => Err(PlannerError::UnknownBudgetTier(other.to_string())),
        }
    }
}

/// Classify a destination's price bracket from its amenities and
/// description. Luxury keywords win over budget keywords when both
/// appear; anything with neither is Mid-Range.
pub fn infer_budget(destination: &Destination) -> BudgetTier {
    if matches_any(destination, &LUXURY_KEYWORDS) {
        return BudgetTier::Luxury;
    }
    if matches_any(destination, &BUDGET_KEYWORDS) {
        return BudgetTier::BudgetFriendly;
    }
    BudgetTier::MidRange
}

fn matches_any(destination: &Destination, keywords: &HashSet<&'static str>) -> bool {
    let description = destination.description.to_lowercase();
    keywords.iter().any(|kw| description.contains(kw))
        || destination
            .amenities
            .iter()
            .any(|amenity| {
                let amenity = amenity.to_lowercase();
                keywords.iter().any(|kw| amenity.contains(kw))
            })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination_with(amenities: &[&str], description: &str) -> Destination {
        Destination {
            name: "Test".into(),
            location: "Test".into(),
            state: None,
            country: "USA".into(),
            description: description.into(),
            activities: vec![],
            scenery: vec![],
            amenities: amenities.iter().map(|s| s.to_string()).collect(),
            best_season: vec![],
            travel_time: None,
            nearby_attractions: vec![],
            keywords: vec![],
        }
    }

    #[test]
    fn villa_and_spa_are_luxury() {
        let dest = destination_with(&["overwater villa", "spa"], "");
        assert_eq!(infer_budget(&dest), BudgetTier::Luxury);
    }

    #[test]
    fn campgrounds_and_hostels_are_budget_friendly() {
        let dest = destination_with(&["campgrounds", "hostel"], "");
        assert_eq!(infer_budget(&dest), BudgetTier::BudgetFriendly);
    }

    #[test]
    fn plain_amenities_are_mid_range() {
        let dest = destination_with(&["restaurants", "visitor centers"], "");
        assert_eq!(infer_budget(&dest), BudgetTier::MidRange);
    }

    #[test]
    fn luxury_wins_when_both_tiers_match() {
        let dest = destination_with(&["luxury resorts", "campgrounds"], "");
        assert_eq!(infer_budget(&dest), BudgetTier::Luxury);
    }

    #[test]
    fn description_keywords_count_too() {
        let dest = destination_with(&["restaurants"], "An exclusive premium retreat");
        assert_eq!(infer_budget(&dest), BudgetTier::Luxury);

        let dest = destination_with(&["restaurants"], "Cheap and cheerful roadside stop");
        assert_eq!(infer_budget(&dest), BudgetTier::BudgetFriendly);
    }

    #[test]
    fn tier_parsing_round_trips() {
        assert_eq!("luxury".parse::<BudgetTier>().unwrap(), BudgetTier::Luxury);
        assert_eq!(
            "Budget-Friendly".parse::<BudgetTier>().unwrap(),
            BudgetTier::BudgetFriendly
        );
        assert_eq!("mid-range".parse::<BudgetTier>().unwrap(), BudgetTier::MidRange);
        assert!("palatial".parse::<BudgetTier>().is_err());
    }
}
