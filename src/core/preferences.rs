use crate::domain::model::{EffectiveFilterCriteria, ManualFilters, UserProfile};

/// Merges profile preferences with manual overrides.
///
/// A non-empty manual location list replaces the profile list outright, and
/// an explicit manual budget replaces the profile budget even when lower.
/// Blank location tokens are discarded before either rule applies.
pub fn resolve(profile: Option<&UserProfile>, manual: &ManualFilters) -> EffectiveFilterCriteria {
    let preferred_locations = profile
        .map(|p| clean_tokens(&p.preferred_locations))
        .unwrap_or_default();

    let manual_locations = clean_tokens(&manual.locations);
    let locations = if manual_locations.is_empty() {
        preferred_locations.clone()
    } else {
        manual_locations
    };

    let max_budget = manual
        .budget
        .or_else(|| profile.and_then(|p| p.average_budget));

    EffectiveFilterCriteria {
        locations,
        max_budget,
        preferred_locations,
    }
}

fn clean_tokens(tokens: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.trim();
        if !token.is_empty() && !cleaned.iter().any(|t| t == token) {
            cleaned.push(token.to_string());
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(locations: &[&str], budget: Option<f64>) -> UserProfile {
        UserProfile {
            preferred_locations: locations.iter().map(|s| s.to_string()).collect(),
            average_budget: budget,
        }
    }

    #[test]
    fn test_manual_locations_replace_profile_locations() {
        let profile = profile(&["Maadi"], None);
        let manual = ManualFilters {
            locations: vec!["New Cairo".to_string()],
            budget: None,
        };

        let criteria = resolve(Some(&profile), &manual);

        assert_eq!(criteria.locations, vec!["New Cairo".to_string()]);
        assert_eq!(criteria.preferred_locations, vec!["Maadi".to_string()]);
    }

    #[test]
    fn test_profile_locations_used_without_manual_selection() {
        let profile = profile(&["Maadi", "Zayed"], Some(5_000_000.0));
        let criteria = resolve(Some(&profile), &ManualFilters::default());

        assert_eq!(criteria.locations, vec!["Maadi".to_string(), "Zayed".to_string()]);
        assert_eq!(criteria.max_budget, Some(5_000_000.0));
    }

    #[test]
    fn test_manual_budget_wins_even_when_lower() {
        let profile = profile(&[], Some(5_000_000.0));
        let manual = ManualFilters {
            locations: vec![],
            budget: Some(1_000_000.0),
        };

        assert_eq!(resolve(Some(&profile), &manual).max_budget, Some(1_000_000.0));
    }

    #[test]
    fn test_no_profile_and_no_overrides_means_no_filtering() {
        let criteria = resolve(None, &ManualFilters::default());
        assert!(criteria.locations.is_empty());
        assert!(criteria.max_budget.is_none());
        assert!(criteria.preferred_locations.is_empty());
    }

    #[test]
    fn test_blank_manual_tokens_do_not_override_profile() {
        let profile = profile(&["Maadi"], None);
        let manual = ManualFilters {
            locations: vec!["  ".to_string()],
            budget: None,
        };
        assert_eq!(resolve(Some(&profile), &manual).locations, vec!["Maadi".to_string()]);
    }
}
