use crate::domain::model::{EffectiveFilterCriteria, Project};
use std::cmp::Ordering;

/// Ordered view into a catalog. Holds positions, never copies or edits projects.
#[derive(Debug, Clone)]
pub struct FilteredResult<'a> {
    catalog: &'a [Project],
    order: Vec<usize>,
}

impl<'a> FilteredResult<'a> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Catalog positions in ranked order.
    pub fn indices(&self) -> &[usize] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Project> + '_ {
        let catalog = self.catalog;
        self.order.iter().map(move |&i| &catalog[i])
    }

    pub fn projects(&self) -> Vec<&'a Project> {
        self.iter().collect()
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.order
    }
}

/// Filters by location and budget, then orders profile-preferred locations
/// first and, when a budget is set, by distance from it.
pub fn rank<'a>(catalog: &'a [Project], criteria: &EffectiveFilterCriteria) -> FilteredResult<'a> {
    let mut order: Vec<usize> = catalog
        .iter()
        .enumerate()
        .filter(|(_, project)| passes_location(project, criteria))
        .filter(|(_, project)| passes_budget(project, criteria))
        .map(|(i, _)| i)
        .collect();

    // sort_by is stable: catalog order breaks ties.
    order.sort_by(|&a, &b| compare(&catalog[a], &catalog[b], criteria));

    tracing::debug!(
        "Ranked {} of {} projects (locations: {:?}, max budget: {:?})",
        order.len(),
        catalog.len(),
        criteria.locations,
        criteria.max_budget
    );

    FilteredResult { catalog, order }
}

fn passes_location(project: &Project, criteria: &EffectiveFilterCriteria) -> bool {
    criteria.locations.is_empty() || project.location_matches_any(&criteria.locations)
}

fn passes_budget(project: &Project, criteria: &EffectiveFilterCriteria) -> bool {
    match criteria.max_budget {
        None => true,
        // Unpriced projects cannot be shown to fit a budget.
        Some(budget) => project.min_price().is_some_and(|min| min <= budget),
    }
}

fn compare(a: &Project, b: &Project, criteria: &EffectiveFilterCriteria) -> Ordering {
    let a_preferred = a.location_matches_any(&criteria.preferred_locations);
    let b_preferred = b.location_matches_any(&criteria.preferred_locations);

    b_preferred.cmp(&a_preferred).then_with(|| match criteria.max_budget {
        Some(budget) => budget_distance(a, budget).total_cmp(&budget_distance(b, budget)),
        None => Ordering::Equal,
    })
}

fn budget_distance(project: &Project, budget: f64) -> f64 {
    project
        .min_price()
        .map(|min| (min - budget).abs())
        .unwrap_or(f64::INFINITY)
}
