use super::ElementResult;
use super::codes::MainGroup;
use crate::calculation::InstanceStatus;
use crate::display::DisplayImpact;
use crate::domain::MaterialImpact;
use serde::Serialize;
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Counters and sums shared by every rollup level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupTotals {
    pub element_count: usize,
    pub quantity: f64,
    pub impact: MaterialImpact,
    /// Values in the requested display mode.
    pub display: DisplayImpact,
    /// Per m² EBF and year regardless of the display mode.
    pub normalized: DisplayImpact,
    pub modelled_instances: usize,
    pub unmapped_instances: usize,
}

impl Default for RollupTotals {
    fn default() -> Self {
        Self {
            element_count: 0,
            quantity: 0.0,
            impact: MaterialImpact::ZERO,
            display: DisplayImpact::ZERO,
            normalized: DisplayImpact::ZERO,
            modelled_instances: 0,
            unmapped_instances: 0,
        }
    }
}

impl RollupTotals {
    pub fn of_element(result: &ElementResult) -> Self {
        let modelled_instances = result
            .instances
            .iter()
            .filter(|instance| {
                instance.detail.status == InstanceStatus::Computed && !instance.detail.impact.is_zero()
            })
            .count();
        let unmapped_instances = result
            .instances
            .iter()
            .filter(|instance| instance.detail.status.is_unmapped())
            .count();

        Self {
            element_count: 1,
            quantity: result.element.quantity,
            impact: result.impact(),
            display: result.display,
            normalized: result.normalized,
            modelled_instances,
            unmapped_instances,
        }
    }
}

impl Add for RollupTotals {
    type Output = RollupTotals;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            element_count: self.element_count + rhs.element_count,
            quantity: self.quantity + rhs.quantity,
            impact: self.impact + rhs.impact,
            display: self.display + rhs.display,
            normalized: self.normalized + rhs.normalized,
            modelled_instances: self.modelled_instances + rhs.modelled_instances,
            unmapped_instances: self.unmapped_instances + rhs.unmapped_instances,
        }
    }
}

impl AddAssign for RollupTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for RollupTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationGroup {
    pub code: String,
    #[serde(flatten)]
    pub totals: RollupTotals,
    pub element_guids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationHierarchy {
    pub main_group: MainGroup,
    pub name: String,
    #[serde(flatten)]
    pub totals: RollupTotals,
    pub groups: Vec<ClassificationGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchicalRollup {
    pub hierarchies: Vec<ClassificationHierarchy>,
    pub totals: RollupTotals,
}

impl HierarchicalRollup {
    pub fn hierarchy(&self, main_group: MainGroup) -> Option<&ClassificationHierarchy> {
        self.hierarchies
            .iter()
            .find(|hierarchy| hierarchy.main_group == main_group)
    }

    pub fn group(&self, code: &str) -> Option<&ClassificationGroup> {
        self.hierarchies
            .iter()
            .flat_map(|hierarchy| hierarchy.groups.iter())
            .find(|group| group.code == code)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct GroupAccumulator {
    totals: RollupTotals,
    element_guids: Vec<String>,
}

/// Running rollup over element results pushed in any number of batches.
///
/// Merging accumulators built from disjoint batches gives the same rollup as
/// pushing every element into one accumulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollupAccumulator {
    groups: BTreeMap<String, GroupAccumulator>,
}

impl RollupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: &ElementResult) {
        let group = self.groups.entry(result.group_code.clone()).or_default();
        group.totals += RollupTotals::of_element(result);
        group.element_guids.push(result.element.guid.clone());
    }

    pub fn merge(&mut self, other: RollupAccumulator) {
        for (code, incoming) in other.groups {
            let group = self.groups.entry(code).or_default();
            group.totals += incoming.totals;
            group.element_guids.extend(incoming.element_guids);
        }
    }

    pub fn element_count(&self) -> usize {
        self.groups.values().map(|group| group.totals.element_count).sum()
    }

    /// Builds the hierarchy bottom-up so every parent equals the sum of its
    /// children.
    pub fn finish(self) -> HierarchicalRollup {
        let mut by_main_group: BTreeMap<MainGroup, Vec<ClassificationGroup>> = BTreeMap::new();
        for (code, group) in self.groups {
            by_main_group
                .entry(MainGroup::for_code(&code))
                .or_default()
                .push(ClassificationGroup {
                    code,
                    totals: group.totals,
                    element_guids: group.element_guids,
                });
        }

        let hierarchies: Vec<ClassificationHierarchy> = by_main_group
            .into_iter()
            .map(|(main_group, groups)| ClassificationHierarchy {
                main_group,
                name: main_group.display_name().to_string(),
                totals: groups.iter().map(|group| group.totals).sum(),
                groups,
            })
            .collect();
        let totals = hierarchies.iter().map(|hierarchy| hierarchy.totals).sum();

        HierarchicalRollup { hierarchies, totals }
    }
}

impl<'a> Extend<&'a ElementResult> for RollupAccumulator {
    fn extend<T: IntoIterator<Item = &'a ElementResult>>(&mut self, iter: T) {
        for result in iter {
            self.push(result);
        }
    }
}
