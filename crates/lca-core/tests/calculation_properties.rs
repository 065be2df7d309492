use lca_core::aggregation::{
    CalculationContext, ElementResult, MainGroup, RollupAccumulator, aggregate, evaluate_element,
};
use lca_core::amortization::AmortizationTable;
use lca_core::calculation::{DensityOverrides, InstanceStatus, compute_instance_impact};
use lca_core::catalog::ReferenceCatalog;
use lca_core::display::{DisplayMode, DisplaySettings, DisplayValue, normalize};
use lca_core::domain::{DensityRange, Element, ImpactFactors, MaterialImpact, MaterialInstance, ReferenceMaterial};
use lca_core::elements::{normalize_batch, normalize_element, parse_element_batch};
use lca_core::matching::MappingTable;
use serde_json::json;

const TOLERANCE: f64 = 1.0e-9;

fn assert_close(actual: f64, expected: f64, label: &str) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= TOLERANCE * scale,
        "{label}: expected {expected}, got {actual}"
    );
}

fn assert_impact_close(actual: &MaterialImpact, expected: &MaterialImpact, label: &str) {
    assert_close(actual.gwp, expected.gwp, &format!("{label} gwp"));
    assert_close(actual.ubp, expected.ubp, &format!("{label} ubp"));
    assert_close(actual.penr, expected.penr, &format!("{label} penr"));
}

fn reference(id: &str, name: &str, gwp: f64, density: Option<f64>, range: Option<(f64, f64)>) -> ReferenceMaterial {
    ReferenceMaterial {
        id: id.to_string(),
        display_name: name.to_string(),
        impact_factors: ImpactFactors {
            gwp,
            ubp: gwp * 1000.0,
            penr: gwp * 5.0,
        },
        density,
        density_range: range.map(|(min, max)| DensityRange { min, max }),
        unit: "kg".to_string(),
    }
}

fn catalog() -> ReferenceCatalog {
    ReferenceCatalog::new(vec![
        reference("01.002", "Hochbaubeton", 0.1, Some(2400.0), None),
        reference("06.012", "Brettschichtholz", 0.2, None, Some((300.0, 500.0))),
        reference("04.010", "Mineralwolle", 1.2, Some(80.0), None),
    ])
}

fn project() -> (Vec<Element>, MappingTable) {
    let elements = vec![
        Element::new("wall-1", Some("C2.1"))
            .with_material(MaterialInstance::new("w1-concrete", "Beton", 3.0))
            .with_material(MaterialInstance::new("w1-insulation", "Daemmung", 1.5)),
        Element::new("wall-2", Some("C02.01"))
            .with_material(MaterialInstance::new("w2-concrete", "Beton", 2.0)),
        Element::new("roof-1", Some("F1.2"))
            .with_material(MaterialInstance::new("r1-timber", "BSH", 4.0))
            .with_material(MaterialInstance::new("r1-foil", "Folie", 0.1)),
        Element::new("floor-1", Some("C4.9"))
            .with_material(MaterialInstance::new("f1-concrete", "Beton", 5.0)),
        Element::new("misc-1", None).with_material(MaterialInstance::new("m1-timber", "BSH", 1.0)),
    ];
    let mappings: MappingTable = [
        ("w1-concrete", "01.002"),
        ("w1-insulation", "04.010"),
        ("w2-concrete", "01.002"),
        ("r1-timber", "06.012"),
        ("f1-concrete", "01.002"),
        ("m1-timber", "06.012"),
    ]
    .into_iter()
    .collect();
    (elements, mappings)
}

fn relative_context(ebf: Option<f64>) -> CalculationContext {
    CalculationContext::default().with_display(DisplaySettings::new(DisplayMode::PerAreaPerYear, ebf))
}

#[test]
fn every_rollup_level_is_the_sum_of_its_children() {
    let (elements, mappings) = project();
    let result = aggregate(&elements, &mappings, &catalog(), &DensityOverrides::new(), &relative_context(Some(250.0)));

    let element_sum: MaterialImpact = result.elements.iter().map(ElementResult::impact).sum();
    assert_impact_close(&result.rollup.totals.impact, &element_sum, "project");

    for hierarchy in &result.rollup.hierarchies {
        let group_sum: MaterialImpact = hierarchy.groups.iter().map(|group| group.totals.impact).sum();
        assert_impact_close(&hierarchy.totals.impact, &group_sum, &hierarchy.name);
        let count: usize = hierarchy.groups.iter().map(|group| group.totals.element_count).sum();
        assert_eq!(hierarchy.totals.element_count, count);

        for group in &hierarchy.groups {
            let members: MaterialImpact = result
                .elements
                .iter()
                .filter(|element| element.group_code == group.code)
                .map(ElementResult::impact)
                .sum();
            assert_impact_close(&group.totals.impact, &members, &group.code);
        }
    }

    for element in &result.elements {
        let instance_sum: MaterialImpact = element.instances.iter().map(|i| i.detail.impact).sum();
        assert_impact_close(&element.impact(), &instance_sum, &element.element.guid);
    }
}

#[test]
fn identical_inputs_give_identical_results() {
    let (elements, mappings) = project();
    let context = relative_context(Some(250.0));
    let first = aggregate(&elements, &mappings, &catalog(), &DensityOverrides::new(), &context);
    let second = aggregate(&elements, &mappings, &catalog(), &DensityOverrides::new(), &context);
    assert_eq!(first, second);
}

#[test]
fn padded_and_unpadded_codes_share_a_group() {
    let (elements, mappings) = project();
    let result = aggregate(&elements, &mappings, &catalog(), &DensityOverrides::new(), &CalculationContext::default());

    let group = result.rollup.group("C02.01").expect("C02.01 group should exist");
    assert_eq!(group.element_guids, ["wall-1", "wall-2"]);
    assert!(result.rollup.group("C2.1").is_none());

    let main_groups: Vec<MainGroup> = result.rollup.hierarchies.iter().map(|h| h.main_group).collect();
    assert_eq!(main_groups, [MainGroup::Letter('C'), MainGroup::Letter('F'), MainGroup::Unclassified]);
}

#[test]
fn unmapped_instances_change_nothing_but_the_flag() {
    let (elements, mappings) = project();
    let overrides = DensityOverrides::new();
    let result = aggregate(&elements, &mappings, &catalog(), &overrides, &CalculationContext::default());

    let without_foil: Vec<Element> = elements
        .iter()
        .map(|element| {
            let mut element = element.clone();
            element.materials.retain(|material| material.id != "r1-foil");
            element
        })
        .collect();
    let reduced = aggregate(&without_foil, &mappings, &catalog(), &overrides, &CalculationContext::default());

    assert_impact_close(&result.rollup.totals.impact, &reduced.rollup.totals.impact, "totals");
    assert_eq!(result.rollup.totals.unmapped_instances, 1);
    assert_eq!(reduced.rollup.totals.unmapped_instances, 0);
}

#[test]
fn basic_scenario_and_range_midpoint() {
    let catalog = catalog();
    let mappings: MappingTable = [("concrete", "01.002"), ("timber", "06.012")].into_iter().collect();
    let overrides = DensityOverrides::new();

    let concrete = compute_instance_impact(&MaterialInstance::new("concrete", "Beton", 10.0), &mappings, &catalog, &overrides);
    assert_close(concrete.impact.gwp, 2400.0, "concrete gwp");

    let timber = compute_instance_impact(&MaterialInstance::new("timber", "BSH", 1.0), &mappings, &catalog, &overrides);
    assert_eq!(timber.density.map(|d| d.value), Some(400.0));
    assert_close(timber.impact.gwp, 80.0, "timber gwp");
}

#[test]
fn doubled_quantity_doubles_impact() {
    let raws = parse_element_batch(json!([
        {"guid": "E1", "materials": [{"id": "a", "name": "Beton", "volume": 1.0}]},
        {"guid": "E2", "quantity": 2.0, "materials": [{"id": "a", "name": "Beton", "volume": 1.0}]}
    ]))
    .expect("batch should parse");
    let mappings: MappingTable = [("a", "01.002")].into_iter().collect();
    let context = CalculationContext::default();
    let catalog = catalog();

    let original = evaluate_element(&normalize_element(&raws[0], 0).element, &mappings, &catalog, &DensityOverrides::new(), &context);
    let doubled = evaluate_element(&normalize_element(&raws[1], 1).element, &mappings, &catalog, &DensityOverrides::new(), &context);

    assert_impact_close(&doubled.impact(), &original.impact().map(|value| value * 2.0), "doubled");
}

#[test]
fn missing_area_keeps_absolute_values_and_marks_relative_unavailable() {
    let (elements, mappings) = project();
    let result = aggregate(&elements, &mappings, &catalog(), &DensityOverrides::new(), &relative_context(None));

    assert!(result.rollup.totals.impact.gwp > 0.0);
    assert!(result.elements.iter().all(|element| element.display.gwp == DisplayValue::Unavailable));
    assert_eq!(result.rollup.totals.display.gwp, DisplayValue::Unavailable);
    assert_eq!(result.rollup.totals.normalized.gwp, DisplayValue::Unavailable);
}

#[test]
fn non_finite_volumes_leave_quantities_finite() {
    let raws = parse_element_batch(json!([
        {"guid": "ok", "ebkp": "C01.01", "materials": [{"id": "a", "name": "Beton", "volume": 2.0}]},
        {"guid": "nan", "ebkp": "C01.01", "materials": [{"id": "a", "name": "Beton", "volume": "NaN"}]},
        {"guid": "inf", "ebkp": "C02.01", "materials": [{"id": "a", "name": "Beton", "volume": "inf"}]}
    ]))
    .expect("batch should parse");
    let elements: Vec<Element> = normalize_batch(&raws, 0)
        .into_iter()
        .map(|normalized| normalized.element)
        .collect();
    let mappings: MappingTable = [("a", "01.002")].into_iter().collect();
    let result = aggregate(&elements, &mappings, &catalog(), &DensityOverrides::new(), &CalculationContext::default());

    let statuses: Vec<InstanceStatus> = result.elements.iter().map(|e| e.instances[0].detail.status).collect();
    assert_eq!(statuses, [InstanceStatus::Computed, InstanceStatus::InvalidVolume, InstanceStatus::InvalidVolume]);

    assert_close(result.rollup.group("C01.01").expect("C01.01 group").totals.quantity, 2.0, "C01.01 quantity");
    assert_close(result.rollup.group("C02.01").expect("C02.01 group").totals.quantity, 0.0, "C02.01 quantity");
    assert_close(result.rollup.totals.quantity, 2.0, "project quantity");
    assert_close(result.rollup.totals.impact.gwp, 480.0, "project gwp");

    let rendered = serde_json::to_value(&result).expect("result should serialize");
    assert_eq!(rendered["rollup"]["totals"]["quantity"].as_f64(), Some(2.0));
}

#[test]
fn unknown_leaf_code_uses_group_service_life() {
    let table: AmortizationTable = [("C04", vec![40]), ("C04.08", vec![60])].into_iter().collect();
    let context = CalculationContext::default().with_amortization(table, 30);
    let (elements, mappings) = project();
    let result = aggregate(&elements, &mappings, &catalog(), &DensityOverrides::new(), &context);

    let years = |guid: &str| {
        result
            .elements
            .iter()
            .find(|element| element.element.guid == guid)
            .map(ElementResult::amortization_years)
    };
    assert_eq!(years("floor-1"), Some(40));
    assert_eq!(years("wall-1"), Some(30));
}

#[test]
fn merged_batches_match_single_pass() {
    let (elements, mappings) = project();
    let catalog = catalog();
    let overrides = DensityOverrides::new();
    let context = relative_context(Some(250.0));
    let results: Vec<ElementResult> = elements
        .iter()
        .map(|element| evaluate_element(element, &mappings, &catalog, &overrides, &context))
        .collect();

    let mut single = RollupAccumulator::new();
    single.extend(&results);
    let single = single.finish();

    let (left, right) = results.split_at(2);
    let mut first = RollupAccumulator::new();
    first.extend(left);
    let mut second = RollupAccumulator::new();
    second.extend(right);
    first.merge(second);
    let merged = first.finish();

    assert_eq!(merged.totals.element_count, single.totals.element_count);
    assert_impact_close(&merged.totals.impact, &single.totals.impact, "merged totals");
    for (lhs, rhs) in merged.hierarchies.iter().zip(&single.hierarchies) {
        assert_eq!(lhs.main_group, rhs.main_group);
        assert_impact_close(&lhs.totals.impact, &rhs.totals.impact, &lhs.name);
        let lhs_codes: Vec<&str> = lhs.groups.iter().map(|g| g.code.as_str()).collect();
        let rhs_codes: Vec<&str> = rhs.groups.iter().map(|g| g.code.as_str()).collect();
        assert_eq!(lhs_codes, rhs_codes);
    }
}

#[test]
fn relative_total_sums_per_element_values() {
    let table: AmortizationTable = [("C01", vec![60]), ("D01", vec![30])].into_iter().collect();
    let context = relative_context(Some(100.0)).with_amortization(table, 30);
    let elements = vec![
        Element::new("structure", Some("C01.01")).with_material(MaterialInstance::new("s", "Beton", 10.0)),
        Element::new("services", Some("D01.01")).with_material(MaterialInstance::new("d", "Beton", 10.0)),
    ];
    let mappings: MappingTable = [("s", "01.002"), ("d", "01.002")].into_iter().collect();
    let result = aggregate(&elements, &mappings, &catalog(), &DensityOverrides::new(), &context);

    // 2400 / (60 * 100) + 2400 / (30 * 100)
    let relative = result.rollup.totals.normalized.gwp.value().expect("relative total should be available");
    assert_eq!(result.rollup.totals.display, result.rollup.totals.normalized);
    assert_close(relative, 0.4 + 0.8, "relative total");

    let naive = normalize(result.rollup.totals.impact.gwp, DisplayMode::PerAreaPerYear, Some(100.0), 30)
        .value()
        .expect("naive value should be available");
    assert!((relative - naive).abs() > 1.0e-6);
}
