use super::raw::{RawElement, RawMaterial};
use crate::domain::{Element, MaterialInstance};
use serde::Serialize;

/// Which accessor produced an element's GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidSource {
    GlobalId,
    Guid,
    Id,
    Property(&'static str),
    StorageId,
    Synthesized,
}

type GuidAccessor = fn(&RawElement) -> Option<&str>;

fn global_id(raw: &RawElement) -> Option<&str> {
    raw.global_id.as_deref()
}

fn guid(raw: &RawElement) -> Option<&str> {
    raw.guid.as_deref()
}

fn id(raw: &RawElement) -> Option<&str> {
    raw.id.as_deref()
}

fn property_global_id(raw: &RawElement) -> Option<&str> {
    raw.property_str("globalId")
}

fn property_guid(raw: &RawElement) -> Option<&str> {
    raw.property_str("guid")
}

fn property_global_id_pascal(raw: &RawElement) -> Option<&str> {
    raw.property_str("GlobalId")
}

fn property_guid_upper(raw: &RawElement) -> Option<&str> {
    raw.property_str("GUID")
}

fn storage_id(raw: &RawElement) -> Option<&str> {
    raw.storage_id.as_deref()
}

/// Ordered GUID fallback chain; the first non-blank value wins.
const GUID_ACCESSORS: &[(GuidSource, GuidAccessor)] = &[
    (GuidSource::GlobalId, global_id),
    (GuidSource::Guid, guid),
    (GuidSource::Id, id),
    (GuidSource::Property("globalId"), property_global_id),
    (GuidSource::Property("guid"), property_guid),
    (GuidSource::Property("GlobalId"), property_global_id_pascal),
    (GuidSource::Property("GUID"), property_guid_upper),
    (GuidSource::StorageId, storage_id),
];

const CLASSIFICATION_SYSTEMS: [&str; 2] = ["EBKP", "EBKP-H"];

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedElement {
    pub element: Element,
    pub guid_source: GuidSource,
    pub quantity_scaled: bool,
}

impl NormalizedElement {
    pub fn has_synthesized_guid(&self) -> bool {
        self.guid_source == GuidSource::Synthesized
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn alphanumeric_fragment(source: &str, max_chars: usize) -> String {
    let fragment: String = source
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(max_chars)
        .collect();
    if fragment.is_empty() {
        "unknown".chars().take(max_chars).collect()
    } else {
        fragment
    }
}

fn resolve_guid(raw: &RawElement, index: usize) -> (String, GuidSource) {
    for (source, accessor) in GUID_ACCESSORS {
        if let Some(value) = non_blank(accessor(raw)) {
            return (value.to_string(), *source);
        }
    }

    let type_part = non_blank(raw.element_type.as_deref())
        .or(non_blank(raw.ifc_class.as_deref()))
        .unwrap_or("unknown");
    let name_part = non_blank(raw.name.as_deref())
        .or(non_blank(raw.type_name.as_deref()))
        .unwrap_or("unknown");
    let synthesized = format!(
        "AUTO-{}-{}-{index}",
        alphanumeric_fragment(type_part, 4),
        alphanumeric_fragment(name_part, 8)
    );
    tracing::warn!(index, guid = %synthesized, "element has no identifier, synthesized one");
    (synthesized, GuidSource::Synthesized)
}

fn resolve_classification_code(raw: &RawElement) -> Option<String> {
    let from_classification = raw.classification.as_ref().and_then(|classification| {
        let system = classification.system.as_deref()?.trim();
        CLASSIFICATION_SYSTEMS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(system))
            .then_some(classification.id.as_deref())
            .flatten()
    });

    non_blank(from_classification)
        .or(non_blank(raw.ebkp.as_deref()))
        .or(non_blank(raw.property_str("ebkp_code")))
        .map(|code| code.trim().to_string())
}

fn material_instance(raw: &RawMaterial, element_index: usize, material_index: usize, scale: f64) -> MaterialInstance {
    let id = non_blank(raw.id.as_deref())
        .or(non_blank(raw.name.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("mat-{element_index}-{material_index}"));
    let name = non_blank(raw.name.as_deref()).unwrap_or("Unknown Material");

    let mut instance = MaterialInstance::new(id, name, raw.volume.unwrap_or(0.0) * scale);
    if let Some(unit) = non_blank(raw.unit.as_deref()) {
        instance.unit = unit.to_string();
    }
    instance
}

/// Canonical element for one raw record at `index` within its project.
pub fn normalize_element(raw: &RawElement, index: usize) -> NormalizedElement {
    let (guid, guid_source) = resolve_guid(raw, index);

    let original_sum: f64 = raw
        .materials
        .iter()
        .filter_map(|material| material.volume)
        .filter(|volume| volume.is_finite() && *volume > 0.0)
        .sum();
    let scale = raw
        .quantity
        .filter(|quantity| quantity.is_finite() && *quantity > 0.0)
        .filter(|_| original_sum.is_finite() && original_sum > 0.0)
        .map(|quantity| quantity / original_sum);

    let mut element = Element::new(guid, resolve_classification_code(raw).as_deref());
    if let Some(name) = non_blank(raw.name.as_deref()).or(non_blank(raw.type_name.as_deref())) {
        element.name = name.to_string();
    }
    if let Some(ifc_class) = non_blank(raw.element_type.as_deref()).or(non_blank(raw.ifc_class.as_deref())) {
        element.ifc_class = ifc_class.to_string();
    }
    for (material_index, material) in raw.materials.iter().enumerate() {
        element = element.with_material(material_instance(material, index, material_index, scale.unwrap_or(1.0)));
    }

    NormalizedElement {
        element,
        guid_source,
        quantity_scaled: scale.is_some(),
    }
}

/// Normalizes a batch whose first record sits at `offset` within the project.
pub fn normalize_batch(raws: &[RawElement], offset: usize) -> Vec<NormalizedElement> {
    raws.iter()
        .enumerate()
        .map(|(position, raw)| normalize_element(raw, offset + position))
        .collect()
}
