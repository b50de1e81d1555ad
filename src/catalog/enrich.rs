//! Derived model fields.

use super::types::Model;

pub fn enrich_models(models: &mut [Model]) {
    for model in models {
        enrich_model(model);
    }
}

/// Fill `provider_model_id` and `family` when absent. Fields already set
/// by a source are never touched.
pub fn enrich_model(model: &mut Model) {
    if model.provider_model_id.is_none() {
        model.provider_model_id = Some(model.id.clone());
    }
    if model.family.is_none() {
        model.family = derive_family(&model.id);
    }
}

/// Family is the id with its trailing `-` segment removed:
/// "gpt-4o-mini" -> "gpt-4o". Single-segment ids have no family.
#[must_use]
pub fn derive_family(id: &str) -> Option<String> {
    let (family, _last) = id.rsplit_once('-')?;
    if family.is_empty() {
        return None;
    }
    Some(family.to_string())
}
