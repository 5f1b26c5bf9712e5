//! Pairing specifications with implementation modules.

use crate::concept::{strip_suffix, ConceptSpecification};
use crate::source::ImplementationModule;

/// Result of pairing: indices into the spec and module slices.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Pairing {
    /// Spec index with its module index, or `None` when unpaired
    pub specs: Vec<(usize, Option<usize>)>,
    /// Modules no specification claimed
    pub unpaired_modules: Vec<usize>,
}

/// Comparison key: the name with the conventional suffix stripped, lowercased.
pub fn concept_key(name: &str) -> String {
    strip_suffix(name.trim()).to_lowercase()
}

/// Whether `module` realizes the concept with the given key, by file stem or exposed type.
pub fn module_matches(module: &ImplementationModule, key: &str) -> bool {
    concept_key(&module.name) == key
        || module
            .exposed_type_name
            .as_deref()
            .map(|t| concept_key(t) == key)
            .unwrap_or(false)
}

/// Pair specs with modules, both taken in the order given.
///
/// The first unclaimed matching module wins. Other matching modules stay
/// unpaired and are reported on their own.
pub fn pair(specs: &[ConceptSpecification], modules: &[ImplementationModule]) -> Pairing {
    let mut claimed = vec![false; modules.len()];
    let mut pairing = Pairing::default();

    for (spec_idx, spec) in specs.iter().enumerate() {
        let key = concept_key(&spec.name);
        let candidates: Vec<usize> = modules
            .iter()
            .enumerate()
            .filter(|(idx, m)| !claimed[*idx] && module_matches(m, &key))
            .map(|(idx, _)| idx)
            .collect();

        let chosen = candidates.first().copied();
        if let Some(idx) = chosen {
            claimed[idx] = true;
            for &other in &candidates[1..] {
                tracing::warn!(
                    concept = %spec.name,
                    chosen = %modules[idx].source_location.display(),
                    ignored = %modules[other].source_location.display(),
                    "ambiguous pairing, keeping the first match"
                );
            }
        }
        pairing.specs.push((spec_idx, chosen));
    }

    pairing.unpaired_modules = claimed
        .iter()
        .enumerate()
        .filter(|(_, c)| !**c)
        .map(|(idx, _)| idx)
        .collect();
    pairing
}
