//! Cancer type tumor form classification and ordering.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use parse_display::{Display, FromStr};

/// Tissues whose tumors are liquid; all other tissues are solid.
pub const LIQUID_TUMOR_TISSUES: &[&str] = &["Lymph", "Blood", "Lymphoid", "Myeloid"];

/// Form of a tumor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TumorForm {
    Solid,
    Liquid,
    Mixed,
}

/// Cancer type groups that do not correspond to a single node of the hierarchy.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialCancerType {
    #[display("All Tumors")]
    AllTumors,
    #[display("All Liquid Tumors")]
    AllLiquidTumors,
    #[display("All Solid Tumors")]
    AllSolidTumors,
    #[display("Other Tumor Types")]
    OtherTumorTypes,
    #[display("Other Solid Tumor Types")]
    OtherSolidTumorTypes,
    #[display("Other Liquid Tumor Types")]
    OtherLiquidTumorTypes,
}

impl SpecialCancerType {
    pub fn tumor_form(&self) -> TumorForm {
        match self {
            SpecialCancerType::AllLiquidTumors | SpecialCancerType::OtherLiquidTumorTypes => {
                TumorForm::Liquid
            }
            SpecialCancerType::AllSolidTumors | SpecialCancerType::OtherSolidTumorTypes => {
                TumorForm::Solid
            }
            SpecialCancerType::AllTumors | SpecialCancerType::OtherTumorTypes => TumorForm::Mixed,
        }
    }
}

/// Tumor form implied by a tissue name, `None` for an empty tissue.
pub fn tumor_form_for_tissue(tissue: &str) -> Option<TumorForm> {
    if tissue.is_empty() {
        None
    } else if LIQUID_TUMOR_TISSUES.contains(&tissue) {
        Some(TumorForm::Liquid)
    } else {
        Some(TumorForm::Solid)
    }
}

/// A node of the cancer type hierarchy.
///
/// Parents are referenced by identifier; the hierarchy is held by [`CancerTypes`].
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub struct CancerType {
    pub id: u64,
    /// OncoTree code, `None` for main types.
    pub code: Option<String>,
    pub main_type: String,
    pub subtype: Option<String>,
    pub tissue: Option<String>,
    /// Depth in the hierarchy.
    pub level: i32,
    pub tumor_form: Option<TumorForm>,
    pub parent: Option<u64>,
}

impl CancerType {
    /// Subtype if set, else the main type.
    pub fn name(&self) -> &str {
        match self.subtype.as_deref() {
            Some(subtype) if !subtype.is_empty() => subtype,
            _ => &self.main_type,
        }
    }

    fn is_tumor_form(&self, tumor_form: TumorForm) -> bool {
        if let Some(form) = self.tumor_form {
            return form == tumor_form;
        }
        if self.code.is_none() {
            return tumor_form_for_tissue(&self.main_type) == Some(tumor_form);
        }
        false
    }

    pub fn is_solid_tumor(&self) -> bool {
        self.is_tumor_form(TumorForm::Solid)
    }

    pub fn is_liquid_tumor(&self) -> bool {
        self.is_tumor_form(TumorForm::Liquid)
    }
}

pub fn has_solid_tumor<'a, I>(cancer_types: I) -> bool
where
    I: IntoIterator<Item = &'a CancerType>,
{
    cancer_types.into_iter().any(CancerType::is_solid_tumor)
}

pub fn has_liquid_tumor<'a, I>(cancer_types: I) -> bool
where
    I: IntoIterator<Item = &'a CancerType>,
{
    cancer_types.into_iter().any(CancerType::is_liquid_tumor)
}

/// Common tumor form of the cancer types, `Mixed` if they disagree.
pub fn tumor_form_of<'a, I>(cancer_types: I) -> Option<TumorForm>
where
    I: IntoIterator<Item = &'a CancerType>,
{
    let forms = cancer_types
        .into_iter()
        .filter_map(|cancer_type| cancer_type.tumor_form)
        .unique()
        .collect::<Vec<_>>();
    match forms.as_slice() {
        [] => None,
        [form] => Some(*form),
        _ => Some(TumorForm::Mixed),
    }
}

/// Names of the cancer types joined by `", "`.
pub fn cancer_types_name<'a, I>(cancer_types: I) -> String
where
    I: IntoIterator<Item = &'a CancerType>,
{
    cancer_types.into_iter().map(CancerType::name).join(", ")
}

/// Names of the cancer types with an `(excluding ...)` suffix for excluded ones.
pub fn cancer_types_name_with_exclusion(
    cancer_types: &[CancerType],
    excluded: &[CancerType],
) -> String {
    let name = cancer_types_name(cancer_types);
    if excluded.is_empty() {
        name
    } else {
        format!("{} (excluding {})", name, cancer_types_name(excluded))
    }
}

/// Stable sort by level, then by name.
pub fn sort_by_level(cancer_types: &mut [CancerType]) {
    cancer_types.sort_by(|lhs, rhs| {
        lhs.level
            .cmp(&rhs.level)
            .then_with(|| lhs.name().cmp(rhs.name()))
    });
}

/// The cancer type hierarchy, keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancerTypes {
    nodes: IndexMap<u64, CancerType>,
}

impl CancerTypes {
    pub fn new<I>(cancer_types: I) -> Self
    where
        I: IntoIterator<Item = CancerType>,
    {
        Self {
            nodes: cancer_types
                .into_iter()
                .map(|cancer_type| (cancer_type.id, cancer_type))
                .collect(),
        }
    }

    pub fn get(&self, id: u64) -> Option<&CancerType> {
        self.nodes.get(&id)
    }

    /// Ancestors of `id` nearest first, not including the tissue level.
    pub fn parents(&self, id: u64, only_same_main_type: bool) -> Vec<&CancerType> {
        let mut result = Vec::new();
        let mut seen = IndexSet::new();
        let mut current = self.get(id);
        while let Some(cancer_type) = current {
            if cancer_type.level <= 2 || !seen.insert(cancer_type.id) {
                break;
            }
            let Some(parent) = cancer_type.parent.and_then(|parent| self.get(parent)) else {
                break;
            };
            if !only_same_main_type || parent.main_type == cancer_type.main_type {
                result.push(parent);
            }
            current = Some(parent);
        }
        result
    }

    /// Descendants of `id` in breadth-first order.
    pub fn children(&self, id: u64, only_same_main_type: bool) -> Vec<&CancerType> {
        let mut result = Vec::new();
        let mut seen = IndexSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let Some(node) = self.get(current) else {
                continue;
            };
            for child in self.nodes.values().filter(|c| c.parent == Some(current)) {
                if !seen.insert(child.id) {
                    continue;
                }
                if !only_same_main_type || child.main_type == node.main_type {
                    result.push(child);
                }
                queue.push_back(child.id);
            }
        }
        result
    }
}
