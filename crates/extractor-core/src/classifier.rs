//! Keyword classification of connector operation names.
//!
//! Each connector owns an ordered rule table. A name is lowercased and trimmed,
//! then checked against the rules in order; the first rule with a keyword that
//! occurs in the name decides the category. Names that match nothing are
//! [`Category::Other`].

use crate::models::{Category, ConnectorType};

/// One entry of a connector rule table. Keywords are lowercase.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub keywords: &'static [&'static str],
    pub category: Category,
}

/// IFC is checked first so that names such as `ExportIFCMeshes` count as IFC.
const TEKLA_RULES: &[Rule] = &[
    Rule {
        // ExportIFCTeklaAPI, LoadBrepItemInTekla
        keywords: &["ifc", "brep"],
        category: Category::IfcExport,
    },
    Rule {
        // CreateMeshGeometry, LoadMeshInTekla
        keywords: &["mesh"],
        category: Category::Mesh,
    },
    Rule {
        // CreateExchangeElementForPrimitive, LoadPrimitivesInTekla
        keywords: &["primitive"],
        category: Category::Primitive,
    },
];

/// The Rhino connector has no operation mapping yet; every name is `Other`.
const RHINO_RULES: &[Rule] = &[];

const NAVISWORKS_RULES: &[Rule] = &[Rule {
    keywords: &["getelementgeometry", "loadelementsinnavisworks"],
    category: Category::Elements,
}];

const TEKLA_CATEGORIES: &[Category] = &[
    Category::Mesh,
    Category::IfcExport,
    Category::Primitive,
    Category::Other,
];
const RHINO_CATEGORIES: &[Category] = &[Category::Other];
const NAVISWORKS_CATEGORIES: &[Category] = &[Category::Elements, Category::Other];

/// The rule table for `connector`, in evaluation order.
pub fn rules(connector: ConnectorType) -> &'static [Rule] {
    match connector {
        ConnectorType::Tekla => TEKLA_RULES,
        ConnectorType::Rhino => RHINO_RULES,
        ConnectorType::Navisworks => NAVISWORKS_RULES,
    }
}

/// Categories of `connector` in output column order. `Other` is always last.
pub fn list_categories(connector: ConnectorType) -> &'static [Category] {
    match connector {
        ConnectorType::Tekla => TEKLA_CATEGORIES,
        ConnectorType::Rhino => RHINO_CATEGORIES,
        ConnectorType::Navisworks => NAVISWORKS_CATEGORIES,
    }
}

/// Classify a raw operation name for `connector`.
pub fn classify(connector: ConnectorType, operation_name: &str) -> Category {
    let name = operation_name.trim().to_lowercase();
    if name.is_empty() {
        return Category::Other;
    }

    rules(connector)
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| name.contains(kw)))
        .map(|rule| rule.category)
        .unwrap_or(Category::Other)
}
