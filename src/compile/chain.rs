//! Graph/chain compiler.

use crate::error::FilterResult;
use crate::graph::ReferenceGraph;
use crate::registry::{ParsedFilter, Registry};
use crate::sql::where_clause::WherePredicate;

use super::field_predicates;

/// Root fields first, then each chain walked from the root's nested data.
///
/// Every chain is walked on its own. Chains sharing a prefix
/// (`a -> b -> c`, `a -> b -> d`) each compile the nested filter for `b`, so
/// its predicates appear once per chain.
pub(super) fn compile(registry: &Registry, root: &ParsedFilter) -> FilterResult<Vec<WherePredicate>> {
    let mut predicates = field_predicates(registry, root)?;

    for chain in ReferenceGraph::build(root).chains() {
        let mut current = root;

        for entity in chain.entities().iter().skip(1) {
            let Some(nested) = current.reference(entity) else {
                tracing::trace!(%chain, entity = entity.as_str(), "chain leaves filter data");
                break;
            };
            predicates.extend(field_predicates(registry, nested)?);
            current = nested;
        }
    }

    Ok(predicates)
}
