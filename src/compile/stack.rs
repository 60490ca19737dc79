//! Stack compiler.

use crate::error::FilterResult;
use crate::registry::{ParsedFilter, Registry};
use crate::sql::where_clause::WherePredicate;

use super::field_predicates;

/// Root fields first, then every nested reference filter popped off a work
/// stack. Each nested filter in the input is compiled exactly once, including
/// filters that lead back to an entity already on the path.
pub(super) fn compile(registry: &Registry, root: &ParsedFilter) -> FilterResult<Vec<WherePredicate>> {
    let mut predicates = field_predicates(registry, root)?;
    let mut stack = root.partition().references;

    while let Some(item) = stack.pop() {
        predicates.extend(field_predicates(registry, item)?);
        stack.extend(item.partition().references);
    }

    Ok(predicates)
}
