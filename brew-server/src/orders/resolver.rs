//! Recipe resolver
//!
//! Expands `(drink, units)` pairs into aggregated ingredient requirements.

use std::collections::{BTreeSet, HashMap};

use sqlx::SqliteConnection;

use super::error::{OrderError, OrderResult};
use super::ledger::Requirements;
use crate::db::repository::{drink, recipe};

/// Aggregate recipe rows `(drink_id, ingredient_id, quantity)` over `lines`
///
/// Returns the first drink (in line order) without any recipe row as `Err`.
pub fn aggregate(rows: &[(i64, i64, i64)], lines: &[(i64, i64)]) -> Result<Requirements, i64> {
    let mut per_drink: HashMap<i64, Vec<(i64, i64)>> = HashMap::new();
    for (drink_id, ingredient_id, quantity) in rows {
        per_drink
            .entry(*drink_id)
            .or_default()
            .push((*ingredient_id, *quantity));
    }

    let mut requirements = Requirements::new();
    for (drink_id, units) in lines {
        let Some(recipe) = per_drink.get(drink_id) else {
            return Err(*drink_id);
        };
        for (ingredient_id, per_unit) in recipe {
            *requirements.entry(*ingredient_id).or_insert(0) += per_unit * units;
        }
    }
    Ok(requirements)
}

/// Requirements for `lines`; every distinct drink must have a recipe
pub async fn resolve(
    conn: &mut SqliteConnection,
    lines: &[(i64, i64)],
) -> OrderResult<Requirements> {
    let rows = load(conn, lines).await?;
    match aggregate(&rows, lines) {
        Ok(requirements) => Ok(requirements),
        Err(drink_id) => {
            let name = drink::find_by_id_tx(conn, drink_id)
                .await?
                .map(|d| d.name)
                .unwrap_or_else(|| format!("#{drink_id}"));
            Err(OrderError::RecipeMissing { drink_id, name })
        }
    }
}

async fn load(
    conn: &mut SqliteConnection,
    lines: &[(i64, i64)],
) -> OrderResult<Vec<(i64, i64, i64)>> {
    let drinks: Vec<i64> = lines
        .iter()
        .map(|(d, _)| *d)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    Ok(recipe::find_requirements(conn, &drinks).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_sums_across_lines_and_drinks() {
        // latte: milk 4, beans 1; mocha: milk 2, cocoa 1
        let rows = [(1, 10, 4), (1, 11, 1), (2, 10, 2), (2, 12, 1)];
        let req = aggregate(&rows, &[(1, 2), (2, 3)]).unwrap();
        assert_eq!(req[&10], 4 * 2 + 2 * 3);
        assert_eq!(req[&11], 2);
        assert_eq!(req[&12], 3);
    }

    #[test]
    fn test_aggregate_repeated_drink_never_overwrites() {
        let rows = [(1, 10, 4)];
        let req = aggregate(&rows, &[(1, 1), (1, 2)]).unwrap();
        assert_eq!(req[&10], 12);
    }

    #[test]
    fn test_aggregate_reports_drink_without_recipe() {
        let rows = [(1, 10, 4)];
        assert_eq!(aggregate(&rows, &[(1, 1), (9, 1)]), Err(9));
    }
}
