//! Path quoting over registry pools.

use tracing::debug;

use crate::domain::{Address, Amount};
use crate::error::DexError;
use crate::math::{quote_input_amount, quote_output_amount};
use crate::pools::Pool;
use crate::registry::PoolRegistry;

/// The pool between two consecutive path assets.
///
/// # Errors
///
/// Returns [`DexError::InvalidPath`] if no pool exists for the hop.
pub fn hop_pool<'r>(
    registry: &'r PoolRegistry,
    input: &Address,
    output: &Address,
) -> Result<&'r Pool, DexError> {
    registry
        .get_pool(*input, *output)
        .and_then(|address| registry.pool(&address))
        .ok_or(DexError::InvalidPath)
}

fn check_path(path: &[Address]) -> Result<(), DexError> {
    if path.len() < 2 {
        return Err(DexError::InvalidPath);
    }
    Ok(())
}

/// Outputs of every hop for `amount_in` entering at `path[0]`.
///
/// `amounts[0] == amount_in` and `amounts[i + 1]` is what leaves the
/// pool between `path[i]` and `path[i + 1]`.
///
/// # Errors
///
/// - [`DexError::InvalidPath`] for a path shorter than 2 or with a missing pool.
/// - Any error of [`quote_output_amount`].
pub fn get_amounts_out(
    registry: &PoolRegistry,
    amount_in: Amount,
    path: &[Address],
) -> Result<Vec<Amount>, DexError> {
    check_path(path)?;
    let mut amounts = Vec::with_capacity(path.len());
    amounts.push(amount_in);
    for hop in path.windows(2) {
        let pool = hop_pool(registry, &hop[0], &hop[1])?;
        let (reserve_in, reserve_out) = pool.reserves_for(&hop[0])?;
        let last = amounts.last().copied().unwrap_or_default();
        amounts.push(quote_output_amount(last, reserve_in, reserve_out, pool.swap_fee())?);
    }
    debug!(hops = path.len() - 1, ?amounts, "amounts out");
    Ok(amounts)
}

/// Inputs of every hop needed for `amount_out` to leave at the end of `path`.
///
/// # Errors
///
/// - [`DexError::InvalidPath`] for a path shorter than 2 or with a missing pool.
/// - Any error of [`quote_input_amount`].
pub fn get_amounts_in(
    registry: &PoolRegistry,
    amount_out: Amount,
    path: &[Address],
) -> Result<Vec<Amount>, DexError> {
    get_amounts_in_with(registry, amount_out, path, |_, amount| Ok(amount))
}

/// [`get_amounts_in`] where every amount handed from one pool to the next
/// (and to the recipient) is first passed through `gross_up`, so transfer
/// fees on that asset are covered.
///
/// # Errors
///
/// As [`get_amounts_in`], plus any error of `gross_up`.
pub fn get_amounts_in_with(
    registry: &PoolRegistry,
    amount_out: Amount,
    path: &[Address],
    mut gross_up: impl FnMut(&Address, Amount) -> Result<Amount, DexError>,
) -> Result<Vec<Amount>, DexError> {
    check_path(path)?;
    let mut amounts = vec![Amount::ZERO; path.len()];
    let last = path.len() - 1;
    amounts[last] = gross_up(&path[last], amount_out)?;
    for i in (1..path.len()).rev() {
        let pool = hop_pool(registry, &path[i - 1], &path[i])?;
        let (reserve_in, reserve_out) = pool.reserves_for(&path[i - 1])?;
        let net_in = quote_input_amount(amounts[i], reserve_in, reserve_out, pool.swap_fee())?;
        amounts[i - 1] = if i - 1 == 0 {
            net_in
        } else {
            gross_up(&path[i - 1], net_in)?
        };
    }
    debug!(hops = last, ?amounts, "amounts in");
    Ok(amounts)
}
