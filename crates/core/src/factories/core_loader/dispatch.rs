//! Turning parameter groups into physical gateway calls.

use super::coalesce::{ParamGroup, Waiter};
use account_loader_api::*;
use std::collections::HashMap;

/// One physical gateway call and the callers waiting on it.
#[derive(Debug)]
pub(crate) enum Call<T> {
    /// A single-key fetch.
    One {
        address: Address,
        params: FetchParams,
        waiters: Vec<Waiter<T>>,
    },

    /// A multi-key fetch. Entries are in request order.
    Many {
        params: FetchParams,
        entries: Vec<(Address, Vec<Waiter<T>>)>,
    },
}

impl<T> Call<T> {
    /// The parameters sent to the gateway, including the merged span.
    pub fn params(&self) -> &FetchParams {
        match self {
            Self::One { params, .. } | Self::Many { params, .. } => params,
        }
    }

    /// Number of addresses in this call.
    pub fn address_count(&self) -> usize {
        match self {
            Self::One { .. } => 1,
            Self::Many { entries, .. } => entries.len(),
        }
    }
}

#[derive(Debug)]
struct Unit<T> {
    params: FetchParams,
    entries: Vec<(Address, Vec<Waiter<T>>)>,
    by_address: HashMap<Address, usize>,
}

/// Group parameter groups that need identical parameters and an
/// identical span, across addresses, then chunk each such unit to at
/// most `max_batch_size` addresses per call.
pub(crate) fn plan<T>(
    groups: Vec<ParamGroup<T>>,
    max_batch_size: usize,
) -> Vec<Call<T>> {
    let max_batch_size = max_batch_size.max(1);
    let mut units: Vec<Unit<T>> = Vec::new();
    let mut unit_index: HashMap<FetchParams, usize> = HashMap::new();

    for group in groups {
        let params = FetchParams {
            data_slice: group.span,
            ..group.params
        };
        let unit_id = *unit_index.entry(params).or_insert_with(|| {
            units.push(Unit {
                params,
                entries: Vec::new(),
                by_address: HashMap::new(),
            });
            units.len() - 1
        });
        let unit = &mut units[unit_id];

        // An address can own two groups with the same span when neither
        // range could absorb the other; they still need only one fetch.
        match unit.by_address.get(&group.address) {
            Some(&i) => unit.entries[i].1.extend(group.waiters),
            None => {
                unit.by_address
                    .insert(group.address.clone(), unit.entries.len());
                unit.entries.push((group.address, group.waiters));
            }
        }
    }

    let mut calls = Vec::new();
    for unit in units {
        let Unit {
            params,
            mut entries,
            ..
        } = unit;

        if entries.len() == 1 {
            if let Some((address, waiters)) = entries.pop() {
                calls.push(Call::One {
                    address,
                    params,
                    waiters,
                });
            }
            continue;
        }

        let mut entries = entries.into_iter().peekable();
        while entries.peek().is_some() {
            calls.push(Call::Many {
                params,
                entries: entries.by_ref().take(max_batch_size).collect(),
            });
        }
    }
    calls
}
