//! Folding one window's lookups into parameter groups.
//!
//! Lookups for the same address are placed in two passes. The first
//! pass places every lookup that names an encoding, merging data slices
//! whose union wastes no more than `max_byte_range` bytes. The second
//! pass hands lookups without an encoding ("orphans") to the first group
//! of that address using a non-weak encoding, or opens groups with the
//! default orphan encoding if there is none.

use account_loader_api::*;
use std::collections::HashMap;

/// One caller waiting on a group.
#[derive(Debug)]
pub(crate) struct Waiter<T> {
    pub item: T,

    /// The slice this caller asked for. `None` means the whole payload
    /// as fetched for the group.
    pub data_slice: Option<DataSlice>,
}

/// Lookups for one address that can be served by a single fetch.
#[derive(Debug)]
pub(crate) struct ParamGroup<T> {
    pub address: Address,

    /// Shared parameters, never carrying a data slice.
    pub params: FetchParams,

    /// The merged data slice to fetch. `None` fetches the whole payload.
    pub span: Option<DataSlice>,

    /// In the order they were folded in.
    pub waiters: Vec<Waiter<T>>,
}

/// Merge a requested range into a group span if the union wastes at
/// most `max_byte_range` bytes.
pub(crate) fn merge_spans(
    r: DataSlice,
    g: DataSlice,
    max_byte_range: usize,
) -> Option<DataSlice> {
    if r.offset <= g.offset
        && (g.offset - r.offset).saturating_add(r.length) <= max_byte_range
    {
        return Some(DataSlice::new(
            r.offset,
            r.length.max(g.end() - r.offset),
        ));
    }
    if r.offset >= g.offset
        && (r.offset - g.offset).saturating_add(g.length) <= max_byte_range
    {
        return Some(DataSlice::new(
            g.offset,
            g.length.max(r.end() - g.offset),
        ));
    }
    None
}

/// Arena of parameter groups built up over one window.
#[derive(Debug)]
pub(crate) struct Coalescer<T> {
    max_byte_range: usize,
    default_orphan_encoding: Encoding,
    groups: Vec<ParamGroup<T>>,
    index: HashMap<(Address, FetchParams), Vec<usize>>,
}

impl<T> Coalescer<T> {
    pub fn new(
        max_byte_range: usize,
        default_orphan_encoding: Encoding,
    ) -> Self {
        Self {
            max_byte_range,
            default_orphan_encoding,
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Place every lookup submitted for `address`, in arrival order.
    ///
    /// Each address must only be added once per window.
    pub fn add_address(
        &mut self,
        address: Address,
        fetches: Vec<(FetchParams, T)>,
    ) {
        let mut orphans = Vec::new();
        let mut placed: Vec<usize> = Vec::new();

        for (params, item) in fetches {
            if params.encoding.is_none() {
                orphans.push((params, item));
                continue;
            }
            let id = self.place(&address, &params, item);
            if !placed.contains(&id) {
                placed.push(id);
            }
        }

        if orphans.is_empty() {
            return;
        }

        let adopter = placed.iter().copied().find(|id| {
            self.groups[*id]
                .params
                .encoding
                .is_some_and(|e| !e.is_weak())
        });

        match adopter {
            Some(id) => {
                let group = &mut self.groups[id];
                group.waiters.extend(orphans.into_iter().map(|(_, item)| {
                    Waiter {
                        item,
                        data_slice: None,
                    }
                }));
            }
            None => {
                for (params, item) in orphans {
                    let params = FetchParams {
                        encoding: Some(self.default_orphan_encoding),
                        data_slice: None,
                        ..params
                    };
                    self.place(&address, &params, item);
                }
            }
        }
    }

    /// Fold one lookup into a compatible group, or open a new one.
    fn place(
        &mut self,
        address: &Address,
        params: &FetchParams,
        item: T,
    ) -> usize {
        let key = (address.clone(), params.sans_data_slice());
        let requested = params.data_slice;

        if let Some(candidates) = self.index.get(&key) {
            for &id in candidates {
                let group = &mut self.groups[id];
                let span = match (requested, group.span) {
                    // the whole payload is already being fetched
                    (_, None) => Some(None),
                    (None, Some(_)) => Some(None),
                    (Some(r), Some(g)) => {
                        merge_spans(r, g, self.max_byte_range).map(Some)
                    }
                };
                if let Some(span) = span {
                    group.span = span;
                    group.waiters.push(Waiter {
                        item,
                        data_slice: requested,
                    });
                    return id;
                }
            }
        }

        let id = self.groups.len();
        self.groups.push(ParamGroup {
            address: address.clone(),
            params: key.1,
            span: requested,
            waiters: vec![Waiter {
                item,
                data_slice: requested,
            }],
        });
        self.index.entry(key).or_default().push(id);
        id
    }

    /// The groups in creation order.
    pub fn finish(self) -> Vec<ParamGroup<T>> {
        self.groups
    }
}
