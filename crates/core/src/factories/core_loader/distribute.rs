//! Executing physical calls and settling every caller waiting on them.

use super::coalesce::Waiter;
use super::dispatch::Call;
use account_loader_api::*;

/// Run all calls of a window concurrently. Resolves once every waiter of
/// every call has been settled.
pub(crate) async fn run(gateway: DynGateway, calls: Vec<Call<ResultSink>>) {
    futures::future::join_all(
        calls.into_iter().map(|call| execute(gateway.clone(), call)),
    )
    .await;
}

async fn execute(gateway: DynGateway, call: Call<ResultSink>) {
    match call {
        Call::One {
            address,
            params,
            waiters,
        } => {
            tracing::debug!(
                %address,
                ?params,
                waiters = waiters.len(),
                "fetch one"
            );
            match gateway.fetch_one(address.clone(), params).await {
                Ok(value) => {
                    settle_value(&value, params.data_slice.as_ref(), waiters)
                }
                Err(err) => {
                    tracing::warn!(%address, ?err, "fetch one failed");
                    settle_err(&err, waiters);
                }
            }
        }
        Call::Many { params, entries } => {
            let addresses: Vec<Address> =
                entries.iter().map(|(a, _)| a.clone()).collect();
            tracing::debug!(addresses = addresses.len(), ?params, "fetch many");
            match gateway.fetch_many(addresses, params).await {
                Ok(results) if results.len() == entries.len() => {
                    for ((address, waiters), result) in
                        entries.into_iter().zip(results)
                    {
                        match result {
                            Ok(value) => settle_value(
                                &value,
                                params.data_slice.as_ref(),
                                waiters,
                            ),
                            Err(err) => {
                                tracing::warn!(
                                    %address,
                                    ?err,
                                    "account failed in fetch many"
                                );
                                settle_err(&err, waiters);
                            }
                        }
                    }
                }
                Ok(results) => {
                    let err = LoaderError::ResponseMismatch {
                        expected: entries.len(),
                        actual: results.len(),
                    };
                    tracing::warn!(
                        ?err,
                        "fetch many returned misaligned results"
                    );
                    for (_, waiters) in entries {
                        settle_err(&err, waiters);
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        addresses = entries.len(),
                        ?err,
                        "fetch many failed"
                    );
                    for (_, waiters) in entries {
                        settle_err(&err, waiters);
                    }
                }
            }
        }
    }
}

/// Hand each waiter its view of a fetched value. `span` is the range the
/// value was fetched with.
fn settle_value(
    value: &AccountValue,
    span: Option<&DataSlice>,
    waiters: Vec<Waiter<ResultSink>>,
) {
    for Waiter { item, data_slice } in waiters {
        let result = match (value, data_slice) {
            (None, _) => Ok(None),
            (Some(account), None) => Ok(Some(account.clone())),
            (Some(account), Some(requested)) => account
                .slice_for(&requested, span)
                .map(Some)
                .inspect_err(|err| {
                    tracing::warn!(
                        ?requested,
                        ?err,
                        "could not slice account data"
                    );
                }),
        };
        item.settle(result);
    }
}

fn settle_err(err: &LoaderError, waiters: Vec<Waiter<ResultSink>>) {
    for waiter in waiters {
        waiter.item.settle(Err(err.clone()));
    }
}
