use account_loader_api::{
    Address, DataSlice, DynGateway, DynLoader, Encoding, FetchParams,
    LoaderError,
};
use account_loader_core::{
    default_test_builder,
    factories::{
        core_loader::config::{CoreLoaderConfig, CoreLoaderModConfig},
        mem_gateway::{GatewayCall, MAX_BASE58_BYTES},
        MemAccount, MemGateway,
    },
};
use account_loader_test_utils::{
    address::{random_address, random_address_list},
    enable_tracing, random_bytes, sequential_bytes,
};
use std::sync::Arc;

struct Harness {
    gateway: Arc<MemGateway>,
    loader: DynLoader,
}

async fn make_harness(config: Option<CoreLoaderConfig>) -> Harness {
    enable_tracing();

    let mut builder = default_test_builder().with_default_config().unwrap();
    if let Some(core_loader) = config {
        builder
            .config
            .set_module_config(&CoreLoaderModConfig { core_loader })
            .unwrap();
    }
    let builder = Arc::new(builder);

    let gateway = MemGateway::create();
    let dyn_gateway: DynGateway = gateway.clone();
    let loader = builder
        .loader
        .create(builder.clone(), dyn_gateway)
        .await
        .unwrap();

    Harness { gateway, loader }
}

fn with_encoding(encoding: Encoding) -> FetchParams {
    FetchParams::default().with_encoding(encoding)
}

#[tokio::test]
async fn identical_lookups_make_one_call() {
    let h = make_harness(None).await;
    let address = random_address();
    h.gateway
        .insert(address.clone(), MemAccount::new(random_bytes(64)));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            h.loader.load(address.clone(), with_encoding(Encoding::Base64))
        })
        .collect();
    h.loader.flush().await;

    assert_eq!(1, h.gateway.call_count());
    let values: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|v| v.unwrap())
        .collect();
    assert!(values[0].is_some());
    assert!(values.iter().all(|v| v == &values[0]));
}

#[tokio::test]
async fn mixed_lookups_make_one_call_per_encoding() {
    let h = make_harness(None).await;
    let address = random_address();
    h.gateway
        .insert(address.clone(), MemAccount::new(sequential_bytes(100)));

    let mut handles = Vec::new();
    for encoding in [Encoding::Base64, Encoding::Base64Zstd] {
        handles.push(h.loader.load(address.clone(), with_encoding(encoding)));
        handles.push(
            h.loader.load(
                address.clone(),
                with_encoding(encoding).with_data_slice(8, 8),
            ),
        );
    }
    handles.push(h.loader.load(address.clone(), FetchParams::default()));
    h.loader.flush().await;

    assert!(h.gateway.call_count() <= 2);
    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }
}

#[tokio::test]
async fn distant_slices_are_fetched_separately() {
    let h = make_harness(None).await;
    let address = random_address();
    h.gateway
        .insert(address.clone(), MemAccount::new(sequential_bytes(3000)));

    let params = with_encoding(Encoding::Base64);
    let a = h.loader.load(address.clone(), params.with_data_slice(0, 4));
    let b = h.loader.load(address.clone(), params.with_data_slice(2000, 4));
    h.loader.flush().await;

    assert_eq!(2, h.gateway.call_count());
    assert_eq!(
        vec![0, 1, 2, 3],
        a.await.unwrap().unwrap().data.decode().unwrap()
    );
    let expect: Vec<u8> = (2000..2004).map(|i| (i % 256) as u8).collect();
    assert_eq!(expect, b.await.unwrap().unwrap().data.decode().unwrap());
}

#[tokio::test]
async fn nearby_slices_share_a_call() {
    let h = make_harness(None).await;
    let address = random_address();
    h.gateway
        .insert(address.clone(), MemAccount::new(sequential_bytes(64)));

    let params = with_encoding(Encoding::Base64);
    let a = h.loader.load(address.clone(), params.with_data_slice(0, 10));
    let b = h.loader.load(address.clone(), params.with_data_slice(2, 16));
    h.loader.flush().await;

    assert_eq!(
        vec![GatewayCall::One(
            address,
            params.with_data_slice(0, 18)
        )],
        h.gateway.calls()
    );
    let a = a.await.unwrap().unwrap().data.decode().unwrap();
    let b = b.await.unwrap().unwrap().data.decode().unwrap();
    assert_eq!((0..10).collect::<Vec<u8>>(), a);
    assert_eq!((2..18).collect::<Vec<u8>>(), b);
}

#[tokio::test]
async fn many_addresses_are_chunked() {
    let h = make_harness(None).await;
    let addresses = random_address_list(150);
    for a in &addresses {
        h.gateway.insert(a.clone(), MemAccount::new(a.to_vec()));
    }

    let handles = h
        .loader
        .load_many(addresses.clone(), with_encoding(Encoding::Base64));
    h.loader.flush().await;

    let sizes: Vec<usize> = h
        .gateway
        .calls()
        .into_iter()
        .map(|c| match c {
            GatewayCall::Many(a, _) => a.len(),
            GatewayCall::One(..) => panic!("expected only multi-key calls"),
        })
        .collect();
    assert_eq!(vec![100, 50], sizes);

    for (address, handle) in addresses.into_iter().zip(handles) {
        let raw = handle.await.unwrap().unwrap().data.decode().unwrap();
        assert_eq!(address.to_vec(), raw);
    }
}

#[tokio::test]
async fn configured_batch_size_is_respected() {
    let h = make_harness(Some(CoreLoaderConfig {
        max_batch_size: 4,
        ..Default::default()
    }))
    .await;

    let _handles = h
        .loader
        .load_many(random_address_list(10), with_encoding(Encoding::Base64));
    h.loader.flush().await;

    assert_eq!(3, h.gateway.call_count());
}

#[tokio::test]
async fn orphan_prefers_sibling_encoding() {
    let h = make_harness(None).await;
    let address = random_address();
    h.gateway
        .insert(address.clone(), MemAccount::new(random_bytes(300)));

    let zstd = h
        .loader
        .load(address.clone(), with_encoding(Encoding::Base64Zstd));
    let orphan = h.loader.load(address.clone(), FetchParams::default());
    h.loader.flush().await;

    assert_eq!(1, h.gateway.call_count());
    let zstd = zstd.await.unwrap().unwrap();
    let orphan = orphan.await.unwrap().unwrap();
    assert_eq!(Encoding::Base64Zstd, orphan.data.encoding());
    assert_eq!(zstd.data.decode().unwrap(), orphan.data.decode().unwrap());
}

#[tokio::test]
async fn orphans_never_fall_back_to_base58() {
    let h = make_harness(None).await;
    let address = random_address();
    h.gateway.insert(
        address.clone(),
        MemAccount::new(random_bytes(MAX_BASE58_BYTES as u16 * 2)),
    );

    let weak = h
        .loader
        .load(address.clone(), with_encoding(Encoding::Base58));
    let orphan = h.loader.load(address.clone(), FetchParams::default());
    h.loader.flush().await;

    // the explicit base58 request is refused by the remote for an account
    // this large, the orphan is not dragged down with it
    assert!(matches!(weak.await, Err(LoaderError::Gateway { .. })));
    let orphan = orphan.await.unwrap().unwrap();
    assert_eq!(Encoding::Base64, orphan.data.encoding());
    assert_eq!(2, h.gateway.call_count());
}

#[tokio::test]
async fn failures_stay_in_their_call() {
    let h = make_harness(None).await;
    let good = random_address();
    let bad = random_address();
    h.gateway.insert(good.clone(), MemAccount::new(vec![1_u8]));
    h.gateway.insert(bad.clone(), MemAccount::new(vec![2_u8]));
    h.gateway.fail_address(bad.clone());

    let good_b64 = h
        .loader
        .load(good.clone(), with_encoding(Encoding::Base64));
    let bad_b64 = h.loader.load(bad.clone(), with_encoding(Encoding::Base64));
    let good_zstd = h
        .loader
        .load(good.clone(), with_encoding(Encoding::Base64Zstd));
    h.loader.flush().await;

    // good and bad shared a multi-key call, so both fail
    assert!(good_b64.await.is_err());
    assert!(bad_b64.await.is_err());
    // a call the failing address took no part in is unaffected
    assert!(good_zstd.await.unwrap().is_some());
}

#[tokio::test]
async fn missing_accounts_are_none() {
    let h = make_harness(None).await;
    let present = random_address();
    h.gateway.insert(present.clone(), MemAccount::new(vec![1_u8, 2]));

    let handles = h.loader.load_many(
        vec![random_address(), present, random_address()],
        with_encoding(Encoding::Base64),
    );
    h.loader.flush().await;

    let values = futures::future::join_all(handles).await;
    assert_eq!(None, values[0].clone().unwrap());
    assert!(values[1].clone().unwrap().is_some());
    assert_eq!(None, values[2].clone().unwrap());
}

#[tokio::test]
async fn windows_do_not_share_calls() {
    let h = make_harness(None).await;
    let address = random_address();
    h.gateway.insert(address.clone(), MemAccount::new(vec![1_u8]));

    let params = with_encoding(Encoding::Base64);
    let first = h.loader.load(address.clone(), params);
    h.loader.flush().await;
    let second = h.loader.load(address.clone(), params);
    h.loader.flush().await;

    assert_eq!(2, h.gateway.call_count());
    assert_eq!(first.await.unwrap(), second.await.unwrap());
}

#[tokio::test]
async fn slice_offsets_are_relative_to_the_fetched_span() {
    let h = make_harness(None).await;
    let address: Address = random_address();
    h.gateway
        .insert(address.clone(), MemAccount::new(sequential_bytes(1000)));

    let params = with_encoding(Encoding::Base64Zstd);
    let a = h.loader.load(address.clone(), params.with_data_slice(500, 8));
    let b = h.loader.load(address.clone(), params.with_data_slice(520, 8));
    h.loader.flush().await;

    assert_eq!(
        vec![GatewayCall::One(
            address,
            FetchParams {
                data_slice: Some(DataSlice::new(500, 28)),
                ..params
            }
        )],
        h.gateway.calls()
    );
    let expect = |start: usize| -> Vec<u8> {
        (start..start + 8).map(|i| (i % 256) as u8).collect()
    };
    assert_eq!(expect(500), a.await.unwrap().unwrap().data.decode().unwrap());
    assert_eq!(expect(520), b.await.unwrap().unwrap().data.decode().unwrap());
}
