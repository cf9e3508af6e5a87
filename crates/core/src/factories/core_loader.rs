//! Loader is the module that batches account lookups.
//!
//! Callers submit one lookup at a time and immediately receive a
//! [DeferredHandle]. Lookups accumulate in the current window until the
//! window is closed, either by an explicit [Loader::flush] or by the
//! optional window task. Closing a window runs four stages:
//!
//! ### Request registry
//!
//! - Buffers `(address, params, sink)` grouped by address, in arrival
//!   order. It does not deduplicate; identical lookups land in the same
//!   parameter group later on.
//! - A lookup with a data slice but no encoding is rejected at once and
//!   never enters the window.
//!
//! ### Coalescing
//!
//! - Per address, folds lookups into parameter groups keyed by
//!   commitment, encoding and min context slot, merging data slices that
//!   waste at most `maxByteRange` bytes.
//! - Lookups without an encoding adopt the first group of that address
//!   with a non-weak encoding, otherwise `defaultOrphanEncoding`.
//!
//! ### Dispatch
//!
//! - Groups needing identical parameters and an identical span are
//!   fetched together: single-key calls for one address, multi-key calls
//!   of at most `maxBatchSize` addresses otherwise.
//! - All calls of a window run concurrently.
//!
//! ### Distribution
//!
//! - Each call's result is cut down to the range every waiting caller
//!   asked for and settles that caller.
//! - A failed call settles all of its callers, and only those, with the
//!   error.
//!
//! No state survives a window. Identical lookups in two windows make two
//! calls.

use account_loader_api::*;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::task::JoinHandle;

mod coalesce;
mod dispatch;
mod distribute;

/// CoreLoader configuration types.
pub mod config {
    use account_loader_api::Encoding;

    /// Configuration parameters for [CoreLoaderFactory](super::CoreLoaderFactory).
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct CoreLoaderConfig {
        /// Largest number of bytes that merging two data slices may
        /// fetch without any caller asking for them. Default: 200.
        pub max_byte_range: usize,
        /// Most addresses per multi-key call. Default: 100.
        pub max_batch_size: usize,
        /// Encoding used for lookups that did not name one, when no
        /// other lookup for the same address offers a better one.
        /// Default: base64.
        pub default_orphan_encoding: Encoding,
        /// If non-zero, close the window automatically every this many
        /// milliseconds while lookups are pending. Default: 0 (only
        /// explicit flushes).
        pub window_interval_ms: u32,
    }

    impl Default for CoreLoaderConfig {
        fn default() -> Self {
            Self {
                max_byte_range: 200,
                max_batch_size: 100,
                default_orphan_encoding: Encoding::Base64,
                window_interval_ms: 0,
            }
        }
    }

    /// Module-level configuration for CoreLoader.
    #[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct CoreLoaderModConfig {
        /// CoreLoader configuration.
        pub core_loader: CoreLoaderConfig,
    }
}

use config::*;

/// A production-ready loader module.
#[derive(Debug)]
pub struct CoreLoaderFactory {}

impl CoreLoaderFactory {
    /// Construct a new CoreLoaderFactory.
    pub fn create() -> DynLoaderFactory {
        Arc::new(Self {})
    }
}

impl LoaderFactory for CoreLoaderFactory {
    fn default_config(&self, config: &mut Config) -> LoaderResult<()> {
        config.set_module_config(&CoreLoaderModConfig::default())?;
        Ok(())
    }

    fn create(
        &self,
        builder: Arc<Builder>,
        gateway: DynGateway,
    ) -> BoxFut<'static, LoaderResult<DynLoader>> {
        Box::pin(async move {
            let config: CoreLoaderModConfig =
                builder.config.get_module_config()?;
            let out: DynLoader =
                Arc::new(CoreLoader::new(config.core_loader, gateway));
            Ok(out)
        })
    }
}

/// Lookups buffered in the current window, grouped by address.
#[derive(Debug, Default)]
struct Window {
    by_address: std::collections::HashMap<Address, usize>,
    fetches: Vec<(Address, Vec<(FetchParams, ResultSink)>)>,
    count: usize,
}

impl Window {
    fn push(
        &mut self,
        address: Address,
        params: FetchParams,
        sink: ResultSink,
    ) {
        match self.by_address.get(&address) {
            Some(&i) => self.fetches[i].1.push((params, sink)),
            None => {
                self.by_address.insert(address.clone(), self.fetches.len());
                self.fetches.push((address, vec![(params, sink)]));
            }
        }
        self.count += 1;
    }
}

#[derive(Debug)]
struct Inner {
    config: CoreLoaderConfig,
    gateway: DynGateway,
    window: Mutex<Window>,
}

impl Inner {
    fn load(&self, address: Address, params: FetchParams) -> DeferredHandle {
        if params.data_slice.is_some() && params.encoding.is_none() {
            tracing::warn!(
                %address,
                ?params,
                "rejecting data slice without encoding"
            );
            return DeferredHandle::settled(Err(LoaderError::malformed(
                "a data slice requires an encoding",
            )));
        }

        let (sink, handle) = deferred();
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(address, params, sink);
        handle
    }

    fn pending_count(&self) -> usize {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }

    fn flush(&self) -> BoxFut<'static, ()> {
        let window = std::mem::take(
            &mut *self.window.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if window.count == 0 {
            return Box::pin(async {});
        }

        let mut coalescer = coalesce::Coalescer::new(
            self.config.max_byte_range,
            self.config.default_orphan_encoding,
        );
        for (address, fetches) in window.fetches {
            coalescer.add_address(address, fetches);
        }
        let groups = coalescer.finish();
        let group_count = groups.len();
        let calls = dispatch::plan(groups, self.config.max_batch_size);

        tracing::debug!(
            requests = window.count,
            groups = group_count,
            calls = calls.len(),
            "closing loader window"
        );

        Box::pin(distribute::run(self.gateway.clone(), calls))
    }
}

#[derive(Debug)]
struct CoreLoader {
    inner: Arc<Inner>,
    window_task: Option<JoinHandle<()>>,
}

impl CoreLoader {
    fn new(config: CoreLoaderConfig, gateway: DynGateway) -> Self {
        let interval_ms = config.window_interval_ms;
        let inner = Arc::new(Inner {
            config,
            gateway,
            window: Mutex::new(Window::default()),
        });

        let window_task = (interval_ms > 0).then(|| {
            tokio::task::spawn(CoreLoader::window_task(
                Arc::downgrade(&inner),
                std::time::Duration::from_millis(interval_ms as u64),
            ))
        });

        Self { inner, window_task }
    }

    async fn window_task(inner: Weak<Inner>, interval: std::time::Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(inner) = inner.upgrade() else {
                break;
            };
            if inner.pending_count() > 0 {
                tokio::task::spawn(inner.flush());
            }
        }
    }
}

impl Loader for CoreLoader {
    fn load(&self, address: Address, params: FetchParams) -> DeferredHandle {
        self.inner.load(address, params)
    }

    fn pending_count(&self) -> usize {
        self.inner.pending_count()
    }

    fn flush(&self) -> BoxFut<'static, ()> {
        self.inner.flush()
    }
}

impl Drop for CoreLoader {
    fn drop(&mut self) {
        if let Some(t) = self.window_task.take() {
            t.abort();
        }
    }
}
