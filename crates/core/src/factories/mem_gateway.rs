//! The in-memory gateway implementation.

use account_loader_api::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// The remote api refuses base58 for accounts larger than this.
pub const MAX_BASE58_BYTES: usize = 128;

/// The in-memory gateway implementation.
/// This is NOT a production module. It serves accounts from a local map
/// and is meant for tests and local experiments.
#[derive(Debug)]
pub struct MemGatewayFactory {}

impl MemGatewayFactory {
    /// Construct a new MemGatewayFactory.
    pub fn create() -> DynGatewayFactory {
        let out: DynGatewayFactory = Arc::new(MemGatewayFactory {});
        out
    }
}

impl GatewayFactory for MemGatewayFactory {
    fn default_config(&self, _config: &mut Config) -> LoaderResult<()> {
        Ok(())
    }

    fn create(
        &self,
        _builder: Arc<Builder>,
    ) -> BoxFut<'static, LoaderResult<DynGateway>> {
        Box::pin(async move {
            let out: DynGateway = MemGateway::create();
            Ok(out)
        })
    }
}

/// An account as stored by [MemGateway], with raw data.
#[derive(Debug, Clone, PartialEq)]
pub struct MemAccount {
    /// Raw account data.
    pub data: bytes::Bytes,
    /// Whether the account holds a loaded program.
    pub executable: bool,
    /// Balance in lamports.
    pub lamports: u64,
    /// The owning program.
    pub owner: Address,
    /// Epoch at which rent is next due.
    pub rent_epoch: u64,
}

impl MemAccount {
    /// An account owned by the system program holding `data`.
    pub fn new(data: impl Into<bytes::Bytes>) -> Self {
        Self {
            data: data.into(),
            executable: false,
            lamports: 1_000_000,
            owner: Address::from([0_u8; 32]),
            rent_epoch: u64::MAX,
        }
    }

    /// Render this account the way the remote api would for `params`.
    pub fn render(&self, params: &FetchParams) -> LoaderResult<Account> {
        let raw = match params.data_slice {
            None => &self.data[..],
            Some(s) => {
                let start = s.offset.min(self.data.len());
                let end = s.end().min(self.data.len());
                &self.data[start..end]
            }
        };
        let data = match params.encoding {
            Some(Encoding::Base58) | None if raw.len() > MAX_BASE58_BYTES => {
                return Err(LoaderError::gateway(
                    "encoded binary (base 58) data should be less than 128 bytes, please use Base64 encoding",
                ));
            }
            None => AccountData::Legacy(Encoding::Base58.encode(raw)?),
            Some(encoding) => AccountData::encode(raw, encoding)?,
        };
        Ok(Account {
            data,
            executable: self.executable,
            lamports: self.lamports,
            owner: self.owner.clone(),
            rent_epoch: self.rent_epoch,
            space: self.data.len() as u64,
        })
    }
}

/// A physical call received by a [MemGateway].
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    /// A single-key fetch.
    One(Address, FetchParams),
    /// A multi-key fetch.
    Many(Vec<Address>, FetchParams),
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Address, MemAccount>,
    failing: HashSet<Address>,
    calls: Vec<GatewayCall>,
}

/// Serves accounts from memory and records every call it receives.
#[derive(Debug, Default)]
pub struct MemGateway(Mutex<State>);

impl MemGateway {
    /// Construct a new, empty MemGateway.
    pub fn create() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an account.
    pub fn insert(&self, address: Address, account: MemAccount) {
        self.state().accounts.insert(address, account);
    }

    /// Make every call that includes `address` fail as a whole.
    pub fn fail_address(&self, address: Address) {
        self.state().failing.insert(address);
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    fn lookup(
        &self,
        call: GatewayCall,
    ) -> LoaderResult<Vec<LoaderResult<AccountValue>>> {
        let mut state = self.state();
        let (addresses, params) = match &call {
            GatewayCall::One(a, p) => (vec![a.clone()], *p),
            GatewayCall::Many(a, p) => (a.clone(), *p),
        };
        state.calls.push(call);

        if let Some(a) = addresses.iter().find(|a| state.failing.contains(*a))
        {
            return Err(LoaderError::gateway(format!("unavailable: {a}")));
        }

        addresses
            .iter()
            .map(|a| match state.accounts.get(a) {
                None => Ok(Ok(None)),
                Some(account) => account.render(&params).map(|a| Ok(Some(a))),
            })
            .collect()
    }
}

impl Gateway for MemGateway {
    fn fetch_one(
        &self,
        address: Address,
        params: FetchParams,
    ) -> BoxFut<'_, LoaderResult<AccountValue>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            let mut out = self.lookup(GatewayCall::One(address, params))?;
            out.pop()
                .unwrap_or_else(|| Err(LoaderError::other("missing result")))
        })
    }

    fn fetch_many(
        &self,
        addresses: Vec<Address>,
        params: FetchParams,
    ) -> BoxFut<'_, LoaderResult<Vec<LoaderResult<AccountValue>>>> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            self.lookup(GatewayCall::Many(addresses, params))
        })
    }
}
